//! Installer selection by version-spec variant.

use chromeup_cache::ToolCache;
use chromeup_core::platform::Platform;
use chromeup_core::version::VersionSpec;

use crate::channel::ChannelInstaller;
use crate::known_good::KnownGoodVersionInstaller;
use crate::snapshot::{LatestInstaller, SnapshotInstaller};
use crate::{Installer, InstallerOptions, Result};

/// Pick the installer for a version spec.
///
/// - `latest` - newest Chromium snapshot
/// - channel names - Chrome for Testing, last-known-good manifest
/// - snapshot build numbers - Chromium snapshot bucket
/// - four-part versions - Chrome for Testing, known-good manifest
///
/// # Errors
///
/// Fails when the chosen source publishes nothing for the platform.
pub fn installer_for(
    platform: Platform,
    cache: ToolCache,
    spec: &VersionSpec,
    options: &InstallerOptions,
) -> Result<Box<dyn Installer>> {
    Ok(match spec {
        VersionSpec::Latest => Box::new(LatestInstaller::new(platform, cache)?),
        VersionSpec::Channel(_) => Box::new(ChannelInstaller::new(platform, cache)?),
        VersionSpec::Snapshot(_) => Box::new(SnapshotInstaller::new(platform, cache)?),
        VersionSpec::FourPart { .. } => {
            Box::new(KnownGoodVersionInstaller::new(platform, cache, options)?)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chromeup_core::platform::{Arch, Os};

    fn pick(version: &str) -> Box<dyn Installer> {
        let spec = VersionSpec::parse(version).unwrap();
        installer_for(
            Platform::new(Os::Linux, Arch::Amd64),
            ToolCache::new("/tmp/unused"),
            &spec,
            &InstallerOptions::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_dispatch_by_spec_variant() {
        assert_eq!(pick("latest").name(), "latest");
        assert_eq!(pick("stable").name(), "channel");
        assert_eq!(pick("canary").name(), "channel");
        assert_eq!(pick("123456").name(), "snapshot");
        assert_eq!(pick("119.0.6045.123").name(), "known-good");
        assert_eq!(pick("119.0").name(), "known-good");
    }

    #[test]
    fn test_unsupported_platform_is_rejected() {
        let spec = VersionSpec::parse("stable").unwrap();
        let result = installer_for(
            Platform::new(Os::Linux, Arch::Arm64),
            ToolCache::new("/tmp/unused"),
            &spec,
            &InstallerOptions::default(),
        );
        assert!(result.is_err());
    }
}
