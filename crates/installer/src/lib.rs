//! Browser and driver installers for chromeup.
//!
//! An [`Installer`] composes a resolver, the tool cache, download, and
//! extraction into the check/download/install flow for one
//! version-addressing scheme. [`installer_for`] picks the right one from a
//! parsed [`VersionSpec`](chromeup_core::version::VersionSpec);
//! [`install_browser`] and [`install_driver`] drive the flow.

mod channel;
mod download;
mod error;
mod extract;
mod factory;
mod known_good;
mod layout;
mod snapshot;

pub use channel::ChannelInstaller;
pub use error::{Error, Result};
pub use extract::extract_zip;
pub use factory::installer_for;
pub use known_good::KnownGoodVersionInstaller;
pub use snapshot::{LatestInstaller, SnapshotInstaller};

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use tracing::info;

/// Cache tool name for browser installs.
pub(crate) const BROWSER_TOOL: &str = "chrome";
/// Cache tool name for driver installs.
pub(crate) const DRIVER_TOOL: &str = "chromedriver";

/// An installed tool: its cache directory and the executable inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallResult {
    /// Directory containing the full install.
    pub root: PathBuf,
    /// Executable path relative to `root`.
    pub bin: PathBuf,
}

impl InstallResult {
    /// Absolute path to the executable.
    #[must_use]
    pub fn bin_path(&self) -> PathBuf {
        self.root.join(&self.bin)
    }
}

/// A downloaded archive and the version it should be cached under.
///
/// The cache key is the resolved concrete version for four-part specs, and
/// the requested alias itself for `latest` and channels (moving targets are
/// cached under their name so the next lookup for the same alias hits).
#[derive(Debug)]
pub struct DownloadResult {
    /// Version string to cache the install under.
    pub version: String,
    /// The downloaded archive; deleted on drop.
    pub archive: TempPath,
}

/// Options shared by all installers.
#[derive(Debug, Clone, Default)]
pub struct InstallerOptions {
    /// Resolve browser versions without requiring a matching driver
    /// download. Set when no driver install will follow, so browser-only
    /// runs are not limited to builds that ship both archives.
    pub resolve_browser_version_only: bool,
}

/// One version-addressing scheme's install strategy.
///
/// `version` is the user's original spec string throughout; each installer
/// decides how it maps onto cache keys and download URLs.
#[async_trait]
pub trait Installer: Send + Sync {
    /// Scheme name, for logs and dispatch tests.
    fn name(&self) -> &'static str;

    /// Look up a previously installed browser in the cache.
    async fn check_installed_browser(&self, version: &str) -> Result<Option<InstallResult>>;

    /// Resolve the spec and download the browser archive.
    async fn download_browser(&self, version: &str) -> Result<DownloadResult>;

    /// Extract a downloaded browser archive into the cache.
    async fn install_browser(&self, version: &str, archive: &Path) -> Result<InstallResult>;

    /// Look up a previously installed driver in the cache.
    async fn check_installed_driver(&self, version: &str) -> Result<Option<InstallResult>>;

    /// Resolve the spec and download the driver archive.
    async fn download_driver(&self, version: &str) -> Result<DownloadResult>;

    /// Extract a downloaded driver archive into the cache.
    async fn install_driver(&self, version: &str, archive: &Path) -> Result<InstallResult>;
}

/// Install a browser: return the cached install when present, otherwise
/// download, extract, and cache it.
pub async fn install_browser(installer: &dyn Installer, version: &str) -> Result<InstallResult> {
    if let Some(installed) = installer.check_installed_browser(version).await? {
        info!(%version, root = %installed.root.display(), "browser found in cache");
        return Ok(installed);
    }
    let download = installer.download_browser(version).await?;
    installer
        .install_browser(&download.version, &download.archive)
        .await
}

/// Install a driver: return the cached install when present, otherwise
/// download, extract, and cache it.
pub async fn install_driver(installer: &dyn Installer, version: &str) -> Result<InstallResult> {
    if let Some(installed) = installer.check_installed_driver(version).await? {
        info!(%version, root = %installed.root.display(), "driver found in cache");
        return Ok(installed);
    }
    let download = installer.download_driver(version).await?;
    installer
        .install_driver(&download.version, &download.archive)
        .await
}
