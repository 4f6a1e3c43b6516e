//! Installer for four-part version specs, backed by the known-good builds
//! manifest.

use async_trait::async_trait;
use reqwest::Client;
use std::path::{Path, PathBuf};
use tracing::info;

use chromeup_cache::ToolCache;
use chromeup_core::platform::Platform;
use chromeup_core::version::VersionSpec;
use chromeup_resolver::{KnownGoodVersionResolver, ResolvedVersion, platform_string};

use crate::download::{fetch, http_client};
use crate::extract::extract_zip;
use crate::layout;
use crate::{
    BROWSER_TOOL, DRIVER_TOOL, DownloadResult, Error, InstallResult, Installer, InstallerOptions,
    Result,
};

/// Installs Chrome for Testing builds addressed by exact or partial
/// four-part versions.
///
/// A partial spec resolves to its newest known-good build, and the install
/// is cached under the resolved concrete version, so later lookups with the
/// same prefix hit the cache directly.
pub struct KnownGoodVersionInstaller {
    platform: Platform,
    platform_string: &'static str,
    cache: ToolCache,
    resolver: KnownGoodVersionResolver,
    client: Client,
    resolve_browser_version_only: bool,
}

impl KnownGoodVersionInstaller {
    /// Create a known-good-version installer.
    ///
    /// # Errors
    ///
    /// Fails when Chrome for Testing publishes nothing for the platform.
    pub fn new(platform: Platform, cache: ToolCache, options: &InstallerOptions) -> Result<Self> {
        Ok(Self {
            platform,
            platform_string: platform_string(platform)?,
            cache,
            resolver: KnownGoodVersionResolver::new(platform)?,
            client: http_client(),
            resolve_browser_version_only: options.resolve_browser_version_only,
        })
    }

    /// Replace the manifest resolver (tests).
    #[must_use]
    pub fn with_resolver(mut self, resolver: KnownGoodVersionResolver) -> Self {
        self.resolver = resolver;
        self
    }

    async fn resolve(&self, version: &str) -> Result<ResolvedVersion> {
        let spec = VersionSpec::parse(version)?;
        // When a driver install is coming later, restrict the browser to
        // builds that ship both archives so the pair stays version-aligned.
        let resolved = if self.resolve_browser_version_only {
            self.resolver.resolve_browser(&spec).await?
        } else {
            self.resolver.resolve_browser_and_driver(&spec).await?
        };
        resolved.ok_or_else(|| Error::version_not_found(version, self.platform))
    }
}

#[async_trait]
impl Installer for KnownGoodVersionInstaller {
    fn name(&self) -> &'static str {
        "known-good"
    }

    async fn check_installed_browser(&self, version: &str) -> Result<Option<InstallResult>> {
        let root = self.cache.find(BROWSER_TOOL, version, self.platform.arch)?;
        Ok(root.map(|root| InstallResult {
            root,
            bin: PathBuf::from(layout::testing_browser_bin(self.platform.os)),
        }))
    }

    async fn download_browser(&self, version: &str) -> Result<DownloadResult> {
        let resolved = self.resolve(version).await?;
        info!(requested = %version, resolved = %resolved.version, url = %resolved.browser_url, "acquiring chrome");
        let archive = fetch(&self.client, &resolved.browser_url).await?;
        Ok(DownloadResult {
            version: resolved.version,
            archive,
        })
    }

    async fn install_browser(&self, version: &str, archive: &Path) -> Result<InstallResult> {
        let extracted = extract_zip(archive)?;
        let root = extracted
            .path()
            .join(layout::testing_browser_root(self.platform_string));
        let root = self
            .cache
            .store(&root, BROWSER_TOOL, version, self.platform.arch)?;
        info!(%version, root = %root.display(), "installed chrome");
        Ok(InstallResult {
            root,
            bin: PathBuf::from(layout::testing_browser_bin(self.platform.os)),
        })
    }

    async fn check_installed_driver(&self, version: &str) -> Result<Option<InstallResult>> {
        let root = self.cache.find(DRIVER_TOOL, version, self.platform.arch)?;
        Ok(root.map(|root| InstallResult {
            root,
            bin: PathBuf::from(layout::driver_bin(self.platform.os)),
        }))
    }

    async fn download_driver(&self, version: &str) -> Result<DownloadResult> {
        let spec = VersionSpec::parse(version)?;
        let resolved = self
            .resolver
            .resolve_browser_and_driver(&spec)
            .await?
            .ok_or_else(|| Error::version_not_found(version, self.platform))?;
        // resolve_browser_and_driver always fills the driver URL.
        let Some(url) = resolved.driver_url else {
            return Err(Error::version_not_found(version, self.platform));
        };
        info!(requested = %version, resolved = %resolved.version, %url, "acquiring chromedriver");
        let archive = fetch(&self.client, &url).await?;
        Ok(DownloadResult {
            version: resolved.version,
            archive,
        })
    }

    async fn install_driver(&self, version: &str, archive: &Path) -> Result<InstallResult> {
        let extracted = extract_zip(archive)?;
        let root = extracted
            .path()
            .join(layout::testing_driver_root(self.platform_string));
        let root = self
            .cache
            .store(&root, DRIVER_TOOL, version, self.platform.arch)?;
        info!(%version, root = %root.display(), "installed chromedriver");
        Ok(InstallResult {
            root,
            bin: PathBuf::from(layout::driver_bin(self.platform.os)),
        })
    }
}
