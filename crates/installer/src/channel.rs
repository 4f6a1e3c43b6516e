//! Installer for release channels, backed by the last-known-good manifest.

use async_trait::async_trait;
use reqwest::Client;
use std::path::{Path, PathBuf};
use tracing::info;

use chromeup_cache::ToolCache;
use chromeup_core::platform::Platform;
use chromeup_core::version::{Channel, VersionSpec};
use chromeup_resolver::{LastKnownGoodVersionResolver, platform_string};

use crate::download::{fetch, http_client};
use crate::extract::extract_zip;
use crate::layout;
use crate::{BROWSER_TOOL, DRIVER_TOOL, DownloadResult, Error, InstallResult, Installer, Result};

/// Installs a channel's current Chrome for Testing build.
///
/// A channel is a moving target, so the cache key is the channel name
/// itself: a job asking for `canary` accepts the cached canary, and the
/// entry is replaced wholesale whenever the download path runs.
pub struct ChannelInstaller {
    platform: Platform,
    platform_string: &'static str,
    cache: ToolCache,
    resolver: LastKnownGoodVersionResolver,
    client: Client,
}

impl ChannelInstaller {
    /// Create a channel installer.
    ///
    /// # Errors
    ///
    /// Fails when Chrome for Testing publishes nothing for the platform.
    pub fn new(platform: Platform, cache: ToolCache) -> Result<Self> {
        Ok(Self {
            platform,
            platform_string: platform_string(platform)?,
            cache,
            resolver: LastKnownGoodVersionResolver::new(platform)?,
            client: http_client(),
        })
    }

    /// Replace the manifest resolver (tests).
    #[must_use]
    pub fn with_resolver(mut self, resolver: LastKnownGoodVersionResolver) -> Self {
        self.resolver = resolver;
        self
    }

    fn parse_channel(&self, version: &str) -> Result<Channel> {
        match VersionSpec::parse(version)? {
            VersionSpec::Channel(channel) => Ok(channel),
            _ => Err(chromeup_core::Error::invalid_version(version).into()),
        }
    }
}

#[async_trait]
impl Installer for ChannelInstaller {
    fn name(&self) -> &'static str {
        "channel"
    }

    async fn check_installed_browser(&self, version: &str) -> Result<Option<InstallResult>> {
        let root = self.cache.find(BROWSER_TOOL, version, self.platform.arch)?;
        Ok(root.map(|root| InstallResult {
            root,
            bin: PathBuf::from(layout::testing_browser_bin(self.platform.os)),
        }))
    }

    async fn download_browser(&self, version: &str) -> Result<DownloadResult> {
        let channel = self.parse_channel(version)?;
        let resolved = self
            .resolver
            .resolve_browser(channel)
            .await?
            .ok_or_else(|| Error::version_not_found(version, self.platform))?;
        info!(%channel, resolved = %resolved.version, url = %resolved.browser_url, "acquiring chrome");
        let archive = fetch(&self.client, &resolved.browser_url).await?;
        Ok(DownloadResult {
            version: version.to_string(),
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
        let channel = self.parse_channel(version)?;
        let resolved = self
            .resolver
            .resolve_browser_and_driver(channel)
            .await?
            .and_then(|resolved| resolved.driver_url)
            .ok_or_else(|| Error::version_not_found(version, self.platform))?;
        info!(%channel, url = %resolved, "acquiring chromedriver");
        let archive = fetch(&self.client, &resolved).await?;
        Ok(DownloadResult {
            version: version.to_string(),
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
