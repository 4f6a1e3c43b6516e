//! Installers backed by the Chromium snapshot bucket.

use async_trait::async_trait;
use reqwest::Client;
use std::path::{Path, PathBuf};
use tracing::info;

use chromeup_cache::ToolCache;
use chromeup_core::platform::Platform;
use chromeup_resolver::SnapshotBucket;

use crate::download::{fetch, http_client};
use crate::extract::extract_zip;
use crate::layout;
use crate::{BROWSER_TOOL, DRIVER_TOOL, DownloadResult, InstallResult, Installer, Result};

fn parse_build(version: &str) -> Result<u32> {
    version
        .parse()
        .map_err(|_| chromeup_core::Error::invalid_version(version).into())
}

/// Installs Chromium continuous builds addressed by snapshot build number.
pub struct SnapshotInstaller {
    platform: Platform,
    cache: ToolCache,
    bucket: SnapshotBucket,
    client: Client,
}

impl SnapshotInstaller {
    /// Create a snapshot installer.
    ///
    /// # Errors
    ///
    /// Fails when the snapshot bucket carries nothing for the platform.
    pub fn new(platform: Platform, cache: ToolCache) -> Result<Self> {
        Ok(Self {
            platform,
            cache,
            bucket: SnapshotBucket::new(platform)?,
            client: http_client(),
        })
    }

    /// Replace the snapshot bucket client (tests).
    #[must_use]
    pub fn with_bucket(mut self, bucket: SnapshotBucket) -> Self {
        self.bucket = bucket;
        self
    }
}

#[async_trait]
impl Installer for SnapshotInstaller {
    fn name(&self) -> &'static str {
        "snapshot"
    }

    async fn check_installed_browser(&self, version: &str) -> Result<Option<InstallResult>> {
        let root = self.cache.find(BROWSER_TOOL, version, self.platform.arch)?;
        Ok(root.map(|root| InstallResult {
            root,
            bin: PathBuf::from(layout::snapshot_browser_bin(self.platform.os)),
        }))
    }

    async fn download_browser(&self, version: &str) -> Result<DownloadResult> {
        let build = parse_build(version)?;
        let url = self.bucket.browser_url(build);
        info!(%version, %url, "acquiring chromium");
        let archive = fetch(&self.client, &url).await?;
        Ok(DownloadResult {
            version: version.to_string(),
            archive,
        })
    }

    async fn install_browser(&self, version: &str, archive: &Path) -> Result<InstallResult> {
        let extracted = extract_zip(archive)?;
        let root = extracted
            .path()
            .join(layout::snapshot_browser_root(self.platform.os));
        let root = self
            .cache
            .store(&root, BROWSER_TOOL, version, self.platform.arch)?;
        info!(%version, root = %root.display(), "installed chromium");
        Ok(InstallResult {
            root,
            bin: PathBuf::from(layout::snapshot_browser_bin(self.platform.os)),
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
        let build = parse_build(version)?;
        let url = self.bucket.driver_url(build);
        info!(%version, %url, "acquiring chromedriver");
        let archive = fetch(&self.client, &url).await?;
        Ok(DownloadResult {
            version: version.to_string(),
            archive,
        })
    }

    async fn install_driver(&self, version: &str, archive: &Path) -> Result<InstallResult> {
        let extracted = extract_zip(archive)?;
        let root = extracted
            .path()
            .join(layout::snapshot_driver_root(self.platform));
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

/// Installs the newest Chromium snapshot, cached under the `latest` alias.
///
/// The alias is the cache key on purpose: a CI job asking for `latest`
/// accepts yesterday's latest from the cache, and the entry is refreshed
/// whenever the download path runs.
pub struct LatestInstaller {
    snapshot: SnapshotInstaller,
    bucket: SnapshotBucket,
}

impl LatestInstaller {
    /// Create a latest-snapshot installer.
    ///
    /// # Errors
    ///
    /// Fails when the snapshot bucket carries nothing for the platform.
    pub fn new(platform: Platform, cache: ToolCache) -> Result<Self> {
        Ok(Self {
            snapshot: SnapshotInstaller::new(platform, cache)?,
            bucket: SnapshotBucket::new(platform)?,
        })
    }

    /// Replace both snapshot bucket clients (tests).
    #[must_use]
    pub fn with_bucket(
        mut self,
        bucket: SnapshotBucket,
        download_bucket: SnapshotBucket,
    ) -> Self {
        self.bucket = bucket;
        self.snapshot = self.snapshot.with_bucket(download_bucket);
        self
    }
}

#[async_trait]
impl Installer for LatestInstaller {
    fn name(&self) -> &'static str {
        "latest"
    }

    async fn check_installed_browser(&self, version: &str) -> Result<Option<InstallResult>> {
        self.snapshot.check_installed_browser(version).await
    }

    async fn download_browser(&self, version: &str) -> Result<DownloadResult> {
        let build = self.bucket.resolve_latest().await?;
        info!(build, "resolved latest snapshot");
        let mut download = self.snapshot.download_browser(&build.to_string()).await?;
        download.version = version.to_string();
        Ok(download)
    }

    async fn install_browser(&self, version: &str, archive: &Path) -> Result<InstallResult> {
        self.snapshot.install_browser(version, archive).await
    }

    async fn check_installed_driver(&self, version: &str) -> Result<Option<InstallResult>> {
        self.snapshot.check_installed_driver(version).await
    }

    async fn download_driver(&self, version: &str) -> Result<DownloadResult> {
        let build = self.bucket.resolve_latest().await?;
        let mut download = self.snapshot.download_driver(&build.to_string()).await?;
        download.version = version.to_string();
        Ok(download)
    }

    async fn install_driver(&self, version: &str, archive: &Path) -> Result<InstallResult> {
        self.snapshot.install_driver(version, archive).await
    }
}
