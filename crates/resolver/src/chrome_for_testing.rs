//! Resolvers backed by the Chrome for Testing version manifests.
//!
//! Google publishes two JSON documents for CfT builds:
//!
//! - `known-good-versions-with-downloads.json` - every known-good build,
//!   oldest first, with per-platform download URLs.
//! - `last-known-good-versions-with-downloads.json` - one entry per release
//!   channel, pointing at that channel's current build.
//!
//! Both resolvers fetch their manifest at most once per instance; repeated
//! `resolve` calls reuse the in-memory copy.

use reqwest::Client;
use serde::Deserialize;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use chromeup_core::platform::{Arch, Os, Platform};
use chromeup_core::version::{Channel, VersionSpec};

use crate::{Error, Result};

const BASE_URL: &str = "https://googlechromelabs.github.io/chrome-for-testing";

pub(crate) const USER_AGENT: &str = "chromeup";

/// Manifest listing every known-good build.
#[derive(Debug, Clone, Deserialize)]
pub struct KnownGoodVersionsJson {
    /// Manifest generation timestamp.
    pub timestamp: String,
    /// All known-good builds, oldest first.
    pub versions: Vec<KnownGoodVersion>,
}

/// One build in the known-good manifest.
#[derive(Debug, Clone, Deserialize)]
pub struct KnownGoodVersion {
    /// Full four-part version string.
    pub version: String,
    /// Chromium base revision.
    pub revision: String,
    /// Per-platform download URLs.
    pub downloads: Downloads,
}

/// Manifest mapping each channel to its current build.
#[derive(Debug, Clone, Deserialize)]
pub struct LastKnownGoodVersionsJson {
    /// Manifest generation timestamp.
    pub timestamp: String,
    /// Per-channel builds.
    pub channels: ChannelBuilds,
}

/// The four channel entries of the last-known-good manifest.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ChannelBuilds {
    /// Stable channel build.
    pub stable: ChannelBuild,
    /// Beta channel build.
    pub beta: ChannelBuild,
    /// Dev channel build.
    pub dev: ChannelBuild,
    /// Canary channel build.
    pub canary: ChannelBuild,
}

impl ChannelBuilds {
    /// The entry for a channel.
    #[must_use]
    pub fn get(&self, channel: Channel) -> &ChannelBuild {
        match channel {
            Channel::Stable => &self.stable,
            Channel::Beta => &self.beta,
            Channel::Dev => &self.dev,
            Channel::Canary => &self.canary,
        }
    }
}

/// One channel's current build.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelBuild {
    /// Full four-part version string.
    pub version: String,
    /// Chromium base revision.
    pub revision: String,
    /// Per-platform download URLs.
    pub downloads: Downloads,
}

/// Download URL sets for one build. Either list may be absent: early builds
/// shipped no chromedriver, and new platforms appear browser-first.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Downloads {
    /// Browser archives.
    #[serde(default)]
    pub chrome: Vec<DownloadEntry>,
    /// Driver archives.
    #[serde(default)]
    pub chromedriver: Vec<DownloadEntry>,
}

/// One platform's download URL.
#[derive(Debug, Clone, Deserialize)]
pub struct DownloadEntry {
    /// CfT platform string (`linux64`, `mac-arm64`, ...).
    pub platform: String,
    /// Archive URL.
    pub url: String,
}

/// A spec resolved against a manifest: the concrete version plus where to
/// download it for the target platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVersion {
    /// The concrete four-part version.
    pub version: String,
    /// Browser archive URL.
    pub browser_url: String,
    /// Driver archive URL, when one was requested and published.
    pub driver_url: Option<String>,
}

/// Map a platform to its Chrome for Testing platform string.
///
/// # Errors
///
/// Returns [`chromeup_core::Error::UnsupportedPlatform`] for combinations
/// CfT does not publish (32-bit Linux, Linux arm).
pub fn platform_string(platform: Platform) -> chromeup_core::Result<&'static str> {
    match (platform.os, platform.arch) {
        (Os::Linux, Arch::Amd64) => Ok("linux64"),
        (Os::Darwin, Arch::Amd64) => Ok("mac-x64"),
        (Os::Darwin, Arch::Arm64) => Ok("mac-arm64"),
        (Os::Windows, Arch::Amd64) => Ok("win64"),
        (Os::Windows, Arch::I686) => Ok("win32"),
        (Os::Windows, Arch::Arm64) => Ok("win-arm64"),
        (os, arch) => Err(chromeup_core::Error::unsupported_platform(os, arch)),
    }
}

// Builder failure requires a broken TLS backend or an invalid proxy;
// neither is configurable here.
#[allow(clippy::expect_used)]
pub(crate) fn http_client() -> Client {
    Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .expect("failed to create HTTP client")
}

pub(crate) async fn fetch_json<T: serde::de::DeserializeOwned>(
    client: &Client,
    url: &str,
) -> Result<T> {
    debug!(%url, "fetching manifest");
    let response = client.get(url).send().await.map_err(|source| Error::Http {
        source,
        url: url.to_string(),
    })?;
    let status = response.status();
    if !status.is_success() {
        return Err(Error::UnexpectedStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    response.json().await.map_err(|source| Error::Manifest {
        source,
        url: url.to_string(),
    })
}

fn find_platform<'a>(entries: &'a [DownloadEntry], platform: &str) -> Option<&'a DownloadEntry> {
    entries.iter().find(|e| e.platform == platform)
}

/// Resolves version specs against the full known-good build list.
///
/// Used for four-part (exact or prefix) specs: the manifest is scanned
/// newest first, so a prefix like `119.0` resolves to its newest build that
/// actually has a download for the target platform.
pub struct KnownGoodVersionResolver {
    client: Client,
    manifest_url: String,
    platform: &'static str,
    versions: OnceCell<Vec<KnownGoodVersion>>,
}

impl KnownGoodVersionResolver {
    /// Create a resolver for a target platform.
    ///
    /// # Errors
    ///
    /// Returns an error when CfT publishes nothing for the platform.
    pub fn new(platform: Platform) -> Result<Self> {
        Ok(Self {
            client: http_client(),
            manifest_url: format!("{BASE_URL}/known-good-versions-with-downloads.json"),
            platform: platform_string(platform)?,
            versions: OnceCell::new(),
        })
    }

    /// Override the manifest URL (tests).
    #[must_use]
    pub fn with_manifest_url(mut self, url: impl Into<String>) -> Self {
        self.manifest_url = url.into();
        self
    }

    /// The CfT platform string this resolver targets.
    #[must_use]
    pub fn platform_string(&self) -> &'static str {
        self.platform
    }

    /// The known-good builds, newest first. Fetched at most once per
    /// resolver instance.
    async fn versions(&self) -> Result<&[KnownGoodVersion]> {
        let versions = self
            .versions
            .get_or_try_init(|| async {
                let mut manifest: KnownGoodVersionsJson =
                    fetch_json(&self.client, &self.manifest_url).await?;
                // The manifest lists builds oldest first; a partial spec
                // must resolve to its newest matching build.
                manifest.versions.reverse();
                info!(count = manifest.versions.len(), "loaded known-good versions");
                Ok::<_, Error>(manifest.versions)
            })
            .await?;
        Ok(versions)
    }

    /// Resolve to the newest build satisfying `spec` that publishes a
    /// browser archive for this platform. `Ok(None)` when no build matches.
    pub async fn resolve_browser(&self, spec: &VersionSpec) -> Result<Option<ResolvedVersion>> {
        for entry in self.versions().await? {
            if !spec.satisfies_str(&entry.version) {
                continue;
            }
            if let Some(browser) = find_platform(&entry.downloads.chrome, self.platform) {
                debug!(version = %entry.version, "resolved browser");
                return Ok(Some(ResolvedVersion {
                    version: entry.version.clone(),
                    browser_url: browser.url.clone(),
                    driver_url: None,
                }));
            }
        }
        Ok(None)
    }

    /// Resolve to the newest build satisfying `spec` that publishes both a
    /// browser and a driver archive for this platform.
    pub async fn resolve_browser_and_driver(
        &self,
        spec: &VersionSpec,
    ) -> Result<Option<ResolvedVersion>> {
        for entry in self.versions().await? {
            if !spec.satisfies_str(&entry.version) {
                continue;
            }
            let browser = find_platform(&entry.downloads.chrome, self.platform);
            let driver = find_platform(&entry.downloads.chromedriver, self.platform);
            if let (Some(browser), Some(driver)) = (browser, driver) {
                debug!(version = %entry.version, "resolved browser and driver");
                return Ok(Some(ResolvedVersion {
                    version: entry.version.clone(),
                    browser_url: browser.url.clone(),
                    driver_url: Some(driver.url.clone()),
                }));
            }
        }
        Ok(None)
    }
}

/// Resolves release channels against the last-known-good manifest.
pub struct LastKnownGoodVersionResolver {
    client: Client,
    manifest_url: String,
    platform: &'static str,
    channels: OnceCell<ChannelBuilds>,
}

impl LastKnownGoodVersionResolver {
    /// Create a resolver for a target platform.
    ///
    /// # Errors
    ///
    /// Returns an error when CfT publishes nothing for the platform.
    pub fn new(platform: Platform) -> Result<Self> {
        Ok(Self {
            client: http_client(),
            manifest_url: format!("{BASE_URL}/last-known-good-versions-with-downloads.json"),
            platform: platform_string(platform)?,
            channels: OnceCell::new(),
        })
    }

    /// Override the manifest URL (tests).
    #[must_use]
    pub fn with_manifest_url(mut self, url: impl Into<String>) -> Self {
        self.manifest_url = url.into();
        self
    }

    /// The CfT platform string this resolver targets.
    #[must_use]
    pub fn platform_string(&self) -> &'static str {
        self.platform
    }

    async fn channels(&self) -> Result<&ChannelBuilds> {
        self.channels
            .get_or_try_init(|| async {
                let manifest: LastKnownGoodVersionsJson =
                    fetch_json(&self.client, &self.manifest_url).await?;
                Ok(manifest.channels)
            })
            .await
    }

    /// Resolve a channel's current build when it publishes a browser
    /// archive for this platform.
    pub async fn resolve_browser(&self, channel: Channel) -> Result<Option<ResolvedVersion>> {
        let build = self.channels().await?.get(channel);
        let browser = find_platform(&build.downloads.chrome, self.platform);
        Ok(browser.map(|browser| ResolvedVersion {
            version: build.version.clone(),
            browser_url: browser.url.clone(),
            driver_url: None,
        }))
    }

    /// Resolve a channel's current build when it publishes both browser and
    /// driver archives for this platform.
    pub async fn resolve_browser_and_driver(
        &self,
        channel: Channel,
    ) -> Result<Option<ResolvedVersion>> {
        let build = self.channels().await?.get(channel);
        let browser = find_platform(&build.downloads.chrome, self.platform);
        let driver = find_platform(&build.downloads.chromedriver, self.platform);
        match (browser, driver) {
            (Some(browser), Some(driver)) => Ok(Some(ResolvedVersion {
                version: build.version.clone(),
                browser_url: browser.url.clone(),
                driver_url: Some(driver.url.clone()),
            })),
            _ => Ok(None),
        }
    }
}
