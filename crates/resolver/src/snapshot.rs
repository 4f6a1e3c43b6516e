//! Chromium snapshot bucket lookups.
//!
//! Continuous Chromium builds live in the `chromium-browser-snapshots` GCS
//! bucket, one object per (platform, build number, archive). The bucket also
//! stores a `LAST_CHANGE` object per platform holding the newest build
//! number, which is what the `latest` alias resolves to.

use reqwest::Client;
use tracing::debug;

use chromeup_core::platform::{Arch, Os, Platform};

use crate::chrome_for_testing::http_client;
use crate::{Error, Result};

const BUCKET_URL: &str =
    "https://www.googleapis.com/download/storage/v1/b/chromium-browser-snapshots/o";

/// Path prefix inside the snapshot bucket for a platform.
///
/// # Errors
///
/// Returns [`chromeup_core::Error::UnsupportedPlatform`] for combinations
/// the bucket does not carry (Linux arm, macOS 32-bit).
pub fn platform_prefix(platform: Platform) -> chromeup_core::Result<&'static str> {
    match (platform.os, platform.arch) {
        (Os::Darwin, Arch::Amd64) => Ok("Mac"),
        (Os::Darwin, Arch::Arm64) => Ok("Mac_Arm"),
        (Os::Linux, Arch::I686) => Ok("Linux"),
        (Os::Linux, Arch::Amd64) => Ok("Linux_x64"),
        (Os::Windows, Arch::I686) => Ok("Win"),
        (Os::Windows, Arch::Amd64) => Ok("Win_x64"),
        (Os::Windows, Arch::Arm64) => Ok("Win_Arm64"),
        (os, arch) => Err(chromeup_core::Error::unsupported_platform(os, arch)),
    }
}

fn browser_basename(os: Os) -> &'static str {
    match os {
        Os::Darwin => "chrome-mac.zip",
        Os::Linux => "chrome-linux.zip",
        Os::Windows => "chrome-win.zip",
    }
}

fn driver_basename(platform: Platform) -> &'static str {
    match platform.os {
        Os::Darwin => "chromedriver_mac64.zip",
        Os::Linux => "chromedriver_linux64.zip",
        Os::Windows => {
            if platform.arch == Arch::Arm64 {
                "chromedriver_win64.zip"
            } else {
                "chromedriver_win32.zip"
            }
        }
    }
}

/// Snapshot bucket client for one target platform.
pub struct SnapshotBucket {
    client: Client,
    base_url: String,
    prefix: &'static str,
    platform: Platform,
}

impl SnapshotBucket {
    /// Create a bucket client for a target platform.
    ///
    /// # Errors
    ///
    /// Returns an error when the bucket carries nothing for the platform.
    pub fn new(platform: Platform) -> Result<Self> {
        Ok(Self {
            client: http_client(),
            base_url: BUCKET_URL.to_string(),
            prefix: platform_prefix(platform)?,
            platform,
        })
    }

    /// Override the bucket URL (tests).
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Media-download URL for an object. The object name embeds `/` as
    /// `%2F`, the bucket API's path convention.
    fn object_url(&self, object: &str) -> String {
        format!(
            "{}/{}%2F{}?alt=media",
            self.base_url, self.prefix, object
        )
    }

    /// Download URL for a build's browser archive.
    #[must_use]
    pub fn browser_url(&self, build: u32) -> String {
        self.object_url(&format!("{build}%2F{}", browser_basename(self.platform.os)))
    }

    /// Download URL for a build's driver archive.
    #[must_use]
    pub fn driver_url(&self, build: u32) -> String {
        self.object_url(&format!("{build}%2F{}", driver_basename(self.platform)))
    }

    /// Resolve the `latest` alias to the newest build number for this
    /// platform.
    ///
    /// # Errors
    ///
    /// Fails on HTTP errors or a non-numeric `LAST_CHANGE` body.
    pub async fn resolve_latest(&self) -> Result<u32> {
        let url = self.object_url("LAST_CHANGE");
        debug!(%url, "resolving latest snapshot build");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| Error::Http {
                source,
                url: url.clone(),
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::UnexpectedStatus {
                url,
                status: status.as_u16(),
            });
        }
        let body = response.text().await.map_err(|source| Error::Http {
            source,
            url: url.clone(),
        })?;
        body.trim()
            .parse()
            .map_err(|_| chromeup_core::Error::invalid_version(body.trim()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_platform_prefix() {
        let cases = [
            (Os::Darwin, Arch::Amd64, "Mac"),
            (Os::Darwin, Arch::Arm64, "Mac_Arm"),
            (Os::Linux, Arch::I686, "Linux"),
            (Os::Linux, Arch::Amd64, "Linux_x64"),
            (Os::Windows, Arch::I686, "Win"),
            (Os::Windows, Arch::Amd64, "Win_x64"),
            (Os::Windows, Arch::Arm64, "Win_Arm64"),
        ];
        for (os, arch, expected) in cases {
            assert_eq!(
                platform_prefix(Platform::new(os, arch)).unwrap(),
                expected
            );
        }
        assert!(platform_prefix(Platform::new(Os::Linux, Arch::Arm64)).is_err());
    }

    #[test]
    fn test_download_urls() {
        let bucket = SnapshotBucket::new(Platform::new(Os::Linux, Arch::Amd64)).unwrap();
        assert_eq!(
            bucket.browser_url(123456),
            "https://www.googleapis.com/download/storage/v1/b/chromium-browser-snapshots/o/Linux_x64%2F123456%2Fchrome-linux.zip?alt=media"
        );
        assert_eq!(
            bucket.driver_url(123456),
            "https://www.googleapis.com/download/storage/v1/b/chromium-browser-snapshots/o/Linux_x64%2F123456%2Fchromedriver_linux64.zip?alt=media"
        );
    }

    #[test]
    fn test_windows_driver_archive_depends_on_arch() {
        let x64 = SnapshotBucket::new(Platform::new(Os::Windows, Arch::Amd64)).unwrap();
        assert!(x64.driver_url(1).contains("chromedriver_win32.zip"));
        let arm = SnapshotBucket::new(Platform::new(Os::Windows, Arch::Arm64)).unwrap();
        assert!(arm.driver_url(1).contains("chromedriver_win64.zip"));
    }

    #[tokio::test]
    async fn test_resolve_latest() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("alt", "media"))
            .respond_with(ResponseTemplate::new(200).set_body_string("1217362\n"))
            .mount(&server)
            .await;

        let bucket = SnapshotBucket::new(Platform::new(Os::Linux, Arch::Amd64))
            .unwrap()
            .with_base_url(server.uri());
        assert_eq!(bucket.resolve_latest().await.unwrap(), 1217362);
    }

    #[tokio::test]
    async fn test_resolve_latest_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let bucket = SnapshotBucket::new(Platform::new(Os::Linux, Arch::Amd64))
            .unwrap()
            .with_base_url(server.uri());
        assert!(matches!(
            bucket.resolve_latest().await,
            Err(Error::UnexpectedStatus { status: 404, .. })
        ));
    }
}
