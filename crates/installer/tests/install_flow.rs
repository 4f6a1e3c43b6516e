//! End-to-end install flows against a mock download server.

use std::io::Write;
use std::path::{Path, PathBuf};

use chromeup_cache::ToolCache;
use chromeup_core::platform::{Arch, Os, Platform};
use chromeup_installer::{
    ChannelInstaller, InstallerOptions, KnownGoodVersionInstaller, LatestInstaller,
    SnapshotInstaller, install_browser, install_driver,
};
use chromeup_resolver::{KnownGoodVersionResolver, LastKnownGoodVersionResolver, SnapshotBucket};
use tempfile::TempDir;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zip::write::SimpleFileOptions;

fn linux() -> Platform {
    Platform::new(Os::Linux, Arch::Amd64)
}

/// Build an in-memory zip with the given entries.
fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for (name, content) in entries {
        writer
            .start_file(*name, SimpleFileOptions::default().unix_permissions(0o755))
            .unwrap();
        writer.write_all(content).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

fn marker_for(dir: &Path) -> PathBuf {
    let mut os_string = dir.as_os_str().to_os_string();
    os_string.push(".complete");
    PathBuf::from(os_string)
}

fn known_good_manifest(server_uri: &str) -> String {
    format!(
        r#"{{
            "timestamp": "2023-11-15T00:09:52.665Z",
            "versions": [
                {{
                    "version": "119.0.6045.100",
                    "revision": "1204232",
                    "downloads": {{
                        "chrome": [
                            {{"platform": "linux64", "url": "{server_uri}/chrome.zip"}}
                        ],
                        "chromedriver": [
                            {{"platform": "linux64", "url": "{server_uri}/driver.zip"}}
                        ]
                    }}
                }}
            ]
        }}"#
    )
}

#[tokio::test]
async fn known_good_browser_and_driver_flow() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/manifest.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(known_good_manifest(&server.uri()), "application/json"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/chrome.zip"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(zip_bytes(&[
            ("chrome-linux64/chrome", b"chrome binary"),
            ("chrome-linux64/product_logo_48.png", b"logo"),
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/driver.zip"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(zip_bytes(&[(
            "chromedriver-linux64/chromedriver",
            b"driver binary",
        )])))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let cache = ToolCache::new(temp.path());
    let installer = KnownGoodVersionInstaller::new(
        linux(),
        cache,
        &InstallerOptions::default(),
    )
    .unwrap()
    .with_resolver(
        KnownGoodVersionResolver::new(linux())
            .unwrap()
            .with_manifest_url(format!("{}/manifest.json", server.uri())),
    );

    // The partial spec installs under the resolved concrete version.
    let browser = install_browser(&installer, "119").await.unwrap();
    let expected_root = temp
        .path()
        .join("chrome")
        .join("119.0.6045.100")
        .join("x64");
    assert_eq!(browser.root, expected_root);
    assert_eq!(browser.bin, Path::new("chrome"));
    assert_eq!(
        std::fs::read(browser.bin_path()).unwrap(),
        b"chrome binary"
    );
    assert!(marker_for(&expected_root).is_file());

    let driver = install_driver(&installer, "119").await.unwrap();
    assert_eq!(
        driver.root,
        temp.path()
            .join("chromedriver")
            .join("119.0.6045.100")
            .join("x64")
    );
    assert_eq!(std::fs::read(driver.bin_path()).unwrap(), b"driver binary");

    // A second install is served from the cache: no further archive
    // downloads, and the manifest was fetched only once.
    let requests_before = server.received_requests().await.unwrap().len();
    let again = install_browser(&installer, "119").await.unwrap();
    assert_eq!(again.root, browser.root);
    assert_eq!(
        server.received_requests().await.unwrap().len(),
        requests_before
    );
}

#[tokio::test]
async fn snapshot_browser_flow() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex("chrome-linux"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(zip_bytes(&[(
            "chrome-linux/chrome",
            b"chromium binary",
        )])))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let installer = SnapshotInstaller::new(linux(), ToolCache::new(temp.path()))
        .unwrap()
        .with_bucket(
            SnapshotBucket::new(linux())
                .unwrap()
                .with_base_url(server.uri()),
        );

    let browser = install_browser(&installer, "123456").await.unwrap();
    assert_eq!(
        browser.root,
        temp.path().join("chrome").join("123456").join("x64")
    );
    assert_eq!(
        std::fs::read(browser.root.join("chrome")).unwrap(),
        b"chromium binary"
    );
}

#[tokio::test]
async fn latest_flow_caches_under_the_alias() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex("LAST_CHANGE"))
        .respond_with(ResponseTemplate::new(200).set_body_string("1217362"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex("chrome-linux"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(zip_bytes(&[(
            "chrome-linux/chrome",
            b"chromium binary",
        )])))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let bucket = || {
        SnapshotBucket::new(linux())
            .unwrap()
            .with_base_url(server.uri())
    };
    let installer = LatestInstaller::new(linux(), ToolCache::new(temp.path()))
        .unwrap()
        .with_bucket(bucket(), bucket());

    let browser = install_browser(&installer, "latest").await.unwrap();
    assert_eq!(
        browser.root,
        temp.path().join("chrome").join("latest").join("x64")
    );

    // The alias entry satisfies the next `latest` lookup directly.
    let requests_before = server.received_requests().await.unwrap().len();
    install_browser(&installer, "latest").await.unwrap();
    assert_eq!(
        server.received_requests().await.unwrap().len(),
        requests_before
    );
}

#[tokio::test]
async fn channel_flow_caches_under_the_channel_name() {
    let server = MockServer::start().await;
    let manifest = format!(
        r#"{{
            "timestamp": "2023-11-15T00:09:58.846Z",
            "channels": {{
                "Stable": {{
                    "channel": "Stable",
                    "version": "119.0.6045.123",
                    "revision": "1204232",
                    "downloads": {{
                        "chrome": [{{"platform": "linux64", "url": "{uri}/chrome.zip"}}],
                        "chromedriver": [{{"platform": "linux64", "url": "{uri}/driver.zip"}}]
                    }}
                }},
                "Beta": {{
                    "channel": "Beta", "version": "120.0.6099.5", "revision": "1217362",
                    "downloads": {{"chrome": [], "chromedriver": []}}
                }},
                "Dev": {{
                    "channel": "Dev", "version": "121.0.6116.0", "revision": "1222624",
                    "downloads": {{"chrome": [], "chromedriver": []}}
                }},
                "Canary": {{
                    "channel": "Canary", "version": "121.0.6128.0", "revision": "1226013",
                    "downloads": {{"chrome": [], "chromedriver": []}}
                }}
            }}
        }}"#,
        uri = server.uri()
    );
    Mock::given(method("GET"))
        .and(path("/manifest.json"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(manifest, "application/json"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/chrome.zip"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(zip_bytes(&[(
            "chrome-linux64/chrome",
            b"stable chrome",
        )])))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let installer = ChannelInstaller::new(linux(), ToolCache::new(temp.path()))
        .unwrap()
        .with_resolver(
            LastKnownGoodVersionResolver::new(linux())
                .unwrap()
                .with_manifest_url(format!("{}/manifest.json", server.uri())),
        );

    let browser = install_browser(&installer, "stable").await.unwrap();
    assert_eq!(
        browser.root,
        temp.path().join("chrome").join("stable").join("x64")
    );
    assert_eq!(
        std::fs::read(browser.root.join("chrome")).unwrap(),
        b"stable chrome"
    );

    // A channel with no published build for the platform is a hard error
    // naming the request.
    let err = install_browser(&installer, "dev").await.unwrap_err();
    assert!(err.to_string().contains("dev"));
    assert!(err.to_string().contains("linux-x64"));
}
