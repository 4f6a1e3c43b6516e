//! Archive downloads.

use futures::StreamExt;
use reqwest::Client;
use sha2::{Digest, Sha256};
use std::io::Write;
use tempfile::TempPath;
use tracing::{debug, info};

use crate::{Error, Result};

// Builder failure requires a broken TLS backend or an invalid proxy;
// neither is configurable here.
#[allow(clippy::expect_used)]
pub(crate) fn http_client() -> Client {
    Client::builder()
        .user_agent("chromeup")
        .build()
        .expect("failed to create HTTP client")
}

/// Download a URL to a temporary file, streaming to disk.
///
/// The returned [`TempPath`] deletes the file on drop, so callers keep it
/// alive until the archive has been extracted.
///
/// # Errors
///
/// Fails on connection errors, non-success statuses, and file I/O errors.
pub async fn fetch(client: &Client, url: &str) -> Result<TempPath> {
    info!(%url, "downloading");
    let response = client.get(url).send().await.map_err(|source| Error::Download {
        source,
        url: url.to_string(),
    })?;
    let status = response.status();
    if !status.is_success() {
        return Err(Error::DownloadStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let mut file = tempfile::NamedTempFile::new()
        .map_err(|e| Error::io(e, std::env::temp_dir(), "create"))?;
    let mut hasher = Sha256::new();
    let mut bytes: u64 = 0;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|source| Error::Download {
            source,
            url: url.to_string(),
        })?;
        hasher.update(&chunk);
        file.write_all(&chunk)
            .map_err(|e| Error::io(e, file.path(), "write"))?;
        bytes += chunk.len() as u64;
    }
    file.flush().map_err(|e| Error::io(e, file.path(), "write"))?;

    let sha256 = format!("{:x}", hasher.finalize());
    debug!(%url, bytes, %sha256, "downloaded archive");

    Ok(file.into_temp_path())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_writes_body_to_temp_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/archive.zip"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"zip bytes".to_vec()))
            .mount(&server)
            .await;

        let client = http_client();
        let archive = fetch(&client, &format!("{}/archive.zip", server.uri()))
            .await
            .unwrap();
        assert_eq!(std::fs::read(&archive).unwrap(), b"zip bytes");

        let kept = archive.to_path_buf();
        drop(archive);
        assert!(!kept.exists(), "temp file should be deleted on drop");
    }

    #[tokio::test]
    async fn test_fetch_surfaces_http_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = http_client();
        let result = fetch(&client, &format!("{}/missing.zip", server.uri())).await;
        assert!(matches!(
            result,
            Err(Error::DownloadStatus { status: 404, .. })
        ));
    }
}
