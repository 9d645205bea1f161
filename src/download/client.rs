//! HTTP client wrapper for streaming card images to disk.
//!
//! `ImageClient` writes straight to the planned destination. When anything
//! fails after the file was created, the partial file is removed so a later
//! run does not mistake it for a finished image.

use std::path::Path;

use futures_util::StreamExt;
use reqwest::Client;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument};
use url::Url;

use super::error::DownloadError;
use crate::resolver::HttpTimeouts;
use crate::resolver::http_client::build_http_client;
use crate::user_agent;

/// HTTP client for image downloads.
///
/// Create once and reuse for every task so connections are pooled.
///
/// # Example
///
/// ```no_run
/// use card_downloader_core::download::ImageClient;
/// use card_downloader_core::resolver::HttpTimeouts;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ImageClient::new(HttpTimeouts::default())?;
/// let bytes = client
///     .download_to_path(
///         "https://cards.scryfall.io/png/front/e/3/e3285e6b.png",
///         Path::new("cards/Lightning Bolt (m11) 149.png"),
///     )
///     .await?;
/// println!("wrote {bytes} bytes");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ImageClient {
    client: Client,
}

impl ImageClient {
    /// Creates a client with the given timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::ClientBuild`] if the HTTP client cannot be built.
    pub fn new(timeouts: HttpTimeouts) -> Result<Self, DownloadError> {
        let client = build_http_client("image", &user_agent::default_image_user_agent(), timeouts)
            .map_err(DownloadError::client_build)?;
        Ok(Self { client })
    }

    /// Downloads `url` into `destination`, creating parent directories.
    ///
    /// Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` if:
    /// - The URL is invalid
    /// - The request fails (network error, timeout)
    /// - The server returns an error status (4xx, 5xx)
    /// - Writing to disk fails
    #[instrument(skip(self, destination), fields(url = %url, path = %destination.display()))]
    pub async fn download_to_path(
        &self,
        url: &str,
        destination: &Path,
    ) -> Result<u64, DownloadError> {
        debug!("starting download");
        let parsed = Url::parse(url).map_err(|_| DownloadError::invalid_url(url))?;

        if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| DownloadError::io(parent, e))?;
        }

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| DownloadError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::http_status(url, status.as_u16()));
        }

        let mut file = File::create(destination)
            .await
            .map_err(|e| DownloadError::io(destination, e))?;

        let stream_result = stream_to_file(&mut file, response, url, destination).await;
        drop(file);

        if stream_result.is_err() {
            debug!("cleaning up partial file after error");
            let _ = tokio::fs::remove_file(destination).await;
        }
        let bytes = stream_result?;

        info!(bytes, "download complete");
        Ok(bytes)
    }
}

/// Streams response body to file, returning bytes written.
async fn stream_to_file(
    file: &mut File,
    response: reqwest::Response,
    url: &str,
    path: &Path,
) -> Result<u64, DownloadError> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| DownloadError::from_reqwest(url, e))?;
        writer
            .write_all(&chunk)
            .await
            .map_err(|e| DownloadError::io(path, e))?;
        bytes_written += chunk.len() as u64;
    }

    writer.flush().await.map_err(|e| DownloadError::io(path, e))?;
    Ok(bytes_written)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::test_support::socket_guard::start_mock_server_or_skip;
    use tempfile::TempDir;
    use wiremock::matchers::{header_exists, method, path};
    use wiremock::{Mock, ResponseTemplate};

    fn client() -> ImageClient {
        ImageClient::new(HttpTimeouts::default()).unwrap()
    }

    #[tokio::test]
    async fn test_download_writes_body_and_creates_parents() {
        let Some(mock_server) = start_mock_server_or_skip().await else {
            return;
        };
        let temp_dir = TempDir::new().unwrap();

        Mock::given(method("GET"))
            .and(path("/png/front/bolt.png"))
            .and(header_exists("user-agent"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"PNG bytes"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let destination = temp_dir.path().join("m11").join("Lightning Bolt (m11) 149.png");
        let url = format!("{}/png/front/bolt.png", mock_server.uri());
        let bytes = client().download_to_path(&url, &destination).await.unwrap();

        assert_eq!(bytes, 9);
        assert_eq!(std::fs::read(&destination).unwrap(), b"PNG bytes");
    }

    #[tokio::test]
    async fn test_download_404_leaves_no_file() {
        let Some(mock_server) = start_mock_server_or_skip().await else {
            return;
        };
        let temp_dir = TempDir::new().unwrap();

        Mock::given(method("GET"))
            .and(path("/missing.png"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let destination = temp_dir.path().join("missing.png");
        let url = format!("{}/missing.png", mock_server.uri());
        let result = client().download_to_path(&url, &destination).await;

        match result {
            Err(DownloadError::HttpStatus { status, .. }) => assert_eq!(status, 404),
            other => panic!("Expected HttpStatus error, got: {other:?}"),
        }
        assert!(!destination.exists());
    }

    #[tokio::test]
    async fn test_download_timeout_is_reported_and_cleaned_up() {
        let Some(mock_server) = start_mock_server_or_skip().await else {
            return;
        };
        let temp_dir = TempDir::new().unwrap();

        Mock::given(method("GET"))
            .and(path("/slow.png"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(b"late")
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&mock_server)
            .await;

        let client = ImageClient::new(HttpTimeouts::from_request_secs(1)).unwrap();
        let destination = temp_dir.path().join("slow.png");
        let url = format!("{}/slow.png", mock_server.uri());
        let result = client.download_to_path(&url, &destination).await;

        assert!(
            matches!(result, Err(DownloadError::Timeout { .. })),
            "got {result:?}"
        );
        assert!(!destination.exists());
    }

    #[tokio::test]
    async fn test_download_invalid_url() {
        let temp_dir = TempDir::new().unwrap();
        let result = client()
            .download_to_path("not a url", &temp_dir.path().join("x.png"))
            .await;
        assert!(matches!(result, Err(DownloadError::InvalidUrl { .. })));
    }
}
