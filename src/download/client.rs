//! HTTP transport: streams a remote resource into a local file.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument};
use url::Url;

use super::constants::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
use super::error::DownloadError;
use crate::user_agent;

/// Response metadata of a completed fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedResource {
    /// URL after redirects.
    pub final_url: Url,
    /// Raw `Content-Type` header, parameters included.
    pub content_type: Option<String>,
    /// Raw `Content-Disposition` header.
    pub content_disposition: Option<String>,
    pub bytes_written: u64,
}

/// GET capability injected into the download task.
#[async_trait]
pub trait UrlFetcher: Send + Sync {
    /// Fetches `url` and writes the body to `destination`, truncating it.
    ///
    /// # Errors
    ///
    /// Transport failures, non-success statuses and write failures.
    async fn fetch_to_file(
        &self,
        url: &Url,
        destination: &Path,
    ) -> Result<FetchedResource, DownloadError>;
}

/// reqwest-backed fetcher. Create once and share; the inner client pools
/// connections.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient {
    /// Creates a client with the default timeouts (30 s connect, 5 min read)
    /// and gzip decoding.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    pub fn new() -> Self {
        Self::new_with_timeouts(CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS)
    }

    /// # Panics
    ///
    /// Panics if the HTTP client builder fails with the supplied timeouts.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new_with_timeouts(connect_timeout_secs: u64, read_timeout_secs: u64) -> Self {
        let client = build_client(connect_timeout_secs, read_timeout_secs)
            .expect("failed to build HTTP client with static configuration");
        Self { client }
    }

    async fn send_request(&self, url: &Url) -> Result<reqwest::Response, DownloadError> {
        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            if e.is_timeout() {
                DownloadError::timeout(url.as_str())
            } else {
                DownloadError::network(url.as_str(), e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::http_status(url.as_str(), status.as_u16()));
        }
        Ok(response)
    }
}

#[async_trait]
impl UrlFetcher for HttpClient {
    #[instrument(skip(self), fields(url = %url, destination = %destination.display()))]
    async fn fetch_to_file(
        &self,
        url: &Url,
        destination: &Path,
    ) -> Result<FetchedResource, DownloadError> {
        if !matches!(url.scheme(), "http" | "https") {
            return Err(DownloadError::invalid_url(url.as_str()));
        }
        debug!("starting fetch");

        let response = self.send_request(url).await?;
        let final_url = response.url().clone();
        let content_type = header_string(&response, CONTENT_TYPE.as_str());
        let content_disposition = header_string(&response, CONTENT_DISPOSITION.as_str());

        let mut file = File::create(destination)
            .await
            .map_err(|e| DownloadError::io(destination, e))?;
        let bytes_written = stream_to_file(&mut file, response, url, destination).await?;

        info!(
            bytes = bytes_written,
            content_type = ?content_type,
            final_url = %final_url,
            "fetch complete"
        );
        Ok(FetchedResource {
            final_url,
            content_type,
            content_disposition,
            bytes_written,
        })
    }
}

fn header_string(response: &reqwest::Response, name: &str) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Streams the response body into `file`, returning bytes written.
async fn stream_to_file(
    file: &mut File,
    response: reqwest::Response,
    url: &Url,
    file_path: &Path,
) -> Result<u64, DownloadError> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| {
            if e.is_timeout() {
                DownloadError::timeout(url.as_str())
            } else {
                DownloadError::network(url.as_str(), e)
            }
        })?;
        writer
            .write_all(&chunk)
            .await
            .map_err(|e| DownloadError::io(file_path, e))?;
        bytes_written += chunk.len() as u64;
    }

    writer
        .flush()
        .await
        .map_err(|e| DownloadError::io(file_path, e))?;
    Ok(bytes_written)
}

fn build_client(connect_timeout_secs: u64, read_timeout_secs: u64) -> Result<Client, reqwest::Error> {
    Client::builder()
        .connect_timeout(Duration::from_secs(connect_timeout_secs))
        .timeout(Duration::from_secs(read_timeout_secs))
        .gzip(true)
        .user_agent(user_agent::default_user_agent())
        .build()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_support::socket_guard::start_mock_server_or_skip;
    use tempfile::TempDir;
    use wiremock::matchers::{header_exists, method, path};
    use wiremock::{Mock, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_writes_body_and_reports_headers() {
        let Some(mock_server) = start_mock_server_or_skip().await else {
            return;
        };
        Mock::given(method("GET"))
            .and(path("/paper.pdf"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(b"%PDF-1.4 body".to_vec())
                    .insert_header("Content-Type", "application/pdf")
                    .insert_header("Content-Disposition", "attachment; filename=\"x.pdf\""),
            )
            .mount(&mock_server)
            .await;

        let temp_dir = TempDir::new().unwrap();
        let destination = temp_dir.path().join("body.part");
        let url = Url::parse(&format!("{}/paper.pdf", mock_server.uri())).unwrap();

        let fetched = HttpClient::new()
            .fetch_to_file(&url, &destination)
            .await
            .unwrap();

        assert_eq!(std::fs::read(&destination).unwrap(), b"%PDF-1.4 body");
        assert_eq!(fetched.bytes_written, 13);
        assert_eq!(fetched.content_type.as_deref(), Some("application/pdf"));
        assert_eq!(
            fetched.content_disposition.as_deref(),
            Some("attachment; filename=\"x.pdf\"")
        );
        assert_eq!(fetched.final_url, url);
    }

    #[tokio::test]
    async fn test_fetch_maps_error_status() {
        let Some(mock_server) = start_mock_server_or_skip().await else {
            return;
        };
        Mock::given(method("GET"))
            .and(path("/missing.pdf"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let temp_dir = TempDir::new().unwrap();
        let destination = temp_dir.path().join("body.part");
        let url = Url::parse(&format!("{}/missing.pdf", mock_server.uri())).unwrap();

        let error = HttpClient::new()
            .fetch_to_file(&url, &destination)
            .await
            .unwrap_err();

        assert!(matches!(error, DownloadError::HttpStatus { status: 404, .. }));
        assert!(!destination.exists(), "no file is created for error statuses");
    }

    #[tokio::test]
    async fn test_fetch_sends_identifying_user_agent() {
        let Some(mock_server) = start_mock_server_or_skip().await else {
            return;
        };
        Mock::given(method("GET"))
            .and(header_exists("user-agent"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let temp_dir = TempDir::new().unwrap();
        let url = Url::parse(&format!("{}/any", mock_server.uri())).unwrap();
        HttpClient::new()
            .fetch_to_file(&url, &temp_dir.path().join("body.part"))
            .await
            .unwrap();
    }

    #[test]
    fn test_fetch_rejects_unsupported_scheme() {
        let temp_dir = TempDir::new().unwrap();
        let url = Url::parse("ftp://example.org/paper.pdf").unwrap();
        let client = HttpClient::new();
        let destination = temp_dir.path().join("body.part");
        let result = tokio_test::block_on(client.fetch_to_file(&url, &destination));
        assert!(matches!(result, Err(DownloadError::InvalidUrl { .. })));
        assert!(!destination.exists());
    }

    #[tokio::test]
    async fn test_fetch_connection_refused_is_network_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0");
        let Ok(listener) = listener else {
            return;
        };
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let temp_dir = TempDir::new().unwrap();
        let url = Url::parse(&format!("http://127.0.0.1:{port}/paper.pdf")).unwrap();
        let error = HttpClient::new_with_timeouts(2, 5)
            .fetch_to_file(&url, &temp_dir.path().join("body.part"))
            .await
            .unwrap_err();
        assert!(error.is_transport(), "unexpected error: {error}");
    }
}
