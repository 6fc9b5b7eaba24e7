//! Failure causes of a download task.

use std::path::PathBuf;

use thiserror::Error;

/// Why a download did not produce a file.
///
/// Constructed through the helper methods so every variant carries the URL
/// or path it concerns; there are no blanket `From` conversions.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// DNS, connection, TLS or body-stream failure.
    #[error("network error downloading {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("timeout downloading {url}")]
    Timeout { url: String },

    /// Non-success HTTP response.
    #[error("HTTP {status} downloading {url}")]
    HttpStatus { url: String, status: u16 },

    /// Creating, writing or renaming a file failed.
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The link is not a URL this client can fetch.
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },
}

impl DownloadError {
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// True for failures of the transport rather than the local disk.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Network { .. } | Self::Timeout { .. } | Self::HttpStatus { .. }
        )
    }
}
