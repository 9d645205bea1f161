//! Error types for image downloads.
//!
//! Every variant carries the URL or path it concerns; the fetcher records
//! the message per task and moves on to the next one.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that fail a single image task or card plan.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error downloading {url}: {source}")]
    Network {
        /// The URL that failed to download.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout downloading {url}\n  Suggestion: Raise --timeout or retry later")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// Image host answered with a non-success status.
    #[error("HTTP {status} downloading {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// File system error while writing the image.
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The image URL is malformed.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },

    /// The printing has no image in the requested size.
    #[error("no '{size}' image for {card}\n  Suggestion: Try another --size")]
    MissingImage {
        /// Card label as shown in the summary.
        card: String,
        /// Requested size keyword.
        size: String,
    },

    /// The image client could not be constructed.
    #[error("failed to build image client: {reason}")]
    ClientBuild {
        /// Builder message.
        reason: String,
    },
}

impl DownloadError {
    /// Creates a network or timeout error from a reqwest error.
    pub fn from_reqwest(url: impl Into<String>, source: reqwest::Error) -> Self {
        let url = url.into();
        if source.is_timeout() {
            Self::Timeout { url }
        } else {
            Self::Network { url, source }
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates a missing-image error.
    pub fn missing_image(card: impl Into<String>, size: impl ToString) -> Self {
        Self::MissingImage {
            card: card.into(),
            size: size.to_string(),
        }
    }

    /// Creates a client construction error.
    pub fn client_build(reason: impl ToString) -> Self {
        Self::ClientBuild {
            reason: reason.to_string(),
        }
    }
}
