//! Error types for collection lookups.
//!
//! Messages follow the What/Why/Fix pattern used across the project.

use thiserror::Error;

/// Errors that fail a whole lookup batch.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Network-level error (DNS, connection refused, TLS)
    #[error("network error calling {url}: {source}\n  Suggestion: Check your connection and try again")]
    Network {
        /// Endpoint that failed
        url: String,
        /// Underlying network error
        #[source]
        source: reqwest::Error,
    },

    /// Request exceeded the configured timeout
    #[error("timeout calling {url}\n  Suggestion: Raise --timeout or retry later")]
    Timeout {
        /// Endpoint that timed out
        url: String,
    },

    /// Non-success response from the API
    #[error("HTTP {status} from {url}: {details}")]
    HttpStatus {
        /// Endpoint that answered
        url: String,
        /// HTTP status code
        status: u16,
        /// API error details, when the body carried any
        details: String,
    },

    /// Response body could not be decoded
    #[error("unexpected response from {url}: {reason}")]
    Decode {
        /// Endpoint that answered
        url: String,
        /// Decoder message
        reason: String,
    },

    /// HTTP client could not be constructed
    #[error("failed to build API client: {reason}")]
    ClientBuild {
        /// Builder message
        reason: String,
    },
}

impl ResolveError {
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
    pub fn http_status(url: impl Into<String>, status: u16, details: Option<String>) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
            details: details.unwrap_or_else(|| "no details".to_string()),
        }
    }

    /// Creates a decode error.
    pub fn decode(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::Decode {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Creates a client construction error.
    pub fn client_build(reason: impl ToString) -> Self {
        Self::ClientBuild {
            reason: reason.to_string(),
        }
    }
}
