//! Shared HTTP client construction policy.
//!
//! Both the collection API client and the image client are built here so
//! they agree on timeouts, compression, and proxy handling.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use reqwest::{Client, ClientBuilder, Proxy};
use tracing::warn;

/// Default connect timeout (10 seconds).
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default total request timeout (30 seconds).
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Connect and total timeouts applied to every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    /// Maximum time to establish a connection
    pub connect: Duration,
    /// Maximum time for the whole request, body included
    pub request: Duration,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self::from_request_secs(DEFAULT_REQUEST_TIMEOUT_SECS)
    }
}

impl HttpTimeouts {
    /// Builds timeouts from a total budget; the connect timeout never exceeds it.
    #[must_use]
    pub fn from_request_secs(request_secs: u64) -> Self {
        let request_secs = request_secs.max(1);
        Self {
            connect: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS.min(request_secs)),
            request: Duration::from_secs(request_secs),
        }
    }
}

/// Builds an HTTP client with the shared policy.
///
/// Some sandboxed environments panic when reqwest queries system proxy
/// settings; in that case the client is rebuilt with env-var proxies only.
///
/// # Errors
///
/// Returns the builder error message when construction fails.
pub(crate) fn build_http_client(
    purpose: &str,
    user_agent: &str,
    timeouts: HttpTimeouts,
) -> Result<Client, String> {
    match try_build_client(user_agent, timeouts, false) {
        Ok(client) => Ok(client),
        Err(BuildClientFailure::Panic) => {
            warn!(
                client = purpose,
                "HTTP client hit system proxy panic; using env-proxy fallback builder"
            );
            match try_build_client(user_agent, timeouts, true) {
                Ok(client) => Ok(client),
                Err(BuildClientFailure::Panic) => {
                    Err("HTTP client construction panicked while loading proxy settings".to_string())
                }
                Err(BuildClientFailure::Build(error)) => {
                    Err(format!("HTTP client construction failed: {error}"))
                }
            }
        }
        Err(BuildClientFailure::Build(error)) => {
            Err(format!("HTTP client construction failed: {error}"))
        }
    }
}

enum BuildClientFailure {
    Panic,
    Build(reqwest::Error),
}

fn try_build_client(
    user_agent: &str,
    timeouts: HttpTimeouts,
    disable_system_proxy_lookup: bool,
) -> Result<Client, BuildClientFailure> {
    let user_agent = user_agent.to_string();
    catch_unwind(AssertUnwindSafe(move || {
        let mut builder = base_builder(user_agent, timeouts);
        if disable_system_proxy_lookup {
            builder = apply_env_proxy_fallback(builder.no_proxy());
        }
        builder.build().map_err(BuildClientFailure::Build)
    }))
    .map_err(|_| BuildClientFailure::Panic)?
}

fn base_builder(user_agent: String, timeouts: HttpTimeouts) -> ClientBuilder {
    Client::builder()
        .connect_timeout(timeouts.connect)
        .timeout(timeouts.request)
        .user_agent(user_agent)
        .gzip(true)
}

fn apply_env_proxy_fallback(mut builder: ClientBuilder) -> ClientBuilder {
    if let Some(proxy) = find_first_proxy_var(&["HTTPS_PROXY", "https_proxy", "ALL_PROXY", "all_proxy"])
        && let Ok(resolved) = Proxy::https(&proxy)
    {
        builder = builder.proxy(resolved);
    }
    if let Some(proxy) = find_first_proxy_var(&["HTTP_PROXY", "http_proxy", "ALL_PROXY", "all_proxy"])
        && let Ok(resolved) = Proxy::http(&proxy)
    {
        builder = builder.proxy(resolved);
    }
    builder
}

fn find_first_proxy_var(names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| {
        std::env::var(name)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_timeout_capped_by_request_timeout() {
        let timeouts = HttpTimeouts::from_request_secs(3);
        assert_eq!(timeouts.connect, Duration::from_secs(3));
        assert_eq!(timeouts.request, Duration::from_secs(3));
    }

    #[test]
    fn test_zero_request_timeout_becomes_one_second() {
        let timeouts = HttpTimeouts::from_request_secs(0);
        assert_eq!(timeouts.request, Duration::from_secs(1));
    }

    #[test]
    fn test_default_timeouts() {
        let timeouts = HttpTimeouts::default();
        assert_eq!(timeouts.connect, Duration::from_secs(10));
        assert_eq!(timeouts.request, Duration::from_secs(30));
    }

    #[test]
    fn test_build_http_client_succeeds() {
        assert!(build_http_client("test", "card-downloader/test", HttpTimeouts::default()).is_ok());
    }
}
