//! Per-domain request pacing.
//!
//! Scryfall asks clients to leave 50-100 ms between API calls. The pipeline
//! only ever has one request in flight, so pacing reduces to remembering when
//! each domain was last hit and sleeping for the remainder of the delay.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use card_downloader_core::download::RateLimiter;
//!
//! # async fn example() {
//! let limiter = RateLimiter::new(Duration::from_millis(100));
//!
//! // First request proceeds immediately
//! limiter.acquire("https://api.scryfall.com/cards/collection").await;
//!
//! // Second request to the same domain waits for the delay
//! limiter.acquire("https://api.scryfall.com/cards/collection").await;
//!
//! // Image host is a different domain and proceeds immediately
//! limiter.acquire("https://cards.scryfall.io/png/front/a.png").await;
//! # }
//! ```

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, trace};
use url::Url;

/// Paces requests so the same domain is not hit more often than `delay`.
#[derive(Debug)]
pub struct RateLimiter {
    delay: Duration,
    last_request: Mutex<HashMap<String, Instant>>,
}

impl RateLimiter {
    /// Creates a limiter with the given minimum delay between requests to one domain.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        debug!(delay_ms = delay.as_millis(), "creating rate limiter");
        Self {
            delay,
            last_request: Mutex::new(HashMap::new()),
        }
    }

    /// Creates a limiter that never waits.
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Returns whether pacing is disabled.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.delay.is_zero()
    }

    /// Waits until a request to `url`'s domain is allowed, then records it.
    ///
    /// The first request to any domain proceeds immediately.
    pub async fn acquire(&self, url: &str) {
        if self.is_disabled() {
            return;
        }

        let domain = extract_domain(url).unwrap_or_default();
        let mut last_request = self.last_request.lock().await;
        if let Some(last) = last_request.get(&domain) {
            let elapsed = last.elapsed();
            if elapsed < self.delay {
                let wait = self.delay - elapsed;
                trace!(domain = %domain, wait_ms = wait.as_millis(), "pacing request");
                tokio::time::sleep(wait).await;
            }
        }
        last_request.insert(domain, Instant::now());
    }
}

/// Extracts the lower-cased host of a URL.
#[must_use]
pub fn extract_domain(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()?
        .host_str()
        .map(str::to_ascii_lowercase)
}
