//! Card resolution through the Scryfall collection endpoint.
//!
//! Parsed references are collapsed into unique [`LookupRequest`]s, split into
//! batches of at most [`MAX_BATCH_SIZE`], and each batch is sent as one
//! `POST /cards/collection`. Returned printings are matched back to their
//! requests by identity; identifiers echoed in `not_found` never produce a
//! [`ResolvedCard`].
//!
//! Batches are sent one at a time with pacing between calls. A batch that
//! fails (network, timeout, error status, undecodable body) marks its requests
//! as failed in the [`RunSummary`] and the next batch is still attempted.
//!
//! # Example
//!
//! ```no_run
//! use card_downloader_core::parser::parse_decklist;
//! use card_downloader_core::resolver::{
//!     CollectionResolver, MAX_BATCH_SIZE, batch_requests, collect_requests,
//! };
//! use card_downloader_core::RunSummary;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let parsed = parse_decklist("4 Lightning Bolt\n1 Abrupt Decay (RTR) 141\n");
//! let batches = batch_requests(collect_requests(&parsed.references), MAX_BATCH_SIZE);
//!
//! let resolver = CollectionResolver::new()?;
//! let mut summary = RunSummary::new();
//! let resolved = resolver.resolve_all(batches, &mut summary).await;
//! println!("{} printings resolved", resolved.len());
//! # Ok(())
//! # }
//! ```

mod batch;
mod card;
mod error;
pub mod http_client;
mod identifier;
mod scryfall;

pub use batch::{LookupRequest, MAX_BATCH_SIZE, batch_requests, collect_requests};
pub use card::{Face, LookupOutcome, ResolvedCard};
pub use error::ResolveError;
pub use http_client::HttpTimeouts;
pub use identifier::LookupIdentifier;

use std::time::Duration;

use reqwest::Client;
use reqwest::header::ACCEPT;
use tracing::{debug, info, instrument, warn};

use crate::download::RateLimiter;
use crate::summary::RunSummary;
use crate::user_agent;

use http_client::build_http_client;
use scryfall::{CollectionRequest, CollectionResponse, ScryfallCard, ScryfallErrorBody};

/// Default Scryfall API base URL.
pub const DEFAULT_API_BASE_URL: &str = "https://api.scryfall.com";

/// Minimum delay between collection requests.
pub const API_REQUEST_INTERVAL: Duration = Duration::from_millis(100);

/// Client for the bulk collection lookup.
#[derive(Debug)]
pub struct CollectionResolver {
    client: Client,
    endpoint: String,
    limiter: RateLimiter,
}

impl CollectionResolver {
    /// Creates a resolver for the public Scryfall API with default timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::ClientBuild`] if the HTTP client cannot be built.
    pub fn new() -> Result<Self, ResolveError> {
        Self::with_base_url(DEFAULT_API_BASE_URL, HttpTimeouts::default())
    }

    /// Creates a resolver for a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::ClientBuild`] if the HTTP client cannot be built.
    #[instrument(skip_all, fields(base_url = %base_url.as_ref()))]
    pub fn with_base_url(
        base_url: impl AsRef<str>,
        timeouts: HttpTimeouts,
    ) -> Result<Self, ResolveError> {
        let client = build_http_client("collection", &user_agent::default_api_user_agent(), timeouts)
            .map_err(ResolveError::client_build)?;
        let endpoint = format!("{}/cards/collection", base_url.as_ref().trim_end_matches('/'));
        Ok(Self {
            client,
            endpoint,
            limiter: RateLimiter::new(API_REQUEST_INTERVAL),
        })
    }

    /// Replaces the pacing between collection requests.
    #[must_use]
    pub fn with_request_interval(mut self, interval: Duration) -> Self {
        self.limiter = RateLimiter::new(interval);
        self
    }

    /// Looks up one batch and returns one outcome per request, in request order.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] when the request fails, the API answers with
    /// a non-success status, or the body cannot be decoded.
    #[instrument(skip(self, requests), fields(batch_size = requests.len()))]
    pub async fn resolve_batch(
        &self,
        requests: &[LookupRequest],
    ) -> Result<Vec<LookupOutcome>, ResolveError> {
        let body = CollectionRequest {
            identifiers: requests.iter().map(|r| r.identifier.to_wire()).collect(),
        };

        self.limiter.acquire(&self.endpoint).await;
        debug!(endpoint = %self.endpoint, "sending collection request");
        let response = self
            .client
            .post(&self.endpoint)
            .header(ACCEPT, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ResolveError::from_reqwest(&self.endpoint, e))?;

        let status = response.status();
        if !status.is_success() {
            let details = response
                .json::<ScryfallErrorBody>()
                .await
                .ok()
                .and_then(|b| b.details);
            return Err(ResolveError::http_status(
                &self.endpoint,
                status.as_u16(),
                details,
            ));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ResolveError::from_reqwest(&self.endpoint, e))?;
        let parsed: CollectionResponse =
            serde_json::from_slice(&bytes).map_err(|e| ResolveError::decode(&self.endpoint, e))?;

        debug!(
            matched = parsed.data.len(),
            not_found = parsed.not_found.len(),
            "collection response received"
        );
        Ok(match_response(requests, parsed))
    }

    /// Resolves all batches sequentially, recording outcomes in `summary`.
    ///
    /// Returns each matched request paired with its printing, in input order.
    pub async fn resolve_all(
        &self,
        batches: Vec<Vec<LookupRequest>>,
        summary: &mut RunSummary,
    ) -> Vec<(LookupRequest, ResolvedCard)> {
        let batch_count = batches.len();
        let mut resolved = Vec::new();

        for (index, batch) in batches.into_iter().enumerate() {
            match self.resolve_batch(&batch).await {
                Ok(outcomes) => {
                    for (request, outcome) in batch.into_iter().zip(outcomes) {
                        match outcome {
                            LookupOutcome::Found(card) => {
                                summary.record_resolved();
                                resolved.push((request, card));
                            }
                            LookupOutcome::NotFound => {
                                debug!(identifier = %request.identifier, "card not found");
                                summary.record_not_found(&request);
                            }
                        }
                    }
                }
                Err(error) => {
                    warn!(
                        batch = index + 1,
                        of = batch_count,
                        error = %error,
                        "collection batch failed; continuing with next batch"
                    );
                    let reason = error.to_string();
                    for request in &batch {
                        summary.record_lookup_failure(request, &reason);
                    }
                }
            }
        }

        info!(
            batches = batch_count,
            resolved = summary.resolved(),
            not_found = summary.not_found().len(),
            failed = summary.lookup_failures().len(),
            "Resolution complete"
        );
        resolved
    }
}

/// Matches returned printings back to requests.
///
/// Identifiers echoed in `not_found` are unmatched. Remaining requests are
/// matched by identity first; leftovers are paired in response order, which
/// the API keeps aligned with the request order.
fn match_response(requests: &[LookupRequest], response: CollectionResponse) -> Vec<LookupOutcome> {
    let reported_missing: Vec<bool> = requests
        .iter()
        .map(|r| {
            response
                .not_found
                .iter()
                .any(|wire| r.identifier.matches_wire(wire))
        })
        .collect();

    let mut cards: Vec<Option<ScryfallCard>> = response.data.into_iter().map(Some).collect();
    let mut matched: Vec<Option<ScryfallCard>> = vec![None; requests.len()];

    for (index, request) in requests.iter().enumerate() {
        if reported_missing[index] {
            continue;
        }
        let position = cards.iter().position(|slot| {
            slot.as_ref()
                .is_some_and(|card| request.identifier.matches_card(card))
        });
        if let Some(position) = position {
            matched[index] = cards[position].take();
        }
    }

    let mut leftovers = cards.into_iter().flatten();
    for (index, slot) in matched.iter_mut().enumerate() {
        if slot.is_none() && !reported_missing[index] {
            *slot = leftovers.next();
            if let Some(card) = slot.as_ref() {
                debug!(
                    identifier = %requests[index].identifier,
                    card = %card.name,
                    "matched by response order"
                );
            }
        }
    }

    matched
        .into_iter()
        .map(|slot| slot.map_or(LookupOutcome::NotFound, |card| LookupOutcome::Found(card.into())))
        .collect()
}
