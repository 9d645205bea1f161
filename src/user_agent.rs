//! Shared User-Agent strings for API and image HTTP clients.
//!
//! Scryfall asks clients to identify themselves with an application name
//! and version.

const APP_NAME: &str = env!("CARGO_PKG_NAME");
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default User-Agent for collection API requests.
#[must_use]
pub(crate) fn default_api_user_agent() -> String {
    format!("{APP_NAME}/{APP_VERSION}")
}

/// Default User-Agent for image downloads.
#[must_use]
pub(crate) fn default_image_user_agent() -> String {
    format!("{APP_NAME}/{APP_VERSION} (image-fetch)")
}
