//! Scryfall collection API request/response types.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::identifier::WireIdentifier;

/// Body of `POST /cards/collection`.
#[derive(Debug, Serialize)]
pub(crate) struct CollectionRequest {
    pub identifiers: Vec<WireIdentifier>,
}

/// Response of `POST /cards/collection`.
#[derive(Debug, Deserialize)]
pub(crate) struct CollectionResponse {
    #[serde(default)]
    pub data: Vec<ScryfallCard>,
    #[serde(default)]
    pub not_found: Vec<WireIdentifier>,
}

/// Error object returned with non-success statuses.
#[derive(Debug, Deserialize)]
pub(crate) struct ScryfallErrorBody {
    #[serde(default)]
    pub details: Option<String>,
}

/// A printing as returned by the API, reduced to the fields used here.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ScryfallCard {
    pub name: String,
    #[serde(default)]
    pub set: String,
    #[serde(default)]
    pub collector_number: String,
    #[serde(default)]
    pub image_uris: Option<HashMap<String, String>>,
    #[serde(default)]
    pub card_faces: Option<Vec<ScryfallCardFace>>,
}

/// One face of a multi-face printing.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ScryfallCardFace {
    pub name: String,
    #[serde(default)]
    pub image_uris: Option<HashMap<String, String>>,
}

impl ScryfallCard {
    /// Returns true if `name` is the full name, the front half, or any face name.
    pub(crate) fn answers_to_name(&self, name: &str) -> bool {
        let wanted = name.trim().to_lowercase();
        if self.name.to_lowercase() == wanted {
            return true;
        }
        if self
            .name
            .split(" // ")
            .next()
            .is_some_and(|front| front.to_lowercase() == wanted)
        {
            return true;
        }
        self.card_faces
            .iter()
            .flatten()
            .any(|face| face.name.to_lowercase() == wanted)
    }
}
