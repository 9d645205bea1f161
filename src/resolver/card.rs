//! Resolved printings and lookup outcomes.

use std::collections::HashMap;

use super::scryfall::ScryfallCard;

/// A printing matched by the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCard {
    /// Canonical card name (`Front // Back` for multi-face cards)
    pub canonical_name: String,
    /// Lower-case set code of the printing
    pub set_code: String,
    /// Collector number of the printing
    pub collector_number: String,
    /// Image-bearing faces: one for normal cards, two for double-faced cards
    pub faces: Vec<Face>,
}

/// One image-bearing side of a printing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Face {
    /// Face name; equal to the canonical name for single-faced cards
    pub face_name: String,
    /// Image URL by size keyword (`png`, `large`, ...)
    pub image_urls: HashMap<String, String>,
}

impl ResolvedCard {
    /// Returns true when each face carries its own image.
    #[must_use]
    pub fn is_multi_face(&self) -> bool {
        self.faces.len() > 1
    }
}

impl From<ScryfallCard> for ResolvedCard {
    fn from(card: ScryfallCard) -> Self {
        // Split and adventure cards have faces but a single top-level image.
        let faces = if let Some(image_urls) = card.image_uris {
            vec![Face {
                face_name: card.name.clone(),
                image_urls,
            }]
        } else {
            card.card_faces
                .unwrap_or_default()
                .into_iter()
                .filter_map(|face| {
                    face.image_uris.map(|image_urls| Face {
                        face_name: face.name,
                        image_urls,
                    })
                })
                .collect()
        };

        Self {
            canonical_name: card.name,
            set_code: card.set.to_lowercase(),
            collector_number: card.collector_number,
            faces,
        }
    }
}

/// Result of looking up one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    /// The API matched a printing
    Found(ResolvedCard),
    /// The API reported no match
    NotFound,
}
