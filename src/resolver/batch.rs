//! Identifier batching for bulk collection lookups.

use std::collections::HashMap;

use crate::parser::CardReference;

use super::LookupIdentifier;

/// Maximum identifiers accepted by one collection request.
pub const MAX_BATCH_SIZE: usize = 75;

/// One unique printing request with every line that asked for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRequest {
    /// Identifier sent to the API
    pub identifier: LookupIdentifier,
    /// Originating references, in input order
    pub references: Vec<CardReference>,
    /// Sum of the references' quantities
    pub quantity: u32,
}

impl LookupRequest {
    fn new(reference: CardReference) -> Self {
        Self {
            identifier: LookupIdentifier::from_reference(&reference),
            quantity: reference.quantity,
            references: vec![reference],
        }
    }

    /// Returns the raw lines of the originating references.
    pub fn raw_lines(&self) -> impl Iterator<Item = &str> {
        self.references.iter().map(|r| r.raw_line.as_str())
    }
}

/// Collapses identical printing requests into one lookup each.
///
/// First-seen order is kept; quantities are summed and applied later when
/// download tasks are planned.
#[must_use]
pub fn collect_requests(references: &[CardReference]) -> Vec<LookupRequest> {
    let mut requests: Vec<LookupRequest> = Vec::new();
    let mut index_by_key = HashMap::new();

    for reference in references {
        let key = reference.printing_key();
        if let Some(&index) = index_by_key.get(&key) {
            let request: &mut LookupRequest = &mut requests[index];
            request.quantity = request.quantity.saturating_add(reference.quantity);
            request.references.push(reference.clone());
        } else {
            index_by_key.insert(key, requests.len());
            requests.push(LookupRequest::new(reference.clone()));
        }
    }

    requests
}

/// Splits requests into ordered batches of at most `max_size`.
///
/// A `max_size` of zero is treated as one.
#[must_use]
pub fn batch_requests(requests: Vec<LookupRequest>, max_size: usize) -> Vec<Vec<LookupRequest>> {
    let max_size = max_size.max(1);
    let mut batches = Vec::with_capacity(requests.len().div_ceil(max_size));
    let mut current = Vec::with_capacity(max_size.min(requests.len()));

    for request in requests {
        current.push(request);
        if current.len() == max_size {
            batches.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        batches.push(current);
    }

    batches
}
