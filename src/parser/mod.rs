//! Decklist parsing into card references.
//!
//! This module turns raw decklist text (Arena, MTGO, Moxfield exports or a
//! hand-typed list) into [`CardReference`]s. Parsing never fails: blank lines,
//! comments and section headers are skipped, and a line that matches no known
//! shape is still kept as a best-effort reference named after the whole line.
//!
//! # Supported shapes
//!
//! - `3 Lightning Bolt`
//! - `4x Counterspell`
//! - `1 Abrupt Decay (RTR) 141`
//! - `1 Boseiju, Who Endures (NEO)`
//! - `1 Jace, Vryn's Prodigy // Jace, Telepath Unbound (ORI) 60`
//! - `Lightning Bolt` (quantity 1)
//!
//! # Example
//!
//! ```
//! use card_downloader_core::parser::parse_decklist;
//!
//! let result = parse_decklist("4x Counterspell\n\nSideboard\n1 Abrupt Decay (RTR) 141\n");
//! assert_eq!(result.len(), 2);
//! assert_eq!(result.references[1].set_code.as_deref(), Some("rtr"));
//! ```

mod reference;
mod rules;

pub use reference::{CardReference, DecklistParse, LineOutcome, SkipReason};

use tracing::{debug, info, trace};

use rules::{
    LINE_RULES, is_comment, is_section_header, normalize_name, parse_quantity, strip_foil_markers,
};

/// Parses a single decklist line.
///
/// Returns [`LineOutcome::Skip`] for blank lines, comments and section
/// headers; every other line yields a [`CardReference`].
#[must_use]
pub fn parse_line(line: &str) -> LineOutcome {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return LineOutcome::Skip(SkipReason::Blank);
    }
    if is_comment(trimmed) {
        return LineOutcome::Skip(SkipReason::Comment);
    }
    if is_section_header(trimmed) {
        return LineOutcome::Skip(SkipReason::SectionHeader);
    }

    let cleaned = strip_foil_markers(trimmed);
    for rule in &LINE_RULES {
        let Some(captured) = rule.apply(&cleaned) else {
            continue;
        };
        let name = normalize_name(captured.name);
        if name.is_empty() {
            continue;
        }
        trace!(rule = rule.name, line = trimmed, "line rule matched");
        return LineOutcome::Reference(CardReference {
            raw_line: trimmed.to_string(),
            quantity: parse_quantity(captured.quantity),
            name,
            set_code: captured.set_code.map(str::to_lowercase),
            collector_number: captured.collector_number.map(str::to_string),
        });
    }

    // Only reachable when the foil marker was the whole line.
    debug!(line = trimmed, "no rule matched; using whole line as card name");
    LineOutcome::Reference(CardReference::named(trimmed, trimmed))
}

/// Parses a whole decklist, one entry per line.
#[tracing::instrument(skip(input), fields(input_len = input.len()))]
#[must_use]
pub fn parse_decklist(input: &str) -> DecklistParse {
    let mut result = DecklistParse::default();

    for line in input.lines() {
        match parse_line(line) {
            LineOutcome::Reference(reference) => result.references.push(reference),
            LineOutcome::Skip(reason) => {
                trace!(%reason, "skipped line");
                result.skipped += 1;
            }
        }
    }

    info!(
        cards = result.len(),
        copies = result.total_quantity(),
        skipped = result.skipped,
        "Parsing complete"
    );

    result
}
