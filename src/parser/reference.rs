//! Types representing parsed decklist lines.

use std::fmt;

/// A single card entry parsed from a decklist line.
///
/// Two references with the same name (case-insensitive), set code and
/// collector number request the same printing; see [`CardReference::printing_key`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardReference {
    /// Original line text, kept for reporting
    pub raw_line: String,
    /// Number of physical copies requested (always >= 1)
    pub quantity: u32,
    /// Card name; double-faced names keep both halves (`A // B`)
    pub name: String,
    /// Lower-cased set code, when given in parentheses
    pub set_code: Option<String>,
    /// Collector number, only recognized after a set code
    pub collector_number: Option<String>,
}

impl CardReference {
    /// Creates a reference with quantity 1 and no printing details.
    #[must_use]
    pub fn named(raw_line: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            raw_line: raw_line.into(),
            quantity: 1,
            name: name.into(),
            set_code: None,
            collector_number: None,
        }
    }

    /// Returns the identity used to collapse duplicate printing requests.
    #[must_use]
    pub fn printing_key(&self) -> (String, Option<String>, Option<String>) {
        (
            self.name.to_lowercase(),
            self.set_code.clone(),
            self.collector_number.clone(),
        )
    }
}

impl fmt::Display for CardReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.quantity, self.name)?;
        if let Some(set) = &self.set_code {
            write!(f, " ({set})")?;
        }
        if let Some(number) = &self.collector_number {
            write!(f, " {number}")?;
        }
        Ok(())
    }
}

/// Why a line produced no card reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Empty or whitespace-only line
    Blank,
    /// Line starting with `#` or `//`
    Comment,
    /// Section header such as `Sideboard`
    SectionHeader,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blank => write!(f, "blank"),
            Self::Comment => write!(f, "comment"),
            Self::SectionHeader => write!(f, "section header"),
        }
    }
}

/// Result of parsing one decklist line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// The line names a card
    Reference(CardReference),
    /// The line carries no card
    Skip(SkipReason),
}

impl LineOutcome {
    /// Returns the reference, if any.
    #[must_use]
    pub fn into_reference(self) -> Option<CardReference> {
        match self {
            Self::Reference(reference) => Some(reference),
            Self::Skip(_) => None,
        }
    }
}

/// All card references parsed from a decklist.
#[derive(Debug, Default)]
pub struct DecklistParse {
    /// Parsed references in input order
    pub references: Vec<CardReference>,
    /// Number of skipped lines (blank, comment, header)
    pub skipped: usize,
}

impl DecklistParse {
    /// Returns true if no card was parsed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }

    /// Returns the number of parsed references.
    #[must_use]
    pub fn len(&self) -> usize {
        self.references.len()
    }

    /// Returns the total number of physical copies requested.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.references.iter().map(|r| u64::from(r.quantity)).sum()
    }
}
