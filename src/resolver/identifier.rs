//! Lookup identifiers sent to the collection endpoint.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::parser::CardReference;

use super::scryfall::ScryfallCard;

/// The shape of a single collection lookup, derived 1:1 from a [`CardReference`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LookupIdentifier {
    /// Any printing of the named card
    Name { name: String },
    /// Named card from a specific set
    NameSet { name: String, set: String },
    /// Exact printing; the name is kept for matching and reporting only
    NameSetNumber {
        name: String,
        set: String,
        collector_number: String,
    },
}

impl LookupIdentifier {
    /// Derives the identifier for a reference.
    ///
    /// A collector number without a set code cannot be looked up, so it falls
    /// back to a name lookup.
    #[must_use]
    pub fn from_reference(reference: &CardReference) -> Self {
        let name = reference.name.clone();
        match (&reference.set_code, &reference.collector_number) {
            (Some(set), Some(number)) => Self::NameSetNumber {
                name,
                set: set.clone(),
                collector_number: number.clone(),
            },
            (Some(set), None) => Self::NameSet {
                name,
                set: set.clone(),
            },
            _ => Self::Name { name },
        }
    }

    /// Returns the card name carried by the identifier.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Name { name } | Self::NameSet { name, .. } | Self::NameSetNumber { name, .. } => {
                name
            }
        }
    }

    /// Converts to the JSON object accepted by the API.
    ///
    /// The API accepts `{name}`, `{name, set}` and `{set, collector_number}`.
    #[must_use]
    pub(crate) fn to_wire(&self) -> WireIdentifier {
        match self {
            Self::Name { name } => WireIdentifier {
                name: Some(name.clone()),
                ..WireIdentifier::default()
            },
            Self::NameSet { name, set } => WireIdentifier {
                name: Some(name.clone()),
                set: Some(set.clone()),
                collector_number: None,
            },
            Self::NameSetNumber {
                set,
                collector_number,
                ..
            } => WireIdentifier {
                name: None,
                set: Some(set.clone()),
                collector_number: Some(collector_number.clone()),
            },
        }
    }

    /// Returns true when a `not_found` entry echoes this identifier.
    pub(crate) fn matches_wire(&self, wire: &WireIdentifier) -> bool {
        let own = self.to_wire();
        eq_ignore_case(own.name.as_deref(), wire.name.as_deref())
            && eq_ignore_case(own.set.as_deref(), wire.set.as_deref())
            && own.collector_number.as_deref().map(str::to_lowercase)
                == wire.collector_number.as_deref().map(str::to_lowercase)
    }

    /// Returns true when a returned card is the printing this identifier asked for.
    pub(crate) fn matches_card(&self, card: &ScryfallCard) -> bool {
        match self {
            Self::Name { name } => card.answers_to_name(name),
            Self::NameSet { name, set } => {
                card.set.eq_ignore_ascii_case(set) && card.answers_to_name(name)
            }
            Self::NameSetNumber {
                set,
                collector_number,
                ..
            } => {
                card.set.eq_ignore_ascii_case(set)
                    && card.collector_number.eq_ignore_ascii_case(collector_number)
            }
        }
    }
}

impl fmt::Display for LookupIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name { name } => write!(f, "{name}"),
            Self::NameSet { name, set } => write!(f, "{name} ({set})"),
            Self::NameSetNumber {
                name,
                set,
                collector_number,
            } => write!(f, "{name} ({set}) {collector_number}"),
        }
    }
}

fn eq_ignore_case(a: Option<&str>, b: Option<&str>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.to_lowercase() == b.to_lowercase(),
        (None, None) => true,
        _ => false,
    }
}

/// Identifier object as serialized in requests and echoed in `not_found`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct WireIdentifier {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collector_number: Option<String>,
}
