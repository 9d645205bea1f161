//! Ordered line rules for decklist entries.
//!
//! Each rule is a pattern plus an extractor. Rules run top-to-bottom and the
//! first one that matches decides the reference, so the most specific shapes
//! (set code and collector number) come before the looser quantity forms.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// `[qty[x]] name (SET) 123`
///
/// Any single token after the set group is a collector number (`216a`,
/// `C21-263`, `12sp`, `123★`).
static SET_AND_NUMBER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:(?P<qty>\d+)\s*[xX]?\s+)?(?P<name>.+?)\s*\((?P<set>[A-Za-z0-9]{2,6})\)\s+(?P<number>\S+)$",
    )
    .expect("set+number regex is valid") // Static pattern, safe to panic
});

/// `[qty[x]] name (SET)`
static SET_ONLY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(?P<qty>\d+)\s*[xX]?\s+)?(?P<name>.+?)\s*\((?P<set>[A-Za-z0-9]{2,6})\)$")
        .expect("set-only regex is valid") // Static pattern, safe to panic
});

/// `4x name`
static QUANTITY_X_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<qty>\d+)\s*[xX]\s+(?P<name>.+)$").expect("quantity-x regex is valid") // Static pattern, safe to panic
});

/// `4 name`
static QUANTITY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<qty>\d+)\s+(?P<name>.+)$").expect("quantity regex is valid") // Static pattern, safe to panic
});

/// Foil markers exported by Arena and Moxfield.
static FOIL_MARKER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\*F\*|\(foil\)").expect("foil marker regex is valid") // Static pattern, safe to panic
});

/// Face separator with any surrounding spacing.
static FACE_SEPARATOR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*//\s*").expect("face separator regex is valid") // Static pattern, safe to panic
});

/// Section headers alone on a line, optionally followed by a count or colon.
static SECTION_HEADER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:deck|main|mainboard|main deck|sideboard|commander|companion|maybeboard|considering)\s*(?:\(\d+\))?\s*:?$",
    )
    .expect("section header regex is valid") // Static pattern, safe to panic
});

/// Fields captured by a matching rule, borrowed from the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Captured<'a> {
    pub(crate) quantity: Option<&'a str>,
    pub(crate) name: &'a str,
    pub(crate) set_code: Option<&'a str>,
    pub(crate) collector_number: Option<&'a str>,
}

/// A named decklist shape.
pub(crate) struct LineRule {
    pub(crate) name: &'static str,
    apply: fn(&str) -> Option<Captured<'_>>,
}

impl LineRule {
    pub(crate) fn apply<'a>(&self, line: &'a str) -> Option<Captured<'a>> {
        (self.apply)(line)
    }
}

/// Rules in evaluation order.
pub(crate) const LINE_RULES: [LineRule; 5] = [
    LineRule {
        name: "set_and_number",
        apply: match_set_and_number,
    },
    LineRule {
        name: "set_only",
        apply: match_set_only,
    },
    LineRule {
        name: "quantity_x",
        apply: match_quantity_x,
    },
    LineRule {
        name: "quantity",
        apply: match_quantity,
    },
    LineRule {
        name: "bare_name",
        apply: match_bare_name,
    },
];

fn group<'a>(caps: &Captures<'a>, name: &str) -> Option<&'a str> {
    caps.name(name).map(|m| m.as_str())
}

fn match_set_and_number(line: &str) -> Option<Captured<'_>> {
    let caps = SET_AND_NUMBER_PATTERN.captures(line)?;
    Some(Captured {
        quantity: group(&caps, "qty"),
        name: group(&caps, "name")?,
        set_code: group(&caps, "set"),
        collector_number: group(&caps, "number"),
    })
}

fn match_set_only(line: &str) -> Option<Captured<'_>> {
    let caps = SET_ONLY_PATTERN.captures(line)?;
    Some(Captured {
        quantity: group(&caps, "qty"),
        name: group(&caps, "name")?,
        set_code: group(&caps, "set"),
        collector_number: None,
    })
}

fn match_quantity_x(line: &str) -> Option<Captured<'_>> {
    let caps = QUANTITY_X_PATTERN.captures(line)?;
    Some(Captured {
        quantity: group(&caps, "qty"),
        name: group(&caps, "name")?,
        set_code: None,
        collector_number: None,
    })
}

fn match_quantity(line: &str) -> Option<Captured<'_>> {
    let caps = QUANTITY_PATTERN.captures(line)?;
    Some(Captured {
        quantity: group(&caps, "qty"),
        name: group(&caps, "name")?,
        set_code: None,
        collector_number: None,
    })
}

fn match_bare_name(line: &str) -> Option<Captured<'_>> {
    (!line.is_empty()).then_some(Captured {
        quantity: None,
        name: line,
        set_code: None,
        collector_number: None,
    })
}

/// Returns true for a section header such as `Sideboard` or `Deck (60)`.
pub(crate) fn is_section_header(line: &str) -> bool {
    SECTION_HEADER_PATTERN.is_match(line)
}

/// Returns true for `#` and `//` comment lines.
pub(crate) fn is_comment(line: &str) -> bool {
    line.starts_with('#') || line.starts_with("//")
}

/// Removes foil markers and the whitespace they leave behind.
pub(crate) fn strip_foil_markers(line: &str) -> String {
    FOIL_MARKER_PATTERN.replace_all(line, "").trim().to_string()
}

/// Normalizes a card name: trims and spaces face separators as ` // `.
pub(crate) fn normalize_name(name: &str) -> String {
    FACE_SEPARATOR_PATTERN
        .replace_all(name.trim(), " // ")
        .trim()
        .to_string()
}

/// Parses a quantity token; absent, zero or overflowing values become 1.
pub(crate) fn parse_quantity(token: Option<&str>) -> u32 {
    token
        .and_then(|t| t.parse::<u32>().ok())
        .filter(|q| *q > 0)
        .unwrap_or(1)
}
