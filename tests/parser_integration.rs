//! Integration tests for the decklist parser.
//!
//! These run realistic exports from common deck-building tools through the
//! public API.

use card_downloader_core::parser::{LineOutcome, SkipReason, parse_decklist, parse_line};
use card_downloader_core::resolver::{LookupIdentifier, collect_requests};

/// Arena export with section headers and set/number suffixes.
#[test]
fn test_parse_arena_export() {
    let input = "\
Deck
4 Lightning Bolt (M11) 149
2 Jace, Vryn's Prodigy // Jace, Telepath Unbound (ORI) 60
1 Boseiju, Who Endures (NEO) 266

Sideboard
2 Abrupt Decay (RTR) 141
";
    let result = parse_decklist(input);

    assert_eq!(result.len(), 4);
    assert_eq!(result.skipped, 3);
    assert_eq!(result.total_quantity(), 9);

    let jace = &result.references[1];
    assert_eq!(jace.name, "Jace, Vryn's Prodigy // Jace, Telepath Unbound");
    assert_eq!(jace.set_code.as_deref(), Some("ori"));
    assert_eq!(jace.collector_number.as_deref(), Some("60"));
}

/// MTGO and hand-typed lists mix quantity styles and comments.
#[test]
fn test_parse_mixed_hand_typed_list() {
    let input = "\
# Izzet tempo
4x Counterspell
3 Lightning Bolt
Opt
// sideboard notes
1X Brazen Borrower (ELD)
";
    let result = parse_decklist(input);
    let names: Vec<&str> = result.references.iter().map(|r| r.name.as_str()).collect();

    assert_eq!(
        names,
        vec!["Counterspell", "Lightning Bolt", "Opt", "Brazen Borrower"]
    );
    assert_eq!(result.references[0].quantity, 4);
    assert_eq!(result.references[2].quantity, 1);
    assert_eq!(result.references[3].set_code.as_deref(), Some("eld"));
    assert_eq!(result.skipped, 2);
}

#[test]
fn test_foil_markers_are_ignored() {
    let reference = parse_line("1 Ragavan, Nimble Pilferer (MH2) 138 *F*")
        .into_reference()
        .unwrap();
    assert_eq!(reference.name, "Ragavan, Nimble Pilferer");
    assert_eq!(reference.collector_number.as_deref(), Some("138"));
}

#[test]
fn test_section_headers_with_counts_are_skipped() {
    assert_eq!(
        parse_line("Sideboard (15)"),
        LineOutcome::Skip(SkipReason::SectionHeader)
    );
    assert_eq!(
        parse_line("Commander:"),
        LineOutcome::Skip(SkipReason::SectionHeader)
    );
}

#[test]
fn test_parsed_references_map_to_lookup_identifiers() {
    let result = parse_decklist("1 Opt\n1 Opt (ELD)\n1 Opt (ELD) 59\n");
    let requests = collect_requests(&result.references);

    assert_eq!(requests.len(), 3);
    assert!(matches!(requests[0].identifier, LookupIdentifier::Name { .. }));
    assert!(matches!(requests[1].identifier, LookupIdentifier::NameSet { .. }));
    assert!(matches!(
        requests[2].identifier,
        LookupIdentifier::NameSetNumber { .. }
    ));
}

#[test]
fn test_windows_line_endings() {
    let result = parse_decklist("2 Counterspell\r\n1 Opt\r\n");
    assert_eq!(result.len(), 2);
    assert_eq!(result.references[0].name, "Counterspell");
    assert_eq!(result.references[1].name, "Opt");
}

#[test]
fn test_secret_lair_and_star_collector_numbers() {
    let result = parse_decklist("1 Lightning Bolt (SLD) 12sp\n1 Counterspell (STA) 123★\n");

    assert_eq!(result.references[0].name, "Lightning Bolt");
    assert_eq!(result.references[0].set_code.as_deref(), Some("sld"));
    assert_eq!(result.references[0].collector_number.as_deref(), Some("12sp"));
    assert_eq!(result.references[1].name, "Counterspell");
    assert_eq!(result.references[1].collector_number.as_deref(), Some("123★"));
}
