//! Integration tests: parse → serialize → re-parse round trip.
//!
//! Record counts per module and keyword must survive, and serializing the
//! re-parsed document must reproduce the same text.

use pretty_assertions::assert_eq;
use truck_core::{
    Document, FormatConfig, Keyword, ParserConfig, SerializerConfig, format_truck, parse_truck,
    serialize_document,
};

// ─── Helpers ─────────────────────────────────────────────────────────────

fn parse(text: &str) -> Document {
    parse_truck(text, &ParserConfig::default()).document
}

fn serialize(document: &Document) -> String {
    serialize_document(document, &SerializerConfig::default()).expect("serializable")
}

/// Parse, serialize, re-parse, and compare record counts and output text.
fn assert_roundtrip_preserves(input: &str) {
    let first = parse(input);
    let emitted = serialize(&first);
    let second = parse(&emitted);

    let names = |d: &Document| d.modules().map(|m| m.name.clone()).collect::<Vec<_>>();
    assert_eq!(names(&first), names(&second), "module list changed.\nEmitted:\n{emitted}");

    for (a, b) in first.modules().zip(second.modules()) {
        for keyword in Keyword::ALL {
            assert_eq!(
                a.record_count(*keyword),
                b.record_count(*keyword),
                "{keyword} count changed in module '{}'.\nEmitted:\n{emitted}",
                a.name
            );
        }
    }
    assert_eq!(first.name, second.name);
    assert_eq!(first.authors, second.authors);
    assert_eq!(first.file_info, second.file_info);
    assert_eq!(first.flags, second.flags);

    assert_eq!(emitted, serialize(&second), "serializing the re-parse changed the text");
}

// ─── Fixture-based tests ─────────────────────────────────────────────────

#[test]
fn roundtrip_minimal_fixture() {
    assert_roundtrip_preserves(include_str!("fixtures/minimal.truck"));
}

#[test]
fn roundtrip_legacy_fixture() {
    assert_roundtrip_preserves(include_str!("fixtures/legacy_truck.truck"));
}

#[test]
fn roundtrip_named_sections_fixture() {
    assert_roundtrip_preserves(include_str!("fixtures/named_sections.truck"));
}

// ─── Specific preservation ───────────────────────────────────────────────

#[test]
fn legacy_fixture_keeps_defaults_and_groups() {
    let first = parse(include_str!("fixtures/legacy_truck.truck"));
    let second = parse(&serialize(&first));
    let groups = |d: &Document| d.root.beams.iter().map(|b| b.detacher_group).collect::<Vec<_>>();
    let mut a = groups(&first);
    let mut b = groups(&second);
    a.sort_unstable();
    b.sort_unstable();
    assert_eq!(a, b);

    let node = |d: &Document| d.root.nodes[0].node_defaults.load_weight;
    assert_eq!(node(&first), 0.5);
    assert_eq!(node(&second), 0.5);
    assert_eq!(second.root.hydros[0].inertia_defaults.stop_delay_factor, 0.2);
}

#[test]
fn named_fixture_keeps_sections_and_description() {
    let first = parse(include_str!("fixtures/named_sections.truck"));
    let second = parse(&serialize(&first));
    assert_eq!(second.description, vec!["A small buggy with named nodes.".to_string()]);
    assert_eq!(second.guid, "1a2b3c4d");
    let heavy = second.module("heavy").expect("heavy module");
    assert_eq!(heavy.beams.len(), 2);
    assert_eq!(heavy.beams[0].defaults.springiness, 20_000_000.0);
    assert_eq!(second.module("light").expect("light module").ties.len(), 1);
}

#[test]
fn format_is_stable_on_fixtures() {
    let config = FormatConfig::default();
    for input in [
        include_str!("fixtures/minimal.truck"),
        include_str!("fixtures/legacy_truck.truck"),
        include_str!("fixtures/named_sections.truck"),
    ] {
        let once = format_truck(input, &config).expect("formats");
        let twice = format_truck(&once, &config).expect("formats");
        assert_eq!(once, twice);
    }
}
