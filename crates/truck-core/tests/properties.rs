//! Document-wide properties checked over small generated inputs.

use std::fmt::Write;
use std::rc::Rc;
use truck_core::model::{BeamOption, NodeOption, OptionLetter, encode_options};
use truck_core::{Keyword, ParseOutput, ParserConfig, ROOT_MODULE_NAME, parse_truck};

// ─── Helpers ─────────────────────────────────────────────────────────────

fn parse(text: &str) -> ParseOutput {
    parse_truck(text, &ParserConfig::default())
}

/// Numbered nodes `0..count` on a line.
fn node_block(count: u32) -> String {
    let mut out = String::from("t\nnodes\n");
    for i in 0..count {
        let _ = writeln!(out, "{i} {i} 0 0");
    }
    out
}

// ─── Properties ──────────────────────────────────────────────────────────

#[test]
fn records_keep_source_order() {
    let mut text = node_block(6);
    text.push_str("beams\n");
    let pairs = [(0, 1), (5, 2), (3, 4), (1, 5), (2, 3)];
    for (a, b) in pairs {
        let _ = writeln!(text, "{a} {b}");
    }
    let out = parse(&text);
    let got: Vec<(String, String)> = out
        .document
        .root
        .beams
        .iter()
        .map(|b| (b.nodes[0].text().to_string(), b.nodes[1].text().to_string()))
        .collect();
    let want: Vec<(String, String)> = pairs
        .iter()
        .map(|(a, b)| (a.to_string(), b.to_string()))
        .collect();
    assert_eq!(got, want);

    let indices: Vec<usize> = out
        .document
        .root
        .lines
        .iter()
        .filter(|l| l.keyword == Keyword::Beams)
        .filter_map(|l| l.data_index)
        .collect();
    assert_eq!(indices, vec![0, 1, 2, 3, 4]);
}

#[test]
fn records_capture_the_active_beam_defaults() {
    let mut text = node_block(3);
    text.push_str("beams\n0 1\nset_beam_defaults 100 10\n1 2\n2 0\nset_beam_defaults_scale 2 1 1 1\n0 2\n");
    let out = parse(&text);
    let beams = &out.document.root.beams;
    let nodes = &out.document.root.nodes;
    assert!(Rc::ptr_eq(&nodes[0].beam_defaults, &beams[0].defaults));
    assert!(!beams[0].defaults.is_user_defined);
    assert!(Rc::ptr_eq(&beams[1].defaults, &beams[2].defaults));
    assert!(!Rc::ptr_eq(&beams[2].defaults, &beams[3].defaults));
    assert_eq!(beams[3].defaults.springiness, 100.0);
    assert_eq!(beams[3].defaults.scale.springiness, 2.0);
}

#[test]
fn records_capture_the_detacher_group() {
    let mut text = node_block(3);
    text.push_str("beams\n0 1\ndetacher_group 4\n1 2\ndetacher_group end\n2 0\n");
    let out = parse(&text);
    let groups: Vec<i32> = out.document.root.beams.iter().map(|b| b.detacher_group).collect();
    assert_eq!(groups, vec![0, 4, 0]);
}

#[test]
fn negative_inertia_restores_builtin_handle() {
    let mut text = node_block(2);
    text.push_str("hydros\n0 1 0.1\nset_inertia_defaults 0.5 0.5\n0 1 0.2\nset_inertia_defaults -1\n0 1 0.3\n");
    let out = parse(&text);
    let hydros = &out.document.root.hydros;
    assert!(Rc::ptr_eq(&hydros[0].inertia_defaults, &hydros[2].inertia_defaults));
    assert!(!Rc::ptr_eq(&hydros[0].inertia_defaults, &hydros[1].inertia_defaults));
    assert_eq!(hydros[1].inertia_defaults.start_delay_factor, 0.5);
    assert_eq!(hydros[2].inertia_defaults.start_delay_factor, 0.0);
}

#[test]
fn option_bits_follow_letters() {
    for letters in ["i", "r", "s", "ir", "is", "irs"] {
        let mut text = node_block(2);
        let _ = writeln!(text, "beams\n0 1 {letters}");
        let out = parse(&text);
        let mask = out.document.root.beams[0].options;
        assert_eq!(encode_options::<BeamOption>(mask), letters);
        assert!(out.diagnostics.is_empty(), "{letters}: {}", out.diagnostics.render());
    }
}

#[test]
fn noop_and_unknown_letters_set_no_bits() {
    let mut text = node_block(2);
    text.push_str("beams\n0 1 nv\n0 1 xi\n");
    let out = parse(&text);
    let beams = &out.document.root.beams;
    assert_eq!(beams[0].options, 0);
    assert_eq!(beams[1].options, BeamOption::Invisible.bit());
    assert_eq!(out.diagnostics.len(), 1);
    assert!(out.diagnostics.contains("Invalid flag: x"));

    let mut text = node_block(1);
    text.push_str("nodes\n1 0 0 0 mn\n");
    let out = parse(&text);
    let node = &out.document.root.nodes[1];
    assert_eq!(node.options & NodeOption::NoMouseGrab.bit(), 0);
}

#[test]
fn sections_leave_root_untouched() {
    let mut text = node_block(2);
    text.push_str("section 1 alt\nbeams\n0 1\n1 0\nties\n0 1 1 1 1\nend_section\n");
    let out = parse(&text);
    let root = out.document.module(ROOT_MODULE_NAME).expect("root");
    assert_eq!(root.record_count(Keyword::Beams), 0);
    assert_eq!(root.record_count(Keyword::Ties), 0);
    let alt = out.document.module("alt").expect("alt");
    assert_eq!(alt.record_count(Keyword::Beams), 2);
    assert_eq!(alt.record_count(Keyword::Ties), 1);
}
