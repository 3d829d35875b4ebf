//! End-to-end scenarios: source text → expected document state.

use pretty_assertions::assert_eq;
use std::rc::Rc;
use truck_core::model::{BeamOption, FlareType, NodeOption, has};
use truck_core::{Document, NodeId, ParseOutput, ParserConfig, SerializerConfig, parse_truck, serialize_document};

// ─── Helpers ─────────────────────────────────────────────────────────────

fn parse(text: &str) -> ParseOutput {
    let _ = env_logger::builder().is_test(true).try_init();
    parse_truck(text, &ParserConfig::default())
}

fn reparse(document: &Document) -> (String, ParseOutput) {
    let text = serialize_document(document, &SerializerConfig::default()).expect("serializable");
    let out = parse(&text);
    (text, out)
}

// ─── Scenarios ───────────────────────────────────────────────────────────

#[test]
fn node_defaults_propagate_into_nodes() {
    let out = parse(
        "t\nnodes\nset_node_defaults 10 0.5 0.5 0.5 c\n1 0 0 0 n\nset_node_defaults 20 -1 -1 -1 n\n2 1 0 0 n\n",
    );
    let nodes = &out.document.root.nodes;
    assert_eq!(nodes.len(), 2);

    let a = &nodes[0].node_defaults;
    assert_eq!(a.load_weight, 10.0);
    assert_eq!(a.friction, 0.5);
    assert!(has(a.options, NodeOption::NoGroundContact));

    let b = &nodes[1].node_defaults;
    assert!(!Rc::ptr_eq(a, b));
    assert_eq!(b.load_weight, 20.0);
    assert_eq!(b.friction, 1.0);
    assert_eq!(b.volume, 1.0);
    assert_eq!(b.surface, 1.0);
    assert_eq!(b.options, 0);
}

#[test]
fn support_beam_reads_break_limit() {
    let out = parse("t\nbeams\nn1 n2 s 12.5\n");
    let beams = &out.document.root.beams;
    assert_eq!(beams.len(), 1);
    assert!(has(beams[0].options, BeamOption::Support));
    assert_eq!(beams[0].extension_break_limit, Some(12.5));
}

#[test]
fn user_flare_routes_control_number() {
    let out = parse("t\nflares2\nr a b 0.1 0.2 0.3 u 7 250 0.5 mat/flare\n");
    let flare = &out.document.root.flares2[0];
    assert_eq!(flare.flare_type, FlareType::User);
    assert_eq!(flare.control_number, 7);
    assert_eq!(flare.dashboard_link, "");
    assert_eq!(flare.blink_delay_milis, 250);
    assert_eq!(flare.size, 0.5);
    assert_eq!(flare.material_name, "mat/flare");
}

#[test]
fn command_center_mode_wins_over_one_press() {
    let out = parse("t\ncommands2\nn1 n2 1 1 0.1 0.9 11 12 cop _ 0 0 _ _ 1 true true\n");
    let command = &out.document.root.commands2[0];
    assert!(command.options.auto_center);
    assert!(!command.options.one_press_center);
    assert!(!command.options.one_press);
    let ignored = |letter: char| {
        out.diagnostics
            .messages()
            .iter()
            .filter(|d| d.message.contains(&format!("ignoring flag '{letter}'")))
            .count()
    };
    assert_eq!(ignored('o'), 1);
    assert_eq!(ignored('p'), 1);
}

#[test]
fn sections_isolate_their_records() {
    let out = parse("t\nsection 1 alt\nnodes\n1 0 0 0 n\nend_section\nnodes\n2 1 1 1 n\n");
    let alt = out.document.module("alt").expect("module alt");
    assert_eq!(alt.nodes.len(), 1);
    assert_eq!(alt.nodes[0].id, NodeId::Numbered(1));
    let root = &out.document.root;
    assert_eq!(root.nodes.len(), 1);
    assert_eq!(root.nodes[0].id, NodeId::Numbered(2));
}

#[test]
fn beam_defaults_groups_survive_round_trip() {
    let out = parse(
        "t\nnodes\n0 0 0 0\n1 1 0 0\n2 0 1 0\nbeams\nset_beam_defaults 100 10\n0 1\n1 2\nset_beam_defaults 200 20\n2 0\n",
    );
    let (text, again) = reparse(&out.document);
    let lines = text
        .lines()
        .filter(|l| l.starts_with("set_beam_defaults "))
        .count();
    assert_eq!(lines, 2);

    let beams = &again.document.root.beams;
    assert_eq!(beams.len(), 3);
    assert!(Rc::ptr_eq(&beams[0].defaults, &beams[1].defaults));
    assert!(!Rc::ptr_eq(&beams[1].defaults, &beams[2].defaults));
    assert_eq!(beams[0].defaults.springiness, 100.0);
    assert_eq!(beams[2].defaults.springiness, 200.0);
}
