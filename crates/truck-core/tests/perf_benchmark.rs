use std::fmt::Write;
use std::time::Instant;
use truck_core::{ParserConfig, SerializerConfig, parse_truck, serialize_document};

#[test]
#[ignore] // Run manually with `cargo test --test perf_benchmark -- --nocapture --ignored`
fn benchmark_large_legacy_file() {
    let mut doc = String::from("Benchmark Truck\nnodes\n");
    // 50,000 numbered nodes in a line, chained by beams
    for i in 0..50_000 {
        let _ = writeln!(doc, "{i}, {}, 0.0, 0.0", i as f32 * 0.1);
    }
    doc.push_str("beams\n");
    for i in 1..50_000 {
        let _ = writeln!(doc, "{}, {i}", i - 1);
    }

    let start = Instant::now();
    let out = parse_truck(&doc, &ParserConfig::default());
    let parsed = start.elapsed();
    assert_eq!(out.document.root.nodes.len(), 50_000);

    let start = Instant::now();
    let text = serialize_document(&out.document, &SerializerConfig::default()).expect("serialize failed");
    let serialized = start.elapsed();

    println!("Parsed 50,000 nodes and 49,999 beams in {parsed:?}, serialized {} bytes in {serialized:?}", text.len());
}
