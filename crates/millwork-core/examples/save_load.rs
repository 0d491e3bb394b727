//! Save/load example: snapshot round-trip.
//!
//! Builds a small world, runs 10 updates, saves it as JSON and as a binary
//! snapshot, loads both into fresh engines and verifies the state hashes
//! match after running all three further.
//!
//! Run with: `cargo run -p millwork-core --example save_load`

use millwork_core::engine::Engine;
use millwork_core::test_utils::{place_chain, test_engine};

fn build_world() -> Engine {
    let mut engine = test_engine();
    place_chain(&mut engine, &["miner", "smelter", "crate"]);
    engine
}

fn main() {
    let mut original = build_world();
    for _ in 0..10 {
        original.step();
    }

    let json = original.save_json_pretty().expect("save should succeed");
    let bytes = original.to_bytes().expect("encode should succeed");
    println!("JSON snapshot: {} bytes", json.len());
    println!("binary snapshot: {} bytes", bytes.len());

    let mut from_json = test_engine();
    let report = from_json.load_json(&json).expect("load should succeed");
    println!("json load warnings: {:?}", report.warnings);

    let mut from_bytes = test_engine();
    from_bytes.from_bytes(&bytes).expect("decode should succeed");

    for _ in 0..10 {
        original.step();
        from_json.step();
        from_bytes.step();
    }

    let hashes = [
        original.state_hash(),
        from_json.state_hash(),
        from_bytes.state_hash(),
    ];
    println!("state hashes: {hashes:016x?}");
    assert!(hashes.iter().all(|h| *h == hashes[0]), "hashes diverged");
    println!("round trip OK");
}
