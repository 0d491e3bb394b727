//! Minimal world example: a miner feeding a smelter it has to build first.
//!
//! Loads a catalog from an inline JSON document, places a miner and a ghost
//! smelter, wires them together and prints the event stream as the smelter
//! is built and starts producing iron.
//!
//! Run with: `cargo run -p millwork-core --example minimal_world`

use millwork_core::config::EngineConfig;
use millwork_core::data_loader::load_catalog_json;
use millwork_core::engine::Engine;
use millwork_core::event::Event;
use millwork_core::fixed::fixed64_to_f64;
use std::sync::Arc;

const CATALOG: &str = r#"{
    "resources": { "ore": { "color": "brown" }, "iron": { "color": "silver" } },
    "recipes": {
        "dig": { "speed": 1, "results": { "ore": 1 }, "resources": { "ore": 20 } },
        "smelt": {
            "speed": 3,
            "ingredients": { "ore": 2 },
            "results": { "iron": 1 },
            "resources": { "ore": 10, "iron": 10 }
        }
    },
    "nodes": {
        "miner": { "recipes": ["dig"] },
        "smelter": { "ingredients": { "ore": 5 }, "buildtime": 2, "recipes": ["smelt"] }
    }
}"#;

fn main() {
    let catalog = load_catalog_json(CATALOG).expect("catalog should load");
    let mut engine = Engine::new(Arc::new(catalog), EngineConfig::default());

    let miner = engine.add_node("miner", 0.0, 0.0).expect("miner placed");
    // The miner is free to build, so one update finishes it.
    engine.step();
    let smelter = engine.add_node("smelter", 100.0, 0.0).expect("smelter placed");
    engine.connect(miner, smelter).expect("both nodes exist");

    for _ in 0..20 {
        engine.step();
        for event in engine.drain_events() {
            match event {
                Event::ConstructionCompleted { node, time } if node == smelter => {
                    println!("[t={}] smelter built", fixed64_to_f64(time));
                }
                Event::RecipeCompleted { node, time, .. } if node == smelter => {
                    println!("[t={}] smelter produced iron", fixed64_to_f64(time));
                }
                Event::ResourceDiscovered { resource, time } => {
                    let key = engine
                        .catalog()
                        .resource(resource)
                        .map_or("?", |def| def.key.as_str());
                    println!("[t={}] discovered {key}", fixed64_to_f64(time));
                }
                _ => {}
            }
        }
    }

    if let Some(snapshot) = engine.snapshot_node(smelter) {
        println!("\nsmelter state: {:?}", snapshot.state);
        for res in &snapshot.resources {
            let key = engine
                .catalog()
                .resource(res.resource)
                .map_or("?", |def| def.key.as_str());
            println!(
                "  {key}: {} / {}",
                fixed64_to_f64(res.amount),
                fixed64_to_f64(res.maximum)
            );
        }
    }
}
