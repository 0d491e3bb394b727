//! Snapshot scenarios against a catalog loaded from disk.
//!
//! The loading engine gets its own freshly loaded catalog, the way a game
//! restarting from a save file would.

use std::path::PathBuf;
use std::sync::Arc;

use millwork_core::config::EngineConfig;
use millwork_core::engine::Engine;
use millwork_core::id::NodeId;
use millwork_core::serialize::{FORMAT_VERSION, GHOST_RECIPE, LoadError, LoadWarning, SaveData};
use millwork_data::load_game_data;

fn data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../millwork-data/data")
}

fn engine_with(config: impl FnOnce(EngineConfig) -> EngineConfig) -> Engine {
    let data = load_game_data(&data_dir()).unwrap();
    Engine::new(Arc::new(data.catalog), config(data.config))
}

fn engine() -> Engine {
    engine_with(|c| c)
}

/// miner -> smelter -> crate placed as ghosts. Returns the smelter and the
/// crate, which still has to be wired once the smelter is built.
fn place_factory(engine: &mut Engine) -> (NodeId, NodeId) {
    let miner = engine.add_node("miner", 0.0, 0.0).unwrap();
    let smelter = engine.add_node("smelter", 100.0, 0.0).unwrap();
    let storage = engine.add_node("crate", 200.0, 0.0).unwrap();
    engine.connect(miner, smelter).unwrap();
    (smelter, storage)
}

/// The whole factory, wired as soon as the smelter stands, run for `steps`
/// updates in total.
fn running_factory(steps: usize) -> Engine {
    let mut engine = engine();
    let (smelter, storage) = place_factory(&mut engine);
    for _ in 0..steps {
        if !engine.node(smelter).unwrap().is_ghost() {
            engine.connect(smelter, storage).unwrap();
        }
        engine.step();
    }
    engine
}

#[test]
fn json_resume_matches_uninterrupted_run() {
    let mut original = running_factory(15);
    let json = original.save_json().unwrap();

    let mut restored = engine();
    let report = restored.load_json(&json).unwrap();
    assert!(report.is_clean());
    assert_eq!(restored.state_hash(), original.state_hash());

    for _ in 0..100 {
        original.step();
        restored.step();
    }
    assert_eq!(restored.state_hash(), original.state_hash());
    assert_eq!(restored.save_data(), original.save_data());
}

#[test]
fn binary_resume_matches_uninterrupted_run() {
    let mut original = running_factory(40);
    let bytes = original.to_bytes().unwrap();

    let mut restored = engine();
    restored.from_bytes(&bytes).unwrap();
    for _ in 0..60 {
        original.step();
        restored.step();
    }
    assert_eq!(restored.state_hash(), original.state_hash());
}

#[test]
fn early_save_keeps_ghosts_as_ghosts() {
    // One step in: the miner is built, the smelter and crate are not.
    let mut original = engine();
    place_factory(&mut original);
    original.step();
    let data = original.save_data();
    let ghosts = data
        .nodes
        .values()
        .filter(|n| n.recipe.as_deref() == Some(GHOST_RECIPE))
        .count();
    assert_eq!(ghosts, 2);

    let mut restored = engine();
    restored.load_save_data(data).unwrap();
    let ghost_count = restored.nodes().filter(|n| n.is_ghost()).count();
    assert_eq!(ghost_count, 2);
}

#[test]
fn hand_edited_save_without_optional_fields() {
    let json = r#"{
        "version": 1,
        "time": 10,
        "nodes": {
            "6f1c2a3b-0000-4000-8000-000000000001": {
                "type": "crate", "x": 5, "y": 5,
                "recipe": null,
                "resources": { "iron": 40 },
                "outputs": ["6f1c2a3b-0000-4000-8000-000000000002"]
            },
            "6f1c2a3b-0000-4000-8000-000000000002": {
                "type": "crate", "x": 90, "y": 5
            }
        }
    }"#;
    let mut engine = engine();
    let report = engine.load_json(json).unwrap();
    assert!(report.is_clean());
    assert_eq!(engine.node_count(), 2);
    assert_eq!(engine.edge_count(), 1);

    engine.step();
    let iron = engine.catalog().resource_id("iron").unwrap();
    let total: f64 = engine
        .nodes()
        .map(|n| n.ledger().amount(iron).to_num::<f64>())
        .sum();
    assert_eq!(total, 40.0);
}

#[test]
fn older_version_warns_unless_strict() {
    let mut data: SaveData = running_factory(5).save_data();
    data.version = FORMAT_VERSION + 1;

    let mut lenient = engine();
    let report = lenient.load_save_data(data.clone()).unwrap();
    assert!(report.warnings.iter().any(|w| matches!(
        w,
        LoadWarning::VersionMismatch { .. }
    )));

    let mut strict = engine_with(|c| EngineConfig {
        strict_version: true,
        ..c
    });
    let err = strict.load_save_data(data).unwrap_err();
    assert!(matches!(err, LoadError::VersionMismatch { .. }));
    assert_eq!(strict.node_count(), 0);
}

#[test]
fn save_from_other_catalog_is_rejected_cleanly() {
    let mut data = running_factory(5).save_data();
    if let Some(node) = data.nodes.values_mut().next() {
        node.node_type = "teleporter".to_string();
    }
    let mut engine = engine();
    let existing = engine.add_node("miner", 0.0, 0.0).unwrap();
    assert!(engine.load_save_data(data).is_err());
    assert!(engine.node(existing).is_some());
    assert_eq!(engine.node_count(), 1);
}
