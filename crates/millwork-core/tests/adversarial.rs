//! Adversarial input tests for the Millwork engine.
//!
//! Tests edge cases that should either return errors or be handled gracefully
//! without panics.

use millwork_core::catalog::{CatalogBuilder, NodeTypeDef, RecipeDef, RecipeResults, ResourceMap};
use millwork_core::config::EngineConfig;
use millwork_core::engine::Engine;
use millwork_core::fixed::Fixed64;
use millwork_core::sim::SimulationStrategy;
use millwork_core::test_utils::*;
use std::sync::Arc;

/// Engine over a single auto node type running one recipe of `speed`
/// that turns nothing into 1 ore.
fn single_recipe_engine(speed: Fixed64) -> Engine {
    let mut b = CatalogBuilder::new();
    let results = b.resource_map(&[("ore", fx(1))]);
    let caps = b.resource_map(&[("ore", fx(1_000))]);
    let recipe = b.register_recipe(RecipeDef {
        key: "spring".to_string(),
        speed,
        ingredients: ResourceMap::new(),
        resources: caps,
        results: RecipeResults::Standard(results),
    });
    b.register_node_type(NodeTypeDef {
        key: "well".to_string(),
        category: "basic".to_string(),
        manual: false,
        radius: fx(30),
        build_time: Fixed64::ZERO,
        ingredients: ResourceMap::new(),
        resources: ResourceMap::new(),
        recipes: vec![recipe],
    });
    Engine::new(Arc::new(b.build().unwrap()), EngineConfig::default())
}

/// Zero-duration recipe: one cycle per update, never an infinite loop.
#[test]
fn zero_duration_recipe() {
    let mut engine = single_recipe_engine(Fixed64::ZERO);
    let well = place_built(&mut engine, "well");
    for _ in 0..10 {
        engine.step();
    }
    assert_eq!(amount(&engine, well, "ore"), fx(10));
}

/// A huge time jump is bounded by the catch-up limit.
#[test]
fn huge_time_jump_is_bounded() {
    let mut engine = single_recipe_engine(Fixed64::ONE);
    let well = place_built(&mut engine, "well");
    let mut cont = Engine::new(
        Arc::clone(engine.catalog()),
        EngineConfig {
            strategy: SimulationStrategy::Continuous,
            max_cycles_per_update: 8,
            ..Default::default()
        },
    );
    let cont_well = place_built(&mut cont, "well");
    cont.advance(Fixed64::ZERO);
    cont.advance(fx(1_000_000));
    cont.advance(Fixed64::ZERO);
    assert!(amount(&cont, cont_well, "ore") <= fx(9));
    assert_eq!(amount(&engine, well, "ore"), Fixed64::ZERO);
}

/// Two crates feeding each other: resources slosh but are never lost.
#[test]
fn two_node_cycle() {
    let mut engine = test_engine();
    let a = place_built(&mut engine, "crate");
    let b = place_built(&mut engine, "crate");
    engine.connect(a, b).unwrap();
    engine.connect(b, a).unwrap();
    engine.set_amount(a, resource(&engine, "ore"), fx(30)).unwrap();
    for _ in 0..50 {
        engine.step();
    }
    assert_eq!(
        amount(&engine, a, "ore") + amount(&engine, b, "ore"),
        fx(30)
    );
}

/// Self-loops and duplicates are refused.
#[test]
fn self_loop_and_duplicate_edges() {
    let mut engine = test_engine();
    let a = place_built(&mut engine, "crate");
    let b = place_built(&mut engine, "crate");
    assert!(!engine.connect(a, a).unwrap());
    assert!(engine.connect(a, b).unwrap());
    assert!(!engine.connect(a, b).unwrap());
    assert_eq!(engine.edge_count(), 1);
}

/// Capacities at the fixed-point limit do not overflow.
#[test]
fn saturating_amounts() {
    let mut engine = test_engine();
    let a = place_built(&mut engine, "crate");
    let ore = resource(&engine, "ore");
    engine.set_amount(a, ore, Fixed64::MAX).unwrap();
    assert_eq!(amount(&engine, a, "ore"), fx(100));
    engine.set_amount(a, ore, Fixed64::MIN).unwrap();
    assert_eq!(amount(&engine, a, "ore"), Fixed64::ZERO);
}

/// Non-finite coordinates land at the origin and still save and reload.
#[test]
fn non_finite_positions_round_trip() {
    let mut engine = test_engine();
    let a = engine.add_node("crate", f64::NAN, f64::INFINITY).unwrap();
    let b = place_built(&mut engine, "crate");
    engine.move_node(b, f64::NEG_INFINITY, 1.0).unwrap();
    engine.create_node("miner").unwrap();
    assert!(engine.move_pending(f64::NAN, 5.0));
    let c = engine.place_pending(2.0, f64::NAN).unwrap();

    assert_eq!(engine.node(a).unwrap().position(), (0.0, 0.0));
    assert_eq!(engine.node(b).unwrap().position(), (0.0, 1.0));
    assert_eq!(engine.node(c).unwrap().position(), (2.0, 0.0));
    engine.step();

    let json = engine.save_json().unwrap();
    let mut restored = test_engine();
    restored.load_json(&json).unwrap();
    assert_eq!(restored.node_count(), 3);
    assert_eq!(restored.state_hash(), engine.state_hash());
}

/// Truncated and corrupted snapshots return Err, not panic.
#[test]
fn corrupted_snapshots() {
    let mut source = test_engine();
    place_chain(&mut source, &["miner", "smelter", "crate"]);
    for _ in 0..5 {
        source.step();
    }
    let bytes = source.to_bytes().unwrap();
    let json = source.save_json().unwrap();

    let mut engine = test_engine();
    for cut in [0, 1, bytes.len() / 2] {
        assert!(engine.from_bytes(&bytes[..cut]).is_err());
    }
    for cut in [0, 1, json.len() / 2, json.len() - 1] {
        assert!(engine.load_json(&json[..cut]).is_err());
    }
    assert_eq!(engine.node_count(), 0);
}

/// Snapshot referencing a recipe the node type cannot run.
#[test]
fn ineligible_recipe_in_snapshot() {
    let mut source = test_engine();
    place_built(&mut source, "smelter");
    let mut data = source.save_data();
    if let Some(node) = data.nodes.values_mut().next() {
        node.recipe = Some("sift".to_string());
    }
    let mut engine = test_engine();
    assert!(engine.load_save_data(data).is_err());
}
