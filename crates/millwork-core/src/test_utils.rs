//! Shared test helpers for integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests, integration tests, and benchmarks (via the
//! `test-utils` feature).

use crate::catalog::{
    Catalog, CatalogBuilder, ChanceOutcome, NodeTypeDef, RecipeDef, RecipeResults,
};
use crate::config::EngineConfig;
use crate::engine::Engine;
use crate::fixed::Fixed64;
use crate::id::*;
use crate::node::Node;
use std::sync::Arc;
use uuid::Uuid;

// ===========================================================================
// Scalars and ids
// ===========================================================================

pub fn fx(v: i32) -> Fixed64 {
    Fixed64::from_num(v)
}

/// A node id that sorts by `n`.
pub fn node_id(n: u8) -> NodeId {
    NodeId(Uuid::from_u128(n as u128))
}

// ===========================================================================
// Catalog
// ===========================================================================

/// A small catalog covering every production shape:
///
/// | node type  | build cost | recipes        | notes                  |
/// |------------|------------|----------------|------------------------|
/// | `smelter`  | ore 5, 2s  | smelt          | auto                   |
/// | `miner`    | free       | dig            | auto, no ingredients   |
/// | `quarry`   | free       | hand_dig       | manual                 |
/// | `sifter`   | free       | sift           | chance results         |
/// | `crate`    | free       | none           | holds ore and iron     |
/// | `workshop` | free       | smelt, sift    | no default recipe      |
pub fn test_catalog() -> Catalog {
    let mut b = CatalogBuilder::new();
    b.register_resource("ore", "brown");
    b.register_resource("iron", "silver");
    b.register_resource("stone", "grey");
    b.register_resource("gravel", "grey");
    b.register_resource("gem", "green");
    b.register_resource("sand", "yellow");

    let iron = b.resource_map(&[("iron", fx(1))]);
    let smelt = recipe(
        &mut b,
        "smelt",
        3,
        &[("ore", fx(2))],
        RecipeResults::Standard(iron),
        &[("ore", fx(10)), ("iron", fx(10))],
    );
    let ore = b.resource_map(&[("ore", fx(1))]);
    let dig = recipe(
        &mut b,
        "dig",
        1,
        &[],
        RecipeResults::Standard(ore),
        &[("ore", fx(20))],
    );
    let stone = b.resource_map(&[("stone", fx(1))]);
    let hand_dig = recipe(
        &mut b,
        "hand_dig",
        1,
        &[],
        RecipeResults::Standard(stone),
        &[("stone", fx(10))],
    );
    let gem = b.resource_map(&[("gem", fx(1))]);
    let sand = b.resource_map(&[("sand", fx(1))]);
    let sift = recipe(
        &mut b,
        "sift",
        1,
        &[("gravel", fx(1))],
        RecipeResults::Chance(vec![
            ChanceOutcome {
                weight: fx(1),
                results: gem,
            },
            ChanceOutcome {
                weight: fx(3),
                results: sand,
            },
        ]),
        &[("gravel", fx(10)), ("gem", fx(10)), ("sand", fx(10))],
    );

    node(&mut b, "smelter", false, &[("ore", fx(5))], 2, &[], vec![smelt]);
    node(&mut b, "miner", false, &[], 0, &[], vec![dig]);
    node(&mut b, "quarry", true, &[], 0, &[], vec![hand_dig]);
    node(&mut b, "sifter", false, &[], 0, &[], vec![sift]);
    node(
        &mut b,
        "crate",
        false,
        &[],
        0,
        &[("ore", fx(100)), ("iron", fx(100))],
        vec![],
    );
    node(&mut b, "workshop", false, &[], 0, &[], vec![smelt, sift]);

    b.build().expect("test catalog is valid")
}

fn recipe(
    b: &mut CatalogBuilder,
    key: &str,
    speed: i32,
    ingredients: &[(&str, Fixed64)],
    results: RecipeResults,
    caps: &[(&str, Fixed64)],
) -> RecipeId {
    let ingredients = b.resource_map(ingredients);
    let resources = b.resource_map(caps);
    b.register_recipe(RecipeDef {
        key: key.to_string(),
        speed: fx(speed),
        ingredients,
        resources,
        results,
    })
}

fn node(
    b: &mut CatalogBuilder,
    key: &str,
    manual: bool,
    build: &[(&str, Fixed64)],
    build_time: i32,
    resources: &[(&str, Fixed64)],
    recipes: Vec<RecipeId>,
) {
    let ingredients = b.resource_map(build);
    let resources = b.resource_map(resources);
    b.register_node_type(NodeTypeDef {
        key: key.to_string(),
        category: "test".to_string(),
        manual,
        radius: fx(30),
        build_time: fx(build_time),
        ingredients,
        resources,
        recipes,
    });
}

// ===========================================================================
// Nodes
// ===========================================================================

pub fn ghost_node(catalog: &Catalog, key: &str, n: u8) -> Node {
    let type_id = catalog.node_type_id(key).expect("known node type");
    Node::new(node_id(n), type_id, catalog).expect("node builds")
}

/// A node with construction already complete.
pub fn built_node(catalog: &Catalog, key: &str, n: u8) -> Node {
    let mut node = ghost_node(catalog, key, n);
    node.complete_construction(catalog);
    node
}

// ===========================================================================
// Engines
// ===========================================================================

pub fn test_engine() -> Engine {
    Engine::new(Arc::new(test_catalog()), EngineConfig::default())
}

pub fn test_engine_with(config: EngineConfig) -> Engine {
    Engine::new(Arc::new(test_catalog()), config)
}

/// Place a node of `key` at the origin and finish its construction.
pub fn place_built(engine: &mut Engine, key: &str) -> NodeId {
    let id = engine.add_node(key, 0.0, 0.0).expect("known node type");
    let catalog = Arc::clone(engine.catalog());
    if let Some(node) = engine.nodes.get_mut(&id) {
        node.complete_construction(&catalog);
    }
    id
}

/// Place built nodes and connect them in a line: `keys[0] -> keys[1] -> ...`.
pub fn place_chain(engine: &mut Engine, keys: &[&str]) -> Vec<NodeId> {
    let ids: Vec<NodeId> = keys.iter().map(|key| place_built(engine, key)).collect();
    for pair in ids.windows(2) {
        engine.connect(pair[0], pair[1]).expect("both nodes exist");
    }
    ids
}

pub fn resource(engine: &Engine, key: &str) -> ResourceId {
    engine.catalog().resource_id(key).expect("known resource")
}

pub fn amount(engine: &Engine, node: NodeId, key: &str) -> Fixed64 {
    let res = resource(engine, key);
    engine
        .node(node)
        .map_or(Fixed64::ZERO, |n| n.ledger().amount(res))
}
