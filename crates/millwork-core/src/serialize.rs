//! Persistence for the simulation engine.
//!
//! Two encodings of the same [`SaveData`] tree:
//! - a JSON snapshot keyed by node id, stable across releases and readable
//!   by external tools;
//! - a binary snapshot via `bitcode`, prefixed with a versioned header.
//!
//! Loading is staged: the whole snapshot is parsed and every node rebuilt
//! off to the side before the engine's state is replaced, so a failed load
//! leaves the engine untouched.

use crate::engine::{Camera, Engine};
use crate::event::Event;
use crate::fixed::{Fixed64, f64_to_fixed64, fixed64_to_f64};
use crate::graph::ConnectionGraph;
use crate::id::{NodeId, ResourceId};
use crate::node::{Node, NodeError, NodeState};
use crate::rng::SimRng;
use crate::sim::SimState;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic number identifying a binary engine snapshot.
pub const SNAPSHOT_MAGIC: u32 = 0x4D11_0001;

/// Current format version. Increment when breaking the snapshot layout.
pub const FORMAT_VERSION: u32 = 1;

/// Recipe value persisted for nodes still under construction.
pub const GHOST_RECIPE: &str = "ghost";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("json encoding failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("bitcode encoding failed: {0}")]
    Encode(String),
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("malformed snapshot json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("bitcode decoding failed: {0}")]
    Decode(String),
    #[error("invalid magic number: expected 0x{:08X}, got 0x{:08X}", SNAPSHOT_MAGIC, .0)]
    InvalidMagic(u32),
    #[error("snapshot version {found} does not match supported version {expected}")]
    VersionMismatch { found: u32, expected: u32 },
    #[error("invalid node id '{0}'")]
    InvalidNodeId(String),
    #[error("node {id}: {source}")]
    Node {
        id: String,
        #[source]
        source: NodeError,
    },
}

/// Non-fatal problems found while loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadWarning {
    VersionMismatch { found: u32, expected: u32 },
    /// An `outputs` entry names a node that is not in the snapshot.
    DanglingOutput { from: NodeId, to: NodeId },
    /// An edge out of a node that is still under construction.
    GhostSource { from: NodeId, to: NodeId },
    UnknownResource(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub warnings: Vec<LoadWarning>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Snapshot data
// ---------------------------------------------------------------------------

/// The persisted form of an engine. Keys are catalog keys and hyphenated
/// node ids so a snapshot survives catalog reordering.
///
/// Amounts, timers and the clock are written as `f64` in both snapshot
/// forms. A Q32.32 value round-trips exactly while its whole part stays
/// below 2^21; above that the lowest fraction bits are rounded away.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveData {
    pub version: u32,
    pub time: f64,
    #[serde(default)]
    pub camera: Camera,
    #[serde(default)]
    pub seen_resources: Vec<String>,
    #[serde(default)]
    pub nodes: BTreeMap<String, NodeSave>,
    /// RNG state. Absent means "reseed from config".
    #[serde(default)]
    pub rng: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSave {
    #[serde(rename = "type")]
    pub node_type: String,
    pub x: f64,
    pub y: f64,
    /// A recipe key, [`GHOST_RECIPE`], or null for an idle node.
    #[serde(default)]
    pub recipe: Option<String>,
    /// Amounts only; maxima are recomputed from the catalog.
    #[serde(default)]
    pub resources: BTreeMap<String, f64>,
    #[serde(default)]
    pub outputs: Vec<String>,
    #[serde(default)]
    pub start: Option<f64>,
    #[serde(default)]
    pub poked: bool,
}

/// Header prepended to every binary snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotHeader {
    pub magic: u32,
    pub version: u32,
    /// Clock at the time the snapshot was taken.
    pub time: f64,
}

impl SnapshotHeader {
    pub fn new(time: f64) -> Self {
        Self {
            magic: SNAPSHOT_MAGIC,
            version: FORMAT_VERSION,
            time,
        }
    }

    /// Checks the magic number. Version handling is left to the loader,
    /// which may only warn.
    pub fn validate(&self) -> Result<(), LoadError> {
        if self.magic != SNAPSHOT_MAGIC {
            return Err(LoadError::InvalidMagic(self.magic));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct BinarySnapshot {
    header: SnapshotHeader,
    data: SaveData,
}

/// Decode just the header of a binary snapshot.
///
/// bitcode has no partial decoding, so this decodes the whole snapshot.
pub fn read_snapshot_header(bytes: &[u8]) -> Result<SnapshotHeader, LoadError> {
    let snapshot: BinarySnapshot =
        bitcode::deserialize(bytes).map_err(|e| LoadError::Decode(e.to_string()))?;
    Ok(snapshot.header)
}

/// A fully rebuilt world, ready to swap into an engine.
struct Staged {
    nodes: BTreeMap<NodeId, Node>,
    graph: ConnectionGraph,
    seen: BTreeSet<ResourceId>,
    time: Fixed64,
    camera: Camera,
    rng: SimRng,
}

// ---------------------------------------------------------------------------
// Engine impl
// ---------------------------------------------------------------------------

impl Engine {
    /// Capture the engine as a [`SaveData`] tree.
    pub fn save_data(&self) -> SaveData {
        let catalog = &self.catalog;
        let resource_key = |id: ResourceId| catalog.resource(id).map(|def| def.key.clone());

        let nodes = self
            .nodes
            .values()
            .map(|node| {
                let (x, y) = node.position();
                let (recipe, start, poked) = match node.state() {
                    NodeState::Ghost { started, .. } => {
                        (Some(GHOST_RECIPE.to_string()), *started, false)
                    }
                    NodeState::Idle { recipe, armed } => (
                        recipe.and_then(|r| catalog.recipe(r)).map(|def| def.key.clone()),
                        None,
                        *armed,
                    ),
                    NodeState::Processing { recipe, started } => (
                        catalog.recipe(*recipe).map(|def| def.key.clone()),
                        Some(*started),
                        false,
                    ),
                };
                let save = NodeSave {
                    node_type: catalog
                        .node_type(node.node_type())
                        .map(|def| def.key.clone())
                        .unwrap_or_default(),
                    x,
                    y,
                    recipe,
                    resources: node
                        .ledger()
                        .iter()
                        .filter_map(|(res, stock)| {
                            Some((resource_key(res)?, fixed64_to_f64(stock.amount)))
                        })
                        .collect(),
                    outputs: self.graph.outputs(node.id()).map(|id| id.to_string()).collect(),
                    start: start.map(fixed64_to_f64),
                    poked,
                };
                (node.id().to_string(), save)
            })
            .collect();

        SaveData {
            version: FORMAT_VERSION,
            time: fixed64_to_f64(self.sim_state.time),
            camera: self.camera,
            seen_resources: self
                .seen_resources
                .iter()
                .filter_map(|id| resource_key(*id))
                .collect(),
            nodes,
            rng: Some(self.rng.state()),
        }
    }

    pub fn save_json(&self) -> Result<String, SaveError> {
        Ok(serde_json::to_string(&self.save_data())?)
    }

    pub fn save_json_pretty(&self) -> Result<String, SaveError> {
        Ok(serde_json::to_string_pretty(&self.save_data())?)
    }

    /// Replace the engine's world with a JSON snapshot.
    pub fn load_json(&mut self, json: &str) -> Result<LoadReport, LoadError> {
        let data: SaveData = serde_json::from_str(json)?;
        self.load_save_data(data)
    }

    /// Encode the engine as a binary snapshot.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SaveError> {
        let snapshot = BinarySnapshot {
            header: SnapshotHeader::new(fixed64_to_f64(self.sim_state.time)),
            data: self.save_data(),
        };
        bitcode::serialize(&snapshot).map_err(|e| SaveError::Encode(e.to_string()))
    }

    /// Replace the engine's world with a binary snapshot.
    pub fn from_bytes(&mut self, bytes: &[u8]) -> Result<LoadReport, LoadError> {
        let snapshot: BinarySnapshot =
            bitcode::deserialize(bytes).map_err(|e| LoadError::Decode(e.to_string()))?;
        snapshot.header.validate()?;
        let mut data = snapshot.data;
        data.version = snapshot.header.version;
        self.load_save_data(data)
    }

    /// Stage, then commit. Nothing is modified unless staging succeeds.
    pub fn load_save_data(&mut self, data: SaveData) -> Result<LoadReport, LoadError> {
        let mut report = LoadReport::default();
        if data.version != FORMAT_VERSION {
            let (found, expected) = (data.version, FORMAT_VERSION);
            if self.config.strict_version {
                return Err(LoadError::VersionMismatch { found, expected });
            }
            warn!(found, expected, "snapshot version mismatch, loading anyway");
            report
                .warnings
                .push(LoadWarning::VersionMismatch { found, expected });
        }

        let staged = self.stage(&data, &mut report)?;

        self.nodes = staged.nodes;
        self.graph = staged.graph;
        self.seen_resources = staged.seen;
        self.sim_state = SimState::at(staged.time);
        self.camera = staged.camera.sanitized();
        self.rng = staged.rng;
        self.pending = None;

        info!(nodes = self.nodes.len(), edges = self.graph.edge_count(), "snapshot loaded");
        self.events.emit(Event::SnapshotLoaded {
            nodes: self.nodes.len(),
            time: self.sim_state.time,
        });
        self.dirty.mark_graph();
        self.dirty.mark_catalog();
        for id in self.nodes.keys() {
            self.dirty.mark_node(*id);
        }
        Ok(report)
    }

    fn stage(&self, data: &SaveData, report: &mut LoadReport) -> Result<Staged, LoadError> {
        let catalog = Arc::clone(&self.catalog);

        // Pass 1: every node, in ghost state, then its recipe, amounts, timer.
        let mut nodes = BTreeMap::new();
        for (key, save) in &data.nodes {
            let id = parse_node_id(key)?;
            let node_error = |source: NodeError| LoadError::Node {
                id: key.clone(),
                source,
            };
            let type_id = catalog
                .node_type_id(&save.node_type)
                .ok_or_else(|| node_error(NodeError::UnknownNodeType(save.node_type.clone())))?;
            let mut node = Node::new(id, type_id, &catalog).map_err(node_error)?;
            node.set_position(save.x, save.y);

            match save.recipe.as_deref() {
                Some(GHOST_RECIPE) => {}
                recipe => {
                    node.complete_construction(&catalog);
                    let recipe_id = match recipe {
                        Some(recipe_key) => Some(catalog.recipe_id(recipe_key).ok_or_else(
                            || node_error(NodeError::UnknownRecipe(recipe_key.to_string())),
                        )?),
                        None => None,
                    };
                    node.set_recipe(&catalog, recipe_id).map_err(node_error)?;
                }
            }

            for (resource_key, amount) in &save.resources {
                // Untracked keys are ignored; the catalog may have changed.
                if let Some(resource) = catalog.resource_id(resource_key) {
                    node.ledger_mut()
                        .set_amount(resource, f64_to_fixed64(*amount));
                }
            }
            node.restore_timer(save.start.map(f64_to_fixed64), save.poked);
            nodes.insert(id, node);
        }

        // Pass 2: edges, once every endpoint exists.
        let mut graph = ConnectionGraph::new();
        for id in nodes.keys() {
            graph.insert_node(*id);
        }
        for (key, save) in &data.nodes {
            let from = parse_node_id(key)?;
            for target in &save.outputs {
                let to = parse_node_id(target)?;
                if !nodes.contains_key(&to) {
                    warn!(from = %from, to = %to, "dropping edge to unknown node");
                    report.warnings.push(LoadWarning::DanglingOutput { from, to });
                    continue;
                }
                if nodes.get(&from).is_some_and(Node::is_ghost) {
                    warn!(from = %from, to = %to, "dropping edge out of a ghost");
                    report.warnings.push(LoadWarning::GhostSource { from, to });
                    continue;
                }
                graph.connect(from, to);
            }
        }

        let mut seen = BTreeSet::new();
        for key in &data.seen_resources {
            match catalog.resource_id(key) {
                Some(resource) => {
                    seen.insert(resource);
                }
                None => report.warnings.push(LoadWarning::UnknownResource(key.clone())),
            }
        }

        Ok(Staged {
            nodes,
            graph,
            seen,
            time: f64_to_fixed64(data.time).max(Fixed64::ZERO),
            camera: data.camera,
            rng: SimRng::new(data.rng.unwrap_or(self.config.seed)),
        })
    }
}

fn parse_node_id(key: &str) -> Result<NodeId, LoadError> {
    key.parse()
        .map_err(|_| LoadError::InvalidNodeId(key.to_string()))
}
