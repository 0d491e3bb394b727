//! The simulation engine: owns the node collection and the connection
//! graph, and drives the per-update pipeline.
//!
//! # Architecture
//!
//! The `Engine` owns:
//! - Every placed [`Node`], keyed by [`NodeId`] and iterated in id order
//! - A [`ConnectionGraph`] holding the edges between them
//! - The set of resources ever seen at a positive quantity
//! - A [`SimState`] (logical clock, update counter)
//! - A seeded [`SimRng`] for chance recipes and new node ids
//! - An [`EventLog`] and a [`DirtyTracker`] for UI layers to poll
//!
//! # Update pipeline
//!
//! Each update runs:
//! 1. **Pull** -- every node not mid-build pulls from its inputs
//! 2. **Progress** -- every node starts and completes cycles or builds
//! 3. **Discover** -- newly seen resources are recorded and reported
//! 4. **Clock** -- the logical clock advances

use crate::catalog::{Catalog, DefinitionKind};
use crate::config::EngineConfig;
use crate::dirty::DirtyTracker;
use crate::event::{Event, EventKind, EventLog};
use crate::fixed::{Fixed64, SimTime, fixed64_to_f64};
use crate::graph::ConnectionGraph;
use crate::id::*;
use crate::node::{Node, NodeError, NodeState, ProgressParams, Transition, finite_or_zero};
use crate::query::{NodeSnapshot, ResourceSnapshot, StateLabel};
use crate::rng::SimRng;
use crate::sim::{AdvanceResult, SimState, SimulationStrategy, StateHash};
use crate::transfer;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{debug, info};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),
    #[error(transparent)]
    Node(#[from] NodeError),
    #[error("debug mode is not enabled")]
    DebugDisabled,
}

// ---------------------------------------------------------------------------
// Camera
// ---------------------------------------------------------------------------

/// Viewport state. Opaque to the simulation; stored and persisted only.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Camera {
    pub x: f64,
    pub y: f64,
    pub zoom: f64,
}

impl Camera {
    /// Non-finite components fall back to the default view.
    pub fn sanitized(self) -> Self {
        let zoom = if self.zoom.is_finite() && self.zoom > 0.0 {
            self.zoom
        } else {
            1.0
        };
        Self {
            x: finite_or_zero(self.x),
            y: finite_or_zero(self.y),
            zoom,
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct Engine {
    pub(crate) catalog: Arc<Catalog>,
    pub(crate) config: EngineConfig,

    pub(crate) nodes: BTreeMap<NodeId, Node>,
    pub(crate) graph: ConnectionGraph,

    /// Resources ever observed at a positive quantity. Gates unlocks.
    pub(crate) seen_resources: BTreeSet<ResourceId>,

    pub(crate) sim_state: SimState,
    pub(crate) camera: Camera,
    pub(crate) rng: SimRng,

    /// Ghost staged by `create_node`, not yet part of the graph.
    pub(crate) pending: Option<Node>,

    pub(crate) paused: bool,
    pub(crate) debug: bool,

    pub(crate) events: EventLog,
    pub(crate) dirty: DirtyTracker,
}

impl Engine {
    pub fn new(catalog: Arc<Catalog>, config: EngineConfig) -> Self {
        Self {
            catalog,
            rng: SimRng::new(config.seed),
            events: EventLog::new(config.event_capacity),
            config,
            nodes: BTreeMap::new(),
            graph: ConnectionGraph::new(),
            seen_resources: BTreeSet::new(),
            sim_state: SimState::new(),
            camera: Camera::default(),
            pending: None,
            paused: false,
            debug: false,
            dirty: DirtyTracker::new(),
        }
    }

    pub fn with_defaults(catalog: Arc<Catalog>) -> Self {
        Self::new(catalog, EngineConfig::default())
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Current logical clock.
    pub fn time(&self) -> SimTime {
        self.sim_state.time
    }

    /// Number of updates run since construction or the last load.
    pub fn tick(&self) -> u64 {
        self.sim_state.tick
    }

    pub fn camera(&self) -> Camera {
        self.camera
    }

    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = camera.sanitized();
    }

    // -----------------------------------------------------------------------
    // Advance
    // -----------------------------------------------------------------------

    /// Run one update and advance the clock by the configured tick length.
    pub fn step(&mut self) -> AdvanceResult {
        let delta = self.config.tick_length();
        self.run(delta)
    }

    /// Advance according to the configured strategy.
    ///
    /// - **Tick mode**: `dt` is ignored; exactly one `step()` runs.
    /// - **Continuous mode**: one update runs and the clock moves by
    ///   `dt * timescale`. Negative `dt` is treated as zero.
    pub fn advance(&mut self, dt: SimTime) -> AdvanceResult {
        match self.config.strategy {
            SimulationStrategy::Tick => self.step(),
            SimulationStrategy::Continuous => {
                let delta = dt
                    .max(Fixed64::ZERO)
                    .saturating_mul(self.config.timescale());
                self.run(delta)
            }
        }
    }

    fn run(&mut self, delta: SimTime) -> AdvanceResult {
        if self.paused {
            return AdvanceResult::default();
        }
        let discovered = self.update();
        self.sim_state.time = self.sim_state.time.saturating_add(delta);
        self.sim_state.tick += 1;
        AdvanceResult {
            steps_run: 1,
            discovered,
        }
    }

    /// Phases 1-3 at the current clock. Returns newly discovered resources.
    fn update(&mut self) -> Vec<ResourceId> {
        let catalog = Arc::clone(&self.catalog);
        let now = self.sim_state.time;

        // Phase 1: pull.
        let transfers = transfer::pull_all(&mut self.nodes, &self.graph, &catalog);
        for t in &transfers {
            self.dirty.mark_node(t.from);
            self.dirty.mark_node(t.to);
        }

        // Phase 2: progress.
        let params = ProgressParams {
            now,
            rounding: self.config.leftover_rounding,
            max_cycles: self.config.max_cycles_per_update.max(1),
        };
        let mut transitions = Vec::new();
        for (id, node) in self.nodes.iter_mut() {
            transitions.clear();
            node.progress(&catalog, params, &mut self.rng, &mut transitions);
            if transitions.is_empty() {
                continue;
            }
            self.dirty.mark_node(*id);
            for transition in &transitions {
                let event = match *transition {
                    Transition::ConstructionStarted => Event::ConstructionStarted {
                        node: *id,
                        time: now,
                    },
                    Transition::ConstructionCompleted => {
                        debug!(node = %id, "construction completed");
                        Event::ConstructionCompleted {
                            node: *id,
                            time: now,
                        }
                    }
                    Transition::RecipeStarted(recipe) => Event::RecipeStarted {
                        node: *id,
                        recipe,
                        time: now,
                    },
                    Transition::RecipeCompleted(recipe) => Event::RecipeCompleted {
                        node: *id,
                        recipe,
                        time: now,
                    },
                };
                self.events.emit(event);
            }
        }

        // Phase 3: discover.
        let mut discovered = Vec::new();
        for node in self.nodes.values() {
            for (resource, stock) in node.ledger().iter() {
                if stock.amount > Fixed64::ZERO && self.seen_resources.insert(resource) {
                    discovered.push(resource);
                }
            }
        }
        for resource in &discovered {
            let key = catalog.resource(*resource).map_or("?", |def| def.key.as_str());
            info!(resource = key, "new resource discovered");
            self.events.emit(Event::ResourceDiscovered {
                resource: *resource,
                time: now,
            });
        }
        if !discovered.is_empty() {
            self.dirty.mark_catalog();
        }
        discovered
    }

    // -----------------------------------------------------------------------
    // Pause / Resume
    // -----------------------------------------------------------------------

    /// Pause the simulation. While paused, `advance()` and `step()` are
    /// no-ops and the clock stands still. Commands still apply.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    // -----------------------------------------------------------------------
    // Node placement
    // -----------------------------------------------------------------------

    /// Stage a ghost of `node_type` for placement. While one is staged,
    /// further calls return the staged id unchanged.
    pub fn create_node(&mut self, node_type: &str) -> Result<NodeId, EngineError> {
        if let Some(pending) = &self.pending {
            return Ok(pending.id());
        }
        let node = self.build_node(node_type)?;
        let id = node.id();
        self.pending = Some(node);
        Ok(id)
    }

    pub fn pending_node(&self) -> Option<&Node> {
        self.pending.as_ref()
    }

    /// Move the staged ghost. Returns `false` if nothing is staged.
    pub fn move_pending(&mut self, x: f64, y: f64) -> bool {
        match &mut self.pending {
            Some(node) => {
                node.set_position(x, y);
                true
            }
            None => false,
        }
    }

    /// Commit the staged ghost to the graph at `(x, y)`.
    pub fn place_pending(&mut self, x: f64, y: f64) -> Option<NodeId> {
        let mut node = self.pending.take()?;
        node.set_position(x, y);
        Some(self.insert_node(node))
    }

    /// Discard the staged ghost.
    pub fn cancel_pending(&mut self) -> Option<NodeId> {
        self.pending.take().map(|node| node.id())
    }

    /// Place a new ghost of `node_type` directly.
    pub fn add_node(&mut self, node_type: &str, x: f64, y: f64) -> Result<NodeId, EngineError> {
        let mut node = self.build_node(node_type)?;
        node.set_position(x, y);
        Ok(self.insert_node(node))
    }

    fn build_node(&mut self, node_type: &str) -> Result<Node, EngineError> {
        let type_id = self
            .catalog
            .node_type_id(node_type)
            .ok_or_else(|| NodeError::UnknownNodeType(node_type.to_string()))?;
        let id = self.fresh_node_id();
        Ok(Node::new(id, type_id, &self.catalog)?)
    }

    fn fresh_node_id(&mut self) -> NodeId {
        loop {
            let id = NodeId::from_random_bytes(self.rng.bytes16());
            let staged = self.pending.as_ref().is_some_and(|n| n.id() == id);
            if !staged && !self.nodes.contains_key(&id) {
                return id;
            }
        }
    }

    pub(crate) fn insert_node(&mut self, node: Node) -> NodeId {
        let id = node.id();
        let node_type = node.node_type();
        debug!(node = %id, node_type = self.type_key(node_type), "node placed");
        self.graph.insert_node(id);
        self.nodes.insert(id, node);
        self.events.emit(Event::NodeAdded {
            node: id,
            node_type,
            time: self.sim_state.time,
        });
        self.dirty.mark_graph();
        self.dirty.mark_node(id);
        id
    }

    pub fn move_node(&mut self, id: NodeId, x: f64, y: f64) -> Result<(), EngineError> {
        self.node_mut(id)?.set_position(x, y);
        self.dirty.mark_node(id);
        Ok(())
    }

    /// Remove a node, severing every edge it had first.
    pub fn delete_node(&mut self, id: NodeId) -> Result<(), EngineError> {
        if !self.nodes.contains_key(&id) {
            return Err(EngineError::NodeNotFound(id));
        }
        let removed = self.graph.remove_node(id);
        for edge in removed {
            self.emit_edge_removed(edge.from, edge.to);
        }
        self.nodes.remove(&id);
        debug!(node = %id, "node deleted");
        self.events.emit(Event::NodeRemoved {
            node: id,
            time: self.sim_state.time,
        });
        self.dirty.mark_graph();
        self.dirty.mark_node(id);
        Ok(())
    }

    /// Remove every node, edge and seen resource, and reset the clock.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.graph.clear();
        self.seen_resources.clear();
        self.pending = None;
        self.sim_state = SimState::new();
        self.dirty.mark_graph();
        self.dirty.mark_catalog();
    }

    // -----------------------------------------------------------------------
    // Connections
    // -----------------------------------------------------------------------

    /// Add the edge `from -> to`. Returns whether an edge was added;
    /// self-edges, duplicates and ghost sources are ignored.
    pub fn connect(&mut self, from: NodeId, to: NodeId) -> Result<bool, EngineError> {
        let source = self.node(from).ok_or(EngineError::NodeNotFound(from))?;
        if source.is_ghost() {
            return Ok(false);
        }
        if !self.nodes.contains_key(&to) {
            return Err(EngineError::NodeNotFound(to));
        }
        if !self.graph.connect(from, to) {
            return Ok(false);
        }
        self.events.emit(Event::EdgeAdded {
            from,
            to,
            time: self.sim_state.time,
        });
        self.dirty.mark_graph();
        Ok(true)
    }

    /// Remove the edge `from -> to`. Returns whether it existed.
    pub fn disconnect(&mut self, from: NodeId, to: NodeId) -> Result<bool, EngineError> {
        self.require(from)?;
        self.require(to)?;
        if !self.graph.disconnect(from, to) {
            return Ok(false);
        }
        self.emit_edge_removed(from, to);
        self.dirty.mark_graph();
        Ok(true)
    }

    /// Flip the edge `node -> other`. Returns whether it exists afterwards.
    pub fn toggle_output(&mut self, node: NodeId, other: NodeId) -> Result<bool, EngineError> {
        if self.graph.has_edge(node, other) {
            self.disconnect(node, other).map(|_| false)
        } else {
            self.connect(node, other)
        }
    }

    /// Flip the edge `other -> node`. Returns whether it exists afterwards.
    pub fn toggle_input(&mut self, node: NodeId, other: NodeId) -> Result<bool, EngineError> {
        if self.graph.has_edge(other, node) {
            self.disconnect(other, node).map(|_| false)
        } else {
            self.connect(other, node)
        }
    }

    /// Sever every edge into `node`. Returns how many were removed.
    pub fn clear_inputs(&mut self, node: NodeId) -> Result<usize, EngineError> {
        self.require(node)?;
        let removed = self.graph.clear_inputs(node);
        for edge in &removed {
            self.emit_edge_removed(edge.from, edge.to);
        }
        if !removed.is_empty() {
            self.dirty.mark_graph();
        }
        Ok(removed.len())
    }

    /// Sever every edge out of `node`. Returns how many were removed.
    pub fn clear_outputs(&mut self, node: NodeId) -> Result<usize, EngineError> {
        self.require(node)?;
        let removed = self.graph.clear_outputs(node);
        for edge in &removed {
            self.emit_edge_removed(edge.from, edge.to);
        }
        if !removed.is_empty() {
            self.dirty.mark_graph();
        }
        Ok(removed.len())
    }

    fn emit_edge_removed(&mut self, from: NodeId, to: NodeId) {
        self.events.emit(Event::EdgeRemoved {
            from,
            to,
            time: self.sim_state.time,
        });
    }

    /// Whether `other -> node` exists.
    pub fn has_input(&self, node: NodeId, other: NodeId) -> bool {
        self.graph.has_edge(other, node)
    }

    /// Whether `node -> other` exists.
    pub fn has_output(&self, node: NodeId, other: NodeId) -> bool {
        self.graph.has_edge(node, other)
    }

    pub fn inputs(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.graph.inputs(node)
    }

    pub fn outputs(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.graph.outputs(node)
    }

    pub fn graph(&self) -> &ConnectionGraph {
        &self.graph
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    // -----------------------------------------------------------------------
    // Recipes
    // -----------------------------------------------------------------------

    /// Select a recipe by key, or clear the selection with `None`.
    pub fn set_recipe(&mut self, id: NodeId, recipe: Option<&str>) -> Result<(), EngineError> {
        let recipe_id = match recipe {
            Some(key) => Some(
                self.catalog
                    .recipe_id(key)
                    .ok_or_else(|| NodeError::UnknownRecipe(key.to_string()))?,
            ),
            None => None,
        };
        let catalog = Arc::clone(&self.catalog);
        self.node_mut(id)?.set_recipe(&catalog, recipe_id)?;
        debug!(node = %id, recipe = recipe.unwrap_or("none"), "recipe changed");
        self.events.emit(Event::RecipeChanged {
            node: id,
            recipe: recipe_id,
            time: self.sim_state.time,
        });
        self.dirty.mark_node(id);
        Ok(())
    }

    /// Arm a manual node's next cycle. Returns whether it was armed.
    pub fn poke(&mut self, id: NodeId) -> Result<bool, EngineError> {
        let catalog = Arc::clone(&self.catalog);
        let armed = self.node_mut(id)?.poke(&catalog);
        if armed {
            self.dirty.mark_node(id);
        }
        Ok(armed)
    }

    /// Overwrite one tracked amount, clamped to `[0, maximum]`. Returns
    /// `false` if the node does not track `resource`.
    pub fn set_amount(
        &mut self,
        id: NodeId,
        resource: ResourceId,
        amount: Fixed64,
    ) -> Result<bool, EngineError> {
        let tracked = self.node_mut(id)?.ledger_mut().set_amount(resource, amount);
        self.dirty.mark_node(id);
        Ok(tracked)
    }

    // -----------------------------------------------------------------------
    // Unlocks
    // -----------------------------------------------------------------------

    pub fn seen_resources(&self) -> &BTreeSet<ResourceId> {
        &self.seen_resources
    }

    pub fn has_seen(&self, resource: ResourceId) -> bool {
        self.seen_resources.contains(&resource)
    }

    /// Whether a definition is available to the player: every ingredient
    /// it needs has been seen. Debug mode and `unlock_all` unlock all.
    pub fn is_unlocked(&self, kind: DefinitionKind, key: &str) -> bool {
        if self.debug || self.config.unlock_all {
            return true;
        }
        match kind {
            DefinitionKind::Node => self
                .catalog
                .node_type_by_key(key)
                .is_some_and(|def| def.ingredients.keys().all(|r| self.has_seen(*r))),
            DefinitionKind::Recipe => self
                .catalog
                .recipe_by_key(key)
                .is_some_and(|def| def.ingredients.keys().all(|r| self.has_seen(*r))),
            DefinitionKind::Resource => self
                .catalog
                .resource_id(key)
                .is_some_and(|id| self.has_seen(id)),
        }
    }

    // -----------------------------------------------------------------------
    // Debug
    // -----------------------------------------------------------------------

    pub fn set_debug(&mut self, enabled: bool) {
        if enabled && !self.debug {
            info!("debug mode enabled");
        }
        self.debug = enabled;
        self.dirty.mark_catalog();
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    /// Fill every tracked resource of a node to its maximum.
    pub fn debug_fill(&mut self, id: NodeId) -> Result<(), EngineError> {
        if !self.debug {
            return Err(EngineError::DebugDisabled);
        }
        self.node_mut(id)?.ledger_mut().fill_all();
        self.dirty.mark_node(id);
        Ok(())
    }

    /// Zero every tracked resource of a node.
    pub fn debug_empty(&mut self, id: NodeId) -> Result<(), EngineError> {
        if !self.debug {
            return Err(EngineError::DebugDisabled);
        }
        self.node_mut(id)?.ledger_mut().empty_all();
        self.dirty.mark_node(id);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Events & dirty tracking
    // -----------------------------------------------------------------------

    pub fn event_log(&self) -> &EventLog {
        &self.events
    }

    /// Take every event recorded since the last drain.
    pub fn drain_events(&mut self) -> Vec<Event> {
        self.events.drain()
    }

    pub fn suppress_event(&mut self, kind: EventKind) {
        self.events.suppress(kind);
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.is_dirty()
    }

    pub fn dirty_tracker(&self) -> &DirtyTracker {
        &self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty.mark_clean();
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, EngineError> {
        self.nodes.get_mut(&id).ok_or(EngineError::NodeNotFound(id))
    }

    fn require(&self, id: NodeId) -> Result<(), EngineError> {
        if self.nodes.contains_key(&id) {
            Ok(())
        } else {
            Err(EngineError::NodeNotFound(id))
        }
    }

    /// Placed nodes in id order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn type_key(&self, node_type: NodeTypeId) -> &str {
        self.catalog
            .node_type(node_type)
            .map_or("?", |def| def.key.as_str())
    }

    /// First node (in id order) whose radius contains `(x, y)`.
    pub fn node_at(&self, x: f64, y: f64) -> Option<NodeId> {
        self.nodes.values().find_map(|node| {
            let radius = self
                .catalog
                .node_type(node.node_type())
                .map_or(0.0, |def| fixed64_to_f64(def.radius));
            let (nx, ny) = node.position();
            let (dx, dy) = (x - nx, y - ny);
            (dx * dx + dy * dy < radius * radius).then_some(node.id())
        })
    }

    pub fn snapshot_node(&self, id: NodeId) -> Option<NodeSnapshot> {
        let node = self.nodes.get(&id)?;
        let state = match node.state() {
            NodeState::Ghost { started: None, .. } => StateLabel::Ghost,
            NodeState::Ghost { started: Some(_), .. } => StateLabel::Building,
            NodeState::Idle { .. } => StateLabel::Idle,
            NodeState::Processing { .. } => StateLabel::Processing,
        };
        let (x, y) = node.position();
        Some(NodeSnapshot {
            id,
            node_type: node.node_type(),
            x,
            y,
            state,
            recipe: node.recipe(),
            progress: node.progress_fraction(&self.catalog, self.sim_state.time),
            resources: node
                .ledger()
                .iter()
                .map(|(resource, stock)| ResourceSnapshot {
                    resource,
                    amount: stock.amount,
                    maximum: stock.maximum,
                })
                .collect(),
            inputs: self.graph.inputs(id).collect(),
            outputs: self.graph.outputs(id).collect(),
        })
    }

    pub fn snapshot_all_nodes(&self) -> Vec<NodeSnapshot> {
        self.nodes
            .keys()
            .filter_map(|id| self.snapshot_node(*id))
            .collect()
    }

    // -----------------------------------------------------------------------
    // State hash
    // -----------------------------------------------------------------------

    /// FNV-1a over the clock, seen resources and every node's state. Two
    /// engines with equal hashes will evolve identically.
    pub fn state_hash(&self) -> u64 {
        let mut hasher = StateHash::new();
        hasher.write_fixed64(self.sim_state.time);
        hasher.write_u64(self.rng.state());

        hasher.write_u64(self.seen_resources.len() as u64);
        for resource in &self.seen_resources {
            hasher.write_u32(resource.0);
        }

        for (id, node) in &self.nodes {
            hasher.write(id.0.as_bytes());
            hasher.write_u32(node.node_type().0);
            let (x, y) = node.position();
            hasher.write_f64(x);
            hasher.write_f64(y);

            match node.state() {
                NodeState::Ghost { started, .. } => {
                    hasher.write_u32(0);
                    hasher.write_fixed64(started.unwrap_or(Fixed64::from_num(-1)));
                }
                NodeState::Idle { recipe, armed } => {
                    hasher.write_u32(1);
                    hasher.write_u32(recipe.map_or(u32::MAX, |r| r.0));
                    hasher.write_u32(*armed as u32);
                }
                NodeState::Processing { recipe, started } => {
                    hasher.write_u32(2);
                    hasher.write_u32(recipe.0);
                    hasher.write_fixed64(*started);
                }
            }

            for (resource, stock) in node.ledger().iter() {
                hasher.write_u32(resource.0);
                hasher.write_fixed64(stock.amount);
                hasher.write_fixed64(stock.maximum);
            }
            for output in self.graph.outputs(*id) {
                hasher.write(output.0.as_bytes());
            }
        }
        hasher.finish()
    }
}
