//! Production nodes and their recipe state machine.
//!
//! A node is Ghost (under construction), Idle (built, nothing running) or
//! Processing (ingredients paid, timer running). Edges are not stored here;
//! see [`crate::graph::ConnectionGraph`].

use crate::catalog::{Catalog, RecipeDef, RecipeResults, ResourceMap};
use crate::config::LeftoverRounding;
use crate::fixed::{Fixed64, SimTime};
use crate::id::*;
use crate::ledger::Ledger;
use crate::rng::SimRng;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NodeError {
    #[error("{0} is not a valid node type")]
    UnknownNodeType(String),
    #[error("{0} is not a valid recipe")]
    UnknownRecipe(String),
    #[error("{recipe} is not a valid recipe on a {node_type}")]
    RecipeNotEligible { recipe: String, node_type: String },
    #[error("cannot select a recipe on a ghost {node_type}")]
    GhostRecipe { node_type: String },
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// What a ghost needs before it becomes operational.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequirements {
    pub ingredients: ResourceMap,
    pub build_time: SimTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeState {
    /// Under construction. `started` is set once the build ingredients have
    /// been paid and the build timer is running.
    Ghost {
        build: BuildRequirements,
        started: Option<SimTime>,
    },
    /// Built and waiting. `armed` is set by a poke on a manual node.
    Idle {
        recipe: Option<RecipeId>,
        armed: bool,
    },
    /// Ingredients paid, timer running since `started`.
    Processing { recipe: RecipeId, started: SimTime },
}

/// A state change produced by [`Node::progress`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    ConstructionStarted,
    ConstructionCompleted,
    RecipeStarted(RecipeId),
    RecipeCompleted(RecipeId),
}

/// Per-update knobs for [`Node::progress`].
#[derive(Debug, Clone, Copy)]
pub struct ProgressParams {
    pub now: SimTime,
    pub rounding: LeftoverRounding,
    pub max_cycles: u32,
}

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    id: NodeId,
    node_type: NodeTypeId,
    x: f64,
    y: f64,
    ledger: Ledger,
    state: NodeState,
}

impl Node {
    /// Create a node of `node_type` in the Ghost state.
    pub fn new(id: NodeId, node_type: NodeTypeId, catalog: &Catalog) -> Result<Self, NodeError> {
        if catalog.node_type(node_type).is_none() {
            return Err(NodeError::UnknownNodeType(format!("{node_type:?}")));
        }
        let mut node = Self {
            id,
            node_type,
            x: 0.0,
            y: 0.0,
            ledger: Ledger::new(),
            state: NodeState::Idle {
                recipe: None,
                armed: false,
            },
        };
        node.set_ghost(catalog);
        Ok(node)
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn node_type(&self) -> NodeTypeId {
        self.node_type
    }

    pub fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    /// Non-finite coordinates are stored as 0 so every position survives
    /// a JSON snapshot.
    pub fn set_position(&mut self, x: f64, y: f64) {
        self.x = finite_or_zero(x);
        self.y = finite_or_zero(y);
    }

    pub fn state(&self) -> &NodeState {
        &self.state
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub(crate) fn ledger_mut(&mut self) -> &mut Ledger {
        &mut self.ledger
    }

    pub fn is_ghost(&self) -> bool {
        matches!(self.state, NodeState::Ghost { .. })
    }

    /// A ghost whose build timer is running.
    pub fn is_building(&self) -> bool {
        matches!(self.state, NodeState::Ghost { started: Some(_), .. })
    }

    pub fn is_processing(&self) -> bool {
        matches!(self.state, NodeState::Processing { .. })
    }

    /// Selected recipe. `None` for ghosts and nodes with no selection.
    pub fn recipe(&self) -> Option<RecipeId> {
        match self.state {
            NodeState::Ghost { .. } => None,
            NodeState::Idle { recipe, .. } => recipe,
            NodeState::Processing { recipe, .. } => Some(recipe),
        }
    }

    /// When the running cycle or build began.
    pub fn started(&self) -> Option<SimTime> {
        match self.state {
            NodeState::Ghost { started, .. } => started,
            NodeState::Idle { .. } => None,
            NodeState::Processing { started, .. } => Some(started),
        }
    }

    pub fn is_armed(&self) -> bool {
        matches!(self.state, NodeState::Idle { armed: true, .. })
    }

    // -- State changes ------------------------------------------------------

    /// Reset to a fresh ghost. Held resources are discarded.
    pub fn set_ghost(&mut self, catalog: &Catalog) {
        let build = catalog
            .node_type(self.node_type)
            .map(|def| BuildRequirements {
                ingredients: def.ingredients.clone(),
                build_time: def.build_time,
            })
            .unwrap_or(BuildRequirements {
                ingredients: ResourceMap::new(),
                build_time: Fixed64::ZERO,
            });
        self.state = NodeState::Ghost {
            build,
            started: None,
        };
        self.ledger.clear();
        self.update_resources(catalog);
    }

    /// Finish construction: select the only eligible recipe if there is
    /// exactly one, and switch to operating capacities.
    ///
    /// Edges are untouched. Inputs wired while the node was a ghost keep
    /// feeding it once it is built.
    pub fn complete_construction(&mut self, catalog: &Catalog) {
        let recipe = catalog
            .node_type(self.node_type)
            .and_then(|def| match def.recipes.as_slice() {
                [only] => Some(*only),
                _ => None,
            });
        self.state = NodeState::Idle {
            recipe,
            armed: false,
        };
        self.ledger.clear();
        self.update_resources(catalog);
    }

    /// Select a recipe (or clear the selection). Any running cycle is
    /// abandoned without refund.
    ///
    /// Fails on a ghost, or when the recipe is not eligible for this node
    /// type. The node is untouched on failure.
    pub fn set_recipe(&mut self, catalog: &Catalog, recipe: Option<RecipeId>) -> Result<(), NodeError> {
        let type_key = || {
            catalog
                .node_type(self.node_type)
                .map(|def| def.key.clone())
                .unwrap_or_default()
        };
        if self.is_ghost() {
            return Err(NodeError::GhostRecipe {
                node_type: type_key(),
            });
        }
        if let Some(recipe) = recipe {
            let Some(def) = catalog.recipe(recipe) else {
                return Err(NodeError::UnknownRecipe(format!("{recipe:?}")));
            };
            let eligible = catalog
                .node_type(self.node_type)
                .is_some_and(|node_def| node_def.recipes.contains(&recipe));
            if !eligible {
                return Err(NodeError::RecipeNotEligible {
                    recipe: def.key.clone(),
                    node_type: type_key(),
                });
            }
        }
        self.state = NodeState::Idle {
            recipe,
            armed: false,
        };
        self.update_resources(catalog);
        Ok(())
    }

    /// Arm a manual node's next start. Ignored unless the node is idle and
    /// ready. Returns whether the node is now armed.
    pub fn poke(&mut self, catalog: &Catalog) -> bool {
        if !self.is_ready(catalog) {
            return false;
        }
        match &mut self.state {
            NodeState::Idle { armed, .. } => {
                *armed = true;
                true
            }
            _ => false,
        }
    }

    /// Restore a persisted timer. Only meaningful right after the recipe
    /// or ghost state has been re-applied.
    pub(crate) fn restore_timer(&mut self, start: Option<SimTime>, poked: bool) {
        if let NodeState::Ghost { started, .. } = &mut self.state {
            *started = start;
            return;
        }
        let recipe = self.recipe();
        self.state = match (recipe, start) {
            (Some(recipe), Some(started)) => NodeState::Processing { recipe, started },
            (recipe, _) => NodeState::Idle {
                recipe,
                armed: poked,
            },
        };
    }

    // -- Queries against the catalog ----------------------------------------

    fn recipe_def<'c>(&self, catalog: &'c Catalog) -> Option<&'c RecipeDef> {
        self.recipe().and_then(|id| catalog.recipe(id))
    }

    fn is_manual(&self, catalog: &Catalog) -> bool {
        catalog
            .node_type(self.node_type)
            .is_some_and(|def| def.manual)
    }

    /// Capacities the ledger should track in the current state.
    fn capacities(&self, catalog: &Catalog) -> ResourceMap {
        match &self.state {
            NodeState::Ghost { build, .. } => build.ingredients.clone(),
            _ => {
                let mut caps = catalog
                    .node_type(self.node_type)
                    .map(|def| def.resources.clone())
                    .unwrap_or_default();
                if let Some(def) = self.recipe_def(catalog) {
                    caps.extend(def.resources.iter().map(|(k, v)| (*k, *v)));
                }
                caps
            }
        }
    }

    fn update_resources(&mut self, catalog: &Catalog) {
        let caps = self.capacities(catalog);
        self.ledger.recompute(&caps);
    }

    /// A ghost is always valid; otherwise the selected recipe must consume
    /// or produce something.
    pub fn is_recipe_valid(&self, catalog: &Catalog) -> bool {
        match &self.state {
            NodeState::Ghost { .. } => true,
            _ => self.recipe_def(catalog).is_some_and(RecipeDef::is_valid),
        }
    }

    /// Ingredients present and room for every result.
    pub fn is_ready(&self, catalog: &Catalog) -> bool {
        if !self.is_recipe_valid(catalog) {
            return false;
        }
        match &self.state {
            NodeState::Ghost { build, .. } => self.ledger.covers(&build.ingredients),
            _ => {
                let Some(def) = self.recipe_def(catalog) else {
                    return false;
                };
                self.ledger.covers(&def.ingredients)
                    && def.results.keys().into_iter().all(|resource| {
                        match self.ledger.get(resource) {
                            Some(stock) => def.results.max_yield(resource) <= stock.headroom(),
                            None => true,
                        }
                    })
            }
        }
    }

    /// How much of each resource this node wants to pull this update.
    ///
    /// Ghosts and nodes without a valid recipe want to fill up. Otherwise
    /// demand is `ceil(2 * cost - held)` per ingredient, clamped to the
    /// headroom. Only positive demands are returned.
    pub fn pull_demand(&self, catalog: &Catalog) -> Vec<(ResourceId, Fixed64)> {
        let recipe = match &self.state {
            NodeState::Ghost { .. } => None,
            _ => self.recipe_def(catalog).filter(|def| def.is_valid()),
        };
        let demand: Vec<(ResourceId, Fixed64)> = match recipe {
            None => self
                .ledger
                .iter()
                .map(|(resource, stock)| (resource, stock.headroom()))
                .collect(),
            Some(def) => def
                .ingredients
                .iter()
                .filter_map(|(resource, cost)| {
                    let stock = self.ledger.get(*resource)?;
                    let wanted = cost
                        .saturating_mul(Fixed64::from_num(2))
                        .saturating_sub(stock.amount)
                        .saturating_ceil();
                    Some((*resource, wanted.min(stock.headroom())))
                })
                .collect(),
        };
        demand
            .into_iter()
            .filter(|(_, amount)| *amount > Fixed64::ZERO)
            .collect()
    }

    /// Fraction of the running cycle or build completed, in `[0, 1]`.
    pub fn progress_fraction(&self, catalog: &Catalog, now: SimTime) -> Fixed64 {
        let (started, duration) = match &self.state {
            NodeState::Ghost {
                build,
                started: Some(started),
            } => (*started, build.build_time),
            NodeState::Processing { recipe, started } => {
                match catalog.recipe(*recipe) {
                    Some(def) => (*started, def.speed),
                    None => return Fixed64::ZERO,
                }
            }
            _ => return Fixed64::ZERO,
        };
        let elapsed = now.saturating_sub(started).max(Fixed64::ZERO);
        match elapsed.checked_div(duration) {
            Some(fraction) => fraction.min(Fixed64::ONE),
            None => Fixed64::ZERO,
        }
    }

    // -- Progression --------------------------------------------------------

    /// Advance the state machine at time `params.now`.
    ///
    /// Starts a cycle when ready, completes it once `now - started` reaches
    /// the duration, and when more than one duration has elapsed keeps
    /// going with the overrun as the next cycle's start. At most
    /// `max_cycles` completions happen per call, and at most one when the
    /// duration is zero.
    pub fn progress(
        &mut self,
        catalog: &Catalog,
        params: ProgressParams,
        rng: &mut SimRng,
        out: &mut Vec<Transition>,
    ) {
        let mut start_at = params.now;
        let mut completions = 0u32;

        loop {
            match &self.state {
                NodeState::Ghost { started: None, build } => {
                    if !self.ledger.covers(&build.ingredients) {
                        return;
                    }
                    let costs = build.ingredients.clone();
                    self.pay(&costs, params.rounding);
                    if let NodeState::Ghost { started, .. } = &mut self.state {
                        *started = Some(start_at);
                    }
                    out.push(Transition::ConstructionStarted);
                }
                NodeState::Ghost {
                    started: Some(started),
                    build,
                } => {
                    if params.now.saturating_sub(*started) < build.build_time {
                        return;
                    }
                    self.complete_construction(catalog);
                    out.push(Transition::ConstructionCompleted);
                    return;
                }
                NodeState::Idle {
                    recipe: Some(recipe),
                    armed,
                } => {
                    let recipe = *recipe;
                    let gated = self.is_manual(catalog) && !*armed;
                    if gated || !self.is_ready(catalog) {
                        return;
                    }
                    let Some(def) = catalog.recipe(recipe) else {
                        return;
                    };
                    let costs = def.ingredients.clone();
                    self.pay(&costs, params.rounding);
                    self.state = NodeState::Processing {
                        recipe,
                        started: start_at,
                    };
                    out.push(Transition::RecipeStarted(recipe));
                }
                NodeState::Idle { recipe: None, .. } => return,
                NodeState::Processing { recipe, started } => {
                    let (recipe, started) = (*recipe, *started);
                    let Some(def) = catalog.recipe(recipe) else {
                        return;
                    };
                    if params.now.saturating_sub(started) < def.speed {
                        return;
                    }
                    let results = pick_results(&def.results, rng);
                    for (resource, amount) in results.iter() {
                        self.ledger.credit(*resource, *amount);
                    }
                    let speed = def.speed;
                    self.state = NodeState::Idle {
                        recipe: Some(recipe),
                        armed: false,
                    };
                    out.push(Transition::RecipeCompleted(recipe));

                    completions += 1;
                    if speed <= Fixed64::ZERO || completions >= params.max_cycles {
                        return;
                    }
                    start_at = started.saturating_add(speed);
                }
            }
        }
    }

    fn pay(&mut self, costs: &ResourceMap, rounding: LeftoverRounding) {
        for (resource, cost) in costs {
            let Some(stock) = self.ledger.get(*resource) else {
                continue;
            };
            let left = rounding.leftover(stock.amount, *cost, stock.maximum);
            self.ledger.set_amount(*resource, left);
        }
    }
}

/// Results of one completion. Chance recipes draw one outcome by weight.
pub(crate) fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() { v } else { 0.0 }
}

fn pick_results(results: &RecipeResults, rng: &mut SimRng) -> ResourceMap {
    match results {
        RecipeResults::Standard(map) => map.clone(),
        RecipeResults::Chance(outcomes) => {
            let weights: Vec<Fixed64> = outcomes.iter().map(|o| o.weight).collect();
            rng.pick_weighted(&weights)
                .and_then(|index| outcomes.get(index))
                .map(|outcome| outcome.results.clone())
                .unwrap_or_default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    fn params(now: i32) -> ProgressParams {
        ProgressParams {
            now: Fixed64::from_num(now),
            rounding: LeftoverRounding::Exact,
            max_cycles: 64,
        }
    }

    fn run(node: &mut Node, catalog: &Catalog, now: i32, rng: &mut SimRng) -> Vec<Transition> {
        let mut out = Vec::new();
        node.progress(catalog, params(now), rng, &mut out);
        out
    }

    #[test]
    fn new_node_is_ghost_with_build_capacities() {
        let cat = test_catalog();
        let node = Node::new(node_id(1), cat.node_type_id("smelter").unwrap(), &cat).unwrap();
        assert!(node.is_ghost());
        let ore = cat.resource_id("ore").unwrap();
        assert_eq!(node.ledger().get(ore).unwrap().maximum, fx(5));
        assert_eq!(node.ledger().amount(ore), Fixed64::ZERO);
        assert_eq!(node.ledger().len(), 1);
    }

    #[test]
    fn unknown_type_rejected() {
        let cat = test_catalog();
        let err = Node::new(node_id(1), NodeTypeId(99), &cat).unwrap_err();
        assert!(matches!(err, NodeError::UnknownNodeType(_)));
    }

    #[test]
    fn ghost_builds_after_build_time() {
        let cat = test_catalog();
        let mut rng = SimRng::new(0);
        let mut node = Node::new(node_id(1), cat.node_type_id("smelter").unwrap(), &cat).unwrap();
        let ore = cat.resource_id("ore").unwrap();
        node.ledger_mut().set_amount(ore, fx(5));

        assert_eq!(run(&mut node, &cat, 0, &mut rng), vec![Transition::ConstructionStarted]);
        assert!(node.is_building());
        assert_eq!(node.ledger().amount(ore), Fixed64::ZERO);
        assert!(run(&mut node, &cat, 1, &mut rng).is_empty());
        assert_eq!(run(&mut node, &cat, 2, &mut rng), vec![Transition::ConstructionCompleted]);
        assert!(!node.is_ghost());
        // smelter has exactly one recipe
        assert_eq!(node.recipe(), cat.recipe_id("smelt"));
        assert_eq!(node.ledger().get(ore).unwrap().maximum, fx(10));
    }

    #[test]
    fn ghost_waits_for_ingredients() {
        let cat = test_catalog();
        let mut rng = SimRng::new(0);
        let mut node = Node::new(node_id(1), cat.node_type_id("smelter").unwrap(), &cat).unwrap();
        let ore = cat.resource_id("ore").unwrap();
        node.ledger_mut().set_amount(ore, fx(4));
        assert!(run(&mut node, &cat, 0, &mut rng).is_empty());
        assert!(!node.is_building());
    }

    #[test]
    fn set_recipe_on_ghost_fails_and_leaves_state() {
        let cat = test_catalog();
        let mut node = Node::new(node_id(1), cat.node_type_id("smelter").unwrap(), &cat).unwrap();
        let before = node.clone();
        let err = node.set_recipe(&cat, cat.recipe_id("smelt")).unwrap_err();
        assert!(matches!(err, NodeError::GhostRecipe { .. }));
        assert_eq!(node, before);
    }

    #[test]
    fn ineligible_recipe_rejected() {
        let cat = test_catalog();
        let mut node = built_node(&cat, "smelter", 1);
        let err = node.set_recipe(&cat, cat.recipe_id("sift")).unwrap_err();
        assert_eq!(
            err,
            NodeError::RecipeNotEligible {
                recipe: "sift".to_string(),
                node_type: "smelter".to_string()
            }
        );
        assert_eq!(node.recipe(), cat.recipe_id("smelt"));
    }

    #[test]
    fn standard_recipe_completes_after_speed() {
        let cat = test_catalog();
        let mut rng = SimRng::new(0);
        let mut node = built_node(&cat, "smelter", 1);
        let ore = cat.resource_id("ore").unwrap();
        let iron = cat.resource_id("iron").unwrap();
        node.ledger_mut().set_amount(ore, fx(2));

        assert_eq!(
            run(&mut node, &cat, 10, &mut rng),
            vec![Transition::RecipeStarted(cat.recipe_id("smelt").unwrap())]
        );
        assert_eq!(node.ledger().amount(ore), Fixed64::ZERO);
        assert!(run(&mut node, &cat, 12, &mut rng).is_empty());
        assert_eq!(node.progress_fraction(&cat, fx(12)), Fixed64::from_num(2) / 3);

        let out = run(&mut node, &cat, 13, &mut rng);
        assert_eq!(out, vec![Transition::RecipeCompleted(cat.recipe_id("smelt").unwrap())]);
        assert_eq!(node.ledger().amount(iron), fx(1));
    }

    #[test]
    fn catch_up_runs_several_cycles() {
        let cat = test_catalog();
        let mut rng = SimRng::new(0);
        let mut node = built_node(&cat, "smelter", 1);
        let ore = cat.resource_id("ore").unwrap();
        let iron = cat.resource_id("iron").unwrap();
        node.ledger_mut().set_amount(ore, fx(6));

        run(&mut node, &cat, 0, &mut rng);
        // 9 time units later: three cycles fit (0..3, 3..6, 6..9).
        let out = run(&mut node, &cat, 9, &mut rng);
        let completed = out
            .iter()
            .filter(|t| matches!(t, Transition::RecipeCompleted(_)))
            .count();
        assert_eq!(completed, 3);
        assert_eq!(node.ledger().amount(iron), fx(3));
        assert_eq!(node.ledger().amount(ore), Fixed64::ZERO);
    }

    #[test]
    fn catch_up_is_bounded() {
        let cat = test_catalog();
        let mut rng = SimRng::new(0);
        let mut node = built_node(&cat, "smelter", 1);
        let ore = cat.resource_id("ore").unwrap();
        node.ledger_mut().set_amount(ore, fx(10));
        run(&mut node, &cat, 0, &mut rng);

        let mut out = Vec::new();
        let p = ProgressParams {
            max_cycles: 2,
            ..params(100)
        };
        node.progress(&cat, p, &mut rng, &mut out);
        let completed = out
            .iter()
            .filter(|t| matches!(t, Transition::RecipeCompleted(_)))
            .count();
        assert_eq!(completed, 2);
    }

    #[test]
    fn manual_node_needs_poke() {
        let cat = test_catalog();
        let mut rng = SimRng::new(0);
        let mut node = built_node(&cat, "quarry", 1);
        assert!(run(&mut node, &cat, 0, &mut rng).is_empty());

        assert!(node.poke(&cat));
        assert!(node.is_armed());
        let out = run(&mut node, &cat, 1, &mut rng);
        assert_eq!(out.len(), 1);
        assert!(node.is_processing());
        assert!(!node.poke(&cat));

        let out = run(&mut node, &cat, 2, &mut rng);
        assert!(matches!(out.as_slice(), [Transition::RecipeCompleted(_)]));
        // completion disarms
        assert!(run(&mut node, &cat, 3, &mut rng).is_empty());
    }

    #[test]
    fn ready_requires_result_headroom() {
        let cat = test_catalog();
        let mut node = built_node(&cat, "smelter", 1);
        let ore = cat.resource_id("ore").unwrap();
        let iron = cat.resource_id("iron").unwrap();
        node.ledger_mut().set_amount(ore, fx(2));
        node.ledger_mut().set_amount(iron, fx(10));
        assert!(!node.is_ready(&cat));
        node.ledger_mut().set_amount(iron, fx(9));
        assert!(node.is_ready(&cat));
    }

    #[test]
    fn pull_demand_for_recipe_is_twice_cost() {
        let cat = test_catalog();
        let mut node = built_node(&cat, "smelter", 1);
        let ore = cat.resource_id("ore").unwrap();
        assert_eq!(node.pull_demand(&cat), vec![(ore, fx(4))]);
        node.ledger_mut().set_amount(ore, fx(3));
        assert_eq!(node.pull_demand(&cat), vec![(ore, fx(1))]);
        node.ledger_mut().set_amount(ore, fx(5));
        assert!(node.pull_demand(&cat).is_empty());
    }

    #[test]
    fn pull_demand_for_ghost_is_headroom() {
        let cat = test_catalog();
        let node = Node::new(node_id(1), cat.node_type_id("smelter").unwrap(), &cat).unwrap();
        let ore = cat.resource_id("ore").unwrap();
        assert_eq!(node.pull_demand(&cat), vec![(ore, fx(5))]);
    }

    #[test]
    fn changing_recipe_drops_untracked_stock() {
        let cat = test_catalog();
        let mut node = built_node(&cat, "smelter", 1);
        let iron = cat.resource_id("iron").unwrap();
        node.ledger_mut().set_amount(iron, fx(4));
        node.set_recipe(&cat, None).unwrap();
        assert!(!node.ledger().contains(iron));
    }

    #[test]
    fn snap_rounding_applies_on_start() {
        let cat = test_catalog();
        let mut rng = SimRng::new(0);
        let mut node = built_node(&cat, "smelter", 1);
        let ore = cat.resource_id("ore").unwrap();
        node.ledger_mut().set_amount(ore, Fixed64::from_num(5.5));
        let mut out = Vec::new();
        let p = ProgressParams {
            rounding: LeftoverRounding::SnapToCost,
            ..params(0)
        };
        node.progress(&cat, p, &mut rng, &mut out);
        assert_eq!(node.ledger().amount(ore), fx(4));
    }

    #[test]
    fn chance_recipe_yields_one_outcome() {
        let cat = test_catalog();
        let mut rng = SimRng::new(5);
        let mut node = built_node(&cat, "sifter", 1);
        let gravel = cat.resource_id("gravel").unwrap();
        let gem = cat.resource_id("gem").unwrap();
        let sand = cat.resource_id("sand").unwrap();
        for t in 0..20 {
            node.ledger_mut().set_amount(gravel, fx(1));
            run(&mut node, &cat, t * 2, &mut rng);
            let before = (node.ledger().amount(gem), node.ledger().amount(sand));
            run(&mut node, &cat, t * 2 + 1, &mut rng);
            let after = (node.ledger().amount(gem), node.ledger().amount(sand));
            let gained = (after.0 - before.0) + (after.1 - before.1);
            assert_eq!(gained, fx(1));
            node.ledger_mut().set_amount(gem, Fixed64::ZERO);
            node.ledger_mut().set_amount(sand, Fixed64::ZERO);
        }
    }

    #[test]
    fn restore_timer_rebuilds_processing_state() {
        let cat = test_catalog();
        let mut node = built_node(&cat, "smelter", 1);
        node.restore_timer(Some(fx(4)), false);
        assert_eq!(
            node.state(),
            &NodeState::Processing {
                recipe: cat.recipe_id("smelt").unwrap(),
                started: fx(4)
            }
        );
        let mut idle = built_node(&cat, "quarry", 2);
        idle.restore_timer(None, true);
        assert!(idle.is_armed());
    }
}
