//! Read-only query API for inspecting simulation state.
//!
//! Snapshot types are owned copies with no references into engine storage,
//! suitable for handing to rendering or UI code.

use crate::fixed::Fixed64;
use crate::id::{NodeId, NodeTypeId, RecipeId, ResourceId};

/// Coarse lifecycle label for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateLabel {
    /// Placed, still collecting build ingredients.
    Ghost,
    /// Build timer running.
    Building,
    Idle,
    Processing,
}

/// One tracked resource of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceSnapshot {
    pub resource: ResourceId,
    pub amount: Fixed64,
    pub maximum: Fixed64,
}

/// An aggregated, read-only view of a single node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSnapshot {
    pub id: NodeId,
    pub node_type: NodeTypeId,
    pub x: f64,
    pub y: f64,
    pub state: StateLabel,
    pub recipe: Option<RecipeId>,
    /// Progress of the running cycle or build as a 0..1 fraction.
    pub progress: Fixed64,
    pub resources: Vec<ResourceSnapshot>,
    pub inputs: Vec<NodeId>,
    pub outputs: Vec<NodeId>,
}
