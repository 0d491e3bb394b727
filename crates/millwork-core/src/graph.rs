//! Directed connection graph between nodes.
//!
//! Adjacency is indexed by [`NodeId`] in both directions. Every mutation
//! updates both ends, so `a` in `b.inputs` holds exactly when `b` is in
//! `a.outputs`. Self-edges and duplicates are refused as no-ops.

use crate::id::NodeId;
use std::collections::{BTreeMap, BTreeSet};

/// One node's neighbors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Adjacency {
    pub inputs: BTreeSet<NodeId>,
    pub outputs: BTreeSet<NodeId>,
}

/// A directed edge `from -> to`. Resources flow along it by the receiver
/// pulling from the sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionGraph {
    adjacency: BTreeMap<NodeId, Adjacency>,
}

impl ConnectionGraph {
    pub fn new() -> Self {
        Self::default()
    }

    // -- Nodes ---------------------------------------------------------------

    /// Start tracking a node with no edges. No-op if already present.
    pub fn insert_node(&mut self, node: NodeId) {
        self.adjacency.entry(node).or_default();
    }

    /// Stop tracking a node, severing every edge it had. Returns the
    /// removed edges.
    pub fn remove_node(&mut self, node: NodeId) -> Vec<Edge> {
        let removed = self.sever(node);
        self.adjacency.remove(&node);
        removed
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.adjacency.contains_key(&node)
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn clear(&mut self) {
        self.adjacency.clear();
    }

    // -- Edges ---------------------------------------------------------------

    /// Add `from -> to`. Returns `false` (and changes nothing) for a
    /// self-edge, an unknown endpoint, or an edge that already exists.
    pub fn connect(&mut self, from: NodeId, to: NodeId) -> bool {
        if from == to || !self.contains(from) || !self.contains(to) {
            return false;
        }
        if self.has_edge(from, to) {
            return false;
        }
        if let Some(adj) = self.adjacency.get_mut(&from) {
            adj.outputs.insert(to);
        }
        if let Some(adj) = self.adjacency.get_mut(&to) {
            adj.inputs.insert(from);
        }
        true
    }

    /// Remove `from -> to`. Returns whether the edge existed.
    pub fn disconnect(&mut self, from: NodeId, to: NodeId) -> bool {
        let existed = self
            .adjacency
            .get_mut(&from)
            .is_some_and(|adj| adj.outputs.remove(&to));
        if let Some(adj) = self.adjacency.get_mut(&to) {
            adj.inputs.remove(&from);
        }
        existed
    }

    pub fn has_edge(&self, from: NodeId, to: NodeId) -> bool {
        self.adjacency
            .get(&from)
            .is_some_and(|adj| adj.outputs.contains(&to))
    }

    /// Sever every edge into `node`.
    pub fn clear_inputs(&mut self, node: NodeId) -> Vec<Edge> {
        let sources: Vec<NodeId> = self.inputs(node).collect();
        sources
            .into_iter()
            .filter(|from| self.disconnect(*from, node))
            .map(|from| Edge { from, to: node })
            .collect()
    }

    /// Sever every edge out of `node`.
    pub fn clear_outputs(&mut self, node: NodeId) -> Vec<Edge> {
        let targets: Vec<NodeId> = self.outputs(node).collect();
        targets
            .into_iter()
            .filter(|to| self.disconnect(node, *to))
            .map(|to| Edge { from: node, to })
            .collect()
    }

    /// Sever every edge touching `node`, outputs first.
    pub fn sever(&mut self, node: NodeId) -> Vec<Edge> {
        let mut removed = self.clear_outputs(node);
        removed.extend(self.clear_inputs(node));
        removed
    }

    // -- Queries -------------------------------------------------------------

    /// Nodes with an edge into `node`, in id order.
    pub fn inputs(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.adjacency
            .get(&node)
            .into_iter()
            .flat_map(|adj| adj.inputs.iter().copied())
    }

    /// Nodes `node` has an edge to, in id order.
    pub fn outputs(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.adjacency
            .get(&node)
            .into_iter()
            .flat_map(|adj| adj.outputs.iter().copied())
    }

    pub fn adjacency(&self, node: NodeId) -> Option<&Adjacency> {
        self.adjacency.get(&node)
    }

    /// Every edge, ordered by source then target.
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.adjacency.iter().flat_map(|(from, adj)| {
            adj.outputs.iter().map(move |to| Edge { from: *from, to: *to })
        })
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(|adj| adj.outputs.len()).sum()
    }

    /// Check the mutual-reference invariant over the whole graph: no
    /// self-edges, no references to unknown nodes, every output mirrored
    /// by an input and vice versa.
    pub fn is_consistent(&self) -> bool {
        self.adjacency.iter().all(|(id, adj)| {
            !adj.inputs.contains(id)
                && !adj.outputs.contains(id)
                && adj.outputs.iter().all(|to| {
                    self.adjacency
                        .get(to)
                        .is_some_and(|other| other.inputs.contains(id))
                })
                && adj.inputs.iter().all(|from| {
                    self.adjacency
                        .get(from)
                        .is_some_and(|other| other.outputs.contains(id))
                })
        })
    }
}
