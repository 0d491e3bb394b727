use crate::id::NodeId;
use std::collections::BTreeSet;

/// Tracks what changed since the last clean point, for UI layers that
/// redraw or re-check unlocks incrementally.
///
/// The engine marks; the caller reads and then calls
/// [`mark_clean`](DirtyTracker::mark_clean).
#[derive(Debug, Clone, Default)]
pub struct DirtyTracker {
    dirty_nodes: BTreeSet<NodeId>,
    graph_dirty: bool,
    catalog_dirty: bool,
    any_dirty: bool,
}

impl DirtyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a single node as dirty (ledger, recipe or position changed).
    pub fn mark_node(&mut self, node: NodeId) {
        self.dirty_nodes.insert(node);
        self.any_dirty = true;
    }

    /// Mark the topology as dirty (node or edge added or removed).
    pub fn mark_graph(&mut self) {
        self.graph_dirty = true;
        self.any_dirty = true;
    }

    /// Mark unlock state as stale (the seen-resource set grew).
    pub fn mark_catalog(&mut self) {
        self.catalog_dirty = true;
        self.any_dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.any_dirty
    }

    pub fn is_node_dirty(&self, node: NodeId) -> bool {
        self.dirty_nodes.contains(&node)
    }

    pub fn is_graph_dirty(&self) -> bool {
        self.graph_dirty
    }

    pub fn is_catalog_dirty(&self) -> bool {
        self.catalog_dirty
    }

    pub fn dirty_nodes(&self) -> &BTreeSet<NodeId> {
        &self.dirty_nodes
    }

    /// Reset all dirty flags, marking everything as clean.
    pub fn mark_clean(&mut self) {
        self.dirty_nodes.clear();
        self.graph_dirty = false;
        self.catalog_dirty = false;
        self.any_dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::node_id;

    #[test]
    fn new_tracker_is_clean() {
        let tracker = DirtyTracker::new();
        assert!(!tracker.is_dirty());
        assert!(!tracker.is_graph_dirty());
        assert!(!tracker.is_catalog_dirty());
        assert!(tracker.dirty_nodes().is_empty());
    }

    #[test]
    fn mark_node_sets_dirty() {
        let mut tracker = DirtyTracker::new();
        tracker.mark_node(node_id(1));
        assert!(tracker.is_dirty());
        assert!(tracker.is_node_dirty(node_id(1)));
        assert!(!tracker.is_node_dirty(node_id(2)));
    }

    #[test]
    fn catalog_flag_independent_of_graph() {
        let mut tracker = DirtyTracker::new();
        tracker.mark_catalog();
        assert!(tracker.is_catalog_dirty());
        assert!(!tracker.is_graph_dirty());
    }

    #[test]
    fn mark_clean_resets_everything() {
        let mut tracker = DirtyTracker::new();
        tracker.mark_node(node_id(1));
        tracker.mark_graph();
        tracker.mark_catalog();
        tracker.mark_clean();
        assert!(!tracker.is_dirty());
        assert!(!tracker.is_graph_dirty());
        assert!(!tracker.is_catalog_dirty());
        assert!(tracker.dirty_nodes().is_empty());
    }

    #[test]
    fn marking_same_node_twice_is_idempotent() {
        let mut tracker = DirtyTracker::new();
        tracker.mark_node(node_id(3));
        tracker.mark_node(node_id(3));
        assert_eq!(tracker.dirty_nodes().len(), 1);
    }
}
