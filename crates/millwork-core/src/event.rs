//! Typed change log with a pre-allocated ring buffer.
//!
//! The engine records an [`Event`] for every externally visible change:
//! graph edits, recipe selection, cycle starts and completions, builds,
//! resource discoveries and snapshot loads. Nothing is pushed to callers;
//! they poll [`EventLog::drain`] between updates.
//!
//! # Suppression
//!
//! Event kinds can be suppressed via [`EventLog::suppress`]. Suppressed
//! events are never recorded.

use crate::fixed::SimTime;
use crate::id::*;

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

/// A simulation event. All events carry the simulated time they occurred at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    // -- Graph --
    NodeAdded {
        node: NodeId,
        node_type: NodeTypeId,
        time: SimTime,
    },
    NodeRemoved {
        node: NodeId,
        time: SimTime,
    },
    EdgeAdded {
        from: NodeId,
        to: NodeId,
        time: SimTime,
    },
    EdgeRemoved {
        from: NodeId,
        to: NodeId,
        time: SimTime,
    },

    // -- Production --
    RecipeChanged {
        node: NodeId,
        recipe: Option<RecipeId>,
        time: SimTime,
    },
    RecipeStarted {
        node: NodeId,
        recipe: RecipeId,
        time: SimTime,
    },
    RecipeCompleted {
        node: NodeId,
        recipe: RecipeId,
        time: SimTime,
    },

    // -- Construction --
    ConstructionStarted {
        node: NodeId,
        time: SimTime,
    },
    ConstructionCompleted {
        node: NodeId,
        time: SimTime,
    },

    // -- World --
    ResourceDiscovered {
        resource: ResourceId,
        time: SimTime,
    },
    SnapshotLoaded {
        nodes: usize,
        time: SimTime,
    },
}

/// Discriminant tag for event types, used for suppression and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    NodeAdded,
    NodeRemoved,
    EdgeAdded,
    EdgeRemoved,
    RecipeChanged,
    RecipeStarted,
    RecipeCompleted,
    ConstructionStarted,
    ConstructionCompleted,
    ResourceDiscovered,
    SnapshotLoaded,
}

const EVENT_KIND_COUNT: usize = 11;

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::NodeAdded { .. } => EventKind::NodeAdded,
            Event::NodeRemoved { .. } => EventKind::NodeRemoved,
            Event::EdgeAdded { .. } => EventKind::EdgeAdded,
            Event::EdgeRemoved { .. } => EventKind::EdgeRemoved,
            Event::RecipeChanged { .. } => EventKind::RecipeChanged,
            Event::RecipeStarted { .. } => EventKind::RecipeStarted,
            Event::RecipeCompleted { .. } => EventKind::RecipeCompleted,
            Event::ConstructionStarted { .. } => EventKind::ConstructionStarted,
            Event::ConstructionCompleted { .. } => EventKind::ConstructionCompleted,
            Event::ResourceDiscovered { .. } => EventKind::ResourceDiscovered,
            Event::SnapshotLoaded { .. } => EventKind::SnapshotLoaded,
        }
    }

    /// The node this event is about, if any.
    pub fn node(&self) -> Option<NodeId> {
        match self {
            Event::NodeAdded { node, .. }
            | Event::NodeRemoved { node, .. }
            | Event::RecipeChanged { node, .. }
            | Event::RecipeStarted { node, .. }
            | Event::RecipeCompleted { node, .. }
            | Event::ConstructionStarted { node, .. }
            | Event::ConstructionCompleted { node, .. } => Some(*node),
            _ => None,
        }
    }
}

impl EventKind {
    fn index(self) -> usize {
        self as usize
    }
}

// ---------------------------------------------------------------------------
// EventBuffer -- pre-allocated ring buffer
// ---------------------------------------------------------------------------

/// A pre-allocated ring buffer for events. Fixed capacity; when full, the
/// oldest events are dropped.
#[derive(Debug)]
pub struct EventBuffer {
    events: Vec<Option<Event>>,
    /// Write position (wraps around).
    head: usize,
    len: usize,
    /// Total events ever written (including dropped).
    total_written: u64,
}

impl EventBuffer {
    /// Create a new ring buffer with the given capacity.
    /// A capacity of 0 is clamped to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: (0..capacity).map(|_| None).collect(),
            head: 0,
            len: 0,
            total_written: 0,
        }
    }

    /// Push an event. If full, the oldest event is dropped.
    pub fn push(&mut self, event: Event) {
        self.events[self.head] = Some(event);
        self.head = (self.head + 1) % self.capacity();
        if self.len < self.capacity() {
            self.len += 1;
        }
        self.total_written += 1;
    }

    pub fn capacity(&self) -> usize {
        self.events.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn total_written(&self) -> u64 {
        self.total_written
    }

    /// Oldest slot index. `head` is the next write position, which holds
    /// the oldest entry once the buffer has wrapped.
    fn start(&self) -> usize {
        if self.len < self.capacity() {
            0
        } else {
            self.head
        }
    }

    /// Iterate over events from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &Event> + '_ {
        let start = self.start();
        let capacity = self.capacity();
        (0..self.len).filter_map(move |offset| self.events[(start + offset) % capacity].as_ref())
    }

    /// Remove and return every stored event, oldest first.
    pub fn drain(&mut self) -> Vec<Event> {
        let start = self.start();
        let capacity = self.capacity();
        let mut out = Vec::with_capacity(self.len);
        for offset in 0..self.len {
            if let Some(event) = self.events[(start + offset) % capacity].take() {
                out.push(event);
            }
        }
        self.head = 0;
        self.len = 0;
        out
    }

    pub fn clear(&mut self) {
        for slot in &mut self.events {
            *slot = None;
        }
        self.head = 0;
        self.len = 0;
    }
}

// ---------------------------------------------------------------------------
// EventLog
// ---------------------------------------------------------------------------

/// The engine's change log: one ring buffer plus per-kind suppression.
#[derive(Debug)]
pub struct EventLog {
    buffer: EventBuffer,
    suppressed: [bool; EVENT_KIND_COUNT],
    dropped: u64,
}

impl EventLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: EventBuffer::new(capacity),
            suppressed: [false; EVENT_KIND_COUNT],
            dropped: 0,
        }
    }

    /// Record an event unless its kind is suppressed.
    pub fn emit(&mut self, event: Event) {
        if self.suppressed[event.kind().index()] {
            return;
        }
        if self.buffer.len() == self.buffer.capacity() {
            self.dropped += 1;
        }
        self.buffer.push(event);
    }

    pub fn suppress(&mut self, kind: EventKind) {
        self.suppressed[kind.index()] = true;
    }

    pub fn unsuppress(&mut self, kind: EventKind) {
        self.suppressed[kind.index()] = false;
    }

    pub fn is_suppressed(&self, kind: EventKind) -> bool {
        self.suppressed[kind.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Event> + '_ {
        self.buffer.iter()
    }

    /// Take every pending event, oldest first.
    pub fn drain(&mut self) -> Vec<Event> {
        self.buffer.drain()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Events overwritten before anyone drained them.
    pub fn dropped_count(&self) -> u64 {
        self.dropped
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::Fixed64;
    use crate::test_utils::node_id;

    fn removed(n: u8) -> Event {
        Event::NodeRemoved {
            node: node_id(n),
            time: Fixed64::from_num(n),
        }
    }

    #[test]
    fn buffer_wraps_and_keeps_newest() {
        let mut buf = EventBuffer::new(3);
        for n in 1..=5 {
            buf.push(removed(n));
        }
        assert_eq!(buf.len(), 3);
        assert_eq!(buf.total_written(), 5);
        let nodes: Vec<_> = buf.iter().filter_map(Event::node).collect();
        assert_eq!(nodes, vec![node_id(3), node_id(4), node_id(5)]);
    }

    #[test]
    fn drain_empties_in_order() {
        let mut buf = EventBuffer::new(4);
        for n in 1..=6 {
            buf.push(removed(n));
        }
        let drained = buf.drain();
        assert_eq!(drained.first(), Some(&removed(3)));
        assert_eq!(drained.last(), Some(&removed(6)));
        assert!(buf.is_empty());
        buf.push(removed(7));
        assert_eq!(buf.drain(), vec![removed(7)]);
    }

    #[test]
    fn zero_capacity_clamped() {
        let buf = EventBuffer::new(0);
        assert_eq!(buf.capacity(), 1);
    }

    #[test]
    fn suppressed_kinds_not_recorded() {
        let mut log = EventLog::new(8);
        log.suppress(EventKind::NodeRemoved);
        log.emit(removed(1));
        assert!(log.is_empty());
        assert!(log.is_suppressed(EventKind::NodeRemoved));

        log.unsuppress(EventKind::NodeRemoved);
        log.emit(removed(2));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn log_counts_overwritten_events() {
        let mut log = EventLog::new(2);
        for n in 1..=5 {
            log.emit(removed(n));
        }
        assert_eq!(log.dropped_count(), 3);
        assert_eq!(log.drain().len(), 2);
    }

    #[test]
    fn kind_matches_variant() {
        let e = Event::ResourceDiscovered {
            resource: ResourceId(0),
            time: Fixed64::ZERO,
        };
        assert_eq!(e.kind(), EventKind::ResourceDiscovered);
        assert_eq!(e.node(), None);
    }
}
