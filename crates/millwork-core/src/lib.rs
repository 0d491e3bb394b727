//! Millwork Core -- the simulation engine for node-graph production games.
//!
//! Players place nodes on a canvas and wire them into a directed graph.
//! Each node holds a small resource ledger; downstream nodes pull what they
//! need from their inputs, run recipes that turn ingredients into results,
//! and new node types unlock as new resources are first seen.
//!
//! # Update pipeline
//!
//! Each call to [`engine::Engine::step`] (or [`engine::Engine::advance`] in
//! continuous mode) runs one update:
//!
//! 1. **Pull** -- every node not mid-build withdraws demanded resources from
//!    its inputs, richest input first.
//! 2. **Progress** -- ghosts pay their build cost and build; built nodes
//!    start and complete recipe cycles, catching up if time jumped.
//! 3. **Discover** -- resources held at a positive amount for the first time
//!    are recorded, which may unlock further definitions.
//! 4. **Clock** -- the logical clock moves forward.
//!
//! Nodes are visited in id order, so a seeded engine is fully deterministic.
//!
//! # Key Types
//!
//! - [`catalog::Catalog`] -- Immutable definitions of node types, recipes and
//!   resources, built once through [`catalog::CatalogBuilder`].
//! - [`node::Node`] -- A placed node: ghost, idle or processing, plus its
//!   [`ledger::Ledger`].
//! - [`graph::ConnectionGraph`] -- Directed edges with symmetric adjacency.
//! - [`engine::Engine`] -- Owns everything and runs the pipeline.
//! - [`event::EventLog`] -- Polled ring buffer of typed change events.
//! - [`fixed::Fixed64`] -- Q32.32 fixed-point type for deterministic math.
//! - [`serialize`] -- JSON and versioned binary snapshots.

pub mod catalog;
pub mod config;
#[cfg(feature = "data-loader")]
pub mod data_loader;
pub mod dirty;
pub mod engine;
pub mod event;
pub mod fixed;
pub mod graph;
pub mod id;
pub mod ledger;
pub mod node;
pub mod query;
pub mod rng;
pub mod serialize;
pub mod sim;
pub mod transfer;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
