//! Simulation strategy and state types.
//!
//! Every strategy runs the same four-phase update (pull, progress, discover,
//! clock). They differ only in how far the clock moves per call.

use crate::fixed::{Fixed64, SimTime};
use crate::id::ResourceId;

// ---------------------------------------------------------------------------
// Simulation strategy
// ---------------------------------------------------------------------------

/// How the engine advances time. Chosen at engine construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum SimulationStrategy {
    /// One update per `step()`, clock advanced by the configured tick length.
    #[default]
    Tick,

    /// One update per `advance(dt)`, clock advanced by `dt * timescale`.
    /// For drivers that run once per rendered frame.
    Continuous,
}

// ---------------------------------------------------------------------------
// Simulation state
// ---------------------------------------------------------------------------

/// Mutable simulation state tracked by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SimState {
    /// Logical clock. Recipe starts are stamped with this value.
    pub time: SimTime,

    /// Number of updates run so far. Not persisted.
    pub tick: u64,
}

impl SimState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(time: SimTime) -> Self {
        Self { time, tick: 0 }
    }
}

// ---------------------------------------------------------------------------
// Advance result
// ---------------------------------------------------------------------------

/// Result of an `Engine::step()` or `Engine::advance()` call.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AdvanceResult {
    /// Number of updates actually executed. Zero while paused.
    pub steps_run: u64,

    /// Resource types seen at a positive quantity for the first time.
    pub discovered: Vec<ResourceId>,
}

// ---------------------------------------------------------------------------
// State hash
// ---------------------------------------------------------------------------

/// A simple deterministic hash of simulation state for desync detection.
///
/// Uses FNV-1a (64-bit) for speed and simplicity. Not cryptographic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateHash(pub u64);

impl StateHash {
    const FNV_OFFSET: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 0x100000001b3;

    pub fn new() -> Self {
        Self(Self::FNV_OFFSET)
    }

    /// Feed bytes into the hash.
    pub fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 ^= b as u64;
            self.0 = self.0.wrapping_mul(Self::FNV_PRIME);
        }
    }

    pub fn write_u64(&mut self, v: u64) {
        self.write(&v.to_le_bytes());
    }

    pub fn write_u32(&mut self, v: u32) {
        self.write(&v.to_le_bytes());
    }

    pub fn write_fixed64(&mut self, v: Fixed64) {
        self.write(&v.to_bits().to_le_bytes());
    }

    pub fn write_f64(&mut self, v: f64) {
        self.write(&v.to_bits().to_le_bytes());
    }

    pub fn finish(self) -> u64 {
        self.0
    }
}

impl Default for StateHash {
    fn default() -> Self {
        Self::new()
    }
}
