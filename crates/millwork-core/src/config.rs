//! Engine configuration.
//!
//! Every field has a default, so a config file only needs to name what it
//! changes. `millwork-data` loads this from RON, TOML or JSON.

use crate::fixed::{Fixed64, SimTime, f64_to_fixed64};
use crate::sim::SimulationStrategy;
use serde::{Deserialize, Serialize};

/// What happens to an ingredient stock when a cycle starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LeftoverRounding {
    /// Subtract the cost, clamped at zero.
    #[default]
    Exact,
    /// `round((amount - cost) / cost) * cost`, clamped to `[0, maximum]`.
    SnapToCost,
}

impl LeftoverRounding {
    /// Amount left after paying `cost` out of `amount`.
    pub fn leftover(self, amount: Fixed64, cost: Fixed64, maximum: Fixed64) -> Fixed64 {
        let exact = amount.saturating_sub(cost).max(Fixed64::ZERO);
        match self {
            LeftoverRounding::Exact => exact,
            LeftoverRounding::SnapToCost => {
                let Some(ratio) = amount.saturating_sub(cost).checked_div(cost) else {
                    return exact;
                };
                ratio
                    .saturating_round()
                    .saturating_mul(cost)
                    .max(Fixed64::ZERO)
                    .min(maximum)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub strategy: SimulationStrategy,
    /// Clock advance per `step()` in tick mode.
    pub tick_length: f64,
    /// Multiplier on `dt` in continuous mode.
    pub timescale: f64,
    pub leftover_rounding: LeftoverRounding,
    /// Upper bound on completions one node may catch up on per update.
    pub max_cycles_per_update: u32,
    /// Treat every definition as unlocked.
    pub unlock_all: bool,
    /// Reject snapshots whose version differs instead of warning.
    pub strict_version: bool,
    pub event_capacity: usize,
    pub seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            strategy: SimulationStrategy::Tick,
            tick_length: 1.0,
            timescale: 1.0,
            leftover_rounding: LeftoverRounding::Exact,
            max_cycles_per_update: 64,
            unlock_all: false,
            strict_version: false,
            event_capacity: 1024,
            seed: 0,
        }
    }
}

impl EngineConfig {
    /// `tick_length` in simulated time, never negative.
    pub fn tick_length(&self) -> SimTime {
        f64_to_fixed64(self.tick_length).max(Fixed64::ZERO)
    }

    /// `timescale` as a fixed-point multiplier, never negative.
    pub fn timescale(&self) -> Fixed64 {
        f64_to_fixed64(self.timescale).max(Fixed64::ZERO)
    }
}
