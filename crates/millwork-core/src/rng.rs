//! Deterministic PRNG for simulation use (chance recipes, node ids).
//!
//! Uses the SplitMix64 algorithm: fast, 8 bytes of state, excellent
//! statistical properties, and trivially serializable for snapshots.

use crate::fixed::Fixed64;

/// SplitMix64 pseudo-random number generator.
///
/// Deterministic across platforms, so a replay from a snapshot draws the
/// same chance outcomes as the original run.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SimRng {
    state: u64,
}

impl SimRng {
    /// Create a new RNG with the given seed.
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Generate the next `u64` in the sequence.
    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform value in `[0, 1)`.
    pub fn unit(&mut self) -> Fixed64 {
        // Upper 32 bits become the fractional part of a Q32.32 value.
        Fixed64::from_bits((self.next_u64() >> 32) as i64)
    }

    /// 16 random bytes, e.g. for a fresh node id.
    pub fn bytes16(&mut self) -> [u8; 16] {
        let mut out = [0u8; 16];
        out[..8].copy_from_slice(&self.next_u64().to_le_bytes());
        out[8..].copy_from_slice(&self.next_u64().to_le_bytes());
        out
    }

    /// Pick an index with probability proportional to its weight.
    ///
    /// Cumulative sum plus a single uniform draw. Returns `None` when the
    /// slice is empty or every weight is zero or negative.
    pub fn pick_weighted(&mut self, weights: &[Fixed64]) -> Option<usize> {
        let total = weights
            .iter()
            .filter(|w| **w > Fixed64::ZERO)
            .fold(Fixed64::ZERO, |acc, w| acc.saturating_add(*w));
        if total <= Fixed64::ZERO {
            return None;
        }

        let roll = self.unit().saturating_mul(total);
        let mut cumulative = Fixed64::ZERO;
        for (index, weight) in weights.iter().enumerate() {
            if *weight <= Fixed64::ZERO {
                continue;
            }
            cumulative = cumulative.saturating_add(*weight);
            if cumulative > roll {
                return Some(index);
            }
        }
        // Only reachable through saturation; fall back to the last live entry.
        weights.iter().rposition(|w| *w > Fixed64::ZERO)
    }

    /// Get the internal state (for hashing/serialization).
    pub fn state(&self) -> u64 {
        self.state
    }
}
