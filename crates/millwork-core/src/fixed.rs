use fixed::types::I32F32;

/// Q32.32 fixed-point: 32 integer bits, 32 fractional bits.
pub type Fixed64 = I32F32;

/// Simulated time. Recipe durations, build times and the world clock all
/// share this unit.
pub type SimTime = Fixed64;

/// Capacity used for resources with no upper bound.
pub const UNBOUNDED: Fixed64 = Fixed64::MAX;

/// Convert an f64 to Fixed64. Use only at load boundaries, never in the sim loop.
/// Non-finite input saturates (`+inf` becomes [`UNBOUNDED`], NaN becomes zero).
#[inline]
pub fn f64_to_fixed64(v: f64) -> Fixed64 {
    if v.is_nan() {
        Fixed64::ZERO
    } else {
        Fixed64::saturating_from_num(v)
    }
}

/// Convert Fixed64 to f64. Use only for display and persistence.
#[inline]
pub fn fixed64_to_f64(v: Fixed64) -> f64 {
    v.to_num::<f64>()
}

/// Remaining room below `maximum`, never negative.
#[inline]
pub fn headroom(amount: Fixed64, maximum: Fixed64) -> Fixed64 {
    maximum.saturating_sub(amount).max(Fixed64::ZERO)
}
