//! Deterministic fixed-point mathematics.
//!
//! Every quantity the AI core feeds back into the simulation (positions,
//! velocities, timers, path costs) is expressed in fixed-point so that two
//! hosts running the same inputs produce bit-identical agent behavior.

use fixed::types::I48F16;

pub use vec2::FixedVec2;

mod vec2;

#[cfg(test)]
mod tests;

/// Fixed-point number type used throughout the simulation.
///
/// I48F16: 48 integer bits, 16 fractional bits (precision ~0.000015).
pub type FixedNum = I48F16;

/// Shorthand for converting a literal into [`FixedNum`].
#[inline]
pub fn fx(value: f64) -> FixedNum {
    FixedNum::from_num(value)
}

/// Cost of one diagonal grid step.
#[inline]
pub fn sqrt2() -> FixedNum {
    FixedNum::from_num(std::f64::consts::SQRT_2)
}

/// Clamp `value` into `[0, 1]`.
#[inline]
pub fn clamp01(value: FixedNum) -> FixedNum {
    value.clamp(FixedNum::ZERO, FixedNum::from_num(1))
}

/// Move `current` toward `target` by at most `max_delta`.
pub fn move_towards(current: FixedNum, target: FixedNum, max_delta: FixedNum) -> FixedNum {
    let delta = target - current;
    if delta.abs() <= max_delta {
        target
    } else if delta > FixedNum::ZERO {
        current + max_delta
    } else {
        current - max_delta
    }
}
