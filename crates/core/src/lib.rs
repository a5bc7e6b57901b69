#![warn(missing_docs)]
//! Core primitives shared across the workspace.

mod error;
pub mod item;

use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use error::CoreError;
pub use item::{ItemCategory, ItemStack, ItemType};

/// Fixed tick type (20 TPS => 50 ms per tick).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct SimTick(pub u64);

impl SimTick {
    /// First tick in any deterministic timeline.
    pub const ZERO: Self = Self(0);

    /// Simulation ticks per real-time second.
    pub const PER_SECOND: u64 = 20;

    /// Advance by `delta` ticks.
    pub fn advance(self, delta: u64) -> Self {
        Self(self.0.saturating_add(delta))
    }

    /// Signed tick distance from `earlier` to `self`.
    ///
    /// Negative when `earlier` lies in the future (clock rollback). Saturates at
    /// the `i64` bounds.
    pub fn signed_since(self, earlier: SimTick) -> i64 {
        let delta = i128::from(self.0) - i128::from(earlier.0);
        delta.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
    }
}

impl std::fmt::Display for SimTick {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "tick {}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_saturates() {
        assert_eq!(SimTick(u64::MAX - 1).advance(5), SimTick(u64::MAX));
        assert_eq!(SimTick::ZERO.advance(20), SimTick(20));
    }

    #[test]
    fn signed_since_handles_rollback_and_extremes() {
        assert_eq!(SimTick(120).signed_since(SimTick(100)), 20);
        assert_eq!(SimTick(100).signed_since(SimTick(120)), -20);
        assert_eq!(SimTick(u64::MAX).signed_since(SimTick::ZERO), i64::MAX);
        assert_eq!(SimTick::ZERO.signed_since(SimTick(u64::MAX)), i64::MIN);
    }
}
