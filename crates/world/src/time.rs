//! Deterministic world clock.
//!
//! The clock keeps counting while a world is unloaded: [`SimTime::skip`] jumps it
//! forward without stepping any device, which is what the catch-up machinery
//! later measures.

use everburn_core::SimTick;
use serde::{Deserialize, Serialize};

/// Simulation time state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimTime {
    /// Current simulation tick.
    pub tick: SimTick,
}

impl SimTime {
    /// Create a new SimTime starting at tick 0.
    pub fn new() -> Self {
        Self::starting_at(SimTick::ZERO)
    }

    /// Create a SimTime resuming from a saved tick.
    pub fn starting_at(tick: SimTick) -> Self {
        Self { tick }
    }

    /// Advance time by one tick.
    pub fn advance(&mut self) {
        self.tick = self.tick.advance(1);
    }

    /// Jump forward `ticks` without simulating them.
    pub fn skip(&mut self, ticks: u64) {
        self.tick = self.tick.advance(ticks);
    }
}
