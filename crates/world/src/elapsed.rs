//! Per-device elapsed-time tracking across unload/reload.

use everburn_core::SimTick;
use serde::{Deserialize, Serialize};

/// How the very first observation of an unprimed tracker is treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FirstObservation {
    /// Report zero elapsed ticks; catch-up starts from the next step.
    #[default]
    Skip,
    /// Measure from world tick 0, catching up the device's whole lifetime.
    FromZero,
}

/// Remembers the last tick a device was stepped at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElapsedTimeTracker {
    last_observed: Option<SimTick>,
}

impl ElapsedTimeTracker {
    /// Tracker that has never observed a tick.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracker restored from a persisted timestamp (`None` when the save had none).
    pub fn restored(last_observed: Option<SimTick>) -> Self {
        Self { last_observed }
    }

    /// Last tick observed, if any.
    pub fn last_observed(&self) -> Option<SimTick> {
        self.last_observed
    }

    /// Record `now` and return ticks elapsed since the previous observation.
    ///
    /// Unprimed trackers report 0. The result is negative if the clock moved
    /// backwards.
    pub fn observe(&mut self, now: SimTick) -> i64 {
        self.observe_with(now, FirstObservation::Skip)
    }

    /// [`observe`](Self::observe) with an explicit first-observation policy.
    pub fn observe_with(&mut self, now: SimTick, first: FirstObservation) -> i64 {
        match self.last_observed.replace(now) {
            Some(previous) => now.signed_since(previous),
            None => match first {
                FirstObservation::Skip => 0,
                FirstObservation::FromZero => now.signed_since(SimTick::ZERO),
            },
        }
    }
}
