//! Steppable block devices and the catch-up furnace.

use crate::catch_up::{catch_up_gap, CatchUp, CatchUpConfig};
use crate::elapsed::ElapsedTimeTracker;
use crate::furnace::{FurnaceState, TickOutcome};
use crate::smelting::{FurnaceKind, RecipeBook};
use everburn_core::SimTick;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Integer block coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BlockPos {
    /// X coordinate.
    pub x: i32,
    /// Y coordinate.
    pub y: i32,
    /// Z coordinate.
    pub z: i32,
}

impl BlockPos {
    /// Create a new block position.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

/// Block-state side effects a device may trigger.
pub trait BlockStateSink {
    /// Update the visible lit flag of the block at `pos`.
    fn set_lit_visual(&mut self, pos: BlockPos, lit: bool);
    /// Flag the block at `pos` as needing to be saved.
    fn mark_dirty(&mut self, pos: BlockPos);
}

/// Everything a device sees during one step.
pub struct StepContext<'a> {
    /// Position of the device being stepped.
    pub pos: BlockPos,
    /// Current absolute world tick.
    pub now: SimTick,
    /// Recipe and fuel tables.
    pub recipes: &'a RecipeBook,
    /// Catch-up tuning.
    pub config: &'a CatchUpConfig,
    /// Block-state side effects.
    pub blocks: &'a mut dyn BlockStateSink,
}

/// What one step did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepReport {
    /// Raw tracker output (may be negative after a clock rollback).
    pub elapsed: i64,
    /// Outcome of the catch-up attempt.
    pub catch_up: CatchUp,
    /// Outcome of the ordinary tick that followed.
    pub tick: TickOutcome,
}

/// A device the host steps once per simulation tick.
pub trait SteppableDevice {
    /// Advance the device to `ctx.now`.
    fn on_step(&mut self, ctx: &mut StepContext<'_>) -> StepReport;
}

/// Furnace extended with offline catch-up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EverFurnace {
    /// Furnace variant.
    pub kind: FurnaceKind,
    /// Slots and counters.
    pub state: FurnaceState,
    tracker: ElapsedTimeTracker,
}

impl EverFurnace {
    /// Create an empty furnace of `kind` that has never been stepped.
    pub fn new(kind: FurnaceKind) -> Self {
        Self {
            kind,
            state: FurnaceState::new(),
            tracker: ElapsedTimeTracker::new(),
        }
    }

    /// Reassemble a furnace from persisted parts.
    pub fn from_parts(kind: FurnaceKind, state: FurnaceState, tracker: ElapsedTimeTracker) -> Self {
        Self {
            kind,
            state,
            tracker,
        }
    }

    /// Elapsed-time tracker.
    pub fn tracker(&self) -> &ElapsedTimeTracker {
        &self.tracker
    }
}

impl SteppableDevice for EverFurnace {
    fn on_step(&mut self, ctx: &mut StepContext<'_>) -> StepReport {
        let elapsed = self
            .tracker
            .observe_with(ctx.now, ctx.config.first_observation);

        let gap = u64::try_from(elapsed).unwrap_or_else(|_| {
            warn!(pos = ?ctx.pos, elapsed, now = ctx.now.0, "world clock moved backwards");
            0
        });

        // The ordinary tick below simulates the current tick.
        let catch_up = catch_up_gap(gap, &mut self.state, self.kind, ctx.recipes, ctx.config);

        if let CatchUp::Applied(report) = &catch_up {
            if report.extinguished {
                ctx.blocks.set_lit_visual(ctx.pos, false);
            }
            ctx.blocks.mark_dirty(ctx.pos);
        }

        let tick = self.state.tick(self.kind, ctx.recipes);
        if tick.lit_changed {
            ctx.blocks.set_lit_visual(ctx.pos, self.state.is_lit());
        }
        if tick.lit_changed || tick.crafted {
            ctx.blocks.mark_dirty(ctx.pos);
        }

        StepReport {
            elapsed,
            catch_up,
            tick,
        }
    }
}
