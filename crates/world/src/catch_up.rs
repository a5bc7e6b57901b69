//! Batched offline catch-up for furnaces.
//!
//! [`advance`] applies many ticks of burning and cooking in closed form. For a
//! furnace whose output slot has room for everything it can still craft, the
//! result matches calling [`FurnaceState::tick`] once per tick. Cost is O(1)
//! arithmetic plus one call per whole craft in the batch.

use crate::elapsed::FirstObservation;
use crate::furnace::{shrink_slot, FurnaceState};
use crate::smelting::{FuelValue, FurnaceKind, RecipeBook, SmeltRecipe};
use everburn_core::{ItemStack, SimTick};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Catch-up tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatchUpConfig {
    /// Turn catch-up off entirely (ordinary ticking still runs).
    pub enabled: bool,
    /// Gaps shorter than this are left to ordinary ticking.
    pub min_batch_ticks: u64,
    /// Treatment of a device's first observation after placement or legacy load.
    pub first_observation: FirstObservation,
}

impl Default for CatchUpConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_batch_ticks: SimTick::PER_SECOND,
            first_observation: FirstObservation::Skip,
        }
    }
}

/// Why a catch-up did not run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Catch-up is disabled in config.
    Disabled,
    /// Furnace is not burning.
    Unlit,
    /// Gap is below `min_batch_ticks`.
    TooSoon,
    /// Nothing in the input slot.
    EmptyInput,
    /// Output slot is at max stack size.
    OutputFull,
    /// No recipe resolves for the input.
    NoRecipe,
    /// Recipe resolved but the output cannot take its product.
    CannotBurn,
    /// Fuel slot is empty or holds something that does not burn.
    NoFuel,
    /// No cook time is locked in yet.
    NoCookTime,
}

/// What an applied catch-up did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CatchUpReport {
    /// Ticks requested.
    pub elapsed: u64,
    /// Ticks actually simulated (bounded by fuel and input).
    pub applied: u64,
    /// Fuel units used up.
    pub fuel_consumed: u32,
    /// Crafts that produced output.
    pub crafts_completed: u32,
    /// Crafts whose ticks elapsed but could not place output.
    pub crafts_failed: u32,
    /// The furnace was lit before and is unlit after.
    pub extinguished: bool,
}

/// Result of [`try_catch_up`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CatchUp {
    /// Preconditions failed; state untouched.
    Skipped(SkipReason),
    /// The batch ran.
    Applied(CatchUpReport),
}

impl CatchUp {
    /// The report, if the batch ran.
    pub fn applied(&self) -> Option<&CatchUpReport> {
        match self {
            CatchUp::Applied(report) => Some(report),
            CatchUp::Skipped(_) => None,
        }
    }
}

/// Check every precondition, then run [`advance`] for `elapsed` ticks.
pub fn try_catch_up(
    elapsed: u64,
    furnace: &mut FurnaceState,
    kind: FurnaceKind,
    book: &RecipeBook,
    config: &CatchUpConfig,
) -> CatchUp {
    batch(elapsed, elapsed, furnace, kind, book, config)
}

/// Catch up the ticks skipped between two steps `gap` ticks apart.
///
/// The later step simulates its own tick, so the batch covers `gap - 1` ticks
/// while `min_batch_ticks` is still measured against the whole gap.
pub fn catch_up_gap(
    gap: u64,
    furnace: &mut FurnaceState,
    kind: FurnaceKind,
    book: &RecipeBook,
    config: &CatchUpConfig,
) -> CatchUp {
    batch(gap, gap.saturating_sub(1), furnace, kind, book, config)
}

fn batch(
    elapsed: u64,
    ticks: u64,
    furnace: &mut FurnaceState,
    kind: FurnaceKind,
    book: &RecipeBook,
    config: &CatchUpConfig,
) -> CatchUp {
    let checked = check(elapsed, furnace, kind, book, config).and_then(|found| {
        if ticks == 0 {
            Err(SkipReason::TooSoon)
        } else {
            Ok(found)
        }
    });
    match checked {
        Ok((recipe, fuel)) => CatchUp::Applied(advance(ticks, furnace, &recipe, &fuel)),
        Err(reason) => {
            trace!(?reason, elapsed, "catch-up skipped");
            CatchUp::Skipped(reason)
        }
    }
}

fn check(
    elapsed: u64,
    furnace: &FurnaceState,
    kind: FurnaceKind,
    book: &RecipeBook,
    config: &CatchUpConfig,
) -> Result<(SmeltRecipe, FuelValue), SkipReason> {
    if !config.enabled {
        return Err(SkipReason::Disabled);
    }
    if !furnace.is_lit() {
        return Err(SkipReason::Unlit);
    }
    if elapsed < config.min_batch_ticks {
        return Err(SkipReason::TooSoon);
    }
    if furnace.input.is_none() {
        return Err(SkipReason::EmptyInput);
    }
    if furnace.output_is_full() {
        return Err(SkipReason::OutputFull);
    }
    let recipe = furnace
        .active_recipe(kind, book)
        .ok_or(SkipReason::NoRecipe)?;
    if !furnace.can_burn(&recipe) {
        return Err(SkipReason::CannotBurn);
    }
    let fuel = furnace
        .fuel
        .and_then(|stack| book.fuel(stack.item_type))
        .copied()
        .ok_or(SkipReason::NoFuel)?;
    if furnace.cooking_total_time == 0 {
        return Err(SkipReason::NoCookTime);
    }
    Ok((recipe, fuel))
}

/// Ticks of burning left in the fuel slot, counting the unit already burning.
pub fn total_burn_time(furnace: &FurnaceState, fuel: &FuelValue) -> u64 {
    let queued = u64::from(furnace.fuel_count().saturating_sub(1));
    queued
        .saturating_mul(u64::from(fuel.burn_duration))
        .saturating_add(u64::from(furnace.lit_time))
}

/// Ticks of cooking needed to use up the input slot, counting the item already
/// in progress.
pub fn total_cook_time(furnace: &FurnaceState) -> u64 {
    let total = u64::from(furnace.cooking_total_time);
    let queued = u64::from(furnace.input_count().saturating_sub(1));
    queued
        .saturating_mul(total)
        .saturating_add(total.saturating_sub(u64::from(furnace.cooking_progress)))
}

/// Simulate `elapsed` ticks at once.
///
/// Callers must have established the preconditions checked by
/// [`try_catch_up`]: lit, input present, output not full, `recipe` burnable,
/// `fuel` describing the fuel slot, and a non-zero `cooking_total_time`.
pub fn advance(
    elapsed: u64,
    furnace: &mut FurnaceState,
    recipe: &SmeltRecipe,
    fuel: &FuelValue,
) -> CatchUpReport {
    let was_lit = furnace.is_lit();
    let max_input_time = total_burn_time(furnace, fuel).min(total_cook_time(furnace));
    let applied = elapsed.min(max_input_time);

    let fuel_consumed = burn(furnace, fuel, applied);
    let (crafts_completed, crafts_failed) = cook(furnace, recipe, applied);

    if crafts_completed > 0 {
        furnace.set_recipe_used(recipe);
    }

    let report = CatchUpReport {
        elapsed,
        applied,
        fuel_consumed,
        crafts_completed,
        crafts_failed,
        extinguished: was_lit && !furnace.is_lit(),
    };
    debug!(
        elapsed,
        applied,
        fuel_consumed,
        crafts_completed,
        crafts_failed,
        lit_time = furnace.lit_time,
        cooking_progress = furnace.cooking_progress,
        "furnace caught up"
    );
    report
}

/// Burn `applied` ticks of fuel. Returns fuel units used up.
///
/// The burning unit lasts its remaining `lit_time`, which may exceed the
/// current `burn_duration` if the fuel table changed since it was lit. Every
/// later unit lasts `burn_duration`.
fn burn(furnace: &mut FurnaceState, fuel: &FuelValue, applied: u64) -> u32 {
    let lit_time = u64::from(furnace.lit_time);
    if applied < lit_time {
        furnace.lit_time = (lit_time - applied) as u32;
        return 0;
    }

    let duration = u64::from(fuel.burn_duration);
    let after = applied - lit_time;
    let whole = u32::try_from(1 + after / duration).unwrap_or(u32::MAX);
    let consumed = shrink_slot(&mut furnace.fuel, whole);

    let mut rollovers = consumed;
    if furnace.fuel.is_some() {
        furnace.lit_time = (duration - after % duration) as u32;
    } else {
        furnace.lit_time = 0;
        furnace.fuel = fuel.remainder.map(|item| ItemStack::new(item, 1));
        rollovers = rollovers.saturating_sub(1);
    }
    if rollovers > 0 {
        furnace.lit_duration = fuel.burn_duration;
    }
    consumed
}

/// Cook `applied` ticks. Returns (completed, failed) craft counts.
fn cook(furnace: &mut FurnaceState, recipe: &SmeltRecipe, applied: u64) -> (u32, u32) {
    let total = u64::from(furnace.cooking_total_time);
    let (whole, partial) = if applied < total {
        (0, applied)
    } else {
        (applied / total, applied % total)
    };

    let mut completed = 0;
    let mut failed = 0;
    let mut attempt = |furnace: &mut FurnaceState| {
        if furnace.complete_craft(recipe) {
            completed += 1;
        } else {
            failed += 1;
        }
    };

    for _ in 0..whole {
        attempt(furnace);
    }

    let progress = u64::from(furnace.cooking_progress) + partial;
    if progress >= total {
        attempt(furnace);
        furnace.finish_item((progress - total) as u32);
    } else {
        furnace.cooking_progress = progress as u32;
    }

    if furnace.input.is_none() {
        furnace.finish_item(0);
    }
    (completed, failed)
}
