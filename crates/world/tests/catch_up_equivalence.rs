//! Batched catch-up against single-tick stepping.
//!
//! For every elapsed value in 0..=10_000, one `advance(E)` call must land on the
//! same furnace state as E calls to `FurnaceState::tick`. Each scenario records
//! a single reference trace and compares every prefix of it.

use everburn_core::{ItemStack, ItemType};
use everburn_testkit::record_trace;
use everburn_world::{advance, FurnaceKind, FurnaceState, RecipeBook};

const SWEEP: u64 = 10_000;

struct Scenario {
    name: &'static str,
    kind: FurnaceKind,
    input: (ItemType, u32),
    fuel: (ItemType, u32),
    lit_time: u32,
    cooking_progress: u32,
}

impl Scenario {
    fn build(&self, book: &RecipeBook) -> FurnaceState {
        let recipe = book
            .recipe_for(self.kind, self.input.0)
            .expect("scenario input has a recipe");
        let burn = book.burn_duration(self.fuel.0);
        assert!(self.lit_time >= 1 && self.lit_time <= burn, "{}", self.name);

        FurnaceState {
            input: Some(ItemStack::new(self.input.0, self.input.1)),
            fuel: Some(ItemStack::new(self.fuel.0, self.fuel.1)),
            output: None,
            lit_time: self.lit_time,
            lit_duration: burn,
            cooking_progress: self.cooking_progress,
            cooking_total_time: self.kind.cook_time(recipe),
            last_recipe: None,
        }
    }
}

fn sweep(scenario: &Scenario) {
    let book = RecipeBook::default();
    let start = scenario.build(&book);
    let recipe = *book
        .recipe_for(scenario.kind, scenario.input.0)
        .expect("recipe");
    let fuel = *book.fuel(scenario.fuel.0).expect("fuel");

    let mut stepped = start.clone();
    let trace = record_trace(
        scenario.name,
        SWEEP,
        &mut stepped,
        |_, state| {
            state.tick(scenario.kind, &book);
        },
        |state| state.clone(),
    );

    for elapsed in 0..=SWEEP {
        let mut batched = start.clone();
        advance(elapsed, &mut batched, &recipe, &fuel);
        let expected = trace.at(elapsed).expect("frame recorded");
        assert_eq!(
            &batched, expected,
            "{}: batch of {} ticks diverged from stepping",
            scenario.name, elapsed
        );
    }
}

#[test]
fn coal_runs_out_before_ore() {
    sweep(&Scenario {
        name: "coal_runs_out_before_ore",
        kind: FurnaceKind::Furnace,
        input: (ItemType::IronOre, 64),
        fuel: (ItemType::Coal, 2),
        lit_time: 1600,
        cooking_progress: 0,
    });
}

#[test]
fn sticks_roll_over_mid_craft() {
    sweep(&Scenario {
        name: "sticks_roll_over_mid_craft",
        kind: FurnaceKind::Furnace,
        input: (ItemType::Sand, 10),
        fuel: (ItemType::Stick, 5),
        lit_time: 37,
        cooking_progress: 123,
    });
}

#[test]
fn input_runs_out_while_lava_burns() {
    sweep(&Scenario {
        name: "input_runs_out_while_lava_burns",
        kind: FurnaceKind::Furnace,
        input: (ItemType::Cobblestone, 3),
        fuel: (ItemType::LavaBucket, 1),
        lit_time: 5_000,
        cooking_progress: 0,
    });
}

#[test]
fn lava_burns_out_and_leaves_bucket() {
    sweep(&Scenario {
        name: "lava_burns_out_and_leaves_bucket",
        kind: FurnaceKind::Furnace,
        input: (ItemType::IronOre, 5),
        fuel: (ItemType::LavaBucket, 1),
        lit_time: 20,
        cooking_progress: 190,
    });
}

#[test]
fn blast_furnace_with_logs() {
    sweep(&Scenario {
        name: "blast_furnace_with_logs",
        kind: FurnaceKind::BlastFurnace,
        input: (ItemType::GoldOre, 20),
        fuel: (ItemType::OakLog, 3),
        lit_time: 300,
        cooking_progress: 99,
    });
}

#[test]
fn smoker_fills_output_stack() {
    sweep(&Scenario {
        name: "smoker_fills_output_stack",
        kind: FurnaceKind::Smoker,
        input: (ItemType::RawBeef, 64),
        fuel: (ItemType::Coal, 64),
        lit_time: 1,
        cooking_progress: 50,
    });
}
