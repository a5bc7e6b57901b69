//! Offline Catch-Up Worldtest
//!
//! Runs a small furnace world online, saves it, lets the clock move while it is
//! unloaded, reloads it and steps once. The result must match a world that
//! never unloaded.
//! Focus areas:
//! - Store round-trip of slots, counters and the last-observed tick
//! - Catch-up on the first step after reload
//! - First-observation policy for furnaces saved before they were ever stepped

use everburn_core::{ItemStack, ItemType, SimTick};
use everburn_testkit::{
    unique_temp_path, MetricsReportBuilder, MetricsSink, PersistenceMetrics,
    TestExecutionMetrics, TestResult,
};
use everburn_world::{
    BlockPos, CatchUpConfig, FirstObservation, FurnaceKind, FurnaceStore, FurnaceWorld,
    RecipeBook,
};
use std::fs;
use std::time::Instant;

const ONLINE_TICKS: u64 = 100;
const OFFLINE_TICKS: u64 = 4_000;

const SAND: BlockPos = BlockPos::new(0, 64, 0);
const BLAST: BlockPos = BlockPos::new(2, 64, 0);
const SMOKER: BlockPos = BlockPos::new(4, 64, 0);

fn populated_world() -> FurnaceWorld {
    let mut world = FurnaceWorld::new(RecipeBook::default(), CatchUpConfig::default());
    let book = world.recipes().clone();

    let furnace = world.place_furnace(SAND, FurnaceKind::Furnace);
    furnace.state.add_input(&book, ItemType::Sand, 64);
    furnace.state.add_fuel(&book, ItemType::Coal, 3);

    let blast = world.place_furnace(BLAST, FurnaceKind::BlastFurnace);
    blast.state.add_input(&book, ItemType::IronOre, 10);
    blast.state.add_fuel(&book, ItemType::OakLog, 5);

    // No fuel: never lights.
    let smoker = world.place_furnace(SMOKER, FurnaceKind::Smoker);
    smoker.state.add_input(&book, ItemType::RawBeef, 5);

    world
}

#[test]
fn offline_catch_up_worldtest() {
    let test_start = Instant::now();
    let dir = unique_temp_path("offline-worldtest");

    println!("\n=== Offline Catch-Up Worldtest ===");
    println!("  Online ticks:  {}", ONLINE_TICKS);
    println!("  Offline ticks: {}", OFFLINE_TICKS);

    // Reference world never unloads.
    let mut reference = populated_world();
    for _ in 0..(ONLINE_TICKS + OFFLINE_TICKS + 1) {
        reference.tick();
    }

    // Phase 1: run online, then save.
    let mut world = populated_world();
    for _ in 0..ONLINE_TICKS {
        world.tick();
    }
    let store = FurnaceStore::new(&dir).expect("store dir");
    let save_start = Instant::now();
    world.save_to(&store).expect("save succeeds");
    let save_time = save_start.elapsed();
    let bytes_written = fs::metadata(store.path()).map(|m| m.len()).unwrap_or(0);
    drop(world);

    // Phase 2: reload after the clock moved on without us.
    let load_start = Instant::now();
    let mut world = FurnaceWorld::load_from(&store, RecipeBook::default(), CatchUpConfig::default())
        .expect("load succeeds");
    let load_time = load_start.elapsed();
    assert_eq!(world.now(), SimTick(ONLINE_TICKS));
    assert!(world.is_lit_visual(SAND));
    assert!(!world.is_lit_visual(SMOKER));

    world.skip_offline(OFFLINE_TICKS);
    let reports = world.tick();

    // Phase 3: validate.
    assert_eq!(world.now(), reference.now());
    let furnaces: Vec<_> = world.furnaces().collect();
    let expected: Vec<_> = reference.furnaces().collect();
    assert_eq!(furnaces, expected, "reloaded world diverged from online run");

    let sand = world.furnace(SAND).expect("sand furnace");
    // 4101 ticks of cooking: 20 crafts and 101 ticks into the next.
    assert_eq!(sand.state.output_count(), 20);
    assert_eq!(sand.state.cooking_progress, 101);
    assert_eq!(sand.state.lit_time, 1600 - (4_101 - 3_200));

    let blast = world.furnace(BLAST).expect("blast furnace");
    assert_eq!(blast.state.output_count(), 10);
    assert!(blast.state.input.is_none());
    assert!(world.is_lit_visual(BLAST), "idle furnace keeps its flame");

    let smoker = world.furnace(SMOKER).expect("smoker");
    assert!(smoker.state.output.is_none());
    assert_eq!(smoker.state.input_count(), 5);

    let applied = reports
        .iter()
        .filter_map(|(_, r)| r.catch_up.applied())
        .count();
    assert_eq!(applied, 2);

    let report = MetricsReportBuilder::new("offline_catch_up_worldtest")
        .result(TestResult::Pass)
        .persistence(PersistenceMetrics {
            furnaces_saved: 3,
            furnaces_loaded: world.furnaces().count(),
            bytes_written,
            save_time_us: save_time.as_micros(),
            load_time_us: load_time.as_micros(),
        })
        .execution(TestExecutionMetrics {
            duration_seconds: test_start.elapsed().as_secs_f64(),
            online_ticks: ONLINE_TICKS,
            offline_ticks: OFFLINE_TICKS,
            validations_passed: Some(applied),
        })
        .build();
    MetricsSink::create(dir.join("metrics.json"))
        .and_then(|sink| sink.write(&report))
        .expect("metrics written");

    fs::remove_dir_all(&dir).ok();
}

fn legacy_store(label: &str) -> (FurnaceStore, std::path::PathBuf) {
    let dir = unique_temp_path(label);
    let store = FurnaceStore::new(&dir).expect("store dir");

    // Saved lit but never stepped, so no last-observed tick was written.
    let mut world = FurnaceWorld::new(RecipeBook::default(), CatchUpConfig::default());
    world.skip_offline(500);
    let furnace = world.place_furnace(SAND, FurnaceKind::Furnace);
    furnace.state.input = Some(ItemStack::new(ItemType::Sand, 64));
    furnace.state.fuel = Some(ItemStack::new(ItemType::Coal, 2));
    furnace.state.lit_time = 1600;
    furnace.state.lit_duration = 1600;
    furnace.state.cooking_total_time = 200;
    world.save_to(&store).expect("save succeeds");
    (store, dir)
}

#[test]
fn legacy_furnace_skips_first_gap_by_default() {
    let (store, dir) = legacy_store("legacy-skip");
    let mut world = FurnaceWorld::load_from(&store, RecipeBook::default(), CatchUpConfig::default())
        .expect("load succeeds");
    world.tick();

    let sand = world.furnace(SAND).expect("furnace");
    assert_eq!(sand.tracker().last_observed(), Some(SimTick(501)));
    assert_eq!(sand.state.cooking_progress, 1);
    assert_eq!(sand.state.lit_time, 1599);

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn legacy_furnace_catches_up_from_zero_when_configured() {
    let (store, dir) = legacy_store("legacy-from-zero");
    let config = CatchUpConfig {
        first_observation: FirstObservation::FromZero,
        ..CatchUpConfig::default()
    };
    let mut world =
        FurnaceWorld::load_from(&store, RecipeBook::default(), config).expect("load succeeds");
    world.tick();

    // Tick 501 measured from zero: 500 batched plus the ordinary tick.
    let sand = world.furnace(SAND).expect("furnace");
    assert_eq!(sand.state.output_count(), 2);
    assert_eq!(sand.state.cooking_progress, 101);
    assert_eq!(sand.state.lit_time, 1099);

    fs::remove_dir_all(&dir).ok();
}
