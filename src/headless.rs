use crate::config::RunnerConfig;
use anyhow::{Context, Result};
use everburn_core::SimTick;
use everburn_testkit::{
    unique_temp_path, CatchUpMetrics, EventRecord, JsonlSink, MetricsReport,
    MetricsReportBuilder, PersistenceMetrics, TestExecutionMetrics, TestResult,
};
use everburn_world::{
    BlockPos, CatchUp, EverFurnace, FurnaceStore, FurnaceWorld, RecipeBook, StepReport,
};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

pub struct HeadlessConfig {
    pub runner: RunnerConfig,
    pub recipes: RecipeBook,
    pub save_dir: Option<PathBuf>,
    pub events: Option<PathBuf>,
}

/// What a save/unload/reload run produced.
pub struct RunSummary {
    pub furnaces: Vec<(BlockPos, EverFurnace)>,
    /// The reloaded world ended in the same state as one that never unloaded.
    pub matches_online: bool,
    pub report: MetricsReport,
}

pub fn run(cfg: HeadlessConfig) -> Result<RunSummary> {
    let started = Instant::now();
    let (save_path, cleanup_save_path) = prepare_save_dir(cfg.save_dir.as_deref())?;
    let mut events = cfg
        .events
        .as_ref()
        .map(|path| {
            JsonlSink::create(path)
                .with_context(|| format!("failed to create event log {}", path.display()))
        })
        .transpose()?;

    let scenario = &cfg.runner.scenario;
    let mut metrics = CatchUpMetrics::default();

    // Reference world that is never unloaded.
    let mut online = build_world(&cfg)?;
    let mut world = build_world(&cfg)?;
    metrics.furnaces = world.furnaces().count();

    for _ in 0..scenario.online_ticks {
        online.tick();
        let reports = world.tick();
        record(world.now(), &reports, &mut metrics, events.as_mut())?;
    }

    let store = FurnaceStore::new(&save_path)?;
    let save_start = Instant::now();
    world.save_to(&store)?;
    let save_time = save_start.elapsed();
    let bytes_written = std::fs::metadata(store.path())
        .map(|m| m.len())
        .unwrap_or(0);
    let furnaces_saved = world.furnaces().count();
    drop(world);
    info!(
        tick = online.now().0,
        path = %store.path().display(),
        "world saved and unloaded"
    );

    for _ in 0..scenario.offline_ticks {
        online.tick();
    }

    let load_start = Instant::now();
    let mut world = FurnaceWorld::load_from(&store, cfg.recipes.clone(), cfg.runner.catch_up)?;
    let load_time = load_start.elapsed();
    world.skip_offline(scenario.offline_ticks);

    online.tick();
    let reports = world.tick();
    record(world.now(), &reports, &mut metrics, events.as_mut())?;

    let furnaces: Vec<(BlockPos, EverFurnace)> = world
        .furnaces()
        .map(|(pos, furnace)| (*pos, furnace.clone()))
        .collect();
    let expected: Vec<(BlockPos, EverFurnace)> = online
        .furnaces()
        .map(|(pos, furnace)| (*pos, furnace.clone()))
        .collect();
    let matches_online = furnaces == expected;
    if !matches_online {
        warn!("reloaded world diverged from the online reference");
    }

    for (pos, furnace) in &furnaces {
        info!(
            ?pos,
            kind = ?furnace.kind,
            input = furnace.state.input_count(),
            fuel = furnace.state.fuel_count(),
            output = furnace.state.output_count(),
            lit = furnace.state.is_lit(),
            "furnace after reload"
        );
    }

    let report = MetricsReportBuilder::new("offline_catch_up")
        .result(if matches_online {
            TestResult::Pass
        } else {
            TestResult::Fail
        })
        .catch_up(metrics)
        .persistence(PersistenceMetrics {
            furnaces_saved,
            furnaces_loaded: furnaces.len(),
            bytes_written,
            save_time_us: save_time.as_micros(),
            load_time_us: load_time.as_micros(),
        })
        .execution(TestExecutionMetrics {
            duration_seconds: started.elapsed().as_secs_f64(),
            online_ticks: scenario.online_ticks,
            offline_ticks: scenario.offline_ticks,
            validations_passed: Some(usize::from(matches_online)),
        })
        .build();

    if cleanup_save_path {
        if let Err(err) = std::fs::remove_dir_all(&save_path) {
            warn!(%err, path = %save_path.display(), "Failed to remove ephemeral save dir");
        }
    }

    Ok(RunSummary {
        furnaces,
        matches_online,
        report,
    })
}

fn build_world(cfg: &HeadlessConfig) -> Result<FurnaceWorld> {
    let mut world = FurnaceWorld::new(cfg.recipes.clone(), cfg.runner.catch_up);

    for setup in &cfg.runner.scenario.furnaces {
        let pos = setup.block_pos();
        if world.furnace(pos).is_some() {
            anyhow::bail!("two furnaces configured at {:?}", pos);
        }
        let furnace = world.place_furnace(pos, setup.kind);
        if let Some(slot) = setup.input {
            let rejected = furnace.state.add_input(&cfg.recipes, slot.item, slot.count);
            if rejected > 0 {
                warn!(?pos, item = %slot.item, rejected, "input slot did not take every item");
            }
        }
        if let Some(slot) = setup.fuel {
            let rejected = furnace.state.add_fuel(&cfg.recipes, slot.item, slot.count);
            if rejected > 0 {
                warn!(?pos, item = %slot.item, rejected, "fuel slot did not take every item");
            }
        }
    }
    Ok(world)
}

fn record(
    now: SimTick,
    reports: &[(BlockPos, StepReport)],
    metrics: &mut CatchUpMetrics,
    mut events: Option<&mut JsonlSink>,
) -> Result<()> {
    for (pos, report) in reports {
        match &report.catch_up {
            CatchUp::Applied(applied) => {
                metrics.batches_applied += 1;
                metrics.ticks_requested += applied.elapsed;
                metrics.ticks_applied += applied.applied;
                metrics.fuel_consumed += u64::from(applied.fuel_consumed);
                metrics.crafts_completed += u64::from(applied.crafts_completed);
                metrics.crafts_failed += u64::from(applied.crafts_failed);
                if let Some(sink) = events.as_deref_mut() {
                    let payload = serde_json::json!({ "pos": pos, "report": applied }).to_string();
                    sink.write(&EventRecord {
                        tick: now,
                        kind: "catch_up",
                        payload: &payload,
                    })?;
                }
            }
            CatchUp::Skipped(_) if report.elapsed > 1 => {
                metrics.batches_skipped += 1;
            }
            CatchUp::Skipped(_) => {}
        }

        if report.tick.crafted {
            metrics.crafts_completed += 1;
        }
        if let Some(sink) = events.as_deref_mut() {
            if report.tick.lit_changed || report.tick.crafted {
                let payload = serde_json::json!({
                    "pos": pos,
                    "lit_changed": report.tick.lit_changed,
                    "crafted": report.tick.crafted,
                })
                .to_string();
                sink.write(&EventRecord {
                    tick: now,
                    kind: "tick",
                    payload: &payload,
                })?;
            }
        }
    }
    Ok(())
}

fn prepare_save_dir(save_dir: Option<&Path>) -> Result<(PathBuf, bool)> {
    let cleanup = save_dir.is_none();
    let save_path = match save_dir {
        Some(path) => path.to_path_buf(),
        None => unique_temp_path("headless"),
    };

    std::fs::create_dir_all(&save_path)
        .with_context(|| format!("failed to create save dir {}", save_path.display()))?;

    Ok((save_path, cleanup))
}
