//! everburn - offline catch-up for tick-driven furnaces
//!
//! Headless runner: steps a furnace world, unloads it, lets the clock run and
//! reloads it, checking the result against a world that never unloaded.

mod config;
mod headless;

use anyhow::{Context, Result};
use config::RunnerConfig;
use everburn_assets::recipe_book_from_file;
use everburn_testkit::MetricsSink;
use everburn_world::RecipeBook;
use headless::HeadlessConfig;
use std::{env, path::PathBuf};
use tracing::info;

fn main() -> Result<()> {
    // Initialize tracing with WARN level by default (can be overridden via RUST_LOG env var)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    info!("Starting everburn v{}", env!("CARGO_PKG_VERSION"));

    let cli = CliOptions::parse(env::args().skip(1));
    let mut runner = match cli.config.as_deref() {
        Some(path) => RunnerConfig::load_from_path(path),
        None => RunnerConfig::load(),
    };
    if let Some(ticks) = cli.online_ticks {
        runner.scenario.online_ticks = ticks;
    }
    if let Some(ticks) = cli.offline_ticks {
        runner.scenario.offline_ticks = ticks;
    }

    let recipes = match cli.recipes.clone().or_else(|| runner.recipes.clone()) {
        Some(path) => recipe_book_from_file(&path)
            .with_context(|| format!("failed to load smelting pack from {}", path.display()))?,
        None => RecipeBook::default(),
    };

    let summary = headless::run(HeadlessConfig {
        runner,
        recipes,
        save_dir: cli.save_dir.clone(),
        events: cli.events.clone(),
    })?;

    for (pos, furnace) in &summary.furnaces {
        println!(
            "{:>4} {:>4} {:>4}  {:<13} input={:<3} fuel={:<3} output={:<3} lit={}",
            pos.x,
            pos.y,
            pos.z,
            format!("{:?}", furnace.kind),
            furnace.state.input_count(),
            furnace.state.fuel_count(),
            furnace.state.output_count(),
            furnace.state.is_lit(),
        );
    }

    if let Some(path) = cli.metrics.as_ref() {
        MetricsSink::create(path)
            .and_then(|sink| sink.write(&summary.report))
            .with_context(|| format!("failed to write metrics to {}", path.display()))?;
    }

    if !summary.matches_online {
        anyhow::bail!("reloaded world diverged from the online reference run");
    }
    Ok(())
}

#[derive(Debug, Default)]
struct CliOptions {
    config: Option<PathBuf>,
    online_ticks: Option<u64>,
    offline_ticks: Option<u64>,
    recipes: Option<PathBuf>,
    events: Option<PathBuf>,
    save_dir: Option<PathBuf>,
    metrics: Option<PathBuf>,
}

impl CliOptions {
    fn parse<I: Iterator<Item = String>>(mut args: I) -> Self {
        let mut opts = CliOptions::default();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => opts.config = path_arg(&mut args, "--config"),
                "--recipes" => opts.recipes = path_arg(&mut args, "--recipes"),
                "--events" => opts.events = path_arg(&mut args, "--events"),
                "--save-dir" => opts.save_dir = path_arg(&mut args, "--save-dir"),
                "--metrics" => opts.metrics = path_arg(&mut args, "--metrics"),
                "--online-ticks" => opts.online_ticks = ticks_arg(&mut args, "--online-ticks"),
                "--offline-ticks" => opts.offline_ticks = ticks_arg(&mut args, "--offline-ticks"),
                other => tracing::warn!(arg = %other, "ignoring unknown argument"),
            }
        }

        opts
    }
}

fn path_arg<I: Iterator<Item = String>>(args: &mut I, flag: &str) -> Option<PathBuf> {
    let path = args.next().map(PathBuf::from);
    if path.is_none() {
        tracing::error!("{flag} requires a file path");
    }
    path
}

fn ticks_arg<I: Iterator<Item = String>>(args: &mut I, flag: &str) -> Option<u64> {
    let Some(raw) = args.next() else {
        tracing::error!("{flag} requires an integer");
        return None;
    };
    match raw.parse::<u64>() {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::error!(%err, value = %raw, "{flag} must be an integer");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliOptions {
        CliOptions::parse(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn parses_every_flag() {
        let opts = parse(&[
            "--config",
            "cfg.toml",
            "--online-ticks",
            "10",
            "--offline-ticks",
            "72000",
            "--recipes",
            "pack.json",
            "--events",
            "events.jsonl",
            "--save-dir",
            "save",
            "--metrics",
            "metrics.json",
        ]);
        assert_eq!(opts.config, Some(PathBuf::from("cfg.toml")));
        assert_eq!(opts.online_ticks, Some(10));
        assert_eq!(opts.offline_ticks, Some(72_000));
        assert_eq!(opts.recipes, Some(PathBuf::from("pack.json")));
        assert_eq!(opts.events, Some(PathBuf::from("events.jsonl")));
        assert_eq!(opts.save_dir, Some(PathBuf::from("save")));
        assert_eq!(opts.metrics, Some(PathBuf::from("metrics.json")));
    }

    #[test]
    fn bad_tick_count_is_ignored() {
        let opts = parse(&["--offline-ticks", "forever", "--online-ticks"]);
        assert_eq!(opts.offline_ticks, None);
        assert_eq!(opts.online_ticks, None);
    }
}
