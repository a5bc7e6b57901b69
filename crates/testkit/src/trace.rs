//! Tick traces: step a small simulation one tick at a time and record a
//! snapshot after every step.
//!
//! A trace is the reference that batched code paths are compared against:
//! `trace.at(n)` is the state after exactly `n` single-tick steps.

use anyhow::{Context, Result};
use everburn_core::SimTick;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Single snapshot frame captured at a given tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceFrame<S> {
    /// Steps taken before this snapshot.
    pub tick: u64,
    /// Snapshot payload.
    pub snapshot: S,
}

/// Recorded run of `ticks + 1` frames.
#[derive(Debug, Clone, Serialize)]
pub struct TickTrace<S> {
    /// Human-readable name.
    pub name: String,
    /// Frames in tick order, starting with the initial state.
    pub frames: Vec<TraceFrame<S>>,
}

impl<S> TickTrace<S> {
    /// Snapshot after `ticks` steps.
    pub fn at(&self, ticks: u64) -> Option<&S> {
        usize::try_from(ticks)
            .ok()
            .and_then(|i| self.frames.get(i))
            .map(|frame| &frame.snapshot)
    }

    /// Number of steps recorded.
    pub fn ticks(&self) -> u64 {
        self.frames.len().saturating_sub(1) as u64
    }

    /// Snapshot after the last step.
    pub fn last(&self) -> Option<&S> {
        self.frames.last().map(|frame| &frame.snapshot)
    }
}

impl<S: Serialize> TickTrace<S> {
    /// Write the trace as pretty JSON, for inspecting a failing comparison.
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create trace directory {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self).context("Failed to serialize trace")?;
        fs::write(path, json).with_context(|| format!("Failed to write trace {}", path.display()))
    }
}

/// Record a trace.
///
/// Captures the initial snapshot at tick 0, then steps `ticks` times,
/// capturing a snapshot after each step.
pub fn record_trace<State, Snapshot, StepFn, SnapFn>(
    name: impl Into<String>,
    ticks: u64,
    state: &mut State,
    mut step: StepFn,
    mut snapshot: SnapFn,
) -> TickTrace<Snapshot>
where
    StepFn: FnMut(SimTick, &mut State),
    SnapFn: FnMut(&State) -> Snapshot,
{
    let mut frames = Vec::with_capacity(usize::try_from(ticks).unwrap_or(0).saturating_add(1));

    let mut tick = SimTick::ZERO;
    frames.push(TraceFrame {
        tick: tick.0,
        snapshot: snapshot(state),
    });

    for _ in 0..ticks {
        step(tick, state);
        tick = tick.advance(1);
        frames.push(TraceFrame {
            tick: tick.0,
            snapshot: snapshot(state),
        });
    }

    TickTrace {
        name: name.into(),
        frames,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trace_holds_initial_frame_plus_one_per_step() {
        let mut counter = 10u32;
        let trace = record_trace("count", 5, &mut counter, |_, c| *c += 2, |c| *c);

        assert_eq!(trace.ticks(), 5);
        assert_eq!(trace.at(0), Some(&10));
        assert_eq!(trace.at(3), Some(&16));
        assert_eq!(trace.last(), Some(&20));
        assert_eq!(trace.at(6), None);
        assert_eq!(counter, 20);
    }

    #[test]
    fn step_sees_tick_before_advance() {
        let mut seen = Vec::new();
        record_trace("ticks", 3, &mut seen, |tick, s| s.push(tick.0), |s| s.len());
        assert_eq!(seen, vec![0, 1, 2]);
    }

    #[test]
    fn trace_writes_json() {
        let mut value = 0u8;
        let trace = record_trace("json", 2, &mut value, |_, v| *v += 1, |v| *v);
        let path = crate::unique_temp_path("trace").join("trace.json");
        trace.write_json(&path).expect("write trace");

        let contents = fs::read_to_string(&path).expect("readable");
        assert!(contents.contains("\"name\": \"json\""));
        assert!(contents.contains("\"snapshot\": 2"));
        fs::remove_dir_all(path.parent().expect("parent")).ok();
    }
}
