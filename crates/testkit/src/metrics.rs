//! Run reports for headless catch-up scenarios.
//!
//! A report summarises what catch-up did over a run plus save/load costs. It is
//! exported as JSON so runs can be diffed across builds.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// Top-level report written at the end of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsReport {
    /// Scenario identifier
    pub test_name: String,

    /// Timestamp when the report was built (RFC 3339)
    pub timestamp: String,

    /// Overall result
    pub result: TestResult,

    /// Catch-up totals
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catch_up: Option<CatchUpMetrics>,

    /// Save/load costs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persistence: Option<PersistenceMetrics>,

    /// Execution metrics
    pub test_execution: TestExecutionMetrics,
}

/// Overall result status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestResult {
    /// Run passed all validations
    Pass,
    /// Run failed
    Fail,
}

/// Aggregated catch-up activity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatchUpMetrics {
    /// Furnaces stepped
    pub furnaces: usize,

    /// Batches that ran
    pub batches_applied: u64,

    /// Batches skipped by a precondition
    pub batches_skipped: u64,

    /// Ticks requested across applied batches
    pub ticks_requested: u64,

    /// Ticks actually simulated across applied batches
    pub ticks_applied: u64,

    /// Fuel units used up
    pub fuel_consumed: u64,

    /// Crafts that produced output
    pub crafts_completed: u64,

    /// Crafts that could not place output
    pub crafts_failed: u64,
}

/// Save/load costs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceMetrics {
    /// Furnaces written
    pub furnaces_saved: usize,

    /// Furnaces read back
    pub furnaces_loaded: usize,

    /// Size of the store file
    pub bytes_written: u64,

    /// Save time (microseconds)
    pub save_time_us: u128,

    /// Load time (microseconds)
    pub load_time_us: u128,
}

/// Execution metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestExecutionMetrics {
    /// Wall-clock duration (seconds)
    pub duration_seconds: f64,

    /// Ticks stepped online
    pub online_ticks: u64,

    /// Ticks skipped while unloaded
    pub offline_ticks: u64,

    /// Number of validations passed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validations_passed: Option<usize>,
}

/// Builder for constructing metrics reports
pub struct MetricsReportBuilder {
    report: MetricsReport,
}

impl MetricsReportBuilder {
    /// Create a new builder with scenario name
    pub fn new(test_name: impl Into<String>) -> Self {
        Self {
            report: MetricsReport {
                test_name: test_name.into(),
                timestamp: chrono::Utc::now().to_rfc3339(),
                result: TestResult::Pass,
                catch_up: None,
                persistence: None,
                test_execution: TestExecutionMetrics {
                    duration_seconds: 0.0,
                    online_ticks: 0,
                    offline_ticks: 0,
                    validations_passed: None,
                },
            },
        }
    }

    /// Set result
    pub fn result(mut self, result: TestResult) -> Self {
        self.report.result = result;
        self
    }

    /// Set catch-up metrics
    pub fn catch_up(mut self, metrics: CatchUpMetrics) -> Self {
        self.report.catch_up = Some(metrics);
        self
    }

    /// Set persistence metrics
    pub fn persistence(mut self, metrics: PersistenceMetrics) -> Self {
        self.report.persistence = Some(metrics);
        self
    }

    /// Set execution metrics
    pub fn execution(mut self, metrics: TestExecutionMetrics) -> Self {
        self.report.test_execution = metrics;
        self
    }

    /// Build the metrics report
    pub fn build(self) -> MetricsReport {
        self.report
    }
}

/// Sink for writing metrics reports to JSON files
pub struct MetricsSink {
    path: std::path::PathBuf,
}

impl MetricsSink {
    /// Create a new metrics sink at the specified path
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        Ok(Self { path })
    }

    /// Write metrics report to file
    pub fn write(&self, report: &MetricsReport) -> Result<()> {
        let json = serde_json::to_string_pretty(report)?;
        let mut file = File::create(&self.path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}
