//! Banner pipeline metrics
//!
//! Thin wrappers over the `metrics` facade plus an in-memory aggregator the
//! CLI uses for its end-of-run summary.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use contracts::Stage;
use metrics::{counter, histogram};

/// Record how long one pipeline stage took
pub fn record_stage_duration(stage: Stage, elapsed: Duration) {
    histogram!("banner_stage_duration_ms", "stage" => stage.as_str())
        .record(elapsed.as_secs_f64() * 1000.0);
}

/// Record one call to a hosted model service
///
/// `operation` is `generate`, `generate_images` or `edit_image`.
pub fn record_service_call(service: &str, operation: &'static str, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "banner_service_calls_total",
        "service" => service.to_string(),
        "operation" => operation,
        "status" => status
    )
    .increment(1);
}

/// Record one inpainting edit applied to the working image
pub fn record_edit_pass() {
    counter!("banner_edit_passes_total").increment(1);
}

/// Record a finished run
pub fn record_run(success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!("banner_runs_total", "status" => status).increment(1);
}

/// Per-stage timing statistics
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TimingStats {
    pub count: u64,
    pub total_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
}

impl TimingStats {
    pub fn push(&mut self, ms: f64) {
        if self.count == 0 {
            self.min_ms = ms;
            self.max_ms = ms;
        } else {
            self.min_ms = self.min_ms.min(ms);
            self.max_ms = self.max_ms.max(ms);
        }
        self.count += 1;
        self.total_ms += ms;
    }

    pub fn mean_ms(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total_ms / self.count as f64
        }
    }
}

impl fmt::Display for TimingStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.count == 0 {
            return write!(f, "N/A");
        }
        write!(
            f,
            "total={:.1}ms mean={:.1}ms min={:.1}ms max={:.1}ms (n={})",
            self.total_ms,
            self.mean_ms(),
            self.min_ms,
            self.max_ms,
            self.count
        )
    }
}

/// Stage timing aggregator
///
/// Records into the `metrics` facade and keeps a copy in memory so a
/// summary can be printed after the run.
#[derive(Debug, Clone, Default)]
pub struct StageTimings {
    stages: BTreeMap<&'static str, TimingStats>,
    order: Vec<&'static str>,
}

impl StageTimings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one stage measurement and forward it to the metrics recorder
    pub fn record(&mut self, stage: Stage, elapsed: Duration) {
        record_stage_duration(stage, elapsed);
        let key = stage.as_str();
        if !self.stages.contains_key(key) {
            self.order.push(key);
        }
        self.stages
            .entry(key)
            .or_default()
            .push(elapsed.as_secs_f64() * 1000.0);
    }

    pub fn get(&self, stage: Stage) -> Option<&TimingStats> {
        self.stages.get(stage.as_str())
    }

    /// Sum over all stages
    pub fn total_ms(&self) -> f64 {
        self.stages.values().map(|s| s.total_ms).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Stages in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &TimingStats)> + '_ {
        self.order
            .iter()
            .filter_map(|key| self.stages.get(key).map(|stats| (*key, stats)))
    }
}

impl fmt::Display for StageTimings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Stage Timings ===")?;
        for (stage, stats) in self.iter() {
            writeln!(f, "{stage:<13} {stats}")?;
        }
        write!(f, "Total: {:.1}ms", self.total_ms())
    }
}
