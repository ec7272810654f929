//! Threshold evaluation for monitor samples.
//!
//! Pure logic. The caller measures a [`Sample`] and passes it in together
//! with the configured [`Thresholds`]. Comparisons are strict: a value equal
//! to its threshold is not a breach. There is no cooldown, so a condition that
//! persists produces a breach on every evaluation.

use serde::Serialize;

use crate::metric_names::{
    METRIC_CPU_PERCENT, METRIC_DISK_PERCENT, METRIC_LATENCY_MS, METRIC_MEMORY_PERCENT,
};
use crate::sample::Sample;

/// Limits a sample is checked against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Applied to CPU, memory and disk.
    pub utilization_percent: f64,
    pub latency_ms: f64,
}

/// One metric that exceeded its threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Breach {
    /// Canonical metric name (see [`crate::metric_names`]).
    pub metric: &'static str,
    /// The observed value.
    pub value: f64,
    /// The threshold it exceeded.
    pub threshold: f64,
}

/// Return every metric in `sample` that exceeds its threshold, in the order
/// CPU, memory, disk, latency.
pub fn evaluate(sample: &Sample, thresholds: &Thresholds) -> Vec<Breach> {
    let checks = [
        (
            METRIC_CPU_PERCENT,
            sample.cpu_percent,
            thresholds.utilization_percent,
        ),
        (
            METRIC_MEMORY_PERCENT,
            sample.memory_percent,
            thresholds.utilization_percent,
        ),
        (
            METRIC_DISK_PERCENT,
            sample.disk_percent,
            thresholds.utilization_percent,
        ),
        (METRIC_LATENCY_MS, sample.latency_ms, thresholds.latency_ms),
    ];

    checks
        .into_iter()
        .filter(|&(_, value, threshold)| value > threshold)
        .map(|(metric, value, threshold)| Breach {
            metric,
            value,
            threshold,
        })
        .collect()
}
