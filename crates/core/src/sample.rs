//! Per-cycle measurement values.

use serde::Serialize;

/// Latency recorded when the target does not answer.
///
/// Compares greater than every finite threshold, so an unreachable target
/// always breaches the latency check.
pub const UNREACHABLE_LATENCY_MS: f64 = f64::INFINITY;

/// Resource utilization read from the local host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResourceUsage {
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub disk_percent: f64,
}

/// Everything measured in one monitor cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub disk_percent: f64,
    /// [`UNREACHABLE_LATENCY_MS`] when the probe got no reply. Serializes as
    /// `null` in that case since JSON has no infinity.
    pub latency_ms: f64,
}

impl Sample {
    pub fn new(usage: ResourceUsage, latency_ms: f64) -> Self {
        Self {
            cpu_percent: usage.cpu_percent,
            memory_percent: usage.memory_percent,
            disk_percent: usage.disk_percent,
            latency_ms,
        }
    }

    pub fn target_reachable(&self) -> bool {
        self.latency_ms.is_finite()
    }
}
