//! Canonical metric names.
//!
//! Used as the `metric` field of [`Breach`](crate::thresholds::Breach), in log
//! fields and in the "Breached:" line of alert emails.

/// Global CPU utilization percentage, sampled over a one-second window.
pub const METRIC_CPU_PERCENT: &str = "cpu_percent";

/// Used memory as a percentage of total physical memory.
pub const METRIC_MEMORY_PERCENT: &str = "memory_percent";

/// Used space on the root filesystem as a percentage of its capacity.
pub const METRIC_DISK_PERCENT: &str = "disk_percent";

/// Round-trip time to the monitored target in milliseconds.
pub const METRIC_LATENCY_MS: &str = "latency_ms";
