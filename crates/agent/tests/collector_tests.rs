//! Integration tests for the host resource collector.
//!
//! These read the real machine, so they only assert on ranges and timing,
//! never on specific values.

use std::time::{Duration, Instant};

use hostwatch_agent::collector::{ResourceSampler, SystemCollector, CPU_SAMPLE_WINDOW};
use hostwatch_core::sample::{ResourceUsage, Sample};

/// Every reported percentage must lie in `[0, 100]` (with a little slack for
/// rounding in the underlying counters).
fn assert_percentages_in_range(usage: &ResourceUsage) {
    for (name, value) in [
        ("cpu", usage.cpu_percent),
        ("memory", usage.memory_percent),
        ("disk", usage.disk_percent),
    ] {
        assert!(
            value.is_finite() && (0.0..=100.5).contains(&value),
            "{name} percentage out of range: {value}"
        );
    }
}

#[tokio::test]
async fn sample_reports_percentages() {
    let mut collector = SystemCollector::new();
    let usage = collector.sample().await;
    assert_percentages_in_range(&usage);
}

/// The CPU measurement spans the full observation window.
#[tokio::test]
async fn sample_waits_for_cpu_window() {
    let mut collector = SystemCollector::new();
    let start = Instant::now();
    collector.sample().await;
    assert!(start.elapsed() >= CPU_SAMPLE_WINDOW - Duration::from_millis(10));
}

/// Consecutive samples from one collector stay valid.
#[tokio::test]
async fn repeated_samples_stay_in_range() {
    let mut collector = SystemCollector::new();
    for _ in 0..2 {
        let usage = collector.sample().await;
        assert_percentages_in_range(&usage);
    }
}

/// A combined sample serializes with all four fields.
#[tokio::test]
async fn sample_serialization_includes_all_fields() {
    let mut collector = SystemCollector::new();
    let sample = Sample::new(collector.sample().await, 0.5);

    let parsed = serde_json::to_value(sample).expect("serialization should succeed");
    for field in ["cpu_percent", "memory_percent", "disk_percent"] {
        assert!(parsed[field].is_number(), "{field} should be a number");
    }
    assert_eq!(parsed["latency_ms"], 0.5);
}
