//! Alert email composition.

use chrono::{DateTime, Utc};

use crate::sample::Sample;
use crate::thresholds::Breach;

/// Subject line used for every alert.
pub const ALERT_SUBJECT: &str = "System Alert: High Usage or Latency";

/// A plaintext alert ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertMessage {
    pub subject: String,
    pub body: String,
}

/// Build the alert for a sample that breached at least one threshold.
///
/// The body always lists all four measured values, not just the breached
/// ones. Unreachable latency renders as `inf`.
pub fn compose(sample: &Sample, breaches: &[Breach], at: DateTime<Utc>) -> AlertMessage {
    let breached = breaches
        .iter()
        .map(|b| b.metric)
        .collect::<Vec<_>>()
        .join(", ");

    let body = format!(
        "Resource/Latency Alert!\n\n\
         CPU: {:.1}%\n\
         Memory: {:.1}%\n\
         Disk: {:.1}%\n\
         Latency: {:.2} ms\n\n\
         Breached: {}\n\
         Time: {}\n",
        sample.cpu_percent,
        sample.memory_percent,
        sample.disk_percent,
        sample.latency_ms,
        breached,
        at.to_rfc3339(),
    );

    AlertMessage {
        subject: ALERT_SUBJECT.to_string(),
        body,
    }
}
