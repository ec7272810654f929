//! The sample → evaluate → alert → wait loop.
//!
//! [`Monitor::run`] never returns. Each cycle is fully sequential: the CPU
//! window, memory and disk reads, the ping, and (if needed) the SMTP session
//! are awaited one after another before the interval sleep starts. A slow
//! cycle simply delays the next one; there is no catch-up.

use std::time::Duration;

use chrono::{DateTime, Utc};

use hostwatch_core::alert;
use hostwatch_core::config::MonitorConfig;
use hostwatch_core::sample::Sample;
use hostwatch_core::thresholds::{self, Breach, Thresholds};

use crate::collector::ResourceSampler;
use crate::mailer::AlertNotifier;
use crate::probe::LatencyProbe;

/// What happened to the alert in one cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// No metric breached; nothing was sent.
    NotNeeded,
    /// The alert was delivered.
    Sent,
    /// Delivery failed; the reason was logged and swallowed.
    Failed(String),
}

/// Result of a single monitor cycle.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub at: DateTime<Utc>,
    pub sample: Sample,
    pub breaches: Vec<Breach>,
    pub dispatch: DispatchOutcome,
}

impl CycleReport {
    pub fn alerted(&self) -> bool {
        self.dispatch != DispatchOutcome::NotNeeded
    }
}

/// Periodic host monitor.
pub struct Monitor<S, P, N> {
    sampler: S,
    probe: P,
    notifier: N,
    target_host: String,
    thresholds: Thresholds,
    interval: Duration,
}

impl<S, P, N> Monitor<S, P, N>
where
    S: ResourceSampler,
    P: LatencyProbe,
    N: AlertNotifier,
{
    pub fn new(config: &MonitorConfig, sampler: S, probe: P, notifier: N) -> Self {
        Self {
            sampler,
            probe,
            notifier,
            target_host: config.target_host.clone(),
            thresholds: config.thresholds(),
            interval: config.check_interval,
        }
    }

    /// Run cycles forever, sleeping for the check interval after each one.
    pub async fn run(mut self) {
        tracing::info!(
            target_host = %self.target_host,
            interval_secs = self.interval.as_secs(),
            utilization_threshold = self.thresholds.utilization_percent,
            latency_threshold_ms = self.thresholds.latency_ms,
            "Starting system monitor",
        );

        loop {
            self.run_cycle().await;
            tokio::time::sleep(self.interval).await;
        }
    }

    /// Measure once, evaluate, and send at most one alert.
    ///
    /// Never fails: an unreachable target becomes infinite latency and a
    /// delivery error is reported as [`DispatchOutcome::Failed`].
    pub async fn run_cycle(&mut self) -> CycleReport {
        let usage = self.sampler.sample().await;
        tracing::info!(
            cpu_percent = usage.cpu_percent,
            memory_percent = usage.memory_percent,
            disk_percent = usage.disk_percent,
            "Resource check",
        );

        let sample = Sample::new(usage, self.probe.measure(&self.target_host).await);
        if sample.target_reachable() {
            tracing::info!(
                target_host = %self.target_host,
                latency_ms = format_args!("{:.2}", sample.latency_ms),
                "Latency check",
            );
        } else {
            tracing::warn!(target_host = %self.target_host, "Latency check: target unreachable");
        }

        let breaches = thresholds::evaluate(&sample, &self.thresholds);
        let at = Utc::now();

        let dispatch = if breaches.is_empty() {
            DispatchOutcome::NotNeeded
        } else {
            self.dispatch(&sample, &breaches, at).await
        };

        CycleReport {
            at,
            sample,
            breaches,
            dispatch,
        }
    }

    async fn dispatch(
        &self,
        sample: &Sample,
        breaches: &[Breach],
        at: DateTime<Utc>,
    ) -> DispatchOutcome {
        let message = alert::compose(sample, breaches, at);
        let breached: Vec<&str> = breaches.iter().map(|b| b.metric).collect();

        match self.notifier.send(&message).await {
            Ok(()) => {
                tracing::info!(?breached, "Alert email sent");
                DispatchOutcome::Sent
            }
            Err(e) => {
                tracing::error!(?breached, error = %e, "Failed to send alert email");
                DispatchOutcome::Failed(e.to_string())
            }
        }
    }
}
