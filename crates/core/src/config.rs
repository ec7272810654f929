//! Monitor configuration loaded once at startup.
//!
//! [`MonitorConfig::from_env`] reads every required variable from the
//! process environment and fails on the first one that is missing or not
//! parseable. Nothing falls back to a default: a half-configured monitor
//! would either never alert or alert on every cycle.
//!
//! The monitored target and the SMTP relay are fixed at compile time.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::CoreError;
use crate::thresholds::Thresholds;

pub const ENV_EMAIL_SENDER: &str = "EMAIL_SENDER";
pub const ENV_EMAIL_PASSWORD: &str = "EMAIL_PASSWORD";
pub const ENV_EMAIL_RECEIVER: &str = "EMAIL_RECEIVER";
pub const ENV_CHECK_INTERVAL: &str = "CHECK_INTERVAL";
pub const ENV_UTILIZATION_THRESHOLD: &str = "UTILIZATION_THRESHOLD";
pub const ENV_LATENCY_THRESHOLD_MS: &str = "LATENCY_THRESHOLD_MS";

/// Host probed for latency on every cycle.
pub const TARGET_HOST: &str = "127.0.0.1";

/// SMTP relay used for alert delivery (STARTTLS).
pub const SMTP_HOST: &str = "smtp.gmail.com";

/// SMTP submission port.
pub const SMTP_PORT: u16 = 587;

/// Immutable configuration for the monitor loop and the mailer.
#[derive(Clone)]
pub struct MonitorConfig {
    /// "From" address; also used as the SMTP username.
    pub email_sender: String,
    /// SMTP password or app credential.
    pub email_password: String,
    /// "To" address for every alert.
    pub email_receiver: String,
    /// Pause between the end of one cycle and the start of the next.
    pub check_interval: Duration,
    /// Percent applied to CPU, memory and disk alike.
    pub utilization_threshold: u32,
    /// Maximum acceptable round-trip time to [`Self::target_host`].
    pub latency_threshold_ms: u32,
    pub target_host: String,
    pub smtp_host: String,
    pub smtp_port: u16,
}

impl MonitorConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable                | Required | Default |
    /// |-------------------------|----------|---------|
    /// | `EMAIL_SENDER`          | yes      | --      |
    /// | `EMAIL_PASSWORD`        | yes      | --      |
    /// | `EMAIL_RECEIVER`        | yes      | --      |
    /// | `CHECK_INTERVAL`        | yes      | --      |
    /// | `UTILIZATION_THRESHOLD` | yes      | --      |
    /// | `LATENCY_THRESHOLD_MS`  | yes      | --      |
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    ///
    /// `from_env` delegates here; tests pass a map-backed closure instead of
    /// touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let email_sender = require_text(&lookup, ENV_EMAIL_SENDER)?;
        let email_password = require_text(&lookup, ENV_EMAIL_PASSWORD)?;
        let email_receiver = require_text(&lookup, ENV_EMAIL_RECEIVER)?;
        let interval_secs: u64 = require_parsed(&lookup, ENV_CHECK_INTERVAL)?;
        let utilization_threshold: u32 = require_parsed(&lookup, ENV_UTILIZATION_THRESHOLD)?;
        let latency_threshold_ms: u32 = require_parsed(&lookup, ENV_LATENCY_THRESHOLD_MS)?;

        Ok(Self {
            email_sender,
            email_password,
            email_receiver,
            check_interval: Duration::from_secs(interval_secs),
            utilization_threshold,
            latency_threshold_ms,
            target_host: TARGET_HOST.to_string(),
            smtp_host: SMTP_HOST.to_string(),
            smtp_port: SMTP_PORT,
        })
    }

    /// Thresholds in the form the evaluator compares against.
    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            utilization_percent: f64::from(self.utilization_threshold),
            latency_ms: f64::from(self.latency_threshold_ms),
        }
    }
}

impl fmt::Debug for MonitorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MonitorConfig")
            .field("email_sender", &self.email_sender)
            .field("email_password", &"<redacted>")
            .field("email_receiver", &self.email_receiver)
            .field("check_interval", &self.check_interval)
            .field("utilization_threshold", &self.utilization_threshold)
            .field("latency_threshold_ms", &self.latency_threshold_ms)
            .field("target_host", &self.target_host)
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .finish()
    }
}

fn require_text<F>(lookup: &F, var: &'static str) -> Result<String, CoreError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = lookup(var).ok_or(CoreError::MissingEnv { var })?;
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{var} must not be blank")));
    }
    Ok(value)
}

fn require_parsed<F, T>(lookup: &F, var: &'static str) -> Result<T, CoreError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let raw = lookup(var).ok_or(CoreError::MissingEnv { var })?;
    raw.trim().parse().map_err(|e: T::Err| CoreError::InvalidEnv {
        var,
        value: raw.clone(),
        reason: e.to_string(),
    })
}
