//! `hostwatch-agent` -- host resource and latency monitor.
//!
//! Samples CPU, memory and root-disk utilization plus ping latency to a
//! fixed target, and emails an alert on every cycle where any value exceeds
//! its threshold. Runs until the process is killed.
//!
//! # Environment variables
//!
//! | Variable                | Required | Default | Description                              |
//! |-------------------------|----------|---------|------------------------------------------|
//! | `EMAIL_SENDER`          | yes      | --      | From address and SMTP username           |
//! | `EMAIL_PASSWORD`        | yes      | --      | SMTP password / app credential           |
//! | `EMAIL_RECEIVER`        | yes      | --      | Alert recipient                          |
//! | `CHECK_INTERVAL`        | yes      | --      | Seconds between cycles                   |
//! | `UTILIZATION_THRESHOLD` | yes      | --      | CPU / memory / disk alert level, percent |
//! | `LATENCY_THRESHOLD_MS`  | yes      | --      | Latency alert level, milliseconds        |

use hostwatch_agent::collector::SystemCollector;
use hostwatch_agent::mailer::{SmtpMailer, SmtpSettings};
use hostwatch_agent::monitor::Monitor;
use hostwatch_agent::probe::PingProbe;
use hostwatch_core::config::MonitorConfig;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hostwatch_agent=info,hostwatch_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = MonitorConfig::from_env().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid configuration");
        std::process::exit(1);
    });

    tracing::info!(
        sender = %config.email_sender,
        receiver = %config.email_receiver,
        smtp_host = %config.smtp_host,
        smtp_port = config.smtp_port,
        "Loaded monitor configuration",
    );

    let mailer = SmtpMailer::new(SmtpSettings::from(&config));
    let monitor = Monitor::new(
        &config,
        SystemCollector::new(),
        PingProbe::default(),
        mailer,
    );

    monitor.run().await;
}
