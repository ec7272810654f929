//! Alert delivery via SMTP.
//!
//! [`SmtpMailer`] wraps the `lettre` async SMTP transport. Each alert opens
//! a fresh session to the relay, upgrades it with STARTTLS, authenticates
//! with the sender's credentials and sends one plain-text message.

use std::time::Duration;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use hostwatch_core::alert::AlertMessage;
use hostwatch_core::config::MonitorConfig;

/// Upper bound on a single SMTP session.
const SMTP_TIMEOUT: Duration = Duration::from_secs(30);

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Why an alert did not reach the relay. Never escapes the monitor loop.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    /// Relay unreachable, STARTTLS refused, login rejected, or the session
    /// timed out.
    #[error("Alert relay error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// `EMAIL_SENDER` or `EMAIL_RECEIVER` is not a valid mailbox.
    #[error("Invalid alert address: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// lettre rejected the alert headers or body.
    #[error("Could not assemble alert email: {0}")]
    Build(String),
}

// ---------------------------------------------------------------------------
// AlertNotifier
// ---------------------------------------------------------------------------

/// Delivers composed alerts somewhere a human will see them.
#[async_trait]
pub trait AlertNotifier: Send + Sync {
    async fn send(&self, alert: &AlertMessage) -> Result<(), MailError>;
}

// ---------------------------------------------------------------------------
// SmtpMailer
// ---------------------------------------------------------------------------

/// SMTP settings taken from [`MonitorConfig`].
#[derive(Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub sender: String,
    pub password: String,
    pub receiver: String,
}

impl From<&MonitorConfig> for SmtpSettings {
    fn from(config: &MonitorConfig) -> Self {
        Self {
            host: config.smtp_host.clone(),
            port: config.smtp_port,
            sender: config.email_sender.clone(),
            password: config.email_password.clone(),
            receiver: config.email_receiver.clone(),
        }
    }
}

/// Sends alert emails from the configured sender to the configured receiver.
pub struct SmtpMailer {
    settings: SmtpSettings,
}

impl SmtpMailer {
    pub fn new(settings: SmtpSettings) -> Self {
        Self { settings }
    }

    fn build_message(&self, alert: &AlertMessage) -> Result<Message, MailError> {
        Message::builder()
            .from(self.settings.sender.parse()?)
            .to(self.settings.receiver.parse()?)
            .subject(alert.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(alert.body.clone())
            .map_err(|e| MailError::Build(e.to_string()))
    }
}

#[async_trait]
impl AlertNotifier for SmtpMailer {
    async fn send(&self, alert: &AlertMessage) -> Result<(), MailError> {
        let email = self.build_message(alert)?;

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.settings.host)?
            .port(self.settings.port)
            .credentials(Credentials::new(
                self.settings.sender.clone(),
                self.settings.password.clone(),
            ))
            .timeout(Some(SMTP_TIMEOUT))
            .build();

        mailer.send(email).await?;

        tracing::debug!(
            relay = %self.settings.host,
            to = %self.settings.receiver,
            "SMTP session completed"
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
