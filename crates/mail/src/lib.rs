//! Outbound email.
//!
//! - [`templates::EmailTemplate`] -- the messages the service can send, rendered to text + HTML.
//! - [`smtp::SmtpMailer`] -- SMTP delivery via `lettre`.
//! - [`LogMailer`] -- used when SMTP is not configured; logs instead of sending.
//! - [`CapturingMailer`] -- records messages in memory for tests.

pub mod smtp;
pub mod templates;

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

pub use smtp::{EmailConfig, SmtpMailer};
pub use templates::{EmailTemplate, RenderedEmail};

/// Error type for email delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The recipient or sender address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),
}

/// Sends a templated message to a single address.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, template: &EmailTemplate)
        -> Result<(), EmailError>;
}

/// Mailer used when no SMTP server is configured.
#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(
        &self,
        to: &str,
        subject: &str,
        template: &EmailTemplate,
    ) -> Result<(), EmailError> {
        tracing::warn!(
            to,
            subject,
            template = template.name(),
            "SMTP not configured; email not sent"
        );
        Ok(())
    }
}

/// A message recorded by [`CapturingMailer`].
#[derive(Debug, Clone)]
pub struct SentEmail {
    pub to: String,
    pub subject: String,
    pub template: EmailTemplate,
}

#[derive(Debug, Default)]
pub struct CapturingMailer {
    sent: Mutex<Vec<SentEmail>>,
    failing: AtomicBool,
}

impl CapturingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// While set, every send fails and nothing is recorded.
    pub fn fail_deliveries(&self, fail: bool) {
        self.failing.store(fail, Ordering::SeqCst);
    }

    pub async fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl Mailer for CapturingMailer {
    async fn send(
        &self,
        to: &str,
        subject: &str,
        template: &EmailTemplate,
    ) -> Result<(), EmailError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(EmailError::Build("delivery disabled".into()));
        }
        self.sent.lock().await.push(SentEmail {
            to: to.to_string(),
            subject: subject.to_string(),
            template: template.clone(),
        });
        Ok(())
    }
}
