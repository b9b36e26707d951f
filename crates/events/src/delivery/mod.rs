//! Outbound email transports.
//!
//! [`EmailConfig::from_env`] selects the provider; [`EmailConfig::build`]
//! turns it into a shareable [`EmailTransport`].

pub mod resend;
pub mod smtp;

use std::sync::Arc;

use async_trait::async_trait;

use crate::job::EmailJob;

pub use resend::{ResendConfig, ResendMailer};
pub use smtp::{SmtpConfig, SmtpMailer};

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for email delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    /// The recipient or sender address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),

    /// The HTTP request to the provider failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider answered with a non-2xx status code.
    #[error("Email provider returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },
}

/// Error raised while reading email settings from the environment.
#[derive(Debug, thiserror::Error)]
pub enum EmailConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} has an invalid value: {value}")]
    Invalid { var: &'static str, value: String },
}

// ---------------------------------------------------------------------------
// EmailTransport
// ---------------------------------------------------------------------------

/// Accepts a job and reports success or failure. No delivery-status callback.
#[async_trait]
pub trait EmailTransport: Send + Sync {
    async fn send(&self, job: &EmailJob) -> Result<(), EmailError>;
}

// ---------------------------------------------------------------------------
// EmailConfig
// ---------------------------------------------------------------------------

/// Which provider delivers email, with its settings.
#[derive(Debug, Clone)]
pub enum EmailConfig {
    Resend(ResendConfig),
    Smtp(SmtpConfig),
}

impl EmailConfig {
    /// Load the transport selection from environment variables.
    ///
    /// | Variable          | Required | Default  |
    /// |-------------------|----------|----------|
    /// | `EMAIL_TRANSPORT` | no       | `resend` |
    ///
    /// The selected provider reads its own variables; see
    /// [`ResendConfig::from_env`] and [`SmtpConfig::from_env`].
    pub fn from_env() -> Result<Self, EmailConfigError> {
        let transport = std::env::var("EMAIL_TRANSPORT").unwrap_or_else(|_| "resend".into());
        match transport.trim().to_ascii_lowercase().as_str() {
            "resend" => Ok(Self::Resend(ResendConfig::from_env()?)),
            "smtp" => Ok(Self::Smtp(SmtpConfig::from_env()?)),
            _ => Err(EmailConfigError::Invalid {
                var: "EMAIL_TRANSPORT",
                value: transport,
            }),
        }
    }

    /// Construct the configured transport.
    pub fn build(self) -> Result<Arc<dyn EmailTransport>, EmailError> {
        Ok(match self {
            EmailConfig::Resend(config) => Arc::new(ResendMailer::new(config)?),
            EmailConfig::Smtp(config) => Arc::new(SmtpMailer::new(config)?),
        })
    }
}
