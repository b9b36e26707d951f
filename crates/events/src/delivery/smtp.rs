//! Email delivery via SMTP.
//!
//! [`SmtpMailer`] wraps the `lettre` async SMTP transport. The transport is
//! built once and reused for every job.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::{EmailConfigError, EmailError, EmailTransport};
use crate::job::EmailJob;

/// Default SMTP port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

/// Default sender address when `SMTP_FROM` is not set.
const DEFAULT_FROM_ADDRESS: &str = "noreply@luthier.local";

/// Configuration for the SMTP email transport.
#[derive(Clone)]
pub struct SmtpConfig {
    /// SMTP server hostname.
    pub smtp_host: String,
    /// SMTP server port (defaults to 587).
    pub smtp_port: u16,
    /// RFC 5322 "From" address.
    pub from_address: String,
    /// Optional SMTP username.
    pub smtp_user: Option<String>,
    /// Optional SMTP password.
    pub smtp_password: Option<String>,
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("from_address", &self.from_address)
            .field("smtp_user", &self.smtp_user)
            .finish_non_exhaustive()
    }
}

impl SmtpConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable        | Required | Default                  |
    /// |-----------------|----------|--------------------------|
    /// | `SMTP_HOST`     | yes      | --                       |
    /// | `SMTP_PORT`     | no       | `587`                    |
    /// | `SMTP_FROM`     | no       | `noreply@luthier.local`  |
    /// | `SMTP_USER`     | no       | --                       |
    /// | `SMTP_PASSWORD` | no       | --                       |
    pub fn from_env() -> Result<Self, EmailConfigError> {
        let smtp_host =
            std::env::var("SMTP_HOST").map_err(|_| EmailConfigError::Missing("SMTP_HOST"))?;
        let smtp_port = match std::env::var("SMTP_PORT") {
            Ok(raw) => raw.parse().map_err(|_| EmailConfigError::Invalid {
                var: "SMTP_PORT",
                value: raw,
            })?,
            Err(_) => DEFAULT_SMTP_PORT,
        };
        Ok(Self {
            smtp_host,
            smtp_port,
            from_address: std::env::var("SMTP_FROM")
                .unwrap_or_else(|_| DEFAULT_FROM_ADDRESS.to_string()),
            smtp_user: std::env::var("SMTP_USER").ok(),
            smtp_password: std::env::var("SMTP_PASSWORD").ok(),
        })
    }
}

/// Sends jobs as HTML email over SMTP.
pub struct SmtpMailer {
    from_address: String,
    mailer: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(config: SmtpConfig) -> Result<Self, EmailError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port);

        if let (Some(user), Some(pass)) = (config.smtp_user, config.smtp_password) {
            builder = builder.credentials(Credentials::new(user, pass));
        }

        Ok(Self {
            from_address: config.from_address,
            mailer: builder.build(),
        })
    }
}

/// Assemble the MIME message for `job`.
fn build_message(from: &str, job: &EmailJob) -> Result<Message, EmailError> {
    Message::builder()
        .from(from.parse()?)
        .to(job.to.parse()?)
        .subject(job.subject.clone())
        .header(ContentType::TEXT_HTML)
        .body(job.body.clone())
        .map_err(|e| EmailError::Build(e.to_string()))
}

#[async_trait]
impl EmailTransport for SmtpMailer {
    async fn send(&self, job: &EmailJob) -> Result<(), EmailError> {
        let message = build_message(&self.from_address, job)?;
        self.mailer.send(message).await?;
        tracing::info!(to = %job.to, subject = %job.subject, "Email sent via SMTP");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
