//! Email delivery through the Resend HTTP API.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use super::{EmailConfigError, EmailError, EmailTransport};
use crate::job::EmailJob;

/// Resend send-email endpoint.
pub const RESEND_API_URL: &str = "https://api.resend.com/emails";

/// Sender used when `RESEND_FROM` is not set.
const DEFAULT_FROM: &str = "Luthier SaaS <noreply@tomassorgetti.com.ar>";

/// HTTP request timeout for a single delivery attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for [`ResendMailer`].
#[derive(Clone)]
pub struct ResendConfig {
    pub api_key: String,
    pub from: String,
    /// Overridable for tests against a local server.
    pub endpoint: String,
}

impl std::fmt::Debug for ResendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResendConfig")
            .field("api_key", &"<redacted>")
            .field("from", &self.from)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl ResendConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable         | Required | Default                                        |
    /// |------------------|----------|------------------------------------------------|
    /// | `RESEND_API_KEY` | yes      | --                                             |
    /// | `RESEND_FROM`    | no       | `Luthier SaaS <noreply@tomassorgetti.com.ar>`  |
    pub fn from_env() -> Result<Self, EmailConfigError> {
        let api_key = std::env::var("RESEND_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or(EmailConfigError::Missing("RESEND_API_KEY"))?;
        Ok(Self {
            api_key,
            from: std::env::var("RESEND_FROM").unwrap_or_else(|_| DEFAULT_FROM.to_string()),
            endpoint: RESEND_API_URL.to_string(),
        })
    }
}

#[derive(Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

/// Sends jobs as HTML email via Resend.
pub struct ResendMailer {
    client: reqwest::Client,
    config: ResendConfig,
}

impl ResendMailer {
    pub fn new(config: ResendConfig) -> Result<Self, EmailError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl EmailTransport for ResendMailer {
    async fn send(&self, job: &EmailJob) -> Result<(), EmailError> {
        let request = SendEmailRequest {
            from: &self.config.from,
            to: [&job.to],
            subject: &job.subject,
            html: &job.body,
        };

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmailError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(to = %job.to, subject = %job.subject, "Email sent via Resend");
        Ok(())
    }
}
