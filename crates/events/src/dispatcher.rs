//! Single-consumer worker draining the email queue.
//!
//! Delivery is at-most-once: a payload that fails to decode is dropped, and a
//! job the transport rejects is logged and dropped. Nothing is retried. When
//! the queue store itself fails, the loop waits [`QUEUE_ERROR_BACKOFF`]
//! before popping again.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::delivery::EmailTransport;
use crate::job::EmailJob;
use crate::queue::{JobQueue, QueueError};

/// Pause after a failed pop before trying the queue store again.
pub const QUEUE_ERROR_BACKOFF: Duration = Duration::from_secs(1);

/// What happened to one popped payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Delivered,
    /// The payload was not a valid [`EmailJob`] and was discarded.
    Malformed,
    /// The transport reported a failure; the job is gone.
    Failed,
}

/// Pops jobs one at a time and hands them to an [`EmailTransport`].
pub struct EmailDispatcher {
    queue: Arc<dyn JobQueue>,
    transport: Arc<dyn EmailTransport>,
}

impl EmailDispatcher {
    pub fn new(queue: Arc<dyn JobQueue>, transport: Arc<dyn EmailTransport>) -> Self {
        Self { queue, transport }
    }

    /// Run until `cancel` fires or the queue reports it is closed.
    ///
    /// Cancellation is only observed while waiting on the queue, so a job
    /// already handed to the transport is allowed to finish.
    pub async fn run(self, cancel: CancellationToken) {
        tracing::info!("Email dispatcher started");

        loop {
            let popped = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::info!("Email dispatcher stopping");
                    break;
                }
                popped = self.queue.pop() => popped,
            };

            match popped {
                Ok(payload) => {
                    self.process(&payload).await;
                }
                Err(QueueError::Closed) => {
                    tracing::warn!("Email queue closed, dispatcher exiting");
                    break;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Email queue pop failed");
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = tokio::time::sleep(QUEUE_ERROR_BACKOFF) => {}
                    }
                }
            }
        }
    }

    /// Decode and deliver a single payload.
    pub async fn process(&self, payload: &str) -> DispatchOutcome {
        let job: EmailJob = match serde_json::from_str(payload) {
            Ok(job) => job,
            Err(e) => {
                tracing::error!(error = %e, "Dropping malformed email job");
                return DispatchOutcome::Malformed;
            }
        };

        match self.transport.send(&job).await {
            Ok(()) => {
                tracing::debug!(to = %job.to, subject = %job.subject, "Email job delivered");
                DispatchOutcome::Delivered
            }
            Err(e) => {
                tracing::error!(
                    to = %job.to,
                    subject = %job.subject,
                    error = %e,
                    "Email delivery failed, job dropped"
                );
                DispatchOutcome::Failed
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
