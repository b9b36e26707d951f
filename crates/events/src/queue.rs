//! Durable FIFO job queue.
//!
//! Producers push serialized payloads; the single consumer blocks on
//! [`JobQueue::pop`] until one is available. The Redis backend pushes with
//! `LPUSH` and pops with `BRPOP`, so the oldest job leaves first.

use std::sync::Arc;

use async_trait::async_trait;
use redis::aio::{ConnectionManager, MultiplexedConnection};
use redis::AsyncCommands;
use tokio::sync::Mutex;

use crate::job::EmailJob;

/// Default name of the Redis list backing the email queue.
pub const DEFAULT_QUEUE_NAME: &str = "email_queue";

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for queue operations.
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    /// The queue store could not be reached or rejected the command.
    #[error("Queue store error: {0}")]
    Store(#[from] redis::RedisError),

    /// A job could not be serialized.
    #[error("Job serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The queue will never yield another job.
    #[error("Queue closed")]
    Closed,
}

// ---------------------------------------------------------------------------
// JobQueue
// ---------------------------------------------------------------------------

/// A named FIFO of opaque string payloads.
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Append a payload to the tail of the queue.
    async fn push(&self, payload: String) -> Result<(), QueueError>;

    /// Remove and return the payload at the head, waiting indefinitely
    /// until one is available.
    async fn pop(&self) -> Result<String, QueueError>;
}

/// [`JobQueue`] backed by a Redis list.
///
/// Pushes share a [`ConnectionManager`]. The blocking pop runs on its own
/// connection so a parked `BRPOP` never stalls producers or cache traffic.
pub struct RedisJobQueue {
    client: redis::Client,
    producer: ConnectionManager,
    consumer: Mutex<Option<MultiplexedConnection>>,
    name: String,
}

impl RedisJobQueue {
    /// Connect the producer side. The consumer connection is opened lazily
    /// on the first [`pop`](JobQueue::pop).
    pub async fn connect(client: redis::Client, name: impl Into<String>) -> Result<Self, QueueError> {
        let producer = ConnectionManager::new(client.clone()).await?;
        Ok(Self {
            client,
            producer,
            consumer: Mutex::new(None),
            name: name.into(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
impl JobQueue for RedisJobQueue {
    async fn push(&self, payload: String) -> Result<(), QueueError> {
        let mut conn = self.producer.clone();
        let _: i64 = conn.lpush(&self.name, payload).await?;
        Ok(())
    }

    async fn pop(&self) -> Result<String, QueueError> {
        let mut guard = self.consumer.lock().await;
        if guard.is_none() {
            *guard = Some(self.client.get_multiplexed_async_connection().await?);
            tracing::debug!(queue = %self.name, "Opened dedicated queue consumer connection");
        }
        let Some(conn) = guard.as_mut() else {
            return Err(QueueError::Closed);
        };

        // A zero timeout blocks until a job arrives.
        let popped: Result<Option<(String, String)>, redis::RedisError> = redis::cmd("BRPOP")
            .arg(&self.name)
            .arg(0)
            .query_async(conn)
            .await;

        match popped {
            Ok(Some((_list, payload))) => Ok(payload),
            Ok(None) => Err(QueueError::Closed),
            Err(e) => {
                // Force a reconnect on the next pop.
                *guard = None;
                Err(e.into())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// EmailQueue
// ---------------------------------------------------------------------------

/// Typed producer handle used by request handlers.
#[derive(Clone)]
pub struct EmailQueue {
    inner: Arc<dyn JobQueue>,
}

impl EmailQueue {
    pub fn new(inner: Arc<dyn JobQueue>) -> Self {
        Self { inner }
    }

    /// Serialize `job` and append it to the queue.
    ///
    /// Fails only when the job cannot be encoded or the queue store is
    /// unavailable.
    pub async fn enqueue(&self, job: &EmailJob) -> Result<(), QueueError> {
        let payload = serde_json::to_string(job)?;
        self.inner.push(payload).await?;
        tracing::debug!(to = %job.to, subject = %job.subject, "Email job enqueued");
        Ok(())
    }
}
