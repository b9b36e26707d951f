//! Asynchronous email dispatch.
//!
//! Request handlers never talk to a mail provider directly. They push an
//! [`EmailJob`] through an [`EmailQueue`] and return; a single
//! [`EmailDispatcher`] task drains the queue in FIFO order and hands each job
//! to the configured [`EmailTransport`].
//!
//! - [`queue`] -- the [`JobQueue`] abstraction and its Redis list backend.
//! - [`delivery`] -- transports (Resend HTTP API, SMTP).
//! - [`dispatcher`] -- the cancellable consumer loop.

pub mod delivery;
pub mod dispatcher;
pub mod job;
pub mod queue;

pub use delivery::{EmailConfig, EmailConfigError, EmailError, EmailTransport};
pub use dispatcher::{DispatchOutcome, EmailDispatcher};
pub use job::EmailJob;
pub use queue::{EmailQueue, JobQueue, QueueError, RedisJobQueue};
