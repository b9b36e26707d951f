//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod email_verification_repo;
pub mod session_repo;
pub mod subscription_repo;
pub mod user_repo;

pub use email_verification_repo::EmailVerificationRepo;
pub use session_repo::SessionRepo;
pub use subscription_repo::SubscriptionRepo;
pub use user_repo::UserRepo;
