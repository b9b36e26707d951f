//! Request extractors and middleware.
//!
//! - [`auth::AuthUser`] -- Resolves the caller's access token to a live session.
//! - [`rate_limit::rate_limit`] -- Fixed-window request budget per client IP.

pub mod auth;
pub mod rate_limit;
