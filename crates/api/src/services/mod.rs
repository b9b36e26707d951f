//! Authentication orchestrators.
//!
//! [`AuthService`] owns no state of its own. Every operation runs the
//! precondition checks in a fixed order, short-circuits on the first
//! rejection and talks to its collaborators through the traits in
//! [`crate::store`], [`crate::cache`] and [`crate::oauth`], plus the
//! [`EmailQueue`] producer.
//!
//! - [`registration`] -- signup, email-exists check, free-tier provisioning.
//! - [`verification`] -- code issue, resend and verify.
//! - [`session`] -- password login, refresh, logout, access-token checks.
//! - [`google`] -- OAuth login and callback.
//! - [`account`] -- profile and password change.

mod account;
pub mod error;
mod google;
mod registration;
mod session;
pub mod types;
mod verification;

use std::sync::Arc;
use std::time::Duration;

use luthier_events::EmailQueue;

use crate::auth::jwt::JwtConfig;
use crate::cache::KeyValueCache;
use crate::oauth::OAuthProvider;
use crate::store::AuthStore;

pub use error::{AuthError, AuthResult, DependencyError, TokenUse};
pub use types::{
    AuthSession, AuthenticatedUser, GoogleAuthorization, GoogleCallback, LoginOutcome, Profile,
    Registration, SubscriptionSummary, VerificationTicket,
};

/// Registration, verification, session and OAuth flows.
pub struct AuthService {
    store: Arc<dyn AuthStore>,
    cache: Arc<dyn KeyValueCache>,
    emails: EmailQueue,
    oauth: Arc<dyn OAuthProvider>,
    jwt: Arc<JwtConfig>,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn AuthStore>,
        cache: Arc<dyn KeyValueCache>,
        emails: EmailQueue,
        oauth: Arc<dyn OAuthProvider>,
        jwt: JwtConfig,
    ) -> Self {
        Self {
            store,
            cache,
            emails,
            oauth,
            jwt: Arc::new(jwt),
        }
    }

    pub fn jwt(&self) -> &JwtConfig {
        &self.jwt
    }

    pub fn store(&self) -> &Arc<dyn AuthStore> {
        &self.store
    }

    pub fn cache(&self) -> &Arc<dyn KeyValueCache> {
        &self.cache
    }

    // -----------------------------------------------------------------------
    // Best-effort cache access
    // -----------------------------------------------------------------------

    /// Read a derived entry. Errors count as a miss.
    async fn cached(&self, key: &str) -> Option<String> {
        match self.cache.get(key).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "Cache read failed, falling back to store");
                None
            }
        }
    }

    async fn remember(&self, key: &str, value: &str, ttl: Duration) {
        if let Err(e) = self.cache.set(key, value, ttl).await {
            tracing::warn!(key, error = %e, "Cache write failed");
        }
    }

    async fn forget(&self, key: &str) {
        if let Err(e) = self.cache.delete(key).await {
            tracing::warn!(key, error = %e, "Cache delete failed");
        }
    }
}

/// Canonical form under which emails are stored and looked up.
pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
