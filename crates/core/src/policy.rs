//! Fixed lifetimes and names used by the authentication flows.

/// Default access token lifetime.
pub const ACCESS_TOKEN_TTL_MINS: i64 = 15;

/// Default refresh token lifetime.
pub const REFRESH_TOKEN_TTL_DAYS: i64 = 7;

/// How long an emailed verification code stays usable.
pub const VERIFICATION_CODE_TTL_MINS: i64 = 15;

/// How long an OAuth CSRF state is accepted by the callback.
pub const OAUTH_STATE_TTL_SECS: u64 = 10 * 60;

/// How long a memoized email-existence answer is served from cache.
pub const EMAIL_CHECK_TTL_SECS: u64 = 5 * 60;

/// How long a profile projection is served from cache.
pub const PROFILE_CACHE_TTL_SECS: u64 = 5 * 60;

/// Plan every new account is subscribed to.
pub const FREE_TIER_PLAN_NAME: &str = "Free Tier";

/// Length of the free-tier trial window.
pub const FREE_TIER_TRIAL_DAYS: i64 = 14;

/// Status of a subscription that is currently in force.
pub const SUBSCRIPTION_STATUS_ACTIVE: &str = "active";

/// Role assigned to every self-registered account.
pub const DEFAULT_ROLE: &str = "user";

/// Shortest password accepted at signup and on password change.
pub const PASSWORD_MIN_LENGTH: usize = 6;

/// Cache key memoizing whether an email is registered.
pub fn email_check_key(email: &str) -> String {
    format!("email:check:{email}")
}

/// Cache key holding a pending OAuth CSRF state.
pub fn oauth_state_key(state: &str) -> String {
    format!("oauth_state:{state}")
}

/// Cache key holding a serialized profile projection.
pub fn profile_key(user_id: crate::types::DbId) -> String {
    format!("profile:user:{user_id}")
}
