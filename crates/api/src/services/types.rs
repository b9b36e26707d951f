//! Inputs and outputs of the [`AuthService`](super::AuthService) operations.

use luthier_core::login_method::LoginMethod;
use luthier_core::types::{DbId, Timestamp};
use luthier_db::models::subscription::Subscription;
use luthier_db::models::user::User;
use serde::{Deserialize, Serialize};

/// Signup form.
#[derive(Clone)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub address: String,
    pub country: String,
    pub workshop_name: String,
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// What the client needs to submit a verification code.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationTicket {
    pub verification_token: String,
    /// Expiry of the code the token was issued for.
    #[serde(rename = "verificationCodeExpiresAt")]
    pub expires_at: Timestamp,
}

/// Active subscription as shown on the profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionSummary {
    pub plan_name: String,
    pub status: String,
    pub started_at: Timestamp,
    pub expires_at: Timestamp,
}

impl From<Subscription> for SubscriptionSummary {
    fn from(sub: Subscription) -> Self {
        Self {
            plan_name: sub.plan_name,
            status: sub.status,
            started_at: sub.started_at,
            expires_at: sub.expires_at,
        }
    }
}

/// Public projection of a user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: DbId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub address: String,
    pub country: String,
    pub workshop_name: String,
    pub role: String,
    pub verified: bool,
    pub login_method: LoginMethod,
    pub last_login: Option<Timestamp>,
    pub subscription: Option<SubscriptionSummary>,
}

impl Profile {
    pub fn from_user(user: User, subscription: Option<SubscriptionSummary>) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            phone: user.phone,
            address: user.address,
            country: user.country,
            workshop_name: user.workshop_name,
            role: user.role,
            verified: user.verified,
            login_method: user.login_method,
            last_login: user.last_login_at,
            subscription,
        }
    }
}

/// A freshly issued token pair and the profile it belongs to.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub profile: Profile,
    pub access_token: String,
    pub refresh_token: String,
    pub access_expires_at: Timestamp,
    pub refresh_expires_at: Timestamp,
}

/// Result of a login attempt that passed the credential checks.
#[derive(Debug, Clone)]
pub enum LoginOutcome {
    Authenticated(Box<AuthSession>),
    /// The account must verify its email first; no session was created.
    VerificationRequired(VerificationTicket),
}

/// Identity behind a valid access token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: DbId,
    pub session_id: DbId,
}

/// Where to send the browser to start an OAuth login.
#[derive(Debug, Clone)]
pub struct GoogleAuthorization {
    pub url: String,
    /// CSRF state embedded in `url`.
    pub state: String,
}

/// Query parameters of the provider's redirect back to us.
#[derive(Debug, Clone, Default)]
pub struct GoogleCallback {
    pub state: String,
    pub code: String,
    /// State echoed back by the browser's `oauth_state` cookie, if any.
    pub cookie_state: Option<String>,
}
