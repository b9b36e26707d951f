//! External identity providers.
//!
//! The orchestrators only see [`OAuthProvider`]: build an authorization URL
//! for a CSRF state, exchange a code for a token, fetch the profile.

pub mod google;

use async_trait::async_trait;

/// Identity asserted by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalProfile {
    /// Stable provider-side account id.
    pub external_id: String,
    pub email: String,
    pub email_verified: bool,
    pub display_name: String,
}

/// Error type for provider calls.
#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    /// The provider rejected the authorization code.
    #[error("Token exchange failed: {0}")]
    Exchange(String),

    /// The profile request failed (network, DNS, timeout, status).
    #[error("Profile request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// A provider endpoint or redirect URL is malformed.
    #[error("OAuth configuration error: {0}")]
    Configuration(String),
}

#[async_trait]
pub trait OAuthProvider: Send + Sync {
    /// Provider URL the browser is sent to, carrying `state`.
    fn authorization_url(&self, state: &str) -> String;

    /// Exchange an authorization code for a provider access token.
    async fn exchange_code(&self, code: &str) -> Result<String, OAuthError>;

    async fn fetch_profile(&self, access_token: &str) -> Result<ExternalProfile, OAuthError>;
}
