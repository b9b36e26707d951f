//! Google OAuth login.
//!
//! [`AuthService::google_login`] parks a random state in the cache for ten
//! minutes. [`AuthService::google_callback`] consumes it atomically before
//! touching the provider, so a state is accepted at most once.

use std::time::Duration;

use luthier_core::login_method::LoginMethod;
use luthier_core::policy::{oauth_state_key, DEFAULT_ROLE, OAUTH_STATE_TTL_SECS};
use luthier_db::models::user::NewUser;
use oauth2::CsrfToken;

use super::error::{AuthError, AuthResult, DependencyContext};
use super::types::{GoogleAuthorization, GoogleCallback, LoginOutcome};
use super::{normalize_email, AuthService};
use crate::oauth::ExternalProfile;
use crate::store::StoreError;

impl AuthService {
    /// Start an OAuth login: issue a CSRF state and build the provider URL.
    pub async fn google_login(&self) -> AuthResult<GoogleAuthorization> {
        let state = CsrfToken::new_random().secret().clone();
        self.cache
            .set(
                &oauth_state_key(&state),
                &state,
                Duration::from_secs(OAUTH_STATE_TTL_SECS),
            )
            .await
            .context("store oauth state")?;

        let url = self.oauth.authorization_url(&state);
        tracing::debug!("OAuth login started");
        Ok(GoogleAuthorization { url, state })
    }

    /// Finish an OAuth login.
    ///
    /// An existing account must be a non-deleted Google account. A new email
    /// creates a verified Google account with a free-tier subscription.
    pub async fn google_callback(
        &self,
        callback: GoogleCallback,
        device: &str,
    ) -> AuthResult<LoginOutcome> {
        self.consume_state(&callback).await?;

        let access_token = self
            .oauth
            .exchange_code(&callback.code)
            .await
            .context("exchange authorization code")?;
        let external = self
            .oauth
            .fetch_profile(&access_token)
            .await
            .context("fetch provider profile")?;

        if !external.email_verified {
            tracing::warn!(email = %external.email, "OAuth rejected: provider email not verified");
            return Err(AuthError::NotVerified);
        }

        let email = normalize_email(&external.email);
        let existing = self
            .store
            .find_user_by_email(&email)
            .await
            .context("load user")?;

        let user = match existing {
            Some(user) => {
                if user.deleted {
                    tracing::warn!(user_id = user.id, "OAuth rejected: account deleted");
                    return Err(AuthError::AccountDeleted);
                }
                if user.login_method != LoginMethod::Google {
                    tracing::warn!(
                        user_id = user.id,
                        login_method = %user.login_method,
                        "OAuth rejected: account uses another login method"
                    );
                    return Err(AuthError::InvalidLoginMethod);
                }
                if user
                    .google_id
                    .as_deref()
                    .is_some_and(|id| id != external.external_id)
                {
                    tracing::warn!(user_id = user.id, "OAuth rejected: external id mismatch");
                    return Err(AuthError::InvalidCredentials);
                }
                user
            }
            None => {
                let user = self.create_google_user(email, &external).await?;
                self.provision_free_tier(user.id).await?;
                tracing::info!(user_id = user.id, "Account created from Google login");
                user
            }
        };

        self.admit(user, device).await
    }

    /// Check the callback state against the browser cookie (when sent) and
    /// consume it from the cache.
    async fn consume_state(&self, callback: &GoogleCallback) -> AuthResult<()> {
        if callback.state.is_empty() {
            tracing::warn!("OAuth callback without state");
            return Err(AuthError::InvalidState);
        }
        if let Some(cookie_state) = callback.cookie_state.as_deref() {
            if cookie_state != callback.state {
                tracing::warn!("OAuth callback state does not match cookie");
                return Err(AuthError::InvalidState);
            }
        }

        let stored = self
            .cache
            .take(&oauth_state_key(&callback.state))
            .await
            .context("consume oauth state")?;
        if stored.as_deref() != Some(callback.state.as_str()) {
            tracing::warn!("OAuth callback state unknown, expired or already used");
            return Err(AuthError::InvalidState);
        }
        Ok(())
    }

    async fn create_google_user(
        &self,
        email: String,
        external: &ExternalProfile,
    ) -> AuthResult<luthier_db::models::user::User> {
        let (first_name, last_name) = split_display_name(&external.display_name);
        let new_user = NewUser {
            email,
            password_hash: String::new(),
            login_method: LoginMethod::Google,
            google_id: Some(external.external_id.clone()),
            role: DEFAULT_ROLE.to_string(),
            first_name,
            last_name,
            phone: String::new(),
            address: String::new(),
            country: String::new(),
            workshop_name: String::new(),
            verified: true,
        };

        match self.store.create_user(&new_user).await {
            Ok(user) => Ok(user),
            Err(StoreError::Conflict(constraint)) => {
                tracing::warn!(%constraint, "OAuth signup lost a race on a unique key");
                Err(AuthError::EmailTaken)
            }
            Err(e) => Err(e).context("create user"),
        }
    }
}

/// First word is the first name, the rest the last name.
fn split_display_name(display_name: &str) -> (String, String) {
    let mut parts = display_name.split_whitespace();
    let first = parts.next().unwrap_or_default().to_string();
    let rest = parts.collect::<Vec<_>>().join(" ");
    (first, rest)
}
