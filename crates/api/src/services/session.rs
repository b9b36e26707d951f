//! Password login and the session lifecycle.
//!
//! Every successful login, refresh or OAuth callback creates one session
//! row holding the SHA-256 hashes of the issued pair. Refresh rotates the
//! row; logout deletes it.

use chrono::Utc;
use luthier_core::login_method::LoginMethod;
use luthier_core::policy::profile_key;
use luthier_core::types::DbId;
use luthier_db::models::session::NewSession;
use luthier_db::models::user::User;

use super::error::{
    signing_failure, validation_failure, AuthError, AuthResult, DependencyContext, TokenUse,
};
use super::types::{AuthSession, AuthenticatedUser, LoginOutcome, Profile, SubscriptionSummary};
use super::{normalize_email, AuthService};
use crate::auth::jwt::{
    generate_access_token, generate_refresh_token, hash_token, validate_access_token,
    validate_refresh_token, IssuedToken,
};
use crate::auth::password::compare_passwords;

impl AuthService {
    /// Authenticate with email and password.
    ///
    /// Checks run in order: the account exists, is not deleted, is a
    /// password account, and the password matches. An unverified account
    /// gets a verification ticket instead of a session.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        device: &str,
    ) -> AuthResult<LoginOutcome> {
        let email = normalize_email(email);
        let user = self
            .store
            .find_user_by_email(&email)
            .await
            .context("load user")?
            .ok_or_else(|| {
                tracing::warn!(%email, "Login rejected: unknown email");
                AuthError::UserNotFound
            })?;

        if user.deleted {
            tracing::warn!(user_id = user.id, "Login rejected: account deleted");
            return Err(AuthError::AccountDeleted);
        }
        if user.login_method != LoginMethod::Password {
            tracing::warn!(
                user_id = user.id,
                login_method = %user.login_method,
                "Login rejected: password login on an external account"
            );
            return Err(AuthError::InvalidLoginMethod);
        }
        if !compare_passwords(&user.password_hash, password) {
            tracing::warn!(user_id = user.id, "Login rejected: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        self.admit(user, device).await
    }

    /// Issue a session for a user that passed its credential checks, or a
    /// verification ticket if the account is still unverified.
    pub(crate) async fn admit(&self, user: User, device: &str) -> AuthResult<LoginOutcome> {
        if !user.verified {
            tracing::info!(user_id = user.id, "Login deferred: verification required");
            let ticket = self.issue_verification(&user).await?;
            return Ok(LoginOutcome::VerificationRequired(ticket));
        }

        let now = Utc::now();
        self.store
            .update_last_login(user.id, now)
            .await
            .context("update last login")?;

        let (access, refresh) = self.mint_pair(user.id)?;
        let session = self
            .store
            .create_session(&new_session(user.id, &access, &refresh, device))
            .await
            .context("create session")?;
        self.forget(&profile_key(user.id)).await;

        let subscription = self.subscription_summary(user.id).await?;
        let mut user = user;
        user.last_login_at = Some(now);

        tracing::info!(user_id = user.id, session_id = session.id, "User logged in");
        Ok(LoginOutcome::Authenticated(Box::new(AuthSession {
            profile: Profile::from_user(user, subscription),
            access_token: access.token,
            refresh_token: refresh.token,
            access_expires_at: access.expires_at,
            refresh_expires_at: refresh.expires_at,
        })))
    }

    /// Exchange a refresh token for a new pair.
    ///
    /// The old session is deleted in the same transaction that creates the
    /// new one. When two refreshes race on the same token, only the first
    /// succeeds; the other gets [`AuthError::InvalidToken`].
    pub async fn refresh(&self, refresh_token: &str, device: &str) -> AuthResult<AuthSession> {
        let claims = validate_refresh_token(refresh_token, &self.jwt)
            .map_err(|e| validation_failure(e, TokenUse::Refresh))?;

        let session = self
            .store
            .find_session_by_refresh_hash(&hash_token(refresh_token))
            .await
            .context("load session")?
            .ok_or_else(|| {
                tracing::warn!(user_id = claims.sub, "Refresh rejected: no live session");
                AuthError::InvalidToken(TokenUse::Refresh)
            })?;
        if session.user_id != claims.sub {
            tracing::warn!(
                session_id = session.id,
                claimed = claims.sub,
                "Refresh rejected: session belongs to another user"
            );
            return Err(AuthError::InvalidToken(TokenUse::Refresh));
        }

        let user = self
            .store
            .find_user_by_id(session.user_id)
            .await
            .context("load user")?
            .ok_or(AuthError::UserNotFound)?;
        if user.deleted {
            tracing::warn!(user_id = user.id, "Refresh rejected: account deleted");
            return Err(AuthError::AccountDeleted);
        }
        if !user.verified {
            tracing::warn!(user_id = user.id, "Refresh rejected: account not verified");
            return Err(AuthError::NotVerified);
        }

        let (access, refresh) = self.mint_pair(user.id)?;
        let rotated = self
            .store
            .rotate_session(session.id, &new_session(user.id, &access, &refresh, device))
            .await
            .context("rotate session")?
            .ok_or_else(|| {
                tracing::warn!(
                    session_id = session.id,
                    "Refresh rejected: session already rotated"
                );
                AuthError::InvalidToken(TokenUse::Refresh)
            })?;

        let subscription = self.subscription_summary(user.id).await?;
        tracing::info!(
            user_id = user.id,
            old_session_id = session.id,
            session_id = rotated.id,
            "Session refreshed"
        );
        Ok(AuthSession {
            profile: Profile::from_user(user, subscription),
            access_token: access.token,
            refresh_token: refresh.token,
            access_expires_at: access.expires_at,
            refresh_expires_at: refresh.expires_at,
        })
    }

    /// Delete the session owning `access_token`.
    ///
    /// Returns whether a session was removed; an unknown or already revoked
    /// token is not an error.
    pub async fn logout(&self, access_token: &str) -> AuthResult<bool> {
        let revoked = self
            .store
            .delete_session_by_access_hash(&hash_token(access_token))
            .await
            .context("delete session")?;
        if revoked {
            tracing::info!("Session revoked");
        } else {
            tracing::debug!("Logout for an unknown session");
        }
        Ok(revoked)
    }

    /// Resolve a presented access token to its live session.
    pub async fn authenticate(&self, access_token: &str) -> AuthResult<AuthenticatedUser> {
        let claims = validate_access_token(access_token, &self.jwt)
            .map_err(|e| validation_failure(e, TokenUse::Access))?;

        let session = self
            .store
            .find_session_by_access_hash(&hash_token(access_token))
            .await
            .context("load session")?
            .filter(|s| s.user_id == claims.sub)
            .ok_or_else(|| {
                tracing::warn!(user_id = claims.sub, "Access token has no live session");
                AuthError::InvalidToken(TokenUse::Access)
            })?;

        let user = self
            .store
            .find_user_by_id(session.user_id)
            .await
            .context("load user")?
            .ok_or(AuthError::UserNotFound)?;
        if user.deleted {
            tracing::warn!(user_id = user.id, "Access rejected: account deleted");
            return Err(AuthError::AccountDeleted);
        }

        Ok(AuthenticatedUser {
            user_id: session.user_id,
            session_id: session.id,
        })
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn mint_pair(&self, user_id: DbId) -> AuthResult<(IssuedToken, IssuedToken)> {
        let access = generate_access_token(user_id, &self.jwt)
            .map_err(|e| signing_failure(e, "sign access token"))?;
        let refresh = generate_refresh_token(user_id, &self.jwt)
            .map_err(|e| signing_failure(e, "sign refresh token"))?;
        Ok((access, refresh))
    }

    pub(crate) async fn subscription_summary(
        &self,
        user_id: DbId,
    ) -> AuthResult<Option<SubscriptionSummary>> {
        Ok(self
            .store
            .find_active_subscription(user_id)
            .await
            .context("load subscription")?
            .map(SubscriptionSummary::from))
    }
}

fn new_session(
    user_id: DbId,
    access: &IssuedToken,
    refresh: &IssuedToken,
    device: &str,
) -> NewSession {
    NewSession {
        user_id,
        access_token_hash: hash_token(&access.token),
        refresh_token_hash: hash_token(&refresh.token),
        access_expires_at: access.expires_at,
        refresh_expires_at: refresh.expires_at,
        device_info: device.to_string(),
    }
}
