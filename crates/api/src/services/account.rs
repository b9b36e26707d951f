//! Signed-in account operations.

use std::time::Duration;

use luthier_core::login_method::LoginMethod;
use luthier_core::policy::{profile_key, PASSWORD_MIN_LENGTH, PROFILE_CACHE_TTL_SECS};
use luthier_core::types::DbId;
use luthier_db::models::user::User;
use luthier_events::EmailJob;

use super::error::{AuthError, AuthResult, DependencyContext};
use super::types::Profile;
use super::AuthService;
use crate::auth::password::{compare_passwords, hash_password, validate_password_strength};

impl AuthService {
    /// Profile of `user_id` with its active subscription.
    ///
    /// The account is always checked against the store; the projection is
    /// served from the cache when present.
    pub async fn profile(&self, user_id: DbId) -> AuthResult<Profile> {
        let user = self.active_user(user_id).await?;

        let key = profile_key(user_id);
        if let Some(raw) = self.cached(&key).await {
            match serde_json::from_str::<Profile>(&raw) {
                Ok(profile) => return Ok(profile),
                Err(e) => tracing::warn!(key = %key, error = %e, "Discarding unreadable cached profile"),
            }
        }

        let subscription = self.subscription_summary(user_id).await?;
        let profile = Profile::from_user(user, subscription);

        match serde_json::to_string(&profile) {
            Ok(raw) => {
                self.remember(&key, &raw, Duration::from_secs(PROFILE_CACHE_TTL_SECS))
                    .await
            }
            Err(e) => tracing::warn!(user_id, error = %e, "Profile not cacheable"),
        }
        Ok(profile)
    }

    /// Replace the password of a password account and notify its owner.
    pub async fn change_password(
        &self,
        user_id: DbId,
        current_password: &str,
        new_password: &str,
    ) -> AuthResult<()> {
        let user = self.active_user(user_id).await?;
        if user.login_method != LoginMethod::Password {
            tracing::warn!(user_id, "Password change rejected: external account");
            return Err(AuthError::InvalidLoginMethod);
        }
        if !compare_passwords(&user.password_hash, current_password) {
            tracing::warn!(user_id, "Password change rejected: wrong current password");
            return Err(AuthError::InvalidCredentials);
        }
        if current_password == new_password {
            return Err(AuthError::SamePassword);
        }
        validate_password_strength(new_password, PASSWORD_MIN_LENGTH)
            .map_err(AuthError::WeakPassword)?;

        let password_hash = hash_password(new_password).context("hash password")?;
        self.store
            .update_password(user_id, &password_hash)
            .await
            .context("update password")?;
        self.forget(&profile_key(user_id)).await;

        // The password is already changed; a lost notice does not undo it.
        if let Err(e) = self.emails.enqueue(&EmailJob::password_changed(&user.email)).await {
            tracing::error!(user_id, error = %e, "Failed to enqueue password change notice");
        }

        tracing::info!(user_id, "Password changed");
        Ok(())
    }

    async fn active_user(&self, user_id: DbId) -> AuthResult<User> {
        let user = self
            .store
            .find_user_by_id(user_id)
            .await
            .context("load user")?
            .ok_or(AuthError::NotFound { entity: "User" })?;
        if user.deleted {
            return Err(AuthError::AccountDeleted);
        }
        Ok(user)
    }
}
