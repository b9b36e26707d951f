//! Signup and free-tier provisioning.

use std::time::Duration;

use chrono::Utc;
use luthier_core::login_method::LoginMethod;
use luthier_core::policy::{
    email_check_key, DEFAULT_ROLE, EMAIL_CHECK_TTL_SECS, FREE_TIER_TRIAL_DAYS,
    PASSWORD_MIN_LENGTH, SUBSCRIPTION_STATUS_ACTIVE,
};
use luthier_core::types::DbId;
use luthier_db::models::subscription::{NewSubscription, Subscription};
use luthier_db::models::user::NewUser;
use validator::ValidateEmail;

use super::error::{AuthError, AuthResult, DependencyContext};
use super::types::{Registration, VerificationTicket};
use super::{normalize_email, AuthService};
use crate::auth::password::{hash_password, validate_password_strength};
use crate::store::StoreError;

impl AuthService {
    /// Create a password account and send its first verification code.
    ///
    /// No session is created; the caller must verify and then log in.
    /// Failing to enqueue the verification email fails the registration.
    pub async fn register(&self, input: Registration) -> AuthResult<VerificationTicket> {
        let email = normalize_email(&input.email);
        if !email.validate_email() {
            return Err(AuthError::Validation("Invalid email address".into()));
        }
        validate_password_strength(&input.password, PASSWORD_MIN_LENGTH)
            .map_err(AuthError::WeakPassword)?;

        // A memoized "false" must not outlive this signup.
        self.forget(&email_check_key(&email)).await;

        if self
            .store
            .email_exists(&email)
            .await
            .context("check email availability")?
        {
            tracing::warn!(%email, "Registration rejected: email already registered");
            return Err(AuthError::EmailTaken);
        }

        let password_hash = hash_password(&input.password).context("hash password")?;

        let new_user = NewUser {
            email: email.clone(),
            password_hash,
            login_method: LoginMethod::Password,
            google_id: None,
            role: DEFAULT_ROLE.to_string(),
            first_name: input.first_name.trim().to_string(),
            last_name: input.last_name.trim().to_string(),
            phone: input.phone.trim().to_string(),
            address: input.address.trim().to_string(),
            country: input.country.trim().to_string(),
            workshop_name: input.workshop_name.trim().to_string(),
            verified: false,
        };
        let user = match self.store.create_user(&new_user).await {
            Ok(user) => user,
            Err(StoreError::Conflict(constraint)) => {
                tracing::warn!(%email, %constraint, "Registration lost a race on a unique key");
                return Err(AuthError::EmailTaken);
            }
            Err(e) => return Err(e).context("create user"),
        };

        self.provision_free_tier(user.id).await?;
        let ticket = self.issue_verification(&user).await?;

        tracing::info!(user_id = user.id, "User registered");
        Ok(ticket)
    }

    /// Whether `email` belongs to an account.
    ///
    /// Answers are memoized for a few minutes; a cache miss or cache error
    /// falls back to the store.
    pub async fn check_email(&self, email: &str) -> AuthResult<bool> {
        let email = normalize_email(email);
        let key = email_check_key(&email);

        match self.cached(&key).await.as_deref() {
            Some("true") => return Ok(true),
            Some("false") => return Ok(false),
            Some(other) => tracing::warn!(key, value = other, "Ignoring malformed cache entry"),
            None => {}
        }

        let exists = self
            .store
            .email_exists(&email)
            .await
            .context("check email availability")?;
        self.remember(
            &key,
            if exists { "true" } else { "false" },
            Duration::from_secs(EMAIL_CHECK_TTL_SECS),
        )
        .await;
        Ok(exists)
    }

    /// Subscribe a new account to the free-tier plan for the trial window.
    pub(crate) async fn provision_free_tier(&self, user_id: DbId) -> AuthResult<Subscription> {
        let plan = self
            .store
            .free_tier_plan()
            .await
            .context("load free tier plan")?
            .ok_or_else(|| {
                tracing::error!("Free tier plan is missing from subscription_plans");
                AuthError::NotFound {
                    entity: "Subscription plan",
                }
            })?;

        let started_at = Utc::now();
        let subscription = self
            .store
            .create_subscription(&NewSubscription {
                user_id,
                plan_id: plan.id,
                status: SUBSCRIPTION_STATUS_ACTIVE.to_string(),
                started_at,
                expires_at: started_at + chrono::Duration::days(FREE_TIER_TRIAL_DAYS),
            })
            .await
            .context("create subscription")?;

        tracing::debug!(user_id, plan = %plan.name, "Free tier provisioned");
        Ok(subscription)
    }
}
