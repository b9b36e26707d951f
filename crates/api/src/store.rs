//! Persistence seam used by the authentication flows.
//!
//! [`AuthStore`] lists every durable operation the orchestrators need. Reads
//! return `Ok(None)` for "not found"; `Err` always means the store failed.
//! [`PgAuthStore`] implements it on top of the `luthier-db` repositories.

use async_trait::async_trait;
use luthier_core::policy::FREE_TIER_PLAN_NAME;
use luthier_core::types::{DbId, Timestamp};
use luthier_db::models::email_verification::EmailVerification;
use luthier_db::models::session::{NewSession, Session};
use luthier_db::models::subscription::{NewSubscription, Subscription, SubscriptionPlan};
use luthier_db::models::user::{NewUser, User};
use luthier_db::repositories::{EmailVerificationRepo, SessionRepo, SubscriptionRepo, UserRepo};
use luthier_db::DbPool;

/// Error type for persistence operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint rejected the write.
    #[error("Duplicate value violates unique constraint: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// Classify a sqlx error, lifting unique violations (`23505`) into
    /// [`StoreError::Conflict`].
    pub fn from_sqlx(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown").to_string();
                return StoreError::Conflict(constraint);
            }
        }
        StoreError::Database(err)
    }
}

type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait AuthStore: Send + Sync {
    // -- users --
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn find_user_by_id(&self, id: DbId) -> StoreResult<Option<User>>;
    async fn create_user(&self, input: &NewUser) -> StoreResult<User>;
    async fn update_last_login(&self, id: DbId, at: Timestamp) -> StoreResult<()>;
    async fn update_password(&self, id: DbId, password_hash: &str) -> StoreResult<()>;
    async fn email_exists(&self, email: &str) -> StoreResult<bool>;

    // -- sessions --
    async fn create_session(&self, input: &NewSession) -> StoreResult<Session>;
    /// Live (valid, access-unexpired) session owning `hash`.
    async fn find_session_by_access_hash(&self, hash: &str) -> StoreResult<Option<Session>>;
    /// Live (valid, refresh-unexpired) session owning `hash`.
    async fn find_session_by_refresh_hash(&self, hash: &str) -> StoreResult<Option<Session>>;
    /// Returns whether a row was removed.
    async fn delete_session_by_access_hash(&self, hash: &str) -> StoreResult<bool>;
    /// Insert `input` and delete `old_id` atomically. `Ok(None)` when the
    /// old row was already gone and nothing was written.
    async fn rotate_session(&self, old_id: DbId, input: &NewSession)
        -> StoreResult<Option<Session>>;
    async fn delete_expired_sessions(&self) -> StoreResult<u64>;

    // -- email verification --
    async fn create_email_verification(
        &self,
        user_id: DbId,
        code: &str,
        expires_at: Timestamp,
    ) -> StoreResult<EmailVerification>;
    async fn find_verification_by_user(&self, user_id: DbId)
        -> StoreResult<Option<EmailVerification>>;
    async fn update_verification_code(
        &self,
        id: DbId,
        code: &str,
        expires_at: Timestamp,
    ) -> StoreResult<()>;
    /// Mark the verification record and the user verified together.
    async fn complete_verification(&self, user_id: DbId) -> StoreResult<()>;

    // -- subscriptions --
    async fn free_tier_plan(&self) -> StoreResult<Option<SubscriptionPlan>>;
    async fn create_subscription(&self, input: &NewSubscription) -> StoreResult<Subscription>;
    async fn find_active_subscription(&self, user_id: DbId) -> StoreResult<Option<Subscription>>;

    async fn ping(&self) -> StoreResult<()>;
}

/// [`AuthStore`] backed by Postgres.
#[derive(Clone)]
pub struct PgAuthStore {
    pool: DbPool,
}

impl PgAuthStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuthStore for PgAuthStore {
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(UserRepo::find_by_email(&self.pool, email).await?)
    }

    async fn find_user_by_id(&self, id: DbId) -> StoreResult<Option<User>> {
        Ok(UserRepo::find_by_id(&self.pool, id).await?)
    }

    async fn create_user(&self, input: &NewUser) -> StoreResult<User> {
        UserRepo::create(&self.pool, input)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn update_last_login(&self, id: DbId, at: Timestamp) -> StoreResult<()> {
        UserRepo::update_last_login(&self.pool, id, at).await?;
        Ok(())
    }

    async fn update_password(&self, id: DbId, password_hash: &str) -> StoreResult<()> {
        UserRepo::update_password(&self.pool, id, password_hash).await?;
        Ok(())
    }

    async fn email_exists(&self, email: &str) -> StoreResult<bool> {
        Ok(UserRepo::email_exists(&self.pool, email).await?)
    }

    async fn create_session(&self, input: &NewSession) -> StoreResult<Session> {
        SessionRepo::create(&self.pool, input)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn find_session_by_access_hash(&self, hash: &str) -> StoreResult<Option<Session>> {
        Ok(SessionRepo::find_by_access_token_hash(&self.pool, hash).await?)
    }

    async fn find_session_by_refresh_hash(&self, hash: &str) -> StoreResult<Option<Session>> {
        Ok(SessionRepo::find_by_refresh_token_hash(&self.pool, hash).await?)
    }

    async fn delete_session_by_access_hash(&self, hash: &str) -> StoreResult<bool> {
        Ok(SessionRepo::delete_by_access_token_hash(&self.pool, hash).await?)
    }

    async fn rotate_session(
        &self,
        old_id: DbId,
        input: &NewSession,
    ) -> StoreResult<Option<Session>> {
        SessionRepo::rotate(&self.pool, old_id, input)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn delete_expired_sessions(&self) -> StoreResult<u64> {
        Ok(SessionRepo::cleanup_expired(&self.pool).await?)
    }

    async fn create_email_verification(
        &self,
        user_id: DbId,
        code: &str,
        expires_at: Timestamp,
    ) -> StoreResult<EmailVerification> {
        EmailVerificationRepo::create(&self.pool, user_id, code, expires_at)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn find_verification_by_user(
        &self,
        user_id: DbId,
    ) -> StoreResult<Option<EmailVerification>> {
        Ok(EmailVerificationRepo::find_by_user_id(&self.pool, user_id).await?)
    }

    async fn update_verification_code(
        &self,
        id: DbId,
        code: &str,
        expires_at: Timestamp,
    ) -> StoreResult<()> {
        EmailVerificationRepo::update_code(&self.pool, id, code, expires_at).await?;
        Ok(())
    }

    async fn complete_verification(&self, user_id: DbId) -> StoreResult<()> {
        Ok(EmailVerificationRepo::complete(&self.pool, user_id).await?)
    }

    async fn free_tier_plan(&self) -> StoreResult<Option<SubscriptionPlan>> {
        Ok(SubscriptionRepo::find_plan_by_name(&self.pool, FREE_TIER_PLAN_NAME).await?)
    }

    async fn create_subscription(&self, input: &NewSubscription) -> StoreResult<Subscription> {
        Ok(SubscriptionRepo::create(&self.pool, input).await?)
    }

    async fn find_active_subscription(&self, user_id: DbId) -> StoreResult<Option<Subscription>> {
        Ok(SubscriptionRepo::find_active_for_user(&self.pool, user_id).await?)
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(luthier_db::health_check(&self.pool).await?)
    }
}
