//! Repository for the `email_verifications` table.

use luthier_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::email_verification::EmailVerification;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, code, expires_at, verified, created_at, updated_at";

/// Provides operations on the per-user verification record.
pub struct EmailVerificationRepo;

impl EmailVerificationRepo {
    /// Insert the verification record for `user_id`.
    ///
    /// A user owns at most one record (`uq_email_verifications_user_id`).
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        code: &str,
        expires_at: Timestamp,
    ) -> Result<EmailVerification, sqlx::Error> {
        let query = format!(
            "INSERT INTO email_verifications (user_id, code, expires_at)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, EmailVerification>(&query)
            .bind(user_id)
            .bind(code)
            .bind(expires_at)
            .fetch_one(pool)
            .await
    }

    /// Find the verification record owned by `user_id`.
    pub async fn find_by_user_id(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<EmailVerification>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM email_verifications WHERE user_id = $1");
        sqlx::query_as::<_, EmailVerification>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Replace code and expiry in one statement.
    pub async fn update_code(
        pool: &PgPool,
        id: DbId,
        code: &str,
        expires_at: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE email_verifications \
             SET code = $2, expires_at = $3, verified = false \
             WHERE id = $1",
        )
        .bind(id)
        .bind(code)
        .bind(expires_at)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark both the verification record and the owning user as verified.
    pub async fn complete(pool: &PgPool, user_id: DbId) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("UPDATE email_verifications SET verified = true WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE users SET verified = true WHERE id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await
    }
}
