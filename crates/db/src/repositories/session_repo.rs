//! Repository for the `sessions` table.

use luthier_core::types::DbId;
use sqlx::PgPool;

use crate::models::session::{NewSession, Session};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, access_token_hash, refresh_token_hash, \
                       access_expires_at, refresh_expires_at, is_valid, device_info, \
                       created_at, updated_at";

/// Provides CRUD operations for sessions.
pub struct SessionRepo;

impl SessionRepo {
    /// Insert a new session, returning the created row.
    pub async fn create(pool: &PgPool, input: &NewSession) -> Result<Session, sqlx::Error> {
        let query = insert_query();
        sqlx::query_as::<_, Session>(&query)
            .bind(input.user_id)
            .bind(&input.access_token_hash)
            .bind(&input.refresh_token_hash)
            .bind(input.access_expires_at)
            .bind(input.refresh_expires_at)
            .bind(&input.device_info)
            .fetch_one(pool)
            .await
    }

    /// Find a live session by its access token hash.
    ///
    /// Only returns sessions that are valid and whose access token has not expired.
    pub async fn find_by_access_token_hash(
        pool: &PgPool,
        hash: &str,
    ) -> Result<Option<Session>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM sessions
             WHERE access_token_hash = $1
               AND is_valid = true
               AND access_expires_at > NOW()"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(hash)
            .fetch_optional(pool)
            .await
    }

    /// Find a live session by its refresh token hash.
    ///
    /// Only returns sessions that are valid and whose refresh token has not expired.
    pub async fn find_by_refresh_token_hash(
        pool: &PgPool,
        hash: &str,
    ) -> Result<Option<Session>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM sessions
             WHERE refresh_token_hash = $1
               AND is_valid = true
               AND refresh_expires_at > NOW()"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(hash)
            .fetch_optional(pool)
            .await
    }

    /// Delete the session owning `hash`. Returns `true` if a row was removed.
    pub async fn delete_by_access_token_hash(
        pool: &PgPool,
        hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE access_token_hash = $1")
            .bind(hash)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Replace session `old_id` with a new row in a single transaction.
    ///
    /// The new row is inserted first, then the old row is deleted. When the
    /// old row is already gone (a concurrent rotation won the race) the
    /// transaction is rolled back and `None` is returned.
    pub async fn rotate(
        pool: &PgPool,
        old_id: DbId,
        input: &NewSession,
    ) -> Result<Option<Session>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = insert_query();
        let created = sqlx::query_as::<_, Session>(&query)
            .bind(input.user_id)
            .bind(&input.access_token_hash)
            .bind(&input.refresh_token_hash)
            .bind(input.access_expires_at)
            .bind(input.refresh_expires_at)
            .bind(&input.device_info)
            .fetch_one(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM sessions WHERE id = $1 AND is_valid = true")
            .bind(old_id)
            .execute(&mut *tx)
            .await?;

        if deleted.rows_affected() == 0 {
            tx.rollback().await?;
            tracing::debug!(old_id, "Session rotation lost to a concurrent refresh");
            return Ok(None);
        }

        tx.commit().await?;
        Ok(Some(created))
    }

    /// Delete invalidated sessions and those past their refresh expiry.
    /// Returns the count of deleted rows.
    pub async fn cleanup_expired(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM sessions WHERE refresh_expires_at < NOW() OR is_valid = false",
        )
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}

fn insert_query() -> String {
    format!(
        "INSERT INTO sessions (user_id, access_token_hash, refresh_token_hash, \
                               access_expires_at, refresh_expires_at, device_info)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING {COLUMNS}"
    )
}
