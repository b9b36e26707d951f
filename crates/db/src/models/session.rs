//! Session model and DTOs.

use luthier_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `sessions` table. One row per issued token pair.
///
/// Only SHA-256 digests of the tokens are stored.
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub id: DbId,
    pub user_id: DbId,
    pub access_token_hash: String,
    pub refresh_token_hash: String,
    pub access_expires_at: Timestamp,
    pub refresh_expires_at: Timestamp,
    pub is_valid: bool,
    pub device_info: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new session.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub user_id: DbId,
    pub access_token_hash: String,
    pub refresh_token_hash: String,
    pub access_expires_at: Timestamp,
    pub refresh_expires_at: Timestamp,
    pub device_info: String,
}
