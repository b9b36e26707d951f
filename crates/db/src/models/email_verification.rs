//! Email verification model.

use luthier_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// The single verification record a user owns.
///
/// The code is never deleted; completing verification only flips `verified`.
#[derive(Debug, Clone, FromRow)]
pub struct EmailVerification {
    pub id: DbId,
    pub user_id: DbId,
    pub code: String,
    pub expires_at: Timestamp,
    pub verified: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl EmailVerification {
    /// Whether the stored code can still be handed out.
    pub fn is_live(&self, now: Timestamp) -> bool {
        !self.verified && self.expires_at > now
    }
}
