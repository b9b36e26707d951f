//! User entity model and DTOs.

use luthier_core::login_method::LoginMethod;
use luthier_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// Full user row from the `users` table.
///
/// Contains the password hash -- NEVER serialize this to API responses directly.
/// OAuth accounts carry an empty `password_hash`.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub email: String,
    pub password_hash: String,
    #[sqlx(try_from = "Option<String>")]
    pub login_method: LoginMethod,
    pub google_id: Option<String>,
    pub role: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub address: String,
    pub country: String,
    pub workshop_name: String,
    pub is_active: bool,
    pub deleted: bool,
    pub verified: bool,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub login_method: LoginMethod,
    pub google_id: Option<String>,
    pub role: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub address: String,
    pub country: String,
    pub workshop_name: String,
    pub verified: bool,
}
