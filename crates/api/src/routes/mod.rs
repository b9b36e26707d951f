pub mod auth;
pub mod health;
pub mod user;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /ping                        liveness probe
///
/// /auth/signup                 register (public)
/// /auth/check-email            email availability (public)
/// /auth/signin                 password login (public)
/// /auth/verify-email           submit verification code (public)
/// /auth/resend-code            resend verification code (public)
/// /auth/refresh                rotate session (refresh token)
/// /auth/logout                 revoke session
/// /auth/google/login           start Google OAuth (redirect)
/// /auth/google/callback        finish Google OAuth (redirect)
///
/// /users/profile               own profile (requires auth)
/// /users/password              change password (requires auth)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ping", get(health::ping))
        .nest("/auth", auth::router())
        .nest("/users", user::router())
}
