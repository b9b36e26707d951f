//! Route definitions for the `/auth` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{auth, google};
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// POST /signup           -> signup
/// POST /check-email      -> check_email
/// POST /signin           -> signin
/// POST /verify-email     -> verify_email
/// POST /resend-code      -> resend_code
/// POST /refresh          -> refresh
/// POST /logout           -> logout
/// GET  /google/login     -> google::login
/// GET  /google/callback  -> google::callback
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(auth::signup))
        .route("/check-email", post(auth::check_email))
        .route("/signin", post(auth::signin))
        .route("/verify-email", post(auth::verify_email))
        .route("/resend-code", post(auth::resend_code))
        .route("/refresh", post(auth::refresh))
        .route("/logout", post(auth::logout))
        .route("/google/login", get(google::login))
        .route("/google/callback", get(google::callback))
}
