//! Route definitions for the `/users` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::user;
use crate::state::AppState;

/// Routes mounted at `/users`. All require authentication.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/profile", get(user::profile))
        .route("/password", put(user::change_password))
}
