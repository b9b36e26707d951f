//! Handlers for the signed-in user's own account.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use validator::Validate;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::MessageResponse;
use crate::services::Profile;
use crate::state::AppState;

/// Request body for `PUT /users/password`.
#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub new_password: String,
}

/// GET /api/v1/users/profile
pub async fn profile(State(state): State<AppState>, user: AuthUser) -> AppResult<Json<Profile>> {
    let profile = state.auth.profile(user.user_id).await?;
    Ok(Json(profile))
}

/// PUT /api/v1/users/password
///
/// Change the password of a password account. Existing sessions stay valid.
pub async fn change_password(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<ChangePasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    input.validate()?;
    state
        .auth
        .change_password(user.user_id, &input.current_password, &input.new_password)
        .await?;
    Ok(Json(MessageResponse::new("Password updated successfully")))
}
