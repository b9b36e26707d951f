//! Access-token authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use luthier_core::types::DbId;

use crate::cookies::access_token;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated user resolved from the access token.
///
/// The token is read from `Authorization: Bearer <token>` or, failing that,
/// from the `access_token` cookie. It must be validly signed and belong to a
/// live session.
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = user.user_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The user's internal database id.
    pub user_id: DbId,
    /// The session the token belongs to.
    pub session_id: DbId,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = access_token(&parts.headers)
            .ok_or_else(|| AppError::Unauthorized("Missing access token".into()))?;

        let user = state.auth.authenticate(&token).await?;

        Ok(AuthUser {
            user_id: user.user_id,
            session_id: user.session_id,
        })
    }
}
