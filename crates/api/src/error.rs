use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::services::AuthError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`AuthError`] and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A rejection or failure from the authentication flows.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The request carries no credentials.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Request body failed field validation.
    #[error("Validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// The client exceeded the request budget of a route group.
    #[error("Too many requests")]
    RateLimited,

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

const INTERNAL_MESSAGE: &str = "An internal error occurred";

impl AppError {
    /// Status, machine-readable code and client-facing message.
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            // --- Authentication flows ---
            AppError::Auth(auth) => classify_auth_error(auth),

            // --- HTTP-specific errors ---
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                errors.to_string(),
            ),
            AppError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "RATE_LIMITED",
                "Too many requests, try again later".to_string(),
            ),
            AppError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                INTERNAL_MESSAGE.to_string(),
            ),
        }
    }

    /// Machine-readable error code, as sent in the `code` field.
    pub fn code(&self) -> &'static str {
        self.parts().1
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
            }
            // Dependency failures are logged where they are wrapped.
            AppError::Auth(AuthError::Configuration(msg)) => {
                tracing::error!(error = %msg, "Configuration error");
            }
            _ => {}
        }

        let (status, code, message) = self.parts();
        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Classify an [`AuthError`] into an HTTP status, error code, and message.
///
/// - Unknown user, wrong login method and wrong password share one 401 so
///   responses cannot be used to enumerate accounts.
/// - Dependency and configuration failures map to 500 with a sanitized message.
fn classify_auth_error(err: &AuthError) -> (StatusCode, &'static str, String) {
    match err {
        AuthError::UserNotFound | AuthError::InvalidLoginMethod | AuthError::InvalidCredentials => (
            StatusCode::UNAUTHORIZED,
            "INVALID_CREDENTIALS",
            "Invalid email or password".to_string(),
        ),
        AuthError::AccountDeleted => (StatusCode::FORBIDDEN, "ACCOUNT_DELETED", err.to_string()),
        AuthError::NotVerified => (StatusCode::FORBIDDEN, "NOT_VERIFIED", err.to_string()),
        AuthError::EmailTaken | AuthError::AlreadyVerified => {
            (StatusCode::CONFLICT, "CONFLICT", err.to_string())
        }
        AuthError::VerificationExpired => (
            StatusCode::BAD_REQUEST,
            "VERIFICATION_EXPIRED",
            err.to_string(),
        ),
        AuthError::IncorrectCode => (StatusCode::BAD_REQUEST, "INCORRECT_CODE", err.to_string()),
        AuthError::InvalidToken(_) => (
            StatusCode::UNAUTHORIZED,
            "INVALID_TOKEN",
            "Invalid or expired token".to_string(),
        ),
        AuthError::InvalidState => (StatusCode::UNAUTHORIZED, "INVALID_STATE", err.to_string()),
        AuthError::WeakPassword(_) | AuthError::SamePassword | AuthError::Validation(_) => {
            (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", err.to_string())
        }
        AuthError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string()),
        AuthError::Configuration(_) | AuthError::Dependency { .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            INTERNAL_MESSAGE.to_string(),
        ),
    }
}
