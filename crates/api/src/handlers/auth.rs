//! Handlers for the `/auth` resource (signup, verification, sessions).

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{AppendHeaders, IntoResponse, Response};
use axum::Json;
use luthier_core::types::Timestamp;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::device_from;
use crate::config::ServerConfig;
use crate::cookies::{
    access_token, build_cookie, clear_cookie, read_cookie, SetCookie, ACCESS_TOKEN_COOKIE,
    REFRESH_TOKEN_COOKIE,
};
use crate::error::{AppError, AppResult};
use crate::response::MessageResponse;
use crate::services::{
    AuthError, AuthSession, LoginOutcome, Profile, Registration, TokenUse, VerificationTicket,
};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/signup`.
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub workshop_name: String,
}

/// Request body for `POST /auth/check-email`.
#[derive(Debug, Deserialize, Validate)]
pub struct CheckEmailRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct CheckEmailResponse {
    pub exists: bool,
}

/// Request body for `POST /auth/signin`.
#[derive(Debug, Deserialize, Validate)]
pub struct SigninRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Request body for `POST /auth/verify-email`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VerifyEmailRequest {
    #[validate(length(min = 1, message = "Verification token is required"))]
    pub verification_token: String,
    #[validate(length(min = 1, message = "Code is required"))]
    pub code: String,
}

/// Request body for `POST /auth/resend-code`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResendCodeRequest {
    #[validate(length(min = 1, message = "Verification token is required"))]
    pub verification_token: String,
}

/// Optional body for `POST /auth/refresh` when the cookie is not sent.
#[derive(Debug, Default, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

/// Successful authentication response returned by signin and refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub profile: Profile,
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

/// Signin response for an account that must verify its email first.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationRequiredResponse {
    pub verification_required: bool,
    pub verification_token: String,
    pub verification_code_expires_at: Timestamp,
    pub redirect: &'static str,
}

impl From<VerificationTicket> for VerificationRequiredResponse {
    fn from(ticket: VerificationTicket) -> Self {
        Self {
            verification_required: true,
            verification_token: ticket.verification_token,
            verification_code_expires_at: ticket.expires_at,
            redirect: "/verify",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub message: &'static str,
    /// Whether a live session was removed.
    pub revoked: bool,
}

// ---------------------------------------------------------------------------
// Cookies
// ---------------------------------------------------------------------------

/// `Set-Cookie` headers carrying a freshly issued pair.
pub(crate) fn session_cookies(config: &ServerConfig, session: &AuthSession) -> [SetCookie; 2] {
    [
        build_cookie(
            ACCESS_TOKEN_COOKIE,
            &session.access_token,
            config.jwt.access_ttl_secs(),
            config.cookie_secure,
        ),
        build_cookie(
            REFRESH_TOKEN_COOKIE,
            &session.refresh_token,
            config.jwt.refresh_ttl_secs(),
            config.cookie_secure,
        ),
    ]
}

fn session_response(config: &ServerConfig, session: AuthSession) -> Response {
    let cookies = session_cookies(config, &session);
    let body = AuthResponse {
        profile: session.profile,
        access_token: session.access_token,
        refresh_token: session.refresh_token,
        expires_in: config.jwt.access_ttl_secs(),
    };
    (AppendHeaders(cookies), Json(body)).into_response()
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/signup
///
/// Create a password account. Returns the verification token for the code
/// that was just emailed; no session is created.
pub async fn signup(
    State(state): State<AppState>,
    Json(input): Json<SignupRequest>,
) -> AppResult<(StatusCode, Json<VerificationTicket>)> {
    input.validate()?;

    let ticket = state
        .auth
        .register(Registration {
            email: input.email,
            password: input.password,
            first_name: input.first_name,
            last_name: input.last_name,
            phone: input.phone,
            address: input.address,
            country: input.country,
            workshop_name: input.workshop_name,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(ticket)))
}

/// POST /api/v1/auth/check-email
pub async fn check_email(
    State(state): State<AppState>,
    Json(input): Json<CheckEmailRequest>,
) -> AppResult<Json<CheckEmailResponse>> {
    input.validate()?;
    let exists = state.auth.check_email(&input.email).await?;
    Ok(Json(CheckEmailResponse { exists }))
}

/// POST /api/v1/auth/signin
///
/// Authenticate with email + password. Sets the token cookies and returns
/// the pair, or returns a verification envelope for unverified accounts.
pub async fn signin(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<SigninRequest>,
) -> AppResult<Response> {
    input.validate()?;
    let device = device_from(&headers);

    match state
        .auth
        .login(&input.email, &input.password, &device)
        .await?
    {
        LoginOutcome::Authenticated(session) => Ok(session_response(&state.config, *session)),
        LoginOutcome::VerificationRequired(ticket) => {
            Ok(Json(VerificationRequiredResponse::from(ticket)).into_response())
        }
    }
}

/// POST /api/v1/auth/verify-email
pub async fn verify_email(
    State(state): State<AppState>,
    Json(input): Json<VerifyEmailRequest>,
) -> AppResult<Json<MessageResponse>> {
    input.validate()?;
    state
        .auth
        .verify_email(&input.verification_token, &input.code)
        .await?;
    Ok(Json(MessageResponse::new("Email verified successfully")))
}

/// POST /api/v1/auth/resend-code
pub async fn resend_code(
    State(state): State<AppState>,
    Json(input): Json<ResendCodeRequest>,
) -> AppResult<Json<VerificationTicket>> {
    input.validate()?;
    let ticket = state
        .auth
        .resend_verification(&input.verification_token)
        .await?;
    Ok(Json(ticket))
}

/// POST /api/v1/auth/refresh
///
/// Rotate the session. The refresh token is read from the `refresh_token`
/// cookie, or from the JSON body.
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Response> {
    let from_body = if body.is_empty() {
        RefreshRequest::default()
    } else {
        serde_json::from_slice::<RefreshRequest>(&body)
            .map_err(|e| AppError::BadRequest(format!("Invalid request body: {e}")))?
    };

    let token = read_cookie(&headers, REFRESH_TOKEN_COOKIE)
        .or(from_body.refresh_token.filter(|t| !t.is_empty()))
        .ok_or(AppError::Auth(AuthError::InvalidToken(TokenUse::Refresh)))?;

    let device = device_from(&headers);
    let session = state.auth.refresh(&token, &device).await?;
    Ok(session_response(&state.config, session))
}

/// POST /api/v1/auth/logout
///
/// Revoke the session owning the presented access token and clear the
/// cookies. Always succeeds; `revoked` tells whether a session was removed.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> AppResult<Response> {
    let revoked = match access_token(&headers) {
        Some(token) => state.auth.logout(&token).await?,
        None => false,
    };

    let secure = state.config.cookie_secure;
    let cookies = [
        clear_cookie(ACCESS_TOKEN_COOKIE, secure),
        clear_cookie(REFRESH_TOKEN_COOKIE, secure),
    ];
    let body = LogoutResponse {
        message: "Logged out successfully",
        revoked,
    };
    Ok((AppendHeaders(cookies), Json(body)).into_response())
}
