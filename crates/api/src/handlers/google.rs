//! Handlers for the Google OAuth redirect dance.
//!
//! Both endpoints answer with a 303. Login sends the browser to Google;
//! the callback always sends it back to the client app with a `status`
//! query parameter, so the browser never lands on a JSON error page.

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::{AppendHeaders, IntoResponse, Redirect, Response};
use luthier_core::policy::OAUTH_STATE_TTL_SECS;
use serde::Deserialize;
use url::Url;

use super::auth::session_cookies;
use super::device_from;
use crate::config::ServerConfig;
use crate::cookies::{build_cookie, clear_cookie, read_cookie, SetCookie, OAUTH_STATE_COOKIE};
use crate::error::{AppError, AppResult};
use crate::services::{GoogleCallback, LoginOutcome};
use crate::state::AppState;

/// Path on the client app that receives the callback outcome.
const CLIENT_CALLBACK_PATH: &str = "/auth/google/callback";

/// Query string Google appends to the redirect URI.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub code: String,
    /// Set instead of `code` when the user denied consent.
    pub error: Option<String>,
}

/// GET /api/v1/auth/google/login
///
/// Issue a CSRF state, remember it in a short-lived cookie and redirect to
/// Google's consent screen.
pub async fn login(State(state): State<AppState>) -> AppResult<Response> {
    let authorization = state.auth.google_login().await?;
    let cookie = build_cookie(
        OAUTH_STATE_COOKIE,
        &authorization.state,
        OAUTH_STATE_TTL_SECS as i64,
        state.config.cookie_secure,
    );
    Ok((AppendHeaders([cookie]), Redirect::to(&authorization.url)).into_response())
}

/// GET /api/v1/auth/google/callback
///
/// Finish the login and redirect to `{CLIENT_URL}/auth/google/callback`
/// with `status=success`, `status=verification_required` or
/// `status=error&code=...`.
pub async fn callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<CallbackQuery>,
) -> AppResult<Response> {
    let config = &state.config;
    let mut cookies: Vec<SetCookie> = vec![clear_cookie(OAUTH_STATE_COOKIE, config.cookie_secure)];

    if let Some(error) = query.error {
        tracing::warn!(%error, "Google returned an authorization error");
        let target = client_redirect(config, &[("status", "error"), ("code", "OAUTH_DENIED")])?;
        return Ok((AppendHeaders(cookies), Redirect::to(&target)).into_response());
    }

    let callback = GoogleCallback {
        state: query.state,
        code: query.code,
        cookie_state: read_cookie(&headers, OAUTH_STATE_COOKIE),
    };
    let device = device_from(&headers);

    let target = match state.auth.google_callback(callback, &device).await {
        Ok(LoginOutcome::Authenticated(session)) => {
            cookies.extend(session_cookies(config, &session));
            client_redirect(config, &[("status", "success")])?
        }
        Ok(LoginOutcome::VerificationRequired(ticket)) => client_redirect(
            config,
            &[
                ("status", "verification_required"),
                ("verificationToken", &ticket.verification_token),
                ("expiresAt", &ticket.expires_at.to_rfc3339()),
            ],
        )?,
        Err(e) => {
            let err = AppError::from(e);
            tracing::warn!(code = err.code(), error = %err, "Google callback rejected");
            client_redirect(config, &[("status", "error"), ("code", err.code())])?
        }
    };

    Ok((AppendHeaders(cookies), Redirect::to(&target)).into_response())
}

/// `{CLIENT_URL}/auth/google/callback` with `params` in the query string.
fn client_redirect(config: &ServerConfig, params: &[(&str, &str)]) -> AppResult<String> {
    let mut url = Url::parse(&format!("{}{CLIENT_CALLBACK_PATH}", config.client_url))
        .map_err(|e| AppError::InternalError(format!("Invalid CLIENT_URL: {e}")))?;
    url.query_pairs_mut().extend_pairs(params);
    Ok(url.into())
}
