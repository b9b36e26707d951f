//! Credential cookies and bearer headers.
//!
//! Access and refresh tokens travel as `HttpOnly; SameSite=Lax` cookies.
//! Authenticated endpoints also accept `Authorization: Bearer <token>`.

use axum::http::header::{AUTHORIZATION, COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderName};

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";
pub const OAUTH_STATE_COOKIE: &str = "oauth_state";

/// A `Set-Cookie` header ready for [`axum::response::AppendHeaders`].
pub type SetCookie = (HeaderName, String);

/// Build a `Set-Cookie` value for `name`.
pub fn build_cookie(name: &str, value: &str, max_age_secs: i64, secure: bool) -> SetCookie {
    let mut cookie =
        format!("{name}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}");
    if secure {
        cookie.push_str("; Secure");
    }
    (SET_COOKIE, cookie)
}

/// Build a `Set-Cookie` value that expires `name` immediately.
pub fn clear_cookie(name: &str, secure: bool) -> SetCookie {
    build_cookie(name, "", 0, secure)
}

/// Value of cookie `name` from the request's `Cookie` headers.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    for header in headers.get_all(COOKIE) {
        let Ok(raw) = header.to_str() else {
            continue;
        };
        for pair in raw.split(';') {
            let Some((key, value)) = pair.trim().split_once('=') else {
                continue;
            };
            if key == name && !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}

/// Token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = raw
        .strip_prefix("Bearer ")
        .or_else(|| raw.strip_prefix("bearer "))?
        .trim();
    (!token.is_empty()).then(|| token.to_string())
}

/// Access token from the bearer header, falling back to the cookie.
pub fn access_token(headers: &HeaderMap) -> Option<String> {
    bearer_token(headers).or_else(|| read_cookie(headers, ACCESS_TOKEN_COOKIE))
}
