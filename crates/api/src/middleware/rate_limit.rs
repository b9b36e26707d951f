//! Fixed-window rate limiting per client IP and route group.
//!
//! Counters live in the shared cache under `rate:{group}:{ip}` and expire
//! with their window. When the cache is unreachable requests are let
//! through.

use std::net::SocketAddr;
use std::time::Duration;

use axum::extract::{ConnectInfo, OriginalUri, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::AppError;
use crate::state::AppState;

/// Length of every rate-limit window.
pub const WINDOW: Duration = Duration::from_secs(60);

/// Route group and its request budget per [`WINDOW`].
pub fn limit_for(path: &str) -> (&'static str, u64) {
    match path.trim_end_matches('/') {
        "/api/v1/auth/signin" => ("signin", 5),
        "/api/v1/auth/signup" => ("signup", 5),
        "/api/v1/auth/check-email" => ("check-email", 10),
        "/api/v1/auth/verify-email" => ("verify-email", 10),
        "/api/v1/auth/resend-code" => ("resend-code", 3),
        "/api/v1/auth/refresh" => ("refresh", 10),
        "/api/v1/auth/logout" => ("logout", 20),
        _ => ("default", 100),
    }
}

/// Reject the request with 429 once the client's budget is spent.
pub async fn rate_limit(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let path = request
        .extensions()
        .get::<OriginalUri>()
        .map_or_else(|| request.uri().path(), |OriginalUri(uri)| uri.path());
    let (group, limit) = limit_for(path);
    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let key = format!("rate:{group}:{client}");

    match state.auth.cache().increment(&key, WINDOW).await {
        Ok(count) if count > limit => {
            tracing::warn!(group, %client, count, limit, "Rate limit exceeded");
            return AppError::RateLimited.into_response();
        }
        Ok(_) => {}
        Err(e) => {
            tracing::warn!(group, error = %e, "Rate limiter unavailable, allowing request");
        }
    }

    next.run(request).await
}
