pub mod auth;
pub mod google;
pub mod user;

use axum::http::header::USER_AGENT;
use axum::http::HeaderMap;

use crate::device::describe_device;

/// Device descriptor for the session created by this request.
pub(crate) fn device_from(headers: &HeaderMap) -> String {
    describe_device(headers.get(USER_AGENT).and_then(|v| v.to_str().ok()))
}
