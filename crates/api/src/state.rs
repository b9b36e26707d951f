use std::sync::Arc;

use crate::config::ServerConfig;
use crate::services::AuthService;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration (cookie flags, client URL, token lifetimes).
    pub config: Arc<ServerConfig>,
    /// Authentication orchestrators and their collaborators.
    pub auth: Arc<AuthService>,
}
