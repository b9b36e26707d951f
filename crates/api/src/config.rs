use std::str::FromStr;

use luthier_events::queue::DEFAULT_QUEUE_NAME;
use luthier_events::{EmailConfig, EmailConfigError};

use crate::auth::jwt::JwtConfig;
use crate::oauth::google::GoogleConfig;

/// Error raised while loading configuration at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} has an invalid value: {value}")]
    Invalid { var: &'static str, value: String },

    #[error(transparent)]
    Email(#[from] EmailConfigError),
}

/// Read a required, non-empty variable.
pub(crate) fn require_env(var: &'static str) -> Result<String, ConfigError> {
    match std::env::var(var) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(var)),
    }
}

/// Read and parse an optional variable, falling back to `default`.
pub(crate) fn env_or<T: FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value: raw }),
        Err(_) => Ok(default),
    }
}

/// Read an optional interval in seconds that must be non-zero.
pub(crate) fn nonzero_secs_or(var: &'static str, default: u64) -> Result<u64, ConfigError> {
    match env_or(var, default)? {
        0 => Err(ConfigError::Invalid {
            var,
            value: "0".to_string(),
        }),
        secs => Ok(secs),
    }
}

/// Server configuration loaded from environment variables.
///
/// Everything is read once at startup; a missing secret stops the process
/// before it binds a socket.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long to wait for background tasks after the server stops (default: `30`).
    pub shutdown_timeout_secs: u64,
    pub database_url: String,
    pub redis_url: String,
    /// Redis list backing the email queue.
    pub email_queue_name: String,
    /// Browser client base URL, target of the OAuth callback redirect.
    pub client_url: String,
    /// Add `Secure` to every cookie.
    pub cookie_secure: bool,
    /// Interval of the expired-session cleanup job. Never zero.
    pub session_cleanup_interval_secs: u64,
    /// JWT secrets and lifetimes.
    pub jwt: JwtConfig,
    pub google: GoogleConfig,
    pub email: EmailConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                         | Default                    |
    /// |---------------------------------|----------------------------|
    /// | `HOST`                          | `0.0.0.0`                  |
    /// | `PORT`                          | `3000`                     |
    /// | `CORS_ORIGINS`                  | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`          | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`         | `30`                       |
    /// | `DATABASE_URL`                  | required                   |
    /// | `REDIS_URL`                     | `redis://127.0.0.1:6379`   |
    /// | `EMAIL_QUEUE_NAME`              | `email_queue`              |
    /// | `CLIENT_URL`                    | `http://localhost:5173`    |
    /// | `COOKIE_SECURE`                 | `false`                    |
    /// | `SESSION_CLEANUP_INTERVAL_SECS` | `3600`                     |
    ///
    /// JWT, Google and email settings are read by [`JwtConfig::from_env`],
    /// [`GoogleConfig::from_env`] and [`EmailConfig::from_env`].
    pub fn from_env() -> Result<Self, ConfigError> {
        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        for origin in &cors_origins {
            if origin.parse::<axum::http::HeaderValue>().is_err() {
                return Err(ConfigError::Invalid {
                    var: "CORS_ORIGINS",
                    value: origin.clone(),
                });
            }
        }

        let client_url = std::env::var("CLIENT_URL")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .trim_end_matches('/')
            .to_string();
        if url::Url::parse(&client_url).is_err() {
            return Err(ConfigError::Invalid {
                var: "CLIENT_URL",
                value: client_url,
            });
        }

        Ok(Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env_or("PORT", 3000)?,
            cors_origins,
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 30)?,
            shutdown_timeout_secs: env_or("SHUTDOWN_TIMEOUT_SECS", 30)?,
            database_url: require_env("DATABASE_URL")?,
            redis_url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://127.0.0.1:6379".into()),
            email_queue_name: std::env::var("EMAIL_QUEUE_NAME")
                .unwrap_or_else(|_| DEFAULT_QUEUE_NAME.into()),
            client_url,
            cookie_secure: env_or("COOKIE_SECURE", false)?,
            session_cleanup_interval_secs: nonzero_secs_or("SESSION_CLEANUP_INTERVAL_SECS", 3600)?,
            jwt: JwtConfig::from_env()?,
            google: GoogleConfig::from_env()?,
            email: EmailConfig::from_env()?,
        })
    }
}
