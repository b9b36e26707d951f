//! Signed token issuance and validation.
//!
//! Three kinds of HS256 token are issued, each signed with its own secret:
//!
//! - access tokens ([`Claims`] with `typ = access`), short lived;
//! - refresh tokens ([`Claims`] with `typ = refresh`), used only to mint a
//!   new pair;
//! - verification tokens ([`VerificationClaims`]), which carry no `exp`.
//!   Their business expiry is the embedded `verification_expires_at`, checked
//!   by the verification flow rather than by signature validation.
//!
//! Sessions are indexed by [`hash_token`]; the plaintext tokens are never
//! stored.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use luthier_core::hashing::sha256_hex;
use luthier_core::policy::{ACCESS_TOKEN_TTL_MINS, REFRESH_TOKEN_TTL_DAYS};
use luthier_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{env_or, require_env, ConfigError};

// ---------------------------------------------------------------------------
// Claims
// ---------------------------------------------------------------------------

/// Which session credential a [`Claims`] payload belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Claims embedded in access and refresh tokens.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject -- the user's internal database id.
    pub sub: DbId,
    pub typ: TokenKind,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Unique token identifier (UUID v4). Makes every minted token, and so
    /// every stored hash, distinct.
    pub jti: String,
}

/// Claims embedded in an email verification token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct VerificationClaims {
    pub sub: DbId,
    pub email: String,
    /// Business expiry of the code this token was issued for (Unix seconds).
    pub verification_expires_at: i64,
    pub iat: i64,
}

impl VerificationClaims {
    pub fn expires_at(&self) -> Option<Timestamp> {
        DateTime::from_timestamp(self.verification_expires_at, 0)
    }
}

/// A freshly signed token together with its expiry.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for token operations.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// The signing secret for this token kind is empty.
    #[error("{0} signing secret is not configured")]
    MissingSecret(&'static str),

    /// Signing failed.
    #[error("Token encoding failed: {0}")]
    Encode(#[source] jsonwebtoken::errors::Error),

    /// Signature, algorithm, expiry or payload check failed.
    #[error("Invalid token: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),

    /// A well-signed token of the other kind was presented.
    #[error("Expected a {expected:?} token, got {found:?}")]
    WrongKind { expected: TokenKind, found: TokenKind },
}

impl TokenError {
    /// Whether this error is a configuration problem rather than a bad token.
    pub fn is_configuration(&self) -> bool {
        matches!(self, TokenError::MissingSecret(_))
    }
}

// ---------------------------------------------------------------------------
// JwtConfig
// ---------------------------------------------------------------------------

/// Secrets and lifetimes for every token kind.
#[derive(Clone)]
pub struct JwtConfig {
    pub access_secret: String,
    pub refresh_secret: String,
    pub verification_secret: String,
    /// Access token lifetime in minutes (default: 15).
    pub access_token_expiry_mins: i64,
    /// Refresh token lifetime in days (default: 7).
    pub refresh_token_expiry_days: i64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("access_token_expiry_mins", &self.access_token_expiry_mins)
            .field("refresh_token_expiry_days", &self.refresh_token_expiry_days)
            .finish_non_exhaustive()
    }
}

impl JwtConfig {
    /// Load JWT configuration from environment variables.
    ///
    /// | Env Var                    | Required | Default |
    /// |----------------------------|----------|---------|
    /// | `JWT_ACCESS_SECRET`        | **yes**  | --      |
    /// | `JWT_REFRESH_SECRET`       | **yes**  | --      |
    /// | `JWT_VERIFICATION_SECRET`  | **yes**  | --      |
    /// | `JWT_ACCESS_EXPIRY_MINS`   | no       | `15`    |
    /// | `JWT_REFRESH_EXPIRY_DAYS`  | no       | `7`     |
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            access_secret: require_env("JWT_ACCESS_SECRET")?,
            refresh_secret: require_env("JWT_REFRESH_SECRET")?,
            verification_secret: require_env("JWT_VERIFICATION_SECRET")?,
            access_token_expiry_mins: env_or("JWT_ACCESS_EXPIRY_MINS", ACCESS_TOKEN_TTL_MINS)?,
            refresh_token_expiry_days: env_or("JWT_REFRESH_EXPIRY_DAYS", REFRESH_TOKEN_TTL_DAYS)?,
        })
    }

    /// Access token lifetime in seconds.
    pub fn access_ttl_secs(&self) -> i64 {
        self.access_token_expiry_mins * 60
    }

    /// Refresh token lifetime in seconds.
    pub fn refresh_ttl_secs(&self) -> i64 {
        self.refresh_token_expiry_days * 24 * 60 * 60
    }

    fn secret_for(&self, kind: TokenKind) -> Result<&[u8], TokenError> {
        let (secret, name) = match kind {
            TokenKind::Access => (&self.access_secret, "Access"),
            TokenKind::Refresh => (&self.refresh_secret, "Refresh"),
        };
        non_empty(secret, name)
    }
}

fn non_empty<'a>(secret: &'a str, name: &'static str) -> Result<&'a [u8], TokenError> {
    if secret.is_empty() {
        return Err(TokenError::MissingSecret(name));
    }
    Ok(secret.as_bytes())
}

// ---------------------------------------------------------------------------
// Access / refresh tokens
// ---------------------------------------------------------------------------

/// Generate an access token for `user_id`.
pub fn generate_access_token(user_id: DbId, config: &JwtConfig) -> Result<IssuedToken, TokenError> {
    issue(
        user_id,
        TokenKind::Access,
        Duration::minutes(config.access_token_expiry_mins),
        config,
    )
}

/// Generate a refresh token for `user_id`.
pub fn generate_refresh_token(
    user_id: DbId,
    config: &JwtConfig,
) -> Result<IssuedToken, TokenError> {
    issue(
        user_id,
        TokenKind::Refresh,
        Duration::days(config.refresh_token_expiry_days),
        config,
    )
}

fn issue(
    user_id: DbId,
    kind: TokenKind,
    lifetime: Duration,
    config: &JwtConfig,
) -> Result<IssuedToken, TokenError> {
    let secret = config.secret_for(kind)?;
    let now = Utc::now();
    let expires_at = now + lifetime;

    let claims = Claims {
        sub: user_id,
        typ: kind,
        exp: expires_at.timestamp(),
        iat: now.timestamp(),
        jti: Uuid::new_v4().to_string(),
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret),
    )
    .map_err(TokenError::Encode)?;

    Ok(IssuedToken { token, expires_at })
}

/// Validate and decode an access token.
///
/// Checks the signature, the algorithm (HS256 only), the expiry and the kind.
pub fn validate_access_token(token: &str, config: &JwtConfig) -> Result<Claims, TokenError> {
    validate(token, TokenKind::Access, config)
}

/// Validate and decode a refresh token.
pub fn validate_refresh_token(token: &str, config: &JwtConfig) -> Result<Claims, TokenError> {
    validate(token, TokenKind::Refresh, config)
}

fn validate(token: &str, expected: TokenKind, config: &JwtConfig) -> Result<Claims, TokenError> {
    let secret = config.secret_for(expected)?;
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret),
        &Validation::new(Algorithm::HS256),
    )
    .map_err(TokenError::Invalid)?;

    let claims = token_data.claims;
    if claims.typ != expected {
        return Err(TokenError::WrongKind {
            expected,
            found: claims.typ,
        });
    }
    Ok(claims)
}

// ---------------------------------------------------------------------------
// Verification tokens
// ---------------------------------------------------------------------------

/// Generate a verification token binding `user_id`, `email` and the code
/// expiry.
pub fn generate_verification_token(
    user_id: DbId,
    email: &str,
    expires_at: Timestamp,
    config: &JwtConfig,
) -> Result<String, TokenError> {
    let secret = non_empty(&config.verification_secret, "Verification")?;
    let claims = VerificationClaims {
        sub: user_id,
        email: email.to_string(),
        verification_expires_at: expires_at.timestamp(),
        iat: Utc::now().timestamp(),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret),
    )
    .map_err(TokenError::Encode)
}

/// Validate the signature and algorithm of a verification token.
///
/// Expiry is NOT checked here; see [`VerificationClaims::expires_at`].
pub fn validate_verification_token(
    token: &str,
    config: &JwtConfig,
) -> Result<VerificationClaims, TokenError> {
    let secret = non_empty(&config.verification_secret, "Verification")?;

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.required_spec_claims.clear();

    let token_data = decode::<VerificationClaims>(
        token,
        &DecodingKey::from_secret(secret),
        &validation,
    )
    .map_err(TokenError::Invalid)?;
    Ok(token_data.claims)
}

// ---------------------------------------------------------------------------
// Hashing
// ---------------------------------------------------------------------------

/// Compute the SHA-256 hex digest under which a token is stored.
pub fn hash_token(token: &str) -> String {
    sha256_hex(token.as_bytes())
}
