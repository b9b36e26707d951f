//! Failures of the authentication flows.

use luthier_core::verification::CodeError;
use luthier_events::QueueError;

use crate::auth::jwt::TokenError;
use crate::cache::CacheError;
use crate::oauth::OAuthError;
use crate::store::StoreError;

/// Which credential an [`AuthError::InvalidToken`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenUse {
    Access,
    Refresh,
    Verification,
}

/// Rejection or failure of an [`AuthService`](super::AuthService) operation.
///
/// `UserNotFound`, `InvalidLoginMethod` and `InvalidCredentials` stay distinct
/// here so they can be logged and tested; the HTTP layer renders all three
/// the same way.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("User not found")]
    UserNotFound,

    #[error("Account has been deleted")]
    AccountDeleted,

    /// The account authenticates with a different strategy.
    #[error("Account uses a different login method")]
    InvalidLoginMethod,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Email address is not verified")]
    NotVerified,

    #[error("Email is already registered")]
    EmailTaken,

    #[error("Email address is already verified")]
    AlreadyVerified,

    /// The business expiry embedded in the verification token has passed.
    #[error("Verification code has expired")]
    VerificationExpired,

    #[error("Incorrect verification code")]
    IncorrectCode,

    /// Signature, kind or session lookup failed for the presented token.
    #[error("Invalid or expired {0:?} token")]
    InvalidToken(TokenUse),

    /// The OAuth callback state was never issued or was already consumed.
    #[error("Invalid or expired OAuth state")]
    InvalidState,

    #[error("{0}")]
    WeakPassword(String),

    #[error("New password must differ from the current one")]
    SamePassword,

    #[error("{0}")]
    Validation(String),

    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    /// A secret or endpoint is missing or malformed.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A collaborator failed; `context` names the step.
    #[error("Failed to {context}: {source}")]
    Dependency {
        context: &'static str,
        #[source]
        source: DependencyError,
    },
}

/// Collaborator failures wrapped by [`AuthError::Dependency`].
#[derive(Debug, thiserror::Error)]
pub enum DependencyError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error(transparent)]
    OAuth(#[from] OAuthError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("Password hashing failed: {0}")]
    Password(argon2::password_hash::Error),

    #[error(transparent)]
    Code(#[from] CodeError),
}

impl From<argon2::password_hash::Error> for DependencyError {
    fn from(err: argon2::password_hash::Error) -> Self {
        DependencyError::Password(err)
    }
}

pub type AuthResult<T> = Result<T, AuthError>;

/// Attach a step name to a collaborator failure.
pub(crate) trait DependencyContext<T> {
    fn context(self, context: &'static str) -> AuthResult<T>;
}

impl<T, E> DependencyContext<T> for Result<T, E>
where
    E: Into<DependencyError>,
{
    fn context(self, context: &'static str) -> AuthResult<T> {
        self.map_err(|e| dependency(context, e.into()))
    }
}

fn dependency(context: &'static str, source: DependencyError) -> AuthError {
    tracing::error!(context, error = %source, "Dependency failure");
    AuthError::Dependency { context, source }
}

/// Classify a token signing failure: a missing secret is a configuration
/// problem, anything else a dependency failure.
pub(crate) fn signing_failure(err: TokenError, context: &'static str) -> AuthError {
    if err.is_configuration() {
        tracing::error!(context, error = %err, "Token signing is misconfigured");
        return AuthError::Configuration(err.to_string());
    }
    dependency(context, err.into())
}

/// Classify a token validation failure.
pub(crate) fn validation_failure(err: TokenError, kind: TokenUse) -> AuthError {
    if err.is_configuration() {
        tracing::error!(error = %err, "Token validation is misconfigured");
        return AuthError::Configuration(err.to_string());
    }
    tracing::warn!(?kind, error = %err, "Rejected token");
    AuthError::InvalidToken(kind)
}
