//! Email verification codes.
//!
//! A user is `Unverified` until [`AuthService::verify_email`] succeeds. The
//! verification token says who is verifying and until when; the emailed code
//! is the secret. At most one code per user is live at a time.

use chrono::Utc;
use luthier_core::policy::{profile_key, VERIFICATION_CODE_TTL_MINS};
use luthier_core::types::Timestamp;
use luthier_core::verification::{generate_verification_code, CODE_LENGTH};
use luthier_db::models::user::User;
use luthier_events::EmailJob;

use super::error::{
    signing_failure, validation_failure, AuthError, AuthResult, DependencyContext, TokenUse,
};
use super::types::VerificationTicket;
use super::AuthService;
use crate::auth::jwt::{generate_verification_token, validate_verification_token};

impl AuthService {
    /// Reuse the user's live code or replace it, then email it and return a
    /// fresh verification token bound to the code's expiry.
    pub(crate) async fn issue_verification(&self, user: &User) -> AuthResult<VerificationTicket> {
        let now = Utc::now();
        let existing = self
            .store
            .find_verification_by_user(user.id)
            .await
            .context("load email verification")?;

        let (code, expires_at) = match existing {
            Some(record) if record.is_live(now) => (record.code, record.expires_at),
            Some(record) => {
                let (code, expires_at) = fresh_code(now)?;
                self.store
                    .update_verification_code(record.id, &code, expires_at)
                    .await
                    .context("replace verification code")?;
                (code, expires_at)
            }
            None => {
                let (code, expires_at) = fresh_code(now)?;
                self.store
                    .create_email_verification(user.id, &code, expires_at)
                    .await
                    .context("create email verification")?;
                (code, expires_at)
            }
        };

        let verification_token =
            generate_verification_token(user.id, &user.email, expires_at, &self.jwt)
                .map_err(|e| signing_failure(e, "sign verification token"))?;

        self.emails
            .enqueue(&EmailJob::verification_code(&user.email, &code))
            .await
            .context("enqueue verification email")?;

        tracing::info!(user_id = user.id, %expires_at, "Verification code issued");
        Ok(VerificationTicket {
            verification_token,
            expires_at,
        })
    }

    /// Check `code` against the user named by `token` and mark the account
    /// verified.
    ///
    /// Codes are compared exactly. Verifying an already verified account
    /// with its code succeeds again.
    pub async fn verify_email(&self, token: &str, code: &str) -> AuthResult<()> {
        let claims = validate_verification_token(token, &self.jwt)
            .map_err(|e| validation_failure(e, TokenUse::Verification))?;
        let expires_at = claims
            .expires_at()
            .ok_or(AuthError::InvalidToken(TokenUse::Verification))?;

        let now = Utc::now();
        if now > expires_at {
            tracing::warn!(user_id = claims.sub, "Verification token past its code expiry");
            return Err(AuthError::VerificationExpired);
        }

        let record = self
            .store
            .find_verification_by_user(claims.sub)
            .await
            .context("load email verification")?
            .ok_or(AuthError::NotFound {
                entity: "Email verification",
            })?;

        if now > record.expires_at {
            tracing::warn!(user_id = claims.sub, "Stored verification code has expired");
            return Err(AuthError::VerificationExpired);
        }
        if record.code != code {
            tracing::warn!(user_id = claims.sub, "Incorrect verification code");
            return Err(AuthError::IncorrectCode);
        }

        self.store
            .complete_verification(claims.sub)
            .await
            .context("mark user verified")?;
        self.forget(&profile_key(claims.sub)).await;

        tracing::info!(user_id = claims.sub, "Email verified");
        Ok(())
    }

    /// Send the code again, regenerating it if it has expired.
    ///
    /// The token's own business expiry is not checked: resending is how a
    /// user with an expired code gets a new one.
    pub async fn resend_verification(&self, token: &str) -> AuthResult<VerificationTicket> {
        let claims = validate_verification_token(token, &self.jwt)
            .map_err(|e| validation_failure(e, TokenUse::Verification))?;

        let user = self
            .store
            .find_user_by_id(claims.sub)
            .await
            .context("load user")?
            .ok_or(AuthError::UserNotFound)?;

        if user.deleted {
            tracing::warn!(user_id = user.id, "Resend rejected: account deleted");
            return Err(AuthError::AccountDeleted);
        }
        if user.verified {
            return Err(AuthError::AlreadyVerified);
        }

        self.issue_verification(&user).await
    }
}

fn fresh_code(now: Timestamp) -> AuthResult<(String, Timestamp)> {
    let code = generate_verification_code(CODE_LENGTH).context("generate verification code")?;
    Ok((code, now + chrono::Duration::minutes(VERIFICATION_CODE_TTL_MINS)))
}
