//! The unit of work carried by the email queue.

use serde::{Deserialize, Serialize};

/// Subject of the verification code email.
pub const VERIFICATION_SUBJECT: &str = "Verificá tu cuenta";

/// Subject of the password change notice.
pub const PASSWORD_CHANGED_SUBJECT: &str = "Se modificó tu contraseña";

/// A single outbound email. Lives only as long as it sits in the queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailJob {
    pub to: String,
    pub subject: String,
    /// HTML body.
    pub body: String,
}

impl EmailJob {
    pub fn new(to: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
        }
    }

    /// The email carrying a verification code.
    pub fn verification_code(to: &str, code: &str) -> Self {
        Self::new(
            to,
            VERIFICATION_SUBJECT,
            format!("Tu código de verificación es: {code}"),
        )
    }

    /// Notice sent after a successful password change.
    pub fn password_changed(to: &str) -> Self {
        Self::new(
            to,
            PASSWORD_CHANGED_SUBJECT,
            "La contraseña de tu cuenta fue modificada. Si no fuiste vos, contactá a soporte.",
        )
    }
}
