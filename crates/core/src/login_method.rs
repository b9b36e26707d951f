//! How an account authenticates.
//!
//! Accounts created through the signup form are [`LoginMethod::Password`]
//! accounts. Accounts created on a first OAuth callback are bound to their
//! provider and can never sign in with a password. The `users.login_method`
//! column stores `NULL` for password accounts and the provider tag otherwise.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Closed set of supported authentication strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoginMethod {
    Password,
    Google,
}

/// A `login_method` column value that names no known strategy.
#[derive(Debug, thiserror::Error)]
#[error("Unknown login method: {0}")]
pub struct UnknownLoginMethod(pub String);

impl LoginMethod {
    /// Value persisted in `users.login_method`.
    pub fn as_db_value(self) -> Option<&'static str> {
        match self {
            LoginMethod::Password => None,
            LoginMethod::Google => Some("google"),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LoginMethod::Password => "password",
            LoginMethod::Google => "google",
        }
    }
}

impl fmt::Display for LoginMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<Option<String>> for LoginMethod {
    type Error = UnknownLoginMethod;

    fn try_from(value: Option<String>) -> Result<Self, Self::Error> {
        match value.as_deref() {
            None | Some("") | Some("password") => Ok(LoginMethod::Password),
            Some("google") => Ok(LoginMethod::Google),
            Some(other) => Err(UnknownLoginMethod(other.to_string())),
        }
    }
}
