//! One-time email verification codes.
//!
//! Codes are drawn from the operating system CSPRNG. Bytes that would bias
//! the alphabet (values at or above the largest multiple of its length) are
//! discarded and redrawn.

use rand::rngs::OsRng;
use rand::TryRngCore;

/// Characters a verification code is drawn from.
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of the codes emailed to users.
pub const CODE_LENGTH: usize = 6;

/// Largest byte value (exclusive) that maps uniformly onto the alphabet.
const ACCEPT_BOUND: usize = 256 - 256 % CODE_ALPHABET.len();

/// Error type for code generation.
#[derive(Debug, thiserror::Error)]
pub enum CodeError {
    /// The operating system random source failed.
    #[error("Random source unavailable: {0}")]
    Rng(String),
}

/// Generate a random code of `length` characters from [`CODE_ALPHABET`].
pub fn generate_verification_code(length: usize) -> Result<String, CodeError> {
    let mut code = String::with_capacity(length);
    let mut buf = [0u8; 32];

    while code.len() < length {
        OsRng
            .try_fill_bytes(&mut buf)
            .map_err(|e| CodeError::Rng(e.to_string()))?;

        for &byte in &buf {
            if usize::from(byte) >= ACCEPT_BOUND {
                continue;
            }
            code.push(char::from(CODE_ALPHABET[usize::from(byte) % CODE_ALPHABET.len()]));
            if code.len() == length {
                break;
            }
        }
    }

    Ok(code)
}
