//! Shared SHA-256 hex digest utility.
//!
//! Session rows are indexed by the digest of their tokens, never by the
//! tokens themselves.

use sha2::{Digest, Sha256};

/// Compute a SHA-256 hex digest of the given bytes.
pub fn sha256_hex(data: &[u8]) -> String {
    let hash = Sha256::digest(data);
    format!("{hash:x}")
}
