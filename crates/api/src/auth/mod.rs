//! Credential and token primitives.
//!
//! - [`jwt`] -- signed access, refresh and verification tokens.
//! - [`password`] -- Argon2id password hashing.

pub mod jwt;
pub mod password;
