//! Row structs and insert DTOs.
//!
//! Each submodule contains a `FromRow` struct matching the table row and a
//! `New*` DTO for inserts.

pub mod email_verification;
pub mod session;
pub mod subscription;
pub mod user;
