//! Domain primitives shared by every Luthier crate.
//!
//! Nothing in here performs I/O. The persistence, queue and HTTP layers
//! build on these types and constants.

pub mod hashing;
pub mod login_method;
pub mod policy;
pub mod types;
pub mod verification;
