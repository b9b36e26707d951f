//! Luthier API server library.
//!
//! Exposes the building blocks (config, token primitives, collaborator
//! traits, the [`services::AuthService`] orchestrators, routes) so
//! integration tests and the binary entrypoint can both access them.

pub mod auth;
pub mod background;
pub mod cache;
pub mod config;
pub mod cookies;
pub mod device;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod oauth;
pub mod response;
pub mod router;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
