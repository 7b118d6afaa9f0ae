//! Folio web server library.
//!
//! Exposes config, state, error handling, sessions and routes so integration
//! tests and the binary entrypoint can both build the same application.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod render;
pub mod router;
pub mod routes;
pub mod session;
pub mod state;
pub mod upload;
