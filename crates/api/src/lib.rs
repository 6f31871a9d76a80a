//! Bookshelf API server library.
//!
//! Exposes config, state, auth, error handling and routes so the server
//! binary, the seeding binary and the integration tests share them.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod multipart;
pub mod query;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
