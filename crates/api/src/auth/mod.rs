//! Authentication primitives and the auth service.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`jwt`] -- signed access/refresh tokens.
//! - [`reset_token`] -- one-time password reset tokens.
//! - [`service`] -- login, refresh, logout and registration flows.

pub mod jwt;
pub mod password;
pub mod reset_token;
pub mod service;
