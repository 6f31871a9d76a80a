//! Authentication extractors and request-level layers.
//!
//! - [`auth::AuthUser`] -- Resolves the caller from a Bearer access token.
//! - [`rbac::RequireAdmin`] -- Requires the `admin` role.
//! - [`rbac::RequireModerator`] -- Requires `moderator` or `admin` role.
//! - [`rate_limit`] -- Per-IP request budgets.
//! - [`security_headers`] -- Hardening response headers.

pub mod auth;
pub mod rate_limit;
pub mod rbac;
pub mod security_headers;
