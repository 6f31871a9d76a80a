//! Domain types shared by every bookshelf crate.
//!
//! Nothing in here performs I/O: the error taxonomy, role and token-type
//! enums, id/timestamp aliases, input validation, and pagination arithmetic.

pub mod error;
pub mod pagination;
pub mod roles;
pub mod tokens;
pub mod types;
pub mod validation;
