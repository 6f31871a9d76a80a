use crate::types::DbId;

/// Domain error taxonomy shared by the services and the HTTP boundary.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Login failed. Deliberately says nothing about which half was wrong.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Token is malformed, unsigned, of the wrong type, or revoked.
    #[error("invalid token")]
    InvalidToken,

    /// Token signature is valid but its expiry has passed.
    #[error("token has expired")]
    TokenExpired,

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// Input shape or constraint violation, with field + rule detail.
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Credentials were missing or not presented in the expected form.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),
}
