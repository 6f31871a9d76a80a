//! Bearer-token authentication extractor.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use bookshelf_core::error::CoreError;
use bookshelf_core::roles::Role;
use bookshelf_core::tokens::{TokenType, BEARER};
use bookshelf_core::types::DbId;

use crate::error::AppError;
use crate::state::AppState;

/// Identity resolved from the access token in the `Authorization` header.
///
/// Any handler taking this extractor requires authentication:
///
/// ```ignore
/// async fn me(user: AuthUser) -> AppResult<Json<UserBody>> { ... }
/// ```
///
/// A malformed or missing header is 401 `UNAUTHORIZED`; a bad token is 401
/// `INVALID_TOKEN` and an expired one 401 `TOKEN_EXPIRED`.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: DbId,
    pub email: String,
    pub role: Role,
}

impl AuthUser {
    /// True when the caller is `user_id` or an admin.
    pub fn is_self_or_admin(&self, user_id: DbId) -> bool {
        self.user_id == user_id || self.role.is_admin()
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let token = header
            .strip_prefix(BEARER)
            .and_then(|rest| rest.strip_prefix(' '))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Invalid Authorization format. Expected: Bearer <token>".into(),
                ))
            })?;

        let claims = state.auth.codec().verify(token, TokenType::Access)?;

        Ok(AuthUser {
            user_id: claims.sub,
            email: claims.email,
            role: claims.role,
        })
    }
}
