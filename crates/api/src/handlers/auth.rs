//! Handlers for the `/auth` resource (signin, signup, refresh, signout).

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::auth::service::{Registration, TokenPair};
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::{MessageResponse, UserBody};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/signin`.
#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

/// Request body for `POST /auth/refresh` and `POST /auth/signout`.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/signin
///
/// Exchange email + password for an access/refresh token pair.
pub async fn signin(
    State(state): State<AppState>,
    Json(input): Json<SigninRequest>,
) -> AppResult<Json<TokenPair>> {
    let pair = state.auth.login(&input.email, &input.password).await?;
    Ok(Json(pair))
}

/// POST /api/v1/auth/signup
///
/// Create a `user` account. The caller signs in separately. Asking for any
/// other role is 403; admins create privileged accounts via `POST /users`.
pub async fn signup(
    State(state): State<AppState>,
    Json(input): Json<Registration>,
) -> AppResult<Json<UserBody>> {
    let user = state.auth.register(input).await?;
    Ok(Json(UserBody { user: user.into() }))
}

/// POST /api/v1/auth/refresh
///
/// New access token for a live refresh token. The refresh token is returned
/// unchanged.
pub async fn refresh(
    State(state): State<AppState>,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<TokenPair>> {
    let pair = state.auth.refresh_token(&input.refresh_token).await?;
    Ok(Json(pair))
}

/// POST /api/v1/auth/signout
///
/// Revoke the session the given refresh token belongs to.
pub async fn signout(
    State(state): State<AppState>,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<MessageResponse>> {
    state.auth.logout_with_token(&input.refresh_token).await?;
    Ok(Json(MessageResponse::new("Signed out")))
}

/// POST /api/v1/auth/signout/all
///
/// Revoke every session of the authenticated user.
pub async fn signout_all(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<MessageResponse>> {
    state.auth.logout(user.user_id).await?;
    Ok(Json(MessageResponse::new("Signed out of all sessions")))
}
