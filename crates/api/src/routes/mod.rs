pub mod auth;
pub mod books;
pub mod health;
pub mod users;

use axum::Router;

use crate::middleware::rate_limit::RateLimitConfig;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/signin                      signin (public)
/// /auth/signup                      signup (public)
/// /auth/refresh                     refresh access token (public)
/// /auth/signout                     revoke one session (refresh token in body)
/// /auth/signout/all                 revoke all sessions (auth required)
///
/// /users                            list (moderator+), create (admin, multipart)
/// /users/me                         current user (auth required)
/// /users/forgot-password            mail a reset link (public)
/// /users/reset-password             set password with reset token (public)
/// /users/{id}                       get (auth), update (self or admin), delete (admin)
/// /users/{id}/role                  change role (admin)
/// /users/{id}/profile-image         presigned URL (auth), replace (self or admin)
///
/// /books                            list (public), create (moderator+)
/// /books/upload-file                upload a file to the public bucket (auth)
/// /books/{id}                       get (public), update (moderator+), delete (admin)
/// ```
///
/// Every route shares the general rate limit; `/auth` also has its own
/// stricter one.
pub fn api_routes(rate_limit: &RateLimitConfig) -> Router<AppState> {
    let routes = Router::new()
        .nest("/auth", rate_limit.limit_auth(auth::router()))
        .nest("/users", users::router())
        .nest("/books", books::router());
    rate_limit.limit_api(routes)
}
