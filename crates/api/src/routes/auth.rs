//! Route definitions for the `/auth` resource.

use axum::routing::post;
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// POST /signin       -> signin
/// POST /signup       -> signup
/// POST /refresh      -> refresh
/// POST /signout      -> signout (this session)
/// POST /signout/all  -> signout_all (every session, requires auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signin", post(auth::signin))
        .route("/signup", post(auth::signup))
        .route("/refresh", post(auth::refresh))
        .route("/signout", post(auth::signout))
        .route("/signout/all", post(auth::signout_all))
}
