//! Route definitions for the `/users` resource.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::users;
use crate::multipart::MAX_UPLOAD_BYTES;
use crate::state::AppState;

/// Routes mounted at `/users`.
///
/// ```text
/// GET    /                     -> list (moderator+)
/// POST   /                     -> create (admin, multipart)
/// GET    /me                   -> me
/// POST   /forgot-password      -> forgot_password
/// POST   /reset-password       -> reset_password
/// GET    /{id}                 -> get_by_id
/// PATCH  /{id}                 -> update (self or admin)
/// DELETE /{id}                 -> delete (admin)
/// PATCH  /{id}/role            -> update_role (admin)
/// GET    /{id}/profile-image   -> profile_image_url
/// PUT    /{id}/profile-image   -> upload_profile_image (self or admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(users::list)
                .post(users::create)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/me", get(users::me))
        .route("/forgot-password", post(users::forgot_password))
        .route("/reset-password", post(users::reset_password))
        .route(
            "/{id}",
            get(users::get_by_id)
                .patch(users::update)
                .delete(users::delete),
        )
        .route("/{id}/role", patch(users::update_role))
        .route(
            "/{id}/profile-image",
            get(users::profile_image_url)
                .put(users::upload_profile_image)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
}
