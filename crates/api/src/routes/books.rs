//! Route definitions for the `/books` resource.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers::books;
use crate::multipart::MAX_UPLOAD_BYTES;
use crate::state::AppState;

/// Routes mounted at `/books`.
///
/// ```text
/// GET    /              -> list
/// POST   /              -> create (moderator+)
/// POST   /upload-file   -> upload_file (auth, multipart)
/// GET    /{id}          -> get_by_id
/// PATCH  /{id}          -> update (moderator+)
/// DELETE /{id}          -> delete (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(books::list).post(books::create))
        .route(
            "/upload-file",
            post(books::upload_file).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route(
            "/{id}",
            get(books::get_by_id)
                .patch(books::update)
                .delete(books::delete),
        )
}
