//! Handlers for the `/books` resource.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use bookshelf_core::error::CoreError;
use bookshelf_core::types::DbId;
use bookshelf_core::validation::{trimmed, validate};
use bookshelf_db::models::book::{CreateBook, UpdateBook};
use bookshelf_db::repositories::BookRepo;
use bookshelf_storage::{content_type_for, object_key, Visibility};
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireAdmin, RequireModerator};
use crate::multipart::MultipartForm;
use crate::response::{BookBody, BooksBody, MessageResponse, UploadBody};
use crate::state::AppState;

/// Object key prefix for uploaded book files.
const BOOK_FILE_PREFIX: &str = "books";

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct CreateBookRequest {
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub author: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateBookRequest {
    #[validate(length(min = 1))]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub author: Option<String>,
}

impl CreateBookRequest {
    fn trimmed(self) -> Self {
        Self {
            title: trimmed(self.title),
            author: trimmed(self.author),
        }
    }
}

impl UpdateBookRequest {
    fn trimmed(self) -> Self {
        Self {
            title: self.title.map(trimmed),
            author: self.author.map(trimmed),
        }
    }
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Book", id })
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/books
pub async fn list(State(state): State<AppState>) -> AppResult<Json<BooksBody>> {
    let books = BookRepo::list(&state.pool).await?;
    Ok(Json(BooksBody { books }))
}

/// GET /api/v1/books/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<BookBody>> {
    let book = BookRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(BookBody { book }))
}

/// POST /api/v1/books
///
/// Moderator or admin.
pub async fn create(
    RequireModerator(user): RequireModerator,
    State(state): State<AppState>,
    Json(input): Json<CreateBookRequest>,
) -> AppResult<(StatusCode, Json<BookBody>)> {
    let input = input.trimmed();
    validate(&input)?;
    let book = BookRepo::create(
        &state.pool,
        &CreateBook {
            title: input.title,
            author: input.author,
        },
    )
    .await?;

    tracing::info!(book_id = %book.id, user_id = %user.user_id, "Book created");
    Ok((StatusCode::CREATED, Json(BookBody { book })))
}

/// PATCH /api/v1/books/{id}
///
/// Moderator or admin. Absent fields are left unchanged.
pub async fn update(
    RequireModerator(_user): RequireModerator,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateBookRequest>,
) -> AppResult<Json<BookBody>> {
    let input = input.trimmed();
    validate(&input)?;
    let changes = UpdateBook {
        title: input.title,
        author: input.author,
    };
    let book = BookRepo::update(&state.pool, id, &changes)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(BookBody { book }))
}

/// DELETE /api/v1/books/{id}
///
/// Admin only.
pub async fn delete(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<MessageResponse>> {
    if !BookRepo::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(book_id = %id, user_id = %user.user_id, "Book deleted");
    Ok(Json(MessageResponse::new("Book deleted")))
}

/// POST /api/v1/books/upload-file
///
/// Store a file in the public bucket under `books/{uuid}.{ext}`.
pub async fn upload_file(
    user: AuthUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<UploadBody>)> {
    let mut form = MultipartForm::read(multipart).await?;
    let file = form.require_file("file")?;

    let key = object_key(BOOK_FILE_PREFIX, &file.file_name);
    state
        .storage
        .put_object(
            Visibility::Public,
            &key,
            file.bytes,
            content_type_for(&file.file_name),
        )
        .await?;

    tracing::info!(key = %key, user_id = %user.user_id, "Book file uploaded");
    Ok((
        StatusCode::CREATED,
        Json(UploadBody {
            message: "File uploaded".to_string(),
            filename: key,
        }),
    ))
}
