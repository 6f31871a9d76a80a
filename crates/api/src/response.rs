//! Shared response bodies for API handlers.
//!
//! Every resource is wrapped in a key naming it (`{"user": ...}`,
//! `{"books": [...]}`) so clients can tell payloads apart.

use bookshelf_db::models::book::Book;
use bookshelf_db::models::user::UserResponse;
use serde::Serialize;

/// `{ "message": ... }` acknowledgement.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserBody {
    pub user: UserResponse,
}

/// One page of users plus paging metadata.
#[derive(Debug, Serialize)]
pub struct PaginatedUsers {
    pub users: Vec<UserResponse>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

#[derive(Debug, Serialize)]
pub struct BookBody {
    pub book: Book,
}

#[derive(Debug, Serialize)]
pub struct BooksBody {
    pub books: Vec<Book>,
}

/// `{ "url": ... }` for presigned downloads.
#[derive(Debug, Serialize)]
pub struct UrlBody {
    pub url: String,
}

/// Result of a file upload.
#[derive(Debug, Serialize)]
pub struct UploadBody {
    pub message: String,
    /// Object key the file was stored under.
    pub filename: String,
}
