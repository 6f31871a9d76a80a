//! Object store collaborator.
//!
//! [`ObjectStore`] covers the three operations the services use: put an
//! object with a content type, delete it, and mint a time-limited download
//! URL. [`s3::S3Storage`] is the production backend; [`memory::MemoryObjectStore`]
//! keeps objects in process for tests.

pub mod keys;
pub mod memory;
pub mod s3;

use async_trait::async_trait;

pub use keys::{content_type_for, object_key};
pub use memory::MemoryObjectStore;
pub use s3::{S3Config, S3Storage};

/// Which bucket an object lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// World-readable bucket (`public-read` ACL).
    Public,
    /// Private bucket; objects are reached through presigned URLs.
    Private,
}

/// Error type for object store failures.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The backend rejected or failed a request.
    #[error("Object store {operation} failed for '{key}': {message}")]
    Request {
        operation: &'static str,
        key: String,
        message: String,
    },

    /// The requested presign lifetime is not accepted by the backend.
    #[error("Invalid presign configuration: {0}")]
    Presign(String),
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload `body` under `key` with the given content type.
    async fn put_object(
        &self,
        visibility: Visibility,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError>;

    /// Delete `key`. Deleting an absent object is not an error.
    async fn delete_object(&self, visibility: Visibility, key: &str) -> Result<(), StorageError>;

    /// A time-limited GET URL for a private object.
    async fn presigned_url(&self, key: &str) -> Result<String, StorageError>;
}
