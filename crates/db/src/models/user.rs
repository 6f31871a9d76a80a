//! User entity model and DTOs.

use bookshelf_core::roles::Role;
use bookshelf_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Full user row from the `users` table.
///
/// Contains the password hash and reset token hash -- NEVER serialize this to
/// API responses directly. Use [`UserResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: Option<String>,
    #[sqlx(try_from = "String")]
    pub role: Role,
    /// Object key of the profile image in the private bucket.
    pub profile_image: Option<String>,
    pub reset_password_token_hash: Option<String>,
    pub reset_password_sent_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Safe user representation for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: DbId,
    pub email: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub role: Role,
    pub profile_image: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            role: user.role,
            profile_image: user.profile_image,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// DTO for creating a new user. The password is already hashed.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub role: Role,
    pub profile_image: Option<String>,
}

/// DTO for profile updates. `first_name` is always replaced; `last_name` is
/// replaced with whatever is given, including `None`.
#[derive(Debug, Clone)]
pub struct UpdateUser {
    pub first_name: String,
    pub last_name: Option<String>,
}
