//! Handlers for the `/users` resource: account administration, profile
//! images and password reset.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use bookshelf_core::error::CoreError;
use bookshelf_core::pagination::{page_offset, total_pages};
use bookshelf_core::roles::Role;
use bookshelf_core::tokens::TokenType;
use bookshelf_core::types::DbId;
use bookshelf_core::validation::{normalize_email, trimmed, trimmed_opt, validate};
use bookshelf_db::models::user::{UpdateUser, User, UserResponse};
use bookshelf_db::repositories::UserRepo;
use bookshelf_mail::templates::RESET_PASSWORD_SUBJECT;
use bookshelf_mail::EmailTemplate;
use bookshelf_storage::{content_type_for, object_key, Visibility};
use chrono::{Duration, Utc};
use serde::Deserialize;
use validator::Validate;

use crate::auth::password::hash_password;
use crate::auth::reset_token::{generate_reset_token, hash_reset_token};
use crate::auth::service::Registration;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireAdmin, RequireModerator};
use crate::multipart::{MultipartForm, UploadedFile};
use crate::query::PageParams;
use crate::response::{MessageResponse, PaginatedUsers, UrlBody, UserBody};
use crate::state::AppState;

/// Object key prefix for profile images.
const PROFILE_IMAGE_PREFIX: &str = "profiles";

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `PATCH /users/{id}`.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1))]
    pub first_name: String,
    pub last_name: Option<String>,
}

impl UpdateProfileRequest {
    fn trimmed(self) -> Self {
        Self {
            first_name: trimmed(self.first_name),
            last_name: trimmed_opt(self.last_name),
        }
    }
}

/// Request body for `PATCH /users/{id}/role`.
#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: String,
}

/// Request body for `POST /users/forgot-password`.
#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// Request body for `POST /users/reset-password`.
#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1))]
    pub token: String,
    #[validate(length(min = 8))]
    pub password: String,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_user(state: &AppState, id: DbId) -> AppResult<User> {
    UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))
}

fn ensure_self_or_admin(caller: &AuthUser, user_id: DbId) -> AppResult<()> {
    if !caller.is_self_or_admin(user_id) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the account owner or an admin may do this".into(),
        )));
    }
    Ok(())
}

/// Upload an image to the private bucket and return its key.
async fn store_profile_image(state: &AppState, file: UploadedFile) -> AppResult<String> {
    let content_type = content_type_for(&file.file_name);
    if !content_type.starts_with("image/") {
        return Err(AppError::BadRequest(format!(
            "Unsupported profile image type: {}",
            file.file_name
        )));
    }

    let key = object_key(PROFILE_IMAGE_PREFIX, &file.file_name);
    state
        .storage
        .put_object(Visibility::Private, &key, file.bytes, content_type)
        .await?;
    Ok(key)
}

/// Remove an object that is no longer referenced. Failures only leak storage.
async fn discard_profile_image(state: &AppState, key: &str) {
    if let Err(e) = state.storage.delete_object(Visibility::Private, key).await {
        tracing::warn!(key, error = %e, "Failed to delete profile image");
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/users?page=&limit=
///
/// Moderator or admin.
pub async fn list(
    RequireModerator(_user): RequireModerator,
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> AppResult<Json<PaginatedUsers>> {
    let (page, limit) = params.resolve();
    let users = UserRepo::list(&state.pool, limit, page_offset(page, limit)).await?;
    let total = UserRepo::count(&state.pool).await?;

    Ok(Json(PaginatedUsers {
        users: users.into_iter().map(UserResponse::from).collect(),
        total,
        page,
        per_page: limit,
        total_pages: total_pages(total, limit),
    }))
}

/// GET /api/v1/users/me
pub async fn me(user: AuthUser, State(state): State<AppState>) -> AppResult<Json<UserBody>> {
    let user = find_user(&state, user.user_id).await?;
    Ok(Json(UserBody { user: user.into() }))
}

/// GET /api/v1/users/{id}
pub async fn get_by_id(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<UserBody>> {
    let user = find_user(&state, id).await?;
    Ok(Json(UserBody { user: user.into() }))
}

/// POST /api/v1/users
///
/// Admin only. Multipart fields `email`, `password`, `first_name`,
/// `last_name?`, `role?` and an optional `profile_image` file.
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<UserBody>)> {
    let mut form = MultipartForm::read(multipart).await?;
    let registration = Registration {
        email: form.require_text("email")?.to_string(),
        password: form.require_text("password")?.to_string(),
        first_name: form.require_text("first_name")?.to_string(),
        last_name: form.text("last_name").map(str::to_string),
        role: form.text("role").map(str::to_string),
    };

    let mut user = state.auth.register_as_admin(registration).await?;

    if let Some(file) = form.take_file("profile_image") {
        let key = store_profile_image(&state, file).await?;
        user = UserRepo::update_profile_image(&state.pool, user.id, Some(&key))
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "User",
                id: user.id,
            }))?;
    }

    tracing::info!(user_id = %user.id, admin_id = %admin.user_id, "User created by admin");
    Ok((StatusCode::CREATED, Json(UserBody { user: user.into() })))
}

/// PATCH /api/v1/users/{id}
///
/// The account owner or an admin.
pub async fn update(
    caller: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateProfileRequest>,
) -> AppResult<Json<UserBody>> {
    ensure_self_or_admin(&caller, id)?;
    let input = input.trimmed();
    validate(&input)?;

    let changes = UpdateUser {
        first_name: input.first_name,
        last_name: input.last_name,
    };
    let user = UserRepo::update_profile(&state.pool, id, &changes)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;
    Ok(Json(UserBody { user: user.into() }))
}

/// PATCH /api/v1/users/{id}/role
///
/// Admin only. Unknown roles are rejected with 400. Revokes the user's
/// sessions so no token keeps the old role.
pub async fn update_role(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateRoleRequest>,
) -> AppResult<Json<UserBody>> {
    let role: Role = input.role.parse()?;
    let user = UserRepo::update_role(&state.pool, id, role)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;
    state
        .tokens
        .delete_all_for_user(user.id, TokenType::Refresh)
        .await?;

    tracing::info!(user_id = %id, role = %role, admin_id = %admin.user_id, "User role changed");
    Ok(Json(UserBody { user: user.into() }))
}

/// DELETE /api/v1/users/{id}
///
/// Admin only. Revokes the user's sessions and removes the profile image.
pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<MessageResponse>> {
    let user = find_user(&state, id).await?;

    state
        .tokens
        .delete_all_for_user(user.id, TokenType::Refresh)
        .await?;
    if !UserRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound { entity: "User", id }));
    }
    if let Some(key) = &user.profile_image {
        discard_profile_image(&state, key).await;
    }

    tracing::info!(user_id = %id, admin_id = %admin.user_id, "User deleted");
    Ok(Json(MessageResponse::new("User deleted")))
}

/// PUT /api/v1/users/{id}/profile-image
///
/// The account owner or an admin. Multipart `file`; replaces any previous image.
pub async fn upload_profile_image(
    caller: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    multipart: Multipart,
) -> AppResult<Json<UserBody>> {
    ensure_self_or_admin(&caller, id)?;
    let existing = find_user(&state, id).await?;

    let mut form = MultipartForm::read(multipart).await?;
    let key = store_profile_image(&state, form.require_file("file")?).await?;

    let user = match UserRepo::update_profile_image(&state.pool, id, Some(&key)).await? {
        Some(user) => user,
        None => {
            discard_profile_image(&state, &key).await;
            return Err(AppError::Core(CoreError::NotFound { entity: "User", id }));
        }
    };
    if let Some(old) = &existing.profile_image {
        discard_profile_image(&state, old).await;
    }

    Ok(Json(UserBody { user: user.into() }))
}

/// GET /api/v1/users/{id}/profile-image
///
/// A presigned download URL for the user's profile image.
pub async fn profile_image_url(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<UrlBody>> {
    let user = find_user(&state, id).await?;
    let key = user.profile_image.ok_or(AppError::Core(CoreError::NotFound {
        entity: "ProfileImage",
        id,
    }))?;

    let url = state.storage.presigned_url(&key).await?;
    Ok(Json(UrlBody { url }))
}

/// POST /api/v1/users/forgot-password
///
/// Mails a reset link to a known address. Responds the same way for unknown
/// addresses.
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(input): Json<ForgotPasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    let response = MessageResponse::new("If the account exists, a reset email has been sent");

    let email = normalize_email(&input.email);
    let Some(user) = UserRepo::find_by_email(&state.pool, &email).await? else {
        tracing::debug!("Password reset requested for unknown email");
        return Ok(Json(response));
    };

    let (token, token_hash) = generate_reset_token();
    UserRepo::set_reset_token(&state.pool, user.id, &token_hash, Utc::now()).await?;

    let reset = &state.config.password_reset;
    let template = EmailTemplate::ResetPassword {
        first_name: user.first_name.clone(),
        reset_url: reset.link(&token),
        expires_in_mins: reset.expires_in_mins,
    };
    // Answer the same way on delivery failure so the response never tells
    // whether the address is registered.
    match state
        .mailer
        .send(&user.email, RESET_PASSWORD_SUBJECT, &template)
        .await
    {
        Ok(()) => tracing::info!(user_id = %user.id, "Password reset email sent"),
        Err(e) => tracing::error!(user_id = %user.id, error = %e, "Password reset email failed"),
    }
    Ok(Json(response))
}

/// POST /api/v1/users/reset-password
///
/// Set a new password with a mailed reset token. Also revokes every session.
pub async fn reset_password(
    State(state): State<AppState>,
    Json(input): Json<ResetPasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    validate(&input)?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    let issued_after =
        Utc::now() - Duration::minutes(state.config.password_reset.expires_in_mins);
    let user = UserRepo::redeem_reset_token(
        &state.pool,
        &hash_reset_token(input.token.trim()),
        issued_after,
        &password_hash,
    )
    .await?
    .ok_or(AppError::Core(CoreError::InvalidToken))?;
    state
        .tokens
        .delete_all_for_user(user.id, TokenType::Refresh)
        .await?;

    tracing::info!(user_id = %user.id, "Password reset");
    Ok(Json(MessageResponse::new("Password has been reset")))
}
