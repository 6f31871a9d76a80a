//! Session lifecycle: login, refresh, logout and registration.
//!
//! Access tokens are never stored. Refresh tokens are persisted in the
//! [`TokenStore`] before they are handed out, and refreshing reissues only
//! the access token; the refresh token stays valid until it expires or is
//! revoked.

use std::sync::Arc;

use async_trait::async_trait;
use bookshelf_cache::{TokenRecord, TokenStore, TokenStoreError};
use bookshelf_core::error::CoreError;
use bookshelf_core::roles::Role;
use bookshelf_core::tokens::{TokenType, BEARER};
use bookshelf_core::types::{DbId, Timestamp};
use bookshelf_core::validation::{normalize_email, trimmed, trimmed_opt, validate};
use bookshelf_db::models::user::{CreateUser, User};
use bookshelf_db::repositories::UserRepo;
use bookshelf_db::DbPool;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::jwt::{IssuedToken, TokenCodec};
use crate::auth::password::{hash_password, verify_password};
use crate::error::{AppError, AppResult};

// ---------------------------------------------------------------------------
// Credential store
// ---------------------------------------------------------------------------

/// The slice of user persistence the auth flows need.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Look up a user by normalized email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error>;

    async fn create(&self, input: &CreateUser) -> Result<User, sqlx::Error>;
}

#[async_trait]
impl CredentialStore for DbPool {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        UserRepo::find_by_email(self, email).await
    }

    async fn create(&self, input: &CreateUser) -> Result<User, sqlx::Error> {
        UserRepo::create(self, input).await
    }
}

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

/// Tokens returned by login and refresh.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Expiry of the access token.
    pub expires_at: Timestamp,
    pub token_type: &'static str,
}

/// Fields accepted when registering an account.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Registration {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
    #[validate(length(min = 1))]
    pub first_name: String,
    pub last_name: Option<String>,
    /// Parsed into a [`Role`]; defaults to `user`.
    pub role: Option<String>,
}

impl Registration {
    fn trimmed(self) -> Self {
        Self {
            first_name: trimmed(self.first_name),
            last_name: trimmed_opt(self.last_name),
            ..self
        }
    }
}

// ---------------------------------------------------------------------------
// AuthService
// ---------------------------------------------------------------------------

/// Auth flows over a credential store, the token store and the token codec.
#[derive(Clone)]
pub struct AuthService {
    credentials: Arc<dyn CredentialStore>,
    tokens: TokenStore,
    codec: TokenCodec,
}

impl AuthService {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        tokens: TokenStore,
        codec: TokenCodec,
    ) -> Self {
        Self {
            credentials,
            tokens,
            codec,
        }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Exchange email and password for a token pair.
    ///
    /// An unknown email and a wrong password fail with the same
    /// [`CoreError::InvalidCredentials`].
    pub async fn login(&self, email: &str, password: &str) -> AppResult<TokenPair> {
        let email = normalize_email(email);
        let user = self
            .credentials
            .find_by_email(&email)
            .await?
            .ok_or(CoreError::InvalidCredentials)?;

        let valid = verify_password(password, &user.password_hash)
            .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
        if !valid {
            tracing::info!(user_id = %user.id, "Login rejected");
            return Err(CoreError::InvalidCredentials.into());
        }

        let access = self.issue(user.id, &user.email, user.role, TokenType::Access)?;
        let refresh = self.issue(user.id, &user.email, user.role, TokenType::Refresh)?;

        // Nothing is returned unless the refresh token is on record.
        let record = self
            .tokens
            .create(TokenRecord::new(
                user.id,
                TokenType::Refresh,
                refresh.token.clone(),
                refresh.expires_at,
            ))
            .await?;

        tracing::info!(user_id = %user.id, token_id = %record.id, "User logged in");
        Ok(TokenPair {
            access_token: access.token,
            refresh_token: refresh.token,
            expires_at: access.expires_at,
            token_type: BEARER,
        })
    }

    /// Mint a new access token for a live refresh token.
    ///
    /// The refresh token is echoed back unchanged.
    pub async fn refresh_token(&self, refresh_token: &str) -> AppResult<TokenPair> {
        let claims = self.codec.verify(refresh_token, TokenType::Refresh)?;
        let record = self.find_live(refresh_token).await?;
        if record.user_id != claims.sub {
            return Err(CoreError::InvalidToken.into());
        }

        let access = self.issue(claims.sub, &claims.email, claims.role, TokenType::Access)?;
        tracing::debug!(user_id = %claims.sub, token_id = %record.id, "Access token refreshed");

        Ok(TokenPair {
            access_token: access.token,
            refresh_token: refresh_token.to_string(),
            expires_at: access.expires_at,
            token_type: BEARER,
        })
    }

    /// Revoke every refresh token of `user_id` ("log out everywhere").
    pub async fn logout(&self, user_id: DbId) -> AppResult<()> {
        self.tokens
            .delete_all_for_user(user_id, TokenType::Refresh)
            .await?;
        tracing::info!(user_id = %user_id, "User logged out of all sessions");
        Ok(())
    }

    /// Revoke the single session identified by `refresh_token` ("log out this device").
    pub async fn logout_with_token(&self, refresh_token: &str) -> AppResult<()> {
        self.codec.verify(refresh_token, TokenType::Refresh)?;
        let record = self.find_live(refresh_token).await?;
        self.tokens.delete_by_id(record.id).await?;
        tracing::info!(user_id = %record.user_id, token_id = %record.id, "Session logged out");
        Ok(())
    }

    /// Self-service signup. Does not log the user in.
    ///
    /// Only the `user` role may be requested; any other role is
    /// [`CoreError::Forbidden`].
    pub async fn register(&self, input: Registration) -> AppResult<User> {
        let input = input.trimmed();
        validate(&input)?;
        let role = requested_role(&input)?;
        if role != Role::User {
            return Err(CoreError::Forbidden(format!(
                "role {role} can only be assigned by an admin"
            ))
            .into());
        }
        self.create_account(input, role).await
    }

    /// Create an account on behalf of an admin, honouring the requested role.
    pub async fn register_as_admin(&self, input: Registration) -> AppResult<User> {
        let input = input.trimmed();
        validate(&input)?;
        let role = requested_role(&input)?;
        self.create_account(input, role).await
    }

    async fn create_account(&self, input: Registration, role: Role) -> AppResult<User> {
        let email = normalize_email(&input.email);
        if self.credentials.find_by_email(&email).await?.is_some() {
            return Err(CoreError::Conflict(format!("email {email} is already registered")).into());
        }

        let password_hash = hash_password(&input.password)
            .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

        let user = self
            .credentials
            .create(&CreateUser {
                email,
                password_hash,
                first_name: input.first_name,
                last_name: input.last_name,
                role,
                profile_image: None,
            })
            .await?;

        tracing::info!(user_id = %user.id, role = %user.role, "User registered");
        Ok(user)
    }

    fn issue(
        &self,
        user_id: DbId,
        email: &str,
        role: Role,
        token_type: TokenType,
    ) -> AppResult<IssuedToken> {
        self.codec
            .issue(user_id, email, role, token_type, self.codec.ttl(token_type))
            .map_err(|e| AppError::InternalError(format!("Token signing error: {e}")))
    }

    /// A structurally valid token that is no longer on record is invalid.
    async fn find_live(&self, token: &str) -> AppResult<TokenRecord> {
        match self.tokens.find_by_value(token).await {
            Ok(record) => Ok(record),
            Err(TokenStoreError::NotFound) => Err(CoreError::InvalidToken.into()),
            Err(e) => Err(e.into()),
        }
    }
}

fn requested_role(input: &Registration) -> AppResult<Role> {
    match input.role.as_deref() {
        Some(role) => Ok(role.parse::<Role>()?),
        None => Ok(Role::default()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
