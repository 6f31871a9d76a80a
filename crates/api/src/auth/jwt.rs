//! Bearer token codec.
//!
//! Access and refresh tokens are both HS256-signed JWTs carrying a [`Claims`]
//! payload; the `typ` claim says which kind a token is. Verification checks
//! the signature, then the type, then expiry, so a token of the wrong kind is
//! always [`CoreError::InvalidToken`] and only a well-formed token of the
//! right kind can come back as [`CoreError::TokenExpired`].

use bookshelf_core::error::CoreError;
use bookshelf_core::roles::Role;
use bookshelf_core::tokens::TokenType;
use bookshelf_core::types::{DbId, Timestamp};
use chrono::{Duration, SubsecRound, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims embedded in every token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject -- the user's id.
    pub sub: DbId,
    pub email: String,
    pub role: Role,
    /// Token kind tag.
    pub typ: TokenType,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Unique token identifier. Keeps two tokens minted in the same second distinct.
    pub jti: String,
}

/// Configuration for token signing and lifetimes.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret used to sign and verify tokens.
    pub secret: String,
    /// Access token lifetime in minutes (default: 15).
    pub access_token_expiry_mins: i64,
    /// Refresh token lifetime in days (default: 7).
    pub refresh_token_expiry_days: i64,
}

/// Default access token expiry in minutes.
const DEFAULT_ACCESS_EXPIRY_MINS: i64 = 15;
/// Default refresh token expiry in days.
const DEFAULT_REFRESH_EXPIRY_DAYS: i64 = 7;

impl JwtConfig {
    /// Load JWT configuration from environment variables.
    ///
    /// | Env Var                    | Required | Default |
    /// |----------------------------|----------|---------|
    /// | `JWT_SECRET`               | **yes**  | --      |
    /// | `JWT_ACCESS_EXPIRY_MINS`   | no       | `15`    |
    /// | `JWT_REFRESH_EXPIRY_DAYS`  | no       | `7`     |
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is not set or is empty, or if an expiry is not
    /// a positive integer.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        let access_token_expiry_mins: i64 = std::env::var("JWT_ACCESS_EXPIRY_MINS")
            .unwrap_or_else(|_| DEFAULT_ACCESS_EXPIRY_MINS.to_string())
            .parse()
            .expect("JWT_ACCESS_EXPIRY_MINS must be a valid i64");

        let refresh_token_expiry_days: i64 = std::env::var("JWT_REFRESH_EXPIRY_DAYS")
            .unwrap_or_else(|_| DEFAULT_REFRESH_EXPIRY_DAYS.to_string())
            .parse()
            .expect("JWT_REFRESH_EXPIRY_DAYS must be a valid i64");

        assert!(
            access_token_expiry_mins > 0 && refresh_token_expiry_days > 0,
            "token expiries must be positive"
        );

        Self {
            secret,
            access_token_expiry_mins,
            refresh_token_expiry_days,
        }
    }
}

/// A freshly signed token and the instant it stops being valid.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: Timestamp,
}

/// Signs and verifies bearer tokens with a symmetric key. Cheap to clone.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenCodec {
    pub fn new(config: &JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked after the type tag, see `verify`.
        validation.validate_exp = false;
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            access_ttl: Duration::minutes(config.access_token_expiry_mins),
            refresh_ttl: Duration::days(config.refresh_token_expiry_days),
        }
    }

    /// Configured lifetime for tokens of `token_type`.
    pub fn ttl(&self, token_type: TokenType) -> Duration {
        match token_type {
            TokenType::Access => self.access_ttl,
            TokenType::Refresh => self.refresh_ttl,
        }
    }

    /// Sign a token for the given identity, valid for `ttl` from now.
    ///
    /// Times are truncated to whole seconds so `expires_at` is exactly the
    /// embedded `exp`.
    pub fn issue(
        &self,
        user_id: DbId,
        email: &str,
        role: Role,
        token_type: TokenType,
        ttl: Duration,
    ) -> Result<IssuedToken, jsonwebtoken::errors::Error> {
        let now = Utc::now().trunc_subsecs(0);
        let expires_at = now + ttl;

        let claims = Claims {
            sub: user_id,
            email: email.to_string(),
            role,
            typ: token_type,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        Ok(IssuedToken { token, expires_at })
    }

    /// Decode `token` and check it is a live token of kind `expected`.
    pub fn verify(&self, token: &str, expected: TokenType) -> Result<Claims, CoreError> {
        let claims = decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|e| {
                tracing::debug!(error = %e, "Token rejected");
                CoreError::InvalidToken
            })?
            .claims;

        if claims.typ != expected {
            return Err(CoreError::InvalidToken);
        }
        if claims.exp < Utc::now().timestamp() {
            return Err(CoreError::TokenExpired);
        }
        Ok(claims)
    }
}
