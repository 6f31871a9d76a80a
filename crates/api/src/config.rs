use bookshelf_cache::RedisConfig;
use bookshelf_mail::EmailConfig;
use bookshelf_storage::S3Config;

use crate::auth::jwt::JwtConfig;
use crate::middleware::rate_limit::RateLimitConfig;

/// Server configuration loaded from environment variables.
///
/// Built once at startup and shared read-only through `AppState`. Defaults
/// suit local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Token signing key and lifetimes.
    pub jwt: JwtConfig,
    pub redis: RedisConfig,
    pub s3: S3Config,
    /// `None` when SMTP is not configured; mail is then only logged.
    pub email: Option<EmailConfig>,
    pub password_reset: PasswordResetConfig,
    pub rate_limit: RateLimitConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    ///
    /// Sub-configurations read their own variables; see [`JwtConfig::from_env`],
    /// [`RedisConfig::from_env`], [`S3Config::from_env`],
    /// [`EmailConfig::from_env`], [`PasswordResetConfig::from_env`] and
    /// [`RateLimitConfig::from_env`].
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt: JwtConfig::from_env(),
            redis: RedisConfig::from_env(),
            s3: S3Config::from_env(),
            email: EmailConfig::from_env(),
            password_reset: PasswordResetConfig::from_env(),
            rate_limit: RateLimitConfig::from_env(),
        }
    }
}

/// Where reset links point and how long they stay valid.
#[derive(Debug, Clone)]
pub struct PasswordResetConfig {
    /// Front-end page that receives `?token=...`.
    pub url: String,
    pub expires_in_mins: i64,
}

impl PasswordResetConfig {
    /// | Env Var                          | Default                                 |
    /// |----------------------------------|-----------------------------------------|
    /// | `RESET_PASSWORD_URL`             | `http://localhost:5173/reset-password`  |
    /// | `RESET_PASSWORD_EXPIRES_IN_MINS` | `60`                                    |
    pub fn from_env() -> Self {
        let url = std::env::var("RESET_PASSWORD_URL")
            .unwrap_or_else(|_| "http://localhost:5173/reset-password".into());

        let expires_in_mins: i64 = std::env::var("RESET_PASSWORD_EXPIRES_IN_MINS")
            .unwrap_or_else(|_| "60".into())
            .parse()
            .expect("RESET_PASSWORD_EXPIRES_IN_MINS must be a valid i64");

        Self {
            url,
            expires_in_mins,
        }
    }

    /// The link mailed to the user for `token`.
    pub fn link(&self, token: &str) -> String {
        let separator = if self.url.contains('?') { '&' } else { '?' };
        format!("{}{separator}token={token}", self.url)
    }
}
