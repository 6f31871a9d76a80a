//! Shared helpers for HTTP integration tests.
//!
//! The app is built with the production router and middleware stack; only
//! the collaborators are swapped for in-memory ones so tests can inspect
//! stored objects and sent mail.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use bookshelf_api::auth::jwt::JwtConfig;
use bookshelf_api::auth::password::hash_password;
use bookshelf_api::config::{PasswordResetConfig, ServerConfig};
use bookshelf_api::middleware::rate_limit::RateLimitConfig;
use bookshelf_api::router::build_app_router;
use bookshelf_api::state::AppState;
use bookshelf_cache::{MemoryCache, RedisConfig};
use bookshelf_core::roles::Role;
use bookshelf_db::models::user::{CreateUser, User};
use bookshelf_db::repositories::UserRepo;
use bookshelf_mail::CapturingMailer;
use bookshelf_storage::{MemoryObjectStore, S3Config};
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

pub const TEST_PASSWORD: &str = "test-password-123";
pub const RESET_URL: &str = "http://localhost:5173/reset-password";

/// Build a `ServerConfig` with safe test defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "integration-test-secret".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        },
        redis: RedisConfig {
            url: "redis://127.0.0.1:6379".to_string(),
        },
        s3: S3Config {
            access_key: "test".to_string(),
            secret_key: "test".to_string(),
            region: "us-east-1".to_string(),
            endpoint: None,
            bucket: "private".to_string(),
            public_bucket: "public".to_string(),
            presign_expiry_secs: 60,
        },
        email: None,
        password_reset: PasswordResetConfig {
            url: RESET_URL.to_string(),
            expires_in_mins: 60,
        },
        // One-shot requests carry no client address to key on.
        rate_limit: RateLimitConfig {
            enabled: false,
            ..RateLimitConfig::default()
        },
    }
}

/// The application plus handles on its in-memory collaborators.
pub struct TestApp {
    pub router: Router,
    pub pool: PgPool,
    pub cache: Arc<MemoryCache>,
    pub storage: Arc<MemoryObjectStore>,
    pub mailer: Arc<CapturingMailer>,
}

impl TestApp {
    pub fn new(pool: PgPool) -> Self {
        Self::with_config(pool, test_config())
    }

    pub fn with_config(pool: PgPool, config: ServerConfig) -> Self {
        let cache = Arc::new(MemoryCache::new());
        let storage = Arc::new(MemoryObjectStore::new());
        let mailer = Arc::new(CapturingMailer::new());

        let state = AppState::new(
            pool.clone(),
            Arc::new(config),
            cache.clone(),
            storage.clone(),
            mailer.clone(),
        );

        Self {
            router: build_app_router(state),
            pool,
            cache,
            storage,
            mailer,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router should not fail")
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Response<Body> {
        self.send(request(Method::GET, uri, token, Body::empty(), None))
            .await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> Response<Body> {
        self.send(request(Method::DELETE, uri, token, Body::empty(), None))
            .await
    }

    pub async fn json(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: serde_json::Value,
    ) -> Response<Body> {
        self.send(request(
            method,
            uri,
            token,
            Body::from(body.to_string()),
            Some("application/json".to_string()),
        ))
        .await
    }

    pub async fn post_json(
        &self,
        uri: &str,
        token: Option<&str>,
        body: serde_json::Value,
    ) -> Response<Body> {
        self.json(Method::POST, uri, token, body).await
    }

    pub async fn multipart(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        form: MultipartBody,
    ) -> Response<Body> {
        let (content_type, body) = form.finish();
        self.send(request(method, uri, token, Body::from(body), Some(content_type)))
            .await
    }

    /// Sign in through the API and return the token pair JSON.
    pub async fn signin(&self, email: &str, password: &str) -> serde_json::Value {
        let response = self
            .post_json(
                "/api/v1/auth/signin",
                None,
                serde_json::json!({ "email": email, "password": password }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK, "signin should succeed");
        body_json(response).await
    }

    /// Create a user with `role` and return it with a fresh access token.
    pub async fn user_with_token(&self, email: &str, role: Role) -> (User, String) {
        let user = create_user(&self.pool, email, role).await;
        let pair = self.signin(email, TEST_PASSWORD).await;
        let token = pair["access_token"]
            .as_str()
            .expect("access_token should be a string")
            .to_string();
        (user, token)
    }
}

fn request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Body,
    content_type: Option<String>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    if let Some(content_type) = content_type {
        builder = builder.header(CONTENT_TYPE, content_type);
    }
    builder.body(body).expect("request should build")
}

/// Insert a user directly, with [`TEST_PASSWORD`].
pub async fn create_user(pool: &PgPool, email: &str, role: Role) -> User {
    let input = CreateUser {
        email: email.to_string(),
        password_hash: hash_password(TEST_PASSWORD).expect("hashing should succeed"),
        first_name: "Test".to_string(),
        last_name: Some("User".to_string()),
        role,
        profile_image: None,
    };
    UserRepo::create(pool, &input)
        .await
        .expect("user creation should succeed")
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

/// Minimal `multipart/form-data` encoder.
#[derive(Default)]
pub struct MultipartBody {
    body: Vec<u8>,
}

const BOUNDARY: &str = "bookshelf-test-boundary";

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    fn finish(mut self) -> (String, Vec<u8>) {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        (
            format!("multipart/form-data; boundary={BOUNDARY}"),
            self.body,
        )
    }
}
