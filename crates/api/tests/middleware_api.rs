//! HTTP-level tests for the cross-cutting layers: per-IP rate limits and
//! security response headers.

mod common;

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Method, Request, StatusCode};
use bookshelf_api::middleware::rate_limit::RateLimitConfig;
use bookshelf_api::middleware::security_headers::SECURITY_HEADERS;
use common::{test_config, TestApp};
use serde_json::json;
use sqlx::PgPool;

fn signin_from(ip: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/api/v1/auth/signin")
        .header(CONTENT_TYPE, "application/json")
        .header("x-forwarded-for", ip)
        .body(Body::from(
            json!({ "email": "nobody@example.com", "password": "wrong-password" }).to_string(),
        ))
        .unwrap()
}

fn limited_app(pool: PgPool, per_minute: u32, auth_per_minute: u32) -> TestApp {
    let mut config = test_config();
    config.rate_limit = RateLimitConfig {
        enabled: true,
        per_minute,
        auth_per_minute,
    };
    TestApp::with_config(pool, config)
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn signin_is_throttled_per_client(pool: PgPool) {
    let app = limited_app(pool, 100, 2);

    for _ in 0..2 {
        let response = app.send(signin_from("203.0.113.7")).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
    let throttled = app.send(signin_from("203.0.113.7")).await;
    assert_eq!(throttled.status(), StatusCode::TOO_MANY_REQUESTS);

    // Another client has its own budget.
    let other = app.send(signin_from("198.51.100.1")).await;
    assert_eq!(other.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn api_routes_share_the_general_budget(pool: PgPool) {
    let app = limited_app(pool, 3, 10);
    let list_books = || {
        Request::builder()
            .uri("/api/v1/books")
            .header("x-forwarded-for", "203.0.113.9")
            .body(Body::empty())
            .unwrap()
    };

    for _ in 0..3 {
        assert_eq!(app.send(list_books()).await.status(), StatusCode::OK);
    }
    assert_eq!(
        app.send(list_books()).await.status(),
        StatusCode::TOO_MANY_REQUESTS
    );

    // Health checks are not limited.
    let health = Request::builder()
        .uri("/health")
        .header("x-forwarded-for", "203.0.113.9")
        .body(Body::empty())
        .unwrap();
    assert_eq!(app.send(health).await.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn responses_carry_security_headers(pool: PgPool) {
    let app = TestApp::new(pool);

    for response in [
        app.get("/health", None).await,
        app.get("/api/v1/users/me", None).await,
    ] {
        for (name, value) in SECURITY_HEADERS {
            assert_eq!(
                response.headers().get(name).and_then(|v| v.to_str().ok()),
                Some(value),
                "{name} on {}",
                response.status()
            );
        }
    }
}
