//! HTTP-level tests for `/api/v1/auth`: signup, signin, refresh and both
//! signout variants, plus bearer-token handling on protected routes.

mod common;

use axum::http::StatusCode;
use bookshelf_core::roles::Role;
use common::{body_json, create_user, TestApp, TEST_PASSWORD};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn signup_then_signin(pool: PgPool) {
    let app = TestApp::new(pool);

    let response = app
        .post_json(
            "/api/v1/auth/signup",
            None,
            json!({
                "email": "A@X.com",
                "password": "pw1-long-enough",
                "first_name": "Ada",
                "last_name": "Lovelace"
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["user"]["email"], "a@x.com");
    assert_eq!(body["user"]["role"], "user");
    assert!(body["user"].get("password_hash").is_none());
    // No auto-login.
    assert!(body.get("access_token").is_none());

    let pair = app.signin("a@x.com", "pw1-long-enough").await;
    assert!(pair["access_token"].is_string());
    assert!(pair["refresh_token"].is_string());
    assert!(pair["expires_at"].is_string());
    assert_eq!(pair["token_type"], "Bearer");

    let me = app
        .get("/api/v1/users/me", pair["access_token"].as_str())
        .await;
    assert_eq!(me.status(), StatusCode::OK);
    assert_eq!(body_json(me).await["user"]["email"], "a@x.com");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn signup_rejects_invalid_and_duplicate_input(pool: PgPool) {
    let app = TestApp::new(pool.clone());
    create_user(&pool, "taken@example.com", Role::User).await;

    let short = app
        .post_json(
            "/api/v1/auth/signup",
            None,
            json!({ "email": "b@example.com", "password": "short", "first_name": "B" }),
        )
        .await;
    assert_eq!(short.status(), StatusCode::BAD_REQUEST);
    let body = body_json(short).await;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"], "password: length");

    let bad_role = app
        .post_json(
            "/api/v1/auth/signup",
            None,
            json!({
                "email": "c@example.com",
                "password": "long-enough",
                "first_name": "C",
                "role": "superuser"
            }),
        )
        .await;
    assert_eq!(bad_role.status(), StatusCode::BAD_REQUEST);

    let duplicate = app
        .post_json(
            "/api/v1/auth/signup",
            None,
            json!({ "email": "Taken@Example.com", "password": "long-enough", "first_name": "T" }),
        )
        .await;
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn signup_cannot_grant_admin(pool: PgPool) {
    let app = TestApp::new(pool.clone());

    let response = app
        .post_json(
            "/api/v1/auth/signup",
            None,
            json!({
                "email": "mallory@example.com",
                "password": "long-enough",
                "first_name": "Mallory",
                "role": "admin"
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["code"], "FORBIDDEN");

    let signin = app
        .post_json(
            "/api/v1/auth/signin",
            None,
            json!({ "email": "mallory@example.com", "password": "long-enough" }),
        )
        .await;
    assert_eq!(signin.status(), StatusCode::UNAUTHORIZED);

    let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(users, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn signin_failures_are_indistinguishable(pool: PgPool) {
    let app = TestApp::new(pool.clone());
    create_user(&pool, "reader@example.com", Role::User).await;

    let wrong_password = app
        .post_json(
            "/api/v1/auth/signin",
            None,
            json!({ "email": "reader@example.com", "password": "wrong-password" }),
        )
        .await;
    let unknown_email = app
        .post_json(
            "/api/v1/auth/signin",
            None,
            json!({ "email": "nobody@example.com", "password": TEST_PASSWORD }),
        )
        .await;

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(wrong_password).await, body_json(unknown_email).await);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn refresh_echoes_the_refresh_token(pool: PgPool) {
    let app = TestApp::new(pool.clone());
    create_user(&pool, "reader@example.com", Role::User).await;
    let pair = app.signin("reader@example.com", TEST_PASSWORD).await;

    let response = app
        .post_json(
            "/api/v1/auth/refresh",
            None,
            json!({ "refresh_token": pair["refresh_token"] }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let refreshed = body_json(response).await;
    assert_eq!(refreshed["refresh_token"], pair["refresh_token"]);
    assert!(refreshed["access_token"].is_string());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn refresh_rejects_access_tokens_and_garbage(pool: PgPool) {
    let app = TestApp::new(pool.clone());
    create_user(&pool, "reader@example.com", Role::User).await;
    let pair = app.signin("reader@example.com", TEST_PASSWORD).await;

    for token in [pair["access_token"].clone(), json!("not-a-token")] {
        let response = app
            .post_json("/api/v1/auth/refresh", None, json!({ "refresh_token": token }))
            .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["code"], "INVALID_TOKEN");
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn signout_revokes_only_that_session(pool: PgPool) {
    let app = TestApp::new(pool.clone());
    create_user(&pool, "reader@example.com", Role::User).await;
    let laptop = app.signin("reader@example.com", TEST_PASSWORD).await;
    let phone = app.signin("reader@example.com", TEST_PASSWORD).await;

    let response = app
        .post_json(
            "/api/v1/auth/signout",
            None,
            json!({ "refresh_token": laptop["refresh_token"] }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let revoked = app
        .post_json(
            "/api/v1/auth/refresh",
            None,
            json!({ "refresh_token": laptop["refresh_token"] }),
        )
        .await;
    assert_eq!(revoked.status(), StatusCode::UNAUTHORIZED);

    let still_live = app
        .post_json(
            "/api/v1/auth/refresh",
            None,
            json!({ "refresh_token": phone["refresh_token"] }),
        )
        .await;
    assert_eq!(still_live.status(), StatusCode::OK);

    let again = app
        .post_json(
            "/api/v1/auth/signout",
            None,
            json!({ "refresh_token": laptop["refresh_token"] }),
        )
        .await;
    assert_eq!(again.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn signout_all_revokes_every_session(pool: PgPool) {
    let app = TestApp::new(pool.clone());
    create_user(&pool, "reader@example.com", Role::User).await;
    let laptop = app.signin("reader@example.com", TEST_PASSWORD).await;
    let phone = app.signin("reader@example.com", TEST_PASSWORD).await;

    let unauthenticated = app
        .post_json("/api/v1/auth/signout/all", None, json!({}))
        .await;
    assert_eq!(unauthenticated.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .post_json(
            "/api/v1/auth/signout/all",
            laptop["access_token"].as_str(),
            json!({}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    for pair in [laptop, phone] {
        let response = app
            .post_json(
                "/api/v1/auth/refresh",
                None,
                json!({ "refresh_token": pair["refresh_token"] }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["code"], "INVALID_TOKEN");
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn protected_routes_need_a_bearer_access_token(pool: PgPool) {
    let app = TestApp::new(pool.clone());
    create_user(&pool, "reader@example.com", Role::User).await;
    let pair = app.signin("reader@example.com", TEST_PASSWORD).await;

    let missing = app.get("/api/v1/users/me", None).await;
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(missing).await["code"], "UNAUTHORIZED");

    // A refresh token is not an access token.
    let wrong_type = app
        .get("/api/v1/users/me", pair["refresh_token"].as_str())
        .await;
    assert_eq!(wrong_type.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(wrong_type).await["code"], "INVALID_TOKEN");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn health_reports_dependencies(pool: PgPool) {
    let app = TestApp::new(pool);
    let response = app.get("/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["db_healthy"], true);
    assert_eq!(body["cache_healthy"], true);
}
