//! HTTP-level tests for `/api/v1/books`.

mod common;

use axum::http::{Method, StatusCode};
use bookshelf_core::roles::Role;
use bookshelf_storage::Visibility;
use common::{body_json, MultipartBody, TestApp};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn moderator_creates_and_public_reads(pool: PgPool) {
    let app = TestApp::new(pool);
    let (_mod, token) = app
        .user_with_token("mod@example.com", Role::Moderator)
        .await;

    let created = app
        .post_json(
            "/api/v1/books",
            Some(&token),
            json!({ "title": "Dune", "author": "Frank Herbert" }),
        )
        .await;
    assert_eq!(created.status(), StatusCode::CREATED);
    let book = body_json(created).await["book"].clone();
    assert_eq!(book["title"], "Dune");

    let list = body_json(app.get("/api/v1/books", None).await).await;
    assert_eq!(list["books"].as_array().unwrap().len(), 1);

    let one = app
        .get(&format!("/api/v1/books/{}", book["id"].as_str().unwrap()), None)
        .await;
    assert_eq!(one.status(), StatusCode::OK);
    assert_eq!(body_json(one).await["book"]["author"], "Frank Herbert");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn plain_users_cannot_write(pool: PgPool) {
    let app = TestApp::new(pool);
    let (_user, token) = app.user_with_token("user@example.com", Role::User).await;

    let response = app
        .post_json(
            "/api/v1/books",
            Some(&token),
            json!({ "title": "Dune", "author": "Frank Herbert" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let anonymous = app
        .post_json(
            "/api/v1/books",
            None,
            json!({ "title": "Dune", "author": "Frank Herbert" }),
        )
        .await;
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn blank_fields_are_rejected(pool: PgPool) {
    let app = TestApp::new(pool);
    let (_mod, token) = app
        .user_with_token("mod@example.com", Role::Moderator)
        .await;

    let response = app
        .post_json(
            "/api/v1/books",
            Some(&token),
            json!({ "title": "", "author": "Nobody" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "title: length");

    let whitespace = app
        .post_json(
            "/api/v1/books",
            Some(&token),
            json!({ "title": "Dune", "author": "   " }),
        )
        .await;
    assert_eq!(whitespace.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(whitespace).await["error"], "author: length");

    let created = body_json(
        app.post_json(
            "/api/v1/books",
            Some(&token),
            json!({ "title": "  Dune ", "author": "Frank Herbert" }),
        )
        .await,
    )
    .await;
    assert_eq!(created["book"]["title"], "Dune");

    let uri = format!("/api/v1/books/{}", created["book"]["id"].as_str().unwrap());
    let blank_update = app
        .json(Method::PATCH, &uri, Some(&token), json!({ "title": " " }))
        .await;
    assert_eq!(blank_update.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn partial_update_and_admin_delete(pool: PgPool) {
    let app = TestApp::new(pool);
    let (_mod, mod_token) = app
        .user_with_token("mod@example.com", Role::Moderator)
        .await;
    let (_admin, admin_token) = app.user_with_token("admin@example.com", Role::Admin).await;

    let book = body_json(
        app.post_json(
            "/api/v1/books",
            Some(&mod_token),
            json!({ "title": "1984", "author": "Orwell" }),
        )
        .await,
    )
    .await["book"]
        .clone();
    let uri = format!("/api/v1/books/{}", book["id"].as_str().unwrap());

    let updated = app
        .json(
            Method::PATCH,
            &uri,
            Some(&mod_token),
            json!({ "author": "George Orwell" }),
        )
        .await;
    assert_eq!(updated.status(), StatusCode::OK);
    let updated = body_json(updated).await;
    assert_eq!(updated["book"]["title"], "1984");
    assert_eq!(updated["book"]["author"], "George Orwell");

    let by_mod = app.delete(&uri, Some(&mod_token)).await;
    assert_eq!(by_mod.status(), StatusCode::FORBIDDEN);

    let by_admin = app.delete(&uri, Some(&admin_token)).await;
    assert_eq!(by_admin.status(), StatusCode::OK);

    let gone = app.get(&uri, None).await;
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
    let body = body_json(gone).await;
    assert_eq!(body["code"], "NOT_FOUND");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn upload_goes_to_the_public_bucket(pool: PgPool) {
    let app = TestApp::new(pool);
    let (_user, token) = app.user_with_token("user@example.com", Role::User).await;

    let unauthenticated = app
        .multipart(
            Method::POST,
            "/api/v1/books/upload-file",
            None,
            MultipartBody::new().file("file", "book.pdf", b"%PDF-1.7"),
        )
        .await;
    assert_eq!(unauthenticated.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .multipart(
            Method::POST,
            "/api/v1/books/upload-file",
            Some(&token),
            MultipartBody::new().file("file", "Book.PDF", b"%PDF-1.7"),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    let key = body["filename"].as_str().unwrap();
    assert!(key.starts_with("books/") && key.ends_with(".pdf"));

    let stored = app.storage.get(Visibility::Public, key).await.unwrap();
    assert_eq!(stored.content_type, "application/pdf");
    assert_eq!(stored.body, b"%PDF-1.7");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn upload_without_file_is_400(pool: PgPool) {
    let app = TestApp::new(pool);
    let (_user, token) = app.user_with_token("user@example.com", Role::User).await;

    let response = app
        .multipart(
            Method::POST,
            "/api/v1/books/upload-file",
            Some(&token),
            MultipartBody::new().text("note", "no file here"),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
