//! Integration tests for the auth endpoint set, authorization gate, and
//! joke/user routes, driven through the real API router.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::Duration;
use jokebox::auth::jwt::{TokenKeys, TokenKind, TokenSigner};
use jokebox::auth::{RevocationStore, UserStore};
use jokebox::jokes::JokeStore;
use jokebox::routes::api_router;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

const ACCESS_SECRET: &str = "test-access-secret-12345";
const REFRESH_SECRET: &str = "test-refresh-secret-67890";

struct TestApp {
    router: Router,
    signer: Arc<TokenSigner>,
    _tmp: TempDir,
}

fn test_app() -> TestApp {
    let tmp = TempDir::new().unwrap();
    let user_store =
        Arc::new(UserStore::new(tmp.path().join("auth.db").to_str().unwrap()).unwrap());
    let joke_store =
        Arc::new(JokeStore::new(tmp.path().join("jokes.db").to_str().unwrap()).unwrap());
    let signer = Arc::new(TokenSigner::new(ACCESS_SECRET, REFRESH_SECRET));

    let router = api_router(
        user_store,
        joke_store,
        signer.clone(),
        RevocationStore::new_memory(),
    );

    TestApp {
        router,
        signer,
        _tmp: tmp,
    }
}

async fn send(
    app: &TestApp,
    method: &str,
    uri: &str,
    bearer: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn register(app: &TestApp, username: &str, password: &str) -> (String, String) {
    let (status, body) = send(
        app,
        "POST",
        "/auth/register",
        None,
        Some(json!({ "username": username, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    (
        body["accessToken"].as_str().unwrap().to_string(),
        body["refreshToken"].as_str().unwrap().to_string(),
    )
}

#[tokio::test]
async fn register_returns_verifiable_token_pair() {
    let app = test_app();
    let (access, refresh) = register(&app, "alice", "secret123").await;

    let access_claims = app.signer.verify(TokenKind::Access, &access).unwrap();
    let refresh_claims = app.signer.verify(TokenKind::Refresh, &refresh).unwrap();

    assert_eq!(access_claims.user_id, refresh_claims.user_id);
    assert_eq!(access_claims.aud, access_claims.user_id);
}

#[tokio::test]
async fn register_duplicate_username_rejected() {
    let app = test_app();
    register(&app, "alice", "secret123").await;

    let (status, body) = send(
        &app,
        "POST",
        "/auth/register",
        None,
        Some(json!({ "username": "alice", "password": "other" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["message"], "User already exists");
}

#[tokio::test]
async fn login_missing_fields_is_validation_failure() {
    let app = test_app();

    let (status, body) = send(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "username": "alice" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["message"], "Username and password must be provided");
}

#[tokio::test]
async fn login_distinguishes_unknown_user_from_bad_password() {
    let app = test_app();
    register(&app, "alice", "secret123").await;

    let (status, body) = send(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "username": "nobody", "password": "secret123" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Error: user doesn't exist");

    let (status, body) = send(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "username": "alice", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Error: incorrect password");
}

#[tokio::test]
async fn login_then_refresh_keeps_the_subject() {
    let app = test_app();
    register(&app, "alice", "secret123").await;

    let (status, body) = send(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "username": "alice", "password": "secret123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let refresh = body["refreshToken"].as_str().unwrap().to_string();
    let login_subject = app
        .signer
        .verify(TokenKind::Access, body["accessToken"].as_str().unwrap())
        .unwrap()
        .user_id;

    let (status, body) = send(
        &app,
        "POST",
        "/auth/token",
        None,
        Some(json!({ "refreshToken": refresh })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Fresh access token, same subject, same (unrotated) refresh token
    let refreshed_subject = app
        .signer
        .verify(TokenKind::Access, body["accessToken"].as_str().unwrap())
        .unwrap()
        .user_id;
    assert_eq!(refreshed_subject, login_subject);
    assert_eq!(body["refreshToken"], refresh);
}

#[tokio::test]
async fn refresh_without_token_is_401() {
    let app = test_app();

    let (status, _) = send(&app, "POST", "/auth/token", None, Some(json!({}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        "POST",
        "/auth/token",
        None,
        Some(json!({ "refreshToken": null })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn refresh_with_invalid_token_is_403() {
    let app = test_app();

    let (status, _) = send(
        &app,
        "POST",
        "/auth/token",
        None,
        Some(json!({ "refreshToken": "not.a.token" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn logout_blacklists_until_next_login() {
    let app = test_app();
    let (_, refresh) = register(&app, "alice", "secret123").await;

    let (status, body) = send(
        &app,
        "DELETE",
        "/auth/logout",
        None,
        Some(json!({ "refreshToken": refresh })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Successfully logged out manually");

    // The same refresh token is now refused
    let (status, body) = send(
        &app,
        "POST",
        "/auth/token",
        None,
        Some(json!({ "refreshToken": refresh })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Error: please log in again");

    // A fresh login clears the blacklist entry for the subject
    let (status, body) = send(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "username": "alice", "password": "secret123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let new_refresh = body["refreshToken"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        "POST",
        "/auth/token",
        None,
        Some(json!({ "refreshToken": new_refresh })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Revocation is keyed by subject, so the pre-logout token revives too
    let (status, _) = send(
        &app,
        "POST",
        "/auth/token",
        None,
        Some(json!({ "refreshToken": refresh })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn gate_accepts_only_live_access_tokens() {
    let app = test_app();
    let (access, refresh) = register(&app, "alice", "secret123").await;

    // No header
    let (status, _) = send(&app, "GET", "/auth/test", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Valid access token
    let (status, body) = send(&app, "GET", "/auth/test", Some(&access), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Authorized");

    // Expired access token (signed with the right secret)
    let subject = app.signer.verify(TokenKind::Access, &access).unwrap().user_id;
    let expired = TokenKeys::new(ACCESS_SECRET)
        .issue_with_lifetime(&subject, Duration::seconds(-10))
        .unwrap();
    let (status, _) = send(&app, "GET", "/auth/test", Some(&expired), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Token signed with the wrong secret
    let forged = TokenKeys::new("some-other-secret")
        .issue_with_lifetime(&subject, Duration::minutes(90))
        .unwrap();
    let (status, _) = send(&app, "GET", "/auth/test", Some(&forged), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // A refresh token is not an access token
    let (status, _) = send(&app, "GET", "/auth/test", Some(&refresh), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn joke_crud_with_ownership() {
    let app = test_app();
    let (alice, _) = register(&app, "alice", "secret123").await;
    let (bob, _) = register(&app, "bob", "hunter22").await;

    // Create requires the gate
    let (status, _) = send(
        &app,
        "POST",
        "/jokes/new",
        None,
        Some(json!({ "name": "Road worker", "content": "I used to work on roads." })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app,
        "POST",
        "/jokes/new",
        Some(&alice),
        Some(json!({ "name": "Road worker", "content": "I used to work on roads." })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let joke_id = body["joke"]["id"].as_str().unwrap().to_string();

    // Public reads
    let (status, body) = send(&app, "GET", "/jokes", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["jokeListItems"].as_array().unwrap().len(), 1);

    let (status, body) = send(&app, "GET", &format!("/jokes/{}", joke_id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["joke"]["name"], "Road worker");

    let (status, body) = send(&app, "GET", "/jokes/random", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["randomJoke"]["name"], "Road worker");

    // Only the owner may delete
    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/jokes/{}/", joke_id),
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Pssh, nice try. That's not your joke");

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/jokes/{}/", joke_id),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/jokes/{}/", joke_id),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Can't delete what does not exist");
}

#[tokio::test]
async fn user_routes_behind_the_gate() {
    let app = test_app();
    let (alice, _) = register(&app, "alice", "secret123").await;

    let (status, _) = send(&app, "GET", "/user", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, "GET", "/user", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["username"], "alice");
    assert!(body["user"].get("password_hash").is_none());

    let (status, body) = send(
        &app,
        "GET",
        "/user/by-username/alice",
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["username"], "alice");

    let (status, _) = send(
        &app,
        "GET",
        "/user/by-username/nobody",
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn greeting_and_liveness_routes() {
    let app = test_app();

    let (status, body) = send(&app, "GET", "/message/World", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Hi World");

    let (status, _) = send(&app, "GET", "/", None, None).await;
    assert_eq!(status, StatusCode::OK);
}
