mod support;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::json;

use support::spawn_app;

#[tokio::test]
async fn health_is_public() {
    let app = spawn_app().await.unwrap();
    let res = app.get("/health", None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["status"], "ok");
}

#[tokio::test]
async fn sign_up_then_me_returns_admin() {
    let app = spawn_app().await.unwrap();

    let res = app
        .call(Method::POST, "/api/auth/sign-up", None, Some(json!({ "email": "boss@example.com", "password": "password1" })))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    let cookie = res.headers.get(header::SET_COOKIE).unwrap().to_str().unwrap().to_string();
    assert!(cookie.starts_with("auth_token="));
    let token = res.json().as_str().unwrap().to_string();

    let me = app.get("/api/auth/me", Some(&token)).await;
    assert_eq!(me.status, StatusCode::OK);
    let body = me.json();
    assert_eq!(body["email"], "boss@example.com");
    assert_eq!(body["firstName"], "boss");
    assert_eq!(body["roles"], json!(["admin"]));
    assert!(body.get("passwordHash").is_none());

    // the session cookie alone authenticates too
    let pair = cookie.split(';').next().unwrap().to_string();
    let req = Request::builder().uri("/api/auth/me").header(header::COOKIE, pair).body(Body::empty()).unwrap();
    assert_eq!(app.send(req).await.status, StatusCode::OK);
}

#[tokio::test]
async fn second_account_has_no_roles() {
    let app = spawn_app().await.unwrap();
    app.sign_up("boss@example.com", "password1").await;
    let token = app.sign_up("worker@example.com", "password1").await;

    let me = app.get("/api/auth/me", Some(&token)).await;
    assert_eq!(me.json()["roles"], json!([]));
}

#[tokio::test]
async fn sign_in_checks_password_and_translates_errors() {
    let app = spawn_app().await.unwrap();
    app.sign_up("boss@example.com", "password1").await;

    let ok = app
        .call(Method::POST, "/api/auth/sign-in", None, Some(json!({ "email": " boss@example.com ", "password": "password1" })))
        .await;
    assert_eq!(ok.status, StatusCode::OK);

    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/sign-in")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::ACCEPT_LANGUAGE, "pt-BR,pt;q=0.9")
        .body(Body::from(json!({ "email": "boss@example.com", "password": "wrong-pass" }).to_string()))
        .unwrap();
    let res = app.send(req).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json()["error"], "Bad Request");
    assert_eq!(res.json()["message"], "Desculpe, não reconhecemos suas credenciais");
}

#[tokio::test]
async fn duplicate_and_weak_sign_ups_are_rejected() {
    let app = spawn_app().await.unwrap();
    app.sign_up("boss@example.com", "password1").await;

    let dup = app
        .call(Method::POST, "/api/auth/sign-up", None, Some(json!({ "email": "boss@example.com", "password": "password1" })))
        .await;
    assert_eq!(dup.status, StatusCode::BAD_REQUEST);
    assert_eq!(dup.json()["message"], "Email is already in use");

    let weak = app
        .call(Method::POST, "/api/auth/sign-up", None, Some(json!({ "email": "new@example.com", "password": "short" })))
        .await;
    assert_eq!(weak.status, StatusCode::BAD_REQUEST);
    assert_eq!(weak.json()["message"], "This password is too weak");
}

#[tokio::test]
async fn anonymous_and_bad_tokens_are_unauthorized() {
    let app = spawn_app().await.unwrap();

    let res = app.get("/api/auth/me", None).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.json()["error"], "Unauthorized");

    let res = app.get("/api/auth/me", Some("not-a-jwt")).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    // stale tokens never block signing in again
    let res = app
        .call(Method::POST, "/api/auth/sign-in", Some("not-a-jwt"), Some(json!({ "email": "x@example.com", "password": "password1" })))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn change_password_issues_working_token() {
    let app = spawn_app().await.unwrap();
    let token = app.sign_up("boss@example.com", "password1").await;

    let wrong = app
        .call(Method::PUT, "/api/auth/change-password", Some(&token), Some(json!({ "oldPassword": "nope-nope", "newPassword": "password2" })))
        .await;
    assert_eq!(wrong.status, StatusCode::BAD_REQUEST);

    let res = app
        .call(Method::PUT, "/api/auth/change-password", Some(&token), Some(json!({ "oldPassword": "password1", "newPassword": "password2" })))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    let fresh = res.json().as_str().unwrap().to_string();
    assert_eq!(app.get("/api/auth/me", Some(&fresh)).await.status, StatusCode::OK);

    let again = app
        .call(Method::POST, "/api/auth/sign-in", None, Some(json!({ "email": "boss@example.com", "password": "password2" })))
        .await;
    assert_eq!(again.status, StatusCode::OK);
}

#[tokio::test]
async fn profile_update_round_trips() {
    let app = spawn_app().await.unwrap();
    let token = app.sign_up("boss@example.com", "password1").await;

    let res = app
        .call(
            Method::PUT,
            "/api/auth/profile",
            Some(&token),
            Some(json!({ "data": { "firstName": "Ada", "lastName": "Lovelace", "phoneNumber": "555", "avatars": [] } })),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK, "{:?}", res.json());
    assert_eq!(res.json()["fullName"], "Ada Lovelace");

    let me = app.get("/api/auth/me", Some(&token)).await;
    assert_eq!(me.json()["phoneNumber"], "555");
}

#[tokio::test]
async fn password_reset_is_refused_without_email() {
    let app = spawn_app().await.unwrap();
    app.sign_up("boss@example.com", "password1").await;

    let configured = app.get("/api/auth/email-configured", None).await;
    assert_eq!(configured.json(), json!(false));

    let res = app
        .call(Method::POST, "/api/auth/send-password-reset-email", None, Some(json!({ "email": "boss@example.com" })))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn sign_out_clears_cookie() {
    let app = spawn_app().await.unwrap();
    let res = app.call(Method::POST, "/api/auth/sign-out", None, None).await;
    assert_eq!(res.status, StatusCode::NO_CONTENT);
    let cookie = res.headers.get(header::SET_COOKIE).unwrap().to_str().unwrap();
    assert!(cookie.starts_with("auth_token=;"), "{cookie}");
    assert!(cookie.contains("Max-Age=0"), "{cookie}");
    assert!(cookie.contains("Path=/"), "{cookie}");
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = spawn_app().await.unwrap();
    let res = app.get("/api-docs/openapi.json", None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.json()["paths"]["/api/customer"].is_object());
}
