//! Requests rejected before any database access: missing or malformed
//! credentials and invalid request bodies.

mod common;

use axum::http::StatusCode;
use chromance_api::auth::jwt::{generate_refresh_token, JwtConfig};
use common::{body_json, get, get_auth, post_json, FakeBackend};

// ---------------------------------------------------------------------------
// Bearer token checks
// ---------------------------------------------------------------------------

#[tokio::test]
async fn protected_routes_require_a_token() {
    for uri in [
        "/api/auth/me",
        "/api/characters",
        "/api/characters/selected",
        "/api/campaigns/active",
    ] {
        let app = common::offline_app(FakeBackend::replying("ok")).await;
        let response = get(app, uri).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");

        let json = body_json(response).await;
        assert_eq!(json["code"], "UNAUTHORIZED");
        assert_eq!(json["error"], "Missing Authorization header");
    }
}

#[tokio::test]
async fn garbage_token_is_rejected() {
    let app = common::offline_app(FakeBackend::replying("ok")).await;
    let response = get_auth(app, "/api/characters", "not-a-jwt").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Invalid or expired token");
}

#[tokio::test]
async fn token_signed_with_another_secret_is_rejected() {
    let other = JwtConfig {
        secret: "some-other-secret".into(),
        access_token_expiry_mins: 15,
        refresh_token_expiry_days: 7,
    };
    let token = chromance_api::auth::jwt::generate_access_token("66a0c0ffee0000000000beef", &other)
        .unwrap();

    let app = common::offline_app(FakeBackend::replying("ok")).await;
    let response = get_auth(app, "/api/characters", &token).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn refresh_token_is_not_an_access_token() {
    let token =
        generate_refresh_token("66a0c0ffee0000000000beef", &common::test_config().jwt).unwrap();

    let app = common::offline_app(FakeBackend::replying("ok")).await;
    let response = get_auth(app, "/api/auth/me", &token).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn access_token_cannot_refresh() {
    let token = common::access_token("66a0c0ffee0000000000beef");

    let app = common::offline_app(FakeBackend::replying("ok")).await;
    let response = post_json(
        app,
        "/api/auth/refresh",
        serde_json::json!({ "refresh_token": token }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Invalid or expired refresh token");
}

// ---------------------------------------------------------------------------
// Body validation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn signup_rejects_short_password() {
    let app = common::offline_app(FakeBackend::replying("ok")).await;
    let response = post_json(
        app,
        "/api/auth/signup",
        serde_json::json!({ "name": "Kai", "email": "kai@chromance.io", "password": "123" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn signup_rejects_invalid_email() {
    let app = common::offline_app(FakeBackend::replying("ok")).await;
    let response = post_json(
        app,
        "/api/auth/signup",
        serde_json::json!({ "name": "Kai", "email": "not-an-email", "password": "secret123" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_body_field_is_invalid_json() {
    let app = common::offline_app(FakeBackend::replying("ok")).await;
    let response = post_json(
        app,
        "/api/auth/login",
        serde_json::json!({ "email": "kai@chromance.io" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "INVALID_JSON");
}
