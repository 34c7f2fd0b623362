/*
 * Copyright 2025 Security Union LLC
 *
 * Licensed under either of
 *
 * * Apache License, Version 2.0
 *   (http://www.apache.org/licenses/LICENSE-2.0)
 * * MIT license
 *   (http://opensource.org/licenses/MIT)
 *
 * at your option.
 */

//! Integration tests for `POST /api/auth/google/refresh`.


use axum::body::Body;
use axum::http::{header, StatusCode};
use chrono::Utc;
use photos_api::error::{MSG_INVALID_REFRESH_TOKEN, MSG_NO_REFRESH_TOKEN, MSG_USER_GONE};
use photos_api_types::responses::RefreshResponse;
use photos_api_types::ErrorBody;
use test_helpers::*;

fn refresh_with_cookie(token: &str) -> axum::http::Request<Body> {
    post("/api/auth/google/refresh")
        .header(header::COOKIE, format!("refresh_token={token}"))
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_refresh_issues_new_access_token() {
    let app = TestApp::new();
    let user = app.seed_user("erin@example.com").await;
    let refresh = app.state.codec.issue_refresh_token(&user).unwrap();

    let before = Utc::now().timestamp();
    let resp = app.send(refresh_with_cookie(&refresh)).await;
    let after = Utc::now().timestamp();
    assert_status(&resp, StatusCode::OK);

    let cookie_token = set_cookie_value(&resp, "auth_token").expect("auth_token cookie");
    // The refresh token is kept as-is.
    assert!(find_set_cookie(&resp, "refresh_token").is_none());

    let body: RefreshResponse = response_json(resp).await;
    assert_eq!(body.token, cookie_token);

    let claims = app.state.codec.validate_access_token(&body.token).unwrap();
    assert_eq!(claims.user_id, user.id);
    assert_eq!(claims.email, user.email);
    let ttl = TEST_TOKEN_TTL_SECS as i64;
    assert!(claims.exp >= before + ttl && claims.exp <= after + ttl);
}

#[tokio::test]
async fn test_refresh_without_token() {
    let app = TestApp::new();
    let resp = app
        .send(post("/api/auth/google/refresh").body(Body::empty()).unwrap())
        .await;
    assert_status(&resp, StatusCode::UNAUTHORIZED);
    let body: ErrorBody = response_json(resp).await;
    assert_eq!(body.error, MSG_NO_REFRESH_TOKEN);
}

#[tokio::test]
async fn test_access_token_cannot_refresh() {
    let app = TestApp::new();
    let user = app.seed_user("frank@example.com").await;
    let access = app.state.codec.issue_access_token(&user).unwrap();

    let resp = app.send(refresh_with_cookie(&access)).await;
    assert_status(&resp, StatusCode::UNAUTHORIZED);
    assert!(clears_cookie(&resp, "refresh_token"));
    let body: ErrorBody = response_json(resp).await;
    assert_eq!(body.error, MSG_INVALID_REFRESH_TOKEN);
}

#[tokio::test]
async fn test_revoked_refresh_token_is_rejected() {
    let app = TestApp::new();
    let user = app.seed_user("gina@example.com").await;
    let refresh = app.state.codec.issue_refresh_token(&user).unwrap();
    app.state.codec.revoke(&refresh).unwrap();

    let resp = app.send(refresh_with_cookie(&refresh)).await;
    assert_status(&resp, StatusCode::UNAUTHORIZED);
    assert!(clears_cookie(&resp, "refresh_token"));
}

#[tokio::test]
async fn test_refresh_for_deleted_user() {
    let app = TestApp::new();
    let user = app.seed_user("henry@example.com").await;
    let refresh = app.state.codec.issue_refresh_token(&user).unwrap();
    assert!(app.users.remove(user.id));

    let resp = app.send(refresh_with_cookie(&refresh)).await;
    assert_status(&resp, StatusCode::UNAUTHORIZED);
    let body: ErrorBody = response_json(resp).await;
    assert_eq!(body.error, MSG_USER_GONE);
}

#[tokio::test]
async fn test_refresh_via_bearer_in_development() {
    let app = TestApp::new();
    let user = app.seed_user("ivy@example.com").await;
    let refresh = app.state.codec.issue_refresh_token(&user).unwrap();

    let resp = app
        .send(
            post("/api/auth/google/refresh")
                .header(header::AUTHORIZATION, format!("Bearer {refresh}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_status(&resp, StatusCode::OK);
}

#[tokio::test]
async fn test_refresh_bearer_ignored_when_disabled() {
    let mut config = test_config("http://127.0.0.1:9");
    config.allow_bearer_auth = false;
    let app = TestApp::with_config(config);
    let user = app.seed_user("ivy@example.com").await;
    let refresh = app.state.codec.issue_refresh_token(&user).unwrap();

    let resp = app
        .send(
            post("/api/auth/google/refresh")
                .header(header::AUTHORIZATION, format!("Bearer {refresh}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_status(&resp, StatusCode::UNAUTHORIZED);
    let body: ErrorBody = response_json(resp).await;
    assert_eq!(body.error, MSG_NO_REFRESH_TOKEN);
}
