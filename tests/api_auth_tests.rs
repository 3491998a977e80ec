// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sign-in, session, and CORS tests.
//!
//! These tests verify that:
//! 1. Protected routes reject requests without valid sessions
//! 2. Google ID tokens are exchanged for sessions (header or cookie)
//! 3. Roles come from the admin list, never from the client
//! 4. CORS preflight requests return correct headers

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use card_voting::middleware::auth::{verify_session_token, SESSION_COOKIE};
use card_voting::models::Role;
use card_voting::routes::BANNER;
use tower::ServiceExt;

mod common;
use common::{authed_request, body_json, create_test_app, google_id_token, public_request};

#[tokio::test]
async fn test_banner_and_health() {
    let (app, _) = create_test_app();

    let response = app
        .clone()
        .oneshot(public_request("GET", "/", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], BANNER.as_bytes());

    let response = app
        .oneshot(public_request("GET", "/health", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "OK");
    assert_eq!(body["service"], "card-voting");
    assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn test_protected_route_without_token() {
    let (app, _) = create_test_app();

    let response = app
        .oneshot(public_request("GET", "/api/me", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn test_protected_route_with_invalid_token() {
    let (app, _) = create_test_app();

    let response = app
        .oneshot(authed_request("GET", "/api/votes/me", "not.a.jwt", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"], "invalid_token");
}

#[tokio::test]
async fn test_google_sign_in_creates_student() {
    let (app, state) = create_test_app();
    let id_token = google_id_token(&state, "google-123", "Ada@Example.com", "Ada Lovelace");

    let response = app
        .clone()
        .oneshot(public_request(
            "POST",
            "/auth/google",
            Some(serde_json::json!({ "idToken": id_token })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("session cookie")
        .to_str()
        .unwrap()
        .to_string();
    assert!(set_cookie.starts_with(&format!("{SESSION_COOKIE}=")));
    assert!(set_cookie.contains("HttpOnly"));

    let body = body_json(response).await;
    assert_eq!(body["user"]["uid"], "google-123");
    assert_eq!(body["user"]["email"], "ada@example.com");
    assert_eq!(body["user"]["role"], "student");

    let token = body["token"].as_str().unwrap();
    let claims = verify_session_token(token, &state.config.jwt_signing_key).unwrap();
    assert_eq!(claims.sub, "google-123");
    assert_eq!(claims.role, Role::Student);

    // The returned token works as a bearer token
    let response = app
        .oneshot(authed_request("GET", "/api/me", token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let me = body_json(response).await;
    assert_eq!(me["name"], "Ada Lovelace");
}

#[tokio::test]
async fn test_google_sign_in_assigns_admin_from_config() {
    let (app, state) = create_test_app();
    let id_token = google_id_token(&state, "google-admin", "admin@example.com", "Admin");

    let response = app
        .oneshot(public_request(
            "POST",
            "/auth/google",
            Some(serde_json::json!({ "idToken": id_token, "role": "student" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["user"]["role"], "admin");
}

#[tokio::test]
async fn test_sign_in_twice_keeps_created_at() {
    let (app, state) = create_test_app();

    let sign_in = |app: axum::Router| {
        let id_token = google_id_token(&state, "google-1", "ada@example.com", "Ada");
        async move {
            let response = app
                .oneshot(public_request(
                    "POST",
                    "/auth/google",
                    Some(serde_json::json!({ "idToken": id_token })),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            body_json(response).await
        }
    };

    let first = sign_in(app.clone()).await;
    let second = sign_in(app).await;

    assert_eq!(first["user"]["createdAt"], second["user"]["createdAt"]);
    assert_eq!(state.db.list_users().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_sign_in_rejects_bad_id_token() {
    let (app, _) = create_test_app();

    let response = app
        .clone()
        .oneshot(public_request(
            "POST",
            "/auth/google",
            Some(serde_json::json!({ "idToken": "garbage" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(public_request(
            "POST",
            "/auth/google",
            Some(serde_json::json!({})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_session_cookie_authenticates() {
    let (app, state) = create_test_app();
    common::seed_user(&state, "u1", "u1@example.com", Role::Student).await;
    let token = common::session_token(&state, "u1", Role::Student);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/me")
                .header(header::COOKIE, format!("{SESSION_COOKIE}={token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let (app, _) = create_test_app();

    let response = app
        .oneshot(public_request("POST", "/auth/logout", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(set_cookie.starts_with(&format!("{SESSION_COOKIE}=")));
    assert!(set_cookie.contains("Max-Age=0"));
    assert!(set_cookie.contains("Path=/"));
    assert!(set_cookie.contains("HttpOnly"));
}

#[tokio::test]
async fn test_logout_with_cookie_present_clears_it_once() {
    let (app, state) = create_test_app();
    let token = common::session_token(&state, "u1", Role::Student);

    let request = Request::builder()
        .method("POST")
        .uri("/auth/logout")
        .header(header::COOKIE, format!("{SESSION_COOKIE}={token}"))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let cookies: Vec<_> = response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect();
    assert_eq!(cookies.len(), 1);
    assert!(cookies[0].starts_with(&format!("{SESSION_COOKIE}=;")));
    assert!(cookies[0].contains("Max-Age=0"));
    assert!(cookies[0].contains("Path=/"));
}

#[tokio::test]
async fn test_admin_route_requires_admin() {
    let (app, state) = create_test_app();
    let student = common::session_token(&state, "u1", Role::Student);
    let admin = common::admin_token(&state).await;

    let response = app
        .clone()
        .oneshot(public_request("GET", "/api/admin/stats", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(authed_request("GET", "/api/admin/stats", &student, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .oneshot(authed_request("GET", "/api/admin/stats", &admin, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_admin_session_revoked_when_removed_from_admin_list() {
    let (app, state) = create_test_app();

    // Signed in while on the list, then dropped from ADMIN_EMAILS
    common::seed_user(&state, "former", "former-admin@example.com", Role::Admin).await;
    let token = common::session_token(&state, "former", Role::Admin);

    let response = app
        .clone()
        .oneshot(authed_request("GET", "/api/admin/stats", &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Still a valid session, just without admin rights
    let response = app
        .clone()
        .oneshot(authed_request("GET", "/api/me", &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // An admin claim for a user with no stored record grants nothing
    let ghost = common::session_token(&state, "ghost", Role::Admin);
    let response = app
        .oneshot(authed_request("GET", "/users", &ghost, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_cors_preflight() {
    let (app, state) = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/votes")
                .header(header::ORIGIN, state.config.frontend_url.as_str())
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        state.config.frontend_url.as_str()
    );
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
            .unwrap(),
        "true"
    );
}

#[tokio::test]
async fn test_cors_rejects_unknown_origin() {
    let (app, _) = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/votes")
                .header(header::ORIGIN, "https://evil.example.com")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}

#[tokio::test]
async fn test_cors_rejects_localhost_lookalike() {
    let (app, _) = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/votes")
                .header(header::ORIGIN, "http://localhost.attacker.example")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}

#[tokio::test]
async fn test_cors_allows_local_dev_port() {
    let (app, _) = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/votes")
                .header(header::ORIGIN, "http://127.0.0.1:4173")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "http://127.0.0.1:4173"
    );
}
