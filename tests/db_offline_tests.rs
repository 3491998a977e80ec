// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Behavior when the Firestore client is unavailable.

use axum::http::StatusCode;
use card_voting::models::Role;
use serde_json::json;
use tower::ServiceExt;

mod common;
use common::{authed_request, body_json, create_offline_test_app, public_request, session_token};

#[tokio::test]
async fn test_public_reads_report_database_error() {
    let (app, _) = create_offline_test_app();

    for uri in ["/api/results", "/api/stats", "/api/participants/available"] {
        let response = app
            .clone()
            .oneshot(public_request("GET", uri, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
        assert_eq!(body_json(response).await["error"], "database_error");
    }
}

#[tokio::test]
async fn test_roster_served_without_database() {
    let (app, _) = create_offline_test_app();

    let response = app
        .oneshot(public_request("GET", "/api/participants", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_vote_submission_fails_cleanly() {
    let (app, state) = create_offline_test_app();

    let response = app
        .oneshot(authed_request(
            "POST",
            "/api/votes",
            &session_token(&state, "u1", Role::Student),
            Some(json!({ "participantId": "1", "vote": "yes", "intensity": 2 })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
