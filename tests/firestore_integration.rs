// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore integration tests.
//!
//! These tests require the Firestore emulator to be running, with
//! FIRESTORE_EMULATOR_HOST pointing at it. Without it they skip.

use card_voting::error::AppError;
use card_voting::models::{Role, User, Vote, VoteChoice};
use card_voting::time_utils::now_rfc3339;
use std::collections::BTreeMap;

mod common;
use common::test_db;

/// Generate a unique ID for test isolation.
fn unique_id(prefix: &str) -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{prefix}-{nanos}")
}

/// Helper to create a basic test user
fn test_user(uid: &str) -> User {
    User {
        uid: uid.to_string(),
        email: format!("{uid}@example.com"),
        name: "Test User".to_string(),
        photo: None,
        role: Role::Student,
        created_at: now_rfc3339(),
        last_login: now_rfc3339(),
        updated_at: None,
    }
}

fn test_vote(voter_id: &str, participant_id: &str, intensity: u8) -> Vote {
    Vote {
        voter_id: voter_id.to_string(),
        voter_name: "Test User".to_string(),
        voter_email: format!("{voter_id}@example.com"),
        participant_id: participant_id.to_string(),
        participant_name: "John Doe".to_string(),
        vote: VoteChoice::Yes,
        intensity,
        timestamp: now_rfc3339(),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// USER TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_user_create_and_lookup() {
    require_emulator!();

    let db = test_db().await;
    let uid = unique_id("user");

    assert!(db.get_user(&uid).await.unwrap().is_none());

    let user = test_user(&uid);
    db.create_user(&user).await.unwrap();

    assert_eq!(db.get_user(&uid).await.unwrap(), Some(user.clone()));
    assert_eq!(
        db.find_user_by_email(&user.email).await.unwrap(),
        Some(user.clone())
    );

    // Second create of the same UID conflicts
    assert!(matches!(
        db.create_user(&user).await,
        Err(AppError::Conflict(_))
    ));
}

#[tokio::test]
async fn test_user_update_preserves_fields() {
    require_emulator!();

    let db = test_db().await;
    let uid = unique_id("user");
    let mut user = test_user(&uid);
    db.create_user(&user).await.unwrap();

    user.name = "Renamed".to_string();
    user.updated_at = Some(now_rfc3339());
    db.update_user(&user).await.unwrap();

    let stored = db.get_user(&uid).await.unwrap().unwrap();
    assert_eq!(stored.name, "Renamed");
    assert_eq!(stored.created_at, user.created_at);
    assert!(stored.updated_at.is_some());
}

// ═══════════════════════════════════════════════════════════════════════════
// VOTE TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_vote_insert_is_create_only() {
    require_emulator!();

    let db = test_db().await;
    let voter = unique_id("voter");

    db.insert_vote(&test_vote(&voter, "1", 2)).await.unwrap();

    assert!(matches!(
        db.insert_vote(&test_vote(&voter, "1", 3)).await,
        Err(AppError::Conflict(_))
    ));

    let stored = db.get_vote(&voter, "1").await.unwrap().unwrap();
    assert_eq!(stored.intensity, 2);
}

#[tokio::test]
async fn test_votes_for_voter() {
    require_emulator!();

    let db = test_db().await;
    let voter = unique_id("voter");

    for participant in ["1", "2", "3"] {
        db.insert_vote(&test_vote(&voter, participant, 1))
            .await
            .unwrap();
    }

    let votes = db.list_votes_for_voter(&voter).await.unwrap();
    assert_eq!(votes.len(), 3);
    assert!(votes.iter().all(|v| v.voter_id == voter));

    let all = db.list_votes().await.unwrap();
    assert!(all.len() >= 3);
}

// ═══════════════════════════════════════════════════════════════════════════
// SETTINGS TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_participant_settings_round_trip() {
    require_emulator!();

    let db = test_db().await;

    let admin = unique_id("admin");
    let first = BTreeMap::from([("1".to_string(), false)]);
    db.merge_participant_settings(&first, &admin, &now_rfc3339())
        .await
        .unwrap();
    let second = BTreeMap::from([("2".to_string(), false)]);
    let settings = db
        .merge_participant_settings(&second, &admin, &now_rfc3339())
        .await
        .unwrap();

    assert_eq!(settings.enabled.get("1"), Some(&false));
    assert_eq!(settings.enabled.get("2"), Some(&false));
    assert_eq!(settings.updated_by, admin);

    let stored = db.get_participant_settings().await.unwrap().unwrap();
    assert_eq!(stored, settings);
}
