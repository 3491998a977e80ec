// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Request};
use card_voting::config::Config;
use card_voting::db::{Database, FirestoreDb, MemoryDb};
use card_voting::middleware::auth::create_session_token;
use card_voting::models::{Role, User};
use card_voting::routes::create_router;
use card_voting::services::{GoogleIdTokenVerifier, RosterService};
use card_voting::AppState;
use jsonwebtoken::{encode, Algorithm, DecodingKey, EncodingKey, Header};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Key ID the test verifier trusts.
#[allow(dead_code)]
pub const TEST_KID: &str = "test-kid";

#[allow(dead_code)]
const TEST_PRIVATE_KEY: &[u8] = include_bytes!("../fixtures/oidc_test_key.pem");
const TEST_PUBLIC_KEY: &[u8] = include_bytes!("../fixtures/oidc_test_key.pub.pem");

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> FirestoreDb {
    FirestoreDb::new_mock()
}

/// Build state around the given config and database.
#[allow(dead_code)]
pub fn test_state(config: Config, db: Database) -> Arc<AppState> {
    let decoding_key =
        DecodingKey::from_rsa_pem(TEST_PUBLIC_KEY).expect("Failed to parse test public key");
    let google_verifier = GoogleIdTokenVerifier::new_with_static_key(&config, TEST_KID, decoding_key)
        .expect("Failed to build test verifier");

    Arc::new(AppState {
        config,
        db,
        roster: RosterService::builtin(),
        google_verifier: Arc::new(google_verifier),
    })
}

/// Create a test app backed by in-memory storage.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let state = test_state(Config::test_default(), Database::Memory(MemoryDb::new()));
    (create_router(state.clone()), state)
}

/// Create a test app whose database is offline; every query fails.
#[allow(dead_code)]
pub fn create_offline_test_app() -> (axum::Router, Arc<AppState>) {
    let state = test_state(
        Config::test_default(),
        Database::Firestore(test_db_offline()),
    );
    (create_router(state.clone()), state)
}

#[allow(dead_code)]
fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

/// Session token as issued by sign-in.
#[allow(dead_code)]
pub fn session_token(state: &AppState, uid: &str, role: Role) -> String {
    create_session_token(uid, role, &state.config.jwt_signing_key).unwrap()
}

/// Admin session for "root", whose stored record and email are on the
/// configured admin list. Seeds the record on first use.
#[allow(dead_code)]
pub async fn admin_token(state: &AppState) -> String {
    if state.db.get_user("root").await.unwrap().is_none() {
        seed_user(state, "root", "admin@example.com", Role::Admin).await;
    }
    session_token(state, "root", Role::Admin)
}

/// Google-style ID token signed with the test key.
#[allow(dead_code)]
pub fn google_id_token(state: &AppState, sub: &str, email: &str, name: &str) -> String {
    let now = now_secs();
    let claims = serde_json::json!({
        "iss": "https://accounts.google.com",
        "aud": state.config.google_client_id,
        "sub": sub,
        "email": email,
        "email_verified": true,
        "name": name,
        "picture": "https://example.com/photo.png",
        "iat": now,
        "exp": now + 3600,
    });

    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(TEST_KID.to_string());

    encode(
        &header,
        &claims,
        &EncodingKey::from_rsa_pem(TEST_PRIVATE_KEY).unwrap(),
    )
    .unwrap()
}

/// Store a user directly, bypassing sign-in.
#[allow(dead_code)]
pub async fn seed_user(state: &AppState, uid: &str, email: &str, role: Role) -> User {
    let now = card_voting::time_utils::now_rfc3339();
    let user = User {
        uid: uid.to_string(),
        email: email.to_string(),
        name: format!("User {uid}"),
        photo: None,
        role,
        created_at: now.clone(),
        last_login: now,
        updated_at: None,
    };
    state.db.create_user(&user).await.unwrap();
    user
}

/// Request with a bearer token and optional JSON body.
#[allow(dead_code)]
pub fn authed_request(
    method: &str,
    uri: &str,
    token: &str,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"));

    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Unauthenticated request with optional JSON body.
#[allow(dead_code)]
pub fn public_request(method: &str, uri: &str, body: Option<serde_json::Value>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);

    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Collect a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
