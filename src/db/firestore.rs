// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (profiles keyed by identity-provider UID)
//! - Votes (one document per voter/participant pair)
//! - Settings (participant visibility flags)

use crate::db::{collections, PARTICIPANT_SETTINGS_DOC};
use crate::error::AppError;
use crate::models::vote::vote_document_id;
use crate::models::{ParticipantSettings, User, Vote};
use firestore::errors::FirestoreError;
use firestore::{FirestoreConsistencySelector, FirestoreQueryDirection};
use std::collections::BTreeMap;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

/// Map a create-only write failure, turning "document exists" into a conflict.
fn map_create_error(err: FirestoreError, conflict_message: &str) -> AppError {
    match err {
        FirestoreError::DataConflictError(_) => AppError::Conflict(conflict_message.to_string()),
        other => AppError::Database(other.to_string()),
    }
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // The emulator accepts any token; skip credential discovery entirely.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user by UID.
    pub async fn get_user(&self, uid: &str) -> Result<Option<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(uid)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user by (normalized) email.
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let users: Vec<User> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .filter(|q| q.for_all([q.field("email").eq(email)]))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(users.into_iter().next())
    }

    /// Create a user. Fails with `Conflict` if the UID is taken.
    pub async fn create_user(&self, user: &User) -> Result<(), AppError> {
        let _: User = self
            .get_client()?
            .fluent()
            .insert()
            .into(collections::USERS)
            .document_id(&user.uid)
            .object(user)
            .execute()
            .await
            .map_err(|e| map_create_error(e, "User already exists with this email or uid"))?;
        Ok(())
    }

    /// Overwrite a user document.
    pub async fn update_user(&self, user: &User) -> Result<(), AppError> {
        let _: User = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.uid)
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// All users, newest first.
    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .order_by([("createdAt", FirestoreQueryDirection::Descending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Vote Operations ─────────────────────────────────────────

    /// Store a vote. Fails with `Conflict` if this voter already voted for the participant.
    pub async fn insert_vote(&self, vote: &Vote) -> Result<(), AppError> {
        let _: Vote = self
            .get_client()?
            .fluent()
            .insert()
            .into(collections::VOTES)
            .document_id(vote.document_id())
            .object(vote)
            .execute()
            .await
            .map_err(|e| map_create_error(e, "You have already voted for this participant"))?;
        Ok(())
    }

    /// Get the vote a voter cast for a participant.
    pub async fn get_vote(
        &self,
        voter_id: &str,
        participant_id: &str,
    ) -> Result<Option<Vote>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::VOTES)
            .obj()
            .one(&vote_document_id(voter_id, participant_id))
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All votes, newest first.
    pub async fn list_votes(&self) -> Result<Vec<Vote>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::VOTES)
            .order_by([("timestamp", FirestoreQueryDirection::Descending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Votes cast by one voter, newest first.
    pub async fn list_votes_for_voter(&self, voter_id: &str) -> Result<Vec<Vote>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::VOTES)
            .filter(|q| q.for_all([q.field("voterId").eq(voter_id)]))
            .order_by([("timestamp", FirestoreQueryDirection::Descending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Settings Operations ─────────────────────────────────────

    pub async fn get_participant_settings(&self) -> Result<Option<ParticipantSettings>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::SETTINGS)
            .obj()
            .one(PARTICIPANT_SETTINGS_DOC)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Merge `changes` into the stored settings in one transaction, so
    /// concurrent saves of different participants both survive.
    pub async fn merge_participant_settings(
        &self,
        changes: &BTreeMap<String, bool>,
        updated_by: &str,
        updated_at: &str,
    ) -> Result<ParticipantSettings, AppError> {
        let client = self.get_client()?;

        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        // Read through the transaction so a concurrent commit aborts this one
        let current: Option<ParticipantSettings> = client
            .clone_with_consistency_selector(FirestoreConsistencySelector::Transaction(
                transaction.transaction_id().clone(),
            ))
            .fluent()
            .select()
            .by_id_in(collections::SETTINGS)
            .obj()
            .one(PARTICIPANT_SETTINGS_DOC)
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to read settings in transaction: {}", e))
            })?;

        let mut settings = current.unwrap_or_default();
        settings.apply(changes);
        settings.updated_at = updated_at.to_string();
        settings.updated_by = updated_by.to_string();

        client
            .fluent()
            .update()
            .in_col(collections::SETTINGS)
            .document_id(PARTICIPANT_SETTINGS_DOC)
            .object(&settings)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add settings to transaction: {}", e))
            })?;

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        Ok(settings)
    }
}
