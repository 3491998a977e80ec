// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer (Firestore, with an in-memory stand-in).

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryDb;

use crate::config::{Config, StorageBackend};
use crate::error::AppError;
use crate::models::{ParticipantSettings, User, Vote};
use std::collections::BTreeMap;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "Users";
    pub const VOTES: &str = "Votes";
    /// Singleton documents (participant visibility)
    pub const SETTINGS: &str = "Settings";
}

/// Document ID of the participant visibility settings.
pub const PARTICIPANT_SETTINGS_DOC: &str = "participants";

/// Document store used by the handlers.
#[derive(Clone)]
pub enum Database {
    Firestore(FirestoreDb),
    Memory(MemoryDb),
}

impl Database {
    /// Connect to the backend selected in the config.
    pub async fn connect(config: &Config) -> Result<Self, AppError> {
        match config.storage_backend {
            StorageBackend::Firestore => Ok(Self::Firestore(
                FirestoreDb::new(&config.gcp_project_id).await?,
            )),
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory storage; data will not survive a restart");
                Ok(Self::Memory(MemoryDb::new()))
            }
        }
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            Database::Firestore(_) => "firestore",
            Database::Memory(_) => "memory",
        }
    }

    // ─── Users ───────────────────────────────────────────────────

    pub async fn get_user(&self, uid: &str) -> Result<Option<User>, AppError> {
        match self {
            Database::Firestore(db) => db.get_user(uid).await,
            Database::Memory(db) => db.get_user(uid).await,
        }
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        match self {
            Database::Firestore(db) => db.find_user_by_email(email).await,
            Database::Memory(db) => db.find_user_by_email(email).await,
        }
    }

    /// Create-only; `Conflict` if the UID exists.
    pub async fn create_user(&self, user: &User) -> Result<(), AppError> {
        match self {
            Database::Firestore(db) => db.create_user(user).await,
            Database::Memory(db) => db.create_user(user).await,
        }
    }

    pub async fn update_user(&self, user: &User) -> Result<(), AppError> {
        match self {
            Database::Firestore(db) => db.update_user(user).await,
            Database::Memory(db) => db.update_user(user).await,
        }
    }

    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        match self {
            Database::Firestore(db) => db.list_users().await,
            Database::Memory(db) => db.list_users().await,
        }
    }

    // ─── Votes ───────────────────────────────────────────────────

    /// Create-only; `Conflict` if the voter already voted for the participant.
    pub async fn insert_vote(&self, vote: &Vote) -> Result<(), AppError> {
        match self {
            Database::Firestore(db) => db.insert_vote(vote).await,
            Database::Memory(db) => db.insert_vote(vote).await,
        }
    }

    pub async fn get_vote(
        &self,
        voter_id: &str,
        participant_id: &str,
    ) -> Result<Option<Vote>, AppError> {
        match self {
            Database::Firestore(db) => db.get_vote(voter_id, participant_id).await,
            Database::Memory(db) => db.get_vote(voter_id, participant_id).await,
        }
    }

    pub async fn list_votes(&self) -> Result<Vec<Vote>, AppError> {
        match self {
            Database::Firestore(db) => db.list_votes().await,
            Database::Memory(db) => db.list_votes().await,
        }
    }

    pub async fn list_votes_for_voter(&self, voter_id: &str) -> Result<Vec<Vote>, AppError> {
        match self {
            Database::Firestore(db) => db.list_votes_for_voter(voter_id).await,
            Database::Memory(db) => db.list_votes_for_voter(voter_id).await,
        }
    }

    // ─── Settings ────────────────────────────────────────────────

    pub async fn get_participant_settings(&self) -> Result<Option<ParticipantSettings>, AppError> {
        match self {
            Database::Firestore(db) => db.get_participant_settings().await,
            Database::Memory(db) => db.get_participant_settings().await,
        }
    }

    /// Apply a partial update to the stored settings atomically.
    pub async fn merge_participant_settings(
        &self,
        changes: &BTreeMap<String, bool>,
        updated_by: &str,
        updated_at: &str,
    ) -> Result<ParticipantSettings, AppError> {
        match self {
            Database::Firestore(db) => {
                db.merge_participant_settings(changes, updated_by, updated_at)
                    .await
            }
            Database::Memory(db) => {
                db.merge_participant_settings(changes, updated_by, updated_at)
                    .await
            }
        }
    }
}
