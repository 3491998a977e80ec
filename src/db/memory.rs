// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process document store with the same semantics as the Firestore backend.
//!
//! Used by tests and by `STORAGE_BACKEND=memory` for local runs. Create-only
//! writes go through the DashMap entry API, so concurrent duplicates lose.

use crate::db::PARTICIPANT_SETTINGS_DOC;
use crate::error::AppError;
use crate::models::vote::vote_document_id;
use crate::models::{ParticipantSettings, User, Vote};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Default)]
struct Collections {
    users: DashMap<String, User>,
    votes: DashMap<String, Vote>,
    settings: DashMap<String, ParticipantSettings>,
}

/// Memory-backed database; clones share the same data.
#[derive(Clone, Default)]
pub struct MemoryDb {
    inner: Arc<Collections>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_user(&self, uid: &str) -> Result<Option<User>, AppError> {
        Ok(self.inner.users.get(uid).map(|u| u.clone()))
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .inner
            .users
            .iter()
            .find(|u| u.email == email)
            .map(|u| u.clone()))
    }

    pub async fn create_user(&self, user: &User) -> Result<(), AppError> {
        match self.inner.users.entry(user.uid.clone()) {
            Entry::Occupied(_) => Err(AppError::Conflict(
                "User already exists with this email or uid".to_string(),
            )),
            Entry::Vacant(slot) => {
                slot.insert(user.clone());
                Ok(())
            }
        }
    }

    pub async fn update_user(&self, user: &User) -> Result<(), AppError> {
        self.inner.users.insert(user.uid.clone(), user.clone());
        Ok(())
    }

    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let mut users: Vec<User> = self.inner.users.iter().map(|u| u.clone()).collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    pub async fn insert_vote(&self, vote: &Vote) -> Result<(), AppError> {
        match self.inner.votes.entry(vote.document_id()) {
            Entry::Occupied(_) => Err(AppError::Conflict(
                "You have already voted for this participant".to_string(),
            )),
            Entry::Vacant(slot) => {
                slot.insert(vote.clone());
                Ok(())
            }
        }
    }

    pub async fn get_vote(
        &self,
        voter_id: &str,
        participant_id: &str,
    ) -> Result<Option<Vote>, AppError> {
        Ok(self
            .inner
            .votes
            .get(&vote_document_id(voter_id, participant_id))
            .map(|v| v.clone()))
    }

    pub async fn list_votes(&self) -> Result<Vec<Vote>, AppError> {
        let mut votes: Vec<Vote> = self.inner.votes.iter().map(|v| v.clone()).collect();
        sort_newest_first(&mut votes);
        Ok(votes)
    }

    pub async fn list_votes_for_voter(&self, voter_id: &str) -> Result<Vec<Vote>, AppError> {
        let mut votes: Vec<Vote> = self
            .inner
            .votes
            .iter()
            .filter(|v| v.voter_id == voter_id)
            .map(|v| v.clone())
            .collect();
        sort_newest_first(&mut votes);
        Ok(votes)
    }

    pub async fn get_participant_settings(&self) -> Result<Option<ParticipantSettings>, AppError> {
        Ok(self
            .inner
            .settings
            .get(PARTICIPANT_SETTINGS_DOC)
            .map(|s| s.clone()))
    }

    pub async fn merge_participant_settings(
        &self,
        changes: &BTreeMap<String, bool>,
        updated_by: &str,
        updated_at: &str,
    ) -> Result<ParticipantSettings, AppError> {
        // The entry guard holds the shard lock for the whole merge
        let mut settings = self
            .inner
            .settings
            .entry(PARTICIPANT_SETTINGS_DOC.to_string())
            .or_default();
        settings.apply(changes);
        settings.updated_at = updated_at.to_string();
        settings.updated_by = updated_by.to_string();
        Ok(settings.clone())
    }
}

fn sort_newest_first(votes: &mut [Vote]) {
    votes.sort_by(|a, b| {
        b.timestamp
            .cmp(&a.timestamp)
            .then_with(|| a.participant_id.cmp(&b.participant_id))
    });
}
