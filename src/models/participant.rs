// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Participant roster entries and admin visibility settings.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A presenter that voters score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Participant {
    pub id: String,
    pub name: String,
    /// Title or department shown under the name
    pub role: String,
    /// Avatar image URL
    pub avatar: String,
}

/// Admin-controlled visibility flags, stored as a single settings document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantSettings {
    /// Participant ID -> accepting votes
    #[serde(default)]
    pub enabled: BTreeMap<String, bool>,
    #[serde(default)]
    pub updated_at: String,
    /// UID of the admin who last saved the settings
    #[serde(default)]
    pub updated_by: String,
}

impl ParticipantSettings {
    /// Whether a participant accepts votes, falling back to `default` when unset.
    pub fn is_enabled(&self, participant_id: &str, default: bool) -> bool {
        self.enabled.get(participant_id).copied().unwrap_or(default)
    }

    /// Resolved flag for every roster participant.
    pub fn resolve(&self, roster: &[Participant], default: bool) -> BTreeMap<String, bool> {
        roster
            .iter()
            .map(|p| (p.id.clone(), self.is_enabled(&p.id, default)))
            .collect()
    }

    /// Apply a partial update; ids not in `changes` keep their value.
    pub fn apply(&mut self, changes: &BTreeMap<String, bool>) {
        for (id, enabled) in changes {
            self.enabled.insert(id.clone(), *enabled);
        }
    }
}
