// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Participant roster loading and lookup.

use crate::models::Participant;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Built-in roster: (id, name, role, avatar).
const BUILTIN_ROSTER: [(&str, &str, &str, &str); 8] = [
    ("1", "John Doe", "Software Engineer", "https://randomuser.me/api/portraits/men/1.jpg"),
    ("2", "Jane Smith", "Product Manager", "https://randomuser.me/api/portraits/women/2.jpg"),
    ("3", "Robert Johnson", "UX Designer", "https://randomuser.me/api/portraits/men/3.jpg"),
    ("4", "Emily Davis", "Data Scientist", "https://randomuser.me/api/portraits/women/4.jpg"),
    ("5", "Michael Wilson", "DevOps Engineer", "https://randomuser.me/api/portraits/men/5.jpg"),
    ("6", "Sarah Brown", "Frontend Developer", "https://randomuser.me/api/portraits/women/6.jpg"),
    ("7", "David Taylor", "Backend Developer", "https://randomuser.me/api/portraits/men/7.jpg"),
    ("8", "Jessica Martinez", "QA Engineer", "https://randomuser.me/api/portraits/women/8.jpg"),
];

/// The fixed set of participants votes can be cast for.
#[derive(Debug, Clone)]
pub struct RosterService {
    participants: Vec<Participant>,
}

impl Default for RosterService {
    fn default() -> Self {
        Self::builtin()
    }
}

impl RosterService {
    /// The compiled-in roster.
    pub fn builtin() -> Self {
        let participants = BUILTIN_ROSTER
            .iter()
            .map(|(id, name, role, avatar)| Participant {
                id: id.to_string(),
                name: name.to_string(),
                role: role.to_string(),
                avatar: avatar.to_string(),
            })
            .collect();
        Self { participants }
    }

    /// Load a roster from a JSON array file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, RosterError> {
        let json_data =
            fs::read_to_string(path.as_ref()).map_err(|e| RosterError::IoError(e.to_string()))?;
        Self::load_from_json(&json_data)
    }

    /// Load a roster from a JSON array of participants.
    pub fn load_from_json(json_data: &str) -> Result<Self, RosterError> {
        let participants: Vec<Participant> =
            serde_json::from_str(json_data).map_err(|e| RosterError::ParseError(e.to_string()))?;
        Self::from_participants(participants)
    }

    /// Build a roster, rejecting empty lists, blank IDs and duplicate IDs.
    pub fn from_participants(mut participants: Vec<Participant>) -> Result<Self, RosterError> {
        if participants.is_empty() {
            return Err(RosterError::Empty);
        }

        // Stored IDs are trimmed so lookups match what was checked
        for participant in &mut participants {
            participant.id = participant.id.trim().to_string();
        }

        let mut seen = HashSet::new();
        for participant in &participants {
            if participant.id.is_empty() {
                return Err(RosterError::BlankId(participant.name.clone()));
            }
            if !seen.insert(participant.id.as_str()) {
                return Err(RosterError::DuplicateId(participant.id.clone()));
            }
        }

        tracing::info!(count = participants.len(), "Loaded participant roster");
        Ok(Self { participants })
    }

    /// All participants in display order.
    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn get(&self, id: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Roster is empty")]
    Empty,
    #[error("Participant '{0}' has a blank id")]
    BlankId(String),
    #[error("Duplicate participant id: {0}")]
    DuplicateId(String),
}
