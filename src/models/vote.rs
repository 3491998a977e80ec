// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Vote model for storage and API.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Lowest accepted intensity.
pub const MIN_INTENSITY: u8 = 1;
/// Highest accepted intensity.
pub const MAX_INTENSITY: u8 = 3;

/// Yes/no choice of a vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum VoteChoice {
    Yes,
    No,
}

impl VoteChoice {
    pub fn as_str(self) -> &'static str {
        match self {
            VoteChoice::Yes => "yes",
            VoteChoice::No => "no",
        }
    }
}

/// A single voter's verdict on one participant. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub voter_id: String,
    pub voter_name: String,
    pub voter_email: String,
    pub participant_id: String,
    pub participant_name: String,
    pub vote: VoteChoice,
    /// 1 (slightly) to 3 (strongly)
    pub intensity: u8,
    /// When the vote was cast (RFC 3339)
    pub timestamp: String,
}

impl Vote {
    /// Document ID for this vote.
    pub fn document_id(&self) -> String {
        vote_document_id(&self.voter_id, &self.participant_id)
    }
}

/// Document ID of the vote a voter cast for a participant.
///
/// One document per pair, so a create-only write enforces a single vote.
/// `_` inside either part is escaped so the separator stays unambiguous.
pub fn vote_document_id(voter_id: &str, participant_id: &str) -> String {
    format!(
        "{}_{}",
        escape_id_part(voter_id),
        escape_id_part(participant_id)
    )
}

fn escape_id_part(part: &str) -> String {
    urlencoding::encode(part).replace('_', "%5F")
}

/// Whether an intensity is within the accepted range.
pub fn is_valid_intensity(intensity: u8) -> bool {
    (MIN_INTENSITY..=MAX_INTENSITY).contains(&intensity)
}
