// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Vote tallies: per-participant standings and overall counts.
//!
//! Everything here is computed from the full vote list on each request.
//! The roster is small and votes number in the hundreds, so a single
//! collection read is cheaper to reason about than maintained counters.

use crate::models::{Participant, Vote, VoteChoice};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Running counts for one participant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Tally {
    yes_votes: u32,
    no_votes: u32,
    yes_intensity_sum: u32,
}

impl Tally {
    fn add(&mut self, vote: &Vote) {
        match vote.vote {
            VoteChoice::Yes => {
                self.yes_votes += 1;
                self.yes_intensity_sum += u32::from(vote.intensity);
            }
            VoteChoice::No => self.no_votes += 1,
        }
    }

    fn total(&self) -> u32 {
        self.yes_votes + self.no_votes
    }

    /// Mean yes-vote intensity, rounded to one decimal.
    fn average_intensity(&self) -> f64 {
        if self.yes_votes == 0 {
            return 0.0;
        }
        let mean = f64::from(self.yes_intensity_sum) / f64::from(self.yes_votes);
        (mean * 10.0).round() / 10.0
    }

    fn yes_percentage(&self) -> u32 {
        let total = self.total();
        if total == 0 {
            return 0;
        }
        (f64::from(self.yes_votes) * 100.0 / f64::from(total)).round() as u32
    }
}

/// Leaderboard row for one participant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantResult {
    pub id: String,
    pub name: String,
    pub role: String,
    pub avatar: String,
    pub yes_votes: u32,
    pub no_votes: u32,
    pub total_votes: u32,
    /// Sum of intensities over yes votes
    pub weighted_score: u32,
    pub average_intensity: f64,
    pub yes_percentage: u32,
    /// 1-based; tied participants share a rank
    pub rank: u32,
}

/// Ranked results plus the current leader.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Standings {
    pub results: Vec<ParticipantResult>,
    /// None until some participant has a positive weighted score
    pub winner: Option<ParticipantResult>,
}

/// One group of a count aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountBucket {
    #[serde(rename = "_id")]
    pub id: String,
    pub count: u32,
}

/// Overall vote counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteStats {
    pub total_votes: u32,
    /// Distinct voters with at least one vote
    pub total_voters: u32,
    pub total_participants: u32,
    /// Always `yes` then `no`
    pub vote_distribution: Vec<CountBucket>,
    /// Roster order, then unknown participant IDs sorted
    pub participant_vote_count: Vec<CountBucket>,
}

fn tally_by_participant(votes: &[Vote]) -> HashMap<&str, Tally> {
    let mut tallies: HashMap<&str, Tally> = HashMap::new();
    for vote in votes {
        tallies
            .entry(vote.participant_id.as_str())
            .or_default()
            .add(vote);
    }
    tallies
}

/// Rank roster participants by weighted score.
///
/// Ties on weighted score are broken by yes votes; remaining ties keep
/// roster order and share a rank.
pub fn compute_standings(roster: &[Participant], votes: &[Vote]) -> Standings {
    let tallies = tally_by_participant(votes);

    let mut rows: Vec<(&Participant, Tally)> = roster
        .iter()
        .map(|p| (p, tallies.get(p.id.as_str()).copied().unwrap_or_default()))
        .collect();

    // Stable sort keeps roster order among equals.
    rows.sort_by(|(_, a), (_, b)| {
        b.yes_intensity_sum
            .cmp(&a.yes_intensity_sum)
            .then_with(|| b.yes_votes.cmp(&a.yes_votes))
    });

    let mut results = Vec::with_capacity(rows.len());
    let mut previous: Option<(u32, u32)> = None;
    let mut rank = 0;

    for (index, (participant, tally)) in rows.into_iter().enumerate() {
        let key = (tally.yes_intensity_sum, tally.yes_votes);
        if previous != Some(key) {
            rank = index as u32 + 1;
            previous = Some(key);
        }

        results.push(ParticipantResult {
            id: participant.id.clone(),
            name: participant.name.clone(),
            role: participant.role.clone(),
            avatar: participant.avatar.clone(),
            yes_votes: tally.yes_votes,
            no_votes: tally.no_votes,
            total_votes: tally.total(),
            weighted_score: tally.yes_intensity_sum,
            average_intensity: tally.average_intensity(),
            yes_percentage: tally.yes_percentage(),
            rank,
        });
    }

    let winner = results.first().filter(|r| r.weighted_score > 0).cloned();

    Standings { results, winner }
}

/// Aggregate counts across all votes.
pub fn compute_stats(roster: &[Participant], votes: &[Vote]) -> VoteStats {
    let tallies = tally_by_participant(votes);

    let (yes, no) = tallies
        .values()
        .fold((0, 0), |(yes, no), t| (yes + t.yes_votes, no + t.no_votes));

    let voters: HashSet<&str> = votes.iter().map(|v| v.voter_id.as_str()).collect();

    let mut participant_vote_count: Vec<CountBucket> = roster
        .iter()
        .map(|p| CountBucket {
            id: p.id.clone(),
            count: tallies.get(p.id.as_str()).map(Tally::total).unwrap_or(0),
        })
        .collect();

    let unknown: BTreeMap<&str, u32> = tallies
        .iter()
        .filter(|(id, _)| !roster.iter().any(|p| p.id == **id))
        .map(|(id, t)| (*id, t.total()))
        .collect();
    participant_vote_count.extend(unknown.into_iter().map(|(id, count)| CountBucket {
        id: id.to_string(),
        count,
    }));

    VoteStats {
        total_votes: votes.len() as u32,
        total_voters: voters.len() as u32,
        total_participants: roster.len() as u32,
        vote_distribution: vec![
            CountBucket {
                id: VoteChoice::Yes.as_str().to_string(),
                count: yes,
            },
            CountBucket {
                id: VoteChoice::No.as_str().to_string(),
                count: no,
            },
        ],
        participant_vote_count,
    }
}
