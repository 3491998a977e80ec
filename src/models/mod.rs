// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod participant;
pub mod results;
pub mod user;
pub mod vote;

pub use participant::{Participant, ParticipantSettings};
pub use results::{ParticipantResult, Standings, VoteStats};
pub use user::{Role, User};
pub use vote::{Vote, VoteChoice};
