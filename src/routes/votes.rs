// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Vote submission and lookup routes.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::vote::is_valid_intensity;
use crate::models::{Vote, VoteChoice};
use crate::routes::extract::{not_blank, ValidJson};
use crate::time_utils::now_rfc3339;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::{Validate, ValidationError};

/// Vote routes (require authentication).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/votes", get(list_all_votes).post(submit_vote))
        .route("/api/votes/me", get(my_votes))
        .route("/api/votes/{voter_id}", get(votes_for_voter))
        .route("/api/votes/{voter_id}/{participant_id}", get(get_vote))
}

#[derive(Debug, Deserialize, Validate)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct SubmitVoteRequest {
    #[validate(custom(function = "not_blank"))]
    pub participant_id: String,
    pub vote: VoteChoice,
    #[validate(custom(function = "intensity_in_range"))]
    pub intensity: u8,
}

fn intensity_in_range(intensity: u8) -> std::result::Result<(), ValidationError> {
    if is_valid_intensity(intensity) {
        Ok(())
    } else {
        Err(ValidationError::new("intensity")
            .with_message("Intensity must be between 1 and 3".into()))
    }
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct SubmitVoteResponse {
    pub message: String,
    pub vote_id: String,
}

/// Record the caller's one vote for a participant.
async fn submit_vote(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    ValidJson(req): ValidJson<SubmitVoteRequest>,
) -> Result<(StatusCode, Json<SubmitVoteResponse>)> {
    let voter = state
        .db
        .get_user(&auth.uid)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let participant = state
        .roster
        .get(&req.participant_id)
        .ok_or_else(|| AppError::NotFound("Participant not found".to_string()))?;

    let settings = state.db.get_participant_settings().await?.unwrap_or_default();
    if !settings.is_enabled(&participant.id, state.config.participants_enabled_by_default) {
        return Err(AppError::Forbidden(
            "Voting is closed for this participant".to_string(),
        ));
    }

    // Fast path for the common resubmit; the create-only insert below is
    // what actually enforces one vote per pair.
    if state.db.get_vote(&voter.uid, &participant.id).await?.is_some() {
        return Err(AppError::Conflict(
            "You have already voted for this participant".to_string(),
        ));
    }

    let vote = Vote {
        voter_id: voter.uid.clone(),
        voter_name: voter.name.clone(),
        voter_email: voter.email.clone(),
        participant_id: participant.id.clone(),
        participant_name: participant.name.clone(),
        vote: req.vote,
        intensity: req.intensity,
        timestamp: now_rfc3339(),
    };

    state.db.insert_vote(&vote).await.map_err(|e| match e {
        AppError::Conflict(_) => {
            tracing::warn!(
                voter_id = %vote.voter_id,
                participant_id = %vote.participant_id,
                "Concurrent duplicate vote rejected"
            );
            AppError::Conflict("You have already voted for this participant".to_string())
        }
        other => other,
    })?;

    tracing::info!(
        voter_id = %vote.voter_id,
        participant_id = %vote.participant_id,
        vote = vote.vote.as_str(),
        intensity = vote.intensity,
        "Vote recorded"
    );

    Ok((
        StatusCode::CREATED,
        Json(SubmitVoteResponse {
            message: "Vote submitted successfully".to_string(),
            vote_id: vote.document_id(),
        }),
    ))
}

/// Every vote (admin only).
async fn list_all_votes(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<Vote>>> {
    auth.require_admin()?;
    Ok(Json(state.db.list_votes().await?))
}

async fn my_votes(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<Vote>>> {
    Ok(Json(state.db.list_votes_for_voter(&auth.uid).await?))
}

/// Votes cast by one voter; empty if none.
async fn votes_for_voter(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(voter_id): Path<String>,
) -> Result<Json<Vec<Vote>>> {
    auth.require_self_or_admin(&voter_id)?;
    Ok(Json(state.db.list_votes_for_voter(&voter_id).await?))
}

async fn get_vote(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path((voter_id, participant_id)): Path<(String, String)>,
) -> Result<Json<Vote>> {
    auth.require_self_or_admin(&voter_id)?;

    let vote = state
        .db
        .get_vote(&voter_id, &participant_id)
        .await?
        .ok_or_else(|| AppError::NotFound("No vote found for this user".to_string()))?;
    Ok(Json(vote))
}
