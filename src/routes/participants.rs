// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Public roster and results routes.

use crate::error::Result;
use crate::models::results::{compute_standings, compute_stats};
use crate::models::{Participant, Standings, VoteStats};
use crate::AppState;
use axum::{extract::State, routing::get, Json, Router};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/participants", get(list_participants))
        .route("/api/participants/available", get(available_participants))
        .route("/api/results", get(get_results))
        .route("/api/stats", get(get_stats))
}

async fn list_participants(State(state): State<Arc<AppState>>) -> Json<Vec<Participant>> {
    Json(state.roster.participants().to_vec())
}

/// Participants currently accepting votes, in roster order.
async fn available_participants(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Participant>>> {
    let settings = state.db.get_participant_settings().await?.unwrap_or_default();
    let default = state.config.participants_enabled_by_default;

    let available = state
        .roster
        .participants()
        .iter()
        .filter(|p| settings.is_enabled(&p.id, default))
        .cloned()
        .collect();

    Ok(Json(available))
}

async fn get_results(State(state): State<Arc<AppState>>) -> Result<Json<Standings>> {
    let votes = state.db.list_votes().await?;
    Ok(Json(compute_standings(state.roster.participants(), &votes)))
}

async fn get_stats(State(state): State<Arc<AppState>>) -> Result<Json<VoteStats>> {
    let votes = state.db.list_votes().await?;
    Ok(Json(compute_stats(state.roster.participants(), &votes)))
}
