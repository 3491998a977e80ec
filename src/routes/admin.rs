// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Admin routes. `require_admin` is layered on in routes/mod.rs.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::results::compute_stats;
use crate::models::VoteStats;
use crate::time_utils::now_rfc3339;
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    routing::get,
    Extension, Json, Router,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/admin/stats", get(admin_stats))
        .route(
            "/api/admin/participant-settings",
            get(get_participant_settings).post(save_participant_settings),
        )
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStatsResponse {
    #[serde(flatten)]
    pub stats: VoteStats,
    pub total_users: u32,
}

async fn admin_stats(State(state): State<Arc<AppState>>) -> Result<Json<AdminStatsResponse>> {
    let votes = state.db.list_votes().await?;
    let total_users = state.db.list_users().await?.len() as u32;

    Ok(Json(AdminStatsResponse {
        stats: compute_stats(state.roster.participants(), &votes),
        total_users,
    }))
}

/// Resolved enabled flag for every roster participant.
async fn get_participant_settings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<BTreeMap<String, bool>>> {
    let settings = state.db.get_participant_settings().await?.unwrap_or_default();
    Ok(Json(settings.resolve(
        state.roster.participants(),
        state.config.participants_enabled_by_default,
    )))
}

#[derive(Serialize)]
pub struct SaveSettingsResponse {
    pub message: String,
    pub settings: BTreeMap<String, bool>,
}

/// Merge a partial `{participantId: enabled}` map into the stored settings.
async fn save_participant_settings(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    payload: std::result::Result<Json<BTreeMap<String, bool>>, JsonRejection>,
) -> Result<Json<SaveSettingsResponse>> {
    let Json(changes) = payload.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

    let unknown: Vec<&str> = changes
        .keys()
        .filter(|id| !state.roster.contains(id))
        .map(String::as_str)
        .collect();
    if !unknown.is_empty() {
        return Err(AppError::BadRequest(format!(
            "Unknown participant IDs: {}",
            unknown.join(", ")
        )));
    }

    let settings = state
        .db
        .merge_participant_settings(&changes, &auth.uid, &now_rfc3339())
        .await?;

    tracing::info!(
        admin = %auth.uid,
        changed = changes.len(),
        "Saved participant settings"
    );

    Ok(Json(SaveSettingsResponse {
        message: "Participant settings saved".to_string(),
        settings: settings.resolve(
            state.roster.participants(),
            state.config.participants_enabled_by_default,
        ),
    }))
}
