// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! CARD voting backend
//!
//! REST API for the 3 Minute Thesis audience vote: signed-in users give each
//! presenter a yes/no verdict with an intensity, and everyone can watch the
//! standings.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::Database;
use services::{GoogleIdTokenVerifier, RosterService};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Database,
    pub roster: RosterService,
    pub google_verifier: Arc<GoogleIdTokenVerifier>,
}
