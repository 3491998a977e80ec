// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! CARD Voting API Server
//!
//! Backend for the CARD 2025 3 Minute Thesis audience vote: Google sign-in,
//! one vote per voter per presenter, and live standings.

use card_voting::{
    config::Config,
    db::Database,
    services::{GoogleIdTokenVerifier, RosterService},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        backend = ?config.storage_backend,
        "Starting CARD voting API"
    );

    let db = Database::connect(&config).await?;
    tracing::info!(backend = db.backend_name(), "Storage initialized");

    let roster = match &config.participants_file {
        Some(path) => {
            tracing::info!(path = %path.display(), "Loading participant roster");
            RosterService::load_from_file(path)?
        }
        None => RosterService::builtin(),
    };
    tracing::info!(count = roster.participants().len(), "Participant roster loaded");

    let google_verifier = Arc::new(GoogleIdTokenVerifier::new(&config)?);

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        roster,
        google_verifier,
    });

    // Build router
    let app = card_voting::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("card_voting=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
