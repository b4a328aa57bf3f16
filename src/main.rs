// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Club Ranking API Server
//!
//! Syncs club members' Strava activities, scores them, and serves the
//! monthly leaderboards.

use club_ranking::{
    config::{Config, StoreBackend},
    db::{Db, FirestoreDb, MemoryDb},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging()?;

    let config = Config::from_env()?;
    tracing::info!(port = config.port, backend = ?config.store_backend, "Starting Club Ranking API");

    let db: Db = match config.store_backend {
        StoreBackend::Firestore => FirestoreDb::new(&config.gcp_project_id).await?.into(),
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; scores are lost on restart");
            MemoryDb::new().into()
        }
    };

    let state = Arc::new(AppState::new(config.clone(), db));

    let app = club_ranking::routes::create_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("club_ranking=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
