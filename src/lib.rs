// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Club ranking: points leaderboards from synced Strava activities
//!
//! Athletes connect their Strava account and sync the current month. Each
//! Run or Walk earns one point, three on Thursdays, and the club ranking
//! sums points per athlete for each gender category.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::Db;
use services::{ActivitySyncer, StravaService};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Db,
    pub strava_service: StravaService,
    pub syncer: ActivitySyncer,
}

impl AppState {
    /// Wire services around a store.
    pub fn new(config: Config, db: Db) -> Self {
        let strava_service = StravaService::new(
            config.strava_client_id.clone(),
            config.strava_client_secret.clone(),
            db.clone(),
        );
        let syncer = ActivitySyncer::new(strava_service.clone(), db.clone());

        Self {
            config,
            db,
            strava_service,
            syncer,
        }
    }
}
