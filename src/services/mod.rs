// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod ranking;
pub mod scoring;
pub mod strava;
pub mod sync;

pub use ranking::build_ranking;
pub use strava::{OAuthResult, StravaClient, StravaService};
pub use sync::{ActivitySyncer, ScoringContext, SyncOutcome, SyncStatus};
