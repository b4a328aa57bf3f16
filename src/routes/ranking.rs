// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Public leaderboard routes.

use crate::error::Result;
use crate::models::{ClubSummary, Gender, RankingEntry};
use crate::services::build_ranking;
use crate::AppState;
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/ranking", get(get_ranking))
        .route("/api/summary", get(get_summary))
}

#[derive(Deserialize)]
struct RankingQuery {
    gender: Gender,
}

/// Leaderboard for one gender: `GET /api/ranking?gender=M|F`.
async fn get_ranking(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RankingQuery>,
) -> Result<Json<Vec<RankingEntry>>> {
    let scores = state.db.list_scores().await?;
    let ranking = build_ranking(&scores, query.gender);

    tracing::debug!(
        gender = %query.gender,
        rows = scores.len(),
        athletes = ranking.len(),
        "Built ranking"
    );

    Ok(Json(ranking))
}

/// Club-wide totals.
async fn get_summary(State(state): State<Arc<AppState>>) -> Result<Json<ClubSummary>> {
    let scores = state.db.list_scores().await?;
    Ok(Json(ClubSummary::from_scores(&scores)))
}
