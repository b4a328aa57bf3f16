// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated athletes.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::AthleteIdentity;
use crate::services::{ScoringContext, SyncOutcome};
use crate::time_utils::current_month_window;
use crate::AppState;
use axum::{
    extract::State,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me))
        .route("/api/sync", post(sync_activities))
}

// ─── User Profile ────────────────────────────────────────────

/// Current user response.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserResponse {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub athlete_id: u64,
    pub firstname: String,
    pub lastname: String,
    pub gender: String,
    pub profile_picture: Option<String>,
}

/// Get current user profile.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UserResponse>> {
    let profile = state
        .db
        .get_user(user.athlete_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user.athlete_id)))?;

    Ok(Json(UserResponse {
        athlete_id: profile.strava_athlete_id,
        firstname: profile.firstname,
        lastname: profile.lastname,
        gender: profile.gender,
        profile_picture: profile.profile_picture,
    }))
}

// ─── Sync ────────────────────────────────────────────────────

/// Sync and score the current month's activities for the caller.
async fn sync_activities(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<SyncOutcome>> {
    let profile = state
        .db
        .get_user(user.athlete_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user.athlete_id)))?;

    // No stored tokens means the athlete has to log in with Strava again
    let access_token = match state
        .strava_service
        .get_valid_access_token(user.athlete_id)
        .await
    {
        Ok(token) => token,
        Err(AppError::NotFound(_)) => return Err(AppError::Unauthorized),
        Err(e) if e.is_strava_token_error() => return Err(AppError::InvalidToken),
        Err(e) => return Err(e),
    };

    let ctx = ScoringContext {
        athlete: AthleteIdentity::from_display_name(
            user.athlete_id,
            &profile.display_name(),
            Some(&profile.gender),
        ),
        access_token,
    };

    let window = current_month_window().ok_or_else(|| {
        AppError::Internal(anyhow::anyhow!("Current month has no valid local boundaries"))
    })?;

    let outcome = match state.syncer.sync_window(&ctx, window).await {
        Ok(outcome) => outcome,
        Err(e) if e.is_strava_token_error() => return Err(AppError::InvalidToken),
        Err(e) => return Err(e),
    };

    tracing::info!(
        athlete_id = user.athlete_id,
        status = ?outcome.status,
        new_entries = outcome.new_entries,
        "Sync request completed"
    );

    Ok(Json(outcome))
}
