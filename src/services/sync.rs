// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity sync service.
//!
//! Handles the core workflow for one athlete and one calendar month:
//! 1. Fetch the month's activities from Strava (all pages, before any write)
//! 2. Dedupe, filter and score them
//! 3. Insert each positive score unless its activity ID is already stored
//! 4. Report how many rows were new

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::Db;
use crate::error::Result;
use crate::models::{Activity, AthleteIdentity};
use crate::services::scoring::{prepare_activities, score_batch, PipelineReport};
use crate::services::StravaService;
use crate::time_utils::ScoringWindow;

/// Everything a sync run needs to know about its caller.
///
/// Built per request from the authenticated session; nothing is read from
/// shared state during the run.
#[derive(Debug, Clone)]
pub struct ScoringContext {
    pub athlete: AthleteIdentity,
    pub access_token: String,
}

/// How a sync run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// No Run/Walk activities in the window; nothing was written
    NothingToScore,
    /// Everything scorable was already stored
    NoNewEntries,
    /// At least one new row was written
    NewEntries,
}

/// Result of a sync run.
#[derive(Debug, Clone, Serialize)]
pub struct SyncOutcome {
    pub status: SyncStatus,
    /// `true` iff `new_entries > 0`
    pub success: bool,
    pub new_entries: u32,
    pub report: PipelineReport,
}

/// Score `raw` for `athlete` and store the new rows.
///
/// Zero-point activities (unparseable dates) are never inserted.
pub async fn score_and_persist(
    db: &Db,
    athlete: &AthleteIdentity,
    raw: Vec<Activity>,
    now: DateTime<Utc>,
) -> Result<SyncOutcome> {
    let batch = prepare_activities(raw);

    tracing::info!(
        athlete_id = athlete.athlete_id,
        raw_total = batch.report.raw_total,
        unique_total = batch.report.unique_total,
        eligible_total = batch.report.eligible_total,
        by_weekday = ?batch.report.by_weekday,
        thursdays = batch.report.thursdays.len(),
        "Prepared activities for scoring"
    );

    if batch.eligible.is_empty() {
        tracing::info!(athlete_id = athlete.athlete_id, "No Run/Walk activities to score");
        return Ok(SyncOutcome {
            status: SyncStatus::NothingToScore,
            success: false,
            new_entries: 0,
            report: batch.report,
        });
    }

    let mut new_entries = 0u32;
    for score in score_batch(athlete, &batch.eligible, now) {
        if score.points == 0 {
            tracing::debug!(
                athlete_id = athlete.athlete_id,
                activity_id = score.activity_id,
                "Skipping zero-point activity"
            );
            continue;
        }

        if db.insert_score_if_absent(&score).await? {
            tracing::debug!(
                athlete_id = athlete.athlete_id,
                activity_id = score.activity_id,
                points = score.points,
                "Stored new score"
            );
            new_entries += 1;
        }
    }

    let status = if new_entries > 0 {
        SyncStatus::NewEntries
    } else {
        SyncStatus::NoNewEntries
    };

    tracing::info!(
        athlete_id = athlete.athlete_id,
        new_entries,
        "Sync finished"
    );

    Ok(SyncOutcome {
        status,
        success: new_entries > 0,
        new_entries,
        report: batch.report,
    })
}

/// Runs month syncs against Strava and the store.
#[derive(Clone)]
pub struct ActivitySyncer {
    strava: StravaService,
    db: Db,
}

impl ActivitySyncer {
    pub fn new(strava: StravaService, db: Db) -> Self {
        Self { strava, db }
    }

    /// Fetch and score every activity in `window`.
    ///
    /// A failed fetch returns the error before anything is written.
    pub async fn sync_window(
        &self,
        ctx: &ScoringContext,
        window: ScoringWindow,
    ) -> Result<SyncOutcome> {
        tracing::info!(
            athlete_id = ctx.athlete.athlete_id,
            after = window.after,
            before = window.before,
            "Fetching activities from Strava"
        );

        let activities = self
            .strava
            .client()
            .list_window_activities(&ctx.access_token, window)
            .await
            .inspect_err(|e| {
                tracing::warn!(
                    athlete_id = ctx.athlete.athlete_id,
                    error = %e,
                    "Strava fetch failed, aborting sync"
                );
                if e.is_strava_token_error() {
                    self.strava.invalidate_token(ctx.athlete.athlete_id);
                }
            })?;

        score_and_persist(&self.db, &ctx.athlete, activities, Utc::now()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryDb;
    use chrono::TimeZone;

    fn athlete() -> AthleteIdentity {
        AthleteIdentity {
            athlete_id: 77,
            firstname: "Marta".to_string(),
            lastname: "Vidal".to_string(),
            gender: "F".to_string(),
        }
    }

    fn act(id: u64, activity_type: &str, local: &str) -> Activity {
        Activity {
            id,
            activity_type: Some(activity_type.to_string()),
            start_date: None,
            start_date_local: Some(local.to_string()),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_thursday_and_friday_points() {
        let memory = MemoryDb::new();
        let db: Db = memory.clone().into();

        let thursday = score_and_persist(
            &db,
            &athlete(),
            vec![act(1, "Run", "2024-06-06T07:00:00")],
            now(),
        )
        .await
        .unwrap();
        assert!(thursday.success);
        assert_eq!(thursday.new_entries, 1);

        let friday = score_and_persist(
            &db,
            &athlete(),
            vec![act(2, "Run", "2024-06-07T07:00:00")],
            now(),
        )
        .await
        .unwrap();
        assert_eq!(friday.status, SyncStatus::NewEntries);

        let scores = memory.list_scores();
        assert_eq!(scores.len(), 2);
        assert_eq!(scores[0].points, 3);
        assert_eq!(scores[0].activity_date, "2024-06-06T07:00:00");
        assert_eq!(scores[0].date_scored, "2024-06-30T12:00:00Z");
        assert_eq!(scores[1].points, 1);
        assert_eq!(scores[1].firstname, "Marta");
    }

    #[tokio::test]
    async fn test_rescoring_is_idempotent() {
        let memory = MemoryDb::new();
        let db: Db = memory.clone().into();
        let batch = vec![act(1, "Run", "2024-06-06T07:00:00")];

        let first = score_and_persist(&db, &athlete(), batch.clone(), now())
            .await
            .unwrap();
        let second = score_and_persist(&db, &athlete(), batch, now())
            .await
            .unwrap();

        assert_eq!(first.new_entries, 1);
        assert_eq!(second.new_entries, 0);
        assert!(!second.success);
        assert_eq!(second.status, SyncStatus::NoNewEntries);
        assert_eq!(memory.list_scores().len(), 1);
    }

    #[tokio::test]
    async fn test_unparseable_date_not_persisted() {
        let memory = MemoryDb::new();
        let db: Db = memory.clone().into();

        let outcome = score_and_persist(
            &db,
            &athlete(),
            vec![act(3, "Run", "not-a-date")],
            now(),
        )
        .await
        .unwrap();

        assert_eq!(outcome.status, SyncStatus::NoNewEntries);
        assert_eq!(outcome.new_entries, 0);
        assert!(memory.list_scores().is_empty());
    }

    #[tokio::test]
    async fn test_disallowed_types_never_stored() {
        let memory = MemoryDb::new();
        let db: Db = memory.clone().into();

        let outcome = score_and_persist(
            &db,
            &athlete(),
            vec![
                act(4, "Ride", "2024-06-06T07:00:00"),
                act(5, "Swim", "2024-06-06T08:00:00"),
            ],
            now(),
        )
        .await
        .unwrap();

        assert_eq!(outcome.status, SyncStatus::NothingToScore);
        assert!(!outcome.success);
        assert!(memory.list_scores().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_ids_store_run_copy_once() {
        let memory = MemoryDb::new();
        let db: Db = memory.clone().into();

        let outcome = score_and_persist(
            &db,
            &athlete(),
            vec![
                act(6, "Walk", "2024-06-06T07:00:00"),
                act(6, "Run", "2024-06-06T07:00:00"),
            ],
            now(),
        )
        .await
        .unwrap();

        assert_eq!(outcome.new_entries, 1);
        assert_eq!(outcome.report.duplicates.get(&6), Some(&vec!["Run".to_string()]));
        assert_eq!(memory.list_scores().len(), 1);
    }

    #[tokio::test]
    async fn test_offline_store_error_propagates() {
        let db: Db = crate::db::FirestoreDb::new_mock().into();

        let err = score_and_persist(
            &db,
            &athlete(),
            vec![act(1, "Run", "2024-06-06T07:00:00")],
            now(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, crate::error::AppError::Database(_)));
    }
}
