// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! End-to-end scoring: raw Strava JSON in, stored rows and leaderboard out.

use chrono::{TimeZone, Utc};
use club_ranking::db::{Db, MemoryDb};
use club_ranking::models::{Activity, AthleteIdentity, Gender};
use club_ranking::services::build_ranking;
use club_ranking::services::sync::{score_and_persist, SyncStatus};

fn parse(json: &str) -> Vec<Activity> {
    serde_json::from_str(json).expect("Invalid activity JSON")
}

fn athlete(athlete_id: u64, name: &str, gender: &str) -> AthleteIdentity {
    AthleteIdentity::from_display_name(athlete_id, name, Some(gender))
}

#[tokio::test]
async fn test_month_of_activities() {
    let memory = MemoryDb::new();
    let db: Db = memory.clone().into();
    let now = Utc.with_ymd_and_hms(2024, 6, 30, 20, 0, 0).unwrap();

    // Thursday run reported twice (once as Walk), a Friday walk, a ride,
    // and a run with a broken date.
    let raw = parse(
        r#"[
            {"id": 101, "type": "Walk", "start_date": "2024-06-06T05:00:00Z", "start_date_local": "2024-06-06T07:00:00"},
            {"id": 101, "type": "Run",  "start_date": "2024-06-06T05:00:00Z", "start_date_local": "2024-06-06T07:00:00"},
            {"id": 102, "type": "Walk", "start_date": "2024-06-07T16:00:00Z", "start_date_local": "2024-06-07T18:00:00"},
            {"id": 103, "type": "Ride", "start_date": "2024-06-13T05:00:00Z", "start_date_local": "2024-06-13T07:00:00"},
            {"id": 104, "type": "Run",  "start_date_local": "not-a-date"}
        ]"#,
    );

    let outcome = score_and_persist(&db, &athlete(9, "Marta Vidal", "F"), raw, now)
        .await
        .unwrap();

    assert_eq!(outcome.status, SyncStatus::NewEntries);
    assert!(outcome.success);
    assert_eq!(outcome.new_entries, 2);
    assert_eq!(outcome.report.raw_total, 5);
    assert_eq!(outcome.report.unique_total, 4);
    assert_eq!(outcome.report.eligible_total, 3);

    let scores = memory.list_scores();
    let stored: Vec<(u64, u32)> = scores.iter().map(|s| (s.activity_id, s.points)).collect();
    assert_eq!(stored, vec![(101, 3), (102, 1)]);
    assert!(scores.iter().all(|s| s.firstname == "Marta" && s.lastname == "Vidal"));

    let ranking = build_ranking(&scores, Gender::Female);
    assert_eq!(ranking.len(), 1);
    assert_eq!(ranking[0].total_points, 4);
}

#[tokio::test]
async fn test_second_sync_reports_nothing_new() {
    let memory = MemoryDb::new();
    let db: Db = memory.clone().into();
    let now = Utc.with_ymd_and_hms(2024, 6, 30, 20, 0, 0).unwrap();
    let raw = parse(r#"[{"id": 1, "type": "Run", "start_date_local": "2024-06-06T07:00:00"}]"#);

    let first = score_and_persist(&db, &athlete(9, "Marta Vidal", "F"), raw.clone(), now)
        .await
        .unwrap();
    assert_eq!(first.new_entries, 1);

    let second = score_and_persist(&db, &athlete(9, "Marta Vidal", "F"), raw, now)
        .await
        .unwrap();
    assert_eq!(second.status, SyncStatus::NoNewEntries);
    assert!(!second.success);
    assert_eq!(memory.list_scores().len(), 1);
}

#[tokio::test]
async fn test_two_athletes_share_the_leaderboard() {
    let memory = MemoryDb::new();
    let db: Db = memory.clone().into();
    let now = Utc.with_ymd_and_hms(2024, 6, 30, 20, 0, 0).unwrap();

    score_and_persist(
        &db,
        &athlete(1, "Luis Gil", "M"),
        parse(r#"[{"id": 1, "type": "Run", "start_date_local": "2024-06-06T07:00:00"}]"#),
        now,
    )
    .await
    .unwrap();
    score_and_persist(
        &db,
        &athlete(2, "Pablo Ruiz", "M"),
        parse(
            r#"[
                {"id": 2, "type": "Run",  "start_date_local": "2024-06-03T07:00:00"},
                {"id": 3, "type": "Walk", "start_date_local": "2024-06-04T07:00:00"},
                {"id": 4, "type": "Walk", "start_date_local": "2024-06-05T07:00:00"}
            ]"#,
        ),
        now,
    )
    .await
    .unwrap();

    let ranking = build_ranking(&memory.list_scores(), Gender::Male);
    let ranks: Vec<(u32, &str, u32)> = ranking
        .iter()
        .map(|e| (e.rank, e.lastname.as_str(), e.total_points))
        .collect();
    assert_eq!(ranks, vec![(1, "Gil", 3), (1, "Ruiz", 3)]);
}
