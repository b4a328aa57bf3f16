// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity scoring rules.
//!
//! Turns a raw month of Strava activities into score rows:
//! 1. Deduplicate by activity ID (a "Run" copy wins over any other type)
//! 2. Keep only allowed types (Run, Walk)
//! 3. Award points by weekday of the local start time (Thursday = 3, else 1)
//!
//! Everything here is pure; persistence lives in `services::sync`.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::models::{Activity, AthleteIdentity, ScoredActivity};
use crate::time_utils::format_utc_rfc3339;

/// Activity types that earn points.
pub const ALLOWED_ACTIVITY_TYPES: [&str; 2] = ["Run", "Walk"];

/// Type that wins when Strava reports the same activity ID twice.
pub const PREFERRED_ACTIVITY_TYPE: &str = "Run";

/// Weekday index (Monday = 0) of the bonus day.
pub const THURSDAY: u32 = 3;
pub const THURSDAY_POINTS: u32 = 3;
pub const NORMAL_POINTS: u32 = 1;

const WEEKDAY_NAMES: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Naive formats accepted for `start_date_local`.
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

// ─── Timestamps ──────────────────────────────────────────────

/// Resolved start time of an activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityTimestamp {
    /// Carried a `Z` or numeric offset
    Zoned(DateTime<FixedOffset>),
    /// Wall-clock time with no offset
    Local(NaiveDateTime),
}

impl ActivityTimestamp {
    /// Weekday index, Monday = 0 … Sunday = 6, in the timestamp's own clock.
    pub fn weekday_index(&self) -> u32 {
        match self {
            ActivityTimestamp::Zoned(dt) => dt.weekday().num_days_from_monday(),
            ActivityTimestamp::Local(dt) => dt.weekday().num_days_from_monday(),
        }
    }

    /// ISO 8601 rendering stored as `activity_date`.
    ///
    /// Zoned values keep their offset as `+HH:MM`; naive values have none.
    pub fn to_iso_string(&self) -> String {
        match self {
            ActivityTimestamp::Zoned(dt) => {
                dt.to_rfc3339_opts(chrono::SecondsFormat::AutoSi, false)
            }
            ActivityTimestamp::Local(dt) => dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string(),
        }
    }
}

/// Parse a Strava start date.
///
/// `Z`-suffixed or offset-bearing strings become zoned timestamps; anything
/// else is read as naive local time. A bare date means midnight.
pub fn parse_activity_timestamp(raw: &str) -> Option<ActivityTimestamp> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(ActivityTimestamp::Zoned(dt));
    }

    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(ActivityTimestamp::Local(dt));
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(ActivityTimestamp::Local)
}

// ─── Scoring ─────────────────────────────────────────────────

/// Points awarded to one activity and the timestamp they were computed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityScore {
    /// 0 when the start date could not be parsed
    pub points: u32,
    pub activity_date: String,
}

/// Points for a given weekday index.
pub fn points_for_weekday(weekday_index: u32) -> u32 {
    if weekday_index == THURSDAY {
        THURSDAY_POINTS
    } else {
        NORMAL_POINTS
    }
}

/// Score one activity.
///
/// An unparseable or missing start date scores 0 and records `now` (server
/// local time) as the activity date. Such activities are never stored.
pub fn score_activity(activity: &Activity, now: DateTime<Utc>) -> ActivityScore {
    match activity.reference_date().and_then(parse_activity_timestamp) {
        Some(ts) => ActivityScore {
            points: points_for_weekday(ts.weekday_index()),
            activity_date: ts.to_iso_string(),
        },
        None => {
            tracing::debug!(
                activity_id = activity.id,
                raw_date = ?activity.reference_date(),
                "Unparseable activity date, scoring 0"
            );
            let fallback = now.with_timezone(&chrono::Local).naive_local();
            ActivityScore {
                points: 0,
                activity_date: ActivityTimestamp::Local(fallback).to_iso_string(),
            }
        }
    }
}

/// Score every eligible activity into rows for `athlete`.
///
/// Zero-point results are included; callers decide what to persist.
pub fn score_batch(
    athlete: &AthleteIdentity,
    eligible: &[Activity],
    now: DateTime<Utc>,
) -> Vec<ScoredActivity> {
    let date_scored = format_utc_rfc3339(now);
    eligible
        .iter()
        .map(|activity| {
            let score = score_activity(activity, now);
            ScoredActivity {
                athlete_id: athlete.athlete_id,
                activity_id: activity.id,
                firstname: athlete.firstname.clone(),
                lastname: athlete.lastname.clone(),
                gender: athlete.gender.clone(),
                points: score.points,
                activity_date: score.activity_date,
                date_scored: date_scored.clone(),
            }
        })
        .collect()
}

// ─── Dedup & Filter ──────────────────────────────────────────

/// Result of collapsing repeated activity IDs.
#[derive(Debug, Clone, Default)]
pub struct Deduplicated {
    /// One record per ID, in first-seen order
    pub activities: Vec<Activity>,
    /// Types of the repeated records, per repeated ID
    pub duplicates: BTreeMap<u64, Vec<String>>,
}

/// Collapse records sharing an activity ID.
///
/// The first record seen for an ID is kept unless a later one has a
/// different type that is "Run" while the kept one is not.
pub fn dedupe_activities(activities: Vec<Activity>) -> Deduplicated {
    let mut kept: Vec<Activity> = Vec::with_capacity(activities.len());
    let mut index_by_id: HashMap<u64, usize> = HashMap::new();
    let mut duplicates: BTreeMap<u64, Vec<String>> = BTreeMap::new();

    for activity in activities {
        match index_by_id.get(&activity.id) {
            Some(&idx) => {
                duplicates
                    .entry(activity.id)
                    .or_default()
                    .push(activity.type_str().to_string());

                let existing = &kept[idx];
                if existing.activity_type != activity.activity_type
                    && activity.type_str() == PREFERRED_ACTIVITY_TYPE
                    && existing.type_str() != PREFERRED_ACTIVITY_TYPE
                {
                    kept[idx] = activity;
                }
            }
            None => {
                index_by_id.insert(activity.id, kept.len());
                kept.push(activity);
            }
        }
    }

    Deduplicated {
        activities: kept,
        duplicates,
    }
}

/// Whether an activity type earns points.
pub fn is_allowed_type(activity_type: &str) -> bool {
    ALLOWED_ACTIVITY_TYPES.contains(&activity_type)
}

/// Drop every activity whose type is not allowed.
pub fn filter_allowed(activities: Vec<Activity>) -> Vec<Activity> {
    activities
        .into_iter()
        .filter(|a| is_allowed_type(a.type_str()))
        .collect()
}

// ─── Diagnostics ─────────────────────────────────────────────

/// A Thursday activity found in the eligible set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThursdayActivity {
    pub id: u64,
    pub date: String,
    pub activity_type: String,
}

/// What happened to a raw batch on its way to scoring.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineReport {
    pub raw_total: usize,
    /// Count per type as received
    pub raw_types: BTreeMap<String, u32>,
    pub unique_total: usize,
    /// Count per type after dedup
    pub deduped_types: BTreeMap<String, u32>,
    pub duplicates: BTreeMap<u64, Vec<String>>,
    /// Activities left after the type filter
    pub eligible_total: usize,
    /// Eligible activities per weekday, keyed "Mon".."Sun"
    pub by_weekday: BTreeMap<String, u32>,
    pub thursdays: Vec<ThursdayActivity>,
}

/// Eligible activities plus the report describing how they were chosen.
#[derive(Debug, Clone, Default)]
pub struct PreparedBatch {
    pub eligible: Vec<Activity>,
    pub report: PipelineReport,
}

fn count_types(activities: &[Activity]) -> BTreeMap<String, u32> {
    let mut counts = BTreeMap::new();
    for activity in activities {
        *counts.entry(activity.type_str().to_string()).or_insert(0) += 1;
    }
    counts
}

/// Dedupe and filter a raw batch, collecting diagnostics along the way.
pub fn prepare_activities(raw: Vec<Activity>) -> PreparedBatch {
    let raw_total = raw.len();
    let raw_types = count_types(&raw);

    let deduped = dedupe_activities(raw);
    if !deduped.duplicates.is_empty() {
        tracing::warn!(duplicates = ?deduped.duplicates, "Duplicate activity IDs from Strava");
    }

    let unique_total = deduped.activities.len();
    let deduped_types = count_types(&deduped.activities);
    let eligible = filter_allowed(deduped.activities);

    let mut by_weekday = BTreeMap::new();
    let mut thursdays = Vec::new();
    for activity in &eligible {
        // Unparseable dates are left out of the weekday breakdown
        let Some(ts) = activity.reference_date().and_then(parse_activity_timestamp) else {
            continue;
        };
        let weekday = ts.weekday_index();
        *by_weekday
            .entry(WEEKDAY_NAMES[weekday as usize].to_string())
            .or_insert(0) += 1;
        if weekday == THURSDAY {
            thursdays.push(ThursdayActivity {
                id: activity.id,
                date: ts.to_iso_string(),
                activity_type: activity.type_str().to_string(),
            });
        }
    }

    let report = PipelineReport {
        raw_total,
        raw_types,
        unique_total,
        deduped_types,
        duplicates: deduped.duplicates,
        eligible_total: eligible.len(),
        by_weekday,
        thursdays,
    };

    PreparedBatch { eligible, report }
}
