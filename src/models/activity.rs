// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Activity models: the upstream Strava summary and the persisted score row.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Activity summary as returned by Strava's `/athlete/activities` endpoint.
///
/// Only the fields the scoring pipeline reads are modelled; everything else
/// in the payload is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    /// Strava activity ID
    pub id: u64,
    /// Activity type tag ("Run", "Walk", "Ride", ...)
    #[serde(rename = "type", default)]
    pub activity_type: Option<String>,
    /// Start time in UTC, `Z`-suffixed
    #[serde(default)]
    pub start_date: Option<String>,
    /// Start time in the athlete's local time, no offset
    #[serde(default)]
    pub start_date_local: Option<String>,
}

impl Activity {
    /// Type tag, or the empty string when Strava omitted it.
    pub fn type_str(&self) -> &str {
        self.activity_type.as_deref().unwrap_or("")
    }

    /// Reference timestamp string used for scoring: local time first.
    ///
    /// A blank local time counts as missing.
    pub fn reference_date(&self) -> Option<&str> {
        self.start_date_local
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or(self.start_date.as_deref())
    }
}

/// Scored activity stored in the `scores` collection.
///
/// One row per Strava activity ID. Identity fields are a snapshot taken at
/// scoring time and are never re-synced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ScoredActivity {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub athlete_id: u64,
    /// Strava activity ID (also used as document ID)
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub activity_id: u64,
    pub firstname: String,
    pub lastname: String,
    /// Gender code ("M", "F", or "N/A")
    pub gender: String,
    /// 1 on ordinary days, 3 on Thursdays
    pub points: u32,
    /// Resolved timestamp the weekday was computed from (ISO 8601)
    pub activity_date: String,
    /// When the row was written (RFC3339, UTC)
    pub date_scored: String,
}
