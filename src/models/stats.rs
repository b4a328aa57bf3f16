//! Club-wide counters shown under the leaderboards.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::models::ScoredActivity;

/// Totals over every stored score row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClubSummary {
    /// Number of stored score rows
    pub scored_rows: u32,
    /// Distinct (athlete, calendar day) pairs.
    ///
    /// A Run and a Walk on the same day by the same athlete count once.
    pub unique_athlete_days: u32,
}

impl ClubSummary {
    pub fn from_scores(scores: &[ScoredActivity]) -> Self {
        let days: HashSet<(u64, &str)> = scores
            .iter()
            .map(|s| (s.athlete_id, extract_day_key(&s.activity_date)))
            .collect();

        Self {
            scored_rows: scores.len() as u32,
            unique_athlete_days: days.len() as u32,
        }
    }
}

/// Extract "YYYY-MM-DD" from an ISO 8601 date string.
fn extract_day_key(date: &str) -> &str {
    // "2024-06-06T07:00:00+00:00" -> "2024-06-06"
    date.get(..10).unwrap_or(date)
}
