// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Leaderboard aggregation over stored score rows.

use std::collections::HashMap;

use crate::models::{Gender, RankingEntry, ScoredActivity};

/// Build the leaderboard for one gender.
///
/// Points are summed per (firstname, lastname) and ranked with competition
/// ranking: tied totals share a rank and the next distinct total gets
/// `1 + number of athletes ahead of it`. Equal totals are listed by last
/// name, then first name.
pub fn build_ranking(scores: &[ScoredActivity], gender: Gender) -> Vec<RankingEntry> {
    let mut totals: HashMap<(&str, &str), u32> = HashMap::new();
    for score in scores.iter().filter(|s| s.gender == gender.code()) {
        *totals
            .entry((score.firstname.as_str(), score.lastname.as_str()))
            .or_insert(0) += score.points;
    }

    let mut totals: Vec<((&str, &str), u32)> = totals.into_iter().collect();
    totals.sort_by(|((first_a, last_a), total_a), ((first_b, last_b), total_b)| {
        total_b
            .cmp(total_a)
            .then_with(|| last_a.cmp(last_b))
            .then_with(|| first_a.cmp(first_b))
    });

    let mut entries = Vec::with_capacity(totals.len());
    let mut rank = 0;
    let mut previous_total = None;
    for (position, ((firstname, lastname), total)) in totals.into_iter().enumerate() {
        if previous_total != Some(total) {
            rank = position as u32 + 1;
            previous_total = Some(total);
        }
        entries.push(RankingEntry {
            rank,
            firstname: firstname.to_string(),
            lastname: lastname.to_string(),
            total_points: total,
        });
    }

    entries
}
