// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process store with the same contract as Firestore.
//!
//! Used for local development (`STORE_BACKEND=memory`) and tests.
//! Contents are lost on restart.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

use crate::models::{ScoredActivity, User, UserTokens};

#[derive(Clone, Default)]
pub struct MemoryDb {
    scores: Arc<DashMap<u64, ScoredActivity>>,
    users: Arc<DashMap<u64, User>>,
    tokens: Arc<DashMap<u64, UserTokens>>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the row was added.
    pub fn insert_score_if_absent(&self, score: &ScoredActivity) -> bool {
        match self.scores.entry(score.activity_id) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(score.clone());
                true
            }
        }
    }

    /// All rows, ordered by activity ID.
    pub fn list_scores(&self) -> Vec<ScoredActivity> {
        let mut scores: Vec<ScoredActivity> =
            self.scores.iter().map(|e| e.value().clone()).collect();
        scores.sort_by_key(|s| s.activity_id);
        scores
    }

    pub fn get_user(&self, athlete_id: u64) -> Option<User> {
        self.users.get(&athlete_id).map(|u| u.clone())
    }

    pub fn upsert_user(&self, user: &User) {
        self.users.insert(user.strava_athlete_id, user.clone());
    }

    pub fn get_tokens(&self, athlete_id: u64) -> Option<UserTokens> {
        self.tokens.get(&athlete_id).map(|t| t.clone())
    }

    pub fn set_tokens(&self, athlete_id: u64, tokens: &UserTokens) {
        self.tokens.insert(athlete_id, tokens.clone());
    }
}
