// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod activity;
pub mod athlete;
pub mod ranking;
pub mod stats;
pub mod user;

pub use activity::{Activity, ScoredActivity};
pub use athlete::{AthleteIdentity, Gender};
pub use ranking::RankingEntry;
pub use stats::ClubSummary;
pub use user::{User, UserTokens};
