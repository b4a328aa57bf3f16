// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting and the monthly scoring window.

use chrono::{DateTime, Datelike, NaiveDate, SecondsFormat, TimeZone, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Calendar-month fetch window as Unix timestamps, both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringWindow {
    /// First day of the month, 00:00:00
    pub after: i64,
    /// Last day of the month, 23:59:59
    pub before: i64,
}

/// Window covering the calendar month that contains `today`, in `tz`.
///
/// Returns `None` only if the month boundaries do not exist in `tz`
/// (a DST gap exactly at midnight on the 1st).
pub fn month_window<Tz: TimeZone>(today: NaiveDate, tz: &Tz) -> Option<ScoringWindow> {
    let first = today.with_day(1)?;
    let last = last_day_of_month(today)?;

    let start = tz
        .from_local_datetime(&first.and_hms_opt(0, 0, 0)?)
        .earliest()?;
    let end = tz
        .from_local_datetime(&last.and_hms_opt(23, 59, 59)?)
        .latest()?;

    Some(ScoringWindow {
        after: start.timestamp(),
        before: end.timestamp(),
    })
}

/// Window for the current month in the server's local timezone.
pub fn current_month_window() -> Option<ScoringWindow> {
    month_window(chrono::Local::now().date_naive(), &chrono::Local)
}

fn last_day_of_month(date: NaiveDate) -> Option<NaiveDate> {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)?.pred_opt()
}
