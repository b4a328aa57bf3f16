// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Athlete identity carried through a scoring run.

use serde::{Deserialize, Serialize};
use std::fmt;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Gender code stored when Strava does not share one.
pub const UNKNOWN_GENDER: &str = "N/A";

/// Ranking categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum Gender {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
}

impl Gender {
    /// Code as stored on score rows.
    pub fn code(self) -> &'static str {
        match self {
            Gender::Male => "M",
            Gender::Female => "F",
        }
    }

    /// Parse a stored code. Anything but "M"/"F" is unranked.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "M" => Some(Gender::Male),
            "F" => Some(Gender::Female),
            _ => None,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Who a scoring run is for. Snapshotted onto every row it writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AthleteIdentity {
    pub athlete_id: u64,
    pub firstname: String,
    pub lastname: String,
    /// Raw gender code ("M", "F", "N/A")
    pub gender: String,
}

impl AthleteIdentity {
    /// Build an identity from a display name such as "Ana María López".
    ///
    /// The first whitespace-separated token becomes the first name and the
    /// last token the last name; a single-word name fills both.
    pub fn from_display_name(athlete_id: u64, display_name: &str, gender: Option<&str>) -> Self {
        let (firstname, lastname) = split_display_name(display_name);
        Self {
            athlete_id,
            firstname,
            lastname,
            gender: normalize_gender(gender),
        }
    }
}

/// Split a display name into (first, last) on whitespace.
pub fn split_display_name(display_name: &str) -> (String, String) {
    let mut parts = display_name.split_whitespace();
    let first = parts.next().unwrap_or("");
    let last = parts.last().unwrap_or(first);
    (first.to_string(), last.to_string())
}

/// Map Strava's optional `sex` field to a stored gender code.
pub fn normalize_gender(sex: Option<&str>) -> String {
    match sex.map(str::trim) {
        Some(code) if !code.is_empty() => code.to_string(),
        _ => UNKNOWN_GENDER.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_two_part_name() {
        assert_eq!(
            split_display_name("Lucia Fernandez"),
            ("Lucia".to_string(), "Fernandez".to_string())
        );
    }

    #[test]
    fn test_split_uses_first_and_last_tokens() {
        assert_eq!(
            split_display_name("Ana  Maria   Lopez"),
            ("Ana".to_string(), "Lopez".to_string())
        );
    }

    #[test]
    fn test_split_single_token_fills_both() {
        assert_eq!(
            split_display_name("Cher"),
            ("Cher".to_string(), "Cher".to_string())
        );
    }

    #[test]
    fn test_split_empty_name() {
        assert_eq!(split_display_name("   "), (String::new(), String::new()));
    }

    #[test]
    fn test_missing_gender_is_unknown() {
        let identity = AthleteIdentity::from_display_name(1, "Jo Doe", None);
        assert_eq!(identity.gender, UNKNOWN_GENDER);

        let identity = AthleteIdentity::from_display_name(1, "Jo Doe", Some(""));
        assert_eq!(identity.gender, UNKNOWN_GENDER);

        let identity = AthleteIdentity::from_display_name(1, "Jo Doe", Some("F"));
        assert_eq!(identity.gender, "F");
    }

    #[test]
    fn test_gender_codes() {
        assert_eq!(Gender::from_code("M"), Some(Gender::Male));
        assert_eq!(Gender::from_code("F"), Some(Gender::Female));
        assert_eq!(Gender::from_code("N/A"), None);
        assert_eq!(Gender::Female.to_string(), "F");

        let parsed: Gender = serde_json::from_str("\"M\"").unwrap();
        assert_eq!(parsed, Gender::Male);
    }
}
