//! User model for storage and API.

use serde::{Deserialize, Serialize};

/// Athlete profile stored in Firestore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Strava athlete ID (also used as document ID)
    pub strava_athlete_id: u64,
    /// First name
    pub firstname: String,
    /// Last name
    pub lastname: String,
    /// Gender code from Strava's `sex` field ("M", "F", "N/A")
    pub gender: String,
    /// Profile picture URL
    pub profile_picture: Option<String>,
    /// When user first connected
    pub created_at: String,
    /// Last login timestamp
    pub last_active: String,
}

impl User {
    /// Display name as shown on the dashboard ("First Last").
    pub fn display_name(&self) -> String {
        format!("{} {}", self.firstname, self.lastname)
    }
}

/// User's OAuth tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserTokens {
    pub access_token: String,
    pub refresh_token: String,
    /// When the access token expires (RFC3339)
    pub expires_at: String,
    /// Granted OAuth scopes
    pub scopes: Vec<String>,
}
