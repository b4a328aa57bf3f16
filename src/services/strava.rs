// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava API client for listing activities and managing OAuth tokens.
//!
//! Handles:
//! - Listing an athlete's activities inside a time window
//! - OAuth code exchange and token refresh
//! - Rate limit and token error detection

use crate::error::AppError;
use crate::models::Activity;
use crate::time_utils::ScoringWindow;
use serde::Deserialize;

const STRAVA_BASE_URL: &str = "https://www.strava.com";

/// Largest page Strava will serve for `/athlete/activities`.
pub const MAX_PER_PAGE: u32 = 200;

/// Stop paginating after this many pages; a month never gets close.
const MAX_PAGES: u32 = 20;

/// Strava API client.
#[derive(Clone)]
pub struct StravaClient {
    http: reqwest::Client,
    api_url: String,
    token_url: String,
    client_id: String,
    client_secret: String,
}

impl StravaClient {
    /// Create a new Strava client with OAuth credentials.
    pub fn new(client_id: String, client_secret: String) -> Self {
        Self::with_base_url(client_id, client_secret, STRAVA_BASE_URL)
    }

    /// Client against another Strava-compatible origin, e.g. a local stub.
    ///
    /// The API lives under `{base_url}/api/v3` and the token endpoint at
    /// `{base_url}/oauth/token`.
    pub fn with_base_url(client_id: String, client_secret: String, base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/');
        Self {
            http: reqwest::Client::new(),
            api_url: format!("{}/api/v3", base_url),
            token_url: format!("{}/oauth/token", base_url),
            client_id,
            client_secret,
        }
    }

    /// List one page of the athlete's activities inside `window`.
    pub async fn list_activities(
        &self,
        access_token: &str,
        window: ScoringWindow,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Activity>, AppError> {
        let url = format!("{}/athlete/activities", self.api_url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .query(&[
                ("after", window.after.to_string()),
                ("before", window.before.to_string()),
                ("page", page.to_string()),
                ("per_page", per_page.to_string()),
            ])
            .send()
            .await
            .map_err(|e| AppError::StravaApi(e.to_string()))?;

        self.check_response_json(response).await
    }

    /// List every activity inside `window`, following pages until a short one.
    ///
    /// Any failed page fails the whole listing.
    pub async fn list_window_activities(
        &self,
        access_token: &str,
        window: ScoringWindow,
    ) -> Result<Vec<Activity>, AppError> {
        let mut all = Vec::new();

        for page in 1..=MAX_PAGES {
            let batch = self
                .list_activities(access_token, window, page, MAX_PER_PAGE)
                .await?;
            let fetched = batch.len() as u32;
            all.extend(batch);

            if fetched < MAX_PER_PAGE {
                break;
            }
            if page == MAX_PAGES {
                tracing::warn!(pages = MAX_PAGES, "Stopped paginating Strava activities");
            }
        }

        Ok(all)
    }

    /// Refresh an expired access token.
    pub async fn refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenRefreshResponse, AppError> {
        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(|e| AppError::StravaApi(format!("Token refresh request failed: {}", e)))?;

        // Strava answers 400 for a revoked or unknown refresh token
        if response.status() == reqwest::StatusCode::BAD_REQUEST {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(body = %body, "Strava rejected refresh token");
            return Err(AppError::StravaApi(AppError::STRAVA_TOKEN_ERROR.to_string()));
        }

        self.check_response_json(response).await
    }

    /// Exchange an authorization code for tokens and the athlete profile.
    pub async fn exchange_code(&self, code: &str) -> Result<StravaTokenExchangeResponse, AppError> {
        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| AppError::StravaApi(format!("Token exchange failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Strava token exchange failed");
            return Err(AppError::StravaApi(format!(
                "Token exchange failed with status {}",
                status
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::StravaApi(format!("Failed to parse token response: {}", e)))
    }

    /// Check response and parse JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status.as_u16(), &body));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::StravaApi(format!("JSON parse error: {}", e)))
    }
}

/// Map a non-success Strava status to an error.
fn status_error(status: u16, body: &str) -> AppError {
    match status {
        429 => {
            tracing::warn!("Strava rate limit hit (429)");
            AppError::StravaApi(AppError::STRAVA_RATE_LIMIT.to_string())
        }
        401 => AppError::StravaApi(AppError::STRAVA_TOKEN_ERROR.to_string()),
        _ => AppError::StravaApi(format!("HTTP {}: {}", status, body)),
    }
}

/// Token refresh response from Strava.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenRefreshResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: i64,
}

/// Token exchange response from Strava OAuth (includes athlete info).
#[derive(Debug, Clone, Deserialize)]
pub struct StravaTokenExchangeResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: i64,
    pub athlete: StravaAthlete,
}

/// Athlete info from OAuth token exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct StravaAthlete {
    pub id: u64,
    #[serde(default)]
    pub firstname: String,
    #[serde(default)]
    pub lastname: String,
    /// "M", "F", or absent
    #[serde(default)]
    pub sex: Option<String>,
    #[serde(default)]
    pub profile: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// StravaService - High-level service with token management
// ─────────────────────────────────────────────────────────────────────────────

use crate::db::Db;
use crate::models::athlete::normalize_gender;
use crate::models::{User, UserTokens};
use crate::time_utils::format_utc_rfc3339;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Refresh tokens this close to expiry.
const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;

/// OAuth scopes requested at login.
pub const OAUTH_SCOPES: &str = "activity:read_all,profile:read_all";

/// Cached access token with expiry information.
#[derive(Clone)]
pub struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

/// Shared token cache type for use in AppState.
pub type TokenCache = Arc<DashMap<u64, CachedToken>>;

/// Shared refresh locks type for use in AppState.
pub type RefreshLocks = Arc<DashMap<u64, Arc<Mutex<()>>>>;

/// High-level Strava service that manages token lifecycle and API calls.
///
/// This service encapsulates:
/// - Token retrieval from the store
/// - Automatic token refresh shortly before expiry
/// - In-memory token caching
/// - Per-user locking to prevent duplicate refresh calls
#[derive(Clone)]
pub struct StravaService {
    client: StravaClient,
    db: Db,
    token_cache: TokenCache,
    refresh_locks: RefreshLocks,
}

impl StravaService {
    pub fn new(client_id: String, client_secret: String, db: Db) -> Self {
        Self::with_client(StravaClient::new(client_id, client_secret), db)
    }

    /// Service around an already configured client.
    pub fn with_client(client: StravaClient, db: Db) -> Self {
        Self {
            client,
            db,
            token_cache: Arc::new(DashMap::new()),
            refresh_locks: Arc::new(DashMap::new()),
        }
    }

    /// Underlying API client.
    pub fn client(&self) -> &StravaClient {
        &self.client
    }

    // ─── Token Management ────────────────────────────────────────────────────

    /// Get a valid (non-expired) access token for the given athlete.
    ///
    /// Checks the in-memory cache, then the store, and refreshes with Strava
    /// when the stored token is about to expire. Refreshes are serialized per
    /// athlete.
    pub async fn get_valid_access_token(&self, athlete_id: u64) -> Result<String, AppError> {
        let now = Utc::now();
        let margin = Duration::seconds(TOKEN_REFRESH_MARGIN_SECS);

        if let Some(cached) = self.token_cache.get(&athlete_id) {
            if now + margin < cached.expires_at {
                return Ok(cached.access_token.clone());
            }
        }

        let lock = self
            .refresh_locks
            .entry(athlete_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock().await;

        // Another task may have refreshed while we were waiting.
        if let Some(cached) = self.token_cache.get(&athlete_id) {
            if now + margin < cached.expires_at {
                return Ok(cached.access_token.clone());
            }
        }

        let tokens = self
            .db
            .get_tokens(athlete_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Tokens for athlete {}", athlete_id)))?;

        let expires_at = DateTime::parse_from_rfc3339(&tokens.expires_at)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to parse expiry: {}", e)))?
            .with_timezone(&Utc);

        if now + margin < expires_at {
            self.cache_token(athlete_id, &tokens.access_token, expires_at);
            return Ok(tokens.access_token);
        }

        tracing::info!(athlete_id, "Access token expired, refreshing");

        let new_tokens = self.client.refresh_token(&tokens.refresh_token).await?;
        let new_expires_at = DateTime::from_timestamp(new_tokens.expires_at, 0).unwrap_or(now);

        let updated_tokens = UserTokens {
            access_token: new_tokens.access_token.clone(),
            refresh_token: new_tokens.refresh_token,
            expires_at: format_utc_rfc3339(new_expires_at),
            scopes: tokens.scopes,
        };
        self.db.set_tokens(athlete_id, &updated_tokens).await?;
        self.cache_token(athlete_id, &new_tokens.access_token, new_expires_at);

        tracing::info!(athlete_id, "Token refreshed and cached");
        Ok(new_tokens.access_token)
    }

    /// Forget the cached access token so the next lookup reads the store.
    pub fn invalidate_token(&self, athlete_id: u64) {
        if self.token_cache.remove(&athlete_id).is_some() {
            tracing::debug!(athlete_id, "Dropped cached access token");
        }
    }

    fn cache_token(&self, athlete_id: u64, access_token: &str, expires_at: DateTime<Utc>) {
        self.token_cache.insert(
            athlete_id,
            CachedToken {
                access_token: access_token.to_string(),
                expires_at,
            },
        );
    }

    // ─── OAuth Callback Handling ─────────────────────────────────────────────

    /// Handle OAuth callback: exchange code for tokens, store user and tokens.
    pub async fn handle_oauth_callback(&self, code: &str) -> Result<OAuthResult, AppError> {
        let token_response = self.client.exchange_code(code).await?;

        let athlete = token_response.athlete;
        let athlete_id = athlete.id;
        let now = format_utc_rfc3339(Utc::now());

        let created_at = match self.db.get_user(athlete_id).await {
            Ok(Some(existing)) => existing.created_at,
            _ => now.clone(),
        };

        let user = User {
            strava_athlete_id: athlete_id,
            firstname: athlete.firstname.clone(),
            lastname: athlete.lastname.clone(),
            gender: normalize_gender(athlete.sex.as_deref()),
            profile_picture: athlete.profile.clone(),
            created_at,
            last_active: now.clone(),
        };

        if let Err(e) = self.db.upsert_user(&user).await {
            tracing::warn!(error = %e, "Failed to store user profile, continuing anyway");
        }

        let expires_at = DateTime::<Utc>::from_timestamp(token_response.expires_at, 0)
            .unwrap_or_else(Utc::now);

        let tokens = UserTokens {
            access_token: token_response.access_token.clone(),
            refresh_token: token_response.refresh_token,
            expires_at: format_utc_rfc3339(expires_at),
            scopes: OAUTH_SCOPES.split(',').map(String::from).collect(),
        };

        self.db.set_tokens(athlete_id, &tokens).await?;
        // A fresh login replaces whatever token was cached for this athlete
        self.cache_token(athlete_id, &token_response.access_token, expires_at);

        tracing::info!(
            athlete_id,
            firstname = %athlete.firstname,
            "OAuth callback handled, user and tokens stored"
        );

        Ok(OAuthResult {
            athlete_id,
            firstname: athlete.firstname,
            lastname: athlete.lastname,
            access_token: token_response.access_token,
        })
    }
}

/// Result of handling OAuth callback.
#[derive(Debug, Clone)]
pub struct OAuthResult {
    pub athlete_id: u64,
    pub firstname: String,
    pub lastname: String,
    pub access_token: String,
}
