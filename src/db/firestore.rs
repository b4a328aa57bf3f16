// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (profile storage)
//! - Tokens (OAuth tokens)
//! - Scores (one document per scored Strava activity)

use crate::db::collections;
use crate::error::AppError;
use crate::models::{ScoredActivity, User, UserTokens};
use firestore::errors::FirestoreError;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        // The emulator accepts any bearer token; hand it an unsigned one.
        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create an offline client for testing.
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── Score Operations ────────────────────────────────────────

    /// Create the score document for an activity unless it already exists.
    ///
    /// Uses a create-only write, so Firestore itself enforces one document
    /// per activity ID. Returns `false` when the document was already there.
    pub async fn insert_score_if_absent(&self, score: &ScoredActivity) -> Result<bool, AppError> {
        let result: Result<(), FirestoreError> = self
            .get_client()?
            .fluent()
            .insert()
            .into(collections::SCORES)
            .document_id(score.activity_id.to_string())
            .object(score)
            .execute()
            .await;

        match result {
            Ok(()) => Ok(true),
            Err(FirestoreError::DataConflictError(_)) => {
                tracing::debug!(
                    activity_id = score.activity_id,
                    "Score already stored (idempotent skip)"
                );
                Ok(false)
            }
            Err(e) => Err(AppError::Database(e.to_string())),
        }
    }

    /// Read every score document.
    pub async fn list_scores(&self) -> Result<Vec<ScoredActivity>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::SCORES)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user by their Strava athlete ID.
    pub async fn get_user(&self, athlete_id: u64) -> Result<Option<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(&athlete_id.to_string())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or update a user.
    pub async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(user.strava_athlete_id.to_string())
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Token Operations ────────────────────────────────────────

    /// Get tokens for a user.
    pub async fn get_tokens(&self, athlete_id: u64) -> Result<Option<UserTokens>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::TOKENS)
            .obj()
            .one(&athlete_id.to_string())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Store tokens for a user, replacing any previous ones.
    pub async fn set_tokens(&self, athlete_id: u64, tokens: &UserTokens) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::TOKENS)
            .document_id(athlete_id.to_string())
            .object(tokens)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
