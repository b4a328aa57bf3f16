// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Strava API error: {0}")]
    StravaApi(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Message carried by `StravaApi` when Strava answers 429.
    pub const STRAVA_RATE_LIMIT: &'static str = "Rate limit exceeded";

    /// Message carried by `StravaApi` when Strava rejects the access token.
    pub const STRAVA_TOKEN_ERROR: &'static str = "Token expired or invalid";

    /// Whether this is a Strava error caused by a bad or expired token.
    pub fn is_strava_token_error(&self) -> bool {
        matches!(self, AppError::StravaApi(msg) if msg == Self::STRAVA_TOKEN_ERROR)
    }

    /// Whether this is a Strava rate-limit rejection.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, AppError::StravaApi(msg) if msg == Self::STRAVA_RATE_LIMIT)
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", None),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "invalid_token", None),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::StravaApi(msg) if msg == AppError::STRAVA_RATE_LIMIT => (
                StatusCode::TOO_MANY_REQUESTS,
                "strava_rate_limited",
                Some(msg.clone()),
            ),
            AppError::StravaApi(msg) => {
                (StatusCode::BAD_GATEWAY, "strava_error", Some(msg.clone()))
            }
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
