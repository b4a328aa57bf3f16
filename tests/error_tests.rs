// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::http::StatusCode;
use axum::response::IntoResponse;
use club_ranking::error::AppError;

#[test]
fn test_is_strava_token_error_matches() {
    let err = AppError::StravaApi(AppError::STRAVA_TOKEN_ERROR.to_string());
    assert!(err.is_strava_token_error());
}

#[test]
fn test_is_strava_token_error_no_match() {
    let err = AppError::StravaApi("Rate limit exceeded".to_string());
    assert!(!err.is_strava_token_error());

    let err = AppError::StravaApi("Internal Server Error".to_string());
    assert!(!err.is_strava_token_error());

    let err = AppError::BadRequest("Bad Request".to_string());
    assert!(!err.is_strava_token_error());

    // Upstream bodies that merely mention tokens or invalid input
    let err = AppError::StravaApi(
        "HTTP 400: {\"message\":\"Bad Request\",\"errors\":[{\"code\":\"invalid\"}]}".to_string(),
    );
    assert!(!err.is_strava_token_error());

    let err = AppError::StravaApi("Token refresh request failed: timed out".to_string());
    assert!(!err.is_strava_token_error());
}

#[test]
fn test_rate_limit_detection() {
    let err = AppError::StravaApi(AppError::STRAVA_RATE_LIMIT.to_string());
    assert!(err.is_rate_limited());
    assert!(!AppError::StravaApi("HTTP 500".to_string()).is_rate_limited());
}

#[test]
fn test_error_status_codes() {
    let cases = [
        (AppError::Unauthorized, StatusCode::UNAUTHORIZED),
        (
            AppError::BadRequest("nope".to_string()),
            StatusCode::BAD_REQUEST,
        ),
        (
            AppError::StravaApi("HTTP 503: down".to_string()),
            StatusCode::BAD_GATEWAY,
        ),
        (
            AppError::StravaApi(AppError::STRAVA_RATE_LIMIT.to_string()),
            StatusCode::TOO_MANY_REQUESTS,
        ),
        (
            AppError::Database("boom".to_string()),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
    ];

    for (err, expected) in cases {
        assert_eq!(err.into_response().status(), expected);
    }
}
