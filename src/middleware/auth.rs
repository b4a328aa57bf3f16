// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! JWT session middleware.

use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Session cookie name.
pub const SESSION_COOKIE: &str = "club_token";

/// Session lifetime in seconds (30 days).
const SESSION_TTL_SECS: usize = 30 * 24 * 60 * 60;

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (Strava athlete ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// Authenticated athlete extracted from the session token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub athlete_id: u64,
}

/// Middleware that requires a valid session token (cookie or bearer header).
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = if let Some(cookie) = jar.get(SESSION_COOKIE) {
        cookie.value().to_string()
    } else {
        let auth_header = request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        match auth_header.and_then(|h| h.strip_prefix("Bearer ")) {
            Some(token) => token.to_string(),
            None => return Err(StatusCode::UNAUTHORIZED),
        }
    };

    let athlete_id =
        verify_jwt(&token, &state.config.jwt_signing_key).ok_or(StatusCode::UNAUTHORIZED)?;

    request.extensions_mut().insert(AuthUser { athlete_id });

    Ok(next.run(request).await)
}

/// Verify a session token and return its athlete ID.
pub fn verify_jwt(token: &str, signing_key: &[u8]) -> Option<u64> {
    let key = DecodingKey::from_secret(signing_key);
    let validation = Validation::new(Algorithm::HS256);

    let token_data = decode::<Claims>(token, &key, &validation).ok()?;
    token_data.claims.sub.parse().ok()
}

/// Create a JWT for a user session.
pub fn create_jwt(athlete_id: u64, signing_key: &[u8]) -> anyhow::Result<String> {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as usize;

    let claims = Claims {
        sub: athlete_id.to_string(),
        iat: now,
        exp: now + SESSION_TTL_SECS,
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwt_round_trip() {
        let key = b"test_jwt_key_32_bytes_minimum!!";
        let token = create_jwt(4242, key).unwrap();
        assert_eq!(verify_jwt(&token, key), Some(4242));
    }

    #[test]
    fn test_jwt_wrong_key_rejected() {
        let token = create_jwt(4242, b"test_jwt_key_32_bytes_minimum!!").unwrap();
        assert_eq!(verify_jwt(&token, b"another_key_that_is_long_enough"), None);
        assert_eq!(verify_jwt("garbage", b"another_key_that_is_long_enough"), None);
    }
}
