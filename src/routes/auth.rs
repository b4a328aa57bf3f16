// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava OAuth authentication routes.

use axum::{
    extract::{Query, State},
    response::Redirect,
    routing::get,
    Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use subtle::ConstantTimeEq;

use crate::error::{AppError, Result};
use crate::middleware::auth::{create_jwt, SESSION_COOKIE};
use crate::services::strava::OAUTH_SCOPES;
use crate::AppState;

// Type alias for HMAC-SHA256
type HmacSha256 = Hmac<Sha256>;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/strava", get(auth_start))
        .route("/auth/strava/callback", get(auth_callback))
        .route("/auth/logout", get(logout))
}

/// Query parameters for starting OAuth flow.
#[derive(Deserialize)]
pub struct AuthStartParams {
    /// Frontend URL to redirect back to after OAuth completes.
    /// If not provided, uses FRONTEND_URL env var.
    #[serde(default)]
    redirect_uri: Option<String>,
}

/// Start OAuth flow - redirect to Strava authorization.
async fn auth_start(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AuthStartParams>,
    headers: axum::http::HeaderMap,
) -> Result<Redirect> {
    let frontend_url = params
        .redirect_uri
        .unwrap_or_else(|| state.config.frontend_url.clone());

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("System time error: {}", e)))?
        .as_millis();

    let oauth_state = sign_state(&frontend_url, timestamp, &state.config.oauth_state_key)?;

    let host = headers
        .get(axum::http::header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost:8080");
    let callback_url = format!("{}/auth/strava/callback", service_origin(host));

    let auth_url = format!(
        "https://www.strava.com/oauth/authorize?\
         client_id={}&\
         redirect_uri={}&\
         response_type=code&\
         scope={}&\
         state={}",
        state.config.strava_client_id,
        urlencoding::encode(&callback_url),
        OAUTH_SCOPES,
        oauth_state
    );

    tracing::info!(
        client_id = %state.config.strava_client_id,
        frontend_url = %frontend_url,
        "Starting OAuth flow, redirecting to Strava"
    );

    Ok(Redirect::temporary(&auth_url))
}

#[derive(Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// OAuth callback - exchange code for tokens, create session.
async fn auth_callback(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> Result<(CookieJar, Redirect)> {
    let frontend_url = params
        .state
        .as_deref()
        .and_then(|s| verify_and_decode_state(s, &state.config.oauth_state_key))
        .unwrap_or_else(|| {
            tracing::warn!(
                "Invalid or tampered state parameter, falling back to default frontend URL"
            );
            state.config.frontend_url.clone()
        });

    if let Some(error) = params.error {
        tracing::warn!(error = %error, "OAuth error from Strava");
        let redirect = format!("{}?error={}", frontend_url, urlencoding::encode(&error));
        return Ok((jar, Redirect::temporary(&redirect)));
    }

    let code = params
        .code
        .ok_or_else(|| AppError::BadRequest("Missing authorization code".to_string()))?;

    tracing::info!("Exchanging authorization code for tokens");

    let oauth_result = state.strava_service.handle_oauth_callback(&code).await?;

    tracing::info!(
        athlete_id = oauth_result.athlete_id,
        firstname = %oauth_result.firstname,
        "OAuth successful, user and tokens stored"
    );

    let jwt = create_jwt(oauth_result.athlete_id, &state.config.jwt_signing_key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT creation failed: {}", e)))?;

    let cookie = Cookie::build((SESSION_COOKIE, jwt.clone()))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .build();

    let redirect_url = format!("{}/callback?token={}", frontend_url, jwt);

    Ok((jar.add(cookie), Redirect::temporary(&redirect_url)))
}

/// Logout - drop the session cookie and go back to the frontend.
async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> (CookieJar, Redirect) {
    let jar = jar.remove(Cookie::build((SESSION_COOKIE, "")).path("/").build());
    (jar, Redirect::temporary(&state.config.frontend_url))
}

/// "http" for local hosts, "https" otherwise.
fn service_origin(host: &str) -> String {
    let scheme = if host.contains("localhost") || host.contains("127.0.0.1") {
        "http"
    } else {
        "https"
    };
    format!("{}://{}", scheme, host)
}

/// Build the signed OAuth `state`: base64("frontend_url|timestamp_hex|hmac_hex").
fn sign_state(frontend_url: &str, timestamp_ms: u128, secret: &[u8]) -> Result<String> {
    let payload = format!("{}|{:x}", frontend_url, timestamp_ms);

    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("HMAC init failed: {}", e)))?;
    mac.update(payload.as_bytes());
    let signature = mac.finalize().into_bytes();

    let signed = format!("{}|{}", payload, hex::encode(signature));
    Ok(URL_SAFE_NO_PAD.encode(signed.as_bytes()))
}

/// Verify HMAC signature and decode the frontend URL from the OAuth state parameter.
fn verify_and_decode_state(state: &str, secret: &[u8]) -> Option<String> {
    let bytes = URL_SAFE_NO_PAD.decode(state).ok()?;
    let state_str = String::from_utf8(bytes).ok()?;

    // The URL itself may contain '|', so split from the right
    let mut parts = state_str.rsplitn(3, '|');
    let signature_hex = parts.next()?;
    let timestamp_hex = parts.next()?;
    let frontend_url = parts.next()?;

    let payload = format!("{}|{}", frontend_url, timestamp_hex);

    let mut mac = HmacSha256::new_from_slice(secret).ok()?;
    mac.update(payload.as_bytes());
    let expected_signature = hex::encode(mac.finalize().into_bytes());

    if !bool::from(signature_hex.as_bytes().ct_eq(expected_signature.as_bytes())) {
        tracing::error!("OAuth state signature mismatch! Potential tampering.");
        return None;
    }

    Some(frontend_url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_and_decode_state_success() {
        let secret = b"secret_key";
        let state = sign_state("https://example.com", 1234567890, secret).unwrap();

        let result = verify_and_decode_state(&state, secret);
        assert_eq!(result, Some("https://example.com".to_string()));
    }

    #[test]
    fn test_verify_and_decode_state_invalid_signature() {
        let secret = b"secret_key";
        let payload = format!("{}|{:x}", "https://example.com", 1234567890u128);
        let state_data = format!("{}|{}", payload, "invalid_signature");
        let encoded_state = URL_SAFE_NO_PAD.encode(state_data.as_bytes());

        assert_eq!(verify_and_decode_state(&encoded_state, secret), None);
    }

    #[test]
    fn test_verify_and_decode_state_wrong_secret() {
        let state = sign_state("https://example.com", 1234567890, b"secret_key").unwrap();
        assert_eq!(verify_and_decode_state(&state, b"wrong_key"), None);
    }

    #[test]
    fn test_verify_and_decode_state_malformed() {
        let encoded_state = URL_SAFE_NO_PAD.encode("invalid|format");
        assert_eq!(verify_and_decode_state(&encoded_state, b"secret_key"), None);
        assert_eq!(verify_and_decode_state("%%%not-base64", b"secret_key"), None);
    }

    #[test]
    fn test_state_with_pipe_in_url() {
        let secret = b"secret_key";
        let url = "https://example.com/?a=1|2";
        let state = sign_state(url, 42, secret).unwrap();
        assert_eq!(verify_and_decode_state(&state, secret), Some(url.to_string()));
    }

    #[test]
    fn test_service_origin_scheme() {
        assert_eq!(service_origin("localhost:8080"), "http://localhost:8080");
        assert_eq!(service_origin("club.example.com"), "https://club.example.com");
    }
}
