// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use club_ranking::config::Config;
use club_ranking::db::{FirestoreDb, MemoryDb};
use club_ranking::models::{ScoredActivity, User, UserTokens};
use club_ranking::routes::create_router;
use club_ranking::AppState;
use std::sync::Arc;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a test app backed by an in-memory store.
/// Returns the router, the shared state, and a handle on the store.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>, MemoryDb) {
    let memory = MemoryDb::new();
    let state = Arc::new(AppState::new(Config::test_default(), memory.clone().into()));
    (create_router(state.clone()), state, memory)
}

/// Create a test app whose store is offline (every call fails).
#[allow(dead_code)]
pub fn create_offline_app() -> axum::Router {
    let state = Arc::new(AppState::new(
        Config::test_default(),
        FirestoreDb::new_mock().into(),
    ));
    create_router(state)
}

#[allow(dead_code)]
pub fn test_user(athlete_id: u64, firstname: &str, lastname: &str, gender: &str) -> User {
    User {
        strava_athlete_id: athlete_id,
        firstname: firstname.to_string(),
        lastname: lastname.to_string(),
        gender: gender.to_string(),
        profile_picture: None,
        created_at: "2024-06-01T10:00:00Z".to_string(),
        last_active: "2024-06-01T10:00:00Z".to_string(),
    }
}

#[allow(dead_code)]
pub fn test_tokens(expires_at: &str) -> UserTokens {
    UserTokens {
        access_token: "access".to_string(),
        refresh_token: "refresh".to_string(),
        expires_at: expires_at.to_string(),
        scopes: vec!["activity:read_all".to_string()],
    }
}

#[allow(dead_code)]
pub fn test_score(
    athlete_id: u64,
    activity_id: u64,
    firstname: &str,
    lastname: &str,
    gender: &str,
    points: u32,
) -> ScoredActivity {
    ScoredActivity {
        athlete_id,
        activity_id,
        firstname: firstname.to_string(),
        lastname: lastname.to_string(),
        gender: gender.to_string(),
        points,
        activity_date: "2024-06-06T07:00:00".to_string(),
        date_scored: "2024-06-30T12:00:00Z".to_string(),
    }
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    serde_json::from_slice(&bytes).expect("Body is not JSON")
}

/// Serve `router` on an ephemeral local port and return its origin.
#[allow(dead_code)]
pub async fn spawn_stub(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind stub server");
    let addr = listener.local_addr().expect("Stub server has no address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("Stub server failed");
    });
    format!("http://{}", addr)
}
