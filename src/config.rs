//! Application configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is read first if present.

use std::env;
use std::str::FromStr;

/// Which store backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Firestore,
    /// In-process only; data is lost on restart
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "firestore" => Ok(StoreBackend::Firestore),
            "memory" => Ok(StoreBackend::Memory),
            _ => Err(ConfigError::Invalid("STORE_BACKEND", s.to_string())),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Strava OAuth client ID (public)
    pub strava_client_id: String,
    /// Frontend URL for OAuth redirects
    pub frontend_url: String,
    /// GCP project ID (Firestore)
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    pub store_backend: StoreBackend,

    /// Strava OAuth client secret
    pub strava_client_secret: String,
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// HMAC key for the OAuth `state` parameter
    pub oauth_state_key: Vec<u8>,
}

impl Config {
    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            strava_client_id: "test_client_id".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            store_backend: StoreBackend::Memory,
            strava_client_secret: "test_secret".to_string(),
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            oauth_state_key: b"test_oauth_state_key_32_bytes!!".to_vec(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Strava credentials are also accepted under the lowercase names
    /// `client_id` / `client_secret`.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let jwt_signing_key = env::var("JWT_SIGNING_KEY")
            .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
            .into_bytes();
        let oauth_state_key = env::var("OAUTH_STATE_KEY")
            .map(String::into_bytes)
            .unwrap_or_else(|_| jwt_signing_key.clone());

        Ok(Self {
            strava_client_id: var_any(&["STRAVA_CLIENT_ID", "CLIENT_ID", "client_id"])
                .ok_or(ConfigError::Missing("STRAVA_CLIENT_ID"))?,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            store_backend: env::var("STORE_BACKEND")
                .map(|v| v.parse())
                .unwrap_or(Ok(StoreBackend::Firestore))?,

            strava_client_secret: var_any(&[
                "STRAVA_CLIENT_SECRET",
                "CLIENT_SECRET",
                "client_secret",
            ])
            .ok_or(ConfigError::Missing("STRAVA_CLIENT_SECRET"))?,
            jwt_signing_key,
            oauth_state_key,
        })
    }
}

/// First non-empty value among `names`, trimmed.
fn var_any(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| env::var(name).ok())
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        // Set required env vars for test
        env::set_var("STRAVA_CLIENT_ID", "test_id");
        env::set_var("STRAVA_CLIENT_SECRET", " test_secret ");
        env::set_var("JWT_SIGNING_KEY", "test_jwt_key_32_bytes_minimum!!");
        env::set_var("STORE_BACKEND", "memory");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.strava_client_id, "test_id");
        assert_eq!(config.strava_client_secret, "test_secret");
        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_store_backend_parse() {
        assert_eq!(
            "Firestore".parse::<StoreBackend>().unwrap(),
            StoreBackend::Firestore
        );
        assert_eq!(" memory".parse::<StoreBackend>().unwrap(), StoreBackend::Memory);
        assert!("postgres".parse::<StoreBackend>().is_err());
    }
}
