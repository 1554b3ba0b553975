//! Client configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is honoured for local development.

use crate::models::FeedMode;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Client configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the backend API (no trailing slash)
    pub api_base_url: String,
    /// Location of the client-local key/value store
    pub store_path: PathBuf,
    /// Timeout applied to every backend request
    pub http_timeout: Duration,
    /// Page size for the reel feed (initial and subsequent loads)
    pub reel_page_limit: u32,
    /// Page size for the first grid load
    pub grid_initial_limit: u32,
    /// Page size for subsequent grid loads
    pub grid_page_limit: u32,
    /// Which feed the binary walks
    pub feed_mode: FeedMode,
    /// Item to pin at the top of the first page
    pub seed_video_id: Option<String>,
    /// Pre-issued ID token used by the headless identity provider
    pub identity_token: Option<String>,
    /// Number of scroll steps the binary simulates
    pub walk_steps: usize,
}

impl Config {
    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8000/api".to_string(),
            store_path: env::temp_dir().join("triangle-feed-test.json"),
            http_timeout: Duration::from_secs(5),
            reel_page_limit: 5,
            grid_initial_limit: 10,
            grid_page_limit: 3,
            feed_mode: FeedMode::Reel,
            seed_video_id: None,
            identity_token: None,
            walk_steps: 10,
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let feed_mode = match env::var("FEED_MODE") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| ConfigError::Invalid("FEED_MODE", raw))?,
            Err(_) => FeedMode::Reel,
        };

        let store_path = match env::var("STORE_PATH") {
            Ok(path) => PathBuf::from(path),
            Err(_) => default_store_path()?,
        };

        Ok(Self {
            api_base_url: env::var("API_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8000/api".to_string())
                .trim_end_matches('/')
                .to_string(),
            store_path,
            http_timeout: Duration::from_secs(parse_or("HTTP_TIMEOUT_SECS", 10)?),
            reel_page_limit: parse_or("REEL_PAGE_LIMIT", 5)?,
            grid_initial_limit: parse_or("GRID_INITIAL_LIMIT", 10)?,
            grid_page_limit: parse_or("GRID_PAGE_LIMIT", 3)?,
            feed_mode,
            seed_video_id: non_empty_var("SEED_VIDEO_ID"),
            identity_token: non_empty_var("IDENTITY_TOKEN").map(|v| v.trim().to_string()),
            walk_steps: parse_or("WALK_STEPS", 10)?,
        })
    }

    /// Page sizes for the given feed: `(initial, subsequent)`.
    pub fn limits_for(&self, mode: FeedMode) -> (u32, u32) {
        match mode {
            FeedMode::Reel => (self.reel_page_limit, self.reel_page_limit),
            FeedMode::Grid => (self.grid_initial_limit, self.grid_page_limit),
        }
    }
}

fn default_store_path() -> Result<PathBuf, ConfigError> {
    dirs::data_local_dir()
        .map(|dir| dir.join("triangle-feed").join("storage.json"))
        .ok_or(ConfigError::Missing("STORE_PATH"))
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_or<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(name, raw)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}
