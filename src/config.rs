use serde::Deserialize;
use std::time::Duration;

use crate::{
    error::{AppError, AppResult},
    models::DecayPolicy,
};

/// Upper bound on personalized rows appended by one grow call
pub const MAX_GROW_COUNT: usize = 10;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// TMDB v3 API key
    pub tmdb_api_key: String,

    /// TMDB API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// Auth backend base URL
    #[serde(default = "default_auth_api_url")]
    pub auth_api_url: String,

    /// Redis connection URL. Client state stays in process memory when unset.
    #[serde(default)]
    pub redis_url: Option<String>,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Personalized rows appended per grow call when the client asks for none
    #[serde(default = "default_feed_growth_batch")]
    pub feed_growth_batch: usize,

    /// How many of the top ranked categories each draw picks from; 0 means all
    #[serde(default = "default_feed_draw_window")]
    pub feed_draw_window: usize,

    /// Seconds a feed or live search may sit unused before it is dropped
    #[serde(default = "default_session_idle_secs")]
    pub session_idle_secs: u64,

    /// Search quiescence window in milliseconds
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,

    /// Minimum query length that triggers a search
    #[serde(default = "default_search_min_chars")]
    pub search_min_chars: usize,

    /// Preference counter decay: `none`, `cap:N` or `halve:N`
    #[serde(default = "default_preference_decay")]
    pub preference_decay: String,
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_auth_api_url() -> String {
    "http://localhost:5000/api/auth".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_feed_growth_batch() -> usize {
    2
}

fn default_session_idle_secs() -> u64 {
    1800
}

fn default_feed_draw_window() -> usize {
    0
}

fn default_search_debounce_ms() -> u64 {
    300
}

fn default_search_min_chars() -> usize {
    3
}

fn default_preference_decay() -> String {
    "none".to_string()
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Rows appended when a grow call names no count
    pub fn growth_batch(&self) -> AppResult<usize> {
        if self.feed_growth_batch > MAX_GROW_COUNT {
            return Err(AppError::Config(format!(
                "FEED_GROWTH_BATCH must be at most {}, got {}",
                MAX_GROW_COUNT, self.feed_growth_batch
            )));
        }
        Ok(self.feed_growth_batch)
    }

    pub fn decay_policy(&self) -> AppResult<DecayPolicy> {
        self.preference_decay
            .parse()
            .map_err(|e: String| AppError::Config(e))
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn session_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.session_idle_secs)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
