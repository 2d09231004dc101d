use std::env;

use tiertag_providers::ApiProvider;
use tracing::warn;

/// Service configuration parsed from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Active ranking provider
    pub provider: ApiProvider,
    /// Gamemode whose tier is shown when the player is ranked in it
    pub default_gamemode: String,
    /// Timeout for provider requests, in seconds
    pub api_timeout_secs: u64,
    /// Cache TTL, in minutes
    pub cache_duration_minutes: i64,
    /// SQLite database URL for the tier cache
    pub database_url: String,
    /// Connection pool size for the cache store
    pub database_pool_size: u32,
    /// Verbose diagnostics
    pub debug_enabled: bool,
    /// Log every outbound provider request URL
    pub log_api_requests: bool,
}

impl Config {
    /// Parse configuration from environment variables
    pub fn from_env() -> Self {
        let provider = match env::var("TIERTAG_PROVIDER") {
            Ok(value) => value.parse().unwrap_or_else(|_| {
                warn!(
                    provider = %value,
                    "Invalid API provider, using 'mctiers' as default"
                );
                ApiProvider::default()
            }),
            Err(_) => ApiProvider::default(),
        };

        let default_gamemode =
            env::var("TIERTAG_DEFAULT_GAMEMODE").unwrap_or_else(|_| "vanilla".to_string());

        let api_timeout_secs = env::var("TIERTAG_API_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10);

        let cache_duration_minutes = env::var("TIERTAG_CACHE_DURATION_MINUTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);

        let database_url = env::var("TIERTAG_DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://tiertag.db?mode=rwc".to_string());

        let database_pool_size = env::var("TIERTAG_DATABASE_POOL_SIZE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10);

        let debug_enabled = env::var("TIERTAG_DEBUG")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let log_api_requests = env::var("TIERTAG_LOG_API_REQUESTS")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Self {
            provider,
            default_gamemode,
            api_timeout_secs,
            cache_duration_minutes,
            database_url,
            database_pool_size,
            debug_enabled,
            log_api_requests,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: ApiProvider::default(),
            default_gamemode: "vanilla".to_string(),
            api_timeout_secs: 10,
            cache_duration_minutes: 30,
            database_url: "sqlite://tiertag.db?mode=rwc".to_string(),
            database_pool_size: 10,
            debug_enabled: false,
            log_api_requests: false,
        }
    }
}
