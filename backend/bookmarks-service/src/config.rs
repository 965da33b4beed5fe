/// Configuration management for Bookmarks Service
///
/// Loads configuration from environment variables (a `.env` file is read first
/// by the binary when present).
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Redis configuration
    pub redis: RedisConfig,
    /// Activity stream settings
    pub activity: ActivityConfig,
    /// View ranking settings
    pub ranking: RankingConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (dev, staging, prod)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// HTTP port
    pub http_port: u16,
    /// Default log filter when RUST_LOG is unset
    pub log_level: String,
    /// Emit JSON logs instead of the human-readable format
    pub log_json: bool,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database URL
    pub url: String,
    /// Max connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Min connections in pool
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Redis configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    /// Redis URL (redis://host:port/db)
    pub url: String,
    /// Prefix prepended to every key this service writes
    #[serde(default)]
    pub key_prefix: String,
}

/// Activity stream configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityConfig {
    /// Trailing window in which identical actions are suppressed
    #[serde(default = "default_dedup_window_secs")]
    pub dedup_window_secs: u64,
    /// Number of entries shown on the dashboard when no limit is given
    #[serde(default = "default_feed_limit")]
    pub feed_default_limit: usize,
}

/// View ranking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingConfig {
    /// Number of images returned by the ranking when no limit is given
    #[serde(default = "default_ranking_limit")]
    pub default_limit: usize,
}

// Default values
fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    5
}

fn default_dedup_window_secs() -> u64 {
    60
}

fn default_feed_limit() -> usize {
    10
}

fn default_ranking_limit() -> usize {
    10
}

impl ActivityConfig {
    pub fn dedup_window(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.dedup_window_secs as i64)
    }
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self {
            dedup_window_secs: default_dedup_window_secs(),
            feed_default_limit: default_feed_limit(),
        }
    }
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            default_limit: default_ranking_limit(),
        }
    }
}

fn env_parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.parse().ok())
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let app = AppConfig {
            env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            http_port: env_parsed("PORT").unwrap_or(8000),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            log_json: std::env::var("LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        };

        let database = DatabaseConfig {
            url: std::env::var("DATABASE_URL")
                .context("DATABASE_URL environment variable not set")?,
            max_connections: env_parsed("DB_MAX_CONNECTIONS")
                .unwrap_or_else(default_max_connections),
            min_connections: env_parsed("DB_MIN_CONNECTIONS")
                .unwrap_or_else(default_min_connections),
        };

        let redis = RedisConfig {
            url: std::env::var("REDIS_URL").context("REDIS_URL environment variable not set")?,
            key_prefix: std::env::var("REDIS_KEY_PREFIX").unwrap_or_default(),
        };

        let activity = ActivityConfig {
            dedup_window_secs: env_parsed("ACTIVITY_DEDUP_WINDOW_SECS")
                .unwrap_or_else(default_dedup_window_secs),
            feed_default_limit: env_parsed("FEED_DEFAULT_LIMIT")
                .unwrap_or_else(default_feed_limit),
        };

        let ranking = RankingConfig {
            default_limit: env_parsed("RANKING_DEFAULT_LIMIT")
                .unwrap_or_else(default_ranking_limit),
        };

        if activity.feed_default_limit == 0 {
            anyhow::bail!("FEED_DEFAULT_LIMIT must be greater than zero");
        }

        Ok(Config {
            app,
            database,
            redis,
            activity,
            ranking,
        })
    }
}
