//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file when present).

use radio_core::{ChannelId, ChatId, UserId};
use secrecy::Secret;
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub bot: BotConfig,
    pub database: DatabaseConfig,
    pub channels: ChannelConfig,
    pub rate_limit: RateLimitConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_env")]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "production" => Some(Self::Production),
            "staging" => Some(Self::Staging),
            "development" => Some(Self::Development),
            _ => None,
        }
    }
}

/// Bot identity and well-known chats
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub token: Secret<String>,
    /// Holder of the moderation capability
    pub owner_id: UserId,
    /// Public chat that also receives version announcements
    pub announcement_chat: Option<ChatId>,
    /// File holding the current version marker
    pub version_file: PathBuf,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
        }
    }
}

/// Channel range, prison channel and rotation timing
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelConfig {
    #[serde(default = "default_min_channel")]
    pub min_channel: i64,
    #[serde(default = "default_max_channel")]
    pub max_channel: i64,
    #[serde(default = "default_prison_channel")]
    pub prison_channel: i64,
    /// Probability of opening a fresh channel instead of joining one
    #[serde(default = "default_creation_chance")]
    pub creation_chance: f64,
    #[serde(default = "default_switch_min")]
    pub switch_min_secs: u64,
    #[serde(default = "default_switch_max")]
    pub switch_max_secs: u64,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            min_channel: default_min_channel(),
            max_channel: default_max_channel(),
            prison_channel: default_prison_channel(),
            creation_chance: default_creation_chance(),
            switch_min_secs: default_switch_min(),
            switch_max_secs: default_switch_max(),
        }
    }
}

impl ChannelConfig {
    #[must_use]
    pub fn min(&self) -> ChannelId {
        ChannelId::new(self.min_channel)
    }

    #[must_use]
    pub fn max(&self) -> ChannelId {
        ChannelId::new(self.max_channel)
    }

    #[must_use]
    pub fn prison(&self) -> ChannelId {
        ChannelId::new(self.prison_channel)
    }

    #[must_use]
    pub fn contains(&self, channel: ChannelId) -> bool {
        (self.min_channel..=self.max_channel).contains(&channel.into_inner())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.min_channel > self.max_channel {
            return Err(ConfigError::InvalidValue(
                "MIN_CHANNEL",
                format!("{} exceeds MAX_CHANNEL {}", self.min_channel, self.max_channel),
            ));
        }
        if self.min_channel == self.max_channel && self.min_channel == self.prison_channel {
            return Err(ConfigError::InvalidValue(
                "PRISON_CHANNEL",
                format!("{} is the only channel in range", self.prison_channel),
            ));
        }
        if !(0.0..=1.0).contains(&self.creation_chance) {
            return Err(ConfigError::InvalidValue(
                "CHANNEL_CREATION_CHANCE",
                self.creation_chance.to_string(),
            ));
        }
        if self.switch_min_secs > self.switch_max_secs {
            return Err(ConfigError::InvalidValue(
                "SWITCH_TIME_MIN",
                format!(
                    "{} exceeds SWITCH_TIME_MAX {}",
                    self.switch_min_secs, self.switch_max_secs
                ),
            ));
        }
        Ok(())
    }
}

/// Message pacing
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// Minimum gap between two relayed messages of one user
    #[serde(default = "default_message_interval")]
    pub message_interval_ms: u64,
    /// Pause before each media send and between mass-broadcast sends
    #[serde(default = "default_broadcast_delay")]
    pub broadcast_delay_ms: u64,
    /// Lifetime of delivery status messages
    #[serde(default = "default_status_ttl")]
    pub status_ttl_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            message_interval_ms: default_message_interval(),
            broadcast_delay_ms: default_broadcast_delay(),
            status_ttl_secs: default_status_ttl(),
        }
    }
}

impl RateLimitConfig {
    #[must_use]
    pub fn message_interval(&self) -> Duration {
        Duration::from_millis(self.message_interval_ms)
    }

    #[must_use]
    pub fn broadcast_delay(&self) -> Duration {
        Duration::from_millis(self.broadcast_delay_ms)
    }

    #[must_use]
    pub fn status_ttl(&self) -> Duration {
        Duration::from_secs(self.status_ttl_secs)
    }
}

// Default value functions
fn default_app_name() -> String {
    "radio-relay".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn default_database_url() -> String {
    "sqlite://radio.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_min_connections() -> u32 {
    1
}

fn default_min_channel() -> i64 {
    1
}

fn default_max_channel() -> i64 {
    999
}

fn default_prison_channel() -> i64 {
    0
}

fn default_creation_chance() -> f64 {
    0.1
}

fn default_switch_min() -> u64 {
    1800 // 30 minutes
}

fn default_switch_max() -> u64 {
    3600 // 1 hour
}

fn default_message_interval() -> u64 {
    3000
}

fn default_broadcast_delay() -> u64 {
    50
}

fn default_status_ttl() -> u64 {
    5
}

fn default_version_file() -> PathBuf {
    PathBuf::from("version.txt")
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing or invalid
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Self {
            app: AppSettings {
                name: lookup("APP_NAME").unwrap_or_else(default_app_name),
                env: lookup("APP_ENV")
                    .and_then(|s| Environment::parse(&s))
                    .unwrap_or_default(),
            },
            bot: BotConfig {
                token: Secret::new(
                    lookup("BOT_TOKEN")
                        .filter(|t| !t.trim().is_empty())
                        .ok_or(ConfigError::MissingVar("BOT_TOKEN"))?,
                ),
                owner_id: required(&lookup, "OWNER_ID")?,
                announcement_chat: optional(&lookup, "UPDATE_CHANNEL")?,
                version_file: lookup("VERSION_FILE")
                    .map(PathBuf::from)
                    .unwrap_or_else(default_version_file),
            },
            database: DatabaseConfig {
                url: lookup("DATABASE_URL").unwrap_or_else(default_database_url),
                max_connections: optional(&lookup, "DATABASE_MAX_CONNECTIONS")?
                    .unwrap_or_else(default_max_connections),
                min_connections: optional(&lookup, "DATABASE_MIN_CONNECTIONS")?
                    .unwrap_or_else(default_min_connections),
            },
            channels: ChannelConfig {
                min_channel: optional(&lookup, "MIN_CHANNEL")?.unwrap_or_else(default_min_channel),
                max_channel: optional(&lookup, "MAX_CHANNEL")?.unwrap_or_else(default_max_channel),
                prison_channel: optional(&lookup, "PRISON_CHANNEL")?
                    .unwrap_or_else(default_prison_channel),
                creation_chance: optional(&lookup, "CHANNEL_CREATION_CHANCE")?
                    .unwrap_or_else(default_creation_chance),
                switch_min_secs: optional(&lookup, "SWITCH_TIME_MIN")?
                    .unwrap_or_else(default_switch_min),
                switch_max_secs: optional(&lookup, "SWITCH_TIME_MAX")?
                    .unwrap_or_else(default_switch_max),
            },
            rate_limit: RateLimitConfig {
                message_interval_ms: optional(&lookup, "MESSAGE_DELAY_MS")?
                    .unwrap_or_else(default_message_interval),
                broadcast_delay_ms: optional(&lookup, "BROADCAST_DELAY_MS")?
                    .unwrap_or_else(default_broadcast_delay),
                status_ttl_secs: optional(&lookup, "DELETE_STATS_AFTER")?
                    .unwrap_or_else(default_status_ttl),
            },
        };

        config.channels.validate()?;
        Ok(config)
    }
}

fn optional<F, T>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key, raw.clone()))
        })
        .transpose()
}

fn required<F, T>(lookup: &F, key: &'static str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    optional(lookup, key)?.ok_or(ConfigError::MissingVar(key))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
