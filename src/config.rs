use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::env;
use url::Url;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub fetcher: FetcherConfig,
    pub telegram: TelegramConfig,
    pub tracker: TrackerConfig,
    pub items: Vec<TrackedItem>,
    #[serde(default)]
    pub sites: Vec<SiteRule>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// sqlx SQLite URL, e.g. "sqlite://data/prices.db"
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    pub user_agent: String,
    pub request_timeout: u64,
    pub retry_attempts: u32,
    pub retry_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
    pub request_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Seconds between full passes over the tracked list.
    pub check_interval: u64,
    /// Currency unit label used in alert messages.
    pub currency: String,
}

/// One URL on the static tracked list. List order is processing order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedItem {
    pub url: String,
}

/// Per-site extraction rule: pages whose host contains `host` use `selector`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteRule {
    pub host: String,
    pub selector: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default"))
            // Add environment-specific config
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add local config (ignored by git)
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables with prefix "PRICEWATCH_"
            .add_source(Environment::with_prefix("PRICEWATCH").separator("__"))
            .build()?;

        let config: AppConfig = s.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.url.is_empty() {
            return Err(ConfigError::Message("Database URL must not be empty".into()));
        }

        if self.fetcher.request_timeout == 0 {
            return Err(ConfigError::Message(
                "Fetcher request_timeout must be greater than 0".into(),
            ));
        }

        if self.telegram.bot_token.is_empty() {
            return Err(ConfigError::Message("Telegram bot_token must be set".into()));
        }

        if self.telegram.chat_id.is_empty() {
            return Err(ConfigError::Message("Telegram chat_id must be set".into()));
        }

        if self.telegram.request_timeout == 0 {
            return Err(ConfigError::Message(
                "Telegram request_timeout must be greater than 0".into(),
            ));
        }

        if self.tracker.check_interval == 0 {
            return Err(ConfigError::Message(
                "Tracker check_interval must be greater than 0".into(),
            ));
        }

        if self.tracker.currency.is_empty() {
            return Err(ConfigError::Message("Tracker currency must not be empty".into()));
        }

        if self.items.is_empty() {
            return Err(ConfigError::Message(
                "At least one tracked item must be configured".into(),
            ));
        }

        let mut seen = HashSet::new();
        for item in &self.items {
            if Url::parse(&item.url).is_err() {
                return Err(ConfigError::Message(format!(
                    "Invalid tracked URL: {}",
                    item.url
                )));
            }
            if !seen.insert(item.url.as_str()) {
                return Err(ConfigError::Message(format!(
                    "Duplicate tracked URL: {}",
                    item.url
                )));
            }
        }

        for site in &self.sites {
            if site.host.is_empty() {
                return Err(ConfigError::Message(
                    "Site rule host pattern must not be empty".into(),
                ));
            }
            if site.selector.is_empty() {
                return Err(ConfigError::Message(format!(
                    "Site rule for '{}' has an empty selector",
                    site.host
                )));
            }
        }

        Ok(())
    }
}
