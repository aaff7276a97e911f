//! Configuration management

use crate::error::{BotError, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Origin of the market aggregator site
    pub base_url: String,
    /// Path of the full coin listing page
    pub listing_path: String,
    /// Path of the 24h exchange volume ranking page
    pub exchanges_path: String,
    /// HTTP timeout in seconds
    pub timeout_secs: u64,
    /// User agent sent with every request
    pub user_agent: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Ticker / exchange index rebuild interval in seconds
    pub refresh_interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// File whose first line is the bot token
    pub token_file: String,
    /// Bot token (takes precedence over token_file when set)
    pub bot_token: String,
    /// getUpdates long-poll timeout in seconds
    pub poll_timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://coinmarketcap.com".to_string(),
            listing_path: "/all/views/all/".to_string(),
            exchanges_path: "/exchanges/volume/24-hour/all/".to_string(),
            timeout_secs: 30,
            user_agent: concat!("exchange-bot/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: 21600, // 6 hours
        }
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token_file: "token.txt".to_string(),
            bot_token: String::new(),
            poll_timeout_secs: 30,
        }
    }
}

impl SourceConfig {
    /// Absolute url for a site-relative path; absolute urls pass through
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        let base = self.base_url.trim_end_matches('/');
        if path.starts_with('/') {
            format!("{}{}", base, path)
        } else {
            format!("{}/{}", base, path)
        }
    }

    pub fn listing_url(&self) -> String {
        self.url_for(&self.listing_path)
    }

    pub fn exchanges_url(&self) -> String {
        self.url_for(&self.exchanges_path)
    }
}

impl TelegramConfig {
    /// Resolve the bot token from config or the single-line token file
    pub fn resolve_token(&self) -> Result<String> {
        if !self.bot_token.trim().is_empty() {
            return Ok(self.bot_token.trim().to_string());
        }

        let path = shellexpand::tilde(&self.token_file);
        let contents = std::fs::read_to_string(path.as_ref())?;
        let token = contents.lines().next().unwrap_or_default().trim().to_string();

        if token.is_empty() {
            return Err(BotError::Config(format!(
                "token file {} is empty",
                self.token_file
            )));
        }
        Ok(token)
    }
}

impl Config {
    /// Load configuration from file, layered with EXCHANGE_BOT_* env vars
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path
            .as_ref()
            .to_str()
            .ok_or_else(|| anyhow::anyhow!("config path is not valid UTF-8"))?;

        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("EXCHANGE_BOT").separator("__"))
            .build()?;

        let config: Config = settings.try_deserialize()?;
        Ok(config)
    }

    /// Load from the first default location that exists
    pub fn load_default() -> anyhow::Result<Self> {
        match find_config(&DEFAULT_PATHS) {
            Some(path) => Self::load(path),
            None => {
                tracing::debug!("No configuration file found, using defaults");
                Self::load("config.toml")
            }
        }
    }
}

const DEFAULT_PATHS: [&str; 3] = [
    "config.toml",
    "config.yaml",
    "~/.config/exchange-bot/config.toml",
];

/// First candidate that exists on disk, with `~` expanded
fn find_config(candidates: &[&str]) -> Option<String> {
    candidates
        .iter()
        .map(|path| shellexpand::tilde(path).into_owned())
        .find(|path| Path::new(path).exists())
}
