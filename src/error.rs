//! Error types for the exchange bot

use thiserror::Error;

/// Which index a lookup key was checked against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    Ticker,
    Exchange,
}

impl std::fmt::Display for IndexKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexKind::Ticker => write!(f, "ticker"),
            IndexKind::Exchange => write!(f, "exchange"),
        }
    }
}

#[derive(Error, Debug)]
pub enum BotError {
    #[error("{kind} not found in index: {key}")]
    NotFoundInIndex { kind: IndexKind, key: String },

    #[error("Upstream page not found: {0}")]
    UpstreamNotFound(String),

    #[error("Malformed markup: {0}")]
    MalformedMarkup(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Telegram error: {0}")]
    Telegram(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BotError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        BotError::MalformedMarkup(msg.into())
    }

    /// Whether the error means "nothing to show" rather than a fault
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            BotError::NotFoundInIndex { .. } | BotError::UpstreamNotFound(_)
        )
    }

    /// Plain-text explanation shown to chat users
    pub fn user_message(&self, input: &str) -> String {
        match self {
            BotError::NotFoundInIndex { kind: IndexKind::Ticker, .. } => format!(
                "{} cannot be found in DB, please check that you've entered a valid ticker \
                 or run the updateDB command. Note that coinmarketcap is the data source \
                 i.e. your coin has to be listed on CMC before the bot can pull its data.",
                input
            ),
            BotError::NotFoundInIndex { kind: IndexKind::Exchange, .. } => format!(
                "{} cannot be found in DB, please check that you've entered a valid exchange \
                 name or run the updateDB command. Note that coinmarketcap is the data source \
                 i.e. your exchange has to be listed on CMC before the bot can pull its data.",
                input
            ),
            BotError::UpstreamNotFound(_) => format!(
                "No market data is available for {} right now. Try running the updateDB command.",
                input
            ),
            BotError::MalformedMarkup(_) => format!(
                "Could not read the market data for {}. The source page may have changed, \
                 please try again later.",
                input
            ),
            BotError::Network(_) | BotError::Io(_) => format!(
                "Could not reach the data source while looking up {}. Please try again later.",
                input
            ),
            _ => format!("Something went wrong while looking up {}.", input),
        }
    }
}

pub type Result<T> = std::result::Result<T, BotError>;
