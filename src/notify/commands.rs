//! Chat command dispatch
//!
//! Maps a command message to lookups and renders the replies. Argument
//! validation and all user-facing wording live here; the lookup layer
//! only ever sees a normalised key.

use super::format::{self, HELP_TEXT, MAX_MESSAGE_LEN};
use crate::error::BotError;
use crate::lookup::MarketLookup;
use crate::types;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/e <ticker>`: top exchanges for a coin
    Exchanges(Vec<String>),
    /// `/m <ticker>`: cheapest pairs for a coin
    Cheapest(Vec<String>),
    /// `/t <exchange>`: summary and pairs of an exchange
    Exchange(Vec<String>),
    /// `/updateDB`: rebuild the indexes now
    UpdateDb,
    /// `/start`
    Start,
}

impl Command {
    /// Parse a message; `None` for plain text and unknown commands
    pub fn parse(text: &str) -> Option<Self> {
        let mut parts = text.split_whitespace();
        let head = parts.next()?.strip_prefix('/')?;
        // "/e@SomeBot" addresses a specific bot in group chats
        let name = head.split('@').next().unwrap_or_default().to_lowercase();
        let args: Vec<String> = parts.map(str::to_string).collect();

        match name.as_str() {
            "e" => Some(Command::Exchanges(args)),
            "m" => Some(Command::Cheapest(args)),
            "t" => Some(Command::Exchange(args)),
            "updatedb" => Some(Command::UpdateDb),
            "start" => Some(Command::Start),
            _ => None,
        }
    }
}

/// A message to send back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub markdown: bool,
}

impl Reply {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            markdown: false,
        }
    }

    /// One reply per chunk of a possibly long Markdown message
    pub fn markdown_chunks(text: &str) -> Vec<Self> {
        format::chunk_message(text, MAX_MESSAGE_LEN)
            .into_iter()
            .map(|text| Self {
                text,
                markdown: true,
            })
            .collect()
    }
}

pub struct CommandHandler {
    lookup: MarketLookup,
}

impl CommandHandler {
    pub fn new(lookup: MarketLookup) -> Self {
        Self { lookup }
    }

    /// Replies for a message, or `None` if it is not a command we serve
    pub async fn handle(&self, text: &str) -> Option<Vec<Reply>> {
        let command = Command::parse(text)?;
        tracing::debug!("Handling {:?}", command);

        let replies = match command {
            Command::Start => vec![Reply::plain(HELP_TEXT)],
            Command::UpdateDb => self.update_db().await,
            Command::Exchanges(args) => match single_arg(&args, "ticker") {
                Ok(ticker) => self.exchanges(ticker).await,
                Err(reply) => vec![reply],
            },
            Command::Cheapest(args) => match single_arg(&args, "ticker") {
                Ok(ticker) => self.cheapest(ticker).await,
                Err(reply) => vec![reply],
            },
            Command::Exchange(args) => match single_arg(&args, "exchange name") {
                Ok(name) => self.exchange(name).await,
                Err(reply) => vec![reply],
            },
        };
        Some(replies)
    }

    async fn update_db(&self) -> Vec<Reply> {
        let done = match self.lookup.refresh_indexes().await {
            Ok(summary) => Reply::plain(format!(
                "Update complete! {} coins and {} exchanges known.",
                summary.tickers, summary.exchanges
            )),
            Err(e) => {
                tracing::error!("Manual index update failed: {}", e);
                Reply::plain("Update failed, the previous coin and exchange lists are still in use.")
            }
        };
        vec![Reply::plain("Updating coin and exchange databases..."), done]
    }

    async fn exchanges(&self, ticker: &str) -> Vec<Reply> {
        match self.lookup.coin_exchanges(ticker).await {
            Ok(entry) if entry.exchanges.is_empty() => {
                vec![Reply::plain(format!("No exchanges found for {}.", ticker))]
            }
            Ok(entry) => Reply::markdown_chunks(&format::coin_exchanges(
                &entry.exchanges,
                self.lookup.source(),
            )),
            Err(e) => vec![failure(&e, ticker)],
        }
    }

    async fn cheapest(&self, ticker: &str) -> Vec<Reply> {
        match self.lookup.cheapest_pairs(ticker).await {
            Ok(rows) if rows.is_empty() => {
                vec![Reply::plain(format!("No trading pairs found for {}.", ticker))]
            }
            Ok(rows) => {
                Reply::markdown_chunks(&format::cheapest_pairs(&rows, self.lookup.source()))
            }
            Err(e) => vec![failure(&e, ticker)],
        }
    }

    async fn exchange(&self, name: &str) -> Vec<Reply> {
        match self.lookup.exchange_coins(name).await {
            Ok(entry) => {
                let rows = types::pairs_by_volume(&entry.coins);
                Reply::markdown_chunks(&format::exchange_summary(
                    name,
                    &entry,
                    &rows,
                    self.lookup.source(),
                ))
            }
            Err(e) => vec![failure(&e, name)],
        }
    }
}

fn single_arg<'a>(args: &'a [String], what: &str) -> Result<&'a str, Reply> {
    match args {
        [arg] => Ok(arg.as_str()),
        _ => Err(Reply::plain(format!(
            "Too few / many arguments! Please enter only 1 {}.",
            what
        ))),
    }
}

fn failure(err: &BotError, input: &str) -> Reply {
    if err.is_not_found() {
        tracing::info!("{} not found: {}", input, err);
    } else {
        tracing::error!("Lookup for {} failed: {}", input, err);
    }
    Reply::plain(err.user_message(input))
}
