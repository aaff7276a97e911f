//! CoinMarketCap Exchange Explorer Bot
//!
//! Runs the Telegram bot, or answers a single query from the command line.

use anyhow::Context;
use clap::{Parser, Subcommand};
use cmc_exchange_bot::{
    client::HttpFetcher,
    config::Config,
    lookup::MarketLookup,
    notify::{CommandHandler, TelegramBot},
    storage::CacheStore,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "exchange-bot")]
#[command(about = "Chat bot for exchange volumes and cheapest trading pairs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path (searches the default locations when omitted)
    #[arg(short, long)]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the Telegram bot
    Run,
    /// Show the top exchanges trading a coin
    Coin {
        /// Coin ticker, e.g. BTC
        ticker: String,
    },
    /// Show the cheapest trading pairs for a coin
    Cheapest {
        /// Coin ticker, e.g. BTC
        ticker: String,
    },
    /// Show an exchange's volume and top pairs
    Exchange {
        /// Exchange name as listed, e.g. binance
        name: String,
    },
    /// Rebuild the coin and exchange indexes and print their sizes
    Refresh,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cmc_exchange_bot=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };

    let fetcher = Arc::new(HttpFetcher::new(&config.source)?);
    let store = Arc::new(CacheStore::new());
    let lookup = MarketLookup::new(fetcher, store, config.source.clone());

    match cli.command {
        Commands::Run => run_bot(config, lookup).await,
        Commands::Coin { ticker } => one_shot(lookup, &format!("/e {}", ticker)).await,
        Commands::Cheapest { ticker } => one_shot(lookup, &format!("/m {}", ticker)).await,
        Commands::Exchange { name } => one_shot(lookup, &format!("/t {}", name)).await,
        Commands::Refresh => {
            let summary = lookup.refresh_indexes().await?;
            println!(
                "Indexed {} coins and {} exchanges",
                summary.tickers, summary.exchanges
            );
            Ok(())
        }
    }
}

async fn run_bot(config: Config, lookup: MarketLookup) -> anyhow::Result<()> {
    let token = config
        .telegram
        .resolve_token()
        .with_context(|| format!("reading bot token from {}", config.telegram.token_file))?;
    let bot = TelegramBot::new(token, &config.telegram)?;

    let lookup = Arc::new(lookup);
    let scheduler = lookup
        .clone()
        .spawn_index_refresh(config.index.refresh_interval_secs);

    let handler = CommandHandler::new(lookup.as_ref().clone());
    let result = bot.run(&handler).await;

    scheduler.abort();
    result.map_err(Into::into)
}

async fn one_shot(lookup: MarketLookup, command: &str) -> anyhow::Result<()> {
    lookup.refresh_indexes().await?;

    let handler = CommandHandler::new(lookup);
    let replies = handler.handle(command).await.unwrap_or_default();
    for reply in replies {
        println!("{}\n", reply.text);
    }
    Ok(())
}
