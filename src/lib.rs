//! CoinMarketCap Exchange Explorer Bot
//!
//! A chat bot answering which exchanges trade a coin, where the coin is
//! cheapest, and what an exchange trades most, scraped from the market
//! aggregator's public pages and cached with a short staleness window.

pub mod client;
pub mod config;
pub mod error;
pub mod lookup;
pub mod notify;
pub mod parser;
pub mod storage;
pub mod types;

#[cfg(test)]
mod error_tests;
#[cfg(test)]
pub(crate) mod testing;
