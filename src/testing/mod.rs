//! Test support for the scraping pipeline
//!
//! Provides:
//! - HTML page generators reproducing the upstream page shapes
//! - A pre-wired lookup over an in-memory fetcher and a manual clock

pub mod generators;

pub use generators::{
    exchange_detail_page, listing_page, markets_page, ranking_page, ExchangeBlock, MarketRow,
    TestSite,
};
