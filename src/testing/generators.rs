//! Page Generators
//!
//! Build minimal HTML in the shape of the aggregator's pages

use crate::client::StaticFetcher;
use crate::config::SourceConfig;
use crate::lookup::MarketLookup;
use crate::storage::{CacheStore, ManualClock};
use chrono::{TimeZone, Utc};
use std::sync::Arc;

pub const BASE_URL: &str = "https://cmc.test";

/// One market row: counterpart name, pair label, pair href, volume text, price text
#[derive(Debug, Clone)]
pub struct MarketRow {
    pub name: String,
    pub pair: String,
    pub href: String,
    pub volume: String,
    pub price: String,
}

impl MarketRow {
    pub fn new(name: &str, pair: &str, volume: &str, price: &str) -> Self {
        Self {
            name: name.to_string(),
            pair: pair.to_string(),
            href: format!("https://{}.test/trade/{}", name.to_lowercase().replace(' ', "-"), pair),
            volume: volume.to_string(),
            price: price.to_string(),
        }
    }

    fn to_html(&self, rank: usize) -> String {
        format!(
            "<tr>\n  <td>{rank}</td>\n  <td><a href=\"/x/\">{name}</a></td>\n  \
             <td><a href=\"{href}\">{pair}</a></td>\n  \
             <td><span class=\"volume\">{volume}</span></td>\n  \
             <td><span class=\"price\">{price}</span></td>\n</tr>\n",
            rank = rank,
            name = self.name,
            href = self.href,
            pair = self.pair,
            volume = self.volume,
            price = self.price,
        )
    }
}

const SPACER_ROW: &str = "<tr class=\"spacer\"><td colspan=\"5\"></td></tr>\n";

/// Coin listing page: data row + spacer row per coin
pub fn listing_page(coins: &[(&str, &str)]) -> String {
    let rows: String = coins
        .iter()
        .enumerate()
        .map(|(i, (ticker, path))| {
            format!(
                "<tr id=\"id-{i}\">\n  <td>{rank}</td>\n  \
                 <td class=\"currency-name\"><a class=\"currency-name-container link-secondary\" href=\"{path}\">Coin {i}</a></td>\n  \
                 <td class=\"text-left col-symbol\">{ticker}</td>\n</tr>\n{spacer}",
                i = i,
                rank = i + 1,
                path = path,
                ticker = ticker,
                spacer = SPACER_ROW,
            )
        })
        .collect();

    format!(
        "<html><body>\n<table id=\"currencies-all\">\n<thead><tr><th>#</th><th>Name</th><th>Symbol</th></tr></thead>\n\
         <tbody>\n{}</tbody>\n</table>\n</body></html>",
        rows
    )
}

/// Coin detail page with its markets table: data row + spacer row per market
pub fn markets_page(rows: &[MarketRow]) -> String {
    let body: String = rows
        .iter()
        .enumerate()
        .map(|(i, row)| format!("{}{}", row.to_html(i + 1), SPACER_ROW))
        .collect();

    format!(
        "<html><body>\n<table id=\"markets-table\">\n<thead><tr><th>#</th><th>Source</th><th>Pair</th><th>Volume (24h)</th><th>Price</th></tr></thead>\n\
         <tbody>\n{}</tbody>\n</table>\n</body></html>",
        body
    )
}

/// One exchange block on the ranking page
#[derive(Debug, Clone)]
pub struct ExchangeBlock {
    pub rank: usize,
    pub display_name: String,
    pub slug: String,
    pub coins: Vec<MarketRow>,
    pub view_more: bool,
}

impl ExchangeBlock {
    pub fn new(rank: usize, display_name: &str, coins: Vec<MarketRow>) -> Self {
        Self {
            rank,
            display_name: display_name.to_string(),
            slug: display_name.to_lowercase().replace(' ', "-"),
            coins,
            view_more: false,
        }
    }

    pub fn detail_path(&self) -> String {
        format!("/exchanges/{}/", self.slug)
    }

    fn to_html(&self) -> String {
        let mut html = format!(
            "<tr id=\"{slug}\">\n  <td colspan=\"5\"><h3 class=\"volume-header\">{rank}.\n    \
             <a href=\"{path}\">{name}</a>\n  </h3></td>\n</tr>\n\
             <tr><th>#</th><th>Currency</th><th>Pair</th><th>Volume (24h)</th><th>Price</th></tr>\n",
            slug = self.slug,
            rank = self.rank,
            path = self.detail_path(),
            name = self.display_name,
        );
        for (i, coin) in self.coins.iter().enumerate() {
            html.push_str(&coin.to_html(i + 1));
        }
        if self.view_more {
            html.push_str("<tr><td colspan=\"5\" class=\"text-center\">\nView More\n</td></tr>\n");
        }
        html.push_str("<tr><td colspan=\"3\">Total</td><td>$0</td><td></td></tr>\n");
        html
    }
}

/// Exchange volume ranking page
pub fn ranking_page(blocks: &[ExchangeBlock]) -> String {
    let body: String = blocks.iter().map(ExchangeBlock::to_html).collect();
    format!(
        "<html><body>\n<table class=\"table table-condensed border-top\">\n{}</table>\n</body></html>",
        body
    )
}

/// Exchange detail page with website link and displayed volume
pub fn exchange_detail_page(website: &str, volume: &str) -> String {
    format!(
        "<html><body>\n<div class=\"row\">\n<div class=\"col-sm-8 bottom-margin-1x\">\n  \
         <span class=\"hidden-xs\">Volume (24h)</span>\n  <span class=\"h2 text-semi-bold\">{volume}</span>\n</div>\n\
         <ul class=\"list-unstyled\">\n  <li><span class=\"glyphicon glyphicon-link\"></span><a href=\"{website}\" target=\"_blank\">Website</a></li>\n  \
         <li><a href=\"https://twitter.com/x\">Twitter</a></li>\n</ul>\n</div>\n</body></html>",
        volume = volume,
        website = website,
    )
}

/// In-memory site plus a lookup wired to it
pub struct TestSite {
    pub fetcher: Arc<StaticFetcher>,
    pub clock: Arc<ManualClock>,
    pub store: Arc<CacheStore>,
    pub lookup: MarketLookup,
    pub source: SourceConfig,
}

impl TestSite {
    pub fn new() -> Self {
        let source = SourceConfig {
            base_url: BASE_URL.to_string(),
            ..SourceConfig::default()
        };
        let fetcher = Arc::new(StaticFetcher::new());
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap(),
        ));
        let store = Arc::new(CacheStore::with_clock(clock.clone()));
        let lookup = MarketLookup::new(fetcher.clone(), store.clone(), source.clone());

        Self {
            fetcher,
            clock,
            store,
            lookup,
            source,
        }
    }

    pub fn url(&self, path: &str) -> String {
        self.source.url_for(path)
    }

    pub fn serve_listing(&self, coins: &[(&str, &str)]) {
        self.fetcher
            .set_page(&self.source.listing_url(), &listing_page(coins));
    }

    pub fn serve_ranking(&self, blocks: &[ExchangeBlock]) {
        self.fetcher
            .set_page(&self.source.exchanges_url(), &ranking_page(blocks));
    }

    pub fn serve_markets(&self, path: &str, rows: &[MarketRow]) {
        self.fetcher.set_page(&self.url(path), &markets_page(rows));
    }

    pub fn serve_exchange_detail(&self, block: &ExchangeBlock, website: &str, volume: &str) {
        self.fetcher.set_page(
            &self.url(&block.detail_path()),
            &exchange_detail_page(website, volume),
        );
    }
}
