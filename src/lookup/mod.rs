//! Cached market lookups
//!
//! Serves coin and exchange queries from the `CacheStore`, re-scraping a
//! key's page when its entry is missing or older than the staleness window.
//! Index rebuilds (tickers + exchanges) run separately on a long interval.


use crate::client::{Page, PageFetcher};
use crate::config::SourceConfig;
use crate::error::{BotError, IndexKind, Result};
use crate::parser;
use crate::storage::{CacheStore, ExchangeIndex};
use crate::types::{self, CoinEntry, ExchangeEntry, PairRow, TOP_N};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Sizes of freshly rebuilt indexes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexSummary {
    pub tickers: usize,
    pub exchanges: usize,
}

/// Get-with-refresh over the coin and exchange caches
#[derive(Clone)]
pub struct MarketLookup {
    fetcher: Arc<dyn PageFetcher>,
    store: Arc<CacheStore>,
    source: SourceConfig,
}

impl MarketLookup {
    pub fn new(fetcher: Arc<dyn PageFetcher>, store: Arc<CacheStore>, source: SourceConfig) -> Self {
        Self {
            fetcher,
            store,
            source,
        }
    }

    pub fn source(&self) -> &SourceConfig {
        &self.source
    }

    /// Top exchanges trading `ticker`, ranked by total volume
    pub async fn coin_exchanges(&self, ticker: &str) -> Result<Arc<CoinEntry>> {
        let ticker = ticker.trim().to_uppercase();
        let path = self
            .store
            .tickers()
            .get(&ticker)
            .map(str::to_string)
            .ok_or_else(|| BotError::NotFoundInIndex {
                kind: IndexKind::Ticker,
                key: ticker.clone(),
            })?;

        if let Some(entry) = self.store.coin_exchanges.get_fresh(&ticker, self.store.now()) {
            tracing::debug!("Coin {} served from cache", ticker);
            return Ok(entry);
        }

        let _guard = self.store.refresh_guard().await;

        // A concurrent lookup may have refreshed this key while we waited
        if let Some(entry) = self.store.coin_exchanges.get_fresh(&ticker, self.store.now()) {
            return Ok(entry);
        }

        self.refresh_coin(&ticker, &path).await.inspect_err(|e| {
            tracing::warn!("Error updating {}: {}", ticker, e);
        })
    }

    async fn refresh_coin(&self, ticker: &str, path: &str) -> Result<Arc<CoinEntry>> {
        if self.store.coin_exchanges.get(ticker).is_some() {
            tracing::info!("Updating cache for {}", ticker);
        } else {
            tracing::info!("Processing exchange data for {}", ticker);
        }

        let page = self.fetch_required(&self.source.url_for(path)).await?;
        let exchanges = parser::parse_coin_markets(&page)?;

        tracing::info!("{} updated with {} exchanges", ticker, exchanges.len());
        Ok(self.store.coin_exchanges.insert(
            ticker,
            CoinEntry {
                exchanges,
                fetched_at: self.store.now(),
            },
        ))
    }

    /// Cheapest pairs among the most liquid exchanges for `ticker`
    pub async fn cheapest_pairs(&self, ticker: &str) -> Result<Vec<PairRow>> {
        let entry = self.coin_exchanges(ticker).await?;
        Ok(types::cheapest_pairs(&entry.exchanges, TOP_N))
    }

    /// Summary and top coins of `exchange`
    pub async fn exchange_coins(&self, exchange: &str) -> Result<Arc<ExchangeEntry>> {
        let exchange = exchange.trim().to_lowercase();
        if !self.store.exchanges().contains(&exchange) {
            return Err(BotError::NotFoundInIndex {
                kind: IndexKind::Exchange,
                key: exchange,
            });
        }

        if let Some(entry) = self.store.exchange_coins.get_fresh(&exchange, self.store.now()) {
            tracing::debug!("Exchange {} served from cache", exchange);
            return Ok(entry);
        }

        let _guard = self.store.refresh_guard().await;

        if let Some(entry) = self.store.exchange_coins.get_fresh(&exchange, self.store.now()) {
            return Ok(entry);
        }

        self.refresh_exchange(&exchange).await.inspect_err(|e| {
            tracing::warn!("Error updating {}: {}", exchange, e);
        })
    }

    async fn refresh_exchange(&self, exchange: &str) -> Result<Arc<ExchangeEntry>> {
        tracing::info!("Processing trading pair volume data for {}", exchange);

        let ranking_url = self.source.exchanges_url();
        let ranking = self.fetch_required(&ranking_url).await?;
        let section = parser::parse_exchange_section(&ranking, exchange)?
            .ok_or_else(|| BotError::UpstreamNotFound(format!("{}#{}", ranking_url, exchange)))?;

        let detail_page = self
            .fetch_required(&self.source.url_for(&section.detail_path))
            .await?;
        let detail = parser::parse_exchange_detail(&detail_page)?;

        tracing::info!("{} updated with {} coins", exchange, section.coins.len());
        Ok(self.store.exchange_coins.insert(
            exchange,
            ExchangeEntry {
                rank: section.rank,
                volume: detail.volume,
                url: detail.url,
                coins: section.coins,
                fetched_at: self.store.now(),
            },
        ))
    }

    /// Rebuild the ticker and exchange indexes from scratch.
    ///
    /// Both indexes are built before either is swapped in, so a failure
    /// leaves the previous pair in place.
    pub async fn refresh_indexes(&self) -> Result<IndexSummary> {
        let _guard = self.store.refresh_guard().await;

        tracing::info!("Updating coin and exchange indexes...");
        let listing = self.fetch_required(&self.source.listing_url()).await?;
        let tickers = parser::parse_coin_listing(&listing)?;

        let ranking = self.fetch_required(&self.source.exchanges_url()).await?;
        let exchanges = ExchangeIndex::new(parser::parse_exchange_index(&ranking)?);

        let summary = IndexSummary {
            tickers: tickers.len(),
            exchanges: exchanges.len(),
        };
        self.store.replace_indexes(tickers, exchanges);

        tracing::info!(
            "Index update complete: {} tickers, {} exchanges",
            summary.tickers,
            summary.exchanges
        );
        Ok(summary)
    }

    /// Rebuild indexes now and then every `interval_secs`
    pub fn spawn_index_refresh(self: Arc<Self>, interval_secs: u64) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
            loop {
                interval.tick().await;
                tracing::debug!("Scheduled index refresh");
                if let Err(e) = self.refresh_indexes().await {
                    tracing::error!("Scheduled index refresh failed: {}", e);
                }
            }
        })
    }

    async fn fetch_required(&self, url: &str) -> Result<Page> {
        self.fetcher
            .fetch(url)
            .await?
            .ok_or_else(|| BotError::UpstreamNotFound(url.to_string()))
    }
}
