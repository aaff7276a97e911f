//! Core data types for scraped market data

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Maximum number of entities kept in a ranked list
pub const TOP_N: usize = 10;

/// One market row seen for an entity: a trading pair with its volume and price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub trading_pair: String,
    pub volume: u64,
    pub price: Decimal,
    pub url: String,
    /// Row rank, only present for rows parsed from an exchange table
    pub rank: Option<String>,
}

/// Every observation of one exchange (or coin) within a single parse pass,
/// with the running volume total
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketAggregate {
    total_volume: u64,
    details: Vec<Observation>,
}

impl MarketAggregate {
    /// Start an aggregate from its first observation
    pub fn new(first: Observation) -> Self {
        Self {
            total_volume: first.volume,
            details: vec![first],
        }
    }

    /// Append a fully-formed observation and accumulate its volume
    pub fn push(&mut self, observation: Observation) {
        self.total_volume = self.total_volume.saturating_add(observation.volume);
        self.details.push(observation);
    }

    pub fn total_volume(&self) -> u64 {
        self.total_volume
    }

    pub fn details(&self) -> &[Observation] {
        &self.details
    }

    /// Observation seen first for this entity
    pub fn primary(&self) -> &Observation {
        // details is never empty: construction requires a first observation
        &self.details[0]
    }
}

/// Entities paired with their aggregate, in ranking order
pub type Ranked = Vec<(String, MarketAggregate)>;

/// Cached exchange ranking for one coin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoinEntry {
    pub exchanges: Ranked,
    pub fetched_at: DateTime<Utc>,
}

/// Cached summary and coin ranking for one exchange
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeEntry {
    pub rank: String,
    /// Volume exactly as displayed on the exchange page
    pub volume: String,
    pub url: String,
    pub coins: Ranked,
    pub fetched_at: DateTime<Utc>,
}

/// One trading pair flattened out of a ranked list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairRow {
    /// Exchange name (coin lookups) or coin name (exchange lookups)
    pub name: String,
    pub trading_pair: String,
    pub volume: u64,
    pub price: Decimal,
    pub url: String,
    pub rank: Option<String>,
}

impl PairRow {
    fn from_observation(name: &str, obs: &Observation) -> Self {
        Self {
            name: name.to_string(),
            trading_pair: obs.trading_pair.clone(),
            volume: obs.volume,
            price: obs.price,
            url: obs.url.clone(),
            rank: obs.rank.clone(),
        }
    }
}

/// Every observation of a ranked list, in ranking then encounter order
pub fn flatten(ranked: &[(String, MarketAggregate)]) -> Vec<PairRow> {
    ranked
        .iter()
        .flat_map(|(name, agg)| {
            agg.details()
                .iter()
                .map(move |obs| PairRow::from_observation(name, obs))
        })
        .collect()
}

/// Sort by total volume descending (stable, so ties keep encounter order)
/// and keep at most `limit` entries
pub fn rank_by_volume(mut entries: Ranked, limit: usize) -> Ranked {
    entries.sort_by(|a, b| b.1.total_volume().cmp(&a.1.total_volume()));
    entries.truncate(limit);
    entries
}

/// Cheapest trading pairs among the most liquid exchanges of a coin
pub fn cheapest_pairs(exchanges: &[(String, MarketAggregate)], limit: usize) -> Vec<PairRow> {
    let mut rows = flatten(exchanges);
    rows.truncate(limit);
    rows.sort_by(|a, b| a.price.cmp(&b.price));
    rows
}

/// Every pair traded on an exchange, highest volume first
pub fn pairs_by_volume(coins: &[(String, MarketAggregate)]) -> Vec<PairRow> {
    let mut rows = flatten(coins);
    rows.sort_by(|a, b| b.volume.cmp(&a.volume));
    rows
}
