//! In-memory caches for scraped market data
//!
//! Entries carry their own fetch time; freshness is judged by the caller
//! against a fixed staleness window, so a stale entry stays readable until
//! a refresh replaces it.

use crate::types::{CoinEntry, ExchangeEntry};
use chrono::{DateTime, Duration, Utc};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;

/// Age after which a cache entry is eligible for refresh
pub const STALENESS_WINDOW_SECS: i64 = 60;

/// Source of "now" for freshness checks
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, secs: i64) {
        let mut now = self.now.lock();
        *now += Duration::seconds(secs);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// Entries that know when they were fetched
pub trait Timestamped {
    fn fetched_at(&self) -> DateTime<Utc>;
}

impl Timestamped for CoinEntry {
    fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }
}

impl Timestamped for ExchangeEntry {
    fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }
}

/// True once more than the staleness window has passed since `fetched_at`
pub fn is_stale(fetched_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now - fetched_at > Duration::seconds(STALENESS_WINDOW_SECS)
}

/// Key -> timestamped entry map. Entries are replaced whole, never patched.
#[derive(Debug)]
pub struct TimedCache<T> {
    entries: RwLock<HashMap<String, Arc<T>>>,
}

impl<T> Default for TimedCache<T> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl<T: Timestamped> TimedCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entry for `key`, fresh or stale
    pub fn get(&self, key: &str) -> Option<Arc<T>> {
        self.entries.read().get(key).cloned()
    }

    /// Entry for `key` only if it is still inside the staleness window
    pub fn get_fresh(&self, key: &str, now: DateTime<Utc>) -> Option<Arc<T>> {
        self.get(key)
            .filter(|entry| !is_stale(entry.fetched_at(), now))
    }

    /// Replace the entry for `key`
    pub fn insert(&self, key: &str, value: T) -> Arc<T> {
        let value = Arc::new(value);
        self.entries
            .write()
            .insert(key.to_string(), Arc::clone(&value));
        value
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

/// Uppercase ticker -> detail page path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickerIndex {
    paths: HashMap<String, String>,
}

impl TickerIndex {
    /// Build from (ticker, path) pairs; the first path seen for a ticker wins
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut paths = HashMap::new();
        for (ticker, path) in entries {
            paths.entry(ticker.to_uppercase()).or_insert(path);
        }
        Self { paths }
    }

    /// Detail path for a ticker, matched case-insensitively
    pub fn get(&self, ticker: &str) -> Option<&str> {
        self.paths.get(&ticker.to_uppercase()).map(String::as_str)
    }

    pub fn contains(&self, ticker: &str) -> bool {
        self.get(ticker).is_some()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Known exchange names, lowercase, in ranking-page order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExchangeIndex {
    names: Vec<String>,
}

impl ExchangeIndex {
    pub fn new(names: Vec<String>) -> Self {
        Self {
            names: names.into_iter().map(|n| n.to_lowercase()).collect(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.names.iter().any(|n| *n == name)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Every piece of process-wide market state, constructed once at startup
/// and shared by handle.
pub struct CacheStore {
    /// coin ticker -> ranked exchanges
    pub coin_exchanges: TimedCache<CoinEntry>,
    /// exchange name -> summary and ranked coins
    pub exchange_coins: TimedCache<ExchangeEntry>,
    tickers: RwLock<Arc<TickerIndex>>,
    exchanges: RwLock<Arc<ExchangeIndex>>,
    /// Held for the whole of any refresh or index rebuild
    refresh_gate: tokio::sync::Mutex<()>,
    clock: Arc<dyn Clock>,
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            coin_exchanges: TimedCache::new(),
            exchange_coins: TimedCache::new(),
            tickers: RwLock::new(Arc::new(TickerIndex::default())),
            exchanges: RwLock::new(Arc::new(ExchangeIndex::default())),
            refresh_gate: tokio::sync::Mutex::new(()),
            clock,
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn tickers(&self) -> Arc<TickerIndex> {
        self.tickers.read().clone()
    }

    pub fn exchanges(&self) -> Arc<ExchangeIndex> {
        self.exchanges.read().clone()
    }

    /// Swap in freshly built indexes, replacing both wholesale
    pub fn replace_indexes(&self, tickers: TickerIndex, exchanges: ExchangeIndex) {
        *self.tickers.write() = Arc::new(tickers);
        *self.exchanges.write() = Arc::new(exchanges);
    }

    /// Serialise refreshes; hold the guard across fetch + parse + insert
    pub async fn refresh_guard(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.refresh_gate.lock().await
    }
}
