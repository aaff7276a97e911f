//! Process-wide market state: time-stamped caches and lookup indexes

pub mod cache;


pub use cache::{
    is_stale, CacheStore, Clock, ExchangeIndex, ManualClock, SystemClock,
    TickerIndex, TimedCache, Timestamped, STALENESS_WINDOW_SECS,
};
