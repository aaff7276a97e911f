//! In-memory page fetcher
//!
//! Serves canned HTML by url for:
//! - Unit tests without network calls
//! - Offline runs against saved pages

use super::{Page, PageFetcher};
use crate::error::{BotError, Result};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Fetcher backed by a url -> body map. Unknown urls answer 404.
#[derive(Default)]
pub struct StaticFetcher {
    pages: RwLock<HashMap<String, String>>,
    calls: RwLock<HashMap<String, usize>>,
    total_calls: AtomicUsize,
    failing: RwLock<bool>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style page registration
    pub fn with_page(self, url: &str, body: &str) -> Self {
        self.set_page(url, body);
        self
    }

    /// Register or replace the body served for `url`
    pub fn set_page(&self, url: &str, body: &str) {
        self.pages.write().insert(url.to_string(), body.to_string());
    }

    pub fn remove_page(&self, url: &str) {
        self.pages.write().remove(url);
    }

    /// Make every fetch fail as if the network were down
    pub fn set_failing(&self, failing: bool) {
        *self.failing.write() = failing;
    }

    /// Number of fetches issued for `url`
    pub fn calls(&self, url: &str) -> usize {
        self.calls.read().get(url).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.total_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<Option<Page>> {
        self.total_calls.fetch_add(1, Ordering::SeqCst);
        *self.calls.write().entry(url.to_string()).or_insert(0) += 1;

        if *self.failing.read() {
            return Err(BotError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                format!("simulated transport failure for {}", url),
            )));
        }

        Ok(self
            .pages
            .read()
            .get(url)
            .map(|body| Page::new(url, body.as_str())))
    }
}
