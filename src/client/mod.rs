//! Page fetching for the market aggregator site
//!
//! - `HttpFetcher`: reqwest-backed fetcher with a request timeout
//! - `StaticFetcher`: in-memory pages for tests and offline runs

mod http;
pub mod mock;

pub use http::HttpFetcher;
pub use mock::StaticFetcher;

use crate::error::Result;
use async_trait::async_trait;
use scraper::Html;

/// Raw HTML page returned by a fetcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub url: String,
    pub body: String,
}

impl Page {
    pub fn new(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            body: body.into(),
        }
    }

    /// Parse the body into a traversable document tree
    pub fn document(&self) -> Html {
        Html::parse_document(&self.body)
    }
}

/// Fetches pages by url. `Ok(None)` means the server answered 404.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Option<Page>>;
}
