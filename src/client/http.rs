//! HTTP page fetcher

use super::{Page, PageFetcher};
use crate::config::SourceConfig;
use crate::error::Result;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

pub struct HttpFetcher {
    http: Client,
}

impl HttpFetcher {
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { http })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Option<Page>> {
        tracing::debug!("GET {}", url);
        let response = self.http.get(url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            tracing::info!("Source page not found: {}", url);
            return Ok(None);
        }

        let body = response.text().await?;
        Ok(Some(Page::new(url, body)))
    }
}
