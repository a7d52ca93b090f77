//! RSS/Atom article source for trendcast.
//!
//! Fetches feeds listed in the source catalog, parses them with feed-rs,
//! applies a recency cutoff, and keeps only articles relevant to a tech
//! audience. Implements the engine's [`trendcast_engine::ArticleSource`]
//! contract.

pub mod error;
mod feed;

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;

use trendcast_core::{Article, SourcesFile};
use trendcast_engine::ArticleSource;

pub use error::NewsError;
pub use feed::parse_feed;

/// Feed-reading client over the configured source catalog.
pub struct NewsClient {
    client: reqwest::Client,
    catalog: SourcesFile,
}

impl NewsClient {
    /// Build a client for the given catalog.
    ///
    /// # Errors
    ///
    /// Returns [`NewsError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        catalog: SourcesFile,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, NewsError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        Ok(Self { client, catalog })
    }

    async fn fetch_source(&self, source: &str, hours_back: u32) -> Result<Vec<Article>, NewsError> {
        let feed_source = self
            .catalog
            .get(source)
            .ok_or_else(|| NewsError::UnknownSource(source.to_string()))?;

        tracing::info!(source, hours_back, url = %feed_source.feed_url, "fetching feed");

        let bytes = self
            .client
            .get(&feed_source.feed_url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        let cutoff = Utc::now() - chrono::Duration::hours(i64::from(hours_back));
        let articles = parse_feed(&bytes, &feed_source.name, cutoff)?;

        tracing::info!(source, count = articles.len(), "fetched relevant articles");
        Ok(articles)
    }
}

#[async_trait]
impl ArticleSource for NewsClient {
    async fn fetch_recent(&self, source: &str, hours_back: u32) -> Result<Vec<Article>> {
        Ok(self.fetch_source(source, hours_back).await?)
    }
}
