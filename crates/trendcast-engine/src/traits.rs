//! Collaborator contracts consumed by the workflow engine.
//!
//! Production implementations live in their own crates (`trendcast-llm`,
//! `trendcast-news`, `trendcast-db`); tests inject in-memory stubs. All
//! methods are fallible and the engine treats failures as "missing/default
//! value" per stage, never as fatal to the whole run.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use trendcast_core::{Article, NewPost, RunSummary, Trend};

/// Black-box natural-language service.
#[async_trait]
pub trait TextService: Send + Sync {
    /// Generate free-form text for a prompt, optionally steered by a system
    /// prompt and sampling temperature.
    async fn generate_text(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        temperature: Option<f32>,
    ) -> Result<String>;

    /// Extract up to `max_topics` main topics from a text.
    async fn extract_topics(&self, text: &str, max_topics: usize) -> Result<Vec<String>>;

    /// Generate up to `max_hashtags` hashtags (without the `#` prefix).
    async fn generate_hashtags(&self, text: &str, max_hashtags: usize) -> Result<Vec<String>>;

    /// Score text readability on a 0-100 scale (higher reads easier).
    async fn score_readability(&self, text: &str) -> Result<f64>;

    /// Rate a topic's audience relevance in `[0, 1]`. Implementations
    /// substitute 0.5 when the underlying response cannot be parsed.
    async fn assess_relevance(&self, topic: &str) -> Result<f64>;
}

/// Black-box news/article feed.
#[async_trait]
pub trait ArticleSource: Send + Sync {
    /// Fetch articles published within the last `hours_back` hours from the
    /// named source.
    async fn fetch_recent(&self, source: &str, hours_back: u32) -> Result<Vec<Article>>;
}

/// Durable record store. Each method is one independent atomic write or
/// query; the engine never spans a transaction across stages.
#[async_trait]
pub trait Store: Send + Sync {
    /// Insert or refresh a trend, returning its row id.
    async fn upsert_trend(&self, trend: &Trend) -> Result<i64>;

    /// Persist a draft post, returning its row id.
    async fn create_draft_post(&self, post: &NewPost) -> Result<i64>;

    /// Transition a draft post to scheduled with its publish timestamp.
    async fn mark_post_scheduled(&self, post_id: i64, publish_at: DateTime<Utc>) -> Result<()>;

    /// Trend ids referenced by posts created at or after `cutoff`.
    async fn trend_ids_posted_since(&self, cutoff: DateTime<Utc>) -> Result<Vec<i64>>;

    /// Append a run summary to the activity log.
    async fn record_run(&self, summary: &RunSummary) -> Result<()>;
}
