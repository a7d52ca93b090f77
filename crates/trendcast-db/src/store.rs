//! Postgres-backed implementation of the engine's [`Store`] trait.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use trendcast_core::{NewPost, RunSummary, Trend};
use trendcast_engine::Store;

use crate::{posts, runs, trends};

/// Adapter handing the engine independent atomic writes against Postgres.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn upsert_trend(&self, trend: &Trend) -> Result<i64> {
        Ok(trends::upsert_trend(&self.pool, trend).await?)
    }

    async fn create_draft_post(&self, post: &NewPost) -> Result<i64> {
        Ok(posts::insert_draft_post(&self.pool, post).await?)
    }

    async fn mark_post_scheduled(&self, post_id: i64, publish_at: DateTime<Utc>) -> Result<()> {
        Ok(posts::mark_post_scheduled(&self.pool, post_id, publish_at).await?)
    }

    async fn trend_ids_posted_since(&self, cutoff: DateTime<Utc>) -> Result<Vec<i64>> {
        Ok(posts::trend_ids_posted_since(&self.pool, cutoff).await?)
    }

    async fn record_run(&self, summary: &RunSummary) -> Result<()> {
        Ok(runs::insert_run_summary(&self.pool, summary).await?)
    }
}
