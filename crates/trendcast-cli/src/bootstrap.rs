//! Shared wiring for CLI commands: config, pool, and engine construction.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use sqlx::PgPool;

use trendcast_engine::{CallPolicy, WorkflowEngine};
use trendcast_llm::{LlmClient, LlmConfig};
use trendcast_news::NewsClient;

pub struct CliContext {
    pub pool: PgPool,
    pub engine: Arc<WorkflowEngine>,
}

/// Connect to the database only, enough for read-only commands.
pub async fn connect() -> anyhow::Result<PgPool> {
    let config = trendcast_core::load_app_config()?;
    let pool_config = trendcast_db::PoolConfig::from_app_config(&config);
    let pool = trendcast_db::connect_pool(&config.database_url, pool_config).await?;
    Ok(pool)
}

/// Build the full engine context used by pipeline-running commands.
pub async fn build() -> anyhow::Result<CliContext> {
    let config = trendcast_core::load_app_config()?;

    let pool_config = trendcast_db::PoolConfig::from_app_config(&config);
    let pool = trendcast_db::connect_pool(&config.database_url, pool_config).await?;
    trendcast_db::run_migrations(&pool).await?;

    let catalog = trendcast_core::load_sources(&config.sources_path)?;
    let llm = LlmClient::new(
        &LlmConfig::from_app_config(&config)
            .context("LLM client requires TRENDCAST_LLM_API_KEY")?,
    )?;
    let news = NewsClient::new(
        catalog,
        config.news_request_timeout_secs,
        &config.news_user_agent,
    )?;
    let store = trendcast_db::PgStore::new(pool.clone());

    let engine = Arc::new(WorkflowEngine::with_policy(
        Arc::new(llm),
        Arc::new(news),
        Arc::new(store),
        CallPolicy {
            timeout: Duration::from_secs(config.call_timeout_secs),
            delay: Duration::from_millis(config.inter_call_delay_ms),
        },
    ));

    Ok(CliContext { pool, engine })
}
