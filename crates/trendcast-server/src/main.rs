mod api;
mod flight;
mod middleware;
mod scheduler;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use trendcast_engine::{CallPolicy, WorkflowEngine};
use trendcast_llm::{LlmClient, LlmConfig};
use trendcast_news::NewsClient;

use crate::{
    api::{build_app, default_rate_limit_state, AppState, AutomationState},
    flight::RunGate,
    middleware::AuthState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(trendcast_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = trendcast_db::PoolConfig::from_app_config(&config);
    let pool = trendcast_db::connect_pool(&config.database_url, pool_config).await?;
    trendcast_db::run_migrations(&pool).await?;

    let catalog = trendcast_core::load_sources(&config.sources_path)?;
    let llm = LlmClient::new(&LlmConfig::from_app_config(&config).context(
        "LLM client requires TRENDCAST_LLM_API_KEY",
    )?)?;
    let news = NewsClient::new(
        catalog,
        config.news_request_timeout_secs,
        &config.news_user_agent,
    )?;
    let store = trendcast_db::PgStore::new(pool.clone());

    // One engine per process; shared by reference into the API and cron jobs.
    let engine = Arc::new(WorkflowEngine::with_policy(
        Arc::new(llm),
        Arc::new(news),
        Arc::new(store),
        CallPolicy {
            timeout: Duration::from_secs(config.call_timeout_secs),
            delay: Duration::from_millis(config.inter_call_delay_ms),
        },
    ));

    let automation = Arc::new(AutomationState::default());
    let gate = Arc::new(RunGate::default());

    let _scheduler = scheduler::build_scheduler(
        Arc::clone(&engine),
        Arc::clone(&automation),
        Arc::clone(&gate),
    )
    .await?;

    let auth = AuthState::from_env(matches!(
        config.env,
        trendcast_core::Environment::Development
    ))?;
    let app = build_app(
        AppState {
            pool,
            engine,
            automation,
            gate,
        },
        auth,
        default_rate_limit_state(),
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "trendcast server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
