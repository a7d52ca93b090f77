//! Background job scheduler.
//!
//! Initialises a [`JobScheduler`] at server startup and registers the
//! recurring pipeline jobs. Job bodies consult the automation switch and the
//! run gate, so an idle or overlapping trigger is a cheap no-op.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use trendcast_core::{RunConfig, RunKind};
use trendcast_engine::WorkflowEngine;

use crate::api::AutomationState;
use crate::flight::RunGate;

/// Builds and starts the background job scheduler.
///
/// Registers the daily full-pipeline job and the periodic trend refresh, and
/// starts the scheduler. Returns the running [`JobScheduler`] handle, which
/// must be kept alive for the lifetime of the process — dropping it shuts
/// down all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// a job cannot be registered, or the scheduler fails to start.
pub async fn build_scheduler(
    engine: Arc<WorkflowEngine>,
    automation: Arc<AutomationState>,
    gate: Arc<RunGate>,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    register_daily_pipeline_job(
        &scheduler,
        Arc::clone(&engine),
        Arc::clone(&automation),
        Arc::clone(&gate),
    )
    .await?;
    register_trend_refresh_job(&scheduler, engine, automation, gate).await?;

    scheduler.start().await?;
    Ok(scheduler)
}

/// Register the daily full-pipeline job at 08:00 UTC (`0 0 8 * * *`).
async fn register_daily_pipeline_job(
    scheduler: &JobScheduler,
    engine: Arc<WorkflowEngine>,
    automation: Arc<AutomationState>,
    gate: Arc<RunGate>,
) -> Result<(), JobSchedulerError> {
    let job = Job::new_async("0 0 8 * * *", move |_uuid, _lock| {
        let engine = Arc::clone(&engine);
        let automation = Arc::clone(&automation);
        let gate = Arc::clone(&gate);

        Box::pin(async move {
            if !automation.enabled.load(Ordering::SeqCst) {
                tracing::debug!("scheduler: automation disabled; skipping daily pipeline");
                return;
            }

            let Some(permit) = gate.try_begin(RunKind::Daily) else {
                tracing::warn!("scheduler: daily run already in flight; skipping");
                return;
            };
            let _permit = permit;

            tracing::info!("scheduler: starting daily pipeline run");
            match engine.run_pipeline(RunKind::Daily, RunConfig::default()).await {
                Ok(summary) => {
                    tracing::info!(
                        run_id = %summary.run_id,
                        scheduled = summary.posts_scheduled,
                        errors = summary.errors.len(),
                        "scheduler: daily pipeline run complete"
                    );
                }
                Err(e) => {
                    tracing::error!(error = %e, "scheduler: daily pipeline run rejected");
                }
            }
        })
    })?;

    scheduler.add(job).await?;
    Ok(())
}

/// Register the trend-only refresh at 08/12/16/20 UTC (`0 0 8,12,16,20 * * *`).
async fn register_trend_refresh_job(
    scheduler: &JobScheduler,
    engine: Arc<WorkflowEngine>,
    automation: Arc<AutomationState>,
    gate: Arc<RunGate>,
) -> Result<(), JobSchedulerError> {
    let job = Job::new_async("0 0 8,12,16,20 * * *", move |_uuid, _lock| {
        let engine = Arc::clone(&engine);
        let automation = Arc::clone(&automation);
        let gate = Arc::clone(&gate);

        Box::pin(async move {
            if !automation.enabled.load(Ordering::SeqCst) {
                tracing::debug!("scheduler: automation disabled; skipping trend refresh");
                return;
            }

            let Some(permit) = gate.try_begin(RunKind::Trends) else {
                tracing::warn!("scheduler: trend refresh already in flight; skipping");
                return;
            };
            let _permit = permit;

            tracing::info!("scheduler: starting trend refresh");
            match engine.refresh_trends(RunConfig::default()).await {
                Ok(summary) => {
                    tracing::info!(
                        run_id = %summary.run_id,
                        trends = summary.trends_found,
                        "scheduler: trend refresh complete"
                    );
                }
                Err(e) => {
                    tracing::error!(error = %e, "scheduler: trend refresh rejected");
                }
            }
        })
    })?;

    scheduler.add(job).await?;
    Ok(())
}
