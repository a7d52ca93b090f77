//! Database operations for the `workflow_runs` activity log.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use trendcast_core::RunSummary;

use crate::DbError;

/// A row from the `workflow_runs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WorkflowRunRow {
    pub id: i64,
    pub run_id: String,
    pub kind: String,
    pub status: String,
    pub trends_found: i32,
    pub content_generated: i32,
    pub posts_scheduled: i32,
    /// JSON array of collected error strings.
    pub errors: serde_json::Value,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Append a run summary to the activity log.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_run_summary(pool: &PgPool, summary: &RunSummary) -> Result<(), DbError> {
    let status = if summary.errors.is_empty() {
        "succeeded"
    } else {
        "completed_with_errors"
    };

    sqlx::query(
        "INSERT INTO workflow_runs \
         (run_id, kind, status, trends_found, content_generated, posts_scheduled, \
          errors, started_at, completed_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
    )
    .bind(&summary.run_id)
    .bind(summary.kind.as_str())
    .bind(status)
    .bind(i32::try_from(summary.trends_found).unwrap_or(i32::MAX))
    .bind(i32::try_from(summary.content_generated).unwrap_or(i32::MAX))
    .bind(i32::try_from(summary.posts_scheduled).unwrap_or(i32::MAX))
    .bind(serde_json::json!(summary.errors))
    .bind(summary.started_at)
    .bind(summary.completed_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// List run summaries, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_runs(pool: &PgPool, limit: i64) -> Result<Vec<WorkflowRunRow>, DbError> {
    let rows = sqlx::query_as::<_, WorkflowRunRow>(
        "SELECT id, run_id, kind, status, trends_found, content_generated, \
                posts_scheduled, errors, started_at, completed_at, created_at \
         FROM workflow_runs \
         ORDER BY started_at DESC \
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Fetch one run by its public run identifier.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no such run exists, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn get_run(pool: &PgPool, run_id: &str) -> Result<WorkflowRunRow, DbError> {
    let row = sqlx::query_as::<_, WorkflowRunRow>(
        "SELECT id, run_id, kind, status, trends_found, content_generated, \
                posts_scheduled, errors, started_at, completed_at, created_at \
         FROM workflow_runs \
         WHERE run_id = $1",
    )
    .bind(run_id)
    .fetch_optional(pool)
    .await?;

    row.ok_or(DbError::NotFound)
}
