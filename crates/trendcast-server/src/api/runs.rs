use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::middleware::RequestId;

use super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct RunItem {
    pub run_id: String,
    pub kind: String,
    pub status: String,
    pub trends_found: i32,
    pub content_generated: i32,
    pub posts_scheduled: i32,
    pub errors: Value,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl From<trendcast_db::WorkflowRunRow> for RunItem {
    fn from(row: trendcast_db::WorkflowRunRow) -> Self {
        Self {
            run_id: row.run_id,
            kind: row.kind,
            status: row.status,
            trends_found: row.trends_found,
            content_generated: row.content_generated,
            posts_scheduled: row.posts_scheduled,
            errors: row.errors,
            started_at: row.started_at,
            completed_at: row.completed_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct RunsQuery {
    pub limit: Option<i64>,
}

pub(super) async fn list_runs(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<RunsQuery>,
) -> Result<Json<ApiResponse<Vec<RunItem>>>, ApiError> {
    let rows = trendcast_db::list_runs(&state.pool, normalize_limit(query.limit))
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: rows.into_iter().map(RunItem::from).collect(),
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn get_run(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(run_id): Path<String>,
) -> Result<Json<ApiResponse<RunItem>>, ApiError> {
    let row = trendcast_db::get_run(&state.pool, &run_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: RunItem::from(row),
        meta: ResponseMeta::new(req_id.0),
    }))
}
