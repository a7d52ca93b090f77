use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::middleware::RequestId;

use super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct TrendItem {
    pub id: i64,
    pub topic: String,
    pub hashtags: Value,
    pub relevance_score: f64,
    pub mention_count: i32,
    pub source: String,
    pub detected_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub(super) struct TrendsQuery {
    pub limit: Option<i64>,
}

pub(super) async fn list_trends(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<TrendsQuery>,
) -> Result<Json<ApiResponse<Vec<TrendItem>>>, ApiError> {
    let rows = trendcast_db::list_active_trends(&state.pool, normalize_limit(query.limit))
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows
        .into_iter()
        .map(|row| TrendItem {
            id: row.id,
            topic: row.topic,
            hashtags: row.hashtags,
            relevance_score: row.relevance_score,
            mention_count: row.mention_count,
            source: row.source,
            detected_at: row.detected_at,
        })
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
