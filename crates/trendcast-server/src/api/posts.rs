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
pub(super) struct PostItem {
    pub id: i64,
    pub content: String,
    pub hashtags: Value,
    pub readability_score: Option<f64>,
    pub engagement_score: Option<f64>,
    pub character_count: i32,
    pub status: String,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub trend_topic_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub(super) struct PostsQuery {
    pub limit: Option<i64>,
    pub status: Option<String>,
}

pub(super) async fn list_posts(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<PostsQuery>,
) -> Result<Json<ApiResponse<Vec<PostItem>>>, ApiError> {
    let rows = trendcast_db::list_recent_posts(
        &state.pool,
        normalize_limit(query.limit),
        query.status.as_deref(),
    )
    .await
    .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows
        .into_iter()
        .map(|row| PostItem {
            id: row.id,
            content: row.content,
            hashtags: row.hashtags,
            readability_score: row.readability_score,
            engagement_score: row.engagement_score,
            character_count: row.character_count,
            status: row.status,
            scheduled_at: row.scheduled_at,
            trend_topic_id: row.trend_topic_id,
            created_at: row.created_at,
        })
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
