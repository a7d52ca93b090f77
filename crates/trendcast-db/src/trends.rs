//! Database operations for `trend_topics`.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use trendcast_core::Trend;

use crate::DbError;

/// A row from the `trend_topics` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TrendRow {
    pub id: i64,
    pub topic: String,
    /// JSON array of hashtag strings.
    pub hashtags: serde_json::Value,
    pub relevance_score: f64,
    pub mention_count: i32,
    pub source: String,
    pub detected_at: DateTime<Utc>,
    pub is_active: bool,
}

/// Insert a trend, or refresh an existing row for the same topic detected
/// within the last 24 hours. Returns the row id either way.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if a query fails.
pub async fn upsert_trend(pool: &PgPool, trend: &Trend) -> Result<i64, DbError> {
    let existing: Option<i64> = sqlx::query_scalar(
        "SELECT id FROM trend_topics \
         WHERE topic = $1 AND detected_at >= NOW() - INTERVAL '24 hours' \
         ORDER BY detected_at DESC LIMIT 1",
    )
    .bind(&trend.topic)
    .fetch_optional(pool)
    .await?;

    let hashtags = serde_json::json!(trend.hashtags);
    let mention_count = i32::try_from(trend.mention_count).unwrap_or(i32::MAX);

    if let Some(id) = existing {
        sqlx::query(
            "UPDATE trend_topics \
             SET relevance_score = $1, hashtags = $2, mention_count = $3, is_active = TRUE \
             WHERE id = $4",
        )
        .bind(trend.relevance_score)
        .bind(&hashtags)
        .bind(mention_count)
        .bind(id)
        .execute(pool)
        .await?;

        return Ok(id);
    }

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO trend_topics (topic, hashtags, relevance_score, mention_count, source) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING id",
    )
    .bind(&trend.topic)
    .bind(&hashtags)
    .bind(trend.relevance_score)
    .bind(mention_count)
    .bind(&trend.source)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// List active trends, most relevant first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_active_trends(pool: &PgPool, limit: i64) -> Result<Vec<TrendRow>, DbError> {
    let rows = sqlx::query_as::<_, TrendRow>(
        "SELECT id, topic, hashtags, relevance_score, mention_count, source, \
                detected_at, is_active \
         FROM trend_topics \
         WHERE is_active = TRUE \
         ORDER BY relevance_score DESC, detected_at DESC \
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
