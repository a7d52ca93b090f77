//! Database operations for `posts`.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use trendcast_core::NewPost;

use crate::DbError;

/// A row from the `posts` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PostRow {
    pub id: i64,
    pub content: String,
    /// JSON array of hashtag strings.
    pub hashtags: serde_json::Value,
    pub readability_score: Option<f64>,
    pub engagement_score: Option<f64>,
    pub character_count: i32,
    pub status: String,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub trend_topic_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert a draft post and return its id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_draft_post(pool: &PgPool, post: &NewPost) -> Result<i64, DbError> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO posts (content, hashtags, readability_score, engagement_score, \
                            character_count, status, trend_topic_id) \
         VALUES ($1, $2, $3, $4, $5, 'draft', $6) \
         RETURNING id",
    )
    .bind(&post.content)
    .bind(serde_json::json!(post.hashtags))
    .bind(post.readability_score)
    .bind(post.engagement_score)
    .bind(post.character_count)
    .bind(post.trend_topic_id)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Transition a draft post to `scheduled` with its publish timestamp.
///
/// # Errors
///
/// Returns [`DbError::InvalidPostTransition`] if the post is not in `draft`
/// status, or [`DbError::Sqlx`] if the update fails.
pub async fn mark_post_scheduled(
    pool: &PgPool,
    post_id: i64,
    publish_at: DateTime<Utc>,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE posts \
         SET status = 'scheduled', scheduled_at = $1, updated_at = NOW() \
         WHERE id = $2 AND status = 'draft'",
    )
    .bind(publish_at)
    .bind(post_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidPostTransition {
            id: post_id,
            expected_status: "draft",
        });
    }

    Ok(())
}

/// Trend ids referenced by posts created at or after `cutoff`.
///
/// Used by the duplicate-topic filter.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn trend_ids_posted_since(
    pool: &PgPool,
    cutoff: DateTime<Utc>,
) -> Result<Vec<i64>, DbError> {
    let ids: Vec<i64> = sqlx::query_scalar(
        "SELECT DISTINCT trend_topic_id FROM posts \
         WHERE created_at >= $1 AND trend_topic_id IS NOT NULL",
    )
    .bind(cutoff)
    .fetch_all(pool)
    .await?;

    Ok(ids)
}

/// List recent posts, optionally filtered by status, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_recent_posts(
    pool: &PgPool,
    limit: i64,
    status: Option<&str>,
) -> Result<Vec<PostRow>, DbError> {
    const COLUMNS: &str = "id, content, hashtags, readability_score, engagement_score, \
                           character_count, status, scheduled_at, trend_topic_id, \
                           created_at, updated_at";

    let rows = match status {
        Some(status) => {
            sqlx::query_as::<_, PostRow>(&format!(
                "SELECT {COLUMNS} FROM posts WHERE status = $1 \
                 ORDER BY created_at DESC LIMIT $2"
            ))
            .bind(status)
            .bind(limit)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, PostRow>(&format!(
                "SELECT {COLUMNS} FROM posts ORDER BY created_at DESC LIMIT $1"
            ))
            .bind(limit)
            .fetch_all(pool)
            .await?
        }
    };

    Ok(rows)
}
