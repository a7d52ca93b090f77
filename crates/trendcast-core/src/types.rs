//! Domain model for the content pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Voice used when generating a content candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Professional,
    Casual,
    Technical,
}

impl Tone {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Tone::Professional => "professional",
            Tone::Casual => "casual",
            Tone::Technical => "technical",
        }
    }
}

impl std::fmt::Display for Tone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Tone {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "professional" => Ok(Tone::Professional),
            "casual" => Ok(Tone::Casual),
            "technical" => Ok(Tone::Technical),
            other => Err(ConfigError::Validation(format!(
                "unknown tone '{other}'; must be one of: professional, casual, technical"
            ))),
        }
    }
}

/// Lifecycle of a generated post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Scheduled,
    Posted,
    Failed,
}

impl PostStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Scheduled => "scheduled",
            PostStatus::Posted => "posted",
            PostStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for PostStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What triggered a pipeline run. Distinct kinds may overlap in time;
/// the server rejects overlapping runs of the same kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunKind {
    Daily,
    Manual,
    Trends,
    Custom,
}

impl RunKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RunKind::Daily => "daily",
            RunKind::Manual => "manual",
            RunKind::Trends => "trends",
            RunKind::Custom => "custom",
        }
    }

    /// Build the persisted run identifier, e.g. `daily_20250301_080000`.
    #[must_use]
    pub fn run_id(self, now: DateTime<Utc>) -> String {
        format!("{}_{}", self.as_str(), now.format("%Y%m%d_%H%M%S"))
    }
}

impl std::fmt::Display for RunKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A ranked topic candidate.
///
/// `relevance_score` is the blended final score (LLM relevance x mention
/// frequency) and is always clamped to `[0, 1]`. `id` is assigned by the
/// store on upsert; trends that failed to persist keep `None` and are
/// dropped from the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trend {
    pub id: Option<i64>,
    pub topic: String,
    pub hashtags: Vec<String>,
    pub relevance_score: f64,
    pub mention_count: u32,
    pub source: String,
}

/// An article fetched from a feed source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub url: String,
    pub summary: String,
    pub author: Option<String>,
    pub published_at: DateTime<Utc>,
    pub source: String,
    pub tags: Vec<String>,
}

/// One generated piece of content for a trend/tone pairing, pending approval.
///
/// `composite_score` is deterministic given readability, engagement, and
/// trend relevance; `approved` is derived from it and never set directly.
/// `trend` is `None` only for custom-topic candidates, which score with a
/// neutral relevance of 0.5.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentCandidate {
    pub post_id: Option<i64>,
    pub trend: Option<Trend>,
    pub tone: Tone,
    pub body: String,
    pub hashtags: Vec<String>,
    pub readability_score: f64,
    pub engagement_score: f64,
    pub composite_score: f64,
    pub approved: bool,
}

/// A draft post row to persist.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub content: String,
    pub hashtags: Vec<String>,
    pub readability_score: f64,
    pub engagement_score: f64,
    pub character_count: i32,
    pub trend_topic_id: Option<i64>,
}

/// An approved post with its assigned publish slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledPost {
    pub post_id: i64,
    pub publish_at: DateTime<Utc>,
    pub status: PostStatus,
    pub preview: String,
}

/// Parameters for one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub sources: Vec<String>,
    pub max_trends: usize,
    pub max_posts_per_day: usize,
    pub tones: Vec<Tone>,
    /// Explicit switch for the duplicate-topic filter.
    pub filter_duplicates: bool,
    /// Lookback window for duplicate filtering, in days.
    pub duplicate_lookback_days: i64,
    /// How far back to scan feed sources for articles, in hours.
    pub hours_back: u32,
    /// Daily publish hours (UTC) for slot assignment.
    pub publish_hours: Vec<u32>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            sources: vec!["techcrunch".to_string()],
            max_trends: 5,
            max_posts_per_day: 3,
            tones: vec![Tone::Professional, Tone::Casual],
            filter_duplicates: true,
            duplicate_lookback_days: 7,
            hours_back: 24,
            publish_hours: vec![8, 12, 17],
        }
    }
}

impl RunConfig {
    /// Validate run parameters before any stage executes.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if sources or tones are empty,
    /// a limit is out of range, or a publish hour is not a valid UTC hour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sources.is_empty() {
            return Err(ConfigError::Validation(
                "sources must be a non-empty list".to_string(),
            ));
        }
        if self.max_trends < 1 || self.max_trends > 50 {
            return Err(ConfigError::Validation(format!(
                "max_trends must be between 1 and 50, got {}",
                self.max_trends
            )));
        }
        if self.max_posts_per_day < 1 || self.max_posts_per_day > 10 {
            return Err(ConfigError::Validation(format!(
                "max_posts_per_day must be between 1 and 10, got {}",
                self.max_posts_per_day
            )));
        }
        if self.tones.is_empty() {
            return Err(ConfigError::Validation(
                "tones must be a non-empty list".to_string(),
            ));
        }
        if self.publish_hours.is_empty() {
            return Err(ConfigError::Validation(
                "publish_hours must be a non-empty list".to_string(),
            ));
        }
        if let Some(bad) = self.publish_hours.iter().find(|&&h| h > 23) {
            return Err(ConfigError::Validation(format!(
                "publish hour {bad} is out of range 0-23"
            )));
        }
        Ok(())
    }
}

/// The contract consumers read after a run: counts and collected errors,
/// never individual stage internals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: String,
    pub kind: RunKind,
    pub success: bool,
    pub trends_found: usize,
    pub content_generated: usize,
    pub posts_scheduled: usize,
    pub scheduled: Vec<ScheduledPost>,
    pub errors: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}
