//! Shared domain types and configuration for trendcast.
//!
//! Everything other crates agree on lives here: the content-pipeline domain
//! model (trends, candidates, scheduled posts, run summaries), the env-driven
//! application config, and the YAML feed-source catalog.

pub mod app_config;
pub mod config;
pub mod sources;
pub mod types;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use sources::{load_sources, FeedSource, SourcesFile};
pub use types::{
    Article, ContentCandidate, NewPost, PostStatus, RunConfig, RunKind, RunSummary, ScheduledPost,
    Tone, Trend,
};

/// Configuration errors: missing/invalid environment, unreadable catalog
/// files, or run parameters outside their documented bounds.
///
/// These are the only errors that abort a pipeline run before any stage
/// executes; everything downstream is collected per-stage instead.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read sources file {path}: {source}")]
    SourcesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse sources file: {0}")]
    SourcesFileParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),
}
