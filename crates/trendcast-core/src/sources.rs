//! Feed-source catalog.
//!
//! Maps short source names (the values accepted in `RunConfig.sources`) to
//! feed URLs. Loaded once at startup from a YAML file.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedSource {
    pub name: String,
    pub feed_url: String,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SourcesFile {
    pub sources: Vec<FeedSource>,
}

impl SourcesFile {
    /// Look up a source by its (case-insensitive) name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FeedSource> {
        self.sources
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
    }
}

/// Load and validate the feed-source catalog from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_sources(path: &Path) -> Result<SourcesFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SourcesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let sources_file: SourcesFile = serde_yaml::from_str(&content)?;

    validate_sources(&sources_file)?;

    Ok(sources_file)
}

fn validate_sources(sources_file: &SourcesFile) -> Result<(), ConfigError> {
    if sources_file.sources.is_empty() {
        return Err(ConfigError::Validation(
            "sources file must list at least one feed source".to_string(),
        ));
    }

    let mut seen_names = HashSet::new();

    for source in &sources_file.sources {
        if source.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "feed source name must be non-empty".to_string(),
            ));
        }

        if !source.feed_url.starts_with("http://") && !source.feed_url.starts_with("https://") {
            return Err(ConfigError::Validation(format!(
                "feed source '{}' has invalid feed_url '{}'",
                source.name, source.feed_url
            )));
        }

        if !seen_names.insert(source.name.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate feed source name: '{}'",
                source.name
            )));
        }
    }

    Ok(())
}
