//! Platform-compliance cleanup for generated post bodies.

use std::sync::OnceLock;

use regex::Regex;

/// Hard length limit for a post body.
pub const MAX_POST_LENGTH: usize = 3000;

fn hashtag_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"#\w+").expect("hashtag pattern is valid"))
}

fn blank_run_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n{3,}").expect("blank-run pattern is valid"))
}

/// Normalize a generated body: truncate to the length limit, strip inline
/// hashtags (they are attached separately), collapse runs of blank lines,
/// and trim surrounding whitespace.
#[must_use]
pub fn enforce_compliance(content: &str) -> String {
    let truncated: String = if content.chars().count() > MAX_POST_LENGTH {
        let mut cut: String = content.chars().take(MAX_POST_LENGTH - 3).collect();
        cut.push_str("...");
        cut
    } else {
        content.to_string()
    };

    let stripped = hashtag_pattern().replace_all(&truncated, "");
    let collapsed = blank_run_pattern().replace_all(&stripped, "\n\n");
    collapsed.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_inline_hashtags() {
        let cleaned = enforce_compliance("Big news today #tech #ai and more");
        assert!(!cleaned.contains('#'));
        assert!(cleaned.contains("Big news today"));
    }

    #[test]
    fn collapses_blank_line_runs() {
        let cleaned = enforce_compliance("para one\n\n\n\npara two");
        assert_eq!(cleaned, "para one\n\npara two");
    }

    #[test]
    fn truncates_over_limit_with_ellipsis() {
        let long = "a".repeat(MAX_POST_LENGTH + 500);
        let cleaned = enforce_compliance(&long);
        assert_eq!(cleaned.chars().count(), MAX_POST_LENGTH);
        assert!(cleaned.ends_with("..."));
    }

    #[test]
    fn short_content_is_left_alone() {
        assert_eq!(enforce_compliance("  hello world  "), "hello world");
    }
}
