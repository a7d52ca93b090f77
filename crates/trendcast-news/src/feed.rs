//! Feed parsing and relevance filtering.

use chrono::{DateTime, Utc};

use trendcast_core::Article;

use crate::error::NewsError;

/// Keywords marking an article as relevant to a tech-professional audience.
const TECH_KEYWORDS: &[&str] = &[
    "ai",
    "artificial intelligence",
    "machine learning",
    "startup",
    "funding",
    "software",
    "technology",
    "tech",
    "programming",
    "developer",
    "cloud",
    "cybersecurity",
    "blockchain",
    "cryptocurrency",
    "fintech",
    "saas",
    "api",
    "mobile",
    "app",
    "platform",
    "innovation",
    "digital",
    "automation",
    "robotics",
    "iot",
    "internet of things",
    "big data",
    "analytics",
    "venture capital",
    "ipo",
    "acquisition",
    "merger",
    "enterprise",
];

/// Parse a feed body into articles published after `cutoff`.
///
/// Entries missing a title, link, or publication date are skipped, as are
/// entries that fail the tech-relevance check. Handles both RSS and Atom
/// via feed-rs.
///
/// # Errors
///
/// Returns [`NewsError::Parse`] if the body is not a parseable feed.
pub fn parse_feed(
    body: &[u8],
    source: &str,
    cutoff: DateTime<Utc>,
) -> Result<Vec<Article>, NewsError> {
    let feed = feed_rs::parser::parse(body)?;

    let mut articles = Vec::new();
    for entry in feed.entries {
        let Some(title) = entry.title.as_ref().map(|t| t.content.trim().to_string()) else {
            continue;
        };
        let Some(url) = entry.links.first().map(|l| l.href.clone()) else {
            continue;
        };
        let Some(published_at) = entry.published.or(entry.updated) else {
            continue;
        };
        if published_at <= cutoff {
            continue;
        }

        let summary = entry
            .summary
            .as_ref()
            .map(|s| strip_html(&s.content))
            .unwrap_or_default();
        let author = entry.authors.first().map(|a| a.name.clone());
        let tags: Vec<String> = entry
            .categories
            .iter()
            .map(|c| c.term.clone())
            .collect();

        let article = Article {
            title,
            url,
            summary,
            author,
            published_at,
            source: source.to_string(),
            tags,
        };

        if is_tech_relevant(&article) {
            articles.push(article);
        }
    }

    Ok(articles)
}

/// Check whether an article is relevant for a tech-professional audience.
fn is_tech_relevant(article: &Article) -> bool {
    let haystack = format!(
        "{} {} {}",
        article.title,
        article.summary,
        article.tags.join(" ")
    )
    .to_lowercase();

    TECH_KEYWORDS.iter().any(|keyword| haystack.contains(keyword))
}

/// Strip HTML tags from a string, returning plain text.
fn strip_html(html: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(ch),
            _ => {}
        }
    }
    result.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn old_cutoff() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2020-01-01T00:00:00Z")
            .expect("valid timestamp")
            .with_timezone(&Utc)
    }

    const SAMPLE_RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Example Feed</title>
    <item>
      <title>New AI platform launches for developers</title>
      <link>https://example.com/ai-platform</link>
      <description><![CDATA[<p>A new <b>machine learning</b> platform.</p>]]></description>
      <pubDate>Mon, 10 Mar 2025 09:00:00 GMT</pubDate>
      <category>software</category>
    </item>
    <item>
      <title>Local bakery wins pie contest</title>
      <link>https://example.com/bakery</link>
      <description>The annual pie contest concluded on Sunday.</description>
      <pubDate>Mon, 10 Mar 2025 10:00:00 GMT</pubDate>
    </item>
    <item>
      <title>Undated startup story</title>
      <link>https://example.com/undated</link>
      <description>A startup story without a date.</description>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn parses_items_and_strips_html_from_summaries() {
        let articles = parse_feed(SAMPLE_RSS.as_bytes(), "techcrunch", old_cutoff())
            .expect("valid feed parses");

        assert_eq!(articles.len(), 1, "irrelevant and undated items drop out");
        let article = &articles[0];
        assert_eq!(article.title, "New AI platform launches for developers");
        assert_eq!(article.summary, "A new machine learning platform.");
        assert_eq!(article.source, "techcrunch");
        assert_eq!(article.tags, vec!["software"]);
    }

    #[test]
    fn cutoff_excludes_older_items() {
        let future_cutoff = DateTime::parse_from_rfc3339("2025-03-11T00:00:00Z")
            .expect("valid timestamp")
            .with_timezone(&Utc);
        let articles = parse_feed(SAMPLE_RSS.as_bytes(), "techcrunch", future_cutoff)
            .expect("valid feed parses");
        assert!(articles.is_empty());
    }

    #[test]
    fn empty_feed_parses_to_no_articles() {
        let xml = r#"<?xml version="1.0"?><rss version="2.0"><channel><title>Empty</title></channel></rss>"#;
        let articles = parse_feed(xml.as_bytes(), "techcrunch", old_cutoff())
            .expect("empty feed parses");
        assert!(articles.is_empty());
    }

    #[test]
    fn garbage_input_is_a_parse_error() {
        let result = parse_feed(b"not a feed at all", "techcrunch", old_cutoff());
        assert!(matches!(result, Err(NewsError::Parse(_))));
    }

    #[test]
    fn relevance_check_inspects_tags_too() {
        let article = Article {
            title: "Quarterly results".to_string(),
            url: "https://example.com/results".to_string(),
            summary: "Numbers were announced.".to_string(),
            author: None,
            published_at: Utc::now(),
            source: "techcrunch".to_string(),
            tags: vec!["saas".to_string()],
        };
        assert!(is_tech_relevant(&article));

        let irrelevant = Article {
            tags: vec![],
            ..article
        };
        assert!(!is_tech_relevant(&irrelevant));
    }
}
