//! Topic ranking: deduplicate extracted mentions and rank them into a
//! bounded top-N list by blended relevance and frequency.

use std::collections::HashMap;

use tokio_util::sync::CancellationToken;

use trendcast_core::Trend;

use crate::scoring::blend_relevance;
use crate::traits::TextService;
use crate::workflow::CallPolicy;

/// One extracted topic mention, carrying the article it came from.
#[derive(Debug, Clone)]
pub struct TopicMention {
    pub topic: String,
    pub hashtags: Vec<String>,
    pub source: String,
    pub article_title: String,
    pub article_url: String,
}

/// Bounded-effort cap: only the first N mentions are considered, not the
/// full extraction output.
pub const MENTION_SCAN_CAP: usize = 10;

/// Ranked trends plus the per-topic errors collected along the way.
#[derive(Debug, Default)]
pub struct RankOutcome {
    pub trends: Vec<Trend>,
    pub errors: Vec<String>,
}

/// Group mentions by case-folded topic, assess each distinct topic's
/// relevance, and return the top `limit` trends by blended final score.
///
/// A single topic's assessment failure excludes only that topic; the batch
/// never aborts. The first occurrence of a topic seeds its canonical
/// metadata (exact casing, hashtags, source).
pub async fn rank_topics(
    text: &dyn TextService,
    mentions: &[TopicMention],
    limit: usize,
    policy: &CallPolicy,
    cancel: &CancellationToken,
) -> RankOutcome {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, u32> = HashMap::new();
    let mut seeds: HashMap<String, &TopicMention> = HashMap::new();

    for mention in mentions.iter().take(MENTION_SCAN_CAP) {
        let key = mention.topic.to_lowercase();
        if !counts.contains_key(&key) {
            order.push(key.clone());
            seeds.insert(key.clone(), mention);
        }
        *counts.entry(key).or_insert(0) += 1;
    }

    tracing::info!(
        mentions = mentions.len(),
        distinct = order.len(),
        "ranking extracted topics"
    );

    let mut outcome = RankOutcome::default();

    for (index, key) in order.iter().enumerate() {
        if cancel.is_cancelled() {
            outcome.errors.push("run cancelled during topic ranking".to_string());
            break;
        }

        let seed = seeds[key];
        let count = counts[key];

        if index > 0 {
            policy.pace().await;
        }

        let relevance = match policy
            .call("relevance assessment", text.assess_relevance(&seed.topic))
            .await
        {
            Ok(score) => score.clamp(0.0, 1.0),
            Err(e) => {
                tracing::warn!(topic = %seed.topic, error = %e, "relevance assessment failed");
                outcome
                    .errors
                    .push(format!("failed to rank topic '{}': {e}", seed.topic));
                continue;
            }
        };

        outcome.trends.push(Trend {
            id: None,
            topic: seed.topic.clone(),
            hashtags: seed.hashtags.clone(),
            relevance_score: blend_relevance(relevance, count),
            mention_count: count,
            source: seed.source.clone(),
        });
    }

    outcome
        .trends
        .sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));
    outcome.trends.truncate(limit);

    outcome
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use anyhow::Result;
    use async_trait::async_trait;

    use super::*;

    struct StubText {
        relevance: HashMap<String, f64>,
    }

    #[async_trait]
    impl TextService for StubText {
        async fn generate_text(
            &self,
            _prompt: &str,
            _system_prompt: Option<&str>,
            _temperature: Option<f32>,
        ) -> Result<String> {
            Ok(String::new())
        }

        async fn extract_topics(&self, _text: &str, _max: usize) -> Result<Vec<String>> {
            Ok(vec![])
        }

        async fn generate_hashtags(&self, _text: &str, _max: usize) -> Result<Vec<String>> {
            Ok(vec![])
        }

        async fn score_readability(&self, _text: &str) -> Result<f64> {
            Ok(50.0)
        }

        async fn assess_relevance(&self, topic: &str) -> Result<f64> {
            self.relevance
                .get(&topic.to_lowercase())
                .copied()
                .ok_or_else(|| anyhow::anyhow!("no relevance stubbed for '{topic}'"))
        }
    }

    fn mention(topic: &str) -> TopicMention {
        TopicMention {
            topic: topic.to_string(),
            hashtags: vec!["tech".to_string()],
            source: "techcrunch".to_string(),
            article_title: "title".to_string(),
            article_url: "https://example.com/a".to_string(),
        }
    }

    fn fast_policy() -> CallPolicy {
        CallPolicy {
            timeout: Duration::from_secs(5),
            delay: Duration::ZERO,
        }
    }

    fn repeated(topic: &str, times: usize) -> Vec<TopicMention> {
        (0..times).map(|_| mention(topic)).collect()
    }

    #[tokio::test]
    async fn ranks_by_blended_score_and_truncates_to_limit() {
        // Three topics mentioned 5, 2, and 1 times; stub relevance 0.9, 0.4, 0.9.
        let mut mentions = repeated("ai agents", 5);
        mentions.extend(repeated("cloud costs", 2));
        mentions.extend(repeated("rust adoption", 1));

        let text = StubText {
            relevance: HashMap::from([
                ("ai agents".to_string(), 0.9),
                ("cloud costs".to_string(), 0.4),
                ("rust adoption".to_string(), 0.9),
            ]),
        };

        let outcome = rank_topics(&text, &mentions, 2, &fast_policy(), &CancellationToken::new())
            .await;

        assert!(outcome.errors.is_empty(), "errors: {:?}", outcome.errors);
        assert_eq!(outcome.trends.len(), 2);
        // 5 mentions at 0.9: 0.7*0.9 + 0.3*1.0 = 0.93
        assert_eq!(outcome.trends[0].topic, "ai agents");
        assert!((outcome.trends[0].relevance_score - 0.93).abs() < 1e-12);
        // 1 mention at 0.9: 0.7*0.9 + 0.3*0.2 = 0.69; 2-mention topic is cut.
        assert_eq!(outcome.trends[1].topic, "rust adoption");
        assert!((outcome.trends[1].relevance_score - 0.69).abs() < 1e-12);
    }

    #[tokio::test]
    async fn case_folded_duplicates_are_grouped() {
        let mentions = vec![mention("AI Agents"), mention("ai agents"), mention("AI AGENTS")];
        let text = StubText {
            relevance: HashMap::from([("ai agents".to_string(), 0.5)]),
        };

        let outcome = rank_topics(&text, &mentions, 10, &fast_policy(), &CancellationToken::new())
            .await;

        assert_eq!(outcome.trends.len(), 1);
        assert_eq!(outcome.trends[0].mention_count, 3);
        // First occurrence seeds the canonical casing.
        assert_eq!(outcome.trends[0].topic, "AI Agents");
    }

    #[tokio::test]
    async fn assessment_failure_drops_only_that_topic() {
        let mentions = vec![mention("known topic"), mention("unknown topic")];
        let text = StubText {
            relevance: HashMap::from([("known topic".to_string(), 0.8)]),
        };

        let outcome = rank_topics(&text, &mentions, 10, &fast_policy(), &CancellationToken::new())
            .await;

        assert_eq!(outcome.trends.len(), 1);
        assert_eq!(outcome.trends[0].topic, "known topic");
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors[0].contains("unknown topic"));
    }

    #[tokio::test]
    async fn scan_cap_limits_considered_mentions() {
        // 12 mentions of the same topic; only the first 10 count.
        let mentions = repeated("ai agents", 12);
        let text = StubText {
            relevance: HashMap::from([("ai agents".to_string(), 0.0)]),
        };

        let outcome = rank_topics(&text, &mentions, 10, &fast_policy(), &CancellationToken::new())
            .await;

        assert_eq!(outcome.trends[0].mention_count, 10);
    }

    #[tokio::test]
    async fn returns_empty_for_no_mentions() {
        let text = StubText {
            relevance: HashMap::new(),
        };
        let outcome =
            rank_topics(&text, &[], 5, &fast_policy(), &CancellationToken::new()).await;
        assert!(outcome.trends.is_empty());
        assert!(outcome.errors.is_empty());
    }
}
