//! Duplicate-topic filtering against recently published posts.

use std::collections::HashSet;

use trendcast_core::Trend;

/// Remove trends already covered by a post inside the lookback window.
///
/// Pure set difference: `recent_trend_ids` is the set of trend ids referenced
/// by posts created within the window, supplied by the caller. Trends without
/// a store id pass through (nothing could have referenced them yet).
#[must_use]
pub fn filter_recent_duplicates(trends: Vec<Trend>, recent_trend_ids: &HashSet<i64>) -> Vec<Trend> {
    trends
        .into_iter()
        .filter(|trend| trend.id.is_none_or(|id| !recent_trend_ids.contains(&id)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trend(id: Option<i64>, topic: &str) -> Trend {
        Trend {
            id,
            topic: topic.to_string(),
            hashtags: vec![],
            relevance_score: 0.5,
            mention_count: 1,
            source: "techcrunch".to_string(),
        }
    }

    #[test]
    fn drops_trends_recently_posted_about() {
        let trends = vec![trend(Some(1), "old news"), trend(Some(2), "fresh topic")];
        let recent: HashSet<i64> = [1].into_iter().collect();

        let filtered = filter_recent_duplicates(trends, &recent);

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].topic, "fresh topic");
    }

    #[test]
    fn unpersisted_trends_pass_through() {
        let trends = vec![trend(None, "not stored yet")];
        let recent: HashSet<i64> = [1, 2, 3].into_iter().collect();

        let filtered = filter_recent_duplicates(trends, &recent);

        assert_eq!(filtered.len(), 1);
    }

    #[test]
    fn empty_history_keeps_everything() {
        let trends = vec![trend(Some(1), "a"), trend(Some(2), "b")];
        let filtered = filter_recent_duplicates(trends, &HashSet::new());
        assert_eq!(filtered.len(), 2);
    }
}
