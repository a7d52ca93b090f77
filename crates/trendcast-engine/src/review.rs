//! Content review: composite scoring and the approval gate.

use trendcast_core::ContentCandidate;

use crate::scoring::{composite_score, APPROVAL_THRESHOLD};

/// Relevance assumed for custom-topic candidates with no originating trend.
const CUSTOM_TOPIC_RELEVANCE: f64 = 0.5;

/// Annotate each candidate with its composite score and approval, then
/// re-sort the slice descending by composite score (stable for ties).
///
/// `approved` is derived here and nowhere else.
pub fn review_candidates(candidates: &mut [ContentCandidate]) {
    for candidate in candidates.iter_mut() {
        let relevance = candidate
            .trend
            .as_ref()
            .map_or(CUSTOM_TOPIC_RELEVANCE, |t| t.relevance_score);

        candidate.composite_score = composite_score(
            candidate.readability_score,
            candidate.engagement_score,
            relevance,
        );
        candidate.approved = candidate.composite_score >= APPROVAL_THRESHOLD;
    }

    candidates.sort_by(|a, b| b.composite_score.total_cmp(&a.composite_score));
}

#[cfg(test)]
mod tests {
    use trendcast_core::{Tone, Trend};

    use super::*;

    fn candidate(readability: f64, engagement: f64, relevance: f64) -> ContentCandidate {
        ContentCandidate {
            post_id: Some(1),
            trend: Some(Trend {
                id: Some(1),
                topic: "topic".to_string(),
                hashtags: vec![],
                relevance_score: relevance,
                mention_count: 1,
                source: "techcrunch".to_string(),
            }),
            tone: Tone::Professional,
            body: "body".to_string(),
            hashtags: vec![],
            readability_score: readability,
            engagement_score: engagement,
            composite_score: 0.0,
            approved: false,
        }
    }

    #[test]
    fn approval_boundary_is_inclusive_at_forty() {
        // readability 40*0.3=12, engagement 0.4*40=16, relevance 0.4*30=12 -> 40.0
        let mut at_boundary = vec![candidate(40.0, 0.4, 0.4)];
        review_candidates(&mut at_boundary);
        assert!((at_boundary[0].composite_score - 40.0).abs() < 1e-9);
        assert!(at_boundary[0].approved, "exactly 40 must be approved");

        let mut below = vec![candidate(39.997, 0.4, 0.4)];
        review_candidates(&mut below);
        assert!(below[0].composite_score < 40.0);
        assert!(!below[0].approved, "just below 40 must not be approved");
    }

    #[test]
    fn candidates_are_sorted_descending_by_composite() {
        let mut candidates = vec![
            candidate(10.0, 0.1, 0.1),
            candidate(90.0, 0.9, 0.9),
            candidate(50.0, 0.5, 0.5),
        ];
        review_candidates(&mut candidates);

        assert!(candidates[0].composite_score >= candidates[1].composite_score);
        assert!(candidates[1].composite_score >= candidates[2].composite_score);
        assert!((candidates[0].readability_score - 90.0).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_trend_scores_with_neutral_relevance() {
        let mut candidates = vec![ContentCandidate {
            trend: None,
            ..candidate(50.0, 0.5, 0.0)
        }];
        review_candidates(&mut candidates);

        let expected = composite_score(50.0, 0.5, CUSTOM_TOPIC_RELEVANCE);
        assert!((candidates[0].composite_score - expected).abs() < 1e-12);
    }
}
