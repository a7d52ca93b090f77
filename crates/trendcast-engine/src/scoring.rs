//! Pure scoring functions for trend ranking and content review.

/// Composite score at or above this value approves a candidate for scheduling.
pub const APPROVAL_THRESHOLD: f64 = 40.0;

/// Phrases that solicit reader opinion.
const OPINION_PHRASES: &[&str] = &[
    "what do you think",
    "thoughts",
    "agree",
    "disagree",
    "share your experience",
    "let me know",
    "comment below",
    "your thoughts?",
];

/// Vocabulary that signals the text offers something to take away.
const INSIGHT_WORDS: &[&str] = &[
    "tip", "insight", "learn", "discover", "revealed", "secret", "strategy",
];

/// Verbs that give the reader something to do.
const ACTION_WORDS: &[&str] = &[
    "implement",
    "build",
    "create",
    "develop",
    "improve",
    "optimize",
];

/// Blend an LLM relevance assessment with mention frequency.
///
/// `0.7 * llm_score + 0.3 * min(mention_count / 5, 1.0)`. Inputs are clamped,
/// so the result is always in `[0, 1]`.
#[must_use]
pub fn blend_relevance(llm_score: f64, mention_count: u32) -> f64 {
    let llm = llm_score.clamp(0.0, 1.0);
    let frequency = (f64::from(mention_count) / 5.0).min(1.0);
    0.7 * llm + 0.3 * frequency
}

/// Predict an engagement score for a piece of text.
///
/// This is a heuristic proxy for engagement, not ground truth: it rewards
/// questions, opinion solicitation, insight vocabulary, a length in the
/// 800-2000 character sweet spot, visible structure, and action verbs.
/// Result is clamped to `[0, 1]`.
#[must_use]
pub fn engagement_heuristic(text: &str) -> f64 {
    let mut score: f64 = 0.5;
    let lower = text.to_lowercase();

    if text.contains('?') {
        score += 0.15;
    }

    if OPINION_PHRASES.iter().any(|p| lower.contains(p)) {
        score += 0.15;
    }

    if INSIGHT_WORDS.iter().any(|w| lower.contains(w)) {
        score += 0.10;
    }

    let char_count = text.chars().count();
    if (800..=2000).contains(&char_count) {
        score += 0.10;
    } else if char_count < 500 {
        score -= 0.10;
    }

    if text.matches('\n').count() >= 2 {
        score += 0.10;
    }

    if ACTION_WORDS.iter().any(|w| lower.contains(w)) {
        score += 0.05;
    }

    score.clamp(0.0, 1.0)
}

/// Weighted composite of readability, engagement, and trend relevance.
///
/// `readability * 0.3 + engagement * 100 * 0.4 + trend_relevance * 100 * 0.3`;
/// engagement and relevance are rescaled from `[0, 1]` to `[0, 100]`, so the
/// result lands in approximately `[0, 100]`.
#[must_use]
pub fn composite_score(readability: f64, engagement: f64, trend_relevance: f64) -> f64 {
    readability * 0.3 + engagement * 100.0 * 0.4 + trend_relevance * 100.0 * 0.3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_relevance_matches_formula() {
        for (relevance, mentions) in [(0.0, 0), (0.5, 2), (0.9, 5), (1.0, 20)] {
            let expected = 0.7 * relevance + 0.3 * (f64::from(mentions) / 5.0).min(1.0);
            let got = blend_relevance(relevance, mentions);
            assert!((got - expected).abs() < 1e-12, "r={relevance} m={mentions}");
            assert!((0.0..=1.0).contains(&got));
        }
    }

    #[test]
    fn blend_relevance_clamps_out_of_range_llm_score() {
        assert!((blend_relevance(1.5, 0) - 0.7).abs() < 1e-12);
        assert!((blend_relevance(-0.5, 0)).abs() < 1e-12);
    }

    #[test]
    fn blend_relevance_saturates_mention_frequency_at_five() {
        assert!((blend_relevance(0.0, 5) - blend_relevance(0.0, 500)).abs() < 1e-12);
    }

    #[test]
    fn engagement_base_score_for_plain_midlength_text() {
        // No questions, phrases, insight words, action words, or line breaks;
        // between 500 and 800 chars so no length adjustment applies.
        let text = "x".repeat(600);
        assert!((engagement_heuristic(&text) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn engagement_rewards_questions_and_structure() {
        let body = format!(
            "Why does this matter?\n\nHere is a tip you can implement today.\n{}",
            "filler ".repeat(120)
        );
        let score = engagement_heuristic(&body);
        // base 0.5 + question 0.15 + insight 0.10 + length 0.10 + breaks 0.10
        // + action 0.05 = 1.0
        assert!((score - 1.0).abs() < 1e-12, "got {score}");
    }

    #[test]
    fn engagement_penalizes_short_text() {
        assert!((engagement_heuristic("too short") - 0.4).abs() < 1e-12);
    }

    #[test]
    fn engagement_is_clamped_to_unit_interval() {
        let maxed = format!(
            "What do you think? Here is a secret strategy to implement.\n\nLearn it.\n{}",
            "word ".repeat(200)
        );
        assert!(engagement_heuristic(&maxed) <= 1.0);
        assert!(engagement_heuristic("") >= 0.0);
    }

    #[test]
    fn composite_score_matches_formula() {
        let got = composite_score(60.0, 0.5, 0.8);
        let expected = 60.0 * 0.3 + 0.5 * 100.0 * 0.4 + 0.8 * 100.0 * 0.3;
        assert!((got - expected).abs() < 1e-12);
    }

    #[test]
    fn composite_score_is_monotone_in_each_input() {
        let base = composite_score(50.0, 0.5, 0.5);
        assert!(composite_score(60.0, 0.5, 0.5) > base);
        assert!(composite_score(50.0, 0.6, 0.5) > base);
        assert!(composite_score(50.0, 0.5, 0.6) > base);
    }
}
