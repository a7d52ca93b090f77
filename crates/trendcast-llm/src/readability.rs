//! Local readability scoring.
//!
//! A Flesch-style approximation over sentence and word lengths; no model
//! call. Scores land in `[0, 100]`, higher reading easier. Empty or
//! degenerate input scores a neutral 50.

/// Score the readability of `text` on a 0-100 scale.
#[must_use]
pub fn readability_score(text: &str) -> f64 {
    if text.trim().is_empty() {
        return 50.0;
    }

    let sentences: Vec<&str> = text
        .split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    let words: Vec<&str> = text.split_whitespace().collect();

    if sentences.is_empty() || words.is_empty() {
        return 50.0;
    }

    #[allow(clippy::cast_precision_loss)]
    let avg_words_per_sentence = words.len() as f64 / sentences.len() as f64;
    #[allow(clippy::cast_precision_loss)]
    let avg_chars_per_word =
        words.iter().map(|w| w.chars().count()).sum::<usize>() as f64 / words.len() as f64;

    // Base of 80, penalised for sentence and word complexity. Ideal is
    // 10-20 words per sentence and up to 6 characters per word.
    let mut score = 80.0;

    if avg_words_per_sentence > 20.0 {
        score -= (avg_words_per_sentence - 20.0) * 2.0;
    } else if avg_words_per_sentence < 10.0 {
        score -= 10.0 - avg_words_per_sentence;
    }

    if avg_chars_per_word > 6.0 {
        score -= (avg_chars_per_word - 6.0) * 3.0;
    }

    score.clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_scores_neutral() {
        assert!((readability_score("") - 50.0).abs() < f64::EPSILON);
        assert!((readability_score("   ") - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn crisp_prose_scores_high() {
        let text = "Short sentences read well. They keep the reader moving. \
                    Each one makes a single point. That is the whole trick.";
        assert!(readability_score(text) > 70.0);
    }

    #[test]
    fn run_on_jargon_scores_lower() {
        let crisp = "We shipped the feature. Users liked it. Adoption grew fast.";
        let dense = "Notwithstanding considerable organizational interdependencies, \
                     the multidisciplinary implementation counterintuitively \
                     necessitated comprehensive infrastructural reconceptualization \
                     alongside prohibitively extensive cross-functional coordination \
                     mechanisms throughout every department simultaneously";
        assert!(readability_score(dense) < readability_score(crisp));
    }

    #[test]
    fn score_stays_in_range() {
        let pathological = format!("{} .", "antidisestablishmentarianism ".repeat(80));
        let score = readability_score(&pathological);
        assert!((0.0..=100.0).contains(&score));
    }
}
