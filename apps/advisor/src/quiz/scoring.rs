//! Tag scoring: turns an answer record into accumulated per-tag weights.
//!
//! Weights are not normalized. A tag attached to many questions will trend higher than
//! one attached to a single question, whatever the intensity of the answers.

use std::cmp::Ordering;

use crate::models::quiz::{AnswerRecord, TagScoreMap};
use crate::quiz::questions::QuestionBank;

/// Weight used for any non-numeric value that is not a frequency word.
pub const DEFAULT_WEIGHT: f64 = 1.0;

/// Maps an option value to its numeric weight.
///
/// `always` → 2, `sometimes` → 1, `rarely`/`never` → 0, numeric strings parse directly,
/// everything else gets `DEFAULT_WEIGHT`. Negative or non-finite numbers count as 0.
pub fn option_weight(value: &str) -> f64 {
    let value = value.trim().to_lowercase();
    match value.as_str() {
        "always" => 2.0,
        "sometimes" => 1.0,
        "rarely" | "never" => 0.0,
        other => match other.parse::<f64>() {
            Ok(n) if n.is_finite() => n.max(0.0),
            Ok(_) => 0.0,
            Err(_) => DEFAULT_WEIGHT,
        },
    }
}

/// Accumulates the weight of every answered, tagged question into one map.
/// Every tag on the chosen option receives the full weight.
pub fn score_answers(bank: &QuestionBank, answers: &AnswerRecord) -> TagScoreMap {
    let mut scores = TagScoreMap::new();
    for (question_id, value) in answers {
        let Some(question) = bank.get(question_id) else {
            continue;
        };
        let weight = option_weight(value);
        for tag in question.tags_for(value) {
            *scores.entry(tag.clone()).or_insert(0.0) += weight;
        }
    }
    scores
}

/// Ranks tags by weight, highest first, and keeps the first `n`.
/// Equal weights are ordered by tag name so the ranking is deterministic.
pub fn top_tags(scores: &TagScoreMap, n: usize) -> Vec<(String, f64)> {
    let mut ranked: Vec<(String, f64)> = scores.iter().map(|(t, w)| (t.clone(), *w)).collect();
    ranked.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    ranked.truncate(n);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answers(pairs: &[(&str, &str)]) -> AnswerRecord {
        pairs
            .iter()
            .map(|(q, v)| (q.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_option_weight_mapping() {
        assert_eq!(option_weight("always"), 2.0);
        assert_eq!(option_weight("sometimes"), 1.0);
        assert_eq!(option_weight("rarely"), 0.0);
        assert_eq!(option_weight("never"), 0.0);
        assert_eq!(option_weight("3"), 3.0);
        assert_eq!(option_weight("maybe"), 1.0);
    }

    #[test]
    fn test_option_weight_is_case_insensitive() {
        assert_eq!(option_weight("  Always "), 2.0);
        assert_eq!(option_weight("NEVER"), 0.0);
    }

    #[test]
    fn test_option_weight_clamps_negative() {
        assert_eq!(option_weight("-4"), 0.0);
        assert_eq!(option_weight("inf"), 0.0);
    }

    #[test]
    fn test_each_tag_gets_full_weight() {
        let bank = QuestionBank::default();
        let scores = score_answers(&bank, &answers(&[("q_puzzles", "always")]));
        assert_eq!(scores.get("maths"), Some(&2.0));
        assert_eq!(scores.get("analytical"), Some(&2.0));
    }

    #[test]
    fn test_scores_accumulate_across_questions() {
        let bank = QuestionBank::default();
        let scores = score_answers(
            &bank,
            &answers(&[
                ("q_puzzles", "sometimes"),
                ("q_maths_confidence", "4"),
                ("q_favourite_subject", "mathematics"),
            ]),
        );
        // 1 (puzzles) + 4 (confidence) + 1 (favourite subject, default weight)
        assert_eq!(scores.get("maths"), Some(&6.0));
        assert_eq!(scores.get("analytical"), Some(&1.0));
    }

    #[test]
    fn test_zero_weight_answers_still_create_tags() {
        let bank = QuestionBank::default();
        let scores = score_answers(&bank, &answers(&[("q_debate", "never")]));
        assert_eq!(scores.get("communication"), Some(&0.0));
    }

    #[test]
    fn test_unknown_questions_are_ignored() {
        let bank = QuestionBank::default();
        let scores = score_answers(&bank, &answers(&[("q_unknown", "always")]));
        assert!(scores.is_empty());
    }

    #[test]
    fn test_top_tags_orders_by_weight() {
        let scores = TagScoreMap::from([
            ("a".to_string(), 3.0),
            ("b".to_string(), 5.0),
            ("c".to_string(), 1.0),
        ]);
        let top = top_tags(&scores, 2);
        assert_eq!(top, vec![("b".to_string(), 5.0), ("a".to_string(), 3.0)]);
    }

    #[test]
    fn test_top_tags_ties_break_by_name() {
        let scores = TagScoreMap::from([("zeta".to_string(), 2.0), ("alpha".to_string(), 2.0)]);
        assert_eq!(top_tags(&scores, 1)[0].0, "alpha");
    }
}
