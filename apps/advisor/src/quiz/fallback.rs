//! Offline recommender used whenever the backend cannot be reached.
//!
//! Only the single highest-ranked tag is inspected. The keyword sets are checked in
//! order, so a tag like "lab-arts" resolves to Science.

use crate::models::quiz::TagScoreMap;
use crate::models::recommendation::{College, RecommendationResult, TextOrNumber};
use crate::quiz::scoring::top_tags;

pub const DEFAULT_STREAM: &str = "General Arts/Commerce";
pub const FALLBACK_REASON: &str = "Fallback recommendation (offline mode)";
pub const FALLBACK_ROADMAP: &str =
    "Reconnect to get a personalised roadmap. Meanwhile, talk to your school counsellor \
     about subject choices for classes 11 and 12.";

const STREAM_KEYWORDS: &[(&str, &[&str])] = &[
    ("Science", &["lab", "practical", "analytical", "maths"]),
    ("Arts", &["communication", "arts"]),
    ("Commerce", &["business", "commerce"]),
];

/// Picks a stream label for a tag by substring match against the keyword sets.
pub fn stream_for_tag(tag: &str) -> &'static str {
    let tag = tag.to_lowercase();
    STREAM_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| tag.contains(k)))
        .map(|(stream, _)| *stream)
        .unwrap_or(DEFAULT_STREAM)
}

/// Derives a recommendation from tag scores alone. Deterministic for a given map.
pub fn recommend_offline(scores: &TagScoreMap) -> RecommendationResult {
    let stream = top_tags(scores, 1)
        .first()
        .map(|(tag, _)| stream_for_tag(tag))
        .unwrap_or(DEFAULT_STREAM);

    RecommendationResult {
        stream: Some(stream.to_string()),
        colleges: placeholder_colleges(),
        scholarships: Vec::new(),
        roadmap: Some(FALLBACK_ROADMAP.to_string()),
        reason: Some(FALLBACK_REASON.to_string()),
    }
}

fn placeholder_colleges() -> Vec<College> {
    vec![
        College {
            name: Some("Nearest Government Degree College".to_string()),
            medium: Some("English / Regional".to_string()),
            hostel: None,
            distance: Some(TextOrNumber::Text("Check locally".to_string())),
            fees: Some(TextOrNumber::Text("Low (government)".to_string())),
        },
        College {
            name: Some("Nearest Aided Private College".to_string()),
            medium: Some("English".to_string()),
            hostel: None,
            distance: Some(TextOrNumber::Text("Check locally".to_string())),
            fees: Some(TextOrNumber::Text("Moderate".to_string())),
        },
    ]
}
