use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::recommendation::RecommendationResult;

/// Question id → selected option value. Built fresh for every submission.
pub type AnswerRecord = BTreeMap<String, String>;

/// Tag → accumulated weight.
pub type TagScoreMap = BTreeMap<String, f64>;

/// Raw wizard form state: field name → entered value.
pub type FormFields = BTreeMap<String, String>;

/// Step 1 of the wizard.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Demographics {
    pub full_name: Option<String>,
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub class_grade: Option<String>,
    pub location: Option<String>,
    pub previous_class_percentage: Option<f64>,
}

/// Step 3 of the wizard.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Constraints {
    pub budget: Option<f64>,
    pub max_distance_km: Option<f64>,
    pub needs_hostel: Option<bool>,
    pub preferred_medium: Option<String>,
}

/// The body sent to `POST /quiz`. Constructed once per submission attempt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuizPayload {
    #[serde(flatten)]
    pub demographics: Demographics,
    #[serde(flatten)]
    pub constraints: Constraints,
    pub answers: AnswerRecord,
    pub tag_scores: TagScoreMap,
}

/// A persisted quiz submission together with whatever recommendation it produced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SavedQuizEntry {
    pub timestamp: DateTime<Utc>,
    pub payload: QuizPayload,
    pub result: RecommendationResult,
}

impl SavedQuizEntry {
    pub fn new(payload: QuizPayload, result: RecommendationResult) -> Self {
        Self {
            timestamp: Utc::now(),
            payload,
            result,
        }
    }
}

/// A wizard saved part-way through so it can be resumed later.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IncompleteQuiz {
    pub current_step: usize,
    pub fields: FormFields,
    pub saved_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_serializes_flat() {
        let payload = QuizPayload {
            demographics: Demographics {
                full_name: Some("Asha".to_string()),
                class_grade: Some("10th".to_string()),
                ..Default::default()
            },
            constraints: Constraints {
                needs_hostel: Some(true),
                ..Default::default()
            },
            answers: AnswerRecord::from([("q_lab_work".to_string(), "always".to_string())]),
            tag_scores: TagScoreMap::from([("lab".to_string(), 2.0)]),
        };

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["full_name"], "Asha");
        assert_eq!(value["class_grade"], "10th");
        assert_eq!(value["needs_hostel"], true);
        assert_eq!(value["answers"]["q_lab_work"], "always");
        assert_eq!(value["tag_scores"]["lab"], 2.0);
        assert!(value.get("demographics").is_none());
    }
}
