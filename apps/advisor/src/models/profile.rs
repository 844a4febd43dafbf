use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::models::recommendation::lenient_text;

/// Student profile as stored by the backend. Every field is optional; unknown keys are
/// ignored. A field of the wrong type reads as absent (numbers as their text) so one bad
/// value never blanks the record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Profile {
    #[serde(deserialize_with = "lenient_text")]
    pub full_name: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub location: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub date_of_birth: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub gender: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub class_grade: Option<String>,
    #[serde(deserialize_with = "lenient_percentage")]
    pub previous_class_percentage: Option<f64>,
    #[serde(deserialize_with = "lenient_text")]
    pub stream: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub favourite_subject: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub hobby: Option<String>,
    #[serde(deserialize_with = "lenient_skills")]
    pub skills: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient_text")]
    pub career_interest: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub financial_condition: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub parents_occupation: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub language_preference: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub extracurricular: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub learning_style: Option<String>,
    #[serde(rename = "_saved_at", deserialize_with = "lenient_text")]
    pub saved_at: Option<String>,
}

impl Profile {
    pub fn from_wire(value: Value) -> Self {
        serde_json::from_value(value).unwrap_or_default()
    }
}

/// Identity established by signup, login or the dev login bypass.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthSession {
    pub user_id: String,
    pub access_token: Option<String>,
    pub profile: Option<Profile>,
}

/// Splits a comma-separated skills string into trimmed, non-empty items.
pub fn split_skills(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn lenient_skills<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Vec<String>>, D::Error> {
    let value = Option::<Value>::deserialize(d)?;
    Ok(match value {
        Some(Value::String(s)) => Some(split_skills(&s)),
        Some(Value::Array(items)) => Some(
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::trim))
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
        ),
        _ => None,
    })
}

fn lenient_percentage<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    let value = Option::<Value>::deserialize(d)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_profile_accepts_loose_types() {
        let profile = Profile::from_wire(json!({
            "full_name": "Test User",
            "previous_class_percentage": "88.5",
            "skills": "python, electronics, ,",
            "_saved_at": "2024-01-01"
        }));

        assert_eq!(profile.full_name.as_deref(), Some("Test User"));
        assert_eq!(profile.previous_class_percentage, Some(88.5));
        assert_eq!(
            profile.skills,
            Some(vec!["python".to_string(), "electronics".to_string()])
        );
    }

    #[test]
    fn test_wrongly_typed_field_keeps_the_rest() {
        let profile = Profile::from_wire(json!({
            "full_name": "Asha",
            "class_grade": 10,
            "hobby": {"kind": "chess"},
            "gender": null
        }));

        assert_eq!(profile.full_name.as_deref(), Some("Asha"));
        assert_eq!(profile.class_grade.as_deref(), Some("10"));
        assert_eq!(profile.hobby, None);
        assert_eq!(profile.gender, None);
    }

    #[test]
    fn test_profile_from_garbage_is_empty() {
        assert_eq!(Profile::from_wire(json!([1, 2])), Profile::default());
    }
}
