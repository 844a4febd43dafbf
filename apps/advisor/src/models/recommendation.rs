//! Recommendation shapes as the backend sends them and as the rest of the crate sees them.
//!
//! The backend is loose about types: colleges arrive as bare names or objects, numbers
//! arrive as strings, the hostel flag may be "yes". Everything is normalized here, once,
//! so downstream code only deals with the canonical structs.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A value the backend may send either as a number or as free text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum TextOrNumber {
    Number(f64),
    Text(String),
}

impl fmt::Display for TextOrNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextOrNumber::Number(n) if n.fract() == 0.0 => write!(f, "{}", *n as i64),
            TextOrNumber::Number(n) => write!(f, "{n:.1}"),
            TextOrNumber::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct College {
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub medium: Option<String>,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub hostel: Option<bool>,
    #[serde(default, alias = "distance_km", deserialize_with = "lenient_scalar")]
    pub distance: Option<TextOrNumber>,
    #[serde(default, deserialize_with = "lenient_scalar")]
    pub fees: Option<TextOrNumber>,
}

impl College {
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    /// Normalizes one wire entry: a bare string is the college name, an object is parsed
    /// field by field, anything else becomes an empty record.
    pub fn from_wire(value: &Value) -> Self {
        match value {
            Value::String(name) => College::named(name),
            Value::Object(_) => serde_json::from_value(value.clone()).unwrap_or_default(),
            _ => College::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Scholarship {
    pub name: Option<String>,
    pub detail: Option<String>,
}

impl Scholarship {
    pub fn from_wire(value: &Value) -> Self {
        match value {
            Value::String(name) => Scholarship {
                name: Some(name.clone()),
                detail: None,
            },
            Value::Object(map) => {
                let pick = |keys: &[&str]| {
                    keys.iter()
                        .filter_map(|k| map.get(*k))
                        .find_map(value_as_text)
                };
                Scholarship {
                    name: pick(&["name", "title"]),
                    detail: pick(&["detail", "amount", "eligibility", "description"]),
                }
            }
            _ => Scholarship::default(),
        }
    }
}

/// Result of `POST /quiz`, or the locally synthesized fallback.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RecommendationResult {
    #[serde(deserialize_with = "lenient_text")]
    pub stream: Option<String>,
    #[serde(deserialize_with = "college_list")]
    pub colleges: Vec<College>,
    #[serde(deserialize_with = "scholarship_list")]
    pub scholarships: Vec<Scholarship>,
    #[serde(deserialize_with = "lenient_text")]
    pub roadmap: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub reason: Option<String>,
}

impl RecommendationResult {
    /// Parses a backend body. Anything that is not a recognizable object yields an
    /// empty record rather than an error.
    pub fn from_wire(value: Value) -> Self {
        serde_json::from_value(value).unwrap_or_default()
    }
}

/// `GET /colleges` returns either a flat list or an object keyed by category.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CollegesPayload {
    List(Vec<Value>),
    Grouped(BTreeMap<String, Value>),
}

impl CollegesPayload {
    pub fn from_wire(value: Value) -> Self {
        serde_json::from_value(value).unwrap_or(CollegesPayload::List(Vec::new()))
    }

    /// Flattens either shape into one list. Grouped payloads are walked in category
    /// name order; non-array category values are skipped.
    pub fn into_colleges(self) -> Vec<College> {
        match self {
            CollegesPayload::List(items) => items.iter().map(College::from_wire).collect(),
            CollegesPayload::Grouped(groups) => groups
                .values()
                .filter_map(Value::as_array)
                .flatten()
                .map(College::from_wire)
                .collect(),
        }
    }
}

fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => {
            let lines: Vec<String> = items.iter().filter_map(value_as_text).collect();
            if lines.is_empty() {
                None
            } else {
                Some(lines.join("\n"))
            }
        }
        _ => None,
    }
}

pub(crate) fn lenient_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let value = Option::<Value>::deserialize(d)?;
    Ok(value.as_ref().and_then(value_as_text))
}

fn lenient_flag<'de, D: Deserializer<'de>>(d: D) -> Result<Option<bool>, D::Error> {
    let value = Option::<Value>::deserialize(d)?;
    Ok(match value {
        Some(Value::Bool(b)) => Some(b),
        Some(Value::Number(n)) => n.as_f64().map(|n| n != 0.0),
        Some(Value::String(s)) => match s.trim().to_lowercase().as_str() {
            "yes" | "y" | "true" | "available" => Some(true),
            "no" | "n" | "false" | "unavailable" => Some(false),
            _ => None,
        },
        _ => None,
    })
}

fn lenient_scalar<'de, D: Deserializer<'de>>(d: D) -> Result<Option<TextOrNumber>, D::Error> {
    let value = Option::<Value>::deserialize(d)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64().map(TextOrNumber::Number),
        Some(Value::String(s)) if !s.trim().is_empty() => match s.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => Some(TextOrNumber::Number(n)),
            _ => Some(TextOrNumber::Text(s.trim().to_string())),
        },
        _ => None,
    })
}

fn college_list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<College>, D::Error> {
    let value = Option::<Value>::deserialize(d)?;
    Ok(match value {
        Some(Value::Array(items)) => items.iter().map(College::from_wire).collect(),
        _ => Vec::new(),
    })
}

fn scholarship_list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Scholarship>, D::Error> {
    let value = Option::<Value>::deserialize(d)?;
    Ok(match value {
        Some(Value::Array(items)) => items.iter().map(Scholarship::from_wire).collect(),
        _ => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_college_entries_string_or_object() {
        let result = RecommendationResult::from_wire(json!({
            "stream": "Science",
            "colleges": [
                "Govt. Science College",
                {"name": "City College", "medium": "English", "hostel": "yes", "distance": "12", "fees": 15000}
            ]
        }));

        assert_eq!(result.colleges.len(), 2);
        assert_eq!(result.colleges[0], College::named("Govt. Science College"));
        let city = &result.colleges[1];
        assert_eq!(city.hostel, Some(true));
        assert_eq!(city.distance, Some(TextOrNumber::Number(12.0)));
        assert_eq!(city.fees.as_ref().map(|f| f.to_string()).as_deref(), Some("15000"));
    }

    #[test]
    fn test_malformed_body_defaults_to_empty_record() {
        assert_eq!(
            RecommendationResult::from_wire(json!("oops")),
            RecommendationResult::default()
        );
        assert_eq!(
            RecommendationResult::from_wire(Value::Null),
            RecommendationResult::default()
        );
    }

    #[test]
    fn test_wrongly_typed_fields_degrade_instead_of_failing() {
        let result = RecommendationResult::from_wire(json!({
            "stream": null,
            "colleges": "none",
            "scholarships": [{"title": "Merit Award", "amount": 5000}, 7],
            "roadmap": ["Class 11: PCM", "Class 12: boards"],
            "reason": 42
        }));

        assert_eq!(result.stream, None);
        assert!(result.colleges.is_empty());
        assert_eq!(result.scholarships[0].name.as_deref(), Some("Merit Award"));
        assert_eq!(result.scholarships[0].detail.as_deref(), Some("5000"));
        assert_eq!(result.scholarships[1], Scholarship::default());
        assert_eq!(
            result.roadmap.as_deref(),
            Some("Class 11: PCM\nClass 12: boards")
        );
        assert_eq!(result.reason.as_deref(), Some("42"));
    }

    #[test]
    fn test_colleges_array_and_grouped_flatten_identically() {
        let a = json!({"name": "Alpha College", "distance": 3});
        let b = json!("Beta College");
        let c = json!({"name": "Gamma College", "medium": "Hindi"});

        let listed = CollegesPayload::from_wire(json!([a.clone(), b.clone(), c.clone()])).into_colleges();
        let grouped = CollegesPayload::from_wire(json!({
            "arts": [a, b],
            "science": [c],
            "meta": "ignored"
        }))
        .into_colleges();

        assert_eq!(listed.len(), 3);
        assert_eq!(listed, grouped);
    }
}
