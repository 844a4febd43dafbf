//! Recommendation renderer. Projects a result into the three display groups.
//!
//! Every call rebuilds all groups from scratch. Missing fields become placeholder text
//! so each group always has the same shape.

use serde::Serialize;

use crate::models::quiz::SavedQuizEntry;
use crate::models::recommendation::{College, RecommendationResult, TextOrNumber};

pub const SHORTLIST_LIMIT: usize = 6;
pub const MAP_PREVIEW_LIMIT: usize = 5;
pub const PLACEHOLDER: &str = "Not available";

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CollegeCard {
    pub rank: usize,
    pub name: String,
    pub medium: String,
    pub hostel: String,
    pub fees: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Shortlist {
    pub stream: String,
    pub colleges: Vec<CollegeCard>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MapPin {
    pub name: String,
    pub distance: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AncillaryPanels {
    pub roadmap: String,
    pub reason: String,
    pub scholarships: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RecommendationView {
    pub shortlist: Shortlist,
    pub map_preview: Vec<MapPin>,
    pub ancillary: AncillaryPanels,
}

pub fn render_recommendation(result: &RecommendationResult) -> RecommendationView {
    RecommendationView {
        shortlist: render_shortlist(result),
        map_preview: render_map_preview(&result.colleges),
        ancillary: render_ancillary(result),
    }
}

fn render_shortlist(result: &RecommendationResult) -> Shortlist {
    Shortlist {
        stream: or_placeholder(result.stream.as_deref()),
        colleges: result
            .colleges
            .iter()
            .take(SHORTLIST_LIMIT)
            .enumerate()
            .map(|(i, c)| college_card(i + 1, c))
            .collect(),
    }
}

/// First `MAP_PREVIEW_LIMIT` colleges with their distance.
pub fn render_map_preview(colleges: &[College]) -> Vec<MapPin> {
    colleges
        .iter()
        .take(MAP_PREVIEW_LIMIT)
        .map(|c| MapPin {
            name: or_placeholder(c.name.as_deref()),
            distance: c
                .distance
                .as_ref()
                .map(|d| match d {
                    TextOrNumber::Number(_) => format!("{d} km"),
                    TextOrNumber::Text(_) => d.to_string(),
                })
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
        })
        .collect()
}

fn render_ancillary(result: &RecommendationResult) -> AncillaryPanels {
    let scholarships = if result.scholarships.is_empty() {
        vec!["No scholarships found".to_string()]
    } else {
        result
            .scholarships
            .iter()
            .map(|s| {
                let name = or_placeholder(s.name.as_deref());
                match s.detail.as_deref() {
                    Some(detail) => format!("{name}: {detail}"),
                    None => name,
                }
            })
            .collect()
    };

    AncillaryPanels {
        roadmap: or_placeholder(result.roadmap.as_deref()),
        reason: or_placeholder(result.reason.as_deref()),
        scholarships,
    }
}

pub fn college_card(rank: usize, college: &College) -> CollegeCard {
    CollegeCard {
        rank,
        name: or_placeholder(college.name.as_deref()),
        medium: or_placeholder(college.medium.as_deref()),
        hostel: match college.hostel {
            Some(true) => "Hostel available".to_string(),
            Some(false) => "No hostel".to_string(),
            None => PLACEHOLDER.to_string(),
        },
        fees: college
            .fees
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| PLACEHOLDER.to_string()),
    }
}

/// One line for the saved-quiz list.
pub fn summary_line(entry: &SavedQuizEntry) -> String {
    let stream = or_placeholder(entry.result.stream.as_deref());
    let count = entry.result.colleges.len();
    let plural = if count == 1 { "" } else { "s" };
    format!(
        "{} - {stream} ({count} college{plural})",
        entry.timestamp.format("%Y-%m-%d %H:%M")
    )
}

fn or_placeholder(value: Option<&str>) -> String {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(PLACEHOLDER)
        .to_string()
}
