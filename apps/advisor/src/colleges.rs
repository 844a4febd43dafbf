//! College directory preview built from `GET /colleges`.

use axum::{extract::State, Json};
use serde::Serialize;
use tracing::warn;

use crate::backend_client::AdvisorBackend;
use crate::models::recommendation::CollegesPayload;
use crate::render::{college_card, render_map_preview, CollegeCard, MapPin};
use crate::state::AppState;

pub const COLLEGE_PREVIEW_LIMIT: usize = 12;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CollegePreview {
    pub colleges: Vec<CollegeCard>,
    pub map_preview: Vec<MapPin>,
    pub total: usize,
    pub offline: bool,
}

/// Fetches and flattens the directory. An unreachable backend gives an empty,
/// offline-flagged preview.
pub async fn preview_colleges(backend: &dyn AdvisorBackend) -> CollegePreview {
    let colleges = match backend.colleges().await {
        Ok(body) => CollegesPayload::from_wire(body).into_colleges(),
        Err(e) => {
            warn!("College directory unavailable: {e}");
            return CollegePreview {
                colleges: Vec::new(),
                map_preview: Vec::new(),
                total: 0,
                offline: true,
            };
        }
    };

    CollegePreview {
        colleges: colleges
            .iter()
            .take(COLLEGE_PREVIEW_LIMIT)
            .enumerate()
            .map(|(i, c)| college_card(i + 1, c))
            .collect(),
        map_preview: render_map_preview(&colleges),
        total: colleges.len(),
        offline: false,
    }
}

/// GET /api/v1/colleges
pub async fn handle_colleges(State(state): State<AppState>) -> Json<CollegePreview> {
    Json(preview_colleges(state.backend.as_ref()).await)
}
