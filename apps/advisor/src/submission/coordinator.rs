use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::backend_client::AdvisorBackend;
use crate::errors::AppError;
use crate::models::quiz::{QuizPayload, SavedQuizEntry};
use crate::models::recommendation::RecommendationResult;
use crate::quiz::fallback::recommend_offline;
use crate::render::{render_recommendation, RecommendationView};
use crate::session::SessionStore;
use crate::submission::tracker::{SubmissionTracker, TrackError};

pub const SERVER_UNREACHABLE_NOTICE: &str =
    "Could not reach the recommendation server. Showing an offline recommendation.";
pub const OFFLINE_MODE_NOTICE: &str = "Offline mode is on. Showing an offline recommendation.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationSource {
    Remote,
    Fallback,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmissionOutcome {
    pub source: RecommendationSource,
    /// User-visible notice when the fallback was used.
    pub notice: Option<String>,
    pub entry: SavedQuizEntry,
    pub view: RecommendationView,
    /// False when the result was shown but could not be stored.
    pub saved: bool,
}

struct Resolution {
    result: RecommendationResult,
    source: RecommendationSource,
    notice: Option<&'static str>,
}

/// Sends payloads upstream, falls back locally on any failure, renders and persists.
#[derive(Clone)]
pub struct SubmissionCoordinator {
    backend: Arc<dyn AdvisorBackend>,
    store: SessionStore,
    tracker: SubmissionTracker,
}

impl SubmissionCoordinator {
    pub fn new(backend: Arc<dyn AdvisorBackend>, store: SessionStore) -> Self {
        Self {
            backend,
            store,
            tracker: SubmissionTracker::default(),
        }
    }

    /// Runs one submission for a session. A newer submission for the same session
    /// aborts this one while its request is outstanding; the aborted call returns
    /// `Conflict` and nothing from it is rendered or stored.
    pub async fn submit(
        &self,
        session_id: Uuid,
        payload: QuizPayload,
    ) -> Result<SubmissionOutcome, AppError> {
        let online = match self.store.is_online(session_id).await {
            Ok(online) => online,
            Err(e) => {
                warn!("Could not read online flag for session {session_id}, assuming online: {e}");
                true
            }
        };

        let backend = Arc::clone(&self.backend);
        let request = payload.clone();
        let resolution = self
            .tracker
            .run(session_id, async move { resolve(backend, request, online).await })
            .await
            .map_err(|e| match e {
                TrackError::Superseded => {
                    AppError::Conflict("A newer submission replaced this one".to_string())
                }
                TrackError::Failed => AppError::Internal(anyhow::anyhow!("submission task failed")),
            })?;

        let view = render_recommendation(&resolution.result);
        let entry = SavedQuizEntry::new(payload, resolution.result);

        let saved = match self.store.save_quiz_local(session_id, &entry).await {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to save quiz for session {session_id}: {e}");
                false
            }
        };

        Ok(SubmissionOutcome {
            source: resolution.source,
            notice: resolution.notice.map(String::from),
            entry,
            view,
            saved,
        })
    }
}

async fn resolve(backend: Arc<dyn AdvisorBackend>, payload: QuizPayload, online: bool) -> Resolution {
    if !online {
        info!("Offline mode, using fallback recommendation");
        return fallback(&payload, OFFLINE_MODE_NOTICE);
    }

    match backend.recommend(&payload).await {
        Ok(result) => Resolution {
            result,
            source: RecommendationSource::Remote,
            notice: None,
        },
        Err(e) => {
            warn!("Recommendation request failed, using fallback: {e}");
            fallback(&payload, SERVER_UNREACHABLE_NOTICE)
        }
    }
}

fn fallback(payload: &QuizPayload, notice: &'static str) -> Resolution {
    Resolution {
        result: recommend_offline(&payload.tag_scores),
        source: RecommendationSource::Fallback,
        notice: Some(notice),
    }
}
