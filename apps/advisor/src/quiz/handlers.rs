//! Axum route handlers for the quiz wizard.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::quiz::{FormFields, SavedQuizEntry};
use crate::quiz::questions::QuestionBank;
use crate::quiz::wizard::{StepAction, WizardView};
use crate::render::{render_recommendation, summary_line, RecommendationView};
use crate::state::AppState;
use crate::submission::SubmissionOutcome;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct SessionCreatedResponse {
    pub session_id: Uuid,
    pub wizard: WizardView,
}

#[derive(Debug, Deserialize)]
pub struct FieldsRequest {
    pub fields: FormFields,
}

#[derive(Debug, Deserialize)]
pub struct OnlineRequest {
    pub online: bool,
}

#[derive(Debug, Serialize)]
pub struct OnlineResponse {
    pub online: bool,
}

#[derive(Debug, Serialize)]
pub struct LastQuizResponse {
    pub entry: SavedQuizEntry,
    pub view: RecommendationView,
}

#[derive(Debug, Serialize)]
pub struct SavedListResponse {
    pub items: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<SessionCreatedResponse>), AppError> {
    let (session_id, wizard) = state.wizards.create().await?;
    info!("Created session {session_id}");
    Ok((
        StatusCode::CREATED,
        Json(SessionCreatedResponse { session_id, wizard }),
    ))
}

/// GET /api/v1/questions
pub async fn handle_questions(State(state): State<AppState>) -> Json<QuestionBank> {
    Json(state.wizards.bank().as_ref().clone())
}

/// GET /api/v1/sessions/:sid/wizard
pub async fn handle_get_wizard(
    State(state): State<AppState>,
    Path(sid): Path<Uuid>,
) -> Result<Json<WizardView>, AppError> {
    Ok(Json(state.wizards.peek(sid, |w| w.view()).await?))
}

/// POST /api/v1/sessions/:sid/wizard/step
pub async fn handle_step(
    State(state): State<AppState>,
    Path(sid): Path<Uuid>,
    Json(action): Json<StepAction>,
) -> Result<Json<WizardView>, AppError> {
    let view = state
        .wizards
        .with(sid, |w| {
            w.navigate(&action);
            w.view()
        })
        .await?;
    Ok(Json(view))
}

/// PUT /api/v1/sessions/:sid/wizard/fields
pub async fn handle_put_fields(
    State(state): State<AppState>,
    Path(sid): Path<Uuid>,
    Json(request): Json<FieldsRequest>,
) -> Result<Json<WizardView>, AppError> {
    let view = state
        .wizards
        .with(sid, |w| {
            w.merge_fields(request.fields);
            w.view()
        })
        .await?;
    Ok(Json(view))
}

/// POST /api/v1/sessions/:sid/wizard/save
pub async fn handle_save_incomplete(
    State(state): State<AppState>,
    Path(sid): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let incomplete = state.wizards.with(sid, |w| w.to_incomplete()).await?;
    state.store.save_incomplete(sid, &incomplete).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/sessions/:sid/wizard/resume
pub async fn handle_resume(
    State(state): State<AppState>,
    Path(sid): Path<Uuid>,
) -> Result<Json<WizardView>, AppError> {
    let saved = state
        .store
        .incomplete(sid)
        .await?
        .ok_or_else(|| AppError::NotFound("No saved quiz to resume".to_string()))?;

    let view = state
        .wizards
        .with(sid, |w| {
            w.restore(saved);
            w.view()
        })
        .await?;
    Ok(Json(view))
}

/// POST /api/v1/sessions/:sid/quiz/submit
///
/// Collect → score → submit (or fall back) → render → store.
pub async fn handle_submit(
    State(state): State<AppState>,
    Path(sid): Path<Uuid>,
) -> Result<Json<SubmissionOutcome>, AppError> {
    let bank = Arc::clone(state.wizards.bank());
    let collected = state.wizards.with(sid, |w| w.collect_for_submit()).await??;
    let payload = collected.into_payload(&bank);

    let outcome = state.submissions.submit(sid, payload).await?;
    info!(
        "Quiz submitted for session {sid}: source={:?}, stream={}",
        outcome.source, outcome.view.shortlist.stream
    );
    Ok(Json(outcome))
}

/// GET /api/v1/sessions/:sid/quiz/last
pub async fn handle_last_quiz(
    State(state): State<AppState>,
    Path(sid): Path<Uuid>,
) -> Result<Json<LastQuizResponse>, AppError> {
    let entry = state
        .store
        .last_quiz(sid)
        .await?
        .ok_or_else(|| AppError::NotFound("No quiz has been submitted yet".to_string()))?;
    let view = render_recommendation(&entry.result);
    Ok(Json(LastQuizResponse { entry, view }))
}

/// GET /api/v1/sessions/:sid/quiz/saved
pub async fn handle_saved_list(
    State(state): State<AppState>,
    Path(sid): Path<Uuid>,
) -> Result<Json<SavedListResponse>, AppError> {
    let entries = state.store.saved_quizzes(sid).await?;
    Ok(Json(SavedListResponse {
        items: entries.iter().map(summary_line).collect(),
    }))
}

/// PUT /api/v1/sessions/:sid/online
pub async fn handle_set_online(
    State(state): State<AppState>,
    Path(sid): Path<Uuid>,
    Json(request): Json<OnlineRequest>,
) -> Result<Json<OnlineResponse>, AppError> {
    state.store.set_online(sid, request.online).await?;
    Ok(Json(OnlineResponse {
        online: request.online,
    }))
}
