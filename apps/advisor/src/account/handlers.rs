use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::account::auth::{self, LoginForm, SignupForm};
use crate::account::profile::{self, ProfileReply};
use crate::errors::AppError;
use crate::models::profile::{AuthSession, Profile};
use crate::state::AppState;

/// The access token stays in the session store and is not echoed back.
#[derive(Debug, Serialize)]
pub struct SignedInResponse {
    pub user_id: String,
    pub profile: Option<Profile>,
}

impl From<AuthSession> for SignedInResponse {
    fn from(auth: AuthSession) -> Self {
        Self {
            user_id: auth.user_id,
            profile: auth.profile,
        }
    }
}

/// POST /api/v1/sessions/:sid/signup
pub async fn handle_signup(
    State(state): State<AppState>,
    Path(sid): Path<Uuid>,
    Json(form): Json<SignupForm>,
) -> Result<(StatusCode, Json<SignedInResponse>), AppError> {
    let auth = auth::signup(state.backend.as_ref(), &state.store, sid, &form).await?;
    Ok((StatusCode::CREATED, Json(auth.into())))
}

/// POST /api/v1/sessions/:sid/login
pub async fn handle_login(
    State(state): State<AppState>,
    Path(sid): Path<Uuid>,
    Json(form): Json<LoginForm>,
) -> Result<Json<SignedInResponse>, AppError> {
    let auth = auth::login(state.backend.as_ref(), &state.store, sid, &form).await?;
    Ok(Json(auth.into()))
}

/// POST /api/v1/sessions/:sid/login-test
pub async fn handle_login_test(
    State(state): State<AppState>,
    Path(sid): Path<Uuid>,
) -> Result<Json<SignedInResponse>, AppError> {
    let auth = auth::login_test(state.backend.as_ref(), &state.store, sid).await?;
    Ok(Json(auth.into()))
}

/// POST /api/v1/sessions/:sid/logout
pub async fn handle_logout(
    State(state): State<AppState>,
    Path(sid): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    auth::logout(&state.store, sid).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/sessions/:sid/profile
pub async fn handle_get_profile(
    State(state): State<AppState>,
    Path(sid): Path<Uuid>,
) -> Result<Json<ProfileReply>, AppError> {
    Ok(Json(
        profile::fetch_profile(state.backend.as_ref(), &state.store, sid).await?,
    ))
}

/// POST /api/v1/sessions/:sid/profile
pub async fn handle_update_profile(
    State(state): State<AppState>,
    Path(sid): Path<Uuid>,
    Json(fields): Json<Map<String, Value>>,
) -> Result<Json<ProfileReply>, AppError> {
    Ok(Json(
        profile::update_profile(state.backend.as_ref(), &state.store, sid, &fields).await?,
    ))
}
