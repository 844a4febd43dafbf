use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{info, warn};
use uuid::Uuid;

use crate::backend_client::AdvisorBackend;
use crate::errors::AppError;
use crate::models::profile::{split_skills, Profile};
use crate::session::{SessionStore, StoreError};

/// Fields the backend accepts on `/update-profile`.
pub const ALLOWED_PROFILE_FIELDS: &[&str] = &[
    "full_name",
    "location",
    "date_of_birth",
    "gender",
    "class_grade",
    "previous_class_percentage",
    "stream",
    "favourite_subject",
    "hobby",
    "skills",
    "career_interest",
    "financial_condition",
    "parents_occupation",
    "language_preference",
    "extracurricular",
    "learning_style",
    "_saved_at",
];

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProfileReply {
    pub profile: Profile,
    /// Set when the backend was unreachable and the cached copy is shown.
    pub offline: bool,
}

/// Keeps only allowed fields. `skills` may be a comma-separated string and becomes a
/// list; `previous_class_percentage` becomes a number when it parses, null when blank.
pub fn normalize_profile_fields(input: &Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::new();
    for (key, value) in input {
        if !ALLOWED_PROFILE_FIELDS.contains(&key.as_str()) {
            continue;
        }
        let normalized = match (key.as_str(), value) {
            ("skills", Value::String(s)) => Value::from(split_skills(s)),
            ("previous_class_percentage", Value::String(s)) if s.trim().is_empty() => Value::Null,
            ("previous_class_percentage", Value::String(s)) => match s.trim().parse::<f64>() {
                Ok(n) => Value::from(n),
                Err(_) => value.clone(),
            },
            _ => value.clone(),
        };
        out.insert(key.clone(), normalized);
    }
    out
}

async fn require_user(store: &SessionStore, session_id: Uuid) -> Result<String, AppError> {
    store
        .user_id(session_id)
        .await?
        .ok_or(AppError::Unauthorized)
}

/// Loads the profile from the backend and refreshes the cache. If the backend cannot
/// be reached the cached profile is returned instead.
pub async fn fetch_profile(
    backend: &dyn AdvisorBackend,
    store: &SessionStore,
    session_id: Uuid,
) -> Result<ProfileReply, AppError> {
    let user_id = require_user(store, session_id).await?;

    match backend.profile(&user_id).await {
        Ok(body) => {
            let raw = body.get("profile").cloned().unwrap_or(body);
            let profile = Profile::from_wire(raw);
            store.cache_profile(session_id, &profile).await?;
            Ok(ProfileReply {
                profile,
                offline: false,
            })
        }
        Err(e) if e.is_rejection() => Err(e.into()),
        Err(e) => {
            warn!("Profile fetch failed for {user_id}, using cached copy: {e}");
            Ok(ProfileReply {
                profile: store.cached_profile(session_id).await?.unwrap_or_default(),
                offline: true,
            })
        }
    }
}

/// Sends the allowed subset of `fields` upstream and merges it into the cached profile.
pub async fn update_profile(
    backend: &dyn AdvisorBackend,
    store: &SessionStore,
    session_id: Uuid,
    fields: &Map<String, Value>,
) -> Result<ProfileReply, AppError> {
    let user_id = require_user(store, session_id).await?;

    let updates = normalize_profile_fields(fields);
    if updates.is_empty() {
        return Err(AppError::Validation(
            "No valid profile fields provided".to_string(),
        ));
    }

    let mut body = updates.clone();
    body.insert("user_id".to_string(), Value::String(user_id.clone()));
    backend.update_profile(&Value::Object(body)).await?;

    let cached = store.cached_profile(session_id).await?.unwrap_or_default();
    let mut merged = match serde_json::to_value(&cached).map_err(StoreError::from)? {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    merged.extend(updates);
    let profile = Profile::from_wire(Value::Object(merged));
    store.cache_profile(session_id, &profile).await?;

    info!("Updated profile for {user_id}");
    Ok(ProfileReply {
        profile,
        offline: false,
    })
}
