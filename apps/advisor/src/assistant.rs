//! Chat assistant widget. Replies come from the backend; when it is unreachable the
//! widget gets a fixed offline reply instead of an error.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use crate::backend_client::AdvisorBackend;
use crate::errors::AppError;
use crate::state::AppState;

pub const OFFLINE_REPLY: &str = "The assistant is offline right now. Please try again later.";
pub const EMPTY_REPLY: &str = "Sorry, I don't have an answer for that yet.";

#[derive(Debug, Deserialize)]
pub struct AssistantRequest {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AssistantReply {
    pub reply: String,
    pub offline: bool,
}

pub async fn ask(backend: &dyn AdvisorBackend, message: &str) -> AssistantReply {
    match backend.ask_assistant(message).await {
        Ok(body) => AssistantReply {
            reply: body
                .get("reply")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .unwrap_or(EMPTY_REPLY)
                .to_string(),
            offline: false,
        },
        Err(e) => {
            warn!("Assistant request failed: {e}");
            AssistantReply {
                reply: OFFLINE_REPLY.to_string(),
                offline: true,
            }
        }
    }
}

/// POST /api/v1/sessions/:sid/assistant
pub async fn handle_ask(
    State(state): State<AppState>,
    Path(_sid): Path<Uuid>,
    Json(request): Json<AssistantRequest>,
) -> Result<Json<AssistantReply>, AppError> {
    let message = request.message.trim();
    if message.is_empty() {
        return Err(AppError::Validation("message cannot be empty".to_string()));
    }
    Ok(Json(ask(state.backend.as_ref(), message).await))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    use crate::backend_client::BackendError;

    struct Echo(Value);

    #[async_trait]
    impl AdvisorBackend for Echo {
        async fn ask_assistant(&self, _message: &str) -> Result<Value, BackendError> {
            Ok(self.0.clone())
        }
    }

    struct Down;

    #[async_trait]
    impl AdvisorBackend for Down {}

    #[tokio::test]
    async fn test_reply_passed_through() {
        let reply = ask(&Echo(json!({"reply": "Try the science stream."})), "hi").await;
        assert_eq!(reply.reply, "Try the science stream.");
        assert!(!reply.offline);
    }

    #[tokio::test]
    async fn test_missing_reply_field() {
        let reply = ask(&Echo(json!({})), "hi").await;
        assert_eq!(reply.reply, EMPTY_REPLY);
        assert!(!reply.offline);
    }

    #[tokio::test]
    async fn test_unreachable_backend_gives_offline_reply() {
        let reply = ask(&Down, "hi").await;
        assert_eq!(reply.reply, OFFLINE_REPLY);
        assert!(reply.offline);
    }
}
