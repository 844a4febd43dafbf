/// Backend client: the single point of entry for all calls to the recommendation backend.
///
/// No other module talks to the backend over HTTP. Handlers depend on the
/// `AdvisorBackend` trait so tests can swap in a stub.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::quiz::QuizPayload;
use crate::models::recommendation::RecommendationResult;

const MAX_ATTEMPTS: u32 = 2;
const RETRY_DELAY_MS: u64 = 300;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Backend unavailable")]
    Unavailable,
}

impl BackendError {
    /// True when the backend answered and rejected the request (4xx). Everything else
    /// means it could not be reached or failed on its side.
    pub fn is_rejection(&self) -> bool {
        matches!(self, BackendError::Api { status, .. } if (400..500).contains(status))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SignupBody {
    pub full_name: String,
    pub email: String,
    pub password: String,
}

/// Operations the backend exposes. Every method defaults to `Unavailable` so partial
/// implementations only override what they serve.
#[async_trait]
pub trait AdvisorBackend: Send + Sync {
    /// `POST /quiz`
    async fn recommend(&self, _payload: &QuizPayload) -> Result<RecommendationResult, BackendError> {
        Err(BackendError::Unavailable)
    }

    /// `POST /assistant`, returns the raw reply object.
    async fn ask_assistant(&self, _message: &str) -> Result<Value, BackendError> {
        Err(BackendError::Unavailable)
    }

    /// `GET /colleges`
    async fn colleges(&self) -> Result<Value, BackendError> {
        Err(BackendError::Unavailable)
    }

    /// `POST /signup`
    async fn signup(&self, _body: &SignupBody) -> Result<Value, BackendError> {
        Err(BackendError::Unavailable)
    }

    /// `POST /login`
    async fn login(&self, _email: &str, _password: &str) -> Result<Value, BackendError> {
        Err(BackendError::Unavailable)
    }

    /// `GET /profile?user_id=`
    async fn profile(&self, _user_id: &str) -> Result<Value, BackendError> {
        Err(BackendError::Unavailable)
    }

    /// `POST /update-profile`
    async fn update_profile(&self, _body: &Value) -> Result<Value, BackendError> {
        Err(BackendError::Unavailable)
    }

    /// `GET /login-test`
    async fn login_test(&self) -> Result<Value, BackendError> {
        Err(BackendError::Unavailable)
    }
}

/// reqwest implementation against the real backend.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends a request, retrying once on 429/5xx and connection failures. Timeouts are
    /// not retried. A success body that is not JSON yields an empty object.
    async fn send(&self, build: impl Fn() -> RequestBuilder) -> Result<Value, BackendError> {
        let mut last_error: Option<BackendError> = None;

        for attempt in 0..MAX_ATTEMPTS {
            if attempt > 0 {
                let delay = Duration::from_millis(RETRY_DELAY_MS * (1 << (attempt - 1)));
                warn!(
                    "Backend call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = match build().send().await {
                Ok(r) => r,
                Err(e) if e.is_timeout() => return Err(BackendError::Http(e)),
                Err(e) => {
                    last_error = Some(BackendError::Http(e));
                    continue;
                }
            };

            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 || status.is_server_error() {
                warn!("Backend returned {}: {}", status, body);
                last_error = Some(BackendError::Api {
                    status: status.as_u16(),
                    message: error_message(&body).unwrap_or(body),
                });
                continue;
            }

            if !status.is_success() {
                return Err(BackendError::Api {
                    status: status.as_u16(),
                    message: error_message(&body).unwrap_or(body),
                });
            }

            debug!("Backend call succeeded with {}", status);
            return Ok(parse_body(&body));
        }

        Err(last_error.unwrap_or(BackendError::Unavailable))
    }
}

#[async_trait]
impl AdvisorBackend for HttpBackend {
    async fn recommend(&self, payload: &QuizPayload) -> Result<RecommendationResult, BackendError> {
        let body = self
            .send(|| self.client.post(self.url("/quiz")).json(payload))
            .await?;
        Ok(RecommendationResult::from_wire(body))
    }

    async fn ask_assistant(&self, message: &str) -> Result<Value, BackendError> {
        self.send(|| {
            self.client
                .post(self.url("/assistant"))
                .json(&json!({ "message": message }))
        })
        .await
    }

    async fn colleges(&self) -> Result<Value, BackendError> {
        self.send(|| self.client.get(self.url("/colleges"))).await
    }

    async fn signup(&self, body: &SignupBody) -> Result<Value, BackendError> {
        self.send(|| self.client.post(self.url("/signup")).json(body))
            .await
    }

    async fn login(&self, email: &str, password: &str) -> Result<Value, BackendError> {
        self.send(|| {
            self.client
                .post(self.url("/login"))
                .json(&json!({ "email": email, "password": password }))
        })
        .await
    }

    async fn profile(&self, user_id: &str) -> Result<Value, BackendError> {
        self.send(|| {
            self.client
                .get(self.url("/profile"))
                .query(&[("user_id", user_id)])
        })
        .await
    }

    async fn update_profile(&self, body: &Value) -> Result<Value, BackendError> {
        self.send(|| self.client.post(self.url("/update-profile")).json(body))
            .await
    }

    async fn login_test(&self) -> Result<Value, BackendError> {
        self.send(|| self.client.get(self.url("/login-test"))).await
    }
}

/// Parses a response body, falling back to an empty object for anything that is not JSON.
fn parse_body(body: &str) -> Value {
    serde_json::from_str(body).unwrap_or_else(|_| Value::Object(Map::new()))
}

/// Pulls a readable message out of an error body: `{"error": "..."}`,
/// `{"error": {"message": "..."}}` or `{"detail": "..."}`.
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let error = value.get("error");
    error
        .and_then(Value::as_str)
        .or_else(|| error.and_then(|e| e.get("message")).and_then(Value::as_str))
        .or_else(|| value.get("detail").and_then(Value::as_str))
        .map(String::from)
}
