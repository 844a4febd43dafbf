use serde::Deserialize;
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::backend_client::{AdvisorBackend, SignupBody};
use crate::errors::AppError;
use crate::models::profile::{AuthSession, Profile};
use crate::session::SessionStore;

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Checks the form locally so a bad one never reaches the network.
pub fn validate_signup(form: &SignupForm) -> Result<SignupBody, AppError> {
    let email = normalize_email(&form.email)?;
    if form.password != form.confirm_password {
        return Err(AppError::Validation("Passwords do not match".to_string()));
    }
    if form.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(SignupBody {
        full_name: form.full_name.trim().to_string(),
        email,
        password: form.password.clone(),
    })
}

fn normalize_email(raw: &str) -> Result<String, AppError> {
    let email = raw.trim().to_lowercase();
    if email.is_empty() {
        return Err(AppError::Validation("email is required".to_string()));
    }
    Ok(email)
}

/// Reads a signup/login reply. The id may be `user_id` or `user.id`; the token may be
/// `access_token`, `token` or `id_token`. A reply carrying `error` is a rejection even
/// on a 2xx.
pub fn parse_auth_reply(body: &Value) -> Result<AuthSession, AppError> {
    if let Some(error) = body.get("error") {
        let message = error
            .as_str()
            .or_else(|| error.get("message").and_then(Value::as_str))
            .unwrap_or("Authentication failed");
        return Err(AppError::Validation(message.to_string()));
    }

    let user_id = body
        .get("user_id")
        .or_else(|| body.get("user").and_then(|u| u.get("id")))
        .and_then(|id| match id {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .ok_or_else(|| AppError::Unavailable("Server reply did not include a user id".to_string()))?;

    let access_token = ["access_token", "token", "id_token"]
        .iter()
        .find_map(|k| body.get(*k).and_then(Value::as_str))
        .map(String::from);

    let profile = body
        .get("profile")
        .filter(|p| p.is_object())
        .map(|p| Profile::from_wire(p.clone()));

    Ok(AuthSession {
        user_id,
        access_token,
        profile,
    })
}

pub async fn signup(
    backend: &dyn AdvisorBackend,
    store: &SessionStore,
    session_id: Uuid,
    form: &SignupForm,
) -> Result<AuthSession, AppError> {
    let body = validate_signup(form)?;
    let reply = backend.signup(&body).await?;
    let auth = parse_auth_reply(&reply)?;
    store.save_identity(session_id, &auth).await?;
    info!("Signed up user {} on session {session_id}", auth.user_id);
    Ok(auth)
}

pub async fn login(
    backend: &dyn AdvisorBackend,
    store: &SessionStore,
    session_id: Uuid,
    form: &LoginForm,
) -> Result<AuthSession, AppError> {
    let email = normalize_email(&form.email)?;
    if form.password.is_empty() {
        return Err(AppError::Validation("password is required".to_string()));
    }
    let reply = backend.login(&email, &form.password).await?;
    let auth = parse_auth_reply(&reply)?;
    store.save_identity(session_id, &auth).await?;
    info!("Logged in user {} on session {session_id}", auth.user_id);
    Ok(auth)
}

/// Dev bypass: the backend hands back a fixed test user.
pub async fn login_test(
    backend: &dyn AdvisorBackend,
    store: &SessionStore,
    session_id: Uuid,
) -> Result<AuthSession, AppError> {
    let reply = backend.login_test().await?;
    let auth = parse_auth_reply(&reply)?;
    store.save_identity(session_id, &auth).await?;
    info!("Test login as {} on session {session_id}", auth.user_id);
    Ok(auth)
}

pub async fn logout(store: &SessionStore, session_id: Uuid) -> Result<(), AppError> {
    store.clear_identity(session_id).await?;
    info!("Logged out session {session_id}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use serde_json::json;

    use crate::backend_client::BackendError;
    use crate::session::store::test_support::memory_store;

    fn form(password: &str, confirm: &str) -> SignupForm {
        SignupForm {
            full_name: " Asha Rao ".to_string(),
            email: "  Asha@Example.COM ".to_string(),
            password: password.to_string(),
            confirm_password: confirm.to_string(),
        }
    }

    #[derive(Default)]
    struct CountingBackend {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl AdvisorBackend for CountingBackend {
        async fn signup(&self, body: &SignupBody) -> Result<Value, BackendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(json!({"user_id": format!("uid-{}", body.email), "access_token": "tok"}))
        }

        async fn login(&self, _email: &str, password: &str) -> Result<Value, BackendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if password == "wrong" {
                return Err(BackendError::Api {
                    status: 401,
                    message: "INVALID_PASSWORD".to_string(),
                });
            }
            Ok(json!({"user": {"id": "u1"}, "token": "t1", "profile": {"full_name": "Asha"}}))
        }
    }

    #[test]
    fn test_signup_normalizes_email() {
        let body = validate_signup(&form("secret1", "secret1")).unwrap();
        assert_eq!(body.email, "asha@example.com");
        assert_eq!(body.full_name, "Asha Rao");
    }

    #[test]
    fn test_signup_rejects_mismatch_and_short_password() {
        assert!(matches!(
            validate_signup(&form("secret1", "secret2")),
            Err(AppError::Validation(m)) if m == "Passwords do not match"
        ));
        assert!(matches!(
            validate_signup(&form("abc", "abc")),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_parse_reply_shapes() {
        let auth = parse_auth_reply(&json!({"user_id": "abc", "id_token": "x"})).unwrap();
        assert_eq!(auth.user_id, "abc");
        assert_eq!(auth.access_token.as_deref(), Some("x"));
        assert!(auth.profile.is_none());

        let auth = parse_auth_reply(&json!({"user": {"id": 42}})).unwrap();
        assert_eq!(auth.user_id, "42");
        assert!(auth.access_token.is_none());
    }

    #[test]
    fn test_parse_reply_error_field() {
        let err = parse_auth_reply(&json!({"error": {"message": "EMAIL_EXISTS"}})).unwrap_err();
        assert!(matches!(err, AppError::Validation(m) if m == "EMAIL_EXISTS"));
        assert!(parse_auth_reply(&json!({})).is_err());
    }

    #[tokio::test]
    async fn test_invalid_signup_never_calls_backend() {
        let backend = CountingBackend::default();
        let store = memory_store();
        let result = signup(&backend, &store, Uuid::new_v4(), &form("abc", "abc")).await;
        assert!(result.is_err());
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_login_stores_identity_and_logout_clears_it() {
        let backend = CountingBackend::default();
        let store = memory_store();
        let sid = Uuid::new_v4();
        let creds = LoginForm {
            email: "a@b.c".to_string(),
            password: "secret1".to_string(),
        };

        login(&backend, &store, sid, &creds).await.unwrap();
        assert_eq!(store.user_id(sid).await.unwrap().as_deref(), Some("u1"));
        assert_eq!(store.access_token(sid).await.unwrap().as_deref(), Some("t1"));
        assert_eq!(
            store.cached_profile(sid).await.unwrap().and_then(|p| p.full_name),
            Some("Asha".to_string())
        );

        logout(&store, sid).await.unwrap();
        assert!(store.user_id(sid).await.unwrap().is_none());
        assert!(store.cached_profile(sid).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rejected_login_surfaces_message() {
        let backend = CountingBackend::default();
        let store = memory_store();
        let creds = LoginForm {
            email: "a@b.c".to_string(),
            password: "wrong".to_string(),
        };
        let err = login(&backend, &store, Uuid::new_v4(), &creds).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(m) if m == "INVALID_PASSWORD"));
    }

    #[tokio::test]
    async fn test_login_test_unreachable() {
        let backend = CountingBackend::default();
        let err = login_test(&backend, &memory_store(), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unavailable(_)));
    }
}
