use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::profile::{AuthSession, Profile};
use crate::models::quiz::{IncompleteQuiz, SavedQuizEntry};
use crate::session::history::SavedQuizLog;
use crate::session::storage::KeyValueStore;
use crate::session::StoreError;

/// The records a client session keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKey {
    OnlineMode,
    LastQuiz,
    IncompleteQuiz,
    UserId,
    AccessToken,
    Profile,
}

impl SessionKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionKey::OnlineMode => "online_mode",
            SessionKey::LastQuiz => "last_quiz",
            SessionKey::IncompleteQuiz => "incomplete_quiz",
            SessionKey::UserId => "user_id",
            SessionKey::AccessToken => "access_token",
            SessionKey::Profile => "profile",
        }
    }
}

fn storage_key(session_id: Uuid, key: SessionKey) -> String {
    format!("advisor:{session_id}:{}", key.as_str())
}

/// Typed access to one client's local storage.
///
/// Values are JSON with no schema version. A value that no longer parses is treated as
/// absent.
#[derive(Clone)]
pub struct SessionStore {
    kv: Arc<dyn KeyValueStore>,
    log: Arc<dyn SavedQuizLog>,
}

impl SessionStore {
    pub fn new(kv: Arc<dyn KeyValueStore>, log: Arc<dyn SavedQuizLog>) -> Self {
        Self { kv, log }
    }

    async fn read<T: DeserializeOwned>(
        &self,
        session_id: Uuid,
        key: SessionKey,
    ) -> Result<Option<T>, StoreError> {
        let Some(raw) = self.kv.get(&storage_key(session_id, key)).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!("Ignoring unreadable '{}' for session {session_id}: {e}", key.as_str());
                Ok(None)
            }
        }
    }

    async fn write<T: Serialize>(
        &self,
        session_id: Uuid,
        key: SessionKey,
        value: &T,
    ) -> Result<(), StoreError> {
        let raw = serde_json::to_string(value)?;
        self.kv.set(&storage_key(session_id, key), &raw).await?;
        debug!("Stored '{}' for session {session_id}", key.as_str());
        Ok(())
    }

    async fn remove(&self, session_id: Uuid, key: SessionKey) -> Result<(), StoreError> {
        self.kv.remove(&storage_key(session_id, key)).await
    }

    /// Online unless the client switched it off.
    pub async fn is_online(&self, session_id: Uuid) -> Result<bool, StoreError> {
        Ok(self
            .read(session_id, SessionKey::OnlineMode)
            .await?
            .unwrap_or(true))
    }

    pub async fn set_online(&self, session_id: Uuid, online: bool) -> Result<(), StoreError> {
        self.write(session_id, SessionKey::OnlineMode, &online).await
    }

    /// Overwrites the last-quiz record and appends the entry to the saved list.
    pub async fn save_quiz_local(
        &self,
        session_id: Uuid,
        entry: &SavedQuizEntry,
    ) -> Result<(), StoreError> {
        self.write(session_id, SessionKey::LastQuiz, entry).await?;
        self.log.append(session_id, entry).await
    }

    pub async fn last_quiz(&self, session_id: Uuid) -> Result<Option<SavedQuizEntry>, StoreError> {
        self.read(session_id, SessionKey::LastQuiz).await
    }

    pub async fn saved_quizzes(&self, session_id: Uuid) -> Result<Vec<SavedQuizEntry>, StoreError> {
        self.log.list(session_id).await
    }

    pub async fn save_incomplete(
        &self,
        session_id: Uuid,
        quiz: &IncompleteQuiz,
    ) -> Result<(), StoreError> {
        self.write(session_id, SessionKey::IncompleteQuiz, quiz).await
    }

    pub async fn incomplete(&self, session_id: Uuid) -> Result<Option<IncompleteQuiz>, StoreError> {
        self.read(session_id, SessionKey::IncompleteQuiz).await
    }

    /// Stores the identity returned by signup or login. A missing token or profile
    /// clears any previous one.
    pub async fn save_identity(&self, session_id: Uuid, auth: &AuthSession) -> Result<(), StoreError> {
        self.write(session_id, SessionKey::UserId, &auth.user_id).await?;
        match &auth.access_token {
            Some(token) => self.write(session_id, SessionKey::AccessToken, token).await?,
            None => self.remove(session_id, SessionKey::AccessToken).await?,
        }
        match &auth.profile {
            Some(profile) => self.cache_profile(session_id, profile).await?,
            None => self.remove(session_id, SessionKey::Profile).await?,
        }
        Ok(())
    }

    pub async fn clear_identity(&self, session_id: Uuid) -> Result<(), StoreError> {
        for key in [SessionKey::UserId, SessionKey::AccessToken, SessionKey::Profile] {
            self.remove(session_id, key).await?;
        }
        Ok(())
    }

    pub async fn user_id(&self, session_id: Uuid) -> Result<Option<String>, StoreError> {
        self.read(session_id, SessionKey::UserId).await
    }

    pub async fn access_token(&self, session_id: Uuid) -> Result<Option<String>, StoreError> {
        self.read(session_id, SessionKey::AccessToken).await
    }

    pub async fn cached_profile(&self, session_id: Uuid) -> Result<Option<Profile>, StoreError> {
        self.read(session_id, SessionKey::Profile).await
    }

    pub async fn cache_profile(&self, session_id: Uuid, profile: &Profile) -> Result<(), StoreError> {
        self.write(session_id, SessionKey::Profile, profile).await
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::session::history::MemorySavedQuizLog;
    use crate::session::storage::MemoryStore;

    pub fn memory_store() -> SessionStore {
        SessionStore::new(
            Arc::new(MemoryStore::default()),
            Arc::new(MemorySavedQuizLog::default()),
        )
    }
}
