use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{FromRow, PgPool};
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::quiz::SavedQuizEntry;
use crate::session::StoreError;

/// Append-only list of every quiz a session has saved.
#[async_trait]
pub trait SavedQuizLog: Send + Sync {
    async fn append(&self, session_id: Uuid, entry: &SavedQuizEntry) -> Result<(), StoreError>;
    /// Entries oldest first.
    async fn list(&self, session_id: Uuid) -> Result<Vec<SavedQuizEntry>, StoreError>;
}

#[derive(Debug, FromRow)]
struct SavedQuizRow {
    payload: Value,
    result: Value,
    created_at: DateTime<Utc>,
}

impl SavedQuizRow {
    fn into_entry(self) -> Result<SavedQuizEntry, serde_json::Error> {
        Ok(SavedQuizEntry {
            timestamp: self.created_at,
            payload: serde_json::from_value(self.payload)?,
            result: serde_json::from_value(self.result)?,
        })
    }
}

/// Postgres-backed log. Rows are only ever inserted.
#[derive(Clone)]
pub struct PgSavedQuizLog {
    pool: PgPool,
}

impl PgSavedQuizLog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SavedQuizLog for PgSavedQuizLog {
    async fn append(&self, session_id: Uuid, entry: &SavedQuizEntry) -> Result<(), StoreError> {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO saved_quizzes (id, session_id, payload, result, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(id)
        .bind(session_id)
        .bind(serde_json::to_value(&entry.payload)?)
        .bind(serde_json::to_value(&entry.result)?)
        .bind(entry.timestamp)
        .execute(&self.pool)
        .await?;

        info!("Saved quiz {id} for session {session_id}");
        Ok(())
    }

    async fn list(&self, session_id: Uuid) -> Result<Vec<SavedQuizEntry>, StoreError> {
        let rows = sqlx::query_as::<_, SavedQuizRow>(
            "SELECT payload, result, created_at FROM saved_quizzes WHERE session_id = $1 ORDER BY created_at ASC",
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        // unreadable rows are skipped
        Ok(rows
            .into_iter()
            .filter_map(|row| match row.into_entry() {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Skipping unreadable saved quiz for session {session_id}: {e}");
                    None
                }
            })
            .collect())
    }
}

#[derive(Default)]
pub struct MemorySavedQuizLog {
    entries: RwLock<HashMap<Uuid, Vec<SavedQuizEntry>>>,
}

#[async_trait]
impl SavedQuizLog for MemorySavedQuizLog {
    async fn append(&self, session_id: Uuid, entry: &SavedQuizEntry) -> Result<(), StoreError> {
        self.entries
            .write()
            .await
            .entry(session_id)
            .or_default()
            .push(entry.clone());
        Ok(())
    }

    async fn list(&self, session_id: Uuid) -> Result<Vec<SavedQuizEntry>, StoreError> {
        Ok(self
            .entries
            .read()
            .await
            .get(&session_id)
            .cloned()
            .unwrap_or_default())
    }
}
