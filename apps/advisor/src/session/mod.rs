// Per-session "local storage": a key-value store for the small JSON records the client
// keeps (online flag, last quiz, identity) plus a persisted list of saved quizzes.

pub mod history;
pub mod storage;
pub mod store;

use thiserror::Error;

pub use store::SessionStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
