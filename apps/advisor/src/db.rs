use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

/// Creates the saved-quiz table if it does not exist yet.
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS saved_quizzes (
            id          UUID PRIMARY KEY,
            session_id  UUID NOT NULL,
            payload     JSONB NOT NULL,
            result      JSONB NOT NULL,
            created_at  TIMESTAMPTZ NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS saved_quizzes_session_idx \
         ON saved_quizzes (session_id, created_at)",
    )
    .execute(pool)
    .await?;

    info!("Schema ready");
    Ok(())
}
