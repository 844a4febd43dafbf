mod account;
mod assistant;
mod backend_client;
mod colleges;
mod config;
mod db;
mod errors;
mod models;
mod quiz;
mod render;
mod routes;
mod session;
mod state;
mod submission;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::backend_client::HttpBackend;
use crate::config::Config;
use crate::db::{create_pool, ensure_schema};
use crate::quiz::{QuestionBank, WizardRegistry};
use crate::routes::build_router;
use crate::session::history::PgSavedQuizLog;
use crate::session::storage::RedisStore;
use crate::session::SessionStore;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting advisor v{}", env!("CARGO_PKG_VERSION"));

    // Saved quiz list
    let db = create_pool(&config.database_url).await?;
    ensure_schema(&db).await?;

    // Per-session key-value records
    let redis = redis::Client::open(config.redis_url.clone())?;
    let kv = RedisStore::connect(&redis).await?;
    let store = SessionStore::new(Arc::new(kv), Arc::new(PgSavedQuizLog::new(db)));

    // Recommendation backend
    let backend = HttpBackend::new(
        &config.backend_url,
        Duration::from_secs(config.backend_timeout_secs),
    )?;
    info!(
        "Backend client initialized ({}, timeout {}s)",
        config.backend_url, config.backend_timeout_secs
    );

    let bank = Arc::new(QuestionBank::default());
    info!("Question bank loaded ({} questions)", bank.questions.len());

    let state = AppState::new(Arc::new(backend), store, WizardRegistry::new(bank));

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the frontend host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
