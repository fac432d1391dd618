mod config;
mod db;
mod errors;
mod llm_client;
mod models;
mod quiz;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::{create_pool, ensure_schema};
use crate::llm_client::LlmClient;
use crate::quiz::explanation::LlmExplanationGenerator;
use crate::quiz::generator::LlmQuestionGenerator;
use crate::quiz::persistence::PgResultStore;
use crate::quiz::policy::QuizPolicy;
use crate::quiz::service::QuizService;
use crate::routes::build_router;
use crate::state::AppState;

const IDLE_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Interview API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    ensure_schema(&db).await?;

    // Initialize LLM client
    let llm = LlmClient::new(config.anthropic_api_key.clone());
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let policy = QuizPolicy::default();
    info!(
        quick_answer_limit = policy.quick_answer_limit,
        tab_switch_limit = policy.tab_switch_limit,
        "Quiz policy loaded"
    );

    let quiz = Arc::new(QuizService::new(
        Arc::new(LlmQuestionGenerator::new(llm.clone())),
        Arc::new(LlmExplanationGenerator::new(llm)),
        Arc::new(PgResultStore::new(db)),
        policy,
    ));

    // Abandoned sessions (closed tabs) never send DELETE
    quiz.spawn_idle_sweep(config.session_idle_ttl, IDLE_SWEEP_INTERVAL);
    info!(ttl_secs = config.session_idle_ttl.as_secs(), "Idle session sweep started");

    let state = AppState { quiz };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the web client's host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
