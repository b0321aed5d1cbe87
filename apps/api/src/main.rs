mod config;
mod cv;
mod db;
mod errors;
mod jobs;
mod llm_client;
mod matching;
mod models;
mod routes;
mod state;

#[cfg(test)]
mod testing;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, JobSource};
use crate::cv::summarizer::{CvSummarizer, LlmCvSummarizer, PassthroughSummarizer};
use crate::db::{create_pool, run_migrations};
use crate::jobs::backfill::{backfill_embeddings, DEFAULT_BATCH_SIZE};
use crate::jobs::memory::InMemoryJobStore;
use crate::jobs::store::{JobStore, PgJobStore};
use crate::llm_client::{AzureSettings, LlmClient};
use crate::matching::embedding::{AzureEmbeddingProvider, EmbeddingProvider};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Job Match API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize job store
    let store = build_store(&config).await?;

    // Initialize provider client (single instance, injected everywhere)
    let llm = LlmClient::new(AzureSettings::from_config(&config))
        .context("Failed to build provider HTTP client")?;

    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(AzureEmbeddingProvider::new(
        llm.clone(),
        config.embedding_dimension,
    ));
    info!(
        "Embedding provider initialized (deployment: {}, dimension: {})",
        config.embedding_deployment, config.embedding_dimension
    );

    let summarizer: Arc<dyn CvSummarizer> = if llm.has_chat_deployment() {
        info!("CV summarization enabled");
        Arc::new(LlmCvSummarizer(llm))
    } else {
        info!("CV summarization disabled (AZURE_OPENAI_GPT4_DEPLOYMENT not set)");
        Arc::new(PassthroughSummarizer)
    };

    if config.backfill_embeddings {
        spawn_backfill(store.clone(), embedder.clone());
    }

    // Build app state
    let state = AppState {
        store,
        embedder,
        summarizer,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn build_store(config: &Config) -> Result<Arc<dyn JobStore>> {
    match &config.job_source {
        JobSource::Postgres { database_url } => {
            let pool = create_pool(database_url).await?;
            if config.run_migrations {
                run_migrations(&pool).await?;
            }
            Ok(Arc::new(PgJobStore::new(pool)))
        }
        JobSource::File { path } => {
            let store = InMemoryJobStore::from_json_file(path)?;
            info!("Loaded {} jobs from {path}", store.len());
            Ok(Arc::new(store))
        }
    }
}

/// Fills missing candidate embeddings in the background; the server keeps
/// serving (with per-request embedding) while it runs.
fn spawn_backfill(store: Arc<dyn JobStore>, embedder: Arc<dyn EmbeddingProvider>) {
    tokio::spawn(async move {
        info!("Starting embedding backfill");
        if let Err(e) =
            backfill_embeddings(store.as_ref(), embedder.as_ref(), DEFAULT_BATCH_SIZE).await
        {
            error!("Embedding backfill aborted: {e}");
        }
    });
}
