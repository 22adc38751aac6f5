mod config;
mod embedding_client;
mod errors;
mod matching;
mod models;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::embedding_client::build_embedding_client;
use crate::matching::ranking::JobRanker;
use crate::matching::skills::SkillVocabulary;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on malformed env vars)
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

    info!("Starting JobFit API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize embedding client (disabled client when EMBEDDINGS_ENABLED=false)
    let embedder = build_embedding_client(&config.embedding)
        .context("Failed to build embedding client")?;
    if config.embedding.enabled {
        info!(
            "Embedding client initialized (model: {}, endpoint: {})",
            config.embedding.model, config.embedding.base_url
        );
    } else {
        info!("Embeddings disabled; ranking will run in lexical mode");
    }

    // Load skill vocabulary (bundled baseline unless overridden)
    let vocabulary = match &config.skill_vocabulary_path {
        Some(path) => SkillVocabulary::load(path)?,
        None => SkillVocabulary::default(),
    };
    info!("Skill vocabulary loaded: {} terms", vocabulary.len());

    // Build app state
    let state = AppState {
        ranker: JobRanker::new(embedder, Arc::new(vocabulary)),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict CORS origins once the web client's domain is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
