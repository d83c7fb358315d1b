//! Binary entrypoint for the retrieval server.

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use trident_embeddings::OpenAiCompatProvider;
use trident_retrieval::{HybridRetrieval, KnowledgeFusion, RetrievalConfig};
use trident_server::{AppState, build_router};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = RetrievalConfig::from_env()?;

    let embedding_endpoint = std::env::var("EMBEDDING_ENDPOINT")
        .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());
    let embedding_model = std::env::var("EMBEDDING_MODEL")
        .unwrap_or_else(|_| "text-embedding-3-small".to_string());
    let embedding_dimension = std::env::var("EMBEDDING_DIMENSION")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(1536);

    let embedder = Arc::new(OpenAiCompatProvider::new(
        embedding_endpoint,
        embedding_model,
        embedding_dimension,
    ));

    let engine = HybridRetrieval::from_config(&config, embedder);
    let fusion = KnowledgeFusion::new(config.weights);
    let state = Arc::new(AppState { engine, fusion });

    let bind = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let listener = tokio::net::TcpListener::bind(&bind).await?;
    info!("retrieval server listening on {bind}");

    axum::serve(listener, build_router(state)).await?;
    Ok(())
}
