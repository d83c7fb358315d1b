//! Router, handlers, and error mapping for the retrieval API.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::error;

use trident_retrieval::{
    FusedResult, HybridRetrieval, KnowledgeFusion, Query, RetrievalError,
};

/// Shared state handed to every handler.
pub struct AppState {
    /// The hybrid retrieval engine.
    pub engine: HybridRetrieval,

    /// Fusion engine configured with the deployment's weights.
    pub fusion: KnowledgeFusion,
}

/// Build the API router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/query", post(query))
        .route("/health", get(health))
        .with_state(state)
}

/// Body of `POST /query`.
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    /// Free-text query.
    pub query: String,

    /// Domain/scope tag.
    pub domain: String,

    /// Maximum number of fused results. Signed so a negative value maps
    /// to a 400 instead of a deserialization failure.
    pub top_k: i64,
}

/// Response of `POST /query`.
#[derive(Debug, Serialize)]
pub struct QueryResponse {
    /// Fused ranking, best first.
    pub results: Vec<FusedResult>,

    /// Raw candidate counts per source, for outage monitoring.
    pub source_counts: SourceCounts,
}

/// How many raw candidates each source produced for this query.
#[derive(Debug, Serialize)]
pub struct SourceCounts {
    pub vector: usize,
    pub graph: usize,
    pub document: usize,
}

/// `POST /query` handler.
pub async fn query(
    State(state): State<Arc<AppState>>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, ApiError> {
    if request.top_k < 1 {
        return Err(ApiError(RetrievalError::InvalidQuery(format!(
            "top_k must be >= 1, got {}",
            request.top_k
        ))));
    }

    let query = Query::new(request.query, request.domain, request.top_k as usize);

    let raw = state.engine.hybrid_search(&query).await?;
    let source_counts = SourceCounts {
        vector: raw.vector.len(),
        graph: raw.graph.len(),
        document: raw.document.len(),
    };

    let results = state.fusion.fuse(&raw, query.top_k)?;

    Ok(Json(QueryResponse {
        results,
        source_counts,
    }))
}

/// `GET /health` handler. 200 while at least one store is reachable.
pub async fn health(State(state): State<Arc<AppState>>) -> Response {
    let status = state.engine.health().await;
    let code = if status.any_reachable() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(status)).into_response()
}

/// Error wrapper mapping core errors onto HTTP statuses.
#[derive(Debug)]
pub struct ApiError(pub RetrievalError);

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            RetrievalError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            RetrievalError::RetrievalFailed { .. } => StatusCode::SERVICE_UNAVAILABLE,
            RetrievalError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RetrievalError> for ApiError {
    fn from(err: RetrievalError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("query failed: {}", self.0);
        }
        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use trident_embeddings::HashingProvider;
    use trident_retrieval::FusionWeights;
    use trident_stores::{
        CandidateResult, DocumentStore, GraphStore, Payload, SourceKind, StoreError, VectorStore,
    };

    struct UpVector;

    #[async_trait]
    impl VectorStore for UpVector {
        async fn search(
            &self,
            _query_vector: &[f32],
            _top_k: usize,
        ) -> trident_stores::Result<Vec<CandidateResult>> {
            Ok(vec![CandidateResult::new(
                "a",
                SourceKind::Vector,
                0.9,
                Payload::Snippet {
                    text: "gateway config".to_string(),
                },
            )])
        }

        async fn ping(&self) -> trident_stores::Result<()> {
            Ok(())
        }
    }

    struct DownVector;

    #[async_trait]
    impl VectorStore for DownVector {
        async fn search(
            &self,
            _query_vector: &[f32],
            _top_k: usize,
        ) -> trident_stores::Result<Vec<CandidateResult>> {
            Err(StoreError::IndexUnavailable("down".to_string()))
        }

        async fn ping(&self) -> trident_stores::Result<()> {
            Err(StoreError::IndexUnavailable("down".to_string()))
        }
    }

    struct DownGraph;

    #[async_trait]
    impl GraphStore for DownGraph {
        async fn search(
            &self,
            _query: &str,
            _domain: &str,
            _top_k: usize,
        ) -> trident_stores::Result<Vec<CandidateResult>> {
            Err(StoreError::GraphUnavailable("down".to_string()))
        }

        async fn ping(&self) -> trident_stores::Result<()> {
            Err(StoreError::GraphUnavailable("down".to_string()))
        }
    }

    struct DownDocument;

    #[async_trait]
    impl DocumentStore for DownDocument {
        async fn search(
            &self,
            _query: &str,
            _domain: &str,
            _top_k: usize,
        ) -> trident_stores::Result<Vec<CandidateResult>> {
            Err(StoreError::DocumentStoreUnavailable("down".to_string()))
        }

        async fn ping(&self) -> trident_stores::Result<()> {
            Err(StoreError::DocumentStoreUnavailable("down".to_string()))
        }
    }

    fn state(vector_up: bool) -> Arc<AppState> {
        let vector: Arc<dyn VectorStore> = if vector_up {
            Arc::new(UpVector)
        } else {
            Arc::new(DownVector)
        };

        let engine = HybridRetrieval::builder()
            .with_embedder(Arc::new(HashingProvider::new(8)))
            .with_vector_store(vector)
            .with_graph_store(Arc::new(DownGraph))
            .with_document_store(Arc::new(DownDocument))
            .build()
            .unwrap();

        Arc::new(AppState {
            engine,
            fusion: KnowledgeFusion::new(FusionWeights::default()),
        })
    }

    #[tokio::test]
    async fn test_query_returns_fused_results_and_counts() {
        let response = query(
            State(state(true)),
            Json(QueryRequest {
                query: "gateway".to_string(),
                domain: "ops".to_string(),
                top_k: 5,
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.0.results.len(), 1);
        assert_eq!(response.0.results[0].id, "a");
        assert_eq!(response.0.source_counts.vector, 1);
        assert_eq!(response.0.source_counts.graph, 0);
        assert_eq!(response.0.source_counts.document, 0);
    }

    #[tokio::test]
    async fn test_non_positive_top_k_is_bad_request() {
        let err = query(
            State(state(true)),
            Json(QueryRequest {
                query: "gateway".to_string(),
                domain: "ops".to_string(),
                top_k: 0,
            }),
        )
        .await
        .unwrap_err();

        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_empty_query_is_bad_request() {
        let err = query(
            State(state(true)),
            Json(QueryRequest {
                query: "  ".to_string(),
                domain: "ops".to_string(),
                top_k: 5,
            }),
        )
        .await
        .unwrap_err();

        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_total_outage_is_service_unavailable() {
        let err = query(
            State(state(false)),
            Json(QueryRequest {
                query: "gateway".to_string(),
                domain: "ops".to_string(),
                top_k: 5,
            }),
        )
        .await
        .unwrap_err();

        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_health_degrades_to_service_unavailable() {
        let up = health(State(state(true))).await;
        assert_eq!(up.status(), StatusCode::OK);

        let down = health(State(state(false))).await;
        assert_eq!(down.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
