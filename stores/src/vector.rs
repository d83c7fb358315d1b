//! Vector store adapter.
//!
//! Nearest-neighbour lookup over pre-computed embeddings. The adapter
//! normalizes whatever the index returns into similarities in `[0, 1]`:
//! indexes that report a distance are converted via `1 / (1 + distance)`.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::types::{CandidateResult, Payload, SourceKind};

/// Read-only handle to a vector similarity index.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Find the nearest neighbours of `query_vector`.
    ///
    /// Returns candidates ordered by descending similarity. Implementations
    /// request `2 * top_k` hits internally so fusion-time deduplication
    /// still leaves enough distinct results.
    async fn search(&self, query_vector: &[f32], top_k: usize) -> Result<Vec<CandidateResult>>;

    /// Cheap reachability probe, used by the health endpoint.
    async fn ping(&self) -> Result<()>;
}

/// HTTP client for a vector index exposing a JSON search API.
pub struct HttpVectorStore {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpVectorStore {
    /// Create a client against the given base endpoint.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Use a pre-built (pooled) HTTP client.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }
}

#[async_trait]
impl VectorStore for HttpVectorStore {
    async fn search(&self, query_vector: &[f32], top_k: usize) -> Result<Vec<CandidateResult>> {
        // Over-fetch so fusion-time dedup does not starve the final list.
        let limit = top_k.saturating_mul(2).max(1);

        let body = serde_json::json!({
            "vector": query_vector,
            "limit": limit,
        });

        let response = self
            .client
            .post(format!("{}/search", self.endpoint))
            .json(&body)
            .send()
            .await
            .map_err(|e| StoreError::IndexUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(StoreError::IndexUnavailable(format!(
                "search returned status {}",
                response.status()
            )));
        }

        let parsed: VectorSearchResponse =
            response
                .json()
                .await
                .map_err(|e| StoreError::InvalidResponse {
                    kind: SourceKind::Vector,
                    message: e.to_string(),
                })?;

        let candidates: Vec<CandidateResult> = parsed
            .hits
            .into_iter()
            .map(|hit| {
                let similarity = hit.similarity();
                CandidateResult::new(
                    hit.id,
                    SourceKind::Vector,
                    similarity,
                    Payload::Snippet {
                        text: hit.text.unwrap_or_default(),
                    },
                )
            })
            .collect();

        debug!("vector search returned {} candidates", candidates.len());
        Ok(candidates)
    }

    async fn ping(&self) -> Result<()> {
        let response = self
            .client
            .get(format!("{}/health", self.endpoint))
            .send()
            .await
            .map_err(|e| StoreError::IndexUnavailable(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(StoreError::IndexUnavailable(format!(
                "health returned status {}",
                response.status()
            )))
        }
    }
}

/// Wire format of the vector index search response.
#[derive(Debug, Deserialize)]
struct VectorSearchResponse {
    hits: Vec<VectorHit>,
}

#[derive(Debug, Deserialize)]
struct VectorHit {
    id: String,

    /// Similarity in `[0, 1]`, when the index reports one directly.
    score: Option<f32>,

    /// Distance, when the index reports that instead.
    distance: Option<f32>,

    text: Option<String>,
}

impl VectorHit {
    /// Similarity in `[0, 1]` regardless of what the index reported.
    fn similarity(&self) -> f32 {
        match (self.score, self.distance) {
            (Some(score), _) => score.clamp(0.0, 1.0),
            (None, Some(distance)) => 1.0 / (1.0 + distance.max(0.0)),
            (None, None) => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_distance_conversion() {
        let hit = VectorHit {
            id: "x".to_string(),
            score: None,
            distance: Some(1.0),
            text: None,
        };
        assert!((hit.similarity() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_score_clamped_into_unit_range() {
        let hit = VectorHit {
            id: "x".to_string(),
            score: Some(1.3),
            distance: None,
            text: None,
        };
        assert_eq!(hit.similarity(), 1.0);
    }

    #[tokio::test]
    async fn test_search_over_fetches_double_top_k() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .and(body_partial_json(serde_json::json!({"limit": 10})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "hits": [
                    {"id": "a", "score": 0.9, "text": "alpha"},
                    {"id": "b", "distance": 1.0, "text": "beta"}
                ]
            })))
            .mount(&server)
            .await;

        let store = HttpVectorStore::new(server.uri());
        let results = store.search(&[0.1, 0.2], 5).await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, "a");
        assert_eq!(results[0].source_kind, SourceKind::Vector);
        assert!((results[0].raw_score - 0.9).abs() < 1e-6);
        assert!((results[1].raw_score - 0.5).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_search_connection_failure_is_index_unavailable() {
        // Nothing is listening on this port.
        let store = HttpVectorStore::new("http://127.0.0.1:9");
        let err = store.search(&[0.1], 3).await.unwrap_err();
        assert!(matches!(err, StoreError::IndexUnavailable(_)));
    }

    #[tokio::test]
    async fn test_ping_maps_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let store = HttpVectorStore::new(server.uri());
        assert!(store.ping().await.is_err());
    }
}
