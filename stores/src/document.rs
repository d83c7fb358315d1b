//! Document store adapter.
//!
//! Full-text/keyword search over a document collection. Raw scores are
//! BM25-style text-relevance numbers on an open-ended scale; the fusion
//! layer min-max normalizes them per batch.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::types::{CandidateResult, Payload, SourceKind};

/// Read-only handle to a full-text document store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Find documents matching `query` within `domain`.
    async fn search(&self, query: &str, domain: &str, top_k: usize)
    -> Result<Vec<CandidateResult>>;

    /// Cheap reachability probe, used by the health endpoint.
    async fn ping(&self) -> Result<()>;
}

/// HTTP client for a document store exposing a JSON search API.
pub struct HttpDocumentStore {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpDocumentStore {
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
impl DocumentStore for HttpDocumentStore {
    async fn search(
        &self,
        query: &str,
        domain: &str,
        top_k: usize,
    ) -> Result<Vec<CandidateResult>> {
        let body = serde_json::json!({
            "query": query,
            "domain": domain,
            "limit": top_k.max(1),
        });

        let response = self
            .client
            .post(format!("{}/search", self.endpoint))
            .json(&body)
            .send()
            .await
            .map_err(|e| StoreError::DocumentStoreUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(StoreError::DocumentStoreUnavailable(format!(
                "search returned status {}",
                response.status()
            )));
        }

        let parsed: DocumentSearchResponse =
            response
                .json()
                .await
                .map_err(|e| StoreError::InvalidResponse {
                    kind: SourceKind::Document,
                    message: e.to_string(),
                })?;

        let candidates: Vec<CandidateResult> = parsed
            .documents
            .into_iter()
            .map(|doc| {
                CandidateResult::new(
                    doc.id,
                    SourceKind::Document,
                    doc.score,
                    Payload::Document {
                        title: doc.title.unwrap_or_default(),
                        body: doc.body.unwrap_or_default(),
                    },
                )
            })
            .collect();

        debug!("document search returned {} candidates", candidates.len());
        Ok(candidates)
    }

    async fn ping(&self) -> Result<()> {
        let response = self
            .client
            .get(format!("{}/health", self.endpoint))
            .send()
            .await
            .map_err(|e| StoreError::DocumentStoreUnavailable(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(StoreError::DocumentStoreUnavailable(format!(
                "health returned status {}",
                response.status()
            )))
        }
    }
}

/// Wire format of the document store search response.
#[derive(Debug, Deserialize)]
struct DocumentSearchResponse {
    documents: Vec<DocumentHit>,
}

#[derive(Debug, Deserialize)]
struct DocumentHit {
    id: String,
    score: f32,
    title: Option<String>,
    body: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_search_parses_documents() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "documents": [
                    {"id": "doc-1", "score": 7.3, "title": "Deploy guide", "body": "step one"},
                    {"id": "doc-2", "score": 4.1, "title": "Runbook"}
                ]
            })))
            .mount(&server)
            .await;

        let store = HttpDocumentStore::new(server.uri());
        let results = store.search("deploy", "ops", 5).await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, "doc-1");
        assert_eq!(results[0].source_kind, SourceKind::Document);
        assert_eq!(results[1].payload.display_text(), "Runbook");
    }

    #[tokio::test]
    async fn test_malformed_body_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let store = HttpDocumentStore::new(server.uri());
        let err = store.search("deploy", "ops", 5).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidResponse { .. }));
    }

    #[tokio::test]
    async fn test_connection_failure_is_document_store_unavailable() {
        let store = HttpDocumentStore::new("http://127.0.0.1:9");
        let err = store.search("deploy", "ops", 5).await.unwrap_err();
        assert!(matches!(err, StoreError::DocumentStoreUnavailable(_)));
    }
}
