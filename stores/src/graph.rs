//! Graph store adapter.
//!
//! Traversal/pattern queries over an entity-relationship store. Each hit
//! carries the matched entity plus its connected neighbours with
//! relation-type labels, which downstream context enrichment consumes.
//! Raw scores are source-defined (e.g. a precomputed centrality score)
//! and are min-max normalized by the fusion layer, not here.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::types::{CandidateResult, Neighbour, Payload, SourceKind};

/// Read-only handle to an entity-relationship graph store.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Find entities matching `query` within `domain`.
    ///
    /// An empty match set is a valid result, not an error.
    async fn search(&self, query: &str, domain: &str, top_k: usize)
    -> Result<Vec<CandidateResult>>;

    /// Cheap reachability probe, used by the health endpoint.
    async fn ping(&self) -> Result<()>;
}

/// HTTP client for a graph store exposing a JSON search API.
pub struct HttpGraphStore {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpGraphStore {
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
impl GraphStore for HttpGraphStore {
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
            .map_err(|e| StoreError::GraphUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(StoreError::GraphUnavailable(format!(
                "search returned status {}",
                response.status()
            )));
        }

        let parsed: GraphSearchResponse =
            response
                .json()
                .await
                .map_err(|e| StoreError::InvalidResponse {
                    kind: SourceKind::Graph,
                    message: e.to_string(),
                })?;

        let candidates: Vec<CandidateResult> = parsed
            .entities
            .into_iter()
            .map(|entity| {
                CandidateResult::new(
                    entity.id,
                    SourceKind::Graph,
                    entity.score,
                    Payload::Entity {
                        name: entity.name,
                        description: entity.description.unwrap_or_default(),
                        neighbours: entity.neighbours,
                    },
                )
            })
            .collect();

        debug!("graph search returned {} candidates", candidates.len());
        Ok(candidates)
    }

    async fn ping(&self) -> Result<()> {
        let response = self
            .client
            .get(format!("{}/health", self.endpoint))
            .send()
            .await
            .map_err(|e| StoreError::GraphUnavailable(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(StoreError::GraphUnavailable(format!(
                "health returned status {}",
                response.status()
            )))
        }
    }
}

/// Wire format of the graph store search response.
#[derive(Debug, Deserialize)]
struct GraphSearchResponse {
    entities: Vec<GraphEntity>,
}

#[derive(Debug, Deserialize)]
struct GraphEntity {
    id: String,
    name: String,
    score: f32,
    description: Option<String>,
    #[serde(default)]
    neighbours: Vec<Neighbour>,
}
