//! Hybrid retrieval engine implementation.
//!
//! Dispatches the vector, graph, and document sub-searches concurrently
//! and collects their raw result sets. Each branch is independently
//! fallible: a source outage (or per-source timeout) degrades that branch
//! to an empty list, and the query only fails when all three branches do.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use trident_embeddings::{Embedding, EmbeddingCache, EmbeddingProvider};
use trident_stores::{
    CandidateResult, DocumentStore, GraphStore, HttpDocumentStore, HttpGraphStore,
    HttpVectorStore, SourceKind, VectorStore,
};

use crate::config::{DEFAULT_TIMEOUT_MS, RetrievalConfig};
use crate::error::{Result, RetrievalError, SourceFailure};
use crate::query::Query;

/// Raw result sets from the three sources, before fusion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceResults {
    /// Candidates from the vector index.
    pub vector: Vec<CandidateResult>,

    /// Candidates from the graph store.
    pub graph: Vec<CandidateResult>,

    /// Candidates from the document store.
    pub document: Vec<CandidateResult>,
}

impl SourceResults {
    /// Number of candidates produced by `kind`.
    pub fn count(&self, kind: SourceKind) -> usize {
        match kind {
            SourceKind::Vector => self.vector.len(),
            SourceKind::Graph => self.graph.len(),
            SourceKind::Document => self.document.len(),
        }
    }

    /// Whether every source came back empty.
    pub fn is_empty(&self) -> bool {
        self.vector.is_empty() && self.graph.is_empty() && self.document.is_empty()
    }
}

/// Per-source reachability, backing the health endpoint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HealthStatus {
    /// Vector index reachable.
    pub vector: bool,

    /// Graph store reachable.
    pub graph: bool,

    /// Document store reachable.
    pub document: bool,
}

impl HealthStatus {
    /// True when at least one store can serve queries.
    pub fn any_reachable(self) -> bool {
        self.vector || self.graph || self.document
    }
}

/// The hybrid retrieval engine.
///
/// Holds read-only client handles to the three external stores and the
/// embedding provider. The engine performs no writes and keeps no
/// cross-request state beyond the embedding cache, so concurrent queries
/// need no locking.
pub struct HybridRetrieval {
    embedder: Arc<dyn EmbeddingProvider>,
    vector: Arc<dyn VectorStore>,
    graph: Arc<dyn GraphStore>,
    document: Arc<dyn DocumentStore>,
    embed_cache: EmbeddingCache,
    per_source_timeout: Duration,
}

impl std::fmt::Debug for HybridRetrieval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HybridRetrieval")
            .field("per_source_timeout", &self.per_source_timeout)
            .finish_non_exhaustive()
    }
}

impl HybridRetrieval {
    /// Create a new engine builder.
    pub fn builder() -> HybridRetrievalBuilder {
        HybridRetrievalBuilder::new()
    }

    /// Build an engine from endpoint configuration, wiring HTTP store
    /// clients over one shared connection pool.
    pub fn from_config(config: &RetrievalConfig, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        let client = reqwest::Client::new();
        Self {
            embedder,
            vector: Arc::new(
                HttpVectorStore::new(&config.vector_endpoint).with_client(client.clone()),
            ),
            graph: Arc::new(
                HttpGraphStore::new(&config.graph_endpoint).with_client(client.clone()),
            ),
            document: Arc::new(
                HttpDocumentStore::new(&config.document_endpoint).with_client(client),
            ),
            embed_cache: EmbeddingCache::new(1024),
            per_source_timeout: config.per_source_timeout,
        }
    }

    /// Dispatch the three sub-searches concurrently and return their raw
    /// result sets.
    ///
    /// A source that raises or times out is logged and substituted with an
    /// empty list. Only when all three fail does the call return
    /// [`RetrievalError::RetrievalFailed`] with the three causes attached.
    pub async fn hybrid_search(&self, query: &Query) -> Result<SourceResults> {
        query.validate()?;

        debug!("hybrid search: {:?} (domain: {})", query.text, query.domain);

        let (vector, graph, document) = tokio::join!(
            self.vector_branch(query),
            self.graph_branch(query),
            self.document_branch(query),
        );

        if let (Err(v), Err(g), Err(d)) = (&vector, &graph, &document) {
            return Err(RetrievalError::RetrievalFailed {
                vector: v.clone(),
                graph: g.clone(),
                document: d.clone(),
            });
        }

        let results = SourceResults {
            vector: settle(vector),
            graph: settle(graph),
            document: settle(document),
        };

        info!(
            vector = results.vector.len(),
            graph = results.graph.len(),
            document = results.document.len(),
            "hybrid search settled"
        );

        Ok(results)
    }

    /// Probe all three stores, bounded by the per-source timeout.
    pub async fn health(&self) -> HealthStatus {
        let timeout = self.per_source_timeout;
        let (vector, graph, document) = tokio::join!(
            tokio::time::timeout(timeout, self.vector.ping()),
            tokio::time::timeout(timeout, self.graph.ping()),
            tokio::time::timeout(timeout, self.document.ping()),
        );

        HealthStatus {
            vector: matches!(vector, Ok(Ok(()))),
            graph: matches!(graph, Ok(Ok(()))),
            document: matches!(document, Ok(Ok(()))),
        }
    }

    async fn embed(&self, text: &str) -> std::result::Result<Embedding, SourceFailure> {
        if let Some(cached) = self.embed_cache.get(text).await {
            debug!("embedding cache hit");
            return Ok(cached);
        }

        let embedding = self.embedder.embed(text).await?;
        self.embed_cache.put(text, embedding.clone()).await;
        Ok(embedding)
    }

    async fn vector_branch(
        &self,
        query: &Query,
    ) -> std::result::Result<Vec<CandidateResult>, SourceFailure> {
        let run = async {
            let embedding = self.embed(&query.text).await?;
            self.vector
                .search(&embedding, query.top_k)
                .await
                .map_err(SourceFailure::from)
        };

        match tokio::time::timeout(self.per_source_timeout, run).await {
            Ok(result) => result,
            Err(_) => Err(SourceFailure::timeout(
                SourceKind::Vector,
                self.per_source_timeout,
            )),
        }
    }

    async fn graph_branch(
        &self,
        query: &Query,
    ) -> std::result::Result<Vec<CandidateResult>, SourceFailure> {
        let run = self.graph.search(&query.text, &query.domain, query.top_k);

        match tokio::time::timeout(self.per_source_timeout, run).await {
            Ok(result) => result.map_err(SourceFailure::from),
            Err(_) => Err(SourceFailure::timeout(
                SourceKind::Graph,
                self.per_source_timeout,
            )),
        }
    }

    async fn document_branch(
        &self,
        query: &Query,
    ) -> std::result::Result<Vec<CandidateResult>, SourceFailure> {
        let run = self
            .document
            .search(&query.text, &query.domain, query.top_k);

        match tokio::time::timeout(self.per_source_timeout, run).await {
            Ok(result) => result.map_err(SourceFailure::from),
            Err(_) => Err(SourceFailure::timeout(
                SourceKind::Document,
                self.per_source_timeout,
            )),
        }
    }
}

/// Collapse a branch outcome into a (possibly empty) candidate list,
/// logging the outage when the branch failed.
fn settle(
    branch: std::result::Result<Vec<CandidateResult>, SourceFailure>,
) -> Vec<CandidateResult> {
    match branch {
        Ok(candidates) => candidates,
        Err(failure) => {
            warn!("source degraded, substituting empty results: {failure}");
            Vec::new()
        }
    }
}

/// Builder for the hybrid retrieval engine.
pub struct HybridRetrievalBuilder {
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    vector: Option<Arc<dyn VectorStore>>,
    graph: Option<Arc<dyn GraphStore>>,
    document: Option<Arc<dyn DocumentStore>>,
    cache_entries: usize,
    per_source_timeout: Duration,
}

impl HybridRetrievalBuilder {
    /// Create a new builder with default timeout and cache size.
    pub fn new() -> Self {
        Self {
            embedder: None,
            vector: None,
            graph: None,
            document: None,
            cache_entries: 1024,
            per_source_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }

    /// Set the embedding provider.
    pub fn with_embedder(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Set the vector store handle.
    pub fn with_vector_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.vector = Some(store);
        self
    }

    /// Set the graph store handle.
    pub fn with_graph_store(mut self, store: Arc<dyn GraphStore>) -> Self {
        self.graph = Some(store);
        self
    }

    /// Set the document store handle.
    pub fn with_document_store(mut self, store: Arc<dyn DocumentStore>) -> Self {
        self.document = Some(store);
        self
    }

    /// Set the per-source timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.per_source_timeout = timeout;
        self
    }

    /// Set the embedding cache capacity.
    pub fn with_cache_entries(mut self, entries: usize) -> Self {
        self.cache_entries = entries;
        self
    }

    /// Build the engine. Fails when a component is missing.
    pub fn build(self) -> Result<HybridRetrieval> {
        Ok(HybridRetrieval {
            embedder: self
                .embedder
                .ok_or_else(|| RetrievalError::Config("embedder is required".to_string()))?,
            vector: self
                .vector
                .ok_or_else(|| RetrievalError::Config("vector store is required".to_string()))?,
            graph: self
                .graph
                .ok_or_else(|| RetrievalError::Config("graph store is required".to_string()))?,
            document: self
                .document
                .ok_or_else(|| RetrievalError::Config("document store is required".to_string()))?,
            embed_cache: EmbeddingCache::new(self.cache_entries),
            per_source_timeout: self.per_source_timeout,
        })
    }
}

impl Default for HybridRetrievalBuilder {
    fn default() -> Self {
        Self::new()
    }
}
