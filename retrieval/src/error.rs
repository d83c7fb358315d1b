//! Error types for the hybrid retrieval engine.

use thiserror::Error;

use trident_embeddings::EmbeddingError;
use trident_stores::{SourceKind, StoreError};

/// Result type alias for retrieval operations.
pub type Result<T> = std::result::Result<T, RetrievalError>;

/// Errors surfaced to callers of the retrieval engine.
///
/// A single failing source is not an error at this level: the engine
/// substitutes an empty list and records the outage in logs. Only input
/// validation and the loss of all three sources reach the caller.
#[derive(Error, Debug)]
pub enum RetrievalError {
    /// The query is malformed: empty text, non-positive `top_k`, or
    /// fusion weights that do not sum to 1.0.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// All three sources failed for the same query.
    #[error("all retrieval sources failed: {vector}; {graph}; {document}")]
    RetrievalFailed {
        vector: SourceFailure,
        graph: SourceFailure,
        document: SourceFailure,
    },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// One source's failure, kept for diagnostics when a query degrades
/// or fails entirely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFailure {
    /// Which source failed.
    pub kind: SourceKind,

    /// Underlying cause.
    pub message: String,
}

impl SourceFailure {
    /// Create a failure record for `kind`.
    pub fn new(kind: SourceKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Failure caused by the per-source timeout expiring.
    pub fn timeout(kind: SourceKind, timeout: std::time::Duration) -> Self {
        Self::new(kind, format!("timed out after {}ms", timeout.as_millis()))
    }
}

impl std::fmt::Display for SourceFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl From<StoreError> for SourceFailure {
    fn from(err: StoreError) -> Self {
        let kind = match &err {
            StoreError::IndexUnavailable(_) => SourceKind::Vector,
            StoreError::GraphUnavailable(_) => SourceKind::Graph,
            StoreError::DocumentStoreUnavailable(_) => SourceKind::Document,
            StoreError::InvalidResponse { kind, .. } => *kind,
        };
        Self::new(kind, err.to_string())
    }
}

impl From<EmbeddingError> for SourceFailure {
    fn from(err: EmbeddingError) -> Self {
        // An embedding failure is fatal for the vector branch only.
        Self::new(SourceKind::Vector, err.to_string())
    }
}
