//! Error types for the store adapters.

use thiserror::Error;

use crate::types::SourceKind;

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur when querying the external stores.
///
/// The `*Unavailable` variants cover both hard connectivity failures and
/// per-source timeouts; the retrieval engine recovers from either by
/// substituting an empty candidate list for that source.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Vector index could not be queried.
    #[error("vector index unavailable: {0}")]
    IndexUnavailable(String),

    /// Graph store could not be queried.
    #[error("graph store unavailable: {0}")]
    GraphUnavailable(String),

    /// Document store could not be queried.
    #[error("document store unavailable: {0}")]
    DocumentStoreUnavailable(String),

    /// The store answered, but not in the shape we expect.
    #[error("invalid response from {kind} store: {message}")]
    InvalidResponse { kind: SourceKind, message: String },
}

impl StoreError {
    /// Build the unavailable variant matching `kind`.
    pub fn unavailable(kind: SourceKind, message: impl Into<String>) -> Self {
        let message = message.into();
        match kind {
            SourceKind::Vector => StoreError::IndexUnavailable(message),
            SourceKind::Graph => StoreError::GraphUnavailable(message),
            SourceKind::Document => StoreError::DocumentStoreUnavailable(message),
        }
    }

    /// Whether this error is a recoverable source outage.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            StoreError::IndexUnavailable(_)
                | StoreError::GraphUnavailable(_)
                | StoreError::DocumentStoreUnavailable(_)
        )
    }
}
