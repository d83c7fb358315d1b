//! Error types for the embeddings crate.

use thiserror::Error;

/// Result type alias for embedding operations.
pub type Result<T> = std::result::Result<T, EmbeddingError>;

/// Errors that can occur while generating embeddings.
#[derive(Error, Debug)]
pub enum EmbeddingError {
    /// The embedding model/service cannot be reached.
    #[error("embedding provider unavailable: {0}")]
    Unavailable(String),

    /// Provider is missing required configuration (API key, endpoint).
    #[error("embedding provider not configured: {0}")]
    NotConfigured(String),

    /// The provider answered, but not in the shape we expect.
    #[error("invalid embedding response: {0}")]
    InvalidResponse(String),

    /// The provider returned a vector of the wrong length.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}
