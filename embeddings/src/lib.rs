//! # Embeddings
//!
//! Embedding generation for the hybrid retrieval engine. The vector
//! search branch needs query text turned into a fixed-dimension dense
//! vector before it can hit the external vector index; this crate owns
//! that step.
//!
//! - **`EmbeddingProvider`**: async trait over embedding backends
//! - **`OpenAiCompatProvider`**: HTTP client for OpenAI-compatible APIs
//! - **`HashingProvider`**: deterministic offline provider for tests
//! - **`EmbeddingCache`**: bounded in-memory cache keyed by text hash
//!
//! A provider failure is fatal for the vector branch only; the retrieval
//! engine degrades to graph + document results rather than failing the
//! whole query.

pub mod cache;
pub mod error;
pub mod provider;

pub use cache::EmbeddingCache;
pub use error::{EmbeddingError, Result};
pub use provider::{EmbeddingProvider, HashingProvider, OpenAiCompatProvider};

/// A dense vector embedding.
pub type Embedding = Vec<f32>;
