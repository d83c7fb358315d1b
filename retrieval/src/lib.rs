//! # Retrieval Engine
//!
//! This crate provides the hybrid retrieval and knowledge fusion core:
//!
//! - **Hybrid Retrieval**: fan-out/fan-in over three external stores
//! - **Knowledge Fusion**: weighted merging of the three result sets
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Hybrid Retrieval Engine                      │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                  │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐          │
//! │  │    Vector    │  │    Graph     │  │   Document   │          │
//! │  │    Store     │  │    Store     │  │    Store     │          │
//! │  └──────────────┘  └──────────────┘  └──────────────┘          │
//! │         │                │                  │                   │
//! │         └────────────────┼──────────────────┘                   │
//! │                          ▼                                      │
//! │                  ┌──────────────┐                               │
//! │                  │  Knowledge   │                               │
//! │                  │    Fusion    │                               │
//! │                  └──────────────┘                               │
//! │                          │                                      │
//! │                          ▼                                      │
//! │                   ranked FusedResult list                       │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The three sub-searches run concurrently; a failing source degrades to
//! an empty list rather than failing the query, unless all three fail.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use trident_retrieval::{HybridRetrieval, KnowledgeFusion, Query};
//!
//! let engine = HybridRetrieval::builder()
//!     .with_embedder(embedder)
//!     .with_vector_store(vector)
//!     .with_graph_store(graph)
//!     .with_document_store(document)
//!     .build()?;
//!
//! let query = Query::new("how do I deploy the gateway?", "ops", 10);
//! let results = engine.hybrid_search(&query).await?;
//! let fused = KnowledgeFusion::default().fuse(&results, query.top_k)?;
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod fusion;
pub mod query;

pub use config::{FusionWeights, RetrievalConfig};
pub use engine::{HealthStatus, HybridRetrieval, SourceResults};
pub use error::{Result, RetrievalError, SourceFailure};
pub use fusion::{FusedResult, KnowledgeFusion, MergeKeyMode};
pub use query::Query;

// Re-export from dependencies for convenience
pub use trident_stores::{CandidateResult, Payload, SourceKind};
