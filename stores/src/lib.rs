//! # Stores
//!
//! This crate provides read-only client adapters for the three external
//! retrieval backends:
//!
//! - **Vector store**: nearest-neighbour lookup over pre-computed embeddings
//! - **Graph store**: traversal/pattern queries over an entity-relationship store
//! - **Document store**: full-text/keyword search over a document collection
//!
//! Each backend is modelled as an async trait (`VectorStore`, `GraphStore`,
//! `DocumentStore`) so the retrieval engine can be driven by pooled HTTP
//! clients in production and by in-memory mocks in tests. All three return
//! the same [`CandidateResult`] shape, tagged with a [`SourceKind`] so the
//! fusion layer can apply per-source weights.
//!
//! The adapters never write: every call is a read fan-out against an
//! externally owned service.

pub mod document;
pub mod error;
pub mod graph;
pub mod types;
pub mod vector;

pub use document::{DocumentStore, HttpDocumentStore};
pub use error::{Result, StoreError};
pub use graph::{GraphStore, HttpGraphStore};
pub use types::{CandidateResult, Neighbour, Payload, SourceKind};
pub use vector::{HttpVectorStore, VectorStore};
