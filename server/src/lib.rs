//! # Server
//!
//! Thin HTTP boundary over the hybrid retrieval core:
//!
//! - `POST /query` — run a hybrid search and fuse the results
//! - `GET /health` — 200 while at least one store is reachable
//!
//! The server owns no state of its own; everything between requests
//! lives in the externally managed stores.

pub mod app;

pub use app::{AppState, build_router};
