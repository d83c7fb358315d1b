//! Embedding cache to avoid redundant API calls.

use std::collections::HashMap;

use sha2::{Digest, Sha256};
use tokio::sync::RwLock;
use tracing::debug;

use crate::Embedding;

/// Bounded in-memory cache of embeddings, keyed by a hash of the text.
///
/// Repeated queries are common at the retrieval boundary, so a small
/// cache in front of the provider removes most embedding round-trips.
/// Eviction is whole-cache on overflow; entries are cheap to recompute.
pub struct EmbeddingCache {
    entries: RwLock<HashMap<String, Embedding>>,
    max_entries: usize,
}

impl EmbeddingCache {
    /// Create a cache holding at most `max_entries` embeddings.
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_entries,
        }
    }

    fn hash_key(text: &str) -> String {
        let digest = Sha256::digest(text.as_bytes());
        format!("{digest:x}")
    }

    /// Look up a cached embedding for `text`.
    pub async fn get(&self, text: &str) -> Option<Embedding> {
        let key = Self::hash_key(text);
        self.entries.read().await.get(&key).cloned()
    }

    /// Store an embedding for `text`.
    pub async fn put(&self, text: &str, embedding: Embedding) {
        let key = Self::hash_key(text);
        let mut entries = self.entries.write().await;

        if entries.len() >= self.max_entries && !entries.contains_key(&key) {
            debug!("embedding cache full ({} entries), clearing", entries.len());
            entries.clear();
        }

        entries.insert(key, embedding);
    }

    /// Number of cached embeddings.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the cache is empty.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_cache_round_trip() {
        let cache = EmbeddingCache::new(10);
        assert!(cache.get("query").await.is_none());

        cache.put("query", vec![1.0, 2.0]).await;
        assert_eq!(cache.get("query").await, Some(vec![1.0, 2.0]));
    }

    #[tokio::test]
    async fn test_cache_clears_on_overflow() {
        let cache = EmbeddingCache::new(2);
        cache.put("a", vec![1.0]).await;
        cache.put("b", vec![2.0]).await;
        cache.put("c", vec![3.0]).await;

        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.get("c").await, Some(vec![3.0]));
    }
}
