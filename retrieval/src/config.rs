//! Configuration for the hybrid retrieval engine.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RetrievalError};

/// Tolerance for the fusion-weight sum check.
pub const WEIGHT_TOLERANCE: f32 = 1e-6;

/// Default per-source timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Per-source coefficients used to combine normalized scores.
///
/// Weights must sum to 1.0 within [`WEIGHT_TOLERANCE`]. The default
/// weights dense-vector similarity highest, graph relationships second,
/// keyword text third.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FusionWeights {
    /// Weight for vector-search scores.
    pub vector: f32,

    /// Weight for graph-search scores.
    pub graph: f32,

    /// Weight for document-search scores.
    pub document: f32,
}

impl FusionWeights {
    /// Create and validate a weight triple.
    pub fn new(vector: f32, graph: f32, document: f32) -> Result<Self> {
        let weights = Self {
            vector,
            graph,
            document,
        };
        weights.validate()?;
        Ok(weights)
    }

    /// Check that the weights sum to 1.0 within tolerance.
    pub fn validate(&self) -> Result<()> {
        let sum = self.vector + self.graph + self.document;
        if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(RetrievalError::InvalidQuery(format!(
                "fusion weights must sum to 1.0, got {sum}"
            )));
        }
        Ok(())
    }

    /// The weight applied to scores from `kind`.
    pub fn weight(&self, kind: trident_stores::SourceKind) -> f32 {
        match kind {
            trident_stores::SourceKind::Vector => self.vector,
            trident_stores::SourceKind::Graph => self.graph,
            trident_stores::SourceKind::Document => self.document,
        }
    }

    /// Parse weights from a `"0.4,0.35,0.25"` environment value.
    pub fn parse(value: &str) -> Result<Self> {
        let parts: Vec<&str> = value.split(',').map(str::trim).collect();
        if parts.len() != 3 {
            return Err(RetrievalError::Config(format!(
                "FUSION_WEIGHTS needs three comma-separated floats, got {value:?}"
            )));
        }

        let mut parsed = [0.0f32; 3];
        for (slot, part) in parsed.iter_mut().zip(&parts) {
            *slot = part.parse().map_err(|_| {
                RetrievalError::Config(format!("invalid fusion weight: {part:?}"))
            })?;
        }

        Self::new(parsed[0], parsed[1], parsed[2])
    }
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self {
            vector: 0.4,
            graph: 0.35,
            document: 0.25,
        }
    }
}

/// Configuration for the retrieval core, loaded from the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Base URL of the vector index.
    pub vector_endpoint: String,

    /// Base URL of the graph store.
    pub graph_endpoint: String,

    /// Base URL of the document store.
    pub document_endpoint: String,

    /// Fusion weights applied when merging result sets.
    pub weights: FusionWeights,

    /// Timeout applied independently to each sub-search.
    pub per_source_timeout: Duration,
}

impl RetrievalConfig {
    /// Load configuration from environment variables:
    /// `VECTOR_STORE_ENDPOINT`, `GRAPH_STORE_ENDPOINT`,
    /// `DOCUMENT_STORE_ENDPOINT`, `FUSION_WEIGHTS`, `PER_SOURCE_TIMEOUT_MS`.
    pub fn from_env() -> Result<Self> {
        let vector_endpoint = require_env("VECTOR_STORE_ENDPOINT")?;
        let graph_endpoint = require_env("GRAPH_STORE_ENDPOINT")?;
        let document_endpoint = require_env("DOCUMENT_STORE_ENDPOINT")?;

        let weights = match std::env::var("FUSION_WEIGHTS") {
            Ok(value) => FusionWeights::parse(&value)?,
            Err(_) => FusionWeights::default(),
        };

        let timeout_ms = match std::env::var("PER_SOURCE_TIMEOUT_MS") {
            Ok(value) => value.parse().map_err(|_| {
                RetrievalError::Config(format!("invalid PER_SOURCE_TIMEOUT_MS: {value:?}"))
            })?,
            Err(_) => DEFAULT_TIMEOUT_MS,
        };

        Ok(Self {
            vector_endpoint,
            graph_endpoint,
            document_endpoint,
            weights,
            per_source_timeout: Duration::from_millis(timeout_ms),
        })
    }
}

fn require_env(name: &str) -> Result<String> {
    std::env::var(name).map_err(|_| RetrievalError::Config(format!("{name} is not set")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_weights_sum_to_one() {
        let weights = FusionWeights::default();
        assert!(weights.validate().is_ok());
        assert!((weights.vector + weights.graph + weights.document - 1.0).abs() < WEIGHT_TOLERANCE);
    }

    #[test]
    fn test_invalid_weight_sum_rejected() {
        let err = FusionWeights::new(0.5, 0.5, 0.5).unwrap_err();
        assert!(matches!(err, RetrievalError::InvalidQuery(_)));
    }

    #[test]
    fn test_parse_weights() {
        let weights = FusionWeights::parse("0.4, 0.35, 0.25").unwrap();
        assert_eq!(weights, FusionWeights::default());
    }

    #[test]
    fn test_parse_rejects_wrong_arity() {
        assert!(matches!(
            FusionWeights::parse("0.5,0.5"),
            Err(RetrievalError::Config(_))
        ));
    }
}
