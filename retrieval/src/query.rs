//! Query input for the hybrid retrieval engine.

use serde::{Deserialize, Serialize};

use crate::error::{Result, RetrievalError};

/// An immutable retrieval request: free text, a domain/scope tag, and a
/// result-count limit. Created per request, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Query {
    /// Free-text query.
    pub text: String,

    /// Domain/scope tag narrowing graph and document search.
    pub domain: String,

    /// Maximum number of fused results to return.
    pub top_k: usize,
}

impl Query {
    /// Create a new query.
    pub fn new(text: impl Into<String>, domain: impl Into<String>, top_k: usize) -> Self {
        Self {
            text: text.into(),
            domain: domain.into(),
            top_k,
        }
    }

    /// Validate the query. Empty text and `top_k < 1` are rejected
    /// immediately, never retried.
    pub fn validate(&self) -> Result<()> {
        if self.text.trim().is_empty() {
            return Err(RetrievalError::InvalidQuery(
                "query text is empty".to_string(),
            ));
        }
        if self.top_k < 1 {
            return Err(RetrievalError::InvalidQuery(format!(
                "top_k must be >= 1, got {}",
                self.top_k
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_query_passes() {
        assert!(Query::new("deploy the gateway", "ops", 10).validate().is_ok());
    }

    #[test]
    fn test_empty_text_rejected() {
        let err = Query::new("   ", "ops", 10).validate().unwrap_err();
        assert!(matches!(err, RetrievalError::InvalidQuery(_)));
    }

    #[test]
    fn test_zero_top_k_rejected() {
        let err = Query::new("deploy", "ops", 0).validate().unwrap_err();
        assert!(matches!(err, RetrievalError::InvalidQuery(_)));
    }
}
