//! Embedding providers.

use async_trait::async_trait;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::Embedding;
use crate::error::{EmbeddingError, Result};

/// Trait for embedding backends.
///
/// Providers are deterministic for identical input: the model is fixed,
/// not retrained online, so the same text always maps to the same vector.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Name of this provider, for logs.
    fn name(&self) -> &str;

    /// Output dimension of every vector this provider produces.
    fn dimension(&self) -> usize;

    /// Embed `text` into a vector of exactly `dimension()` floats.
    async fn embed(&self, text: &str) -> Result<Embedding>;
}

/// HTTP provider for OpenAI-compatible embedding APIs.
pub struct OpenAiCompatProvider {
    endpoint: String,
    api_key: Option<String>,
    model: String,
    dimension: usize,
    client: reqwest::Client,
}

impl OpenAiCompatProvider {
    /// Create a provider against the given API base URL.
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>, dimension: usize) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: std::env::var("OPENAI_API_KEY").ok(),
            model: model.into(),
            dimension,
            client: reqwest::Client::new(),
        }
    }

    /// Set the API key explicitly instead of reading the environment.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Use a pre-built (pooled) HTTP client.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        "openai-compat"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> Result<Embedding> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| EmbeddingError::NotConfigured("missing API key".to_string()))?;

        debug!("generating embedding with model: {}", self.model);

        let body = serde_json::json!({
            "input": text,
            "model": self.model,
            "dimensions": self.dimension,
        });

        let response = self
            .client
            .post(format!("{}/embeddings", self.endpoint))
            .header("Authorization", format!("Bearer {api_key}"))
            .json(&body)
            .send()
            .await
            .map_err(|e| EmbeddingError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(EmbeddingError::Unavailable(format!(
                "embeddings API returned status {}",
                response.status()
            )));
        }

        let parsed: EmbeddingApiResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingError::InvalidResponse(e.to_string()))?;

        let embedding = parsed
            .data
            .into_iter()
            .next()
            .map(|item| item.embedding)
            .ok_or_else(|| EmbeddingError::InvalidResponse("no embedding in response".to_string()))?;

        if embedding.len() != self.dimension {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dimension,
                actual: embedding.len(),
            });
        }

        Ok(embedding)
    }
}

/// Wire format of the embeddings API response.
#[derive(Debug, Deserialize)]
struct EmbeddingApiResponse {
    data: Vec<EmbeddingApiItem>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingApiItem {
    embedding: Vec<f32>,
}

/// Deterministic offline provider.
///
/// Hashes the input text and expands the digest into a unit-length vector.
/// Not semantically meaningful, but stable across calls, which is all the
/// engine tests and air-gapped deployments need.
pub struct HashingProvider {
    dimension: usize,
}

impl HashingProvider {
    /// Create a provider with the given output dimension.
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

#[async_trait]
impl EmbeddingProvider for HashingProvider {
    fn name(&self) -> &str {
        "hashing"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> Result<Embedding> {
        let mut values = Vec::with_capacity(self.dimension);
        let mut counter: u32 = 0;

        while values.len() < self.dimension {
            let mut hasher = Sha256::new();
            hasher.update(text.as_bytes());
            hasher.update(counter.to_le_bytes());
            let digest = hasher.finalize();

            for chunk in digest.as_slice().chunks_exact(4) {
                if values.len() == self.dimension {
                    break;
                }
                let word = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
                // Map each 32-bit word into [-1, 1].
                values.push((word as f32 / u32::MAX as f32) * 2.0 - 1.0);
            }
            counter += 1;
        }

        let magnitude: f32 = values.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for v in &mut values {
                *v /= magnitude;
            }
        }

        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_hashing_provider_is_deterministic() {
        let provider = HashingProvider::new(16);
        let a = provider.embed("hybrid retrieval").await.unwrap();
        let b = provider.embed("hybrid retrieval").await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 16);
    }

    #[tokio::test]
    async fn test_hashing_provider_unit_length() {
        let provider = HashingProvider::new(32);
        let v = provider.embed("some text").await.unwrap();
        let magnitude: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((magnitude - 1.0).abs() < 1e-4);
    }

    #[tokio::test]
    async fn test_openai_compat_embed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .and(header("Authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"embedding": [0.1, 0.2, 0.3]}]
            })))
            .mount(&server)
            .await;

        let provider =
            OpenAiCompatProvider::new(server.uri(), "text-embedding-3-small", 3)
                .with_api_key("test-key");

        let embedding = provider.embed("hello").await.unwrap();
        assert_eq!(embedding, vec![0.1, 0.2, 0.3]);
    }

    #[tokio::test]
    async fn test_openai_compat_dimension_mismatch() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"embedding": [0.1, 0.2]}]
            })))
            .mount(&server)
            .await;

        let provider = OpenAiCompatProvider::new(server.uri(), "m", 3).with_api_key("k");
        let err = provider.embed("hello").await.unwrap_err();
        assert!(matches!(err, EmbeddingError::DimensionMismatch { .. }));
    }

    #[tokio::test]
    async fn test_connection_failure_is_unavailable() {
        let provider =
            OpenAiCompatProvider::new("http://127.0.0.1:9", "m", 3).with_api_key("k");
        let err = provider.embed("hello").await.unwrap_err();
        assert!(matches!(err, EmbeddingError::Unavailable(_)));
    }
}
