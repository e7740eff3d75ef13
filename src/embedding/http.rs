//! HTTP-based embedding provider.
//!
//! Adapter for an external embedding inference service that speaks a
//! minimal JSON protocol: POST `{"model": ..., "input": [texts]}` and
//! receive `{"data": [{"embedding": [f32]}]}` with one entry per input,
//! in order. Compatible with OpenAI-style embedding endpoints.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::embedding::provider::EmbeddingProvider;
use crate::error::{LoupeError, Result};
use crate::vector::Vector;

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// Embedding provider backed by an HTTP inference service.
pub struct HttpEmbeddingProvider {
    client: Client,
    endpoint: String,
    model: String,
    dimension: usize,
}

impl std::fmt::Debug for HttpEmbeddingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpEmbeddingProvider")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("dimension", &self.dimension)
            .finish()
    }
}

impl HttpEmbeddingProvider {
    /// Create a provider for the given endpoint and model.
    ///
    /// `dimension` is the contract for every vector this provider emits;
    /// responses of any other length are rejected as adapter failures.
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>, dimension: usize) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            model: model.into(),
            dimension,
        }
    }

    async fn request(&self, input: Vec<&str>) -> Result<Vec<Vector>> {
        let expected = input.len();
        let body = EmbeddingRequest {
            model: &self.model,
            input,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| LoupeError::model_adapter(format!("embedding request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(LoupeError::model_adapter(format!(
                "embedding service returned status {}",
                response.status()
            )));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| LoupeError::model_adapter(format!("malformed embedding response: {e}")))?;

        if parsed.data.len() != expected {
            return Err(LoupeError::model_adapter(format!(
                "embedding service returned {} vectors for {} inputs",
                parsed.data.len(),
                expected
            )));
        }

        let mut vectors = Vec::with_capacity(parsed.data.len());
        for data in parsed.data {
            if data.embedding.len() != self.dimension {
                return Err(LoupeError::model_adapter(format!(
                    "embedding service returned dimension {}, expected {}",
                    data.embedding.len(),
                    self.dimension
                )));
            }
            vectors.push(Vector::new(data.embedding));
        }
        Ok(vectors)
    }
}

#[async_trait]
impl EmbeddingProvider for HttpEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vector> {
        let mut vectors = self.request(vec![text]).await?;
        vectors
            .pop()
            .ok_or_else(|| LoupeError::model_adapter("embedding service returned no vectors"))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vector>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.request(texts.to_vec()).await
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        &self.model
    }
}
