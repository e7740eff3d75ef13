//! HTTP-based pairwise scorer.
//!
//! Adapter for an external cross-encoder inference service: POST
//! `{"model": ..., "query": ..., "texts": [...]}` and receive
//! `{"scores": [f32]}` with one score per text, in order.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{LoupeError, Result};
use crate::scoring::scorer::PairwiseScorer;

#[derive(Debug, Serialize)]
struct RerankRequest<'a> {
    model: &'a str,
    query: &'a str,
    texts: &'a [&'a str],
}

#[derive(Debug, Deserialize)]
struct RerankResponse {
    scores: Vec<f32>,
}

/// Pairwise scorer backed by an HTTP inference service.
pub struct HttpPairwiseScorer {
    client: Client,
    endpoint: String,
    model: String,
}

impl std::fmt::Debug for HttpPairwiseScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpPairwiseScorer")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .finish()
    }
}

impl HttpPairwiseScorer {
    /// Create a scorer for the given endpoint and model.
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            model: model.into(),
        }
    }
}

#[async_trait]
impl PairwiseScorer for HttpPairwiseScorer {
    async fn score_batch(&self, query: &str, texts: &[&str]) -> Result<Vec<f32>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let body = RerankRequest {
            model: &self.model,
            query,
            texts,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| LoupeError::model_adapter(format!("rerank request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(LoupeError::model_adapter(format!(
                "rerank service returned status {}",
                response.status()
            )));
        }

        let parsed: RerankResponse = response
            .json()
            .await
            .map_err(|e| LoupeError::model_adapter(format!("malformed rerank response: {e}")))?;

        if parsed.scores.len() != texts.len() {
            return Err(LoupeError::model_adapter(format!(
                "rerank service returned {} scores for {} texts",
                parsed.scores.len(),
                texts.len()
            )));
        }
        Ok(parsed.scores)
    }

    fn name(&self) -> &str {
        &self.model
    }
}
