//! Embedding provider trait.
//!
//! The engine never sees model internals; it depends only on this
//! capability interface: cleaned text in, fixed-dimension vector out.
//! Implementations may run inference in-process or call out to an external
//! service, and are expected to be slow relative to the rest of the
//! pipeline, so every call site treats `embed` as a blocking-grade await.
//!
//! # Thread Safety
//!
//! Implementations must be `Send + Sync`; a single provider instance
//! serves all concurrent search requests.

use std::fmt::Debug;

use async_trait::async_trait;

use crate::error::Result;
use crate::vector::Vector;

/// Capability interface for text embedding models.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync + Debug {
    /// Generate an embedding vector for the given cleaned text.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::LoupeError::ModelAdapter`] when the backing
    /// model is unavailable or returns a malformed response. Failures must
    /// propagate; substituting a zero vector would silently corrupt
    /// ranking.
    async fn embed(&self, text: &str) -> Result<Vector>;

    /// Generate embeddings for multiple texts.
    ///
    /// The default implementation calls [`EmbeddingProvider::embed`]
    /// sequentially. Override for providers with a native batch endpoint.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vector>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// Output dimension of this provider.
    ///
    /// Fixed per instance; every cache entry and index row produced
    /// through this provider has this length.
    fn dimension(&self) -> usize;

    /// Identifier of the backing model, for logging.
    fn name(&self) -> &str {
        "unknown"
    }
}
