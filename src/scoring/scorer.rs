//! Pairwise scorer trait.
//!
//! A pairwise scorer judges a (query, candidate text) pair jointly, the
//! cross-encoder pattern: more accurate than independent embedding
//! similarity, and much costlier, which is why it only sees the candidate
//! pool rather than the whole corpus.

use std::fmt::Debug;

use async_trait::async_trait;

use crate::error::Result;

/// Capability interface for pairwise relevance models.
///
/// Implementations must behave as a pure function of their inputs: no
/// hidden state between calls may influence scores (caching model weights
/// for performance is fine). Higher score means more relevant; no fixed
/// scale is guaranteed across model versions, so scores are only
/// comparable within a single call.
#[async_trait]
pub trait PairwiseScorer: Send + Sync + Debug {
    /// Score every candidate text against the query.
    ///
    /// Returns one score per text, in input order.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::LoupeError::ModelAdapter`] when the backing
    /// model is unavailable. Failures must propagate rather than degrade
    /// to zero scores, which would silently corrupt ranking.
    async fn score_batch(&self, query: &str, texts: &[&str]) -> Result<Vec<f32>>;

    /// Identifier of the backing model, for logging.
    fn name(&self) -> &str {
        "unknown"
    }
}
