//! Search request/response types and the retrieval pipeline.

pub mod builder;
pub mod explain;
pub mod pipeline;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

pub use builder::{BuildStats, IndexBuilder};
pub use explain::MatchExplainer;
pub use pipeline::{IndexHandle, RetrievalPipeline};

/// Preview length in characters.
pub const PREVIEW_CHARS: usize = 200;

/// Marker appended to previews that were cut short.
pub const PREVIEW_ELLIPSIS: &str = "...";

/// Tunable knobs for a single search request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Number of results to return. Zero yields an empty result list.
    pub top_k: usize,
    /// Whether to expand the query with synonyms before embedding.
    pub use_expansion: bool,
    /// Candidate pool multiplier for the rerank stage. Zero is treated
    /// as 1; the pool never shrinks below `top_k`.
    pub rerank_multiplier: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            top_k: 5,
            use_expansion: true,
            rerank_multiplier: 5,
        }
    }
}

impl SearchOptions {
    /// Size of the candidate pool fetched from the index before reranking.
    ///
    /// `max(top_k * rerank_multiplier, top_k)`, never below 1.
    pub fn candidate_count(&self) -> usize {
        let multiplier = self.rerank_multiplier.max(1);
        (self.top_k * multiplier).max(self.top_k).max(1)
    }
}

/// Why a document matched: exact lowercase token overlap with the query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    /// Query tokens that also appear in the document.
    pub overlapping_keywords: BTreeSet<String>,
    /// `|query ∩ doc| / max(|query|, 1)`, always in [0, 1].
    pub overlap_ratio: f32,
}

/// A candidate after the pairwise rerank stage.
///
/// `score` comes from the pairwise scorer and is not comparable in scale
/// to the index stage's cosine similarity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RerankedHit {
    pub doc_id: String,
    pub score: f32,
    pub preview: String,
}

/// A fully assembled search result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub doc_id: String,
    /// Pairwise rerank score; higher is more relevant.
    pub score: f32,
    /// First [`PREVIEW_CHARS`] characters of the candidate text.
    pub preview: String,
    pub explanation: Explanation,
}

/// Build a bounded preview of candidate text.
///
/// Takes the first [`PREVIEW_CHARS`] characters (never splitting a
/// character) and appends [`PREVIEW_ELLIPSIS`] when text was cut. Empty
/// text yields an empty preview with no marker.
pub fn make_preview(text: &str) -> String {
    let mut preview: String = text.chars().take(PREVIEW_CHARS).collect();
    if text.chars().count() > PREVIEW_CHARS {
        preview.push_str(PREVIEW_ELLIPSIS);
    }
    preview
}
