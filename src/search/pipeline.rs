//! The retrieval pipeline: candidate generation, rerank, explanation.
//!
//! `RetrievalPipeline` owns no persistent state. It holds shared handles
//! to the trait seams and to an [`IndexHandle`] through which the current
//! vector index is published. Concurrent searches run against a consistent
//! snapshot: the handle is read once per request, the `Arc` is cloned, and
//! no lock is held across model-adapter awaits.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::analysis::TextNormalizer;
use crate::document::DocumentSource;
use crate::embedding::EmbeddingProvider;
use crate::error::{LoupeError, Result};
use crate::query::QueryExpander;
use crate::scoring::PairwiseScorer;
use crate::search::{
    MatchExplainer, RerankedHit, SearchOptions, SearchResult, make_preview,
};
use crate::vector::VectorIndex;

/// Atomically swappable handle to the current vector index.
///
/// The index itself is immutable after build; a rebuild installs a whole
/// new index in one swap, so in-flight searches finish against the
/// snapshot they started with and never observe a partially built
/// structure.
#[derive(Debug, Default)]
pub struct IndexHandle {
    inner: RwLock<Option<Arc<VectorIndex>>>,
}

impl IndexHandle {
    /// Create an empty (not-ready) handle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a handle already holding an index.
    pub fn with_index(index: VectorIndex) -> Self {
        Self {
            inner: RwLock::new(Some(Arc::new(index))),
        }
    }

    /// Publish a new index, replacing any previous one.
    pub fn install(&self, index: VectorIndex) {
        let count = index.len();
        *self.inner.write() = Some(Arc::new(index));
        log::info!("installed vector index with {count} documents");
    }

    /// Snapshot the current index, if any.
    pub fn current(&self) -> Option<Arc<VectorIndex>> {
        self.inner.read().clone()
    }

    /// Whether an index has been built or loaded.
    pub fn is_ready(&self) -> bool {
        self.inner.read().is_some()
    }
}

/// Orchestrates a search request end to end.
pub struct RetrievalPipeline {
    source: Arc<dyn DocumentSource>,
    provider: Arc<dyn EmbeddingProvider>,
    scorer: Arc<dyn PairwiseScorer>,
    normalizer: TextNormalizer,
    expander: Option<QueryExpander>,
    explainer: MatchExplainer,
    index: Arc<IndexHandle>,
}

impl std::fmt::Debug for RetrievalPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetrievalPipeline")
            .field("provider", &self.provider.name())
            .field("scorer", &self.scorer.name())
            .field("expansion", &self.expander.is_some())
            .field("ready", &self.index.is_ready())
            .finish()
    }
}

impl RetrievalPipeline {
    /// Assemble a pipeline from its collaborators.
    pub fn new(
        source: Arc<dyn DocumentSource>,
        provider: Arc<dyn EmbeddingProvider>,
        scorer: Arc<dyn PairwiseScorer>,
        expander: Option<QueryExpander>,
        index: Arc<IndexHandle>,
    ) -> Self {
        Self {
            source,
            provider,
            scorer,
            normalizer: TextNormalizer::new(),
            expander,
            explainer: MatchExplainer::new(),
            index,
        }
    }

    /// The index handle this pipeline searches through.
    pub fn index_handle(&self) -> &Arc<IndexHandle> {
        &self.index
    }

    /// Run a search request.
    ///
    /// Fails fast with [`LoupeError::IndexNotReady`] when no index has
    /// been built or loaded, and with [`LoupeError::InvalidQuery`] when
    /// the query normalizes to nothing. A `top_k` of zero is a valid
    /// request with an empty answer.
    pub async fn search(
        &self,
        raw_query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<SearchResult>> {
        // Precondition, not a search attempt: nothing below runs without
        // an index snapshot.
        let index = self.index.current().ok_or(LoupeError::IndexNotReady)?;

        let cleaned_query = self.normalizer.normalize(raw_query);
        if cleaned_query.is_empty() {
            return Err(LoupeError::invalid_query(
                "query is empty after normalization",
            ));
        }

        if options.top_k == 0 {
            return Ok(Vec::new());
        }

        let expanded = match (&self.expander, options.use_expansion) {
            (Some(expander), true) => expander.expand(&cleaned_query),
            _ => cleaned_query.clone(),
        };

        let query_embedding = self.provider.embed(&expanded).await?;

        let candidate_count = options.candidate_count();
        let initial = index.search(&query_embedding, candidate_count)?;
        log::debug!(
            "query {cleaned_query:?}: {} of {candidate_count} requested candidates",
            initial.len()
        );

        // A candidate whose file vanished after indexing degrades to empty
        // text; the request keeps going.
        let mut candidates: Vec<(String, String)> = Vec::with_capacity(initial.len());
        for hit in initial {
            let text = self.fetch_text(&hit.doc_id)?;
            candidates.push((hit.doc_id, text));
        }

        let reranked = self
            .rerank(&cleaned_query, &candidates, options.top_k)
            .await?;

        // The explanation deliberately re-fetches the full document text
        // rather than reusing the rerank copy.
        let mut results = Vec::with_capacity(reranked.len());
        for hit in reranked {
            let full_text = self.fetch_text(&hit.doc_id)?;
            let cleaned_doc = self.normalizer.normalize(&full_text);
            let explanation = self.explainer.explain(&cleaned_query, &cleaned_doc);
            results.push(SearchResult {
                doc_id: hit.doc_id,
                score: hit.score,
                preview: hit.preview,
                explanation,
            });
        }
        Ok(results)
    }

    /// Score all candidates pairwise, order them, and keep the best
    /// `top_k`.
    async fn rerank(
        &self,
        cleaned_query: &str,
        candidates: &[(String, String)],
        top_k: usize,
    ) -> Result<Vec<RerankedHit>> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let texts: Vec<&str> = candidates.iter().map(|(_, text)| text.as_str()).collect();
        let scores = self.scorer.score_batch(cleaned_query, &texts).await?;
        if scores.len() != candidates.len() {
            return Err(LoupeError::model_adapter(format!(
                "scorer returned {} scores for {} candidates",
                scores.len(),
                candidates.len()
            )));
        }

        let mut reranked: Vec<RerankedHit> = candidates
            .iter()
            .zip(scores)
            .map(|((doc_id, text), score)| RerankedHit {
                doc_id: doc_id.clone(),
                score,
                preview: make_preview(text),
            })
            .collect();
        reranked.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.doc_id.cmp(&b.doc_id))
        });
        reranked.truncate(top_k);
        Ok(reranked)
    }

    fn fetch_text(&self, doc_id: &str) -> Result<String> {
        match self.source.fetch(doc_id)? {
            Some(text) => Ok(text),
            None => {
                log::warn!("document {doc_id} missing at query time, using empty text");
                Ok(String::new())
            }
        }
    }
}
