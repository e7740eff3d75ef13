//! Batch index build entrypoint.
//!
//! Reads every document from the source, computes or reuses cached
//! embeddings, and builds (optionally persisting) the vector index. The
//! operation is idempotent: rerunning over an unchanged document set
//! serves every embedding from the cache and produces byte-equivalent
//! index artifacts, because documents are processed in sorted doc_id
//! order.

use std::path::Path;
use std::sync::Arc;

use crate::analysis::TextNormalizer;
use crate::document::{Document, DocumentSource};
use crate::embedding::{EmbeddingCache, EmbeddingProvider};
use crate::error::Result;
use crate::vector::{Vector, VectorIndex};

/// Outcome of a build run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildStats {
    /// Documents indexed.
    pub documents: usize,
    /// Embeddings served from the cache.
    pub cache_hits: usize,
    /// Embeddings recomputed and written back.
    pub cache_misses: usize,
    /// Embedding dimension of the built index.
    pub dimension: usize,
}

/// Builds the vector index from a document source, embedding through the
/// cache.
pub struct IndexBuilder {
    source: Arc<dyn DocumentSource>,
    provider: Arc<dyn EmbeddingProvider>,
    cache: Arc<EmbeddingCache>,
    normalizer: TextNormalizer,
}

impl std::fmt::Debug for IndexBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexBuilder")
            .field("provider", &self.provider.name())
            .finish()
    }
}

impl IndexBuilder {
    /// Create a builder from its collaborators.
    pub fn new(
        source: Arc<dyn DocumentSource>,
        provider: Arc<dyn EmbeddingProvider>,
        cache: Arc<EmbeddingCache>,
    ) -> Self {
        Self {
            source,
            provider,
            cache,
            normalizer: TextNormalizer::new(),
        }
    }

    /// Build an in-memory index over all documents in the source.
    pub async fn build_index(&self) -> Result<(VectorIndex, BuildStats)> {
        let doc_ids = self.source.list()?;
        log::info!("building index over {} documents", doc_ids.len());

        let mut embeddings: Vec<Vector> = Vec::with_capacity(doc_ids.len());
        let mut indexed_ids: Vec<String> = Vec::with_capacity(doc_ids.len());
        let mut cache_hits = 0usize;
        let mut cache_misses = 0usize;

        for doc_id in doc_ids {
            let Some(raw_text) = self.source.fetch(&doc_id)? else {
                log::warn!("document {doc_id} disappeared during build, skipping");
                continue;
            };
            let cleaned = self.normalizer.normalize(&raw_text);
            let document = Document::new(doc_id, raw_text, cleaned);

            let embedding = match self.cache.get(&document.doc_id, &document.content_hash)? {
                Some(cached) => {
                    cache_hits += 1;
                    cached
                }
                None => {
                    cache_misses += 1;
                    let computed = self.provider.embed(&document.cleaned_text).await?;
                    self.cache
                        .put(&document.doc_id, &computed, &document.content_hash)?;
                    computed
                }
            };

            embeddings.push(embedding);
            indexed_ids.push(document.doc_id);
        }

        let index = VectorIndex::build(embeddings, indexed_ids)?;
        let stats = BuildStats {
            documents: index.len(),
            cache_hits,
            cache_misses,
            dimension: index.dimension(),
        };
        log::info!(
            "index build complete: {} documents, {} cache hits, {} misses",
            stats.documents,
            stats.cache_hits,
            stats.cache_misses
        );
        Ok((index, stats))
    }

    /// Build the index and persist it to `index_path`.
    pub async fn build_and_save(&self, index_path: &Path) -> Result<(VectorIndex, BuildStats)> {
        let (index, stats) = self.build_index().await?;
        index.save(index_path)?;
        Ok((index, stats))
    }
}
