//! Deterministic lexical-overlap explanation.

use std::collections::BTreeSet;

use crate::analysis::tokenize;
use crate::search::Explanation;

/// Explains a (query, document) match through exact token overlap.
///
/// Tokenization is whitespace-based over already-cleaned text, with no
/// stemming or lemmatization: overlap means exact lowercase token
/// equality, nothing fuzzier. Intentionally simple so the explanation is
/// reproducible and cheap.
#[derive(Debug, Clone, Default)]
pub struct MatchExplainer;

impl MatchExplainer {
    /// Create a new explainer.
    pub fn new() -> Self {
        Self
    }

    /// Compute the overlap explanation for a cleaned query and cleaned
    /// document text.
    pub fn explain(&self, query: &str, document: &str) -> Explanation {
        let query_tokens: BTreeSet<&str> = tokenize(query).collect();
        let doc_tokens: BTreeSet<&str> = tokenize(document).collect();

        let overlapping_keywords: BTreeSet<String> = query_tokens
            .intersection(&doc_tokens)
            .map(|token| token.to_string())
            .collect();

        let overlap_ratio = overlapping_keywords.len() as f32 / query_tokens.len().max(1) as f32;

        Explanation {
            overlapping_keywords,
            overlap_ratio,
        }
    }
}
