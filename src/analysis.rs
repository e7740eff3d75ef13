//! Text normalization and tokenization.
//!
//! Every piece of text that enters the engine (documents at build time,
//! queries at search time) passes through the same [`TextNormalizer`] so
//! that content hashes, embeddings, and overlap explanations all see an
//! identical rendering of the input.

use regex::Regex;

/// Deterministic text cleaner applied to documents and queries alike.
///
/// Normalization lowercases the input, strips HTML-style tags, and
/// collapses runs of whitespace into single spaces. The same input always
/// produces the same output, which is what makes content hashing a valid
/// cache-invalidation signal.
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    tag_pattern: Regex,
    whitespace_pattern: Regex,
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextNormalizer {
    /// Create a new normalizer.
    pub fn new() -> Self {
        Self {
            // Non-greedy so adjacent tags don't swallow the text between them.
            tag_pattern: Regex::new(r"<.*?>").expect("tag pattern is valid"),
            whitespace_pattern: Regex::new(r"\s+").expect("whitespace pattern is valid"),
        }
    }

    /// Normalize raw text into its cleaned form.
    pub fn normalize(&self, text: &str) -> String {
        let lowered = text.to_lowercase();
        let untagged = self.tag_pattern.replace_all(&lowered, "");
        self.whitespace_pattern
            .replace_all(&untagged, " ")
            .trim()
            .to_string()
    }
}

/// Split already-cleaned text into whitespace-delimited tokens.
///
/// Intentionally literal: no stemming, no lemmatization. Overlap
/// explanations and query expansion both operate on these exact tokens.
pub fn tokenize(cleaned: &str) -> impl Iterator<Item = &str> {
    cleaned.split_whitespace()
}
