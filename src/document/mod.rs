//! Document types and content hashing.

pub mod source;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub use source::{DirectorySource, DocumentSource};

/// A document as seen by the build pipeline.
///
/// Immutable once loaded for a given build. `doc_id` equals the source
/// filename and is the sole join key between the embedding cache, the
/// vector index, and the document source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique identifier (source filename).
    pub doc_id: String,
    /// Raw text as read from the source.
    pub raw_text: String,
    /// Normalized text; embeddings and explanations operate on this.
    pub cleaned_text: String,
    /// SHA-256 hex digest of the cleaned text.
    pub content_hash: String,
}

impl Document {
    /// Build a document from raw text, normalizing and hashing it.
    pub fn new(doc_id: impl Into<String>, raw_text: String, cleaned_text: String) -> Self {
        let content_hash = content_hash(&cleaned_text);
        Self {
            doc_id: doc_id.into(),
            raw_text,
            cleaned_text,
            content_hash,
        }
    }
}

/// SHA-256 hex digest of a document's cleaned text.
///
/// This is the cache-invalidation signal: a cached embedding is reusable
/// only while the current cleaned text hashes to the same value.
pub fn content_hash(cleaned_text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(cleaned_text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_hash_is_stable() {
        assert_eq!(content_hash("hello world"), content_hash("hello world"));
    }

    #[test]
    fn test_content_hash_detects_change() {
        assert_ne!(content_hash("hello world"), content_hash("hello worlds"));
    }

    #[test]
    fn test_content_hash_is_hex_sha256() {
        let hash = content_hash("");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
        // Known digest of the empty string.
        assert_eq!(
            hash,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_document_new_hashes_cleaned_text() {
        let doc = Document::new("a.txt", "Hello World".to_string(), "hello world".to_string());
        assert_eq!(doc.content_hash, content_hash("hello world"));
        assert_eq!(doc.doc_id, "a.txt");
    }
}
