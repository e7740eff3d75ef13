//! Error types for the Loupe library.
//!
//! All fallible operations return [`Result`], whose error type is
//! [`LoupeError`]. The variants map onto the externally visible failure
//! classes of the engine: a caller can ask an error whether it is worth
//! retrying ([`LoupeError::is_retryable`]), whether the request itself was
//! malformed ([`LoupeError::is_invalid_request`]), or whether an operator
//! has to repair persisted state before the service can come back.

use std::io;

use thiserror::Error;

/// The main error type for Loupe operations.
#[derive(Error, Debug)]
pub enum LoupeError {
    /// I/O errors (file operations, directory listing, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// No vector index has been built or loaded yet. Retryable: the caller
    /// should wait for a build to complete rather than treat this as fatal.
    #[error("vector index is not ready")]
    IndexNotReady,

    /// Embeddings of inconsistent length were passed to an index build.
    /// Fatal to the build; nothing is written.
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// A persisted index failed its consistency checks on load.
    #[error("index corrupt: {0}")]
    IndexCorrupt(String),

    /// The embedding cache store could not be opened or parsed.
    #[error("cache store error: {0}")]
    CacheStore(String),

    /// An embedding or rerank model adapter failed or is unavailable.
    #[error("model adapter error: {0}")]
    ModelAdapter(String),

    /// The query is malformed (e.g. empty after normalization).
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// Generic error for other cases
    #[error("error: {0}")]
    Other(String),
}

/// Result type alias for operations that may fail with [`LoupeError`].
pub type Result<T> = std::result::Result<T, LoupeError>;

impl LoupeError {
    /// Create a new index-corrupt error.
    pub fn index_corrupt<S: Into<String>>(msg: S) -> Self {
        LoupeError::IndexCorrupt(msg.into())
    }

    /// Create a new cache store error.
    pub fn cache_store<S: Into<String>>(msg: S) -> Self {
        LoupeError::CacheStore(msg.into())
    }

    /// Create a new model adapter error.
    pub fn model_adapter<S: Into<String>>(msg: S) -> Self {
        LoupeError::ModelAdapter(msg.into())
    }

    /// Create a new invalid query error.
    pub fn invalid_query<S: Into<String>>(msg: S) -> Self {
        LoupeError::InvalidQuery(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoupeError::Other(msg.into())
    }

    /// Whether the caller may retry the same request later and expect it
    /// to succeed without operator intervention.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LoupeError::IndexNotReady | LoupeError::ModelAdapter(_)
        )
    }

    /// Whether the request itself was malformed; retrying unchanged will
    /// fail again.
    pub fn is_invalid_request(&self) -> bool {
        matches!(self, LoupeError::InvalidQuery(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = LoupeError::IndexNotReady;
        assert_eq!(error.to_string(), "vector index is not ready");

        let error = LoupeError::DimensionMismatch {
            expected: 384,
            actual: 512,
        };
        assert_eq!(
            error.to_string(),
            "embedding dimension mismatch: expected 384, got 512"
        );

        let error = LoupeError::index_corrupt("sidecar missing");
        assert_eq!(error.to_string(), "index corrupt: sidecar missing");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let error = LoupeError::from(io_error);

        match error {
            LoupeError::Io(_) => {}
            _ => panic!("expected Io variant"),
        }
    }

    #[test]
    fn test_failure_classes() {
        assert!(LoupeError::IndexNotReady.is_retryable());
        assert!(LoupeError::model_adapter("connection refused").is_retryable());
        assert!(!LoupeError::index_corrupt("bad crc").is_retryable());

        assert!(LoupeError::invalid_query("empty").is_invalid_request());
        assert!(!LoupeError::IndexNotReady.is_invalid_request());
    }
}
