//! Embedding provider seam and the content-hash keyed embedding cache.

pub mod cache;
pub mod http;
pub mod provider;

pub use cache::EmbeddingCache;
pub use http::HttpEmbeddingProvider;
pub use provider::EmbeddingProvider;
