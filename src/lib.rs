//! # Loupe
//!
//! A two-stage semantic document retrieval engine for Rust.
//!
//! ## Features
//!
//! - Approximate candidate generation over a persisted cosine-similarity
//!   vector index
//! - Precise pairwise reranking through a pluggable cross-encoder adapter
//! - Content-hash keyed embedding cache (SQLite-backed)
//! - Deterministic lexical-overlap explanations for every result
//! - Graceful degradation when the index or upstream models are unavailable

pub mod analysis;
pub mod document;
pub mod embedding;
pub mod error;
pub mod query;
pub mod scoring;
pub mod search;
pub mod vector;

pub mod cli;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
