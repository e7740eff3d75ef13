//! Pairwise (cross-encoder style) scoring seam.

pub mod http;
pub mod scorer;

pub use http::HttpPairwiseScorer;
pub use scorer::PairwiseScorer;
