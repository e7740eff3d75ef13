//! Vector types, similarity math, and the persisted vector index.

pub mod index;
pub mod similarity;
pub mod vector;

pub use index::{SearchHit, VectorIndex};
pub use vector::Vector;
