//! Core dense vector data structure.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{LoupeError, Result};

/// A dense vector representation for similarity search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vector {
    /// The vector dimensions as floating point values.
    pub data: Vec<f32>,
}

impl Vector {
    /// Create a new vector with the given dimensions.
    pub fn new(data: Vec<f32>) -> Self {
        Self { data }
    }

    /// Get the dimensionality of this vector.
    pub fn dimension(&self) -> usize {
        self.data.len()
    }

    /// Calculate the L2 norm (magnitude) of this vector.
    pub fn norm(&self) -> f32 {
        self.data.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    /// Normalize this vector to unit length.
    ///
    /// Zero vectors are left unchanged.
    pub fn normalize(&mut self) {
        let norm = self.norm();
        if norm > 0.0 {
            for value in &mut self.data {
                *value /= norm;
            }
        }
    }

    /// Get a normalized copy of this vector.
    pub fn normalized(&self) -> Self {
        let mut normalized = self.clone();
        normalized.normalize();
        normalized
    }

    /// Validate that this vector has the expected dimension.
    pub fn validate_dimension(&self, expected: usize) -> Result<()> {
        if self.data.len() != expected {
            return Err(LoupeError::DimensionMismatch {
                expected,
                actual: self.data.len(),
            });
        }
        Ok(())
    }

    /// Check if this vector contains any NaN or infinite values.
    pub fn is_valid(&self) -> bool {
        self.data.iter().all(|x| x.is_finite())
    }

    /// Normalize multiple vectors, in parallel for larger batches.
    pub fn normalize_batch(vectors: &mut [Vector]) {
        if vectors.len() > 64 {
            vectors.par_iter_mut().for_each(|vector| vector.normalize());
        } else {
            for vector in vectors {
                vector.normalize();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_norm() {
        let v = Vector::new(vec![3.0, 4.0]);
        assert!((v.norm() - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_unit_length() {
        let mut v = Vector::new(vec![0.7, 0.7]);
        v.normalize();
        assert!((v.norm() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_zero_vector_unchanged() {
        let mut v = Vector::new(vec![0.0, 0.0]);
        v.normalize();
        assert_eq!(v.data, vec![0.0, 0.0]);
    }

    #[test]
    fn test_validate_dimension() {
        let v = Vector::new(vec![1.0, 2.0, 3.0]);
        assert!(v.validate_dimension(3).is_ok());
        assert!(matches!(
            v.validate_dimension(4),
            Err(LoupeError::DimensionMismatch {
                expected: 4,
                actual: 3
            })
        ));
    }

    #[test]
    fn test_is_valid() {
        assert!(Vector::new(vec![1.0, -2.5]).is_valid());
        assert!(!Vector::new(vec![1.0, f32::NAN]).is_valid());
        assert!(!Vector::new(vec![f32::INFINITY]).is_valid());
    }

    #[test]
    fn test_normalize_batch() {
        let mut vectors = vec![Vector::new(vec![2.0, 0.0]), Vector::new(vec![0.0, 5.0])];
        Vector::normalize_batch(&mut vectors);
        for v in &vectors {
            assert!((v.norm() - 1.0).abs() < 1e-6);
        }
    }
}
