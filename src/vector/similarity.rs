//! Similarity math shared by the index and its tests.

use super::Vector;

/// Inner product of two equally sized slices.
#[inline]
pub fn dot_product(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Cosine similarity of two vectors.
///
/// Equals the inner product when both inputs are already L2-normalized,
/// which is how the index stores its rows; this full form is used where
/// normalization cannot be assumed.
pub fn cosine_similarity(a: &Vector, b: &Vector) -> f32 {
    let denom = a.norm() * b.norm();
    if denom > 0.0 {
        dot_product(&a.data, &b.data) / denom
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dot_product() {
        assert_eq!(dot_product(&[1.0, 2.0], &[3.0, 4.0]), 11.0);
    }

    #[test]
    fn test_cosine_similarity_orthogonal() {
        let a = Vector::new(vec![1.0, 0.0]);
        let b = Vector::new(vec![0.0, 1.0]);
        assert!((cosine_similarity(&a, &b)).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_matches_normalized_dot() {
        let a = Vector::new(vec![1.0, 0.0]);
        let b = Vector::new(vec![0.7, 0.7]);
        let cosine = cosine_similarity(&a, &b);
        let dot = dot_product(&a.normalized().data, &b.normalized().data);
        assert!((cosine - dot).abs() < 1e-6);
        assert!((cosine - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-3);
    }

    #[test]
    fn test_cosine_similarity_zero_vector() {
        let a = Vector::new(vec![0.0, 0.0]);
        let b = Vector::new(vec![1.0, 0.0]);
        assert_eq!(cosine_similarity(&a, &b), 0.0);
    }
}
