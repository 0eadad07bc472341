//! The validated embedding vector and cosine similarity.
//!
//! Embeddings are fixed-length `f32` vectors produced by the (opaque)
//! frame encoder. Construction validates that every component is finite,
//! so NaN and infinity never reach the stores or the confidence
//! computation. Dimension agreement between two vectors is checked at the
//! point of comparison.

use crate::error::EmbeddingError;

/// Denominator guard for norms.
///
/// An all-zero vector has norm 0; with this guard its cosine similarity
/// against anything is 0.0 rather than a division error.
pub const NORM_EPSILON: f32 = 1e-8;

/// A fixed-length visual embedding with finite components.
#[derive(Clone, Debug, PartialEq)]
pub struct Embedding {
    components: Vec<f32>,
}

impl Embedding {
    /// Validate and wrap a raw component vector.
    ///
    /// # Errors
    ///
    /// Returns [`EmbeddingError::Empty`] for a zero-length vector, or
    /// [`EmbeddingError::NonFinite`] with the first offending index if any
    /// component is NaN or infinite.
    pub fn from_components(components: Vec<f32>) -> Result<Self, EmbeddingError> {
        if components.is_empty() {
            return Err(EmbeddingError::Empty);
        }
        if let Some(index) = components.iter().position(|c| !c.is_finite()) {
            return Err(EmbeddingError::NonFinite { index });
        }
        Ok(Self { components })
    }

    /// An all-zero embedding of the given dimension.
    ///
    /// Used as a placeholder before the encoder has run. Its similarity
    /// against any vector is 0.0.
    ///
    /// # Errors
    ///
    /// Returns [`EmbeddingError::Empty`] when `dim` is 0.
    pub fn zeros(dim: usize) -> Result<Self, EmbeddingError> {
        Self::from_components(vec![0.0; dim])
    }

    /// Number of components.
    pub fn dim(&self) -> usize {
        self.components.len()
    }

    /// Read-only view of the components.
    pub fn components(&self) -> &[f32] {
        &self.components
    }

    /// Euclidean norm.
    pub fn l2_norm(&self) -> f32 {
        self.components.iter().map(|c| c * c).sum::<f32>().sqrt()
    }

    /// A unit-norm copy of this embedding.
    ///
    /// The all-zero vector maps to itself (the norm denominator is
    /// guarded by [`NORM_EPSILON`]).
    pub fn normalized(&self) -> Self {
        let inv = 1.0 / (self.l2_norm() + NORM_EPSILON);
        Self {
            components: self.components.iter().map(|c| c * inv).collect(),
        }
    }

    /// Cosine similarity to `other`, clamped to `[-1, 1]`.
    ///
    /// `similarity(a, b) = dot(a, b) / (norm(a) * norm(b) + epsilon)`.
    /// A zero vector on either side yields 0.0.
    ///
    /// # Errors
    ///
    /// Returns [`EmbeddingError::DimensionMismatch`] when the dimensions
    /// differ.
    pub fn cosine(&self, other: &Self) -> Result<f32, EmbeddingError> {
        if self.dim() != other.dim() {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dim(),
                got: other.dim(),
            });
        }
        let dot: f32 = self
            .components
            .iter()
            .zip(&other.components)
            .map(|(a, b)| a * b)
            .sum();
        let denom = self.l2_norm() * other.l2_norm() + NORM_EPSILON;
        Ok((dot / denom).clamp(-1.0, 1.0))
    }

    /// Check this embedding against an expected dimension.
    ///
    /// # Errors
    ///
    /// Returns [`EmbeddingError::DimensionMismatch`] on disagreement.
    pub fn check_dim(&self, expected: usize) -> Result<(), EmbeddingError> {
        if self.dim() != expected {
            return Err(EmbeddingError::DimensionMismatch {
                expected,
                got: self.dim(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn rejects_empty() {
        assert_eq!(
            Embedding::from_components(vec![]),
            Err(EmbeddingError::Empty)
        );
    }

    #[test]
    fn rejects_nan_with_index() {
        let result = Embedding::from_components(vec![1.0, f32::NAN, 0.5]);
        assert_eq!(result, Err(EmbeddingError::NonFinite { index: 1 }));
    }

    #[test]
    fn rejects_infinity() {
        let result = Embedding::from_components(vec![f32::INFINITY]);
        assert_eq!(result, Err(EmbeddingError::NonFinite { index: 0 }));
    }

    #[test]
    fn zero_vector_similarity_is_zero() {
        let zero = Embedding::zeros(4).unwrap();
        let unit = Embedding::from_components(vec![1.0, 0.0, 0.0, 0.0]).unwrap();
        assert_eq!(zero.cosine(&unit).unwrap(), 0.0);
        assert_eq!(zero.cosine(&zero).unwrap(), 0.0);
    }

    #[test]
    fn identical_vectors_score_one() {
        let v = Embedding::from_components(vec![3.0, 4.0]).unwrap();
        let sim = v.cosine(&v).unwrap();
        assert!((sim - 1.0).abs() < 1e-5, "self-similarity {sim} != 1");
    }

    #[test]
    fn opposite_vectors_score_minus_one() {
        let a = Embedding::from_components(vec![1.0, 2.0]).unwrap();
        let b = Embedding::from_components(vec![-1.0, -2.0]).unwrap();
        let sim = a.cosine(&b).unwrap();
        assert!((sim + 1.0).abs() < 1e-5, "anti-similarity {sim} != -1");
    }

    #[test]
    fn dimension_mismatch_is_an_error() {
        let a = Embedding::zeros(3).unwrap();
        let b = Embedding::zeros(4).unwrap();
        assert_eq!(
            a.cosine(&b),
            Err(EmbeddingError::DimensionMismatch {
                expected: 3,
                got: 4
            })
        );
        assert!(a.check_dim(3).is_ok());
        assert!(a.check_dim(4).is_err());
    }

    #[test]
    fn normalized_has_unit_norm() {
        let v = Embedding::from_components(vec![3.0, 4.0]).unwrap();
        let norm = v.normalized().l2_norm();
        assert!((norm - 1.0).abs() < 1e-4, "normalized norm {norm} != 1");
    }

    fn vec_pair() -> impl Strategy<Value = (Vec<f32>, Vec<f32>)> {
        (1usize..32).prop_flat_map(|n| {
            (
                proptest::collection::vec(-1e3f32..1e3f32, n),
                proptest::collection::vec(-1e3f32..1e3f32, n),
            )
        })
    }

    proptest! {
        #[test]
        fn cosine_is_symmetric((a, b) in vec_pair()) {
            let ea = Embedding::from_components(a).unwrap();
            let eb = Embedding::from_components(b).unwrap();
            prop_assert_eq!(ea.cosine(&eb).unwrap(), eb.cosine(&ea).unwrap());
        }

        #[test]
        fn cosine_stays_clamped(
            v in proptest::collection::vec(-1e6f32..1e6f32, 1..32),
        ) {
            let e = Embedding::from_components(v).unwrap();
            let sim = e.cosine(&e).unwrap();
            prop_assert!((-1.0..=1.0).contains(&sim));
        }
    }
}
