//! Cosine similarity between embedding vectors.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SimilarityError {
    #[error("embedding dimension mismatch ({left} vs {right})")]
    DimensionMismatch { left: usize, right: usize },
}

/// Cosine similarity in [-1, 1].
///
/// Formula: cos(θ) = (A · B) / (||A|| ||B||)
///
/// Returns 0.0 when either vector has zero norm or a component is not finite.
/// Vectors of different length are an error rather than a silently
/// meaningless score.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f64, SimilarityError> {
    if a.len() != b.len() {
        return Err(SimilarityError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let (dot, norm_a, norm_b) = a.iter().zip(b).fold(
        (0.0_f64, 0.0_f64, 0.0_f64),
        |(dot, na, nb), (&x, &y)| {
            let (x, y) = (f64::from(x), f64::from(y));
            (dot + x * y, na + x * x, nb + y * y)
        },
    );

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }

    let similarity = dot / (norm_a.sqrt() * norm_b.sqrt());
    if !similarity.is_finite() {
        return Ok(0.0);
    }
    Ok(similarity.clamp(-1.0, 1.0))
}

/// True when every component is zero (or the vector is empty).
pub fn is_zero_vector(v: &[f32]) -> bool {
    v.iter().all(|x| *x == 0.0)
}

/// A vector worth scoring with: `dimension` finite components, not all zero.
pub fn is_usable_embedding(v: &[f32], dimension: usize) -> bool {
    v.len() == dimension && v.iter().all(|x| x.is_finite()) && !is_zero_vector(v)
}
