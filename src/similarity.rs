//! Vector similarity scoring.
//!
//! Every ordering decision in the crate (beam admission, frontier
//! expansion, diversity checks) goes through a [`Similarity`] score plus
//! its direction flag. Distance-like functions report lower scores for
//! closer vectors ([`Similarity::is_reversed`] is true); similarity-like
//! functions report higher scores for closer vectors. Nothing outside this
//! module and the bounds checker reasons about the sign directly.

use serde::{Deserialize, Serialize};

const NORM_EPSILON: f32 = 1e-9;

/// Similarity function used to score vectors against each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Similarity {
    /// Squared Euclidean (L2) distance. Lower scores are closer.
    Euclidean,
    /// Dot product. Higher scores are closer; rankings are only meaningful
    /// for unit-norm inputs.
    DotProduct,
    /// Cosine similarity. Higher scores are closer; computes norms, so
    /// inputs need not be normalized.
    Cosine,
}

impl Similarity {
    /// Score two vectors against each other.
    #[inline]
    #[must_use]
    pub fn compare(self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            Similarity::Euclidean => l2_squared(a, b),
            Similarity::DotProduct => dot(a, b),
            Similarity::Cosine => cosine(a, b),
        }
    }

    /// Whether lower scores represent closer vectors.
    #[inline]
    #[must_use]
    pub fn is_reversed(self) -> bool {
        matches!(self, Similarity::Euclidean)
    }
}

/// Dot product of two vectors.
#[inline]
#[must_use]
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Squared L2 distance between two vectors.
#[inline]
#[must_use]
pub fn l2_squared(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

/// Cosine similarity between two vectors. Zero-norm inputs score 0.
#[inline]
#[must_use]
pub fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let d = dot(a, b);
    let na = norm(a);
    let nb = norm(b);
    if na > NORM_EPSILON && nb > NORM_EPSILON {
        d / (na * nb)
    } else {
        0.0
    }
}

/// L2 norm of a vector.
#[inline]
#[must_use]
pub fn norm(v: &[f32]) -> f32 {
    dot(v, v).sqrt()
}

/// Normalize a vector to unit L2 norm. Zero vectors come back unchanged.
#[must_use]
pub fn normalize(v: &[f32]) -> Vec<f32> {
    let n = norm(v);
    if n < NORM_EPSILON {
        v.to_vec()
    } else {
        v.iter().map(|x| x / n).collect()
    }
}
