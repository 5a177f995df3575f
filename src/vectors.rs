//! Random-access vector storage.
//!
//! The graph never copies vectors; it addresses them by ordinal through the
//! [`VectorValues`] contract and stores only ordinals and scores. A
//! [`VectorSource`] hands out structurally independent views so that the
//! build path and the diversity-comparison path never share one view's
//! cursor state.

use std::sync::Arc;

use crate::error::{GraphError, Result};

/// Random-access view over ordinal-addressed, fixed-dimension vectors.
///
/// A view may carry internal cursor or buffer state, which is why
/// [`vector_value`](VectorValues::vector_value) takes `&mut self`. Reads
/// must be deterministic and side-effect-free for a given ordinal.
pub trait VectorValues {
    /// Number of vectors in the underlying store.
    fn size(&self) -> usize;

    /// Dimension of every stored vector.
    fn dimension(&self) -> usize;

    /// The vector stored at `ord`, for `ord` in `[0, size())`.
    ///
    /// I/O failures in a backing store are propagated to the caller
    /// unmodified.
    fn vector_value(&mut self, ord: usize) -> Result<&[f32]>;
}

/// A dataset that can hand out independent [`VectorValues`] views.
pub trait VectorSource {
    /// The view type produced by [`random_access`](VectorSource::random_access).
    type View: VectorValues;

    /// Returns a fresh view with its own cursor state. Views from separate
    /// calls must be safe to use independently of each other.
    fn random_access(&self) -> Self::View;
}

/// In-memory vector store: one flat `f32` arena, `dimension` floats per
/// vector.
#[derive(Debug, Clone)]
pub struct DenseVectors {
    data: Arc<[f32]>,
    dimension: usize,
}

impl DenseVectors {
    /// Wraps a flat arena holding `data.len() / dimension` vectors.
    pub fn new(data: Vec<f32>, dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(GraphError::InvalidParameter(
                "dimension must be positive".to_string(),
            ));
        }
        if data.len() % dimension != 0 {
            return Err(GraphError::InvalidParameter(format!(
                "arena length {} is not a multiple of dimension {}",
                data.len(),
                dimension
            )));
        }
        Ok(DenseVectors {
            data: data.into(),
            dimension,
        })
    }

    /// Builds an arena from row vectors, which must all share one dimension.
    pub fn from_rows(rows: &[Vec<f32>]) -> Result<Self> {
        let dimension = rows.first().map_or(0, Vec::len);
        if dimension == 0 {
            return Err(GraphError::InvalidParameter(
                "rows must be non-empty vectors".to_string(),
            ));
        }
        let mut data = Vec::with_capacity(rows.len() * dimension);
        for row in rows {
            if row.len() != dimension {
                return Err(GraphError::InvalidParameter(format!(
                    "row dimension {} does not match {}",
                    row.len(),
                    dimension
                )));
            }
            data.extend_from_slice(row);
        }
        Self::new(data, dimension)
    }

    /// Number of stored vectors.
    #[must_use]
    pub fn size(&self) -> usize {
        self.data.len() / self.dimension
    }

    /// Dimension of every stored vector.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }
}

impl VectorSource for DenseVectors {
    type View = DenseVectorValues;

    fn random_access(&self) -> DenseVectorValues {
        DenseVectorValues {
            data: Arc::clone(&self.data),
            dimension: self.dimension,
        }
    }
}

/// Read view over a [`DenseVectors`] arena.
#[derive(Debug)]
pub struct DenseVectorValues {
    data: Arc<[f32]>,
    dimension: usize,
}

impl VectorValues for DenseVectorValues {
    fn size(&self) -> usize {
        self.data.len() / self.dimension
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn vector_value(&mut self, ord: usize) -> Result<&[f32]> {
        if ord >= self.size() {
            return Err(GraphError::OrdinalOutOfBounds {
                ord,
                size: self.size(),
            });
        }
        let start = ord * self.dimension;
        Ok(&self.data[start..start + self.dimension])
    }
}
