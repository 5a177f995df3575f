//! Error types for graph construction and search.

use thiserror::Error;

/// Errors that can occur while building or searching an HNSW graph.
#[derive(Debug, Error)]
pub enum GraphError {
    /// A construction parameter is out of range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The vector source holds no vectors, so there is no node 0 to seed the
    /// graph with.
    #[error("vector source is empty")]
    EmptyVectorSource,

    /// An ordinal fell outside the vector source.
    #[error("ordinal {ord} out of bounds for vector source of size {size}")]
    OrdinalOutOfBounds { ord: usize, size: usize },

    /// An I/O failure surfaced by a vector source, propagated unmodified.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type for graph operations.
pub type Result<T> = std::result::Result<T, GraphError>;
