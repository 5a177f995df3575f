//! smallworld: incremental construction and search of Hierarchical
//! Navigable Small World (HNSW) graphs.
//!
//! The crate builds an approximate-nearest-neighbor index over
//! fixed-dimension `f32` vectors, one vector at a time, and answers queries
//! with greedy multi-level beam search. Vectors stay in their
//! [`VectorSource`]; the graph stores only node ordinals and scores.
//! Persistence, compression, and the surrounding index lifecycle are out of
//! scope; downstream consumers read the finished [`OnHeapGraph`] through
//! its accessors.
//!
//! # Usage
//!
//! ```rust
//! use smallworld::{
//!     BuilderParams, DenseVectors, GraphBuilder, GraphSearcher, Similarity, VectorSource,
//! };
//!
//! # fn main() -> smallworld::Result<()> {
//! let vectors = DenseVectors::from_rows(&[
//!     vec![0.0, 0.0],
//!     vec![1.0, 0.0],
//!     vec![0.0, 1.0],
//! ])?;
//!
//! let builder = GraphBuilder::new(&vectors, Similarity::Euclidean, BuilderParams::default())?;
//! let graph = builder.build(&mut vectors.random_access())?;
//!
//! let mut searcher = GraphSearcher::new(Similarity::Euclidean, 10);
//! let mut results = searcher.search(&[0.9, 0.1], 2, &mut vectors.random_access(), &graph)?;
//! while let Some((node, score)) = results.pop() {
//!     println!("node {node} scored {score}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Builds are deterministic: the same vectors, parameters, and seed always
//! produce the same graph.

pub mod error;
pub mod hnsw;
pub mod similarity;
pub mod vectors;

pub use error::{GraphError, Result};
pub use hnsw::{
    BuilderParams, GraphBuilder, GraphSearcher, NeighborArray, NeighborQueue, OnHeapGraph,
};
pub use similarity::Similarity;
pub use vectors::{DenseVectors, DenseVectorValues, VectorSource, VectorValues};
