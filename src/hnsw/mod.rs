//! Hierarchical Navigable Small World (HNSW) graphs.
//!
//! An HNSW graph stacks proximity graphs of geometrically shrinking size:
//! every node lives on level 0, and each node climbs to higher levels with
//! probability set by the fanout. A query descends from the single entry
//! node on the top level, narrowing its entry point level by level, then
//! runs a bounded beam search on level 0. Construction inserts one vector
//! at a time with the same search machinery, linking each new node to a
//! *diverse* subset of its beam: a candidate is rejected when it sits
//! closer to an already-chosen neighbor than to the new node. That rule
//! keeps node degree bounded without collapsing the graph into
//! mutually-close clusters.
//!
//! Reference: Malkov & Yashunin (2018), "Efficient and robust approximate
//! nearest neighbor search using Hierarchical Navigable Small World graphs".

mod builder;
mod graph;
mod neighbors;
mod search;

pub use builder::{BuilderParams, GraphBuilder};
pub use graph::OnHeapGraph;
pub use neighbors::{NeighborArray, NeighborQueue};
pub use search::GraphSearcher;
