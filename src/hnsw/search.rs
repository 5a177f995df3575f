//! Greedy beam search over graph levels.

use crate::error::Result;
use crate::similarity::Similarity;
use crate::vectors::VectorValues;

use super::graph::OnHeapGraph;
use super::neighbors::{BoundsChecker, NeighborQueue};

/// Generation-stamped visited set. Each `clear` bumps a generation counter
/// instead of zeroing the array, so repeated searches pay O(1) amortized; a
/// full memset happens only when the `u16` counter wraps.
#[derive(Debug)]
struct VisitedSet {
    stamp: Vec<u16>,
    generation: u16,
}

impl VisitedSet {
    fn new(capacity: usize) -> Self {
        VisitedSet {
            stamp: vec![0; capacity],
            generation: 1,
        }
    }

    fn clear(&mut self) {
        if self.generation == u16::MAX {
            self.stamp.fill(0);
            self.generation = 1;
        } else {
            self.generation += 1;
        }
    }

    fn ensure_capacity(&mut self, capacity: usize) {
        if capacity > self.stamp.len() {
            self.stamp.resize(capacity, 0);
        }
    }

    /// Marks `node` visited; true if it was not visited before.
    #[inline]
    fn insert(&mut self, node: u32) -> bool {
        let slot = &mut self.stamp[node as usize];
        if *slot == self.generation {
            false
        } else {
            *slot = self.generation;
            true
        }
    }
}

/// Executes bounded beam search over one level of a graph.
///
/// A searcher owns reusable scratch state (frontier queue and visited set)
/// and is cheap to call repeatedly. It never mutates the graph.
#[derive(Debug)]
pub struct GraphSearcher {
    similarity: Similarity,
    candidates: NeighborQueue,
    visited: VisitedSet,
}

impl GraphSearcher {
    /// `beam_width` pre-sizes the frontier queue; searches may use any
    /// `top_k` regardless.
    #[must_use]
    pub fn new(similarity: Similarity, beam_width: usize) -> Self {
        GraphSearcher {
            similarity,
            candidates: NeighborQueue::new(beam_width, !similarity.is_reversed()),
            visited: VisitedSet::new(0),
        }
    }

    /// Greedy beam search restricted to `level`, starting from
    /// `entry_points`.
    ///
    /// Expands the best unvisited frontier candidate until no remaining
    /// candidate can improve the beam, then returns the beam: at most
    /// `top_k` entries, popping worst-first. Safe for `top_k = 1` (descent)
    /// as well as full beam widths.
    pub fn search_level<V: VectorValues>(
        &mut self,
        query: &[f32],
        top_k: usize,
        level: usize,
        entry_points: &[u32],
        vectors: &mut V,
        graph: &OnHeapGraph,
    ) -> Result<NeighborQueue> {
        let mut results = NeighborQueue::new(top_k, self.similarity.is_reversed());
        self.candidates.clear();
        self.visited.ensure_capacity(graph.size());
        self.visited.clear();

        for &ep in entry_points {
            if self.visited.insert(ep) {
                let score = self
                    .similarity
                    .compare(query, vectors.vector_value(ep as usize)?);
                self.candidates.add(ep, score);
                results.add(ep, score);
            }
        }

        // Reject whatever cannot beat the worst entry of a full beam.
        let mut bound = BoundsChecker::new(self.similarity.is_reversed());
        if let Some(worst) = results.top_score() {
            bound.set(worst);
        }

        while let Some((node, score)) = self.candidates.pop() {
            if results.size() >= top_k && bound.check(score) {
                break;
            }
            let neighbors = graph.neighbors(level, node);
            for i in 0..neighbors.size() {
                let friend = neighbors.node(i);
                if !self.visited.insert(friend) {
                    continue;
                }
                let friend_score = self
                    .similarity
                    .compare(query, vectors.vector_value(friend as usize)?);
                if results.size() < top_k || !bound.check(friend_score) {
                    self.candidates.add(friend, friend_score);
                    if results.insert_with_overflow(friend, friend_score) {
                        if let Some(worst) = results.top_score() {
                            bound.set(worst);
                        }
                    }
                }
            }
        }

        while results.size() > top_k {
            results.pop();
        }
        Ok(results)
    }

    /// Full multi-level query: descend from the entry node one level at a
    /// time with a beam of one, then run a `top_k` beam over level 0.
    pub fn search<V: VectorValues>(
        &mut self,
        query: &[f32],
        top_k: usize,
        vectors: &mut V,
        graph: &OnHeapGraph,
    ) -> Result<NeighborQueue> {
        let mut eps = [graph.entry_node()];
        for level in (1..graph.num_levels()).rev() {
            let mut best = self.search_level(query, 1, level, &eps, vectors, graph)?;
            if let Some((nearest, _)) = best.pop() {
                eps[0] = nearest;
            }
        }
        self.search_level(query, top_k, 0, &eps, vectors, graph)
    }
}
