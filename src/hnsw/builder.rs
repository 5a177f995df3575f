//! Incremental graph construction.

use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use smallvec::{smallvec, SmallVec};
use tracing::debug;

use crate::error::{GraphError, Result};
use crate::similarity::Similarity;
use crate::vectors::{VectorSource, VectorValues};

use super::graph::OnHeapGraph;
use super::neighbors::{BoundsChecker, NeighborArray, NeighborQueue};
use super::search::GraphSearcher;

/// How often the build loop reports progress, in inserted nodes.
const PROGRESS_INTERVAL: usize = 10_000;

/// Entry points carried from one level's search down to the next.
type EntryPoints = SmallVec<[u32; 8]>;

/// Construction parameters for [`GraphBuilder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuilderParams {
    /// Target degree per node per level (the graph fanout).
    pub max_conn: usize,
    /// Beam width for the insertion-time searches.
    pub beam_width: usize,
    /// Seed for level assignment. Equal seeds give identical builds.
    pub seed: u64,
}

impl Default for BuilderParams {
    fn default() -> Self {
        BuilderParams {
            max_conn: 16,
            beam_width: 100,
            seed: 42,
        }
    }
}

/// Builds an HNSW graph by inserting one vector at a time.
///
/// The builder is the sole writer of the graph; the searches it issues
/// during insertion are read-only. It holds two independent vector views:
/// one scores candidates against the vector being inserted, the other reads
/// candidate neighbors during diversity comparisons, so one view's cursor
/// state is never shared between the two paths.
///
/// Insertion of a node runs three strictly ordered phases:
///
/// 1. draw a random level; a node that tops every existing level occupies
///    the new levels alone and becomes the entry point,
/// 2. descend through the levels above the node's own, narrowing the entry
///    point with a beam of one,
/// 3. at and below the node's level, search with the full beam, register the
///    node, and link a diverse subset of the beam in both directions,
///    pruning any neighbor pushed past `max_conn`.
pub struct GraphBuilder<V: VectorValues> {
    max_conn: usize,
    beam_width: usize,
    /// Normalization constant for level assignment.
    ml: f64,
    similarity: Similarity,
    rng: StdRng,
    bound: BoundsChecker,
    scratch: NeighborArray,
    vector_values: V,
    build_vectors: V,
    searcher: GraphSearcher,
    graph: OnHeapGraph,
}

impl<V: VectorValues> GraphBuilder<V> {
    /// Creates a builder over `source`.
    ///
    /// Two independent views are taken from `source` here; the view passed
    /// later to [`build`](GraphBuilder::build) must be a third one (the
    /// borrow checker rules out handing the builder's own views back to it).
    pub fn new<S>(source: &S, similarity: Similarity, params: BuilderParams) -> Result<Self>
    where
        S: VectorSource<View = V>,
    {
        let BuilderParams {
            max_conn,
            beam_width,
            seed,
        } = params;
        if max_conn == 0 {
            return Err(GraphError::InvalidParameter(
                "max_conn must be positive".to_string(),
            ));
        }
        if beam_width == 0 {
            return Err(GraphError::InvalidParameter(
                "beam_width must be positive".to_string(),
            ));
        }
        let vector_values = source.random_access();
        let build_vectors = source.random_access();
        if vector_values.size() == 0 {
            return Err(GraphError::EmptyVectorSource);
        }
        // ln(1) is zero, which would push every level to infinity; a fanout
        // of one uses the fanout-two normalization constant instead.
        let ml = 1.0 / f64::ln(max_conn.max(2) as f64);
        let mut rng = StdRng::seed_from_u64(seed);
        let level_of_first_node = random_graph_level(ml, &mut rng);
        Ok(GraphBuilder {
            max_conn,
            beam_width,
            ml,
            similarity,
            rng,
            bound: BoundsChecker::new(similarity.is_reversed()),
            scratch: NeighborArray::with_capacity(beam_width.max(max_conn + 1)),
            vector_values,
            build_vectors,
            searcher: GraphSearcher::new(similarity, beam_width),
            graph: OnHeapGraph::new(max_conn, level_of_first_node),
        })
    }

    /// Reads every vector from `vectors` in ordinal order, links each one
    /// into the graph, and returns the finished graph.
    ///
    /// Node 0 is present from construction, so insertion starts at
    /// ordinal 1. `vectors` must be an independent view over the same data
    /// the builder was constructed over.
    pub fn build(mut self, vectors: &mut V) -> Result<OnHeapGraph> {
        let size = vectors.size();
        debug!("building HNSW graph from {size} vectors");
        let start = Instant::now();
        let mut batch_start = start;
        for ord in 1..size {
            let value = vectors.vector_value(ord)?;
            self.add_graph_node(ord as u32, value)?;
            if ord % PROGRESS_INTERVAL == 0 {
                let now = Instant::now();
                debug!(
                    "built {ord} in {}/{} ms",
                    now.duration_since(batch_start).as_millis(),
                    now.duration_since(start).as_millis()
                );
                batch_start = now;
            }
        }
        Ok(self.graph)
    }

    /// Inserts one node with the given vector value.
    fn add_graph_node(&mut self, node: u32, value: &[f32]) -> Result<()> {
        let node_level = random_graph_level(self.ml, &mut self.rng);
        let cur_max_level = self.graph.num_levels() - 1;
        let mut eps: EntryPoints = smallvec![self.graph.entry_node()];

        // A node that tops every existing level occupies the new levels
        // alone and becomes the entry point.
        for level in ((cur_max_level + 1)..=node_level).rev() {
            self.graph.add_node(level, node);
        }

        // Descend through the levels above the node's own with a beam of
        // one. Nothing is linked here; only the entry point narrows.
        for level in ((node_level + 1)..=cur_max_level).rev() {
            let mut best = self.searcher.search_level(
                value,
                1,
                level,
                &eps,
                &mut self.vector_values,
                &self.graph,
            )?;
            if let Some((nearest, _)) = best.pop() {
                eps = smallvec![nearest];
            }
        }

        // At and below the node's level: full-beam search, then link.
        for level in (0..=node_level.min(cur_max_level)).rev() {
            let candidates = self.searcher.search_level(
                value,
                self.beam_width,
                level,
                &eps,
                &mut self.vector_values,
                &self.graph,
            )?;
            eps = SmallVec::from_vec(candidates.nodes());
            self.graph.add_node(level, node);
            self.add_diverse_neighbors(level, node, candidates)?;
        }
        Ok(())
    }

    /// Selects a diverse subset of `candidates` as the new node's neighbors,
    /// links them in both directions, and prunes any neighbor list pushed
    /// past `max_conn`.
    fn add_diverse_neighbors(
        &mut self,
        level: usize,
        node: u32,
        candidates: NeighborQueue,
    ) -> Result<()> {
        self.pop_to_scratch(candidates);
        let selected = self.select_diverse()?;

        debug_assert!(
            self.graph.neighbors(level, node).is_empty(),
            "a new node has neighbors before its first linking pass"
        );
        let neighbors = self.graph.neighbors_mut(level, node);
        for i in 0..selected.size() {
            neighbors.add(selected.node(i), selected.score(i));
        }

        for i in 0..selected.size() {
            let nbr = selected.node(i);
            let nbr_neighbors = self.graph.neighbors_mut(level, nbr);
            nbr_neighbors.add(node, selected.score(i));
            if nbr_neighbors.size() > self.max_conn {
                self.diversity_update(level, nbr)?;
            }
        }
        Ok(())
    }

    /// Drains a search beam into the scratch array. Popping a beam yields
    /// worst first, so the scratch ends up ordered worst to best.
    fn pop_to_scratch(&mut self, mut candidates: NeighborQueue) {
        self.scratch.clear();
        while let Some((node, score)) = candidates.pop() {
            self.scratch.add(node, score);
        }
    }

    /// Scans the scratch candidates from best to worst, keeping each one
    /// that is closer to the new node than to every neighbor kept so far,
    /// up to `max_conn` neighbors.
    fn select_diverse(&mut self) -> Result<NeighborArray> {
        let mut selected = NeighborArray::with_capacity(self.max_conn);
        for i in (0..self.scratch.size()).rev() {
            if selected.size() >= self.max_conn {
                break;
            }
            let c_node = self.scratch.node(i);
            let c_score = self.scratch.score(i);
            if self.diversity_check(c_node, c_score, &selected)? {
                selected.add(c_node, c_score);
            }
        }
        Ok(selected)
    }

    /// Whether the candidate scores worse against every already-selected
    /// neighbor than it does against the node being linked (`score`).
    fn diversity_check(
        &mut self,
        candidate: u32,
        score: f32,
        selected: &NeighborArray,
    ) -> Result<bool> {
        self.bound.set(score);
        let candidate_vector = self.vector_values.vector_value(candidate as usize)?;
        for i in 0..selected.size() {
            let neighbor_vector = self.build_vectors.vector_value(selected.node(i) as usize)?;
            let diversity = self.similarity.compare(candidate_vector, neighbor_vector);
            if !self.bound.check(diversity) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Prunes an adjacency list holding `max_conn + 1` entries back down to
    /// `max_conn`: evict the first entry that fails a diversity check
    /// against its better-scoring entries, or fall back to a straight score
    /// contest between the worst existing entry and the newest one.
    fn diversity_update(&mut self, level: usize, node: u32) -> Result<()> {
        debug_assert_eq!(
            self.graph.neighbors(level, node).size(),
            self.max_conn + 1,
            "pruning expects exactly one entry over the bound"
        );
        let replace_point = match self.find_non_diverse(level, node)? {
            Some(i) => i,
            None => {
                // No diversity failure: the newest entry must beat the
                // worst existing one to displace it.
                let neighbors = self.graph.neighbors(level, node);
                self.bound.set(neighbors.score(0));
                if self.bound.check(neighbors.score(self.max_conn)) {
                    self.graph.neighbors_mut(level, node).remove_last();
                    return Ok(());
                }
                0
            }
        };
        self.graph
            .neighbors_mut(level, node)
            .replace_with_last(replace_point);
        Ok(())
    }

    /// Scans the adjacency list of `node` for an entry sitting closer to one
    /// of its better-scoring entries than to `node` itself; the newest entry
    /// (at the highest index) counts among the better-scoring ones.
    fn find_non_diverse(&mut self, level: usize, node: u32) -> Result<Option<usize>> {
        let size = self.graph.neighbors(level, node).size();
        for i in (0..size).rev() {
            let (nbr_node, nbr_score) = {
                let neighbors = self.graph.neighbors(level, node);
                (neighbors.node(i), neighbors.score(i))
            };
            self.bound.set(nbr_score);
            let nbr_vector = self.vector_values.vector_value(nbr_node as usize)?;
            for j in ((i + 1)..size).rev() {
                let other = self.graph.neighbors(level, node).node(j);
                let diversity = self
                    .similarity
                    .compare(nbr_vector, self.build_vectors.vector_value(other as usize)?);
                if !self.bound.check(diversity) {
                    // Entry j sits too close to entry i given i's score
                    // against the base node; evict i.
                    return Ok(Some(i));
                }
            }
        }
        Ok(None)
    }
}

/// Draws a level from the geometric-like HNSW level distribution:
/// `floor(-ln(u) * ml)` with `u` uniform in `(0, 1)`.
fn random_graph_level(ml: f64, rng: &mut StdRng) -> usize {
    let mut rand_double: f64;
    loop {
        // Zero would make the logarithm undefined; resample.
        rand_double = rng.random::<f64>();
        if rand_double != 0.0 {
            break;
        }
    }
    (-rand_double.ln() * ml) as usize
}
