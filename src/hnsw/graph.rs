//! The in-memory multi-level graph.

use super::neighbors::NeighborArray;

/// An HNSW graph: the artifact [`GraphBuilder`] constructs and the structure
/// [`GraphSearcher`] reads.
///
/// Level 0 contains every node and is indexed directly by ordinal. Upper
/// levels keep their member ordinals in ascending order (nodes are inserted
/// in ordinal order) and are indexed by binary search. The single entry
/// node always sits on the highest populated level. Node 0 is seeded onto
/// every initial level at construction; it is the implicit first node and is
/// never inserted explicitly.
///
/// [`GraphBuilder`]: super::GraphBuilder
/// [`GraphSearcher`]: super::GraphSearcher
#[derive(Debug)]
pub struct OnHeapGraph {
    max_conn: usize,
    entry_node: u32,
    /// Member ordinals per level; the level-0 list stays empty because level
    /// 0 holds every node.
    nodes_by_level: Vec<Vec<u32>>,
    /// One adjacency list per (level, member), parallel to `nodes_by_level`
    /// above level 0 and indexed by ordinal at level 0.
    graph: Vec<Vec<NeighborArray>>,
}

impl OnHeapGraph {
    /// Seeds the graph with node 0 present on every level up to
    /// `level_of_first_node`.
    pub(crate) fn new(max_conn: usize, level_of_first_node: usize) -> Self {
        let num_levels = level_of_first_node + 1;
        let mut nodes_by_level = Vec::with_capacity(num_levels);
        let mut graph = Vec::with_capacity(num_levels);
        nodes_by_level.push(Vec::new());
        graph.push(vec![NeighborArray::with_capacity(max_conn + 1)]);
        for _ in 1..num_levels {
            nodes_by_level.push(vec![0]);
            graph.push(vec![NeighborArray::with_capacity(max_conn + 1)]);
        }
        OnHeapGraph {
            max_conn,
            entry_node: 0,
            nodes_by_level,
            graph,
        }
    }

    /// Total number of nodes; every node lives on level 0.
    #[must_use]
    pub fn size(&self) -> usize {
        self.graph[0].len()
    }

    /// Number of populated levels.
    #[must_use]
    pub fn num_levels(&self) -> usize {
        self.graph.len()
    }

    /// The node every top-level search starts from.
    #[must_use]
    pub fn entry_node(&self) -> u32 {
        self.entry_node
    }

    /// Registers `node` on `level`. When `level` tops every existing level
    /// the graph grows and `node` becomes the new entry point.
    pub(crate) fn add_node(&mut self, level: usize, node: u32) {
        if level > 0 {
            if level >= self.num_levels() {
                for _ in self.num_levels()..=level {
                    self.nodes_by_level.push(Vec::new());
                    self.graph.push(Vec::new());
                }
                self.entry_node = node;
            }
            self.nodes_by_level[level].push(node);
        }
        self.graph[level].push(NeighborArray::with_capacity(self.max_conn + 1));
    }

    /// Read access to the adjacency list of `node` at `level`.
    ///
    /// # Panics
    ///
    /// Panics if `node` is not present on `level`. That is a programming
    /// error, not a runtime condition.
    #[must_use]
    pub fn neighbors(&self, level: usize, node: u32) -> &NeighborArray {
        let idx = self.index_of(level, node);
        &self.graph[level][idx]
    }

    pub(crate) fn neighbors_mut(&mut self, level: usize, node: u32) -> &mut NeighborArray {
        let idx = self.index_of(level, node);
        &mut self.graph[level][idx]
    }

    /// Ordinals present on `level`, ascending.
    pub fn nodes_on_level(&self, level: usize) -> impl Iterator<Item = u32> + '_ {
        let all = if level == 0 { 0..self.size() as u32 } else { 0..0 };
        let members: &[u32] = if level == 0 {
            &[]
        } else {
            &self.nodes_by_level[level]
        };
        all.chain(members.iter().copied())
    }

    fn index_of(&self, level: usize, node: u32) -> usize {
        if level == 0 {
            node as usize
        } else {
            match self.nodes_by_level[level].binary_search(&node) {
                Ok(idx) => idx,
                Err(_) => panic!("node {node} is not present on level {level}"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_node_seeds_every_initial_level() {
        let graph = OnHeapGraph::new(4, 2);
        assert_eq!(graph.num_levels(), 3);
        assert_eq!(graph.size(), 1);
        assert_eq!(graph.entry_node(), 0);
        for level in 0..3 {
            assert_eq!(graph.nodes_on_level(level).collect::<Vec<_>>(), vec![0]);
            assert!(graph.neighbors(level, 0).is_empty());
        }
    }

    #[test]
    fn node_topping_the_graph_becomes_entry_point() {
        let mut graph = OnHeapGraph::new(4, 0);
        graph.add_node(0, 1);
        assert_eq!(graph.entry_node(), 0);

        // Node 2 introduces levels 1 and 2, top level first.
        graph.add_node(2, 2);
        graph.add_node(1, 2);
        graph.add_node(0, 2);
        assert_eq!(graph.num_levels(), 3);
        assert_eq!(graph.entry_node(), 2);
        assert_eq!(graph.nodes_on_level(2).collect::<Vec<_>>(), vec![2]);
        assert_eq!(graph.nodes_on_level(1).collect::<Vec<_>>(), vec![2]);
        assert_eq!(graph.nodes_on_level(0).collect::<Vec<_>>(), vec![0, 1, 2]);
    }
}
