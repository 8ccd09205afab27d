//! Sparse undirected adjacency graph
//!
//! The one graph container every pipeline stage shares: triangulation
//! adjacency, the input edge graph, the country graph and the re-weighted
//! distance graph are all instances. The public surface is deliberately
//! small (add edges, query neighbors, components, hop distances) so the
//! backing representation stays an implementation detail.

use std::collections::VecDeque;

/// Undirected weighted graph over dense node ids `0..n`
///
/// Edges are stored symmetrically; adding `(u, v)` makes `v` a neighbor of
/// `u` and vice versa, and repeated additions accumulate the weight.
#[derive(Debug, Clone, Default)]
pub struct AdjGraph {
    adj: Vec<Vec<(usize, f64)>>,
}

impl AdjGraph {
    /// Create a graph with `n` isolated nodes
    pub fn new(n: usize) -> Self {
        Self {
            adj: vec![Vec::new(); n],
        }
    }

    /// Build a graph from an undirected edge list
    pub fn from_edges(n: usize, edges: &[(usize, usize)]) -> Self {
        let mut g = Self::new(n);
        for &(u, v) in edges {
            g.add_edge(u, v, 1.0);
        }
        g
    }

    /// Number of nodes
    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.adj.len()
    }

    /// Add weight `w` to the undirected edge `(u, v)`
    ///
    /// Self-loops accumulate on the node's own entry (used for country
    /// self-weights).
    pub fn add_edge(&mut self, u: usize, v: usize, w: f64) {
        debug_assert!(u < self.adj.len() && v < self.adj.len());
        Self::bump(&mut self.adj[u], v, w);
        if u != v {
            Self::bump(&mut self.adj[v], u, w);
        }
    }

    fn bump(list: &mut Vec<(usize, f64)>, v: usize, w: f64) {
        match list.iter_mut().find(|(j, _)| *j == v) {
            Some(entry) => entry.1 += w,
            None => list.push((v, w)),
        }
    }

    /// Neighbors of `u` with their accumulated edge weights
    #[inline]
    pub fn neighbors(&self, u: usize) -> &[(usize, f64)] {
        &self.adj[u]
    }

    /// Weight of the edge `(u, v)`, or 0 if absent
    pub fn edge_weight(&self, u: usize, v: usize) -> f64 {
        self.adj[u]
            .iter()
            .find(|(j, _)| *j == v)
            .map(|(_, w)| *w)
            .unwrap_or(0.0)
    }

    /// Iterate every undirected edge once as `(u, v, w)` with `u <= v`
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.adj.iter().enumerate().flat_map(|(u, list)| {
            list.iter()
                .filter(move |(v, _)| u <= *v)
                .map(move |&(v, w)| (u, v, w))
        })
    }

    /// Total number of undirected edges (self-loops included)
    pub fn num_edges(&self) -> usize {
        self.edges().count()
    }

    /// Connected components
    ///
    /// Returns `(component_count, component_id_per_node)`; components are
    /// numbered in order of their lowest node id.
    pub fn connected_components(&self) -> (usize, Vec<usize>) {
        let n = self.adj.len();
        let mut comp = vec![usize::MAX; n];
        let mut ncomp = 0;
        let mut queue = VecDeque::new();
        for start in 0..n {
            if comp[start] != usize::MAX {
                continue;
            }
            comp[start] = ncomp;
            queue.push_back(start);
            while let Some(u) = queue.pop_front() {
                for &(v, _) in &self.adj[u] {
                    if comp[v] == usize::MAX {
                        comp[v] = ncomp;
                        queue.push_back(v);
                    }
                }
            }
            ncomp += 1;
        }
        (ncomp, comp)
    }

    /// Hop distance from `from` to every node (`usize::MAX` = unreachable)
    pub fn hop_distances(&self, from: usize) -> Vec<usize> {
        let n = self.adj.len();
        let mut dist = vec![usize::MAX; n];
        let mut queue = VecDeque::new();
        dist[from] = 0;
        queue.push_back(from);
        while let Some(u) = queue.pop_front() {
            for &(v, _) in &self.adj[u] {
                if v != u && dist[v] == usize::MAX {
                    dist[v] = dist[u] + 1;
                    queue.push_back(v);
                }
            }
        }
        dist
    }

    /// All-pairs hop-distance matrix
    ///
    /// Unreachable pairs get `n` (one more than any possible path length),
    /// so the matrix stays usable as a dissimilarity measure.
    pub fn distance_matrix(&self) -> Vec<Vec<usize>> {
        let n = self.adj.len();
        (0..n)
            .map(|i| {
                self.hop_distances(i)
                    .into_iter()
                    .map(|d| if d == usize::MAX { n } else { d })
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_edge_symmetric() {
        let mut g = AdjGraph::new(3);
        g.add_edge(0, 1, 2.0);
        g.add_edge(1, 0, 1.0);
        assert_eq!(g.edge_weight(0, 1), 3.0);
        assert_eq!(g.edge_weight(1, 0), 3.0);
        assert_eq!(g.edge_weight(0, 2), 0.0);
    }

    #[test]
    fn test_self_loop() {
        let mut g = AdjGraph::new(2);
        g.add_edge(0, 0, 1.0);
        g.add_edge(0, 0, 1.0);
        assert_eq!(g.edge_weight(0, 0), 2.0);
        assert_eq!(g.neighbors(0).len(), 1);
    }

    #[test]
    fn test_connected_components() {
        let g = AdjGraph::from_edges(6, &[(0, 1), (1, 2), (4, 5)]);
        let (ncomp, comp) = g.connected_components();
        assert_eq!(ncomp, 3); // {0,1,2}, {3}, {4,5}
        assert_eq!(comp[0], comp[1]);
        assert_eq!(comp[1], comp[2]);
        assert_ne!(comp[0], comp[3]);
        assert_eq!(comp[4], comp[5]);
        assert_ne!(comp[3], comp[4]);
    }

    #[test]
    fn test_hop_distances() {
        let g = AdjGraph::from_edges(5, &[(0, 1), (1, 2), (2, 3)]);
        let dist = g.hop_distances(0);
        assert_eq!(dist[0], 0);
        assert_eq!(dist[3], 3);
        assert_eq!(dist[4], usize::MAX);
    }

    #[test]
    fn test_distance_matrix_capped() {
        let g = AdjGraph::from_edges(3, &[(0, 1)]);
        let d = g.distance_matrix();
        assert_eq!(d[0][1], 1);
        assert_eq!(d[0][2], 3); // unreachable -> n
        assert_eq!(d[1][0], d[0][1]);
    }

    #[test]
    fn test_edges_iterate_once() {
        let g = AdjGraph::from_edges(4, &[(0, 1), (2, 3), (1, 2)]);
        assert_eq!(g.num_edges(), 3);
        for (u, v, w) in g.edges() {
            assert!(u <= v);
            assert_eq!(w, 1.0);
        }
    }
}
