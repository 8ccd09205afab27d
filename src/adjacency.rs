//! Country adjacency
//!
//! Two countries (cluster groups) border each other when a triangulation
//! edge connects points of the two groups. The resulting weighted graph
//! drives map coloring: heavier borders want more contrasting colors.

use crate::graph::AdjGraph;
use crate::points::PointSet;
use crate::triangulate::Mesh;

/// Symmetric weighted adjacency over positive cluster ids
///
/// Node `k` stands for group id `k + 1`. The diagonal carries one unit per
/// member point of the group; an off-diagonal weight counts the border
/// edges shared by the two groups.
#[derive(Debug, Clone)]
pub struct CountryGraph {
    graph: AdjGraph,
}

impl CountryGraph {
    /// Build from the triangulated point set, or `None` when any cluster id
    /// is non-positive (coloring needs a dense 1-based order)
    pub fn build(points: &PointSet, mesh: &Mesh) -> Option<CountryGraph> {
        let mut max_group = 0i32;
        for g in &points.groups[..points.n_core] {
            let id = g.cluster_id()?;
            if id <= 0 {
                return None;
            }
            max_group = max_group.max(id);
        }
        if max_group == 0 {
            return None;
        }

        let mut graph = AdjGraph::new(max_group as usize);
        for i in 0..points.n_core {
            let gi = points.groups[i].cluster_id()?;
            graph.add_edge((gi - 1) as usize, (gi - 1) as usize, 1.0);
            for e in mesh.neighbors(i) {
                let Some(gj) = points.groups[e.to].cluster_id() else {
                    continue;
                };
                if gj != gi && i < e.to {
                    graph.add_edge((gi - 1) as usize, (gj - 1) as usize, 1.0);
                }
            }
        }
        Some(CountryGraph { graph })
    }

    /// Number of countries (dense group ids `1..=n`)
    #[inline]
    pub fn num_countries(&self) -> usize {
        self.graph.num_nodes()
    }

    /// Border weight between two groups (1-based ids), 0.0 when disjoint
    pub fn border_weight(&self, a: i32, b: i32) -> f64 {
        if a <= 0 || b <= 0 {
            return 0.0;
        }
        self.graph.edge_weight((a - 1) as usize, (b - 1) as usize)
    }

    /// Bordering groups of `group`, as (group id, weight) pairs
    pub fn borders(&self, group: i32) -> Vec<(i32, f64)> {
        self.graph
            .neighbors((group - 1) as usize)
            .iter()
            .filter(|(j, _)| *j != (group - 1) as usize)
            .map(|(j, w)| ((*j + 1) as i32, *w))
            .collect()
    }

    /// The underlying zero-based graph, for coloring
    #[inline]
    pub fn as_graph(&self) -> &AdjGraph {
        &self.graph
    }
}
