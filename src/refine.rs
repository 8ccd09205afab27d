//! Contiguity refinement
//!
//! When graph-connected nodes of one cluster end up on different landmasses
//! the map looks broken. Each refinement iteration re-weights the node
//! graph's target distances from the current landmass membership (cross-group
//! edges stretched by 10%, split-landmass edges shrunk by 10%) and asks a
//! layout solver for new positions; the caller then rebuilds the whole
//! pipeline from those. Iteration count is fixed, no convergence test.

use glam::DVec2;

use crate::error::Result;
use crate::graph::AdjGraph;

const MIN_DIST: f64 = 1e-10;

/// Geometry back-end for refinement
///
/// The default [`StressSolver`] ships with the crate; callers with their own
/// layout engine can implement this instead.
pub trait LayoutSolver {
    /// Move `positions` toward the target distances in `distances`
    fn solve(&self, distances: &AdjGraph, positions: &mut [DVec2]) -> Result<()>;

    /// Separate overlapping node rectangles after the last iteration
    fn remove_overlap(
        &self,
        graph: &AdjGraph,
        positions: &mut [DVec2],
        half_extents: Option<&[DVec2]>,
    ) -> Result<()>;
}

/// Localized stress majorization
///
/// Each sweep moves every node to the average of the positions its
/// neighbors' target distances imply; terminates on a relative-movement
/// tolerance or the iteration cap.
pub struct StressSolver {
    pub max_iterations: usize,
    pub tolerance: f64,
}

impl Default for StressSolver {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            tolerance: 1e-3,
        }
    }
}

impl LayoutSolver for StressSolver {
    fn solve(&self, distances: &AdjGraph, positions: &mut [DVec2]) -> Result<()> {
        let n = positions.len().min(distances.num_nodes());
        if n == 0 {
            return Ok(());
        }
        let mut scale = 0.0f64;
        let mut count = 0usize;
        for (_, _, w) in distances.edges() {
            scale += w;
            count += 1;
        }
        let avg_target = if count > 0 { scale / count as f64 } else { 1.0 };

        for _ in 0..self.max_iterations {
            let mut max_move = 0.0f64;
            for i in 0..n {
                let mut acc = DVec2::ZERO;
                let mut wsum = 0.0;
                for &(j, target) in distances.neighbors(i) {
                    if j == i || j >= n {
                        continue;
                    }
                    let target = target.max(MIN_DIST);
                    let delta = positions[i] - positions[j];
                    let len = delta.length().max(MIN_DIST);
                    let desired = positions[j] + delta * (target / len);
                    let w = 1.0 / (target * target);
                    acc += desired * w;
                    wsum += w;
                }
                if wsum > 0.0 {
                    let new_pos = acc / wsum;
                    max_move = max_move.max(new_pos.distance(positions[i]));
                    positions[i] = new_pos;
                }
            }
            if max_move < self.tolerance * avg_target {
                break;
            }
        }
        Ok(())
    }

    fn remove_overlap(
        &self,
        _graph: &AdjGraph,
        positions: &mut [DVec2],
        half_extents: Option<&[DVec2]>,
    ) -> Result<()> {
        let Some(hes) = half_extents else {
            return Ok(());
        };
        let n = positions.len().min(hes.len());
        // pairwise separation sweeps along the axis of least overlap
        for _ in 0..self.max_iterations.max(1) * 5 {
            let mut moved = false;
            for i in 0..n {
                for j in i + 1..n {
                    let d = positions[j] - positions[i];
                    let need = hes[i] + hes[j];
                    let overlap = need - d.abs();
                    if overlap.x <= 0.0 || overlap.y <= 0.0 {
                        continue;
                    }
                    moved = true;
                    if overlap.x <= overlap.y {
                        let dir = if d.x >= 0.0 { 1.0 } else { -1.0 };
                        let shift = dir * overlap.x * 0.5;
                        positions[i].x -= shift;
                        positions[j].x += shift;
                    } else {
                        let dir = if d.y >= 0.0 { 1.0 } else { -1.0 };
                        let shift = dir * overlap.y * 0.5;
                        positions[i].y -= shift;
                        positions[j].y += shift;
                    }
                }
            }
            if !moved {
                break;
            }
        }
        Ok(())
    }
}

/// Refinement progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefineState {
    Initial,
    Refining,
    Exhausted,
}

/// Bounded driver for the refinement loop
#[derive(Debug)]
pub struct ContiguityRefiner {
    max_iterations: usize,
    completed: usize,
    state: RefineState,
    bad_edges: usize,
}

impl ContiguityRefiner {
    pub fn new(max_iterations: usize) -> Self {
        Self {
            max_iterations,
            completed: 0,
            state: if max_iterations == 0 {
                RefineState::Exhausted
            } else {
                RefineState::Initial
            },
            bad_edges: 0,
        }
    }

    #[inline]
    pub fn state(&self) -> RefineState {
        self.state
    }

    /// Split-landmass edges seen in the most recent re-weighting
    #[inline]
    pub fn bad_edges(&self) -> usize {
        self.bad_edges
    }

    #[inline]
    pub fn completed(&self) -> usize {
        self.completed
    }

    /// Re-weighted target-distance graph for the next iteration, or `None`
    /// once the iteration budget is spent
    pub fn next_distances(
        &mut self,
        graph: &AdjGraph,
        groups: &[i32],
        positions: &[DVec2],
        landmass_of: &[Option<usize>],
    ) -> Option<AdjGraph> {
        if self.completed >= self.max_iterations {
            self.state = RefineState::Exhausted;
            return None;
        }
        self.state = RefineState::Refining;
        self.completed += 1;
        self.bad_edges = 0;

        let n = graph.num_nodes();
        let mut d = AdjGraph::new(n);
        for (u, v, _) in graph.edges() {
            if u == v {
                continue;
            }
            let dist = positions[u].distance(positions[v]).max(MIN_DIST);
            let target = if groups[u] != groups[v] {
                1.1 * dist
            } else {
                match (landmass_of[u], landmass_of[v]) {
                    (Some(a), Some(b)) if a != b => {
                        self.bad_edges += 1;
                        0.9 * dist
                    }
                    _ => dist,
                }
            };
            d.add_edge(u, v, target);
        }
        Some(d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reweight_factors() {
        let mut graph = AdjGraph::new(4);
        graph.add_edge(0, 1, 1.0); // same group, same landmass
        graph.add_edge(1, 2, 1.0); // cross group
        graph.add_edge(2, 3, 1.0); // same group, split landmass
        let groups = [1, 1, 2, 2];
        let positions = [
            DVec2::new(0.0, 0.0),
            DVec2::new(1.0, 0.0),
            DVec2::new(2.0, 0.0),
            DVec2::new(3.0, 0.0),
        ];
        let landmass_of = [Some(0), Some(0), Some(1), Some(2)];

        let mut refiner = ContiguityRefiner::new(3);
        let d = refiner
            .next_distances(&graph, &groups, &positions, &landmass_of)
            .unwrap();

        assert!((d.edge_weight(0, 1) - 1.0).abs() < 1e-12);
        assert!((d.edge_weight(1, 2) - 1.1).abs() < 1e-12);
        assert!((d.edge_weight(2, 3) - 0.9).abs() < 1e-12);
        assert_eq!(refiner.bad_edges(), 1);
        assert_eq!(refiner.state(), RefineState::Refining);
    }

    #[test]
    fn test_refiner_exhausts_after_budget() {
        let graph = AdjGraph::new(2);
        let groups = [1, 1];
        let positions = [DVec2::ZERO, DVec2::ONE];
        let landmass_of = [Some(0), Some(0)];

        let mut refiner = ContiguityRefiner::new(2);
        assert!(refiner
            .next_distances(&graph, &groups, &positions, &landmass_of)
            .is_some());
        assert!(refiner
            .next_distances(&graph, &groups, &positions, &landmass_of)
            .is_some());
        assert!(refiner
            .next_distances(&graph, &groups, &positions, &landmass_of)
            .is_none());
        assert_eq!(refiner.state(), RefineState::Exhausted);
        assert_eq!(refiner.completed(), 2);
    }

    #[test]
    fn test_zero_budget_starts_exhausted() {
        let refiner = ContiguityRefiner::new(0);
        assert_eq!(refiner.state(), RefineState::Exhausted);
    }

    #[test]
    fn test_stress_solver_moves_toward_target() {
        let mut distances = AdjGraph::new(2);
        distances.add_edge(0, 1, 2.0);
        let mut positions = vec![DVec2::new(0.0, 0.0), DVec2::new(10.0, 0.0)];
        let solver = StressSolver {
            max_iterations: 50,
            tolerance: 1e-6,
        };
        solver.solve(&distances, &mut positions).unwrap();
        let gap = positions[0].distance(positions[1]);
        assert!((gap - 2.0).abs() < 0.1, "gap = {}", gap);
    }

    #[test]
    fn test_remove_overlap_separates_rectangles() {
        let graph = AdjGraph::new(2);
        let mut positions = vec![DVec2::new(0.0, 0.0), DVec2::new(0.5, 0.0)];
        let hes = vec![DVec2::new(1.0, 1.0), DVec2::new(1.0, 1.0)];
        let solver = StressSolver::default();
        solver
            .remove_overlap(&graph, &mut positions, Some(&hes))
            .unwrap();
        let d = (positions[1] - positions[0]).abs();
        assert!(
            d.x >= 2.0 - 1e-9 || d.y >= 2.0 - 1e-9,
            "still overlapping: {:?}",
            d
        );
    }
}
