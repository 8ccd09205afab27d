//! Boundary outline tracing
//!
//! A boundary edge of a landmass is a triangulation edge whose two endpoints
//! carry different groups; its two incident triangles contribute one dual
//! segment to the outline. In a planar subdivision each triangle carries at
//! most two such segments per landmass, so following the unique non-backtrack
//! link traces each loop exactly once.

use std::collections::HashMap;

use crate::error::{MapError, Result};
use crate::points::PointSet;
use crate::region::Landmass;
use crate::triangulate::Mesh;

/// One closed outline loop, as an ordered list of triangle indices
///
/// The cycle is implicitly closed: the last vertex links back to the first.
/// A landmass has one outer cycle and zero or more hole cycles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryCycle(pub Vec<usize>);

impl BoundaryCycle {
    /// Number of dual vertices on the loop
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the loop is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Trace all outline loops of one landmass
pub fn trace_outlines(
    points: &PointSet,
    mesh: &Mesh,
    landmass: &Landmass,
) -> Result<Vec<BoundaryCycle>> {
    // triangle -> its (at most two) outline neighbors for this landmass
    let mut links: HashMap<usize, ([usize; 2], usize)> = HashMap::new();
    let mut boundary_tris: Vec<usize> = Vec::new();

    for &p in &landmass.points {
        for e in mesh.neighbors(p) {
            let (t1, t2) = match e.tris {
                (t1, Some(t2)) => (t1, t2),
                _ => continue,
            };
            if points.groups[e.to] == landmass.group {
                continue;
            }
            let entry = links.entry(t1).or_insert(([usize::MAX; 2], 0));
            entry.0[entry.1 % 2] = t2;
            entry.1 += 1;
            let entry = links.entry(t2).or_insert(([usize::MAX; 2], 0));
            entry.0[entry.1 % 2] = t1;
            entry.1 += 1;
            boundary_tris.push(t1);
            boundary_tris.push(t2);
        }
    }

    let next_of = |t: usize, came_from: usize| -> Result<usize> {
        let (pair, _) = links
            .get(&t)
            .ok_or_else(|| MapError::TopologyViolation(format!("no outline link at triangle {}", t)))?;
        let nn = if pair[0] == came_from { pair[1] } else { pair[0] };
        if nn == came_from || nn == usize::MAX {
            return Err(MapError::TopologyViolation(format!(
                "outline dead-ends at triangle {}",
                t
            )));
        }
        Ok(nn)
    };

    let mut cycles = Vec::new();
    let mut visited: HashMap<usize, bool> = HashMap::new();
    for &start in &boundary_tris {
        if visited.get(&start).copied().unwrap_or(false) {
            continue;
        }
        visited.insert(start, true);
        let mut cycle = vec![start];
        let (pair, _) = links
            .get(&start)
            .ok_or_else(|| {
                MapError::TopologyViolation(format!("no outline link at triangle {}", start))
            })?;
        let mut cur = start;
        let mut next = pair[1];
        if next == usize::MAX {
            return Err(MapError::TopologyViolation(format!(
                "outline dead-ends at triangle {}",
                start
            )));
        }
        while next != start {
            visited.insert(next, true);
            cycle.push(next);
            let nn = next_of(next, cur)?;
            cur = next;
            next = nn;
        }
        cycles.push(BoundaryCycle(cycle));
    }
    Ok(cycles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapConfigBuilder;
    use crate::points::augment;
    use crate::region::extract_landmasses;
    use crate::triangulate::triangulate;
    use glam::DVec2;

    fn scene(positions: Vec<DVec2>, groups: Vec<i32>, n_random: i32) -> (PointSet, Mesh) {
        let config = MapConfigBuilder::new()
            .seed(5)
            .n_random(n_random)
            .build()
            .unwrap();
        let set = augment(&positions, None, &groups, None, &config, 0);
        let mesh = triangulate(&set).unwrap();
        (set, mesh)
    }

    #[test]
    fn test_single_cluster_single_cycle() {
        let (set, mesh) = scene(
            vec![
                DVec2::new(0.0, 0.0),
                DVec2::new(1.0, 0.0),
                DVec2::new(0.5, 1.0),
            ],
            vec![1, 1, 1],
            1,
        );
        let (landmasses, _) = extract_landmasses(&set, &mesh);
        assert_eq!(landmasses.len(), 1);
        let cycles = trace_outlines(&set, &mesh, &landmasses[0]).unwrap();
        assert_eq!(cycles.len(), 1);
        assert!(cycles[0].len() >= 3);
    }

    #[test]
    fn test_cycle_visits_each_triangle_once() {
        let (set, mesh) = scene(
            vec![
                DVec2::new(0.0, 0.0),
                DVec2::new(1.0, 0.0),
                DVec2::new(1.0, 1.0),
                DVec2::new(0.0, 1.0),
            ],
            vec![1, 1, 1, 1],
            0,
        );
        let (landmasses, _) = extract_landmasses(&set, &mesh);
        for lm in &landmasses {
            for cycle in trace_outlines(&set, &mesh, lm).unwrap() {
                let mut seen = cycle.0.clone();
                seen.sort_unstable();
                seen.dedup();
                assert_eq!(seen.len(), cycle.len(), "cycle revisits a triangle");
            }
        }
    }

    #[test]
    fn test_surrounded_cluster_gives_hole_in_surrounding_group() {
        // a ring of group 1 around a group-2 core: group 1 gets an outer
        // cycle and an inner (hole) cycle
        let mut positions = Vec::new();
        let mut groups = Vec::new();
        for k in 0..8 {
            let a = k as f64 * std::f64::consts::TAU / 8.0;
            positions.push(DVec2::new(4.0 * a.cos(), 4.0 * a.sin()));
            groups.push(1);
        }
        positions.push(DVec2::new(0.0, 0.0));
        positions.push(DVec2::new(0.4, 0.0));
        positions.push(DVec2::new(0.0, 0.4));
        groups.extend([2, 2, 2]);

        let (set, mesh) = scene(positions, groups, 1);
        let (landmasses, _) = extract_landmasses(&set, &mesh);
        let ring = landmasses
            .iter()
            .find(|lm| lm.group == crate::group::Group::Cluster(1))
            .unwrap();
        let cycles = trace_outlines(&set, &mesh, ring).unwrap();
        assert_eq!(cycles.len(), 2, "outer loop plus hole loop");
    }
}
