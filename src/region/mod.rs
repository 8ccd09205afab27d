//! Region decomposition
//!
//! Turns a triangulated point set into landmasses (connected same-group
//! point components), their stroked boundary outlines, and a fill path per
//! landmass for solid rendering.

mod fill;
mod outline;

pub use fill::{FillBuilder, FillPath};
pub use outline::{trace_outlines, BoundaryCycle};

use crate::error::{MapWarning, Result};
use crate::group::Group;
use crate::points::PointSet;
use crate::triangulate::Mesh;

/// A maximal connected set of same-group points under triangulation
/// adjacency
///
/// Disjoint enclaves of one cluster form separate landmasses with the same
/// group. Sea and bounding-box components are pooled out as background and
/// never appear here.
#[derive(Debug, Clone)]
pub struct Landmass {
    /// Member point indices
    pub points: Vec<usize>,
    /// The shared group, always a cluster
    pub group: Group,
}

/// Everything the decomposer derives for one triangulation pass
#[derive(Debug, Clone)]
pub struct Decomposition {
    /// Landmasses in discovery order
    pub landmasses: Vec<Landmass>,
    /// Landmass id per point, `None` for background points
    pub membership: Vec<Option<usize>>,
    /// Outline cycles per landmass (outer loop plus holes)
    pub outlines: Vec<Vec<BoundaryCycle>>,
    /// Fill paths per landmass (one, except for degenerate fragmented fills)
    pub fills: Vec<Vec<FillPath>>,
}

/// Connected components of the "same group and triangulation-adjacent"
/// relation, with background components pooled out
pub fn extract_landmasses(
    points: &PointSet,
    mesh: &Mesh,
) -> (Vec<Landmass>, Vec<Option<usize>>) {
    let n = points.len();
    let mut membership: Vec<Option<usize>> = vec![None; n];
    let mut landmasses = Vec::new();
    let mut visited = vec![false; n];
    let mut stack = Vec::new();

    for start in 0..n {
        if visited[start] || points.groups[start].is_background() {
            continue;
        }
        let group = points.groups[start];
        let id = landmasses.len();
        let mut members = Vec::new();
        visited[start] = true;
        stack.push(start);
        while let Some(p) = stack.pop() {
            membership[p] = Some(id);
            members.push(p);
            for e in mesh.neighbors(p) {
                if !visited[e.to] && points.groups[e.to] == group {
                    visited[e.to] = true;
                    stack.push(e.to);
                }
            }
        }
        members.sort_unstable();
        landmasses.push(Landmass {
            points: members,
            group,
        });
    }
    (landmasses, membership)
}

/// Extract landmasses, then trace outlines and build fill paths for each
pub fn decompose(
    points: &PointSet,
    mesh: &Mesh,
    warnings: &mut Vec<MapWarning>,
) -> Result<Decomposition> {
    let (landmasses, membership) = extract_landmasses(points, mesh);

    let mut outlines = Vec::with_capacity(landmasses.len());
    let mut fills = Vec::with_capacity(landmasses.len());
    let mut builder = FillBuilder::new(mesh);
    for (id, landmass) in landmasses.iter().enumerate() {
        outlines.push(trace_outlines(points, mesh, landmass)?);
        fills.push(builder.fill_paths(id, landmass, warnings)?);
    }

    Ok(Decomposition {
        landmasses,
        membership,
        outlines,
        fills,
    })
}
