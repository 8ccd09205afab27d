//! Delaunay triangulation wrapper
//!
//! Thin layer over spade's `DelaunayTriangulation` that turns an augmented
//! point set into a triangle list with dual centers plus a point-level
//! adjacency view recording, for each triangulation edge, the one or two
//! triangles incident to it.

use glam::DVec2;
use spade::{DelaunayTriangulation, Point2, Triangulation as _};
use std::collections::HashMap;

use crate::error::{MapError, Result};
use crate::points::PointSet;

/// One Delaunay triangle with its dual center
#[derive(Debug, Clone, Copy)]
pub struct Triangle {
    /// Indices into the point set
    pub vertices: [usize; 3],
    /// Polygon vertex used for this triangle: the circumcenter, falling back
    /// to an edge midpoint when the vertices are collinear
    pub center: DVec2,
}

/// A triangulation edge as seen from one endpoint
#[derive(Debug, Clone, Copy)]
pub struct EdgeRef {
    /// The other endpoint
    pub to: usize,
    /// Incident triangles; `tris.1` is `None` on the hull
    pub tris: (usize, Option<usize>),
}

impl EdgeRef {
    /// Whether the edge separates two triangles
    #[inline]
    pub fn is_interior(&self) -> bool {
        self.tris.1.is_some()
    }
}

/// Triangle list plus the edge-to-triangles adjacency derived from it
#[derive(Debug, Clone)]
pub struct Mesh {
    /// All inner triangles, in spade's stable face order
    pub triangles: Vec<Triangle>,
    /// Symmetric per-point edge lists
    adjacency: Vec<Vec<EdgeRef>>,
}

impl Mesh {
    /// Number of triangulated points
    #[inline]
    pub fn num_points(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of triangles
    #[inline]
    pub fn num_triangles(&self) -> usize {
        self.triangles.len()
    }

    /// Edges incident to point `p`
    #[inline]
    pub fn neighbors(&self, p: usize) -> &[EdgeRef] {
        &self.adjacency[p]
    }

    /// All interior edges, each reported once with `u < v`
    pub fn interior_edges(&self) -> impl Iterator<Item = (usize, usize, usize, usize)> + '_ {
        self.adjacency.iter().enumerate().flat_map(|(u, list)| {
            list.iter().filter_map(move |e| match e.tris {
                (t1, Some(t2)) if u < e.to => Some((u, e.to, t1, t2)),
                _ => None,
            })
        })
    }
}

/// Circumcenter of a triangle, or the midpoint of the first edge when the
/// perpendicular bisectors are parallel (collinear vertices)
fn dual_center(a: DVec2, b: DVec2, c: DVec2) -> DVec2 {
    let mid_ab = (a + b) * 0.5;
    let mid_bc = (b + c) * 0.5;
    let n_bc = (b - c).perp();
    let ab = a - b;
    let bot = n_bc.dot(ab);
    if bot == 0.0 {
        return mid_ab;
    }
    let beta = ab.dot(mid_ab - mid_bc) / bot;
    mid_bc + beta * n_bc
}

/// Triangulate the point set and derive the edge adjacency
///
/// Fails with [`MapError::DegenerateInput`] when fewer than 3 points are
/// given, points coincide (spade merges duplicates, which would desynchronize
/// point indices), or all points are collinear.
pub fn triangulate(points: &PointSet) -> Result<Mesh> {
    let n = points.len();
    if n < 3 {
        return Err(MapError::DegenerateInput(format!(
            "triangulation needs at least 3 points, got {}",
            n
        )));
    }
    for p in &points.positions {
        if !p.is_finite() {
            return Err(MapError::DegenerateInput(
                "non-finite point coordinate".to_string(),
            ));
        }
    }

    let spade_points: Vec<Point2<f64>> = points
        .positions
        .iter()
        .map(|p| Point2::new(p.x, p.y))
        .collect();
    let dt = DelaunayTriangulation::<Point2<f64>>::bulk_load_stable(spade_points)
        .map_err(|e| MapError::DegenerateInput(format!("triangulation failed: {:?}", e)))?;

    if dt.num_vertices() != n {
        return Err(MapError::DegenerateInput(format!(
            "{} coincident points merged during triangulation",
            n - dt.num_vertices()
        )));
    }

    let mut triangles = Vec::with_capacity(dt.num_inner_faces());
    for face in dt.inner_faces() {
        let vs = face.vertices();
        let vertices = [
            vs[0].fix().index(),
            vs[1].fix().index(),
            vs[2].fix().index(),
        ];
        let center = dual_center(
            points.positions[vertices[0]],
            points.positions[vertices[1]],
            points.positions[vertices[2]],
        );
        triangles.push(Triangle { vertices, center });
    }
    if triangles.is_empty() {
        return Err(MapError::DegenerateInput(
            "all points are collinear".to_string(),
        ));
    }

    // Collect the incident triangle(s) per undirected point-pair edge.
    let mut edge_tris: HashMap<(usize, usize), (usize, Option<usize>)> = HashMap::new();
    for (t, tri) in triangles.iter().enumerate() {
        for k in 0..3 {
            let a = tri.vertices[k];
            let b = tri.vertices[(k + 1) % 3];
            let key = (a.min(b), a.max(b));
            edge_tris
                .entry(key)
                .and_modify(|e| e.1 = Some(t))
                .or_insert((t, None));
        }
    }

    let mut adjacency = vec![Vec::new(); n];
    let mut keys: Vec<(usize, usize)> = edge_tris.keys().copied().collect();
    keys.sort_unstable();
    for (u, v) in keys {
        let tris = edge_tris[&(u, v)];
        adjacency[u].push(EdgeRef { to: v, tris });
        adjacency[v].push(EdgeRef { to: u, tris });
    }

    Ok(Mesh {
        triangles,
        adjacency,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::Group;

    fn point_set(positions: Vec<DVec2>) -> PointSet {
        let n = positions.len();
        PointSet {
            groups: vec![Group::Cluster(1); n],
            provenance: vec![None; n],
            n_core: n,
            positions,
        }
    }

    #[test]
    fn test_too_few_points() {
        let set = point_set(vec![DVec2::ZERO, DVec2::ONE]);
        assert!(matches!(
            triangulate(&set),
            Err(MapError::DegenerateInput(_))
        ));
    }

    #[test]
    fn test_coincident_points_rejected() {
        let set = point_set(vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(0.0, 0.0),
            DVec2::new(1.0, 0.0),
            DVec2::new(0.0, 1.0),
        ]);
        assert!(matches!(
            triangulate(&set),
            Err(MapError::DegenerateInput(_))
        ));
    }

    #[test]
    fn test_collinear_points_rejected() {
        let set = point_set(vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(1.0, 0.0),
            DVec2::new(2.0, 0.0),
        ]);
        assert!(matches!(
            triangulate(&set),
            Err(MapError::DegenerateInput(_))
        ));
    }

    #[test]
    fn test_square_two_triangles() {
        let set = point_set(vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(1.0, 0.0),
            DVec2::new(1.0, 1.0),
            DVec2::new(0.0, 1.0),
        ]);
        let mesh = triangulate(&set).unwrap();
        assert_eq!(mesh.num_triangles(), 2);

        // the diagonal is the only interior edge
        let interior: Vec<_> = mesh.interior_edges().collect();
        assert_eq!(interior.len(), 1);
        let (_, _, t1, t2) = interior[0];
        assert_ne!(t1, t2);
        // every hull edge has one triangle
        for p in 0..4 {
            for e in mesh.neighbors(p) {
                if !e.is_interior() {
                    assert!(e.tris.0 < 2);
                }
            }
        }
    }

    #[test]
    fn test_adjacency_symmetric() {
        let set = point_set(vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(2.0, 0.0),
            DVec2::new(1.0, 2.0),
            DVec2::new(1.0, 0.7),
            DVec2::new(3.0, 1.5),
        ]);
        let mesh = triangulate(&set).unwrap();
        for u in 0..set.len() {
            for e in mesh.neighbors(u) {
                assert!(
                    mesh.neighbors(e.to).iter().any(|b| b.to == u),
                    "edge {}-{} missing reverse entry",
                    u,
                    e.to
                );
            }
        }
    }

    #[test]
    fn test_dual_center_equidistant() {
        let a = DVec2::new(0.0, 0.0);
        let b = DVec2::new(4.0, 0.0);
        let c = DVec2::new(1.0, 3.0);
        let center = dual_center(a, b, c);
        let (da, db, dc) = (center.distance(a), center.distance(b), center.distance(c));
        assert!((da - db).abs() < 1e-9);
        assert!((db - dc).abs() < 1e-9);
    }

    #[test]
    fn test_dual_center_collinear_fallback() {
        let a = DVec2::new(0.0, 0.0);
        let b = DVec2::new(1.0, 0.0);
        let c = DVec2::new(2.0, 0.0);
        assert_eq!(dual_center(a, b, c), DVec2::new(0.5, 0.0));
    }
}
