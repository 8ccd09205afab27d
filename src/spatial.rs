//! Nearest-point queries over the growing point set
//!
//! Backed by a KD-tree when the `spatial-index` feature is enabled
//! (default), with a linear scan fallback otherwise. The point augmenter
//! uses this to reject sea points that land too close to the shore.

#[cfg(feature = "spatial-index")]
use kiddo::immutable::float::kdtree::ImmutableKdTree;
#[cfg(feature = "spatial-index")]
use kiddo::SquaredEuclidean;

use glam::DVec2;

/// Immutable nearest-neighbor index over a fixed set of 2D points
#[cfg(feature = "spatial-index")]
pub struct SpatialIndex {
    tree: ImmutableKdTree<f64, usize, 2, 32>,
}

#[cfg(feature = "spatial-index")]
impl SpatialIndex {
    /// Build the index from point positions
    pub fn new(points: &[DVec2]) -> Self {
        let entries: Vec<[f64; 2]> = points.iter().map(|p| [p.x, p.y]).collect();
        Self {
            tree: ImmutableKdTree::new_from_slice(&entries),
        }
    }

    /// Nearest indexed point to `position` and its Euclidean distance
    pub fn nearest(&self, position: DVec2) -> (usize, f64) {
        let hit = self.tree.nearest_one::<SquaredEuclidean>(&[position.x, position.y]);
        (hit.item, hit.distance.sqrt())
    }
}

/// Linear-scan fallback used when the KD-tree feature is disabled
#[cfg(not(feature = "spatial-index"))]
pub struct SpatialIndex {
    points: Vec<DVec2>,
}

#[cfg(not(feature = "spatial-index"))]
impl SpatialIndex {
    /// Build the index from point positions
    pub fn new(points: &[DVec2]) -> Self {
        Self {
            points: points.to_vec(),
        }
    }

    /// Nearest indexed point to `position` and its Euclidean distance
    pub fn nearest(&self, position: DVec2) -> (usize, f64) {
        let mut best = (0, f64::INFINITY);
        for (i, p) in self.points.iter().enumerate() {
            let d = p.distance_squared(position);
            if d < best.1 {
                best = (i, d);
            }
        }
        (best.0, best.1.sqrt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nearest_basic() {
        let points = vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(10.0, 0.0),
            DVec2::new(0.0, 10.0),
        ];
        let index = SpatialIndex::new(&points);

        let (i, d) = index.nearest(DVec2::new(1.0, 0.0));
        assert_eq!(i, 0);
        assert!((d - 1.0).abs() < 1e-12);

        let (i, _) = index.nearest(DVec2::new(9.0, 1.0));
        assert_eq!(i, 1);
    }

    #[test]
    fn test_nearest_exact_match() {
        let points = vec![DVec2::new(3.0, 4.0), DVec2::new(-2.0, 7.0)];
        let index = SpatialIndex::new(&points);
        let (i, d) = index.nearest(points[1]);
        assert_eq!(i, 1);
        assert!(d < 1e-12);
    }
}
