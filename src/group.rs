//! Group labels attached to every point of the augmented point set
//!
//! The reference design encodes "sea" and "bounding box" points as two
//! reserved ids above the largest cluster id. Here those sentinels are a
//! tagged variant instead, so cluster ids never collide with background
//! markers no matter how sparse they are.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Group label of a point
///
/// Real clusters carry the caller's id (positive for colorable maps; zero or
/// negative ids are tolerated for outline-only maps). `Sea` marks random
/// lake/sea filler points and `BoundingBox` the four corner anchors; both are
/// background and never form a landmass.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Group {
    /// A real cluster with the caller-supplied id
    Cluster(i32),
    /// Random sea/lake filler point
    Sea,
    /// Bounding-box corner anchor
    BoundingBox,
}

impl Group {
    /// Whether this group is background (sea or bounding box)
    #[inline]
    pub fn is_background(self) -> bool {
        matches!(self, Group::Sea | Group::BoundingBox)
    }

    /// The cluster id, if this is a real cluster
    #[inline]
    pub fn cluster_id(self) -> Option<i32> {
        match self {
            Group::Cluster(id) => Some(id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_background() {
        assert!(Group::Sea.is_background());
        assert!(Group::BoundingBox.is_background());
        assert!(!Group::Cluster(1).is_background());
        assert!(!Group::Cluster(-3).is_background());
    }

    #[test]
    fn test_cluster_id() {
        assert_eq!(Group::Cluster(7).cluster_id(), Some(7));
        assert_eq!(Group::Sea.cluster_id(), None);
        assert_eq!(Group::BoundingBox.cluster_id(), None);
    }
}
