//! Point-set augmentation
//!
//! Expands the caller's laid-out nodes with the artificial points the
//! triangulation needs to look like a map: rectangle-perimeter points that
//! keep lakes out of labels, bridge points along graph edges that keep
//! connected nodes on one island, random sea/lake points, and four
//! bounding-box corner anchors.

use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::MapConfig;
use crate::graph::AdjGraph;
use crate::group::Group;
use crate::spatial::SpatialIndex;

/// The augmented point set handed to the triangulator
///
/// Points are ordered: cluster points first (originals, then rectangle and
/// bridge points, then retained "OK" shore points), then sea points, then
/// the four bounding-box corners. `provenance` maps each slot back to the
/// original input index where one exists.
#[derive(Debug, Clone)]
pub struct PointSet {
    /// Point positions
    pub positions: Vec<DVec2>,
    /// Parallel group labels
    pub groups: Vec<Group>,
    /// Original input index per point, `None` for artificial points
    pub provenance: Vec<Option<usize>>,
    /// Number of leading cluster-group points
    pub n_core: usize,
}

impl PointSet {
    /// Total point count
    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether the set is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    fn push(&mut self, position: DVec2, group: Group, provenance: Option<usize>) {
        self.positions.push(position);
        self.groups.push(group);
        self.provenance.push(provenance);
    }
}

fn bounding_box(positions: &[DVec2], half_extents: Option<&[DVec2]>) -> (DVec2, DVec2) {
    let mut lo = positions[0];
    let mut hi = positions[0];
    for (i, p) in positions.iter().enumerate() {
        let he = half_extents.map(|h| h[i]).unwrap_or(DVec2::ZERO);
        lo = lo.min(*p - he);
        hi = hi.max(*p + he);
    }
    (lo, hi)
}

/// Resolve the shore tolerance per the auto rules
///
/// `0` means the average spacing of a uniform distribution over the bounding
/// box; negative means that multiple of the average rectangle size when
/// rectangles are present, else the same auto spacing.
fn resolve_shore_tolerance(
    tol: f64,
    avg_rect_size: f64,
    area: f64,
    n: usize,
) -> f64 {
    if tol < 0.0 && avg_rect_size > 0.0 {
        -tol * avg_rect_size
    } else if tol <= 0.0 {
        (area / n.max(1) as f64).sqrt()
    } else {
        tol
    }
}

/// Resolve the sea-point count per the auto rules
///
/// `0` means one sea point per existing point; negative means that multiple
/// of the existing count; `1..=3` means none (the corner anchors alone).
fn resolve_n_random(n_random: i32, n: usize) -> usize {
    if n_random == 0 {
        n
    } else if n_random < 0 {
        (-n_random) as usize * n
    } else if n_random < 4 {
        0
    } else {
        n_random as usize - 4
    }
}

/// Points per rectangle side when auto-scaled: fewer as the map grows,
/// none beyond 3600 nodes
fn auto_side_points(n: usize) -> i32 {
    (10.0 / (1.0 + n as f64 / 400.0)) as i32
}

/// Expand the input points into a triangulation-ready [`PointSet`]
///
/// `highlight` must already be validated (0 = whole map); an id that matches
/// no point would silently produce an empty map here.
pub fn augment(
    positions: &[DVec2],
    half_extents: Option<&[DVec2]>,
    groups: &[i32],
    graph: Option<&AdjGraph>,
    config: &MapConfig,
    highlight: i32,
) -> PointSet {
    let n = positions.len();
    if n == 0 {
        return PointSet {
            positions: Vec::new(),
            groups: Vec::new(),
            provenance: Vec::new(),
            n_core: 0,
        };
    }
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);

    let mut set = PointSet {
        positions: Vec::with_capacity(n * 2),
        groups: Vec::with_capacity(n * 2),
        provenance: Vec::with_capacity(n * 2),
        n_core: 0,
    };
    for i in 0..n {
        set.push(positions[i], Group::Cluster(groups[i]), Some(i));
    }

    // Average full rectangle size drives the perimeter spacing and the
    // relative shore tolerance.
    let avg_rect = half_extents
        .map(|hes| {
            let sum: DVec2 = hes.iter().map(|he| *he * 2.0).sum();
            sum / n as f64
        })
        .unwrap_or(DVec2::ZERO);
    let avg_size = 0.5 * (avg_rect.x + avg_rect.y);

    if let Some(hes) = half_extents {
        add_rectangle_points(&mut set, positions, hes, groups, avg_rect, avg_size, config, &mut rng);
    }

    let (lo0, hi0) = bounding_box(positions, half_extents);
    let extent = hi0 - lo0;
    let area = extent.x * extent.y;
    let shore_tol = resolve_shore_tolerance(config.shore_tolerance, avg_size, area, n);

    if let Some(g) = graph {
        if config.n_edge_points > 0 {
            add_edge_bridge_points(&mut set, positions, groups, g, config.n_edge_points, highlight);
        }
    }

    let n_random = resolve_n_random(config.n_random, set.len());

    // Sea sampling queries the shore against everything added so far;
    // accepted sea points do not themselves repel later samples.
    let index = SpatialIndex::new(&set.positions);

    let mut lo = lo0;
    let mut hi = hi0;
    for axis in 0..2 {
        let pad = if config.margin > 0.0 {
            config.margin
        } else if config.margin < 0.0 {
            extent[axis] * -config.margin
        } else {
            (extent[axis] * 0.2).max(2.0 * shore_tol)
        };
        lo[axis] -= pad;
        hi[axis] += pad;
    }

    let mut ok_points: Vec<(DVec2, Group, Option<usize>)> = Vec::new();
    let mut sea_points: Vec<DVec2> = Vec::new();
    for _ in 0..n_random {
        let p = DVec2::new(
            lo.x + (hi.x - lo.x) * rng.gen::<f64>(),
            lo.y + (hi.y - lo.y) * rng.gen::<f64>(),
        );
        let (nearest, dist) = index.nearest(p);
        if dist > shore_tol {
            sea_points.push(p);
        } else if config.include_ok_points && dist > shore_tol / 10.0 {
            // close to shore but not a duplicate: keep it on the land side
            // for a rougher, more natural coastline
            ok_points.push((p, set.groups[nearest], None));
        }
    }
    for (p, g, prov) in ok_points {
        set.push(p, g, prov);
    }
    for p in sea_points {
        set.push(p, Group::Sea, None);
    }

    // Corner anchors sit outside the sea box so the hull has no skinny
    // triangles cutting into the map.
    lo -= (hi - lo) * 0.2;
    hi += (hi - lo) * 0.2;
    set.push(DVec2::new(lo.x, lo.y), Group::BoundingBox, None);
    set.push(DVec2::new(hi.x, hi.y), Group::BoundingBox, None);
    set.push(DVec2::new(lo.x, hi.y), Group::BoundingBox, None);
    set.push(DVec2::new(hi.x, lo.y), Group::BoundingBox, None);

    if highlight != 0 {
        apply_highlight(&mut set, highlight);
    }
    set.n_core = set
        .groups
        .iter()
        .take_while(|g| !g.is_background())
        .count();
    debug_assert!(set.groups[set.n_core..].iter().all(|g| g.is_background()));
    set
}

/// Walk each rectangle clockwise, emitting slightly perturbed perimeter
/// points so the shoreline around labels is not rectilinear
#[allow(clippy::too_many_arguments)]
fn add_rectangle_points(
    set: &mut PointSet,
    positions: &[DVec2],
    half_extents: &[DVec2],
    groups: &[i32],
    avg_rect: DVec2,
    avg_size: f64,
    config: &MapConfig,
    rng: &mut ChaCha8Rng,
) {
    let n = positions.len();
    let k = if config.n_rect_points < 0 {
        auto_side_points(n)
    } else {
        config.n_rect_points
    };
    if k <= 0 || avg_size == 0.0 {
        return;
    }
    let delta = avg_rect * (0.5 / k as f64);

    for i in 0..n {
        let group = Group::Cluster(groups[i]);
        let size = half_extents[i] * 2.0;
        let center = positions[i];
        let nx = (k as f64 * size.x / avg_size) as usize;
        let ny = (k as f64 * size.y / avg_size) as usize;

        if nx > 0 {
            // top: left to right
            let h = size.x / nx as f64;
            let mut p = DVec2::new(center.x - size.x / 2.0, center.y + size.y / 2.0);
            let base_y = p.y;
            set.push(p, group, None);
            for _ in 0..nx - 1 {
                p.x += h;
                p.y = base_y + (0.5 - rng.gen::<f64>()) * delta.y;
                set.push(p, group, None);
            }
            // bottom: right to left
            let mut p = DVec2::new(center.x + size.x / 2.0, center.y - size.y / 2.0);
            let base_y = p.y;
            set.push(p, group, None);
            for _ in 0..nx - 1 {
                p.x -= h;
                p.y = base_y + (0.5 - rng.gen::<f64>()) * delta.y;
                set.push(p, group, None);
            }
        }
        if ny > 0 {
            // left: bottom to top
            let h = size.y / ny as f64;
            let mut p = DVec2::new(center.x - size.x / 2.0, center.y - size.y / 2.0);
            let base_x = p.x;
            set.push(p, group, None);
            for _ in 0..ny - 1 {
                p.y += h;
                p.x = base_x + (0.5 - rng.gen::<f64>()) * delta.x;
                set.push(p, group, None);
            }
            // right: top to bottom
            let mut p = DVec2::new(center.x + size.x / 2.0, center.y + size.y / 2.0);
            let base_x = p.x;
            set.push(p, group, None);
            for _ in 0..ny - 1 {
                p.y -= h;
                p.x = base_x + (0.5 - rng.gen::<f64>()) * delta.x;
                set.push(p, group, None);
            }
        }
    }
}

/// Insert interior points along each graph edge so the shoreline does not
/// split connected nodes into separate islands
fn add_edge_bridge_points(
    set: &mut PointSet,
    positions: &[DVec2],
    groups: &[i32],
    graph: &AdjGraph,
    n_points: usize,
    highlight: i32,
) {
    for (u, v, _) in graph.edges() {
        if u == v || u >= positions.len() || v >= positions.len() {
            continue;
        }
        if highlight != 0 && (groups[u] != highlight || groups[v] != highlight) {
            continue;
        }
        for t in 1..=n_points {
            let f = t as f64 / (n_points + 1) as f64;
            let p = positions[u].lerp(positions[v], f);
            // nearer endpoint claims the point; the midpoint goes to the
            // edge's first endpoint
            let group = if f <= 0.5 { groups[u] } else { groups[v] };
            set.push(p, Group::Cluster(group), None);
        }
    }
}

/// Reorder for single-cluster rendering: the requested cluster becomes a
/// `Cluster(1)` prefix and every other cluster point becomes sea
fn apply_highlight(set: &mut PointSet, highlight: i32) {
    let mut kept = Vec::with_capacity(set.len());
    let mut demoted = Vec::new();
    let mut background = Vec::new();
    for i in 0..set.len() {
        let entry = (set.positions[i], set.groups[i], set.provenance[i]);
        match set.groups[i] {
            Group::Cluster(id) if id == highlight => {
                kept.push((entry.0, Group::Cluster(1), entry.2));
            }
            Group::Cluster(_) => demoted.push((entry.0, Group::Sea, entry.2)),
            _ => background.push(entry),
        }
    }
    set.positions.clear();
    set.groups.clear();
    set.provenance.clear();
    for (p, g, prov) in kept.into_iter().chain(demoted).chain(background) {
        set.push(p, g, prov);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapConfigBuilder;

    fn two_cluster_positions() -> (Vec<DVec2>, Vec<i32>) {
        let positions = vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(1.0, 0.0),
            DVec2::new(0.5, 1.0),
            DVec2::new(10.0, 10.0),
            DVec2::new(11.0, 10.0),
            DVec2::new(10.5, 11.0),
        ];
        let groups = vec![1, 1, 1, 2, 2, 2];
        (positions, groups)
    }

    #[test]
    fn test_originals_keep_prefix() {
        let (positions, groups) = two_cluster_positions();
        let config = MapConfigBuilder::new().seed(7).build().unwrap();
        let set = augment(&positions, None, &groups, None, &config, 0);

        for i in 0..positions.len() {
            assert_eq!(set.positions[i], positions[i]);
            assert_eq!(set.groups[i], Group::Cluster(groups[i]));
            assert_eq!(set.provenance[i], Some(i));
        }
    }

    #[test]
    fn test_corners_always_appended() {
        let (positions, groups) = two_cluster_positions();
        let config = MapConfigBuilder::new().n_random(1).build().unwrap();
        let set = augment(&positions, None, &groups, None, &config, 0);

        // n_random = 1 means no sea points, corners only
        assert_eq!(set.len(), positions.len() + 4);
        let corners = &set.groups[set.len() - 4..];
        assert!(corners.iter().all(|g| *g == Group::BoundingBox));
        // corners enclose every input point
        let lo = set.positions[set.len() - 4];
        let hi = set.positions[set.len() - 3];
        for p in &positions {
            assert!(p.x > lo.x && p.x < hi.x);
            assert!(p.y > lo.y && p.y < hi.y);
        }
    }

    #[test]
    fn test_sea_points_respect_shore_tolerance() {
        let (positions, groups) = two_cluster_positions();
        let config = MapConfigBuilder::new()
            .seed(11)
            .n_random(100)
            .shore_tolerance(1.5)
            .unwrap()
            .build()
            .unwrap();
        let set = augment(&positions, None, &groups, None, &config, 0);

        for i in 0..set.len() {
            if set.groups[i] != Group::Sea {
                continue;
            }
            for p in &positions {
                assert!(
                    set.positions[i].distance(*p) > 1.5,
                    "sea point {} too close to input",
                    i
                );
            }
        }
    }

    #[test]
    fn test_augment_deterministic() {
        let (positions, groups) = two_cluster_positions();
        let config = MapConfigBuilder::new().seed(99).build().unwrap();
        let a = augment(&positions, None, &groups, None, &config, 0);
        let b = augment(&positions, None, &groups, None, &config, 0);
        assert_eq!(a.positions, b.positions);
        assert_eq!(a.groups, b.groups);
    }

    #[test]
    fn test_rectangle_perimeter_points() {
        let positions = vec![DVec2::new(0.0, 0.0), DVec2::new(5.0, 0.0)];
        let groups = vec![1, 2];
        let hes = vec![DVec2::new(1.0, 0.5), DVec2::new(1.0, 0.5)];
        let config = MapConfigBuilder::new()
            .n_random(1)
            .n_rect_points(4)
            .build()
            .unwrap();
        let set = augment(&positions, Some(&hes), &groups, None, &config, 0);

        // perimeter points inherit their rectangle's group and hug its box
        let perimeter: Vec<usize> = (2..set.len() - 4).collect();
        assert!(!perimeter.is_empty());
        for &i in &perimeter {
            let g = set.groups[i].cluster_id().unwrap();
            let center = positions[(g - 1) as usize];
            let d = (set.positions[i] - center).abs();
            assert!(d.x <= 1.2 && d.y <= 0.8, "perimeter point strayed: {:?}", d);
        }
    }

    #[test]
    fn test_edge_bridge_points_grouping() {
        let positions = vec![DVec2::new(0.0, 0.0), DVec2::new(4.0, 0.0)];
        let groups = vec![1, 2];
        let graph = AdjGraph::from_edges(2, &[(0, 1)]);
        let config = MapConfigBuilder::new()
            .n_random(1)
            .n_edge_points(3)
            .build()
            .unwrap();
        let set = augment(&positions, None, &groups, Some(&graph), &config, 0);

        let bridges: Vec<usize> = (2..set.len() - 4).collect();
        assert_eq!(bridges.len(), 3);
        // points at 1.0, 2.0, 3.0; the midpoint ties toward the first endpoint
        assert_eq!(set.groups[bridges[0]], Group::Cluster(1));
        assert_eq!(set.groups[bridges[1]], Group::Cluster(1));
        assert_eq!(set.groups[bridges[2]], Group::Cluster(2));
    }

    #[test]
    fn test_highlight_reorders_and_demotes() {
        let (positions, groups) = two_cluster_positions();
        let config = MapConfigBuilder::new().n_random(1).build().unwrap();
        let set = augment(&positions, None, &groups, None, &config, 2);

        assert_eq!(set.n_core, 3);
        for i in 0..3 {
            assert_eq!(set.groups[i], Group::Cluster(1));
        }
        // cluster-1 originals are now background sea
        let demoted = set
            .groups
            .iter()
            .filter(|g| **g == Group::Sea)
            .count();
        assert_eq!(demoted, 3);
    }

    #[test]
    fn test_resolve_n_random() {
        assert_eq!(resolve_n_random(0, 10), 10);
        assert_eq!(resolve_n_random(-2, 10), 20);
        assert_eq!(resolve_n_random(2, 10), 0);
        assert_eq!(resolve_n_random(14, 10), 10);
    }

    #[test]
    fn test_auto_side_points_scales_down() {
        assert_eq!(auto_side_points(0), 10);
        assert!(auto_side_points(400) <= 5);
        assert_eq!(auto_side_points(4000), 0);
    }
}
