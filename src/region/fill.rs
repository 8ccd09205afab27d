//! Fill-path construction via half-edge cycle splicing
//!
//! Solid rendering wants one stroke per landmass even when the landmass has
//! holes. Each landmass point contributes its dual cell (the ring of
//! triangles around it) as a small cycle of half-edges; cells are merged
//! online into the accumulated cycle structure by excising the run of
//! half-edges both sides share and re-linking the cell's far side through
//! the gap.
//!
//! The arena holds two directed half-edges per interior triangulation edge,
//! twins at ids `2k` and `2k+1`, with `next`/`prev` links stored as dense
//! indices. Two half-edge ids alias the same triangulation edge exactly when
//! they share a twin pair (`id / 2`).

use std::collections::HashMap;

use crate::error::{MapError, MapWarning, Result};
use crate::region::Landmass;
use crate::triangulate::Mesh;

/// One directed walk of triangle-dual vertices covering a landmass's outer
/// and hole boundaries; may revisit vertices. Implicitly closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillPath(pub Vec<usize>);

const NOT_SEEN: usize = usize::MAX;

/// Incremental fill-path builder over one mesh
///
/// The arena is built once; per-landmass state (`emask`, cycle links) is
/// reset as a side effect of harvesting, so one builder serves every
/// landmass of a decomposition pass.
pub struct FillBuilder {
    /// Triangle at the head of each half-edge
    head: Vec<usize>,
    /// Triangle at the tail of each half-edge
    tail: Vec<usize>,
    /// Half-edge ids (both twins) incident to each point
    incident: Vec<Vec<usize>>,
    next: Vec<usize>,
    prev: Vec<usize>,
    on_cycle: Vec<bool>,
    /// Last point whose cell touched each half-edge
    emask: Vec<usize>,
}

#[inline]
fn pair(e: usize) -> usize {
    e / 2
}

impl FillBuilder {
    pub fn new(mesh: &Mesh) -> Self {
        let mut head = Vec::new();
        let mut tail = Vec::new();
        let mut incident = vec![Vec::new(); mesh.num_points()];
        for (u, v, t1, t2) in mesh.interior_edges() {
            let e1 = head.len();
            head.push(t1);
            tail.push(t2);
            head.push(t2);
            tail.push(t1);
            incident[u].push(e1);
            incident[u].push(e1 + 1);
            incident[v].push(e1);
            incident[v].push(e1 + 1);
        }
        let ne = head.len();
        Self {
            head,
            tail,
            incident,
            next: (0..ne).collect(),
            prev: (0..ne).collect(),
            on_cycle: vec![false; ne],
            emask: vec![NOT_SEEN; ne],
        }
    }

    /// The two half-edges of point `p`'s cell headed at each surrounding
    /// triangle
    fn cell_links(&self, p: usize) -> HashMap<usize, ([usize; 2], usize)> {
        let mut links: HashMap<usize, ([usize; 2], usize)> = HashMap::new();
        for &e in &self.incident[p] {
            let entry = links.entry(self.head[e]).or_insert(([usize::MAX; 2], 0));
            entry.0[entry.1 % 2] = e;
            entry.1 += 1;
        }
        links
    }

    /// The cell half-edge leaving triangle `t`, other than the one aliasing
    /// `avoid`
    fn cell_edge_from(
        links: &HashMap<usize, ([usize; 2], usize)>,
        t: usize,
        avoid: usize,
    ) -> Result<usize> {
        let (pair_of, _) = links.get(&t).ok_or_else(|| {
            MapError::TopologyViolation(format!("cell ring broken at triangle {}", t))
        })?;
        let e = if pair_of[0] != usize::MAX && pair(pair_of[0]) != pair(avoid) {
            pair_of[0]
        } else {
            pair_of[1]
        };
        if e == usize::MAX {
            return Err(MapError::TopologyViolation(format!(
                "cell ring broken at triangle {}",
                t
            )));
        }
        Ok(e)
    }

    fn insert_after(&mut self, at: usize, e: usize) {
        self.next[e] = self.next[at];
        self.prev[self.next[at]] = e;
        self.prev[e] = at;
        self.next[at] = e;
    }

    /// Start a fresh cycle from point `p`'s whole cell, beginning at `seed`
    fn start_cycle(
        &mut self,
        links: &HashMap<usize, ([usize; 2], usize)>,
        seed: usize,
    ) -> Result<()> {
        self.next[seed] = seed;
        self.prev[seed] = seed;
        self.on_cycle[seed] = true;
        let start_tri = self.head[seed];
        let mut ecur = seed;
        let mut at = self.tail[seed];
        while at != start_tri {
            let enext = Self::cell_edge_from(links, at, ecur)?;
            let to = if self.head[enext] == at {
                self.tail[enext]
            } else {
                self.head[enext]
            };
            self.insert_after(ecur, enext);
            self.on_cycle[enext] = true;
            ecur = enext;
            at = to;
        }
        Ok(())
    }

    /// Merge point `p`'s cell into the cycle that already contains
    /// `duplicate`: excise the shared run, then route the cell's far side
    /// through the gap
    fn splice_cell(
        &mut self,
        links: &HashMap<usize, ([usize; 2], usize)>,
        p: usize,
        duplicate: usize,
    ) -> Result<bool> {
        // forward to the first edge past the shared run
        let mut ecur = duplicate;
        let mut steps = 0usize;
        while self.emask[ecur] == p {
            ecur = self.next[ecur];
            steps += 1;
            if steps > self.head.len() {
                // the whole cycle aliases this cell; no gap exists to route
                // through, keep the structure untouched
                return Ok(false);
            }
        }

        // excise the run backward, remembering its two extremes
        ecur = self.prev[ecur];
        let efirst = ecur;
        let mut elast = ecur;
        while self.emask[ecur] == p {
            self.on_cycle[ecur] = false;
            let en = self.next[ecur];
            let ep = self.prev[ecur];
            self.next[ecur] = ecur;
            self.prev[ecur] = ecur;
            self.next[ep] = en;
            self.prev[en] = ep;
            elast = ecur;
            ecur = ep;
        }

        let ehead = ecur;
        let etail = self.next[ehead];
        let gap_from = self.tail[ehead];
        let gap_to = self.head[etail];

        // first cell edge out of the gap; the run ends at `gap_from`, so
        // avoid stepping straight back onto its last removed edge
        let ec = Self::cell_edge_from(links, gap_from, elast)?;
        self.next[ehead] = ec;
        self.prev[ec] = ehead;
        self.prev[etail] = ec;
        self.next[ec] = etail;

        if pair(ec) == pair(efirst) {
            // the cell's entire boundary was shared: it plugs a hole, the
            // bridge edge alone closes the cycle
            return Ok(true);
        }

        self.on_cycle[ec] = true;
        let mut ecur = ec;
        let mut at = if self.head[ec] == gap_from {
            self.tail[ec]
        } else {
            self.head[ec]
        };
        while at != gap_to {
            let enext = Self::cell_edge_from(links, at, ecur)?;
            let to = if self.head[enext] == at {
                self.tail[enext]
            } else {
                self.head[enext]
            };
            self.next[enext] = self.next[ecur];
            self.prev[enext] = ecur;
            self.next[ecur] = enext;
            self.prev[etail] = enext;
            self.on_cycle[enext] = true;
            ecur = enext;
            at = to;
        }
        Ok(true)
    }

    /// Build the fill path(s) for one landmass
    ///
    /// A well-formed landmass yields exactly one path; degenerate inputs may
    /// leave several disjoint cycles, surfaced as a
    /// [`MapWarning::FragmentedFill`] rather than an error.
    pub fn fill_paths(
        &mut self,
        landmass_id: usize,
        landmass: &Landmass,
        warnings: &mut Vec<MapWarning>,
    ) -> Result<Vec<FillPath>> {
        let mut fragmented = false;
        for &p in &landmass.points {
            let links = self.cell_links(p);
            let mut seed = None;
            let mut duplicate = None;
            for &e in &self.incident[p] {
                if self.on_cycle[e] {
                    duplicate = Some(e);
                }
                self.emask[e] = p;
                seed = Some(e);
            }
            let Some(seed) = seed else {
                // isolated point with no interior edges around it
                continue;
            };
            match duplicate {
                None => self.start_cycle(&links, seed)?,
                Some(d) => {
                    if !self.splice_cell(&links, p, d)? {
                        fragmented = true;
                    }
                }
            }
        }

        // harvest every remaining cycle, clearing membership as we go
        let mut paths = Vec::new();
        for e in 0..self.head.len() {
            if !self.on_cycle[e] {
                continue;
            }
            let mut vertices = Vec::new();
            let mut cur = e;
            loop {
                self.on_cycle[cur] = false;
                vertices.push(self.head[cur]);
                cur = self.next[cur];
                if cur == e {
                    break;
                }
            }
            paths.push(FillPath(vertices));
        }
        // isolate all links touched by this landmass for the next one
        for &p in &landmass.points {
            for &e in &self.incident[p] {
                self.next[e] = e;
                self.prev[e] = e;
            }
        }

        if paths.len() > 1 || fragmented {
            log::warn!(
                "landmass {} fill is fragmented into {} path(s)",
                landmass_id,
                paths.len()
            );
            warnings.push(MapWarning::FragmentedFill {
                landmass: landmass_id,
                paths: paths.len(),
            });
        }
        Ok(paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapConfigBuilder;
    use crate::points::augment;
    use crate::region::extract_landmasses;
    use crate::triangulate::triangulate;
    use glam::DVec2;

    fn scene(
        positions: Vec<DVec2>,
        groups: Vec<i32>,
    ) -> (crate::points::PointSet, Mesh) {
        let config = MapConfigBuilder::new().seed(3).n_random(1).build().unwrap();
        let set = augment(&positions, None, &groups, None, &config, 0);
        let mesh = triangulate(&set).unwrap();
        (set, mesh)
    }

    #[test]
    fn test_simple_landmass_single_path() {
        let (set, mesh) = scene(
            vec![
                DVec2::new(0.0, 0.0),
                DVec2::new(1.0, 0.0),
                DVec2::new(0.5, 1.0),
            ],
            vec![1, 1, 1],
        );
        let (landmasses, _) = extract_landmasses(&set, &mesh);
        let mut builder = FillBuilder::new(&mesh);
        let mut warnings = Vec::new();
        let paths = builder
            .fill_paths(0, &landmasses[0], &mut warnings)
            .unwrap();
        assert_eq!(paths.len(), 1);
        assert!(warnings.is_empty());
        assert!(paths[0].0.len() >= 3);
    }

    #[test]
    fn test_no_half_edge_in_two_paths() {
        let (set, mesh) = scene(
            vec![
                DVec2::new(0.0, 0.0),
                DVec2::new(1.0, 0.0),
                DVec2::new(1.0, 1.0),
                DVec2::new(0.0, 1.0),
                DVec2::new(0.5, 0.5),
            ],
            vec![1, 1, 1, 1, 1],
        );
        let (landmasses, _) = extract_landmasses(&set, &mesh);
        let mut builder = FillBuilder::new(&mesh);
        let mut warnings = Vec::new();
        let paths = builder
            .fill_paths(0, &landmasses[0], &mut warnings)
            .unwrap();
        assert_eq!(paths.len(), 1);

        // consecutive vertex pairs are distinct directed dual steps
        let verts = &paths[0].0;
        let mut steps = std::collections::HashSet::new();
        for k in 0..verts.len() {
            let a = verts[k];
            let b = verts[(k + 1) % verts.len()];
            assert!(steps.insert((a, b)), "dual step {}->{} repeated", a, b);
        }
    }

    #[test]
    fn test_ring_landmass_fill_covers_hole_boundary() {
        // ring of group 1 around a group-2 core: the ring's single fill path
        // must traverse both its outer and inner boundaries
        let mut positions = Vec::new();
        let mut groups = Vec::new();
        for k in 0..8 {
            let a = k as f64 * std::f64::consts::TAU / 8.0;
            positions.push(DVec2::new(4.0 * a.cos(), 4.0 * a.sin()));
            groups.push(1);
        }
        positions.push(DVec2::new(0.0, 0.0));
        groups.push(2);

        let (set, mesh) = scene(positions, groups);
        let (landmasses, _) = extract_landmasses(&set, &mesh);
        let mut warnings = Vec::new();
        let mut builder = FillBuilder::new(&mesh);
        for (id, lm) in landmasses.iter().enumerate() {
            let paths = builder.fill_paths(id, lm, &mut warnings).unwrap();
            assert!(!paths.is_empty());
        }
    }

    #[test]
    fn test_builder_reusable_across_landmasses() {
        let (set, mesh) = scene(
            vec![
                DVec2::new(0.0, 0.0),
                DVec2::new(1.0, 0.0),
                DVec2::new(0.5, 1.0),
                DVec2::new(20.0, 20.0),
                DVec2::new(21.0, 20.0),
                DVec2::new(20.5, 21.0),
            ],
            vec![1, 1, 1, 2, 2, 2],
        );
        let (landmasses, _) = extract_landmasses(&set, &mesh);
        assert_eq!(landmasses.len(), 2);
        let mut builder = FillBuilder::new(&mesh);
        let mut warnings = Vec::new();
        for (id, lm) in landmasses.iter().enumerate() {
            let paths = builder.fill_paths(id, lm, &mut warnings).unwrap();
            assert_eq!(paths.len(), 1, "landmass {} fill", id);
        }
        assert!(warnings.is_empty());
    }
}
