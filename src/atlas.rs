//! Map generation pipeline
//!
//! `Atlas::generate` runs the full sequence: point augmentation, Delaunay
//! triangulation, region decomposition, country adjacency, coloring, and
//! (when a node graph is supplied) the bounded contiguity-refinement loop
//! that repositions nodes between passes.

use glam::DVec2;

use crate::adjacency::CountryGraph;
use crate::color::{assign_colors, ColorAssignment};
use crate::config::MapConfig;
use crate::emit::emit_svg;
use crate::error::{MapError, MapWarning, Result};
use crate::graph::AdjGraph;
use crate::points::{augment, PointSet};
use crate::refine::{ContiguityRefiner, LayoutSolver, StressSolver};
use crate::region::{decompose, Decomposition, Landmass};
use crate::triangulate::triangulate;

/// Input to map generation
///
/// `groups` assigns each node a cluster id; ids should be positive, a
/// non-positive id degrades the map to uncolored outlines. `edges` enables
/// bridge points and contiguity refinement.
#[derive(Debug, Clone, Default)]
pub struct MapInput {
    pub positions: Vec<DVec2>,
    pub half_extents: Option<Vec<DVec2>>,
    pub groups: Vec<i32>,
    pub labels: Option<Vec<String>>,
    pub edges: Option<AdjGraph>,
}

impl MapInput {
    fn validate(&self) -> Result<()> {
        if self.positions.is_empty() {
            return Err(MapError::DegenerateInput("no input points".to_string()));
        }
        if self.groups.len() != self.positions.len() {
            return Err(MapError::InvalidGrouping(format!(
                "{} group ids for {} points",
                self.groups.len(),
                self.positions.len()
            )));
        }
        if let Some(hes) = &self.half_extents {
            if hes.len() != self.positions.len() {
                return Err(MapError::InvalidGrouping(format!(
                    "{} rectangle sizes for {} points",
                    hes.len(),
                    self.positions.len()
                )));
            }
        }
        if let Some(g) = &self.edges {
            if g.num_nodes() != self.positions.len() {
                return Err(MapError::InvalidGrouping(format!(
                    "edge graph has {} nodes for {} points",
                    g.num_nodes(),
                    self.positions.len()
                )));
            }
        }
        Ok(())
    }
}

struct Pass {
    points: PointSet,
    centers: Vec<DVec2>,
    decomposition: Decomposition,
    country_graph: Option<CountryGraph>,
}

/// A generated map
pub struct Atlas {
    positions: Vec<DVec2>,
    points: PointSet,
    centers: Vec<DVec2>,
    decomposition: Decomposition,
    country_graph: Option<CountryGraph>,
    colors: Option<ColorAssignment>,
    warnings: Vec<MapWarning>,
    labels: Option<Vec<String>>,
    edges: Option<AdjGraph>,
    config: MapConfig,
}

impl Atlas {
    /// Generate a map with the built-in stress solver
    pub fn generate(input: &MapInput, config: &MapConfig) -> Result<Atlas> {
        Self::generate_with_solver(input, config, &StressSolver::default())
    }

    /// Generate a map with a caller-supplied layout solver
    pub fn generate_with_solver<S: LayoutSolver>(
        input: &MapInput,
        config: &MapConfig,
        solver: &S,
    ) -> Result<Atlas> {
        input.validate()?;
        let mut warnings = Vec::new();

        let mut highlight = config.highlight_cluster;
        if highlight != 0 && !input.groups.contains(&highlight) {
            log::warn!("highlight cluster {} has no members, drawing full map", highlight);
            warnings.push(MapWarning::HighlightNotFound(highlight));
            highlight = 0;
        }

        let mut positions = input.positions.clone();
        // only the final pass's decomposition warnings are reported
        let mut pass_warnings = Vec::new();
        let mut pass = run_pass(input, &positions, config, highlight, &mut pass_warnings)?;

        if let Some(graph) = input.edges.as_ref().filter(|_| config.contiguity_iterations > 0) {
            let mut refiner = ContiguityRefiner::new(config.contiguity_iterations);
            loop {
                let landmass_of = original_memberships(input.positions.len(), &pass.points, &pass.decomposition);
                let Some(distances) =
                    refiner.next_distances(graph, &input.groups, &positions, &landmass_of)
                else {
                    break;
                };
                log::debug!(
                    "refinement iteration {}: {} split-landmass edges",
                    refiner.completed(),
                    refiner.bad_edges()
                );
                solver.solve(&distances, &mut positions)?;
                pass_warnings.clear();
                pass = run_pass(input, &positions, config, highlight, &mut pass_warnings)?;
            }
            solver.remove_overlap(graph, &mut positions, input.half_extents.as_deref())?;
            pass_warnings.clear();
            pass = run_pass(input, &positions, config, highlight, &mut pass_warnings)?;
        }
        warnings.append(&mut pass_warnings);

        let colors = match &pass.country_graph {
            Some(cg) => assign_colors(cg, config),
            None => {
                log::warn!("non-positive cluster id, emitting uncolored outlines");
                warnings.push(MapWarning::ColoringSkipped);
                None
            }
        };

        Ok(Atlas {
            positions,
            points: pass.points,
            centers: pass.centers,
            decomposition: pass.decomposition,
            country_graph: pass.country_graph,
            colors,
            warnings,
            labels: input.labels.clone(),
            edges: input.edges.clone(),
            config: config.clone(),
        })
    }

    /// Final node positions (refined when refinement ran)
    #[inline]
    pub fn positions(&self) -> &[DVec2] {
        &self.positions
    }

    /// The augmented point set of the final pass
    #[inline]
    pub fn point_set(&self) -> &PointSet {
        &self.points
    }

    /// Landmasses of the final pass
    #[inline]
    pub fn landmasses(&self) -> &[Landmass] {
        &self.decomposition.landmasses
    }

    /// Full region decomposition of the final pass
    #[inline]
    pub fn decomposition(&self) -> &Decomposition {
        &self.decomposition
    }

    /// Country adjacency, `None` when a non-positive cluster id was present
    #[inline]
    pub fn country_graph(&self) -> Option<&CountryGraph> {
        self.country_graph.as_ref()
    }

    /// Resolved colors, `None` when coloring was skipped or disabled
    #[inline]
    pub fn colors(&self) -> Option<&ColorAssignment> {
        self.colors.as_ref()
    }

    /// Warnings accumulated during generation
    #[inline]
    pub fn warnings(&self) -> &[MapWarning] {
        &self.warnings
    }

    /// Serialize the map to an SVG document
    pub fn to_svg(&self) -> String {
        emit_svg(
            &self.centers,
            &self.decomposition,
            self.colors.as_ref(),
            &self.positions,
            self.labels.as_deref(),
            self.edges.as_ref(),
            &self.config,
        )
    }
}

/// One augment/triangulate/decompose/adjacency pass
fn run_pass(
    input: &MapInput,
    positions: &[DVec2],
    config: &MapConfig,
    highlight: i32,
    warnings: &mut Vec<MapWarning>,
) -> Result<Pass> {
    let points = augment(
        positions,
        input.half_extents.as_deref(),
        &input.groups,
        input.edges.as_ref(),
        config,
        highlight,
    );
    let mesh = triangulate(&points)?;
    let decomposition = decompose(&points, &mesh, warnings)?;
    let country_graph = CountryGraph::build(&points, &mesh);
    let centers = mesh.triangles.iter().map(|t| t.center).collect();
    Ok(Pass {
        points,
        centers,
        decomposition,
        country_graph,
    })
}

/// Landmass id per original input point, resolved through provenance
fn original_memberships(
    n: usize,
    points: &PointSet,
    decomposition: &Decomposition,
) -> Vec<Option<usize>> {
    let mut landmass_of = vec![None; n];
    for (slot, prov) in points.provenance.iter().enumerate() {
        if let Some(i) = *prov {
            landmass_of[i] = decomposition.membership[slot];
        }
    }
    landmass_of
}
