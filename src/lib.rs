//! Country-map synthesis from clustered graph layouts
//!
//! Takes a 2D layout of graph nodes partitioned into clusters and renders
//! it as a geographic-style map: each cluster becomes one or more colored
//! "country" regions, neighboring countries get contrasting colors, and an
//! optional refinement loop nudges node positions so that connected nodes
//! of one cluster stay on one landmass.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use cluster_atlas::*;
//! use glam::DVec2;
//!
//! let input = MapInput {
//!     positions: vec![
//!         DVec2::new(0.0, 0.0),
//!         DVec2::new(1.0, 0.5),
//!         DVec2::new(5.0, 5.0),
//!     ],
//!     groups: vec![1, 1, 2],
//!     ..Default::default()
//! };
//! let config = MapConfigBuilder::new()
//!     .seed(42)
//!     .contiguity_iterations(2).unwrap()
//!     .build().unwrap();
//!
//! let atlas = Atlas::generate(&input, &config).unwrap();
//! println!("{} landmasses", atlas.landmasses().len());
//! std::fs::write("map.svg", atlas.to_svg()).unwrap();
//! ```
//!
//! # Features
//!
//! - `spatial-index` (default): KD-tree shore-distance queries during point
//!   augmentation instead of a linear scan
//! - `serde`: serialization support for configuration types

// Modules
pub mod error;
pub mod config;
pub mod group;
pub mod graph;
pub mod spatial;
pub mod points;
pub mod triangulate;
pub mod region;
pub mod adjacency;
pub mod color;
pub mod refine;
pub mod emit;
pub mod atlas;

// Re-export core types for convenience
pub use error::{MapError, MapWarning, Result};
pub use config::{ColorScheme, MapConfig, MapConfigBuilder};
pub use group::Group;
pub use graph::AdjGraph;
pub use points::PointSet;
pub use triangulate::{Mesh, Triangle};
pub use region::{BoundaryCycle, Decomposition, FillPath, Landmass};
pub use adjacency::CountryGraph;
pub use color::{ColorAssignment, Rgb};
pub use refine::{ContiguityRefiner, LayoutSolver, RefineState, StressSolver};
pub use atlas::{Atlas, MapInput};

// Re-export glam::DVec2 for convenience
pub use glam::DVec2;
