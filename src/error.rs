//! Error and warning types for map construction

use std::fmt;

/// Errors that can occur while building a map
#[derive(Debug, Clone, PartialEq)]
pub enum MapError {
    /// Configuration validation failed
    InvalidConfig(String),
    /// Triangulation could not be formed (fewer than 3 effective points,
    /// collinear input, coincident points)
    DegenerateInput(String),
    /// A non-positive cluster id reached a stage that requires positive ids
    InvalidGrouping(String),
    /// The half-edge cycle structure was left inconsistent by a splice.
    /// This indicates an internal defect, not bad input.
    TopologyViolation(String),
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapError::InvalidConfig(msg) => write!(f, "invalid configuration: {}", msg),
            MapError::DegenerateInput(msg) => write!(f, "degenerate input: {}", msg),
            MapError::InvalidGrouping(msg) => write!(f, "invalid grouping: {}", msg),
            MapError::TopologyViolation(msg) => write!(f, "topology violation: {}", msg),
        }
    }
}

impl std::error::Error for MapError {}

/// Result type alias for map operations
pub type Result<T> = std::result::Result<T, MapError>;

/// Non-fatal conditions surfaced on the finished map
///
/// Warnings are also logged via the `log` crate but never abort the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum MapWarning {
    /// The requested highlight cluster has no member points; the full map
    /// was rendered instead
    HighlightNotFound(i32),
    /// A landmass fill could not be spliced into a single path and was
    /// rendered as `paths` disjoint strokes
    FragmentedFill { landmass: usize, paths: usize },
    /// Coloring was skipped because a cluster id was not positive
    ColoringSkipped,
}

impl fmt::Display for MapWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapWarning::HighlightNotFound(id) => {
                write!(f, "highlighted cluster {} not found - ignored", id)
            }
            MapWarning::FragmentedFill { landmass, paths } => {
                write!(f, "landmass {} fill split into {} paths", landmass, paths)
            }
            MapWarning::ColoringSkipped => {
                write!(f, "non-positive cluster id, coloring skipped")
            }
        }
    }
}
