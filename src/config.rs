//! Map configuration and builder
//!
//! Mirrors the option surface of the reference tool: bounding-box margin,
//! random sea points, shore tolerance, artificial point density, edge bridge
//! points, contiguity iterations, color scheme, opacity, line styling,
//! highlighting and the coloring seed. Zero/negative values mean "auto" where
//! the reference tool treats them that way; see the individual setters.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::error::{MapError, Result};

/// Which colors the countries receive
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum ColorScheme {
    /// No polygon fill at all; outlines only
    None,
    /// One of the built-in numeric palettes (1..=10, 1 = pastel default)
    Palette(u8),
    /// Explicit color list, assigned by the distinct-coloring optimizer
    /// over the country hop-distance matrix
    Custom(Vec<Rgb>),
}

impl Default for ColorScheme {
    fn default() -> Self {
        ColorScheme::Palette(1)
    }
}

/// Configuration for one map construction
///
/// Build through [`MapConfigBuilder`]; the same configuration and input
/// always produce an identical map.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct MapConfig {
    /// Bounding-box margin for sea points. `0.0` = auto
    /// (`max(0.2 * extent, 2 * shore_tolerance)` per axis), negative = that
    /// fraction of the extent.
    pub margin: f64,
    /// Number of random sea/lake points. `0` = auto (one per input point),
    /// negative = `|n| *` input point count.
    pub n_random: i32,
    /// Rejection distance for sea points near real points. `0.0` = auto
    /// (average spacing), negative = that multiple of the average rectangle
    /// size.
    pub shore_tolerance: f64,
    /// Artificial points per rectangle side. Negative = auto, scaled down
    /// with point count.
    pub n_rect_points: i32,
    /// Bridge points inserted along each graph edge. `0` = none.
    pub n_edge_points: usize,
    /// Contiguity-improvement iterations. `0` = single pass, no refinement.
    pub contiguity_iterations: usize,
    /// Color scheme for country fills
    pub color_scheme: ColorScheme,
    /// Permute palette colors to maximize contrast between neighboring
    /// countries (on by default)
    pub color_optimize: bool,
    /// Fill opacity, `0..=255`
    pub fill_opacity: u8,
    /// Outline stroke width; negative = no outlines
    pub line_width: f64,
    /// Outline stroke color
    pub line_color: Rgb,
    /// Draw only this cluster (0 = whole map)
    pub highlight_cluster: i32,
    /// Retain near-shore random points to roughen the coastline
    pub include_ok_points: bool,
    /// Overlay the input graph edges on the emitted map
    pub plot_edges: bool,
    /// Seed for the coloring optimizer and boundary perturbation
    pub seed: u64,
}

impl Default for MapConfig {
    fn default() -> Self {
        MapConfigBuilder::new().build().unwrap()
    }
}

/// Builder for [`MapConfig`] with validation
///
/// # Example
///
/// ```rust
/// use cluster_atlas::MapConfigBuilder;
///
/// let config = MapConfigBuilder::new()
///     .seed(123)
///     .n_random(200)
///     .contiguity_iterations(3).unwrap()
///     .line_width(1.0).unwrap()
///     .build()
///     .unwrap();
/// assert_eq!(config.n_random, 200);
/// ```
#[derive(Debug, Clone)]
pub struct MapConfigBuilder {
    config: MapConfig,
}

impl MapConfigBuilder {
    /// Create a builder with the reference tool's defaults
    pub fn new() -> Self {
        Self {
            config: MapConfig {
                margin: 0.0,
                n_random: -1,
                shore_tolerance: 0.0,
                n_rect_points: -1,
                n_edge_points: 0,
                contiguity_iterations: 0,
                color_scheme: ColorScheme::default(),
                color_optimize: true,
                fill_opacity: 255,
                line_width: 0.0,
                line_color: Rgb::new(0, 0, 0),
                highlight_cluster: 0,
                include_ok_points: false,
                plot_edges: false,
                seed: 123,
            },
        }
    }

    /// Set the bounding-box margin (0 = auto, negative = relative fraction)
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the margin is not finite.
    pub fn margin(mut self, margin: f64) -> Result<Self> {
        if !margin.is_finite() {
            return Err(MapError::InvalidConfig(format!(
                "margin must be finite (got {})",
                margin
            )));
        }
        self.config.margin = margin;
        Ok(self)
    }

    /// Set the random sea-point count (0 = auto, negative = scaled by input size)
    pub fn n_random(mut self, n: i32) -> Self {
        self.config.n_random = n;
        self
    }

    /// Set the shore tolerance (0 = auto, negative = relative)
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the tolerance is not finite.
    pub fn shore_tolerance(mut self, tol: f64) -> Result<Self> {
        if !tol.is_finite() {
            return Err(MapError::InvalidConfig(format!(
                "shore tolerance must be finite (got {})",
                tol
            )));
        }
        self.config.shore_tolerance = tol;
        Ok(self)
    }

    /// Set the per-rectangle-side artificial point count (negative = auto)
    pub fn n_rect_points(mut self, n: i32) -> Self {
        self.config.n_rect_points = n;
        self
    }

    /// Set the number of bridge points per graph edge
    pub fn n_edge_points(mut self, n: usize) -> Self {
        self.config.n_edge_points = n;
        self
    }

    /// Set the contiguity-improvement iteration count
    ///
    /// Each iteration reruns the full pipeline, so large counts are slow.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the count exceeds 100.
    pub fn contiguity_iterations(mut self, n: usize) -> Result<Self> {
        if n > 100 {
            return Err(MapError::InvalidConfig(format!(
                "contiguity iterations must be <= 100 (got {})",
                n
            )));
        }
        self.config.contiguity_iterations = n;
        Ok(self)
    }

    /// Select a color scheme
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for an unknown numeric palette id or an empty
    /// custom color list.
    pub fn color_scheme(mut self, scheme: ColorScheme) -> Result<Self> {
        match &scheme {
            ColorScheme::Palette(id) if !(1..=10).contains(id) => {
                return Err(MapError::InvalidConfig(format!(
                    "palette id must be 1..=10 (got {})",
                    id
                )));
            }
            ColorScheme::Custom(colors) if colors.is_empty() => {
                return Err(MapError::InvalidConfig(
                    "custom color list must not be empty".to_string(),
                ));
            }
            _ => {}
        }
        self.config.color_scheme = scheme;
        Ok(self)
    }

    /// Parse a comma-separated hex color list (for example
    /// `"#ff0000,#00ff00"`) into a custom scheme
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for malformed hex colors.
    pub fn custom_colors(self, list: &str) -> Result<Self> {
        let colors = list
            .split(',')
            .map(|s| Rgb::from_hex(s.trim()))
            .collect::<Result<Vec<_>>>()?;
        self.color_scheme(ColorScheme::Custom(colors))
    }

    /// Enable or disable the contrast-maximizing color permutation
    pub fn color_optimize(mut self, on: bool) -> Self {
        self.config.color_optimize = on;
        self
    }

    /// Set the polygon fill opacity (0..=255)
    pub fn fill_opacity(mut self, opacity: u8) -> Self {
        self.config.fill_opacity = opacity;
        self
    }

    /// Set the outline width (negative = no outlines)
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the width is not finite.
    pub fn line_width(mut self, width: f64) -> Result<Self> {
        if !width.is_finite() {
            return Err(MapError::InvalidConfig(format!(
                "line width must be finite (got {})",
                width
            )));
        }
        self.config.line_width = width;
        Ok(self)
    }

    /// Set the outline color from a hex string
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for a malformed hex color.
    pub fn line_color(mut self, hex: &str) -> Result<Self> {
        self.config.line_color = Rgb::from_hex(hex)?;
        Ok(self)
    }

    /// Draw only the given cluster (0 = whole map)
    pub fn highlight_cluster(mut self, id: i32) -> Self {
        self.config.highlight_cluster = id.max(0);
        self
    }

    /// Keep near-shore random points for a rougher coastline
    pub fn include_ok_points(mut self, on: bool) -> Self {
        self.config.include_ok_points = on;
        self
    }

    /// Overlay the input graph edges on the emitted map
    pub fn plot_edges(mut self, on: bool) -> Self {
        self.config.plot_edges = on;
        self
    }

    /// Set the random seed used for coloring and boundary perturbation
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<MapConfig> {
        Ok(self.config)
    }
}

impl Default for MapConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = MapConfigBuilder::new().build().unwrap();
        assert_eq!(config.margin, 0.0);
        assert_eq!(config.n_random, -1);
        assert_eq!(config.color_scheme, ColorScheme::Palette(1));
        assert!(config.color_optimize);
        assert_eq!(config.seed, 123);
    }

    #[test]
    fn test_builder_custom() {
        let config = MapConfigBuilder::new()
            .seed(42)
            .n_random(50)
            .n_edge_points(2)
            .contiguity_iterations(3)
            .unwrap()
            .highlight_cluster(4)
            .build()
            .unwrap();
        assert_eq!(config.seed, 42);
        assert_eq!(config.n_random, 50);
        assert_eq!(config.n_edge_points, 2);
        assert_eq!(config.contiguity_iterations, 3);
        assert_eq!(config.highlight_cluster, 4);
    }

    #[test]
    fn test_invalid_palette_id() {
        assert!(MapConfigBuilder::new()
            .color_scheme(ColorScheme::Palette(0))
            .is_err());
        assert!(MapConfigBuilder::new()
            .color_scheme(ColorScheme::Palette(11))
            .is_err());
        assert!(MapConfigBuilder::new()
            .color_scheme(ColorScheme::Palette(10))
            .is_ok());
    }

    #[test]
    fn test_invalid_margin() {
        assert!(MapConfigBuilder::new().margin(f64::NAN).is_err());
        assert!(MapConfigBuilder::new().margin(-0.5).is_ok());
    }

    #[test]
    fn test_too_many_iterations() {
        assert!(MapConfigBuilder::new().contiguity_iterations(101).is_err());
    }

    #[test]
    fn test_custom_color_list() {
        let config = MapConfigBuilder::new()
            .custom_colors("#ff0000, #00ff00")
            .unwrap()
            .build()
            .unwrap();
        match config.color_scheme {
            ColorScheme::Custom(colors) => {
                assert_eq!(colors, vec![Rgb::new(255, 0, 0), Rgb::new(0, 255, 0)]);
            }
            other => panic!("expected custom scheme, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_hex_rejected() {
        assert!(MapConfigBuilder::new().custom_colors("#zzz").is_err());
        assert!(MapConfigBuilder::new().line_color("red").is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_config_serialization() {
        let config = MapConfigBuilder::new().seed(7).build().unwrap();
        let json = serde_json::to_string(&config).unwrap();
        let restored: MapConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, restored);
    }
}
