//! SVG map serialization
//!
//! Pure translation: filled polygons from fill paths, stroked outlines from
//! boundary cycles, node labels and (optionally) graph edges on top, over a
//! sea-colored background. Output is built deterministically so that equal
//! inputs produce byte-identical documents.

use std::fmt::Write as _;

use glam::DVec2;

use crate::color::ColorAssignment;
use crate::config::MapConfig;
use crate::graph::AdjGraph;
use crate::region::Decomposition;

const SEA_COLOR: &str = "#dae2ff";
const MARGIN_FRAC: f64 = 0.05;

struct Frame {
    lo: DVec2,
    hi: DVec2,
}

impl Frame {
    fn of(points: impl Iterator<Item = DVec2>) -> Frame {
        let mut lo = DVec2::splat(f64::INFINITY);
        let mut hi = DVec2::splat(f64::NEG_INFINITY);
        for p in points {
            lo = lo.min(p);
            hi = hi.max(p);
        }
        if !lo.is_finite() || !hi.is_finite() {
            lo = DVec2::ZERO;
            hi = DVec2::ONE;
        }
        let pad = (hi - lo).max_element().max(1.0) * MARGIN_FRAC;
        Frame {
            lo: lo - pad,
            hi: hi + pad,
        }
    }

    /// Map into SVG space (y axis flipped)
    fn map(&self, p: DVec2) -> DVec2 {
        DVec2::new(p.x - self.lo.x, self.hi.y - p.y)
    }

    fn size(&self) -> DVec2 {
        self.hi - self.lo
    }
}

fn write_subpath(d: &mut String, frame: &Frame, centers: &[DVec2], vertices: &[usize]) {
    for (k, &t) in vertices.iter().enumerate() {
        let p = frame.map(centers[t]);
        let op = if k == 0 { 'M' } else { 'L' };
        let _ = write!(d, "{}{:.3} {:.3} ", op, p.x, p.y);
    }
    d.push_str("Z ");
}

/// Serialize one decomposition pass to an SVG document
pub fn emit_svg(
    centers: &[DVec2],
    decomposition: &Decomposition,
    colors: Option<&ColorAssignment>,
    node_positions: &[DVec2],
    labels: Option<&[String]>,
    edges: Option<&AdjGraph>,
    config: &MapConfig,
) -> String {
    let frame = Frame::of(
        centers
            .iter()
            .copied()
            .chain(node_positions.iter().copied()),
    );
    let size = frame.size();

    let mut out = String::new();
    let _ = writeln!(
        out,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{:.3}\" height=\"{:.3}\" viewBox=\"0 0 {:.3} {:.3}\">",
        size.x, size.y, size.x, size.y
    );
    let _ = writeln!(
        out,
        "<rect width=\"{:.3}\" height=\"{:.3}\" fill=\"{}\"/>",
        size.x, size.y, SEA_COLOR
    );

    // solid country fills
    if let Some(colors) = colors {
        for (id, landmass) in decomposition.landmasses.iter().enumerate() {
            let Some(group) = landmass.group.cluster_id() else {
                continue;
            };
            let Some(color) = colors.color_of(group) else {
                continue;
            };
            let mut d = String::new();
            for path in &decomposition.fills[id] {
                write_subpath(&mut d, &frame, centers, &path.0);
            }
            if d.is_empty() {
                continue;
            }
            let _ = writeln!(
                out,
                "<path d=\"{}\" fill=\"{}\" fill-opacity=\"{:.3}\" fill-rule=\"evenodd\" stroke=\"none\"/>",
                d.trim_end(),
                color.to_hex(),
                config.fill_opacity as f64 / 255.0
            );
        }
    }

    // stroked outlines; a negative width disables them
    if config.line_width >= 0.0 {
        for cycles in &decomposition.outlines {
            for cycle in cycles {
                let mut d = String::new();
                write_subpath(&mut d, &frame, centers, &cycle.0);
                let _ = writeln!(
                    out,
                    "<path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{:.3}\"/>",
                    d.trim_end(),
                    config.line_color.to_hex(),
                    config.line_width
                );
            }
        }
    }

    // graph edges overlaid on the map
    if config.plot_edges {
        if let Some(graph) = edges {
            for (u, v, _) in graph.edges() {
                if u == v || u >= node_positions.len() || v >= node_positions.len() {
                    continue;
                }
                let a = frame.map(node_positions[u]);
                let b = frame.map(node_positions[v]);
                let _ = writeln!(
                    out,
                    "<line x1=\"{:.3}\" y1=\"{:.3}\" x2=\"{:.3}\" y2=\"{:.3}\" stroke=\"#000000\" stroke-width=\"0.5\"/>",
                    a.x, a.y, b.x, b.y
                );
            }
        }
    }

    // node labels on top
    if let Some(labels) = labels {
        for (i, label) in labels.iter().enumerate() {
            if i >= node_positions.len() || label.is_empty() {
                continue;
            }
            let p = frame.map(node_positions[i]);
            let _ = writeln!(
                out,
                "<text x=\"{:.3}\" y=\"{:.3}\" text-anchor=\"middle\" font-size=\"10\">{}</text>",
                p.x,
                p.y,
                escape_xml(label)
            );
        }
    }

    out.push_str("</svg>\n");
    out
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
