//! Country coloring
//!
//! Colors come from one of the built-in gradient palettes (selected by
//! numeric id) or a custom hex list. With optimization enabled, the palette
//! is permuted so that bordering countries land on contrasting entries:
//! a spectral ordering of the country-graph Laplacian seeds a greedy
//! antibandwidth swap search. Custom palettes instead get a distinct-color
//! greedy assignment over the pairwise hop-distance matrix.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::adjacency::CountryGraph;
use crate::config::{ColorScheme, MapConfig};
use crate::error::{MapError, Result};
use crate::graph::AdjGraph;

/// An 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` (leading `#` optional)
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(MapError::InvalidConfig(format!(
                "invalid hex color {:?}",
                hex
            )));
        }
        let byte = |s: &str| u8::from_str_radix(s, 16).unwrap_or(0);
        Ok(Self {
            r: byte(&digits[0..2]),
            g: byte(&digits[2..4]),
            b: byte(&digits[4..6]),
        })
    }

    /// Format as `#rrggbb`
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Euclidean distance in 8-bit RGB space
    pub fn distance(self, other: Rgb) -> f64 {
        let dr = self.r as f64 - other.r as f64;
        let dg = self.g as f64 - other.g as f64;
        let db = self.b as f64 - other.b as f64;
        (dr * dr + dg * dg + db * db).sqrt()
    }

    fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Rgb::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }
}

/// One RGB per positive group id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorAssignment {
    colors: Vec<Rgb>,
}

impl ColorAssignment {
    /// Color of a group (1-based id)
    pub fn color_of(&self, group: i32) -> Option<Rgb> {
        if group <= 0 {
            return None;
        }
        self.colors.get((group - 1) as usize).copied()
    }

    /// Number of colored groups
    #[inline]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Whether no group is colored
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Minimum color distance across bordering group pairs
    pub fn min_border_distance(&self, cg: &CountryGraph) -> f64 {
        let mut best = f64::INFINITY;
        for a in 1..=self.colors.len() as i32 {
            for (b, _) in cg.borders(a) {
                if b > a {
                    if let (Some(ca), Some(cb)) = (self.color_of(a), self.color_of(b)) {
                        best = best.min(ca.distance(cb));
                    }
                }
            }
        }
        best
    }
}

// Gradient anchor stops; palette entry for country k of n samples the
// gradient at k/(n-1).
const PASTEL: &[Rgb] = &[
    Rgb::new(158, 206, 255),
    Rgb::new(170, 255, 188),
    Rgb::new(255, 254, 172),
    Rgb::new(255, 208, 166),
    Rgb::new(255, 166, 166),
    Rgb::new(237, 170, 255),
];
const BLUE_YELLOW: &[Rgb] = &[
    Rgb::new(0, 0, 255),
    Rgb::new(128, 128, 210),
    Rgb::new(255, 255, 0),
];
const WHITE_RED: &[Rgb] = &[Rgb::new(255, 255, 255), Rgb::new(255, 0, 0)];
const GREY_RED: &[Rgb] = &[Rgb::new(211, 211, 211), Rgb::new(255, 0, 0)];
const PRIMARY: &[Rgb] = &[
    Rgb::new(255, 0, 0),
    Rgb::new(255, 255, 0),
    Rgb::new(0, 255, 0),
    Rgb::new(0, 255, 255),
    Rgb::new(0, 0, 255),
    Rgb::new(255, 0, 255),
];
const SEQ_RED: &[Rgb] = &[Rgb::new(254, 224, 210), Rgb::new(165, 15, 21)];
const ADAM: &[Rgb] = &[
    Rgb::new(227, 26, 28),
    Rgb::new(31, 120, 180),
    Rgb::new(51, 160, 44),
    Rgb::new(255, 127, 0),
    Rgb::new(106, 61, 154),
    Rgb::new(177, 89, 40),
    Rgb::new(166, 206, 227),
    Rgb::new(178, 223, 138),
    Rgb::new(251, 154, 153),
    Rgb::new(253, 191, 111),
    Rgb::new(202, 178, 214),
];
const SEQ_RED_LIGHT: &[Rgb] = &[Rgb::new(255, 245, 240), Rgb::new(251, 106, 74)];
const GREY: &[Rgb] = &[Rgb::new(240, 240, 240), Rgb::new(160, 160, 160)];

fn palette_stops(id: u8) -> &'static [Rgb] {
    match id {
        2 => BLUE_YELLOW,
        3 => WHITE_RED,
        4 => GREY_RED,
        5 => PRIMARY,
        6 => SEQ_RED,
        7 | 8 => ADAM,
        9 => SEQ_RED_LIGHT,
        10 => GREY,
        _ => PASTEL,
    }
}

/// Sample a gradient palette at `t` in `[0, 1]`
fn sample(stops: &[Rgb], t: f64) -> Rgb {
    if stops.len() == 1 {
        return stops[0];
    }
    let scaled = t.clamp(0.0, 1.0) * (stops.len() - 1) as f64;
    let lo = (scaled.floor() as usize).min(stops.len() - 2);
    stops[lo].lerp(stops[lo + 1], scaled - lo as f64)
}

/// Evenly spaced palette colors for `n` countries
fn palette_colors(id: u8, n: usize) -> Vec<Rgb> {
    let stops = palette_stops(id);
    // palette 7 is a discrete scheme, cycled rather than interpolated
    if id == 7 {
        return (0..n).map(|k| stops[k % stops.len()]).collect();
    }
    (0..n)
        .map(|k| sample(stops, k as f64 / (n - 1).max(1) as f64))
        .collect()
}

/// Index ordering of `v` by ascending value
fn vector_ordering(v: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..v.len()).collect();
    order.sort_by(|&a, &b| v[a].partial_cmp(&v[b]).unwrap_or(std::cmp::Ordering::Equal));
    let mut rank = vec![0usize; v.len()];
    for (pos, &i) in order.iter().enumerate() {
        rank[i] = pos;
    }
    rank
}

/// Largest-eigenvector of the country Laplacian via power iteration
fn spectral_ranks(graph: &AdjGraph, seed: u64) -> Vec<usize> {
    const MAXIT: usize = 100;
    const TOLERANCE: f64 = 1e-5;

    let n = graph.num_nodes();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut u: Vec<f64> = (0..n).map(|_| rng.gen::<f64>()).collect();
    let norm = u.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm > 0.0 {
        for x in &mut u {
            *x /= norm;
        }
    }

    let degree: Vec<f64> = (0..n)
        .map(|i| {
            graph
                .neighbors(i)
                .iter()
                .filter(|(j, _)| *j != i)
                .count() as f64
        })
        .collect();

    let mut v = u.clone();
    for _ in 0..MAXIT {
        // vv = L u, with L = D - A (unweighted off-diagonal)
        let mut vv = vec![0.0; n];
        for i in 0..n {
            let mut acc = degree[i] * u[i];
            for &(j, _) in graph.neighbors(i) {
                if j != i {
                    acc -= u[j];
                }
            }
            vv[i] = acc;
        }
        let mut norm = vv.iter().map(|x| x * x).sum::<f64>().sqrt();
        if norm == 0.0 {
            vv.copy_from_slice(&u);
            norm = vv.iter().map(|x| x * x).sum::<f64>().sqrt().max(1.0);
        }
        let mut res = 0.0;
        for i in 0..n {
            u[i] = vv[i] / norm;
            res += u[i] * v[i];
            v[i] = u[i];
        }
        if res >= 1.0 - TOLERANCE {
            break;
        }
    }
    vector_ordering(&v)
}

fn local_min_separation(graph: &AdjGraph, p: &[usize], i: usize) -> usize {
    let mut best = p.len();
    for &(j, _) in graph.neighbors(i) {
        if j != i {
            best = best.min(p[i].abs_diff(p[j]));
        }
    }
    best
}

/// Greedy pairwise swapping that only accepts strict antibandwidth
/// improvements
fn improve_by_swapping(graph: &AdjGraph, p: &mut [usize]) {
    let n = p.len();
    let mut improved = true;
    while improved {
        improved = false;
        for i in 0..n {
            let mut norm_i = local_min_separation(graph, p, i);
            for j in 0..n {
                if j == i {
                    continue;
                }
                let norm_j = local_min_separation(graph, p, j);
                p.swap(i, j);
                let after_i = local_min_separation(graph, p, i);
                let after_j = local_min_separation(graph, p, j);
                if after_i.min(after_j) > norm_i.min(norm_j) {
                    improved = true;
                    norm_i = after_i;
                } else {
                    p.swap(i, j);
                }
            }
        }
    }
}

/// Permute palette entries to maximize contrast between bordering countries
///
/// Falls back to the identity assignment whenever the permuted one would
/// reduce the minimum border color distance, so optimization never hurts.
fn optimize_assignment(base: &[Rgb], cg: &CountryGraph, seed: u64) -> ColorAssignment {
    let n = base.len();
    let identity = ColorAssignment {
        colors: base.to_vec(),
    };
    if n < 3 {
        return identity;
    }
    let mut p = spectral_ranks(cg.as_graph(), seed);
    improve_by_swapping(cg.as_graph(), &mut p);

    let permuted = ColorAssignment {
        colors: (0..n).map(|i| base[p[i]]).collect(),
    };
    if permuted.min_border_distance(cg) >= identity.min_border_distance(cg) {
        permuted
    } else {
        identity
    }
}

/// Distinct-coloring over the pairwise hop-distance matrix: nearby countries
/// get far-apart palette entries
fn distinct_assignment(palette: &[Rgb], cg: &CountryGraph) -> ColorAssignment {
    let n = cg.num_countries();
    let dist = cg.as_graph().distance_matrix();

    // color high-degree countries first
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by_key(|&i| std::cmp::Reverse(cg.as_graph().neighbors(i).len()));

    let mut colors: Vec<Option<Rgb>> = vec![None; n];
    for &i in &order {
        let mut best = palette[0];
        let mut best_score = f64::NEG_INFINITY;
        for &candidate in palette {
            // weight color separation by inverse hop distance
            let mut score = f64::INFINITY;
            for j in 0..n {
                if j == i {
                    continue;
                }
                if let Some(cj) = colors[j] {
                    let hops = dist[i][j].max(1) as f64;
                    score = score.min(candidate.distance(cj) * hops);
                }
            }
            if score > best_score {
                best_score = score;
                best = candidate;
            }
        }
        colors[i] = Some(best);
    }
    ColorAssignment {
        colors: colors.into_iter().map(|c| c.unwrap_or(palette[0])).collect(),
    }
}

/// Resolve the configured color scheme against a country graph
///
/// Returns `None` for [`ColorScheme::None`] (outlines only, no fill).
pub fn assign_colors(cg: &CountryGraph, config: &MapConfig) -> Option<ColorAssignment> {
    let n = cg.num_countries();
    match &config.color_scheme {
        ColorScheme::None => None,
        ColorScheme::Palette(id) => {
            let base = palette_colors(*id, n);
            if config.color_optimize {
                Some(optimize_assignment(&base, cg, config.seed))
            } else {
                Some(ColorAssignment { colors: base })
            }
        }
        ColorScheme::Custom(palette) => {
            if palette.is_empty() {
                return None;
            }
            Some(distinct_assignment(palette, cg))
        }
    }
}
