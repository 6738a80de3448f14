//! Contour set configuration and per-level line styling.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::colormap::ColormapSpec;
use crate::levels::{Extend, LevelScale, LevelSpec};
use crate::locator::LevelLocator;

/// Line width used when none is configured.
pub const DEFAULT_LINE_WIDTH: f64 = 1.5;

/// Dash style of a contour line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
    DashDot,
    Dotted,
}

impl LineStyle {
    /// On/off dash lengths in pixels for a given line width.
    pub fn dash_pattern(self, line_width: f64) -> Option<Vec<f32>> {
        let unit: &[f64] = match self {
            LineStyle::Solid => return None,
            LineStyle::Dashed => &[3.7, 1.6],
            LineStyle::DashDot => &[6.4, 1.6, 1.0, 1.6],
            LineStyle::Dotted => &[1.0, 1.65],
        };
        let scale = line_width.max(1.0);
        Some(unit.iter().map(|d| (d * scale) as f32).collect())
    }
}

/// Hatch pattern for a filled band, e.g. `"//"`, `"x"`, `"|."`.
///
/// Repeating a character increases its density.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Hatch(pub String);

impl Hatch {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self(pattern.into())
    }

    /// Number of repetitions of a hatch character.
    pub fn density(&self, ch: char) -> usize {
        self.0.chars().filter(|&c| c == ch).count()
    }
}

/// Image-style grid placement for `extent`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Lower,
    Upper,
    Image,
}

/// Configuration for building a contour set.
///
/// Every field has a documented default; unknown keys from a config file are
/// collected in `unknown` and reported after construction.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContourOptions {
    /// Explicit levels or a level count to auto-select (default 7 levels)
    pub levels: Option<LevelSpec>,
    /// Filled bands instead of lines
    pub filled: bool,
    /// Discrete colors, one per level or band (exclusive with `cmap`)
    pub colors: Option<Vec<Color>>,
    /// Continuous colormap (default viridis)
    pub cmap: Option<ColormapSpec>,
    pub vmin: Option<f64>,
    pub vmax: Option<f64>,
    pub alpha: Option<f64>,
    pub extend: Extend,
    /// Level spacing and normalization scale
    pub scale: LevelScale,
    /// Line widths, cycled over the levels (default 1.5)
    pub linewidths: Option<Vec<f64>>,
    /// Line styles, cycled over the levels (default solid)
    pub linestyles: Option<Vec<LineStyle>>,
    /// Style for negative levels of monochrome line contours
    pub negative_linestyle: LineStyle,
    /// Hatch patterns, cycled over the bands of filled contours
    pub hatches: Vec<Option<Hatch>>,
    /// Grid placement as (x0, x1, y0, y1)
    pub extent: Option<Vec<f64>>,
    pub origin: Option<Origin>,
    /// Chaikin smoothing passes applied to traced lines
    pub smoothing_passes: u32,
    pub antialiased: bool,
    #[serde(skip)]
    pub locator: Option<Arc<dyn LevelLocator>>,
    #[serde(flatten)]
    pub unknown: BTreeMap<String, serde_json::Value>,
}

impl Default for ContourOptions {
    fn default() -> Self {
        Self {
            levels: None,
            filled: false,
            colors: None,
            cmap: None,
            vmin: None,
            vmax: None,
            alpha: None,
            extend: Extend::Neither,
            scale: LevelScale::Linear,
            linewidths: None,
            linestyles: None,
            negative_linestyle: LineStyle::Dashed,
            hatches: Vec::new(),
            extent: None,
            origin: None,
            smoothing_passes: 0,
            antialiased: true,
            locator: None,
            unknown: BTreeMap::new(),
        }
    }
}

impl std::fmt::Debug for ContourOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContourOptions")
            .field("levels", &self.levels)
            .field("filled", &self.filled)
            .field("colors", &self.colors)
            .field("cmap", &self.cmap)
            .field("extend", &self.extend)
            .field("scale", &self.scale)
            .field("locator", &self.locator)
            .field("unknown", &self.unknown.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl ContourOptions {
    pub fn lines() -> Self {
        Self::default()
    }

    pub fn filled() -> Self {
        Self {
            filled: true,
            ..Self::default()
        }
    }

    pub fn with_levels(mut self, levels: Vec<f64>) -> Self {
        self.levels = Some(LevelSpec::Values(levels));
        self
    }

    pub fn with_level_count(mut self, count: usize) -> Self {
        self.levels = Some(LevelSpec::Count(count));
        self
    }

    pub fn with_colors(mut self, colors: Vec<Color>) -> Self {
        self.colors = Some(colors);
        self
    }

    pub fn with_cmap(mut self, name: impl Into<String>) -> Self {
        self.cmap = Some(ColormapSpec::Named(name.into()));
        self
    }

    pub fn with_extend(mut self, extend: Extend) -> Self {
        self.extend = extend;
        self
    }

    pub fn with_scale(mut self, scale: LevelScale) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_locator(mut self, locator: Arc<dyn LevelLocator>) -> Self {
        self.locator = Some(locator);
        self
    }
}

/// Repeat a list until it covers `n` entries, then truncate.
fn cycle_to<T: Clone>(items: &[T], n: usize) -> Vec<T> {
    items.iter().cloned().cycle().take(n).collect()
}

/// Per-level line widths.
pub fn resolve_linewidths(linewidths: Option<&[f64]>, nlevels: usize) -> Vec<f64> {
    match linewidths {
        Some(widths) if !widths.is_empty() => cycle_to(widths, nlevels),
        _ => vec![DEFAULT_LINE_WIDTH; nlevels],
    }
}

/// Per-level line styles.
///
/// Without explicit styles, monochrome sets draw levels below
/// `-(zmax - zmin) * 1e-15` with the negative style.
pub fn resolve_linestyles(
    linestyles: Option<&[LineStyle]>,
    levels: &[f64],
    monochrome: bool,
    negative: LineStyle,
    zmin: f64,
    zmax: f64,
) -> Vec<LineStyle> {
    match linestyles {
        Some(styles) if !styles.is_empty() => cycle_to(styles, levels.len()),
        _ => {
            let eps = -(zmax - zmin) * 1e-15;
            levels
                .iter()
                .map(|&lev| {
                    if monochrome && lev < eps {
                        negative
                    } else {
                        LineStyle::Solid
                    }
                })
                .collect()
        }
    }
}
