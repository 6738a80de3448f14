//! Colormaps and normalization for level colors.
//!
//! A contour set maps every level (or band) to a color value, normalizes it,
//! and looks the result up in a colormap. Discrete `colors` lists use a
//! listed colormap indexed directly by integer color values ([`Norm::NoNorm`]).

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::{ContourError, ContourResult};

/// Lookup table size for continuous colormaps.
pub const DEFAULT_LUT_SIZE: usize = 256;

/// Color stop for gradient colormaps
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ColorStop {
    pub value: f64,
    pub color: Color,
    #[serde(default)]
    pub label: Option<String>,
}

/// Colormap as configured: a registered name or explicit stops
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ColormapSpec {
    Named(String),
    Stops(Vec<ColorStop>),
}

impl ColormapSpec {
    pub fn build(&self) -> ContourResult<Colormap> {
        match self {
            ColormapSpec::Named(name) => Colormap::named(name),
            ColormapSpec::Stops(stops) => {
                let mut stops = stops.clone();
                stops.sort_by(|a, b| a.value.total_cmp(&b.value));
                let pairs: Vec<(f64, Color)> = stops.iter().map(|s| (s.value, s.color)).collect();
                Ok(Colormap::from_stops("custom", &pairs, DEFAULT_LUT_SIZE))
            }
        }
    }
}

/// A value-to-color lookup table with under/over/bad colors
#[derive(Debug, Clone, PartialEq)]
pub struct Colormap {
    name: String,
    lut: Vec<Color>,
    under: Option<Color>,
    over: Option<Color>,
    bad: Color,
}

impl Colormap {
    /// A colormap of discrete colors, cycled or truncated to `n` entries.
    pub fn listed(name: impl Into<String>, colors: &[Color], n: Option<usize>) -> Self {
        let lut = if colors.is_empty() {
            vec![Color::BLACK; n.unwrap_or(1).max(1)]
        } else {
            let n = n.unwrap_or(colors.len()).max(1);
            colors.iter().copied().cycle().take(n).collect()
        };
        Self {
            name: name.into(),
            lut,
            under: None,
            over: None,
            bad: Color::TRANSPARENT,
        }
    }

    /// A continuous colormap interpolated between stops.
    ///
    /// Stop values are rescaled onto `[0, 1]`.
    pub fn from_stops(name: impl Into<String>, stops: &[(f64, Color)], n: usize) -> Self {
        let n = n.max(2);
        let lut = match stops {
            [] => vec![Color::BLACK; n],
            [(_, only)] => vec![*only; n],
            _ => {
                let first = stops[0].0;
                let span = stops[stops.len() - 1].0 - first;
                let pos: Vec<f64> = stops
                    .iter()
                    .map(|(v, _)| if span > 0.0 { (v - first) / span } else { 0.0 })
                    .collect();
                (0..n)
                    .map(|i| {
                        let x = i as f64 / (n - 1) as f64;
                        let hi = pos.iter().position(|&p| p >= x).unwrap_or(pos.len() - 1).max(1);
                        let lo = hi - 1;
                        let width = pos[hi] - pos[lo];
                        let t = if width > 0.0 { (x - pos[lo]) / width } else { 0.0 };
                        stops[lo].1.lerp(stops[hi].1, t)
                    })
                    .collect()
            }
        };
        Self {
            name: name.into(),
            lut,
            under: None,
            over: None,
            bad: Color::TRANSPARENT,
        }
    }

    /// Look up a registered colormap by name.
    pub fn named(name: &str) -> ContourResult<Self> {
        let hex = |codes: &[(f64, &str)]| -> Vec<(f64, Color)> {
            codes
                .iter()
                .filter_map(|(v, c)| c.parse().ok().map(|color| (*v, color)))
                .collect()
        };
        let stops = match name.to_ascii_lowercase().as_str() {
            "viridis" => hex(&[
                (0.0, "#440154"),
                (0.11, "#482878"),
                (0.22, "#3e4989"),
                (0.33, "#31688e"),
                (0.44, "#26828e"),
                (0.55, "#1f9e89"),
                (0.66, "#35b779"),
                (0.77, "#6ece58"),
                (0.88, "#b5de2b"),
                (1.0, "#fde725"),
            ]),
            "gray" | "greys_r" => hex(&[(0.0, "#000000"), (1.0, "#ffffff")]),
            "greys" => hex(&[(0.0, "#ffffff"), (1.0, "#000000")]),
            "coolwarm" => hex(&[(0.0, "#3b4cc0"), (0.5, "#dddddd"), (1.0, "#b40426")]),
            // Weather scales, in their physical units
            "temperature" => hex(&[
                (-50.0, "#19004c"),
                (-30.0, "#0000ff"),
                (0.0, "#00ffff"),
                (10.0, "#00ff00"),
                (20.0, "#ffff00"),
                (30.0, "#ffa500"),
                (40.0, "#ff0000"),
                (50.0, "#8b0000"),
            ]),
            "wind_speed" => hex(&[
                (0.0, "#c8c8c8"),
                (5.0, "#00c8ff"),
                (10.0, "#ffff00"),
                (15.0, "#ffa500"),
                (20.0, "#8b0000"),
            ]),
            "pressure" => hex(&[
                (970.0, "#4b0082"),
                (990.0, "#0000ff"),
                (1010.0, "#00ff00"),
                (1030.0, "#ffff00"),
                (1050.0, "#ff0000"),
            ]),
            "humidity" => hex(&[
                (0.0, "#d2b48c"),
                (25.0, "#ffff96"),
                (50.0, "#adff2f"),
                (75.0, "#64c8ff"),
                (100.0, "#1932c8"),
            ]),
            _ => return Err(ContourError::UnknownColormap(name.to_string())),
        };
        Ok(Self::from_stops(name, &stops, DEFAULT_LUT_SIZE))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of lookup-table entries.
    pub fn n(&self) -> usize {
        self.lut.len()
    }

    pub fn colors(&self) -> &[Color] {
        &self.lut
    }

    pub fn set_under(&mut self, color: Color) {
        self.under = Some(color);
    }

    pub fn set_over(&mut self, color: Color) {
        self.over = Some(color);
    }

    pub fn set_bad(&mut self, color: Color) {
        self.bad = color;
    }

    /// Color for values below the range (first entry unless set).
    pub fn under(&self) -> Color {
        self.under.unwrap_or(self.lut[0])
    }

    /// Color for values above the range (last entry unless set).
    pub fn over(&self) -> Color {
        self.over.unwrap_or(self.lut[self.lut.len() - 1])
    }

    pub fn bad(&self) -> Color {
        self.bad
    }

    /// Whether every entry is the same color.
    pub fn is_monochrome(&self) -> bool {
        self.lut.windows(2).all(|w| w[0] == w[1])
    }

    /// Color for a normalized value in `[0, 1]`.
    pub fn sample(&self, x: f64) -> Color {
        if x.is_nan() {
            return self.bad;
        }
        if x < 0.0 {
            return self.under();
        }
        let n = self.lut.len();
        let idx = if x == 1.0 { n - 1 } else { (x * n as f64).floor() as usize };
        if idx >= n {
            return self.over();
        }
        self.lut[idx]
    }

    /// Color for a direct integer index.
    pub fn index(&self, i: i64) -> Color {
        if i < 0 {
            self.under()
        } else if i as usize >= self.lut.len() {
            self.over()
        } else {
            self.lut[i as usize]
        }
    }
}

/// Maps data values onto `[0, 1]` before colormap lookup
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Norm {
    Linear {
        vmin: Option<f64>,
        vmax: Option<f64>,
        clip: bool,
    },
    Log {
        vmin: Option<f64>,
        vmax: Option<f64>,
        clip: bool,
    },
    /// Values are used as direct colormap indices.
    NoNorm,
}

impl Norm {
    pub fn linear(vmin: Option<f64>, vmax: Option<f64>) -> Self {
        Norm::Linear {
            vmin,
            vmax,
            clip: false,
        }
    }

    pub fn log(vmin: Option<f64>, vmax: Option<f64>) -> Self {
        Norm::Log {
            vmin,
            vmax,
            clip: false,
        }
    }

    /// Fill unset limits from the given values.
    pub fn autoscale_none(&mut self, values: &[f64]) {
        let log = matches!(self, Norm::Log { .. });
        let usable = values
            .iter()
            .copied()
            .filter(|v| v.is_finite() && (!log || *v > 0.0));
        let (lo, hi) = usable.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
        if let Norm::Linear { vmin, vmax, .. } | Norm::Log { vmin, vmax, .. } = self {
            if vmin.is_none() && lo.is_finite() {
                *vmin = Some(lo);
            }
            if vmax.is_none() && hi.is_finite() {
                *vmax = Some(hi);
            }
        }
    }

    pub fn set_clip(&mut self, value: bool) {
        if let Norm::Linear { clip, .. } | Norm::Log { clip, .. } = self {
            *clip = value;
        }
    }

    pub fn clip(&self) -> bool {
        match self {
            Norm::Linear { clip, .. } | Norm::Log { clip, .. } => *clip,
            Norm::NoNorm => false,
        }
    }

    pub fn limits(&self) -> Option<(f64, f64)> {
        match self {
            Norm::Linear { vmin, vmax, .. } | Norm::Log { vmin, vmax, .. } => {
                Some(((*vmin)?, (*vmax)?))
            }
            Norm::NoNorm => None,
        }
    }

    /// Normalize one value. `NoNorm` passes values through.
    pub fn normalize(&self, value: f64) -> f64 {
        let result = match *self {
            Norm::NoNorm => return value,
            Norm::Linear { vmin, vmax, .. } => {
                let (lo, hi) = (vmin.unwrap_or(0.0), vmax.unwrap_or(1.0));
                if hi == lo {
                    0.0
                } else {
                    (value - lo) / (hi - lo)
                }
            }
            Norm::Log { vmin, vmax, .. } => {
                if value <= 0.0 {
                    return f64::NAN;
                }
                let (lo, hi) = (vmin.unwrap_or(1.0).log10(), vmax.unwrap_or(10.0).log10());
                if hi == lo {
                    0.0
                } else {
                    (value.log10() - lo) / (hi - lo)
                }
            }
        };
        if self.clip() {
            result.clamp(0.0, 1.0)
        } else {
            result
        }
    }

    /// Normalize and look up a color value, applying an optional alpha.
    pub fn to_rgba(&self, cmap: &Colormap, value: f64, alpha: Option<f64>) -> Color {
        let color = match self {
            Norm::NoNorm => {
                if value.is_nan() {
                    cmap.bad()
                } else {
                    cmap.index(value.floor() as i64)
                }
            }
            _ => cmap.sample(self.normalize(value)),
        };
        match alpha {
            Some(alpha) => color.with_alpha(alpha),
            None => color,
        }
    }
}
