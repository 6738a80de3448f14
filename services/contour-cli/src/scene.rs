//! YAML scene files: a grid, contour options, label options and output size.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::{debug, info};

use contour_engine::tracer::GridAxes;
use contour_engine::transform::AxisScale;
use contour_engine::{Color, ContourOptions, ContourSet, LabelOptions, TrueTypeFont, Viewport};

fn default_width() -> u32 {
    800
}

fn default_height() -> u32 {
    600
}

fn default_amplitude() -> f64 {
    1.0
}

/// Where the gridded values come from
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GridSource {
    /// Row-major values inline in the scene
    Values {
        width: usize,
        height: usize,
        values: Vec<f64>,
    },
    /// A JSON file holding a [`GridFile`]; relative to the scene file
    Json { path: PathBuf },
    /// A Gaussian bump centered in the grid
    Gaussian {
        width: usize,
        height: usize,
        #[serde(default = "default_amplitude")]
        amplitude: f64,
    },
    /// `z = dx * dy` around the grid center
    Saddle { width: usize, height: usize },
}

/// Grid stored as JSON
#[derive(Debug, Clone, Deserialize)]
pub struct GridFile {
    pub width: usize,
    pub height: usize,
    pub values: Vec<f64>,
    /// Column coordinates (default 0..width)
    pub x: Option<Vec<f64>>,
    /// Row coordinates (default 0..height)
    pub y: Option<Vec<f64>>,
}

/// Loaded grid values and optional coordinates
#[derive(Debug, Clone)]
pub struct Grid {
    pub width: usize,
    pub height: usize,
    pub values: Vec<f64>,
    pub axes: Option<GridAxes>,
}

impl GridSource {
    /// Materialize the grid; relative file paths resolve against `base_dir`.
    pub fn load(&self, base_dir: &Path) -> Result<Grid> {
        let grid = match self {
            GridSource::Values { width, height, values } => Grid {
                width: *width,
                height: *height,
                values: values.clone(),
                axes: None,
            },
            GridSource::Json { path } => {
                let path = base_dir.join(path);
                let contents = fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read grid file {}", path.display()))?;
                let file: GridFile = serde_json::from_str(&contents)
                    .with_context(|| format!("Failed to parse grid file {}", path.display()))?;
                let axes = match (file.x, file.y) {
                    (Some(x), Some(y)) => Some(GridAxes::new(x, y)),
                    (None, None) => None,
                    _ => bail!("Grid file {} must give both x and y or neither", path.display()),
                };
                Grid {
                    width: file.width,
                    height: file.height,
                    values: file.values,
                    axes,
                }
            }
            GridSource::Gaussian {
                width,
                height,
                amplitude,
            } => Grid {
                width: *width,
                height: *height,
                values: synthetic(*width, *height, |dx, dy, sigma| {
                    amplitude * (-(dx * dx + dy * dy) / (2.0 * sigma * sigma)).exp()
                }),
                axes: None,
            },
            GridSource::Saddle { width, height } => Grid {
                width: *width,
                height: *height,
                values: synthetic(*width, *height, |dx, dy, _| dx * dy),
                axes: None,
            },
        };

        if grid.values.len() != grid.width * grid.height {
            bail!(
                "Grid has {} values, expected {}x{} = {}",
                grid.values.len(),
                grid.width,
                grid.height,
                grid.width * grid.height
            );
        }
        Ok(grid)
    }
}

/// Evaluate `f(dx, dy, sigma)` at each grid point, offsets from the center.
fn synthetic<F>(width: usize, height: usize, f: F) -> Vec<f64>
where
    F: Fn(f64, f64, f64) -> f64,
{
    let cx = (width as f64 - 1.0) / 2.0;
    let cy = (height as f64 - 1.0) / 2.0;
    let sigma = (width.min(height) as f64 / 4.0).max(1.0);
    (0..height)
        .flat_map(|row| (0..width).map(move |col| (col, row)))
        .map(|(col, row)| f(col as f64 - cx, row as f64 - cy, sigma))
        .collect()
}

/// Canvas size, background and axis placement
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub width: u32,
    pub height: u32,
    pub background: Color,
    /// Data limits as (x0, x1, y0, y1); defaults to the grid's extent
    pub limits: Option<[f64; 4]>,
    pub x_scale: AxisScale,
    pub y_scale: AxisScale,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            background: Color::WHITE,
            limits: None,
            x_scale: AxisScale::Linear,
            y_scale: AxisScale::Linear,
        }
    }
}

/// A complete scene file
#[derive(Debug, Clone, Deserialize)]
pub struct Scene {
    pub grid: GridSource,
    #[serde(default)]
    pub contour: ContourOptions,
    /// Automatic or manual labels; omitted means no labels
    pub labels: Option<LabelOptions>,
    #[serde(default)]
    pub output: OutputConfig,
    /// TrueType font for labels (default built-in segment glyphs)
    pub font: Option<PathBuf>,
    /// Directory relative paths resolve against
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl Scene {
    /// Read and parse a scene file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read scene file {}", path.display()))?;
        let mut scene = Self::from_yaml(&contents)
            .with_context(|| format!("Failed to parse scene file {}", path.display()))?;
        scene.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        debug!(path = ?path, "Loaded scene");
        Ok(scene)
    }

    pub fn from_yaml(contents: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Trace the grid and attach the viewport and label font.
    ///
    /// Labels are not placed here.
    pub fn build_contours(&self) -> Result<ContourSet> {
        let grid = self.grid.load(&self.base_dir)?;
        let axes = match grid.axes {
            Some(axes) => axes,
            None => GridAxes::from_extent(
                self.contour.extent.as_deref(),
                self.contour.origin,
                grid.width,
                grid.height,
            )?,
        };
        let limits = self.output.limits.unwrap_or_else(|| axes_limits(&axes));

        let set = ContourSet::from_grid(
            grid.values,
            grid.width,
            grid.height,
            Some(axes),
            self.contour.clone(),
        )?;
        let viewport = Viewport::new(limits, self.output.width as f64, self.output.height as f64)
            .with_scales(self.output.x_scale, self.output.y_scale);
        let mut set = set.with_transform(Arc::new(viewport));

        if let Some(font) = &self.font {
            let font_path = self.base_dir.join(font);
            let font = TrueTypeFont::from_file(&font_path)
                .with_context(|| format!("Failed to load font {}", font_path.display()))?;
            set.set_text_renderer(Arc::new(font));
        }

        info!(
            levels = set.levels().len(),
            filled = set.is_filled(),
            width = grid.width,
            height = grid.height,
            "Built contour set"
        );
        Ok(set)
    }

    /// Render a contour set to PNG bytes at the configured size.
    pub fn render(&self, set: &ContourSet) -> Result<Vec<u8>> {
        let output = &self.output;
        let pixmap = set.render_pixmap(output.width, output.height, output.background)?;
        pixmap.encode_png().context("Failed to encode PNG")
    }
}

/// (x0, x1, y0, y1) spanned by the grid axes.
fn axes_limits(axes: &GridAxes) -> [f64; 4] {
    let span = |values: &[f64]| {
        values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
    };
    let (x0, x1) = span(&axes.x);
    let (y0, y1) = span(&axes.y);
    [x0, x1, y0, y1]
}
