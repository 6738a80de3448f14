//! Contour sets: levels, colors, line styles and one compound path per
//! level or band.
//!
//! A set is built either from pre-computed polygons
//! ([`ContourSet::from_segments`]) or by tracing gridded data
//! ([`ContourSet::from_grid`], [`ContourSet::from_tracer`]). Paths are stored
//! in data coordinates; the set's [`DataTransform`] maps them to pixels.

use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::color::Color;
use crate::colormap::{Colormap, Norm};
use crate::error::{ContourError, ContourResult};
use crate::geometry::{closest_point_on_polyline, Path, PathCode, Point};
use crate::labeler::LabelState;
use crate::levels::{
    autolev, lowers_and_uppers, process_levels, validate_levels, Extend, LevelScale, LevelSet,
    LevelSpec, DEFAULT_LEVEL_COUNT,
};
use crate::locator::{LevelLocator, LogLocator, MaxNLocator};
use crate::style::{resolve_linestyles, resolve_linewidths, ContourOptions, Hatch, LineStyle};
use crate::text::{SegmentFont, TextRenderer};
use crate::tracer::{blocks_to_path, ContourTracer, GridAxes, MarchingSquares};
use crate::transform::{DataTransform, IdentityTransform};

/// Per-segment codes for [`ContourSet::from_segments`]; `None` entries
/// derive codes from the vertices.
pub type SegmentKinds = Vec<Vec<Option<Vec<PathCode>>>>;

/// Result of a nearest-contour query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestContour {
    /// Index of the level
    pub level: usize,
    /// Connected component within the level's path
    pub segment: usize,
    /// Vertex index within that component
    pub index: usize,
    /// Closest point on the contour
    pub point: Point,
    pub distance_squared: f64,
}

/// A set of contour lines or filled bands
#[derive(Debug, Clone)]
pub struct ContourSet {
    pub(crate) levels: Vec<f64>,
    pub(crate) extended: Vec<f64>,
    pub(crate) layers: Vec<f64>,
    pub(crate) filled: bool,
    pub(crate) extend: Extend,
    pub(crate) scale: LevelScale,
    pub(crate) zmin: f64,
    pub(crate) zmax: f64,
    pub(crate) cvalues: Vec<f64>,
    pub(crate) colormap: Colormap,
    pub(crate) norm: Norm,
    pub(crate) alpha: Option<f64>,
    pub(crate) monochrome: bool,
    pub(crate) linewidths: Vec<f64>,
    pub(crate) linestyles: Vec<LineStyle>,
    pub(crate) hatches: Vec<Option<Hatch>>,
    pub(crate) antialiased: bool,
    pub(crate) paths: Vec<Path>,
    pub(crate) transform: Arc<dyn DataTransform>,
    pub(crate) text_renderer: Arc<dyn TextRenderer>,
    pub(crate) labels: LabelState,
    ignored_options: Vec<String>,
}

impl ContourSet {
    /// Build a set from explicit levels and polygons.
    ///
    /// `allsegs` holds one list of polygons per level (lines) or per band
    /// (filled, one fewer than the levels). `options.levels` is not consulted.
    pub fn from_segments(
        levels: Vec<f64>,
        allsegs: Vec<Vec<Vec<Point>>>,
        allkinds: Option<SegmentKinds>,
        options: ContourOptions,
    ) -> ContourResult<Self> {
        check_options(&options)?;
        validate_levels(&levels, options.filled)?;

        let (expected, wanted) = if options.filled {
            ("one less", levels.len() - 1)
        } else {
            ("same", levels.len())
        };
        if allsegs.len() != wanted {
            return Err(ContourError::SegmentCountMismatch {
                expected,
                segments: allsegs.len(),
                levels: levels.len(),
            });
        }
        let allkinds = match allkinds {
            Some(kinds) => {
                if kinds.len() != allsegs.len() {
                    return Err(ContourError::KindCountMismatch {
                        kinds: kinds.len(),
                        segments: allsegs.len(),
                    });
                }
                kinds
            }
            None => allsegs.iter().map(|segs| vec![None; segs.len()]).collect(),
        };

        let mut paths = Vec::with_capacity(allsegs.len());
        for (segs, kinds) in allsegs.into_iter().zip(allkinds) {
            if kinds.len() != segs.len() {
                return Err(ContourError::KindCountMismatch {
                    kinds: kinds.len(),
                    segments: segs.len(),
                });
            }
            let mut parts = Vec::with_capacity(segs.len());
            for (seg, kind) in segs.into_iter().zip(kinds) {
                parts.push(match kind {
                    Some(codes) if codes.len() == seg.len() => Path::new(seg, codes),
                    Some(codes) => {
                        return Err(ContourError::KindCountMismatch {
                            kinds: codes.len(),
                            segments: seg.len(),
                        })
                    }
                    None => Path::from_segment(seg),
                });
            }
            paths.push(Path::make_compound_path(parts));
        }

        let zmin = levels.iter().copied().fold(f64::INFINITY, f64::min);
        let zmax = levels.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mut set = Self::configure(levels, zmin, zmax, &options)?;
        set.paths = paths;
        set.report_ignored(&options);
        Ok(set)
    }

    /// Trace a row-major grid with the bundled marching-squares tracer.
    ///
    /// Without explicit axes, grid coordinates come from `options.extent`
    /// and `options.origin`, or default to column/row indices.
    pub fn from_grid(
        values: Vec<f64>,
        width: usize,
        height: usize,
        axes: Option<GridAxes>,
        options: ContourOptions,
    ) -> ContourResult<Self> {
        check_options(&options)?;
        let axes = match axes {
            Some(axes) => axes,
            None => {
                GridAxes::from_extent(options.extent.as_deref(), options.origin, width, height)?
            }
        };

        let mut values = values;
        if options.scale == LevelScale::Log {
            let masked = values.iter().filter(|v| **v <= 0.0).count();
            if masked > 0 {
                warn!(masked, "Log scale: values of z <= 0 have been masked");
                for v in values.iter_mut().filter(|v| **v <= 0.0) {
                    *v = f64::NAN;
                }
            }
        }

        let (zmin, zmax) = values
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
        if !zmin.is_finite() {
            return Err(ContourError::InvalidGrid("grid has no finite values".to_string()));
        }

        let tracer = MarchingSquares::new(values, width, height, axes)?
            .with_smoothing(options.smoothing_passes);
        Self::from_tracer(&tracer, zmin, zmax, options)
    }

    /// Build a set from any tracer covering data in `[zmin, zmax]`.
    ///
    /// Levels are traced in parallel and collected in level order.
    pub fn from_tracer(
        tracer: &dyn ContourTracer,
        zmin: f64,
        zmax: f64,
        options: ContourOptions,
    ) -> ContourResult<Self> {
        check_options(&options)?;

        let mut levels = match &options.levels {
            Some(LevelSpec::Values(values)) => values.clone(),
            Some(LevelSpec::Count(n)) => auto_levels(&options, *n, zmin, zmax),
            None => auto_levels(&options, DEFAULT_LEVEL_COUNT, zmin, zmax),
        };
        validate_levels(&levels, options.filled)?;
        if !options.filled && !levels.iter().any(|&l| l > zmin && l < zmax) {
            warn!(zmin, zmax, "No contour levels were found within the data range");
            levels = vec![zmin];
        }

        let mut set = Self::configure(levels, zmin, zmax, &options)?;
        set.paths = if set.filled {
            let (lowers, uppers) = lowers_and_uppers(&set.extended, zmin, set.scale);
            lowers
                .par_iter()
                .zip(uppers.par_iter())
                .map(|(&lower, &upper)| blocks_to_path(tracer.trace_filled_band(lower, upper)))
                .collect()
        } else {
            set.levels
                .par_iter()
                .map(|&level| blocks_to_path(tracer.trace_contour_line(level)))
                .collect()
        };

        debug!(
            levels = set.levels.len(),
            paths = set.paths.len(),
            vertices = set.paths.iter().map(Path::len).sum::<usize>(),
            filled = set.filled,
            "Traced contour set"
        );
        set.report_ignored(&options);
        Ok(set)
    }

    /// Everything but the paths: levels, colors and line styling.
    fn configure(
        levels: Vec<f64>,
        zmin: f64,
        zmax: f64,
        options: &ContourOptions,
    ) -> ContourResult<Self> {
        let level_set = process_levels(&levels, options.filled, options.extend, options.scale);
        let (colormap, norm, cvalues) = resolve_colors(&level_set, options)?;
        let monochrome = colormap.is_monochrome();

        let linewidths = resolve_linewidths(options.linewidths.as_deref(), levels.len());
        let linestyles = resolve_linestyles(
            options.linestyles.as_deref(),
            &levels,
            monochrome,
            options.negative_linestyle,
            zmin,
            zmax,
        );
        let hatches = if options.hatches.is_empty() {
            vec![None; level_set.layers.len()]
        } else {
            options
                .hatches
                .iter()
                .cloned()
                .cycle()
                .take(level_set.layers.len())
                .collect()
        };

        let LevelSet {
            levels,
            extended,
            layers,
        } = level_set;

        Ok(Self {
            levels,
            extended,
            layers,
            filled: options.filled,
            extend: options.extend,
            scale: options.scale,
            zmin,
            zmax,
            cvalues,
            colormap,
            norm,
            alpha: options.alpha,
            monochrome,
            linewidths,
            linestyles,
            hatches,
            antialiased: options.antialiased,
            paths: Vec::new(),
            transform: Arc::new(IdentityTransform),
            text_renderer: Arc::new(SegmentFont),
            labels: LabelState::default(),
            ignored_options: Vec::new(),
        })
    }

    fn report_ignored(&mut self, options: &ContourOptions) {
        self.ignored_options = options.unknown.keys().cloned().collect();
        if !self.ignored_options.is_empty() {
            warn!(
                options = ?self.ignored_options,
                "The following options were not used by the contour set"
            );
        }
    }

    pub fn with_transform(mut self, transform: Arc<dyn DataTransform>) -> Self {
        self.transform = transform;
        self
    }

    pub fn set_transform(&mut self, transform: Arc<dyn DataTransform>) {
        self.transform = transform;
    }

    pub fn transform(&self) -> &dyn DataTransform {
        self.transform.as_ref()
    }

    pub fn with_text_renderer(mut self, renderer: Arc<dyn TextRenderer>) -> Self {
        self.text_renderer = renderer;
        self
    }

    pub fn set_text_renderer(&mut self, renderer: Arc<dyn TextRenderer>) {
        self.text_renderer = renderer;
    }

    pub fn text_renderer(&self) -> &dyn TextRenderer {
        self.text_renderer.as_ref()
    }

    /// The levels as given or selected, without extend sentinels.
    pub fn levels(&self) -> &[f64] {
        &self.levels
    }

    /// Levels with extend sentinels added.
    pub fn extended_levels(&self) -> &[f64] {
        &self.extended
    }

    pub fn layers(&self) -> &[f64] {
        &self.layers
    }

    pub fn is_filled(&self) -> bool {
        self.filled
    }

    pub fn extend(&self) -> Extend {
        self.extend
    }

    pub fn scale(&self) -> LevelScale {
        self.scale
    }

    pub fn zmin(&self) -> f64 {
        self.zmin
    }

    pub fn zmax(&self) -> f64 {
        self.zmax
    }

    /// Color values, one per level (lines) or band (filled).
    pub fn cvalues(&self) -> &[f64] {
        &self.cvalues
    }

    pub fn colormap(&self) -> &Colormap {
        &self.colormap
    }

    pub fn norm(&self) -> &Norm {
        &self.norm
    }

    pub fn alpha(&self) -> Option<f64> {
        self.alpha
    }

    pub fn is_monochrome(&self) -> bool {
        self.monochrome
    }

    pub fn linewidths(&self) -> &[f64] {
        &self.linewidths
    }

    pub fn linestyles(&self) -> &[LineStyle] {
        &self.linestyles
    }

    pub fn hatches(&self) -> &[Option<Hatch>] {
        &self.hatches
    }

    pub fn is_antialiased(&self) -> bool {
        self.antialiased
    }

    /// One compound path per level or band, in data coordinates.
    pub fn paths(&self) -> &[Path] {
        &self.paths
    }

    /// Vertex runs of every level's path.
    pub fn segments(&self) -> Vec<Vec<Vec<Point>>> {
        self.paths.iter().map(Path::segments).collect()
    }

    /// Option keys that were not recognized.
    pub fn ignored_options(&self) -> &[String] {
        &self.ignored_options
    }

    /// Resolved color of every level or band.
    pub fn level_colors(&self) -> Vec<Color> {
        self.cvalues
            .iter()
            .map(|&v| self.norm.to_rgba(&self.colormap, v, self.alpha))
            .collect()
    }

    /// Closest point on any line contour to `(x, y)`.
    ///
    /// With `pixel` the query and distance are in screen space, otherwise in
    /// data space. `indices` restricts the search to some levels. Returns
    /// `None` when the searched levels have no vertices.
    pub fn find_nearest_contour(
        &self,
        x: f64,
        y: f64,
        indices: Option<&[usize]>,
        pixel: bool,
    ) -> ContourResult<Option<NearestContour>> {
        let query = Point::new(x, y);
        let found = if pixel {
            self.nearest_on_screen(query, indices, self.transform.as_ref())?
        } else {
            self.nearest_on_screen(query, indices, &IdentityTransform)?
        };
        let Some((level, vertex, point)) = found else {
            return Ok(None);
        };

        let mut segment = 0;
        let mut index = vertex;
        for component in self.paths[level].connected_components() {
            if index < component.len() {
                break;
            }
            index -= component.len();
            segment += 1;
        }

        Ok(Some(NearestContour {
            level,
            segment,
            index,
            point,
            distance_squared: point.distance_squared(query),
        }))
    }

    /// Level index, vertex index within that level's path, and projected
    /// screen point of the contour closest to a screen point.
    pub(crate) fn nearest_on_screen(
        &self,
        query: Point,
        indices: Option<&[usize]>,
        transform: &dyn DataTransform,
    ) -> ContourResult<Option<(usize, usize, Point)>> {
        if self.filled {
            return Err(ContourError::FilledContourQuery);
        }
        let all: Vec<usize>;
        let indices = match indices {
            Some(indices) => indices,
            None => {
                all = (0..self.paths.len()).collect();
                &all
            }
        };

        let mut best: Option<(f64, usize, usize, Point)> = None;
        for &level in indices {
            let Some(path) = self.paths.get(level) else {
                continue;
            };
            let mut start = 0;
            for component in path.connected_components() {
                let screen = transform.to_screen_all(component.vertices());
                let (d2, proj, (_, end)) = closest_point_on_polyline(&screen, query);
                if best.map_or(true, |(best_d2, ..)| d2 < best_d2) {
                    best = Some((d2, level, start + end, proj));
                }
                start += component.len();
            }
        }
        Ok(best.map(|(_, level, vertex, point)| (level, vertex, point)))
    }
}

fn check_options(options: &ContourOptions) -> ContourResult<()> {
    if options.colors.is_some() && options.cmap.is_some() {
        return Err(ContourError::ConflictingColorSource);
    }
    if let Some(extent) = &options.extent {
        if extent.len() != 4 {
            return Err(ContourError::InvalidExtent(extent.len()));
        }
    }
    Ok(())
}

fn auto_levels(options: &ContourOptions, n: usize, zmin: f64, zmax: f64) -> Vec<f64> {
    let locator: Arc<dyn LevelLocator> = match (&options.locator, options.scale) {
        (Some(locator), _) => Arc::clone(locator),
        (None, LevelScale::Log) => Arc::new(LogLocator::default()),
        (None, LevelScale::Linear) => Arc::new(MaxNLocator::new(n + 1).min_n_ticks(1)),
    };
    autolev(locator.as_ref(), zmin, zmax, options.extend)
}

/// Colormap, norm and per-band color values.
fn resolve_colors(
    levels: &LevelSet,
    options: &ContourOptions,
) -> ContourResult<(Colormap, Norm, Vec<f64>)> {
    let extend = options.extend;

    if let Some(colors) = &options.colors {
        let ncolors = if options.filled {
            levels.levels.len() - 1
        } else {
            levels.levels.len()
        };

        // One color per band plus one per extended side: the outer colors
        // become the under/over colors.
        let use_under_over = colors.len() == ncolors + extend.count() && extend.is_active();
        let skip = usize::from(use_under_over && extend.extends_min());
        let mut colormap = Colormap::listed("from_list", &colors[skip..], Some(ncolors));
        if use_under_over {
            if let (true, Some(first)) = (extend.extends_min(), colors.first()) {
                colormap.set_under(*first);
            }
            if let (true, Some(last)) = (extend.extends_max(), colors.last()) {
                colormap.set_over(*last);
            }
        }

        let (mut i0, mut i1) = (0i64, levels.levels.len() as i64);
        if options.filled {
            i1 -= 1;
            if extend.extends_min() {
                i0 -= 1;
            }
            if extend.extends_max() {
                i1 += 1;
            }
        }
        let cvalues = (i0..i1).map(|i| i as f64).collect();
        return Ok((colormap, Norm::NoNorm, cvalues));
    }

    let colormap = match &options.cmap {
        Some(spec) => spec.build()?,
        None => Colormap::named("viridis")?,
    };
    let mut norm = match options.scale {
        LevelScale::Log => Norm::log(options.vmin, options.vmax),
        LevelScale::Linear => Norm::linear(options.vmin, options.vmax),
    };
    norm.autoscale_none(&levels.levels);
    if extend.is_active() {
        norm.set_clip(false);
    }
    Ok((colormap, norm, levels.layers.clone()))
}
