//! Contour tracing backends.
//!
//! The contour set only depends on the [`ContourTracer`] contract. The
//! bundled [`MarchingSquares`] tracer walks a rectilinear grid cell by cell:
//! line contours interpolate crossings on cell edges and join the resulting
//! segments into polylines; filled bands clip each cell against the band.

use std::collections::HashMap;

use crate::error::{ContourError, ContourResult};
use crate::geometry::{Path, PathCode, Point};
use crate::style::Origin;

/// Vertex blocks and their parallel code blocks, one pair per polyline.
pub type TracedBlocks = (Vec<Vec<Point>>, Vec<Vec<PathCode>>);

/// An engine that turns gridded scalar data into contour geometry.
pub trait ContourTracer: Send + Sync {
    /// Lines along `level`.
    fn trace_contour_line(&self, level: f64) -> TracedBlocks;

    /// Closed polygons covering `lower < z <= upper`.
    fn trace_filled_band(&self, lower: f64, upper: f64) -> TracedBlocks;
}

/// Concatenate traced blocks into one compound path.
pub fn blocks_to_path((vertices, codes): TracedBlocks) -> Path {
    Path::make_compound_path(
        vertices
            .into_iter()
            .zip(codes)
            .map(|(v, c)| Path::new(v, c)),
    )
}

/// Data coordinates of the grid columns and rows
#[derive(Debug, Clone, PartialEq)]
pub struct GridAxes {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl GridAxes {
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Self {
        Self { x, y }
    }

    /// Column and row indices as coordinates.
    pub fn indices(nx: usize, ny: usize) -> Self {
        Self {
            x: (0..nx).map(|i| i as f64).collect(),
            y: (0..ny).map(|j| j as f64).collect(),
        }
    }

    /// Axes from an `(x0, x1, y0, y1)` extent.
    ///
    /// Without an origin the extent spans the first to last grid point.
    /// With an origin, grid points sit at cell centres as for an image,
    /// and `upper`/`image` place row 0 at the top (`y1`).
    pub fn from_extent(
        extent: Option<&[f64]>,
        origin: Option<Origin>,
        nx: usize,
        ny: usize,
    ) -> ContourResult<Self> {
        if let Some(extent) = extent {
            if extent.len() != 4 {
                return Err(ContourError::InvalidExtent(extent.len()));
            }
        }

        let Some(origin) = origin else {
            return Ok(match extent {
                None => Self::indices(nx, ny),
                Some(e) => Self {
                    x: linspace(e[0], e[1], nx),
                    y: linspace(e[2], e[3], ny),
                },
            });
        };

        let (x0, x1, y0, y1) = match extent {
            Some(e) => (e[0], e[1], e[2], e[3]),
            None => (0.0, nx as f64, 0.0, ny as f64),
        };
        let dx = (x1 - x0) / nx as f64;
        let dy = (y1 - y0) / ny as f64;
        let x = (0..nx).map(|i| x0 + (i as f64 + 0.5) * dx).collect();
        let mut y: Vec<f64> = (0..ny).map(|j| y0 + (j as f64 + 0.5) * dy).collect();
        if matches!(origin, Origin::Upper | Origin::Image) {
            y.reverse();
        }
        Ok(Self { x, y })
    }

    /// Map fractional (column, row) indices onto data coordinates.
    fn to_data(&self, col: f64, row: f64) -> Point {
        Point::new(interp_axis(&self.x, col), interp_axis(&self.y, row))
    }
}

fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            (0..n).map(|i| start + i as f64 * step).collect()
        }
    }
}

fn interp_axis(axis: &[f64], idx: f64) -> f64 {
    if axis.len() < 2 {
        return axis.first().copied().unwrap_or(idx);
    }
    let i = (idx.floor().max(0.0) as usize).min(axis.len() - 2);
    let t = idx - i as f64;
    axis[i] + t * (axis[i + 1] - axis[i])
}

/// A line segment between two points (grid index space)
#[derive(Debug, Clone, Copy)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

/// Marching squares over a row-major grid
#[derive(Debug, Clone)]
pub struct MarchingSquares {
    data: Vec<f64>,
    width: usize,
    height: usize,
    axes: GridAxes,
    smoothing_passes: u32,
}

impl MarchingSquares {
    pub fn new(data: Vec<f64>, width: usize, height: usize, axes: GridAxes) -> ContourResult<Self> {
        if width < 2 || height < 2 {
            return Err(ContourError::InvalidGrid(format!(
                "grid must be at least 2x2, got {}x{}",
                width, height
            )));
        }
        if data.len() != width * height {
            return Err(ContourError::InvalidGrid(format!(
                "expected {} values for a {}x{} grid, got {}",
                width * height,
                width,
                height,
                data.len()
            )));
        }
        if axes.x.len() != width || axes.y.len() != height {
            return Err(ContourError::InvalidGrid(format!(
                "axes have {}x{} coordinates for a {}x{} grid",
                axes.x.len(),
                axes.y.len(),
                width,
                height
            )));
        }
        Ok(Self {
            data,
            width,
            height,
            axes,
            smoothing_passes: 0,
        })
    }

    /// Number of Chaikin smoothing passes applied to traced lines.
    pub fn with_smoothing(mut self, passes: u32) -> Self {
        self.smoothing_passes = passes;
        self
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Cell corners (tl, tr, br, bl), or None when any corner is NaN.
    fn cell(&self, x: usize, y: usize) -> Option<[f64; 4]> {
        let w = self.width;
        let corners = [
            self.data[y * w + x],
            self.data[y * w + x + 1],
            self.data[(y + 1) * w + x + 1],
            self.data[(y + 1) * w + x],
        ];
        if corners.iter().any(|v| v.is_nan()) {
            None
        } else {
            Some(corners)
        }
    }

    /// Line segments crossing `level`, in grid index coordinates.
    pub fn march_squares(&self, level: f64) -> Vec<Segment> {
        let mut segments = Vec::new();

        for y in 0..(self.height - 1) {
            for x in 0..(self.width - 1) {
                let Some([tl, tr, br, bl]) = self.cell(x, y) else {
                    continue;
                };

                let mut cell_index = 0u8;
                if tl >= level {
                    cell_index |= 1;
                }
                if tr >= level {
                    cell_index |= 2;
                }
                if br >= level {
                    cell_index |= 4;
                }
                if bl >= level {
                    cell_index |= 8;
                }

                push_cell_segments(
                    &mut segments,
                    cell_index,
                    x as f64,
                    y as f64,
                    [tl, tr, br, bl],
                    level,
                );
            }
        }

        segments
    }

    fn to_data_points(&self, points: &[Point]) -> Vec<Point> {
        points.iter().map(|p| self.axes.to_data(p.x, p.y)).collect()
    }
}

impl ContourTracer for MarchingSquares {
    fn trace_contour_line(&self, level: f64) -> TracedBlocks {
        let mut vertices = Vec::new();
        let mut codes = Vec::new();

        for polyline in connect_segments(self.march_squares(level)) {
            let (points, closed) = if self.smoothing_passes > 0 {
                smooth_polyline(&polyline.points, polyline.closed, self.smoothing_passes)
            } else {
                (polyline.points, polyline.closed)
            };
            let mut block = self.to_data_points(&points);
            let mut block_codes = vec![PathCode::LineTo; block.len()];
            block_codes[0] = PathCode::MoveTo;
            if closed {
                block.push(block[0]);
                block_codes.push(PathCode::ClosePoly);
            }
            vertices.push(block);
            codes.push(block_codes);
        }

        (vertices, codes)
    }

    fn trace_filled_band(&self, lower: f64, upper: f64) -> TracedBlocks {
        let mut vertices = Vec::new();
        let mut codes = Vec::new();

        for y in 0..(self.height - 1) {
            for x in 0..(self.width - 1) {
                let Some([tl, tr, br, bl]) = self.cell(x, y) else {
                    continue;
                };
                let corners = [
                    (Point::new(x as f64, y as f64), tl),
                    (Point::new(x as f64 + 1.0, y as f64), tr),
                    (Point::new(x as f64 + 1.0, y as f64 + 1.0), br),
                    (Point::new(x as f64, y as f64 + 1.0), bl),
                ];
                if corners.iter().all(|&(_, z)| z <= lower)
                    || corners.iter().all(|&(_, z)| z > upper)
                {
                    continue;
                }

                let polygons = if corners.iter().all(|&(_, z)| z > lower && z <= upper) {
                    vec![corners.iter().map(|&(p, _)| p).collect::<Vec<_>>()]
                } else {
                    let triangles = [
                        vec![corners[0], corners[1], corners[2]],
                        vec![corners[0], corners[2], corners[3]],
                    ];
                    triangles
                        .iter()
                        .map(|tri| clip_band(tri, lower, upper))
                        .filter(|poly| poly.len() >= 3)
                        .collect()
                };

                for polygon in polygons {
                    let mut block = self.to_data_points(&polygon);
                    block.push(block[0]);
                    let mut block_codes = vec![PathCode::LineTo; block.len()];
                    block_codes[0] = PathCode::MoveTo;
                    block_codes[block.len() - 1] = PathCode::ClosePoly;
                    vertices.push(block);
                    codes.push(block_codes);
                }
            }
        }

        (vertices, codes)
    }
}

/// Get line segments for a marching squares cell
///
/// Uses linear interpolation to find where the contour crosses cell edges
fn push_cell_segments(
    out: &mut Vec<Segment>,
    cell_index: u8,
    x: f64,
    y: f64,
    [tl, tr, br, bl]: [f64; 4],
    level: f64,
) {
    let top = || interpolate_edge(x, y, x + 1.0, y, tl, tr, level);
    let right = || interpolate_edge(x + 1.0, y, x + 1.0, y + 1.0, tr, br, level);
    let bottom = || interpolate_edge(x, y + 1.0, x + 1.0, y + 1.0, bl, br, level);
    let left = || interpolate_edge(x, y, x, y + 1.0, tl, bl, level);
    let seg = |start, end| Segment { start, end };

    match cell_index {
        0 | 15 => {}
        1 | 14 => out.push(seg(left(), top())),
        2 | 13 => out.push(seg(top(), right())),
        3 | 12 => out.push(seg(left(), right())),
        4 | 11 => out.push(seg(right(), bottom())),
        5 => {
            // Saddle: two separate segments
            out.push(seg(left(), top()));
            out.push(seg(right(), bottom()));
        }
        6 | 9 => out.push(seg(top(), bottom())),
        7 | 8 => out.push(seg(left(), bottom())),
        10 => {
            out.push(seg(top(), right()));
            out.push(seg(left(), bottom()));
        }
        _ => {}
    }
}

/// Linearly interpolate between two edge points based on data values
fn interpolate_edge(x1: f64, y1: f64, x2: f64, y2: f64, val1: f64, val2: f64, level: f64) -> Point {
    if (val2 - val1).abs() < 1e-12 {
        return Point::new((x1 + x2) / 2.0, (y1 + y2) / 2.0);
    }

    let t = ((level - val1) / (val2 - val1)).clamp(0.0, 1.0);
    Point::new(x1 + t * (x2 - x1), y1 + t * (y2 - y1))
}

/// Clip a convex polygon with linearly varying z to `lower < z <= upper`.
fn clip_band(polygon: &[(Point, f64)], lower: f64, upper: f64) -> Vec<Point> {
    let above_lower = clip_half(polygon, |z| z >= lower, lower);
    let inside = clip_half(&above_lower, |z| z <= upper, upper);
    inside.into_iter().map(|(p, _)| p).collect()
}

fn clip_half<F>(polygon: &[(Point, f64)], keep: F, bound: f64) -> Vec<(Point, f64)>
where
    F: Fn(f64) -> bool,
{
    let mut out = Vec::with_capacity(polygon.len() + 2);
    for i in 0..polygon.len() {
        let (pa, za) = polygon[i];
        let (pb, zb) = polygon[(i + 1) % polygon.len()];
        if keep(za) {
            out.push((pa, za));
        }
        if keep(za) != keep(zb) {
            let t = (bound - za) / (zb - za);
            out.push((
                Point::new(pa.x + t * (pb.x - pa.x), pa.y + t * (pb.y - pa.y)),
                bound,
            ));
        }
    }
    out
}

/// A joined polyline in grid index coordinates
#[derive(Debug, Clone)]
pub struct Polyline {
    pub points: Vec<Point>,
    pub closed: bool,
}

fn endpoint_key(p: Point) -> (i64, i64) {
    ((p.x * 1e9).round() as i64, (p.y * 1e9).round() as i64)
}

/// Connect line segments into continuous polylines
///
/// Adjacent cells compute shared edge crossings identically, so endpoints
/// are matched exactly after quantization. Closed polylines do not repeat
/// their first point.
pub fn connect_segments(segments: Vec<Segment>) -> Vec<Polyline> {
    let mut by_endpoint: HashMap<(i64, i64), Vec<usize>> = HashMap::new();
    for (i, seg) in segments.iter().enumerate() {
        by_endpoint.entry(endpoint_key(seg.start)).or_default().push(i);
        by_endpoint.entry(endpoint_key(seg.end)).or_default().push(i);
    }

    let mut used = vec![false; segments.len()];
    let next_from = |p: Point, used: &mut Vec<bool>| -> Option<Point> {
        let candidates = by_endpoint.get(&endpoint_key(p))?;
        let i = *candidates.iter().find(|&&i| !used[i])?;
        used[i] = true;
        let seg = segments[i];
        Some(if endpoint_key(seg.start) == endpoint_key(p) { seg.end } else { seg.start })
    };

    let mut polylines = Vec::new();
    for start_idx in 0..segments.len() {
        if used[start_idx] {
            continue;
        }
        used[start_idx] = true;
        let first = segments[start_idx];

        let mut forward = vec![first.start, first.end];
        while let Some(p) = next_from(forward[forward.len() - 1], &mut used) {
            forward.push(p);
        }

        let closed = forward.len() > 2
            && endpoint_key(forward[0]) == endpoint_key(forward[forward.len() - 1]);
        let points = if closed {
            forward.pop();
            forward
        } else {
            let mut backward = Vec::new();
            while let Some(p) = next_from(*backward.last().unwrap_or(&first.start), &mut used) {
                backward.push(p);
            }
            backward.reverse();
            backward.extend(forward);
            backward
        };

        if points.len() >= 2 {
            polylines.push(Polyline { points, closed });
        }
    }

    polylines
}

/// Apply Chaikin's corner cutting algorithm for smoothing
pub fn smooth_polyline(points: &[Point], closed: bool, iterations: u32) -> (Vec<Point>, bool) {
    if iterations == 0 || points.len() < 3 {
        return (points.to_vec(), closed);
    }

    let mut points = points.to_vec();
    for _ in 0..iterations {
        let n = points.len();
        let pairs = if closed { n } else { n - 1 };
        let mut smoothed = Vec::with_capacity(pairs * 2 + 2);
        if !closed {
            smoothed.push(points[0]);
        }
        for i in 0..pairs {
            let p1 = points[i];
            let p2 = points[(i + 1) % n];
            // Two new points at 25% and 75% along the segment
            smoothed.push(Point::new(0.75 * p1.x + 0.25 * p2.x, 0.75 * p1.y + 0.25 * p2.y));
            smoothed.push(Point::new(0.25 * p1.x + 0.75 * p2.x, 0.25 * p1.y + 0.75 * p2.y));
        }
        if !closed {
            smoothed.push(points[n - 1]);
        }
        points = smoothed;
    }
    (points, closed)
}
