//! Geometry primitives shared by the contour pipeline.
//!
//! Contour paths are stored the way a vector backend consumes them: a flat
//! vertex list plus a parallel list of segment codes. A single [`Path`] may
//! hold several connected components, each starting with a `MoveTo`.

use serde::{Deserialize, Serialize};

const CLOSE_RTOL: f64 = 1e-10;
const CLOSE_ATOL: f64 = 1e-13;

/// A point in 2D space (data or pixel coordinates, depending on context)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_squared(&self, other: Point) -> f64 {
        (self.x - other.x).powi(2) + (self.y - other.y).powi(2)
    }

    pub fn distance(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Coordinate-wise closeness with numpy `allclose` semantics.
    pub fn approx_eq(&self, other: Point, rtol: f64, atol: f64) -> bool {
        (self.x - other.x).abs() <= atol + rtol * other.x.abs()
            && (self.y - other.y).abs() <= atol + rtol * other.y.abs()
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

/// Segment code for a path vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathCode {
    MoveTo,
    LineTo,
    /// Closes the current component; the vertex itself is ignored.
    ClosePoly,
}

/// A compound path: vertices plus one code per vertex
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Path {
    vertices: Vec<Point>,
    codes: Vec<PathCode>,
}

impl Path {
    /// Build a path from explicit vertices and codes.
    ///
    /// Both lists must have the same length.
    pub fn new(vertices: Vec<Point>, codes: Vec<PathCode>) -> Self {
        debug_assert_eq!(vertices.len(), codes.len());
        Self { vertices, codes }
    }

    /// An open polyline: `MoveTo` followed by `LineTo`s.
    pub fn from_polyline(points: Vec<Point>) -> Self {
        let codes = polyline_codes(points.len());
        Self {
            vertices: points,
            codes,
        }
    }

    /// A polyline whose last vertex closes back onto the first when the
    /// vertex sequence is a closed polygon.
    ///
    /// Segments of one or two points always stay open.
    pub fn from_segment(points: Vec<Point>) -> Self {
        let mut codes = polyline_codes(points.len());
        if points.len() > 2 && is_closed_polygon(&points) {
            if let Some(last) = codes.last_mut() {
                *last = PathCode::ClosePoly;
            }
        }
        Self {
            vertices: points,
            codes,
        }
    }

    /// Concatenate paths into one compound path.
    pub fn make_compound_path<I>(paths: I) -> Self
    where
        I: IntoIterator<Item = Path>,
    {
        let mut out = Path::default();
        for path in paths {
            out.extend(path);
        }
        out
    }

    pub fn extend(&mut self, other: Path) {
        self.vertices.extend(other.vertices);
        self.codes.extend(other.codes);
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    pub fn codes(&self) -> &[PathCode] {
        &self.codes
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn into_parts(self) -> (Vec<Point>, Vec<PathCode>) {
        (self.vertices, self.codes)
    }

    /// Split at every `MoveTo` into connected components.
    pub fn connected_components(&self) -> Vec<Path> {
        let mut components = Vec::new();
        let mut start = 0;
        for i in 1..=self.codes.len() {
            if i == self.codes.len() || self.codes[i] == PathCode::MoveTo {
                if i > start {
                    components.push(Path {
                        vertices: self.vertices[start..i].to_vec(),
                        codes: self.codes[start..i].to_vec(),
                    });
                }
                start = i;
            }
        }
        components
    }

    /// Vertex runs of each connected component.
    pub fn segments(&self) -> Vec<Vec<Point>> {
        self.connected_components()
            .into_iter()
            .map(|c| c.vertices)
            .collect()
    }

    /// Whether the last component ends with a `ClosePoly`.
    pub fn is_closed(&self) -> bool {
        self.codes.last() == Some(&PathCode::ClosePoly)
    }

    /// Axis-aligned bounds as (min, max), or None for an empty path.
    pub fn bounds(&self) -> Option<(Point, Point)> {
        points_bounds(&self.vertices)
    }
}

fn polyline_codes(len: usize) -> Vec<PathCode> {
    (0..len)
        .map(|i| if i == 0 { PathCode::MoveTo } else { PathCode::LineTo })
        .collect()
}

/// Axis-aligned bounds of a point list as (min, max).
pub fn points_bounds(points: &[Point]) -> Option<(Point, Point)> {
    let first = points.first()?;
    let init = (*first, *first);
    Some(points.iter().fold(init, |(lo, hi), p| {
        (
            Point::new(lo.x.min(p.x), lo.y.min(p.y)),
            Point::new(hi.x.max(p.x), hi.y.max(p.y)),
        )
    }))
}

/// Return whether first and last point of a vertex sequence coincide.
///
/// A single point trivially coincides with itself. Empty input is open.
pub fn is_closed_polygon(points: &[Point]) -> bool {
    match (points.first(), points.last()) {
        (Some(first), Some(last)) => first.approx_eq(*last, CLOSE_RTOL, CLOSE_ATOL),
        _ => false,
    }
}

/// Closest point to a query point on a polyline.
///
/// Returns the squared distance, the projected point, and the indices of the
/// segment endpoints bounding the projection. A single-point polyline yields
/// `(0, 0)`. Panics on an empty polyline.
pub fn closest_point_on_polyline(points: &[Point], query: Point) -> (f64, Point, (usize, usize)) {
    assert!(!points.is_empty(), "polyline must contain at least one point");
    if points.len() == 1 {
        return (query.distance_squared(points[0]), points[0], (0, 0));
    }

    let mut best = (f64::INFINITY, points[0], (0, 1));
    for (i, pair) in points.windows(2).enumerate() {
        let (a, b) = (pair[0], pair[1]);
        let dx = b.x - a.x;
        let dy = b.y - a.y;
        let mut norm = dx * dx + dy * dy;
        if norm == 0.0 {
            // 0/0 becomes 0/1, the projection collapses onto `a`
            norm = 1.0;
        }
        let rel = (((query.x - a.x) * dx + (query.y - a.y) * dy) / norm).clamp(0.0, 1.0);
        let proj = Point::new(a.x + rel * dx, a.y + rel * dy);
        let d2 = proj.distance_squared(query);
        if d2 < best.0 {
            best = (d2, proj, (i, i + 1));
        }
    }
    best
}
