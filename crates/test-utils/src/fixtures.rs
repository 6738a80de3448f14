//! Common geometry and configuration fixtures.
//!
//! Shapes are plain `(x, y)` tuples so this crate stays independent of the
//! engine's own point type.

/// Polyline fixtures.
pub mod shapes {
    /// Unit-square corners, counter-clockwise, not repeated at the end.
    pub const UNIT_SQUARE: [(f64, f64); 4] = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)];

    /// Axis-aligned square ring starting at `origin`, closed by repeating
    /// the first vertex.
    pub fn closed_square(origin: (f64, f64), size: f64) -> Vec<(f64, f64)> {
        let (x, y) = origin;
        vec![(x, y), (x + size, y), (x + size, y + size), (x, y + size), (x, y)]
    }

    /// Horizontal line at height `y` with `n` evenly spaced vertices.
    pub fn horizontal_line(x0: f64, x1: f64, y: f64, n: usize) -> Vec<(f64, f64)> {
        let n = n.max(2);
        (0..n)
            .map(|i| (x0 + (x1 - x0) * i as f64 / (n - 1) as f64, y))
            .collect()
    }

    /// Circle of `n` vertices, closed by repeating the first vertex.
    pub fn circle(center: (f64, f64), radius: f64, n: usize) -> Vec<(f64, f64)> {
        let mut ring: Vec<(f64, f64)> = (0..n)
            .map(|i| {
                let t = std::f64::consts::TAU * i as f64 / n as f64;
                (center.0 + radius * t.cos(), center.1 + radius * t.sin())
            })
            .collect();
        if let Some(&first) = ring.first() {
            ring.push(first);
        }
        ring
    }
}

/// Level fixtures.
pub mod levels {
    /// Three evenly spaced levels.
    pub const SIMPLE: [f64; 3] = [0.0, 1.0, 2.0];

    /// Levels straddling zero for negative line style tests.
    pub const SIGNED: [f64; 5] = [-2.0, -1.0, 0.0, 1.0, 2.0];

    /// Decades for log-scale tests.
    pub const DECADES: [f64; 4] = [1.0, 10.0, 100.0, 1000.0];
}

/// Scene configuration fixtures for the command-line renderer.
pub mod scenes {
    /// Filled contours of a synthetic peak with labels.
    pub const PEAK_YAML: &str = r#"
grid:
  kind: gaussian
  width: 40
  height: 30
  amplitude: 3.0
contour:
  filled: true
  levels: [0.0, 0.5, 1.0, 1.5, 2.0, 2.5, 3.0]
  cmap: viridis
labels:
  font_size: 12.0
  format: "%1.1f"
"#;

    /// Line contours from an inline value grid.
    pub const INLINE_GRID_YAML: &str = r#"
grid:
  kind: values
  width: 3
  height: 3
  values: [0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0]
contour:
  levels: [0.5]
  colors: ["black"]
"#;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closed_square_repeats_first_vertex() {
        let ring = shapes::closed_square((1.0, 2.0), 3.0);
        assert_eq!(ring.len(), 5);
        assert_eq!(ring.first(), ring.last());
    }

    #[test]
    fn test_horizontal_line_spacing() {
        let line = shapes::horizontal_line(0.0, 10.0, 5.0, 11);
        assert_eq!(line.len(), 11);
        assert_eq!(line[3], (3.0, 5.0));
    }

    #[test]
    fn test_circle_closed() {
        let ring = shapes::circle((0.0, 0.0), 2.0, 16);
        assert_eq!(ring.len(), 17);
        assert_eq!(ring[0], ring[16]);
        assert!(ring.iter().all(|(x, y)| ((x * x + y * y).sqrt() - 2.0).abs() < 1e-12));
    }
}
