//! Data-to-screen coordinate transforms.
//!
//! Label geometry is measured in screen pixels while paths are stored in
//! data coordinates, so the labeler goes back and forth through a
//! [`DataTransform`]. Screen coordinates have y pointing down.

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Maps data coordinates to screen pixels and back.
pub trait DataTransform: Debug + Send + Sync {
    fn to_screen(&self, p: Point) -> Point;

    fn to_data(&self, p: Point) -> Point;

    /// Whether a screen point lies inside the drawable area.
    fn contains_screen(&self, _p: Point) -> bool {
        true
    }

    fn to_screen_all(&self, points: &[Point]) -> Vec<Point> {
        points.iter().map(|&p| self.to_screen(p)).collect()
    }

    fn to_data_all(&self, points: &[Point]) -> Vec<Point> {
        points.iter().map(|&p| self.to_data(p)).collect()
    }

    /// Screen angle (degrees) of a data-space direction at a data anchor.
    fn angle_to_screen(&self, angle_deg: f64, anchor: Point) -> f64 {
        let rad = angle_deg.to_radians();
        let step = 1e-5 * anchor.x.abs().max(anchor.y.abs()).max(1.0);
        let a = self.to_screen(anchor);
        let b = self.to_screen(Point::new(
            anchor.x + step * rad.cos(),
            anchor.y + step * rad.sin(),
        ));
        (b.y - a.y).atan2(b.x - a.x).to_degrees()
    }

    /// Data angle (degrees) of a screen-space direction at a screen anchor.
    fn angle_to_data(&self, angle_deg: f64, anchor: Point) -> f64 {
        let rad = angle_deg.to_radians();
        let step = 1e-3;
        let a = self.to_data(anchor);
        let b = self.to_data(Point::new(anchor.x + step * rad.cos(), anchor.y + step * rad.sin()));
        (b.y - a.y).atan2(b.x - a.x).to_degrees()
    }
}

/// Data coordinates are already screen coordinates.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityTransform;

impl DataTransform for IdentityTransform {
    fn to_screen(&self, p: Point) -> Point {
        p
    }

    fn to_data(&self, p: Point) -> Point {
        p
    }
}

/// Axis scale of a viewport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisScale {
    #[default]
    Linear,
    Log,
}

impl AxisScale {
    fn forward(self, v: f64) -> f64 {
        match self {
            AxisScale::Linear => v,
            AxisScale::Log => v.log10(),
        }
    }

    fn inverse(self, v: f64) -> f64 {
        match self {
            AxisScale::Linear => v,
            AxisScale::Log => 10f64.powf(v),
        }
    }
}

/// Maps a data rectangle onto a pixel rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Data limits as (x0, x1, y0, y1)
    pub data: [f64; 4],
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub x_scale: AxisScale,
    #[serde(default)]
    pub y_scale: AxisScale,
}

impl Viewport {
    pub fn new(data: [f64; 4], width: f64, height: f64) -> Self {
        Self {
            data,
            width,
            height,
            x_scale: AxisScale::Linear,
            y_scale: AxisScale::Linear,
        }
    }

    pub fn with_scales(mut self, x_scale: AxisScale, y_scale: AxisScale) -> Self {
        self.x_scale = x_scale;
        self.y_scale = y_scale;
        self
    }

    fn span(scale: AxisScale, lo: f64, hi: f64) -> (f64, f64) {
        let (a, b) = (scale.forward(lo), scale.forward(hi));
        let d = b - a;
        (a, if d == 0.0 { 1.0 } else { d })
    }
}

impl DataTransform for Viewport {
    fn to_screen(&self, p: Point) -> Point {
        let (x0, dx) = Self::span(self.x_scale, self.data[0], self.data[1]);
        let (y0, dy) = Self::span(self.y_scale, self.data[2], self.data[3]);
        let fx = (self.x_scale.forward(p.x) - x0) / dx;
        let fy = (self.y_scale.forward(p.y) - y0) / dy;
        Point::new(fx * self.width, (1.0 - fy) * self.height)
    }

    fn to_data(&self, p: Point) -> Point {
        let (x0, dx) = Self::span(self.x_scale, self.data[0], self.data[1]);
        let (y0, dy) = Self::span(self.y_scale, self.data[2], self.data[3]);
        let fx = p.x / self.width;
        let fy = 1.0 - p.y / self.height;
        Point::new(
            self.x_scale.inverse(x0 + fx * dx),
            self.y_scale.inverse(y0 + fy * dy),
        )
    }

    fn contains_screen(&self, p: Point) -> bool {
        p.x >= 0.0 && p.x <= self.width && p.y >= 0.0 && p.y <= self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_round_trip() {
        let vp = Viewport::new([0.0, 10.0, -5.0, 5.0], 200.0, 100.0);
        let screen = vp.to_screen(Point::new(5.0, 0.0));
        assert!((screen.x - 100.0).abs() < 1e-9);
        assert!((screen.y - 50.0).abs() < 1e-9);

        let back = vp.to_data(screen);
        assert!((back.x - 5.0).abs() < 1e-9);
        assert!(back.y.abs() < 1e-9);
    }

    #[test]
    fn test_viewport_y_points_down() {
        let vp = Viewport::new([0.0, 1.0, 0.0, 1.0], 100.0, 100.0);
        assert!((vp.to_screen(Point::new(0.0, 1.0)).y).abs() < 1e-9);
        assert!((vp.to_screen(Point::new(0.0, 0.0)).y - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_log_axis_round_trip() {
        let vp = Viewport::new([1.0, 1000.0, 0.0, 1.0], 300.0, 100.0)
            .with_scales(AxisScale::Log, AxisScale::Linear);
        let screen = vp.to_screen(Point::new(10.0, 0.5));
        assert!((screen.x - 100.0).abs() < 1e-9);
        assert!((vp.to_data(screen).x - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_angle_flips_with_y_axis() {
        let vp = Viewport::new([0.0, 1.0, 0.0, 1.0], 100.0, 100.0);
        let angle = vp.angle_to_screen(45.0, Point::new(0.5, 0.5));
        assert!((angle + 45.0).abs() < 1e-6);
        let back = vp.angle_to_data(angle, vp.to_screen(Point::new(0.5, 0.5)));
        assert!((back - 45.0).abs() < 1e-6);
    }
}
