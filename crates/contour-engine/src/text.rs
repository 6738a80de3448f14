//! Text measurement and glyph outlines for contour labels.

use std::fmt;

use rusttype::{point, Font, OutlineBuilder, Scale};
use tiny_skia::PathBuilder;

use crate::error::{ContourError, ContourResult};
use crate::geometry::Point;

/// Measures and outlines label text.
pub trait TextRenderer: fmt::Debug + Send + Sync {
    /// Rendered width in pixels.
    fn text_width(&self, text: &str, font_size: f64) -> f64;

    /// Append the outline of `text` centred on `center`, rotated by
    /// `rotation_deg` (screen space, y down), to a path builder.
    fn append_outline(
        &self,
        builder: &mut PathBuilder,
        text: &str,
        font_size: f64,
        center: Point,
        rotation_deg: f64,
    );

    /// Stroke width for stroke fonts; None when outlines are filled.
    fn stroke_width(&self, _font_size: f64) -> Option<f64> {
        None
    }
}

/// Rotate a local (x, y) offset around a centre.
fn place(center: Point, cos_a: f64, sin_a: f64, x: f64, y: f64) -> (f32, f32) {
    (
        (x * cos_a - y * sin_a + center.x) as f32,
        (x * sin_a + y * cos_a + center.y) as f32,
    )
}

/// Built-in seven-segment style glyphs drawn as strokes.
///
/// Needs no font file and covers digits, sign, decimal point and exponent.
#[derive(Debug, Clone, Copy, Default)]
pub struct SegmentFont;

impl SegmentFont {
    const CHAR_WIDTH: f64 = 0.6;
    const CHAR_SPACING: f64 = 0.1;

    fn glyph(ch: char, hw: f64, hh: f64) -> Vec<((f64, f64), (f64, f64))> {
        match ch {
            '0' => vec![
                ((-hw, -hh), (hw, -hh)),
                ((hw, -hh), (hw, hh)),
                ((hw, hh), (-hw, hh)),
                ((-hw, hh), (-hw, -hh)),
            ],
            '1' => vec![((0.0, -hh), (0.0, hh))],
            '2' => vec![
                ((-hw, -hh), (hw, -hh)),
                ((hw, -hh), (hw, 0.0)),
                ((hw, 0.0), (-hw, 0.0)),
                ((-hw, 0.0), (-hw, hh)),
                ((-hw, hh), (hw, hh)),
            ],
            '3' => vec![
                ((-hw, -hh), (hw, -hh)),
                ((hw, -hh), (hw, hh)),
                ((hw, hh), (-hw, hh)),
                ((-hw, 0.0), (hw, 0.0)),
            ],
            '4' => vec![
                ((-hw, -hh), (-hw, 0.0)),
                ((-hw, 0.0), (hw, 0.0)),
                ((hw, -hh), (hw, hh)),
            ],
            '5' => vec![
                ((hw, -hh), (-hw, -hh)),
                ((-hw, -hh), (-hw, 0.0)),
                ((-hw, 0.0), (hw, 0.0)),
                ((hw, 0.0), (hw, hh)),
                ((hw, hh), (-hw, hh)),
            ],
            '6' => vec![
                ((hw, -hh), (-hw, -hh)),
                ((-hw, -hh), (-hw, hh)),
                ((-hw, hh), (hw, hh)),
                ((hw, hh), (hw, 0.0)),
                ((hw, 0.0), (-hw, 0.0)),
            ],
            '7' => vec![((-hw, -hh), (hw, -hh)), ((hw, -hh), (0.0, hh))],
            '8' => vec![
                ((-hw, -hh), (hw, -hh)),
                ((hw, -hh), (hw, hh)),
                ((hw, hh), (-hw, hh)),
                ((-hw, hh), (-hw, -hh)),
                ((-hw, 0.0), (hw, 0.0)),
            ],
            '9' => vec![
                ((-hw, 0.0), (hw, 0.0)),
                ((hw, 0.0), (hw, -hh)),
                ((hw, -hh), (-hw, -hh)),
                ((-hw, -hh), (-hw, 0.0)),
                ((hw, 0.0), (hw, hh)),
            ],
            '-' => vec![((-hw, 0.0), (hw, 0.0))],
            '+' => vec![((-hw, 0.0), (hw, 0.0)), ((0.0, -hw), (0.0, hw))],
            '.' => vec![((0.0, hh * 0.7), (0.0, hh * 0.8))],
            'e' | 'E' => vec![
                ((hw, hh), (-hw, hh)),
                ((-hw, hh), (-hw, -hh * 0.2)),
                ((-hw, -hh * 0.2), (hw, -hh * 0.2)),
                ((hw, -hh * 0.2), (hw, hh * 0.4)),
                ((hw, hh * 0.4), (-hw, hh * 0.4)),
            ],
            _ => vec![],
        }
    }
}

impl TextRenderer for SegmentFont {
    fn text_width(&self, text: &str, font_size: f64) -> f64 {
        let n = text.chars().count() as f64;
        if n == 0.0 {
            return 0.0;
        }
        n * (Self::CHAR_WIDTH + Self::CHAR_SPACING) * font_size - Self::CHAR_SPACING * font_size
    }

    fn append_outline(
        &self,
        builder: &mut PathBuilder,
        text: &str,
        font_size: f64,
        center: Point,
        rotation_deg: f64,
    ) {
        let char_width = font_size * Self::CHAR_WIDTH;
        let advance = char_width + font_size * Self::CHAR_SPACING;
        let (sin_a, cos_a) = rotation_deg.to_radians().sin_cos();
        let start_x = -self.text_width(text, font_size) / 2.0;

        for (i, ch) in text.chars().enumerate() {
            let cx = start_x + i as f64 * advance + char_width / 2.0;
            for ((x1, y1), (x2, y2)) in Self::glyph(ch, char_width / 2.0, font_size / 2.0) {
                let (ax, ay) = place(center, cos_a, sin_a, cx + x1, y1);
                let (bx, by) = place(center, cos_a, sin_a, cx + x2, y2);
                builder.move_to(ax, ay);
                builder.line_to(bx, by);
            }
        }
    }

    fn stroke_width(&self, font_size: f64) -> Option<f64> {
        Some(font_size * Self::CHAR_WIDTH * 0.15)
    }
}

/// TrueType glyphs rendered through `rusttype`.
pub struct TrueTypeFont {
    font: Font<'static>,
}

impl fmt::Debug for TrueTypeFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrueTypeFont")
            .field("glyphs", &self.font.glyph_count())
            .finish()
    }
}

impl TrueTypeFont {
    pub fn from_bytes(bytes: Vec<u8>) -> ContourResult<Self> {
        let font = Font::try_from_vec(bytes)
            .ok_or_else(|| ContourError::Font("could not parse font data".to_string()))?;
        Ok(Self { font })
    }

    pub fn from_file(path: impl AsRef<std::path::Path>) -> ContourResult<Self> {
        let bytes = std::fs::read(path.as_ref())
            .map_err(|e| ContourError::Font(format!("{}: {}", path.as_ref().display(), e)))?;
        Self::from_bytes(bytes)
    }
}

/// Forwards glyph outlines into a tiny-skia path, centred and rotated.
struct OutlineSink<'a> {
    builder: &'a mut PathBuilder,
    center: Point,
    cos_a: f64,
    sin_a: f64,
    dx: f64,
    dy: f64,
}

impl OutlineSink<'_> {
    fn map(&self, x: f32, y: f32) -> (f32, f32) {
        place(self.center, self.cos_a, self.sin_a, x as f64 + self.dx, y as f64 + self.dy)
    }
}

impl OutlineBuilder for OutlineSink<'_> {
    fn move_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.map(x, y);
        self.builder.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.map(x, y);
        self.builder.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (x1, y1) = self.map(x1, y1);
        let (x, y) = self.map(x, y);
        self.builder.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (x1, y1) = self.map(x1, y1);
        let (x2, y2) = self.map(x2, y2);
        let (x, y) = self.map(x, y);
        self.builder.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.builder.close();
    }
}

impl TextRenderer for TrueTypeFont {
    fn text_width(&self, text: &str, font_size: f64) -> f64 {
        let scale = Scale::uniform(font_size as f32);
        self.font
            .layout(text, scale, point(0.0, 0.0))
            .last()
            .map(|g| (g.position().x + g.unpositioned().h_metrics().advance_width) as f64)
            .unwrap_or(0.0)
    }

    fn append_outline(
        &self,
        builder: &mut PathBuilder,
        text: &str,
        font_size: f64,
        center: Point,
        rotation_deg: f64,
    ) {
        let scale = Scale::uniform(font_size as f32);
        let v_metrics = self.font.v_metrics(scale);
        let (sin_a, cos_a) = rotation_deg.to_radians().sin_cos();
        let mut sink = OutlineSink {
            builder,
            center,
            cos_a,
            sin_a,
            dx: -self.text_width(text, font_size) / 2.0,
            // Baseline sits below the vertical centre of ascent..descent
            dy: (v_metrics.ascent + v_metrics.descent) as f64 / 2.0,
        };
        for glyph in self.font.layout(text, scale, point(0.0, 0.0)) {
            glyph.build_outline(&mut sink);
        }
    }
}
