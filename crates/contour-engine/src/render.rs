//! Rasterizing contour sets and their labels with tiny-skia.

use tiny_skia::{
    FillRule, LineCap, LineJoin, Mask, Paint, PathBuilder, Pixmap, Stroke, StrokeDash, Transform,
};
use tracing::debug;

use crate::color::Color;
use crate::contour_set::ContourSet;
use crate::error::{ContourError, ContourResult};
use crate::geometry::{Path, PathCode};
use crate::style::Hatch;

/// Distance in pixels between hatch lines at density 1.
const HATCH_SPACING: f32 = 12.0;
const HATCH_LINE_WIDTH: f32 = 1.0;

fn paint_for(color: Color, anti_alias: bool) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, color.a);
    paint.anti_alias = anti_alias;
    paint
}

impl ContourSet {
    /// Draw paths and labels onto a pixmap through the set's transform.
    ///
    /// Hatched filled sets are drawn one band at a time so each hatch can be
    /// clipped to its band; everything else goes through a single pass.
    pub fn draw(&self, pixmap: &mut Pixmap) -> ContourResult<()> {
        let hatched = self.filled && self.hatches.iter().any(Option::is_some);
        if hatched {
            for (i, path) in self.paths.iter().enumerate() {
                self.draw_collection(pixmap, std::slice::from_ref(path), i);
                if let Some(Some(hatch)) = self.hatches.get(i) {
                    self.draw_hatch(pixmap, path, hatch)?;
                }
            }
        } else {
            self.draw_collection(pixmap, &self.paths, 0);
        }
        self.draw_labels(pixmap);
        Ok(())
    }

    /// Render into a new pixmap over a background color.
    pub fn render_pixmap(
        &self,
        width: u32,
        height: u32,
        background: Color,
    ) -> ContourResult<Pixmap> {
        let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
            ContourError::Render(format!("invalid canvas size {}x{}", width, height))
        })?;
        pixmap.fill(tiny_skia::Color::from_rgba8(
            background.r,
            background.g,
            background.b,
            background.a,
        ));
        self.draw(&mut pixmap)?;
        Ok(pixmap)
    }

    /// Render to PNG bytes on a transparent background.
    pub fn render_png(&self, width: u32, height: u32) -> ContourResult<Vec<u8>> {
        let pixmap = self.render_pixmap(width, height, Color::TRANSPARENT)?;
        pixmap
            .encode_png()
            .map_err(|e| ContourError::Render(e.to_string()))
    }

    /// Draw `paths`, styled as levels `offset..offset + paths.len()`.
    fn draw_collection(&self, pixmap: &mut Pixmap, paths: &[Path], offset: usize) {
        let colors = self.level_colors();
        let mut drawn = 0;

        for (k, path) in paths.iter().enumerate() {
            let i = offset + k;
            let Some(&color) = colors.get(i) else {
                continue;
            };
            let Some(screen) = self.screen_path(path) else {
                continue;
            };
            let paint = paint_for(color, self.antialiased);

            if self.filled {
                pixmap.fill_path(&screen, &paint, FillRule::Winding, Transform::identity(), None);
            } else {
                let width = self.linewidths.get(i).copied().unwrap_or(0.0);
                let mut stroke = Stroke::default();
                stroke.width = width as f32;
                stroke.line_cap = LineCap::Butt;
                stroke.line_join = LineJoin::Round;
                if let Some(style) = self.linestyles.get(i) {
                    stroke.dash = style
                        .dash_pattern(width)
                        .and_then(|pattern| StrokeDash::new(pattern, 0.0));
                }
                pixmap.stroke_path(&screen, &paint, &stroke, Transform::identity(), None);
            }
            drawn += 1;
        }

        debug!(offset, paths = paths.len(), drawn, "Drew contour paths");
    }

    fn draw_hatch(&self, pixmap: &mut Pixmap, path: &Path, hatch: &Hatch) -> ContourResult<()> {
        let Some(band) = self.screen_path(path) else {
            return Ok(());
        };
        let Some(lines) = hatch_path(hatch, pixmap.width() as f32, pixmap.height() as f32) else {
            return Ok(());
        };

        let mut mask = Mask::new(pixmap.width(), pixmap.height())
            .ok_or_else(|| ContourError::Render("could not allocate hatch mask".to_string()))?;
        mask.fill_path(&band, FillRule::Winding, self.antialiased, Transform::identity());

        let paint = paint_for(Color::BLACK, self.antialiased);
        let mut stroke = Stroke::default();
        stroke.width = HATCH_LINE_WIDTH;
        pixmap.stroke_path(&lines, &paint, &stroke, Transform::identity(), Some(&mask));
        Ok(())
    }

    fn draw_labels(&self, pixmap: &mut Pixmap) {
        let transform = self.transform.as_ref();
        for label in self.label_records() {
            let center = transform.to_screen(label.data);
            let rotation = label.screen_rotation(transform);

            let mut pb = PathBuilder::new();
            self.text_renderer
                .append_outline(&mut pb, &label.text, label.font_size, center, rotation);
            let Some(outline) = pb.finish() else {
                continue;
            };

            let paint = paint_for(label.color, true);
            match self.text_renderer.stroke_width(label.font_size) {
                Some(width) => {
                    let mut stroke = Stroke::default();
                    stroke.width = width as f32;
                    stroke.line_cap = LineCap::Round;
                    stroke.line_join = LineJoin::Round;
                    pixmap.stroke_path(&outline, &paint, &stroke, Transform::identity(), None);
                }
                None => {
                    pixmap.fill_path(
                        &outline,
                        &paint,
                        FillRule::Winding,
                        Transform::identity(),
                        None,
                    );
                }
            }
        }
    }

    /// A path in screen coordinates, or None when nothing is drawable.
    ///
    /// Non-finite vertices break the path.
    fn screen_path(&self, path: &Path) -> Option<tiny_skia::Path> {
        let mut pb = PathBuilder::new();
        let mut open = false;

        for (vertex, code) in path.vertices().iter().zip(path.codes()) {
            if *code == PathCode::ClosePoly {
                if open {
                    pb.close();
                    open = false;
                }
                continue;
            }
            let p = self.transform.to_screen(*vertex);
            if !p.x.is_finite() || !p.y.is_finite() {
                open = false;
                continue;
            }
            if *code == PathCode::MoveTo || !open {
                pb.move_to(p.x as f32, p.y as f32);
                open = true;
            } else {
                pb.line_to(p.x as f32, p.y as f32);
            }
        }

        pb.finish()
    }
}

/// Hatch strokes covering a `width` x `height` canvas.
fn hatch_path(hatch: &Hatch, width: f32, height: f32) -> Option<tiny_skia::Path> {
    let mut pb = PathBuilder::new();

    let spacing = |ch: char| HATCH_SPACING / hatch.density(ch).max(1) as f32;
    let has = |chars: &[char]| chars.iter().any(|&c| hatch.density(c) > 0);
    let count = |chars: &[char]| chars.iter().map(|&c| hatch.density(c)).sum::<usize>().max(1);

    if has(&['/', 'x', 'X']) {
        let step = HATCH_SPACING / count(&['/', 'x', 'X']) as f32;
        let mut x = -height;
        while x < width {
            pb.move_to(x, height);
            pb.line_to(x + height, 0.0);
            x += step;
        }
    }
    if has(&['\\', 'x', 'X']) {
        let step = HATCH_SPACING / count(&['\\', 'x', 'X']) as f32;
        let mut x = -height;
        while x < width {
            pb.move_to(x, 0.0);
            pb.line_to(x + height, height);
            x += step;
        }
    }
    if has(&['|', '+']) {
        let step = HATCH_SPACING / count(&['|', '+']) as f32;
        let mut x = 0.0;
        while x < width {
            pb.move_to(x, 0.0);
            pb.line_to(x, height);
            x += step;
        }
    }
    if has(&['-', '+']) {
        let step = HATCH_SPACING / count(&['-', '+']) as f32;
        let mut y = 0.0;
        while y < height {
            pb.move_to(0.0, y);
            pb.line_to(width, y);
            y += step;
        }
    }
    for (ch, radius) in [('.', 1.0f32), ('o', 3.0), ('O', 5.0)] {
        if hatch.density(ch) == 0 {
            continue;
        }
        let step = spacing(ch);
        let mut y = step / 2.0;
        while y < height {
            let mut x = step / 2.0;
            while x < width {
                pb.push_circle(x, y, radius);
                x += step;
            }
            y += step;
        }
    }

    pb.finish()
}
