//! Contour labeling.
//!
//! Labels are placed along contour paths either automatically (on the
//! straightest stretch of every long enough component), near given points,
//! or interactively. With inline labeling the path under each label is cut
//! so the text stays legible.
//!
//! Label geometry is measured in screen pixels while paths stay in data
//! coordinates; the set's transform converts between the two.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::color::Color;
use crate::colormap::{Colormap, Norm};
use crate::contour_set::ContourSet;
use crate::error::{ContourError, ContourResult};
use crate::format::{LabelFormat, LevelText};
use crate::geometry::{Path, PathCode, Point};
use crate::interactive::{InputEvent, LabelSession};
use crate::transform::DataTransform;

/// Label font size in pixels.
pub const DEFAULT_FONT_SIZE: f64 = 10.0;

/// Gap in pixels left on each side of an inline label.
pub const DEFAULT_INLINE_SPACING: f64 = 5.0;

/// Whether a point is given in data or screen coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coordinates {
    Data,
    Screen,
}

/// Options for a labeling call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelOptions {
    /// Levels to label (default all); each must be a level of the set
    pub levels: Option<Vec<f64>>,
    pub font_size: f64,
    /// Cut the contour under each label
    pub inline: bool,
    pub inline_spacing: f64,
    /// Printf-style format, used when `fmt` is not set
    pub format: Option<String>,
    #[serde(skip)]
    pub fmt: Option<LabelFormat>,
    /// Label colors, cycled over the labeled levels (default contour colors)
    pub colors: Option<Vec<Color>>,
    /// Keep label rotation fixed in data space
    pub use_clabeltext: bool,
    /// Never draw text upside down
    pub rightside_up: bool,
    /// Place one label near each of these data points instead of automatically
    pub manual: Option<Vec<Point>>,
    #[serde(flatten)]
    pub unknown: BTreeMap<String, serde_json::Value>,
}

impl Default for LabelOptions {
    fn default() -> Self {
        Self {
            levels: None,
            font_size: DEFAULT_FONT_SIZE,
            inline: true,
            inline_spacing: DEFAULT_INLINE_SPACING,
            format: None,
            fmt: None,
            colors: None,
            use_clabeltext: false,
            rightside_up: true,
            manual: None,
            unknown: BTreeMap::new(),
        }
    }
}

impl LabelOptions {
    pub fn with_levels(mut self, levels: Vec<f64>) -> Self {
        self.levels = Some(levels);
        self
    }

    pub fn with_fmt(mut self, fmt: LabelFormat) -> Self {
        self.fmt = Some(fmt);
        self
    }

    pub fn with_colors(mut self, colors: Vec<Color>) -> Self {
        self.colors = Some(colors);
        self
    }

    pub fn with_manual(mut self, points: Vec<Point>) -> Self {
        self.manual = Some(points);
        self
    }

    pub fn inline(mut self, inline: bool) -> Self {
        self.inline = inline;
        self
    }

    pub fn with_font_size(mut self, font_size: f64) -> Self {
        self.font_size = font_size;
        self
    }

    fn resolve_fmt(&self) -> ContourResult<LabelFormat> {
        match (&self.fmt, &self.format) {
            (Some(fmt), _) => Ok(fmt.clone()),
            (None, Some(format)) => LabelFormat::printf(format),
            (None, None) => Ok(LabelFormat::default()),
        }
    }
}

/// A placed label
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContourLabel {
    pub text: String,
    pub level: f64,
    pub cvalue: f64,
    pub color: Color,
    pub font_size: f64,
    /// Anchor in screen pixels at placement time
    pub screen: Point,
    /// Anchor in data coordinates
    pub data: Point,
    /// Rotation in degrees, screen space
    pub rotation: f64,
    /// Rotation in degrees, data space, when kept fixed in data space
    pub data_rotation: Option<f64>,
}

impl ContourLabel {
    /// Rotation to draw with under the given transform.
    pub fn screen_rotation(&self, transform: &dyn DataTransform) -> f64 {
        match self.data_rotation {
            Some(angle) => transform.angle_to_screen(angle, self.data),
            None => self.rotation,
        }
    }
}

/// Settings of the current labeling call
#[derive(Debug, Clone)]
pub(crate) struct LabelSettings {
    fmt: LabelFormat,
    font_size: f64,
    rightside_up: bool,
    use_clabeltext: bool,
    level_indices: Vec<usize>,
    level_list: Vec<f64>,
    cvalue_list: Vec<f64>,
    /// Explicit label colors; None uses the contour colors
    mappable: Option<(Colormap, Norm)>,
}

/// Labels of a contour set
#[derive(Debug, Clone, Default)]
pub(crate) struct LabelState {
    settings: Option<LabelSettings>,
    records: Vec<ContourLabel>,
}

impl ContourSet {
    /// Label contour levels.
    ///
    /// Places one label near each `options.manual` point, or labels every
    /// long enough component of each requested level. Returns all labels
    /// of the set.
    pub fn clabel(&mut self, options: LabelOptions) -> ContourResult<&[ContourLabel]> {
        self.configure_labels(&options)?;
        match &options.manual {
            Some(points) => {
                for p in points {
                    self.add_label_near(
                        p.x,
                        p.y,
                        options.inline,
                        options.inline_spacing,
                        Coordinates::Data,
                    )?;
                }
            }
            None => self.labels(options.inline, options.inline_spacing)?,
        }
        Ok(&self.labels.records)
    }

    /// Label contour levels from a stream of input events.
    ///
    /// Blocks on `events` until a stop event arrives or the stream ends.
    pub fn clabel_interactive<I>(
        &mut self,
        options: LabelOptions,
        events: I,
    ) -> ContourResult<&[ContourLabel]>
    where
        I: IntoIterator<Item = InputEvent>,
    {
        self.configure_labels(&options)?;
        LabelSession::new(self, options.inline, options.inline_spacing).run(events)?;
        Ok(&self.labels.records)
    }

    fn configure_labels(&mut self, options: &LabelOptions) -> ContourResult<()> {
        if !options.unknown.is_empty() {
            warn!(
                options = ?options.unknown.keys().collect::<Vec<_>>(),
                "The following label options were not used"
            );
        }
        let fmt = options.resolve_fmt()?;

        let (level_indices, level_list): (Vec<usize>, Vec<f64>) = match &options.levels {
            None => {
                let n = self.levels.len().min(self.cvalues.len());
                ((0..n).collect(), self.levels[..n].to_vec())
            }
            Some(requested) => {
                let selected: Vec<(usize, f64)> = self
                    .levels
                    .iter()
                    .enumerate()
                    .filter(|(_, lev)| requested.contains(*lev))
                    .map(|(i, &lev)| (i, lev))
                    .collect();
                if selected.len() < requested.len() {
                    return Err(ContourError::LevelsNotFound {
                        requested: requested.clone(),
                        available: self.levels.clone(),
                    });
                }
                selected.into_iter().unzip()
            }
        };

        let (cvalue_list, mappable) = match &options.colors {
            None => {
                let cvalues = level_indices
                    .iter()
                    .map(|&i| self.cvalues.get(i).copied().unwrap_or(f64::NAN))
                    .collect();
                (cvalues, None)
            }
            Some(colors) => {
                let n = level_list.len();
                let cmap = Colormap::listed("labels", colors, Some(n));
                ((0..n).map(|i| i as f64).collect(), Some((cmap, Norm::NoNorm)))
            }
        };

        self.labels.settings = Some(LabelSettings {
            fmt,
            font_size: options.font_size,
            rightside_up: options.rightside_up,
            use_clabeltext: options.use_clabeltext,
            level_indices,
            level_list,
            cvalue_list,
            mappable,
        });
        Ok(())
    }

    fn label_settings(&self) -> ContourResult<&LabelSettings> {
        self.labels.settings.as_ref().ok_or(ContourError::NoLabelSession)
    }

    /// All labels in placement order.
    pub fn label_records(&self) -> &[ContourLabel] {
        &self.labels.records
    }

    pub fn label_texts(&self) -> Vec<&str> {
        self.labels.records.iter().map(|l| l.text.as_str()).collect()
    }

    pub fn label_cvalues(&self) -> Vec<f64> {
        self.labels.records.iter().map(|l| l.cvalue).collect()
    }

    /// Label anchors in screen pixels.
    pub fn label_positions(&self) -> Vec<Point> {
        self.labels.records.iter().map(|l| l.screen).collect()
    }

    /// Levels selected by the last labeling call.
    pub fn label_levels(&self) -> &[f64] {
        self.labels
            .settings
            .as_ref()
            .map(|s| s.level_list.as_slice())
            .unwrap_or(&[])
    }

    /// Text for a level. Literal text passes through unchanged.
    pub fn get_text<'a>(&self, level: impl Into<LevelText<'a>>, fmt: &LabelFormat) -> String {
        match level.into() {
            LevelText::Literal(text) => text.to_string(),
            LevelText::Value(value) => fmt.format(value, self.label_levels()),
        }
    }

    /// Width in pixels of the label for the nth labeled level.
    pub fn label_width(&self, nth: usize) -> ContourResult<f64> {
        let settings = self.label_settings()?;
        let level = *settings.level_list.get(nth).ok_or(ContourError::LabelIndex {
            index: nth as isize,
            len: settings.level_list.len(),
        })?;
        let text = settings.fmt.format(level, &settings.level_list);
        Ok(self.text_renderer.text_width(&text, settings.font_size))
    }

    /// Whether a screen point is within `1.2 * label_width` of a label.
    pub fn too_close(&self, x: f64, y: f64, label_width: f64) -> bool {
        let thresh = (1.2 * label_width).powi(2);
        self.labels
            .records
            .iter()
            .any(|l| (x - l.screen.x).powi(2) + (y - l.screen.y).powi(2) < thresh)
    }

    /// Whether a screen-space component is long enough to carry a label.
    pub fn print_label(linecontour: &[Point], label_width: f64) -> bool {
        if linecontour.len() as f64 > 10.0 * label_width {
            return true;
        }
        match crate::geometry::points_bounds(linecontour) {
            Some((lo, hi)) => hi.x - lo.x > 1.2 * label_width || hi.y - lo.y > 1.2 * label_width,
            None => false,
        }
    }

    /// Anchor point and vertex index for a label on a screen-space component.
    ///
    /// The component is cut into blocks about one label wide (the last
    /// block wraps around to the start); the middle of the straightest block
    /// not too close to an existing label wins, falling back to the
    /// straightest block overall.
    pub fn locate_label(&self, linecontour: &[Point], label_width: f64) -> (Point, usize) {
        let n = linecontour.len();
        if n == 0 {
            return (Point::default(), 0);
        }
        let n_blocks = if label_width > 1.0 {
            (n as f64 / label_width).ceil() as usize
        } else {
            1
        };
        let block_size = if n_blocks == 1 { n } else { label_width as usize };
        let at = |block: usize, k: usize| linecontour[(block * block_size + k) % n];

        let distances: Vec<f64> = (0..n_blocks)
            .map(|b| {
                let first = at(b, 0);
                let last = at(b, block_size - 1);
                let l = (last.x - first.x).hypot(last.y - first.y);
                (0..block_size)
                    .map(|k| {
                        let p = at(b, k);
                        let s = (first.y - p.y) * (last.x - first.x)
                            - (first.x - p.x) * (last.y - first.y);
                        // Zero-length chords give NaN or infinity
                        s.abs() / l
                    })
                    .sum()
            })
            .collect();

        let mut order: Vec<usize> = (0..n_blocks).collect();
        order.sort_by(|&a, &b| {
            let (da, db) = (distances[a], distances[b]);
            da.partial_cmp(&db)
                .unwrap_or_else(|| da.is_nan().cmp(&db.is_nan()))
        });

        let hbsize = block_size / 2;
        let mut chosen = order[0];
        for &block in order.iter().chain(std::iter::once(&order[0])) {
            chosen = block;
            let p = at(block, hbsize);
            if !self.too_close(p.x, p.y, label_width) {
                break;
            }
        }
        (at(chosen, hbsize), (chosen * block_size + hbsize) % n)
    }

    /// Rotation of a label anchored at vertex `idx` of `path`, and the path
    /// with a gap cut under the label.
    ///
    /// `screen_pos` is the anchor in pixels; it is inserted as a vertex
    /// when no vertex is there yet. `label_width` and `spacing` are pixels.
    /// A label wider than a whole closed component removes that component.
    pub fn split_path_and_get_label_rotation(
        &self,
        path: &Path,
        idx: usize,
        screen_pos: Point,
        label_width: f64,
        spacing: f64,
    ) -> (f64, Path) {
        if path.is_empty() {
            return (0.0, path.clone());
        }
        let rightside_up = self
            .labels
            .settings
            .as_ref()
            .map_or(true, |s| s.rightside_up);
        let transform = self.transform.as_ref();

        let (mut xys, mut codes) = path.clone().into_parts();
        let idx = idx.min(xys.len() - 1);
        let pos = transform.to_data(screen_pos);
        if !pos.approx_eq(xys[idx], 1e-5, 1e-8) {
            xys.insert(idx, pos);
            codes.insert(idx, PathCode::LineTo);
        }

        // Connected component holding idx; the end of the path closes the last one
        let start = codes[..=idx]
            .iter()
            .rposition(|c| *c == PathCode::MoveTo)
            .unwrap_or(0);
        let stop = codes[idx + 1..]
            .iter()
            .position(|c| *c == PathCode::MoveTo)
            .map_or(codes.len(), |p| p + idx + 1);

        let mut cc: Vec<Point> = xys[start..stop].to_vec();
        let mut idx = idx - start;
        let is_closed = codes[stop - 1] == PathCode::ClosePoly;
        if is_closed {
            // Start the ring at the label
            let mut rotated = cc[idx..cc.len() - 1].to_vec();
            rotated.extend_from_slice(&cc[..=idx]);
            cc = rotated;
            idx = 0;
        }

        // Arc length along the component, in pixels, zero at the label
        let screen = transform.to_screen_all(&cc);
        let mut cpls = Vec::with_capacity(screen.len());
        let mut total = 0.0;
        cpls.push(0.0);
        for pair in screen.windows(2) {
            total += (pair[1].x - pair[0].x).hypot(pair[1].y - pair[0].y);
            cpls.push(total);
        }
        let origin = cpls[idx];
        for c in cpls.iter_mut() {
            *c -= origin;
        }

        let mut targets = [-label_width / 2.0, label_width / 2.0];
        if is_closed {
            targets[0] += cpls[cpls.len() - 1] - cpls[0];
        }
        let sx: Vec<f64> = screen.iter().map(|p| p.x).collect();
        let sy: Vec<f64> = screen.iter().map(|p| p.y).collect();
        let (sx0, sx1) = (interp(targets[0], &cpls, &sx), interp(targets[1], &cpls, &sx));
        let (sy0, sy1) = (interp(targets[0], &cpls, &sy), interp(targets[1], &cpls, &sy));
        let mut angle = (sy1 - sy0).atan2(sx1 - sx0).to_degrees();
        if rightside_up {
            angle = (angle + 90.0).rem_euclid(180.0) - 90.0;
        }

        targets[0] -= spacing;
        targets[1] += spacing;
        let i0 = interp_index(targets[0], &cpls).floor() as isize;
        let i1 = interp_index(targets[1], &cpls).ceil() as isize;
        let cx: Vec<f64> = cc.iter().map(|p| p.x).collect();
        let cy: Vec<f64> = cc.iter().map(|p| p.y).collect();
        let p0 = Point::new(interp(targets[0], &cpls, &cx), interp(targets[0], &cpls, &cy));
        let p1 = Point::new(interp(targets[1], &cpls, &cx), interp(targets[1], &cpls, &cy));

        let mut new_xys: Vec<Point> = Vec::new();
        let mut new_codes: Vec<PathCode> = Vec::new();
        let mut push_piece = |points: Vec<Point>| {
            new_codes.push(PathCode::MoveTo);
            new_codes.extend(std::iter::repeat(PathCode::LineTo).take(points.len() - 1));
            new_xys.extend(points);
        };
        if is_closed {
            if i0 != -1 && i1 != -1 {
                let (i0, i1) = (i0 as usize, i1 as usize);
                let mut piece = vec![p1];
                if i1 <= i0 {
                    piece.extend_from_slice(&cc[i1..=i0]);
                }
                piece.push(p0);
                push_piece(piece);
            }
        } else {
            if i0 != -1 {
                let mut piece = cc[..=i0 as usize].to_vec();
                piece.push(p0);
                push_piece(piece);
            }
            if i1 != -1 {
                let mut piece = vec![p1];
                piece.extend_from_slice(&cc[i1 as usize..]);
                push_piece(piece);
            }
        }

        let mut out_xys = xys[..start].to_vec();
        out_xys.extend(new_xys);
        out_xys.extend_from_slice(&xys[stop..]);
        let mut out_codes = codes[..start].to_vec();
        out_codes.extend(new_codes);
        out_codes.extend_from_slice(&codes[stop..]);
        (angle, Path::new(out_xys, out_codes))
    }

    /// Add a label at a screen position.
    pub fn add_label(
        &mut self,
        x: f64,
        y: f64,
        rotation: f64,
        level: f64,
        cvalue: f64,
    ) -> ContourResult<()> {
        let settings = self.label_settings()?;
        let screen = Point::new(x, y);
        let data = self.transform.to_data(screen);
        let text = settings.fmt.format(level, &settings.level_list);
        let color = match &settings.mappable {
            Some((cmap, norm)) => norm.to_rgba(cmap, cvalue, self.alpha),
            None => self.norm.to_rgba(&self.colormap, cvalue, self.alpha),
        };
        let data_rotation = settings
            .use_clabeltext
            .then(|| self.transform.angle_to_data(rotation, screen));

        let label = ContourLabel {
            text,
            level,
            cvalue,
            color,
            font_size: settings.font_size,
            screen,
            data,
            rotation,
            data_rotation,
        };
        debug!(text = %label.text, x, y, rotation, "Added contour label");
        self.labels.records.push(label);
        Ok(())
    }

    /// Label the labeled level closest to a point.
    pub fn add_label_near(
        &mut self,
        x: f64,
        y: f64,
        inline: bool,
        inline_spacing: f64,
        coordinates: Coordinates,
    ) -> ContourResult<()> {
        let settings = self.label_settings()?.clone();
        let screen = match coordinates {
            Coordinates::Data => self.transform.to_screen(Point::new(x, y)),
            Coordinates::Screen => Point::new(x, y),
        };

        let nearest =
            self.nearest_on_screen(screen, Some(&settings.level_indices), self.transform.as_ref())?;
        let Some((level_idx, vertex, proj)) = nearest else {
            debug!(x, y, "No contour near label point");
            return Ok(());
        };
        let Some(nth) = settings.level_indices.iter().position(|&i| i == level_idx) else {
            return Ok(());
        };

        let label_width = self.label_width(nth)?;
        let (rotation, path) = self.split_path_and_get_label_rotation(
            &self.paths[level_idx],
            vertex,
            proj,
            label_width,
            inline_spacing,
        );
        self.add_label(
            proj.x,
            proj.y,
            rotation,
            settings.level_list[nth],
            settings.cvalue_list[nth],
        )?;
        if inline {
            self.paths[level_idx] = path;
        }
        Ok(())
    }

    /// Label every long enough component of each labeled level.
    pub fn labels(&mut self, inline: bool, inline_spacing: f64) -> ContourResult<()> {
        let settings = self.label_settings()?.clone();

        for (nth, &icon) in settings.level_indices.iter().enumerate() {
            let (level, cvalue) = (settings.level_list[nth], settings.cvalue_list[nth]);
            let components = match self.paths.get(icon) {
                Some(path) => path.connected_components(),
                None => continue,
            };
            let label_width = self.label_width(nth)?;

            let mut additions = Vec::with_capacity(components.len());
            for component in components {
                let screen = self.transform.to_screen_all(component.vertices());
                if Self::print_label(&screen, label_width) {
                    let (anchor, idx) = self.locate_label(&screen, label_width);
                    let (rotation, split) = self.split_path_and_get_label_rotation(
                        &component,
                        idx,
                        anchor,
                        label_width,
                        inline_spacing,
                    );
                    self.add_label(anchor.x, anchor.y, rotation, level, cvalue)?;
                    if inline {
                        additions.push(split);
                    }
                } else {
                    additions.push(component);
                }
            }

            if inline {
                self.paths[icon] = Path::make_compound_path(additions);
            }
        }
        Ok(())
    }

    /// Remove a label; negative indices count from the end.
    pub fn pop_label(&mut self, index: isize) -> ContourResult<ContourLabel> {
        let len = self.labels.records.len();
        let resolved = if index < 0 { len as isize + index } else { index };
        if resolved < 0 || resolved as usize >= len {
            return Err(ContourError::LabelIndex { index, len });
        }
        Ok(self.labels.records.remove(resolved as usize))
    }
}

/// Piecewise linear interpolation, clamped to the end values.
fn interp(x: f64, xp: &[f64], fp: &[f64]) -> f64 {
    let n = xp.len();
    if n == 0 || x.is_nan() {
        return f64::NAN;
    }
    if x <= xp[0] {
        return fp[0];
    }
    if x >= xp[n - 1] {
        return fp[n - 1];
    }
    let j = xp.partition_point(|&v| v <= x).saturating_sub(1).min(n - 2);
    let (x0, x1) = (xp[j], xp[j + 1]);
    if x1 == x0 {
        return fp[j];
    }
    fp[j] + (x - x0) * (fp[j + 1] - fp[j]) / (x1 - x0)
}

/// Fractional index of `x` in `xp`, or -1 outside its range.
fn interp_index(x: f64, xp: &[f64]) -> f64 {
    let n = xp.len();
    if n == 0 || !(x >= xp[0] && x <= xp[n - 1]) {
        return -1.0;
    }
    let indices: Vec<f64> = (0..n).map(|i| i as f64).collect();
    interp(x, xp, &indices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::ContourOptions;

    fn horizontal_line() -> ContourSet {
        let line: Vec<Point> = (0..=10).map(|i| Point::new(i as f64 * 10.0, 0.0)).collect();
        ContourSet::from_segments(vec![1.0], vec![vec![line]], None, ContourOptions::lines())
            .unwrap()
    }

    fn labeled(mut set: ContourSet) -> ContourSet {
        set.clabel(LabelOptions::default().with_manual(vec![])).unwrap();
        set
    }

    #[test]
    fn test_interp_clamps_and_marks_out_of_range() {
        let xp = [-10.0, 0.0, 10.0];
        let fp = [0.0, 5.0, 20.0];
        assert_eq!(interp(-20.0, &xp, &fp), 0.0);
        assert_eq!(interp(5.0, &xp, &fp), 12.5);
        assert_eq!(interp(30.0, &xp, &fp), 20.0);
        assert_eq!(interp_index(-11.0, &xp), -1.0);
        assert_eq!(interp_index(5.0, &xp), 1.5);
        assert_eq!(interp_index(10.0, &xp), 2.0);
    }

    #[test]
    fn test_split_open_path_leaves_gap() {
        let set = labeled(horizontal_line());
        let path = set.paths()[0].clone();
        let (angle, split) =
            set.split_path_and_get_label_rotation(&path, 5, Point::new(50.0, 0.0), 20.0, 5.0);
        assert_eq!(angle, 0.0);

        let components = split.connected_components();
        assert_eq!(components.len(), 2);
        let before = components[0].vertices();
        let after = components[1].vertices();
        assert_eq!(before.len(), 5);
        assert_eq!(before[4], Point::new(35.0, 0.0));
        assert_eq!(after.len(), 5);
        assert_eq!(after[0], Point::new(65.0, 0.0));
        assert_eq!(after[4], Point::new(100.0, 0.0));
    }

    #[test]
    fn test_split_near_open_end_drops_short_piece() {
        let set = labeled(horizontal_line());
        let path = set.paths()[0].clone();
        let (_, split) =
            set.split_path_and_get_label_rotation(&path, 1, Point::new(10.0, 0.0), 20.0, 5.0);
        let components = split.connected_components();
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].vertices()[0], Point::new(25.0, 0.0));
    }

    #[test]
    fn test_split_inserts_anchor_vertex() {
        let set = labeled(horizontal_line());
        let path = set.paths()[0].clone();
        // Anchor between vertices 4 and 5
        let (_, split) =
            set.split_path_and_get_label_rotation(&path, 5, Point::new(45.0, 0.0), 10.0, 0.0);
        let components = split.connected_components();
        assert_eq!(components[0].vertices().last(), Some(&Point::new(40.0, 0.0)));
        assert_eq!(components[1].vertices()[0], Point::new(50.0, 0.0));
    }

    #[test]
    fn test_rightside_up_flips_reversed_line() {
        let line: Vec<Point> = (0..=10).rev().map(|i| Point::new(i as f64 * 10.0, 0.0)).collect();
        let mut set =
            ContourSet::from_segments(vec![1.0], vec![vec![line]], None, ContourOptions::lines())
                .unwrap();
        let path = set.paths()[0].clone();

        set.clabel(LabelOptions::default().with_manual(vec![])).unwrap();
        let (angle, _) =
            set.split_path_and_get_label_rotation(&path, 5, Point::new(50.0, 0.0), 20.0, 5.0);
        assert_eq!(angle, 0.0);

        let mut options = LabelOptions::default().with_manual(vec![]);
        options.rightside_up = false;
        set.clabel(options).unwrap();
        let (angle, _) =
            set.split_path_and_get_label_rotation(&path, 5, Point::new(50.0, 0.0), 20.0, 5.0);
        assert_eq!(angle, 180.0);
    }

    #[test]
    fn test_locate_label_prefers_unlabeled_block() {
        let line: Vec<Point> = (0..30).map(|i| Point::new(i as f64, 0.0)).collect();
        let mut set = labeled(horizontal_line());

        let (anchor, idx) = set.locate_label(&line, 10.0);
        assert_eq!(idx, 5);
        assert_eq!(anchor, Point::new(5.0, 0.0));

        set.add_label(5.0, 0.0, 0.0, 1.0, 1.0).unwrap();
        let (anchor, idx) = set.locate_label(&line, 10.0);
        assert_eq!(idx, 25);
        assert_eq!(anchor, Point::new(25.0, 0.0));
    }

    #[test]
    fn test_print_label_thresholds() {
        let short: Vec<Point> = (0..5).map(|i| Point::new(i as f64, 0.0)).collect();
        assert!(!ContourSet::print_label(&short, 10.0));
        let wide = vec![Point::new(0.0, 0.0), Point::new(13.0, 0.0)];
        assert!(ContourSet::print_label(&wide, 10.0));
    }

    #[test]
    fn test_pop_label_negative_index() {
        let mut set = labeled(horizontal_line());
        set.add_label(1.0, 0.0, 0.0, 1.0, 1.0).unwrap();
        set.add_label(2.0, 0.0, 0.0, 1.0, 1.0).unwrap();
        let popped = set.pop_label(-1).unwrap();
        assert_eq!(popped.screen, Point::new(2.0, 0.0));
        assert_eq!(set.label_records().len(), 1);
        assert!(matches!(set.pop_label(3), Err(ContourError::LabelIndex { .. })));
    }

    #[test]
    fn test_add_label_requires_session() {
        let mut set = horizontal_line();
        assert!(matches!(
            set.add_label(0.0, 0.0, 0.0, 1.0, 1.0),
            Err(ContourError::NoLabelSession)
        ));
    }
}
