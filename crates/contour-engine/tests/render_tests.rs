//! Tests for rasterizing contour sets.

use std::sync::Arc;

use contour_engine::{
    Color, ContourOptions, ContourSet, Hatch, LabelOptions, Point, TextRenderer, TrueTypeFont,
    Viewport,
};
use test_utils::{create_gaussian_peak, require_test_file, shapes};

fn pts(coords: &[(f64, f64)]) -> Vec<Point> {
    coords.iter().map(|&(x, y)| Point::new(x, y)).collect()
}

fn opaque_pixels(pixmap: &tiny_skia::Pixmap) -> usize {
    pixmap.pixels().iter().filter(|p| p.alpha() > 0).count()
}

fn rgb_at(pixmap: &tiny_skia::Pixmap, x: u32, y: u32) -> (u8, u8, u8) {
    let p = pixmap.pixel(x, y).unwrap();
    (p.red(), p.green(), p.blue())
}

#[test]
fn test_filled_bands_use_level_colors() {
    let blue = Color::rgb(0, 0, 255);
    let red = Color::rgb(255, 0, 0);
    let set = ContourSet::from_segments(
        vec![0.0, 1.0, 2.0],
        vec![
            vec![pts(&shapes::closed_square((0.0, 0.0), 10.0))],
            vec![pts(&shapes::closed_square((10.0, 0.0), 10.0))],
        ],
        None,
        ContourOptions::filled().with_colors(vec![blue, red]),
    )
    .unwrap();

    let pixmap = set.render_pixmap(20, 10, Color::WHITE).unwrap();
    assert_eq!(rgb_at(&pixmap, 5, 5), (0, 0, 255));
    assert_eq!(rgb_at(&pixmap, 15, 5), (255, 0, 0));
}

#[test]
fn test_viewport_flips_y() {
    let set = ContourSet::from_segments(
        vec![0.0, 1.0],
        vec![vec![pts(&shapes::closed_square((0.0, 0.0), 50.0))]],
        None,
        ContourOptions::filled().with_colors(vec![Color::BLACK]),
    )
    .unwrap()
    .with_transform(Arc::new(Viewport::new([0.0, 100.0, 0.0, 100.0], 100.0, 100.0)));

    let pixmap = set.render_pixmap(100, 100, Color::WHITE).unwrap();
    // Data origin is the bottom-left corner of the canvas
    assert_eq!(rgb_at(&pixmap, 10, 90), (0, 0, 0));
    assert_eq!(rgb_at(&pixmap, 10, 10), (255, 255, 255));
}

#[test]
fn test_dashed_lines_draw_fewer_pixels() {
    let line = vec![vec![pts(&shapes::horizontal_line(0.0, 200.0, 10.0, 2))]];
    let solid = ContourSet::from_segments(
        vec![1.0],
        line.clone(),
        None,
        ContourOptions::lines().with_colors(vec![Color::BLACK]),
    )
    .unwrap();
    let mut dashed_options = ContourOptions::lines().with_colors(vec![Color::BLACK]);
    dashed_options.linestyles = Some(vec![contour_engine::LineStyle::Dashed]);
    let dashed = ContourSet::from_segments(vec![1.0], line, None, dashed_options).unwrap();

    let solid_px = opaque_pixels(&solid.render_pixmap(200, 20, Color::TRANSPARENT).unwrap());
    let dashed_px = opaque_pixels(&dashed.render_pixmap(200, 20, Color::TRANSPARENT).unwrap());
    assert!(solid_px > 0);
    assert!(dashed_px < solid_px);
}

#[test]
fn test_hatched_band_is_clipped() {
    let mut options = ContourOptions::filled().with_colors(vec![Color::WHITE]);
    options.hatches = vec![Some(Hatch::new("/"))];
    let set = ContourSet::from_segments(
        vec![0.0, 1.0],
        vec![vec![pts(&shapes::closed_square((0.0, 0.0), 40.0))]],
        None,
        options,
    )
    .unwrap();

    let pixmap = set.render_pixmap(80, 40, Color::TRANSPARENT).unwrap();
    let dark_inside = (0..40)
        .flat_map(|x| (0..40).map(move |y| (x, y)))
        .filter(|&(x, y)| rgb_at(&pixmap, x, y).0 < 200)
        .count();
    assert!(dark_inside > 0);

    // Nothing outside the band
    let outside = (41..80)
        .flat_map(|x| (0..40).map(move |y| (x, y)))
        .filter(|&(x, y)| pixmap.pixel(x, y).unwrap().alpha() > 0)
        .count();
    assert_eq!(outside, 0);
}

#[test]
fn test_labels_are_drawn() {
    let mut set = ContourSet::from_segments(
        vec![1.0],
        vec![vec![pts(&shapes::horizontal_line(0.0, 200.0, 20.0, 201))]],
        None,
        ContourOptions::lines().with_colors(vec![Color::rgb(0, 128, 0)]),
    )
    .unwrap();
    let before = set.render_pixmap(200, 40, Color::TRANSPARENT).unwrap();

    set.clabel(
        LabelOptions::default()
            .inline(false)
            .with_font_size(30.0)
            .with_colors(vec![Color::rgb(200, 0, 0)]),
    )
    .unwrap();
    let after = set.render_pixmap(200, 40, Color::TRANSPARENT).unwrap();

    let red = after
        .pixels()
        .iter()
        .filter(|p| p.red() > 100 && p.green() < 50)
        .count();
    assert!(red > 0);
    assert!(opaque_pixels(&after) > opaque_pixels(&before));
}

#[test]
fn test_render_png_of_traced_grid() {
    let set = ContourSet::from_grid(
        create_gaussian_peak(30, 30, 2.0),
        30,
        30,
        None,
        ContourOptions::filled().with_level_count(5),
    )
    .unwrap()
    .with_transform(Arc::new(Viewport::new([0.0, 29.0, 0.0, 29.0], 64.0, 64.0)));

    let png = set.render_png(64, 64).unwrap();
    assert_eq!(&png[1..4], b"PNG");
}

#[test]
fn test_invalid_canvas_size() {
    let set =
        ContourSet::from_segments(vec![1.0], vec![vec![]], None, ContourOptions::lines()).unwrap();
    assert!(set.render_png(0, 10).is_err());
}

#[test]
fn test_truetype_outline_labels() {
    let path = require_test_file!("DejaVuSans.ttf");
    let font = TrueTypeFont::from_file(&path).unwrap();
    assert!(font.text_width("10.5", 12.0) > font.text_width("1", 12.0));
    assert!(font.stroke_width(12.0).is_none());

    let mut set = ContourSet::from_segments(
        vec![1.0],
        vec![vec![pts(&shapes::horizontal_line(0.0, 200.0, 20.0, 201))]],
        None,
        ContourOptions::lines(),
    )
    .unwrap()
    .with_text_renderer(Arc::new(font));
    set.clabel(LabelOptions::default()).unwrap();

    let pixmap = set.render_pixmap(200, 40, Color::TRANSPARENT).unwrap();
    assert!(opaque_pixels(&pixmap) > 0);
}
