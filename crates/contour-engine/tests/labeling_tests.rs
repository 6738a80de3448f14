//! Tests for label placement, formatting and interactive sessions.

use std::sync::Arc;

use contour_engine::{
    Color, ContourError, ContourOptions, ContourSet, Coordinates, InputEvent, LabelFormat,
    LabelOptions, LabelSession, MouseButton, Point, Viewport,
};
use test_utils::{assert_approx_eq, assert_coords_approx_eq, shapes};

fn pts(coords: &[(f64, f64)]) -> Vec<Point> {
    coords.iter().map(|&(x, y)| Point::new(x, y)).collect()
}

/// Two long horizontal line contours at y = 10 (level 1) and y = 50 (level 2).
fn two_lines() -> ContourSet {
    ContourSet::from_segments(
        vec![1.0, 2.0],
        vec![
            vec![pts(&shapes::horizontal_line(0.0, 100.0, 10.0, 101))],
            vec![pts(&shapes::horizontal_line(0.0, 100.0, 50.0, 101))],
        ],
        None,
        ContourOptions::lines(),
    )
    .unwrap()
}

fn left_click(x: f64, y: f64) -> InputEvent {
    InputEvent::ButtonPress {
        button: MouseButton::Left,
        x,
        y,
    }
}

fn key(name: &str) -> InputEvent {
    InputEvent::KeyPress {
        key: Some(name.to_string()),
        x: 0.0,
        y: 0.0,
    }
}

// ============================================================================
// too_close tests
// ============================================================================

#[test]
fn test_too_close_after_one_label() {
    let mut set = two_lines();
    assert!(!set.too_close(10.0, 10.0, 5.0));

    set.clabel(LabelOptions::default().with_manual(Vec::new())).unwrap();
    assert!(set.label_records().is_empty());
    assert!(!set.too_close(10.0, 10.0, 5.0));

    set.add_label(10.0, 10.0, 0.0, 1.0, 0.0).unwrap();
    assert!(set.too_close(10.5, 10.5, 5.0));
    assert!(!set.too_close(100.0, 100.0, 5.0));
}

// ============================================================================
// get_text tests
// ============================================================================

#[test]
fn test_get_text_formats() {
    let set = two_lines();
    assert_eq!(set.get_text(0.5, &LabelFormat::printf("%1.2f").unwrap()), "0.50");
    assert_eq!(set.get_text(0.5, &LabelFormat::mapping([(0.5, "half")])), "half");
    assert_eq!(set.get_text("custom", &LabelFormat::default()), "custom");
    assert_eq!(set.get_text(2.0, &LabelFormat::callable(|v| format!("{} m", v))), "2 m");
}

#[test]
fn test_get_text_default_uses_shared_precision() {
    let mut set = ContourSet::from_segments(
        vec![0.5, 1.0, 1.5],
        vec![vec![], vec![], vec![]],
        None,
        ContourOptions::lines(),
    )
    .unwrap();
    set.clabel(LabelOptions::default().with_manual(Vec::new())).unwrap();
    assert_eq!(set.get_text(1.0, &LabelFormat::default()), "1.0");
}

#[test]
fn test_invalid_printf_format() {
    assert!(matches!(
        LabelFormat::printf("%1.2f and %d"),
        Err(ContourError::InvalidFormat { .. })
    ));
}

// ============================================================================
// clabel tests
// ============================================================================

#[test]
fn test_clabel_unknown_level_rejected() {
    let mut set = ContourSet::from_segments(
        vec![1.0, 2.0, 3.0],
        vec![vec![], vec![], vec![]],
        None,
        ContourOptions::lines(),
    )
    .unwrap();
    let err = set.clabel(LabelOptions::default().with_levels(vec![5.0])).unwrap_err();
    assert!(matches!(err, ContourError::LevelsNotFound { .. }));
}

#[test]
fn test_clabel_inline_breaks_lines() {
    let mut set = two_lines();
    let labels = set.clabel(LabelOptions::default()).unwrap();

    assert_eq!(labels.len(), 2);
    assert_eq!(labels[0].text, "1");
    assert_eq!(labels[1].text, "2");
    // Straight lines label their first block, half a label width in
    assert_eq!(labels[0].screen, Point::new(3.0, 10.0));
    assert_approx_eq!(labels[0].rotation, 0.0, 1e-12);

    // The gap runs past the start of each line, leaving one piece
    let label_width = set.label_width(0).unwrap();
    for path in set.paths() {
        assert_eq!(path.connected_components().len(), 1);
        assert_approx_eq!(path.vertices()[0].x, 3.0 + label_width / 2.0 + 5.0, 1e-9);
    }
}

#[test]
fn test_clabel_not_inline_keeps_lines() {
    let mut set = two_lines();
    set.clabel(LabelOptions::default().inline(false).with_levels(vec![2.0]))
        .unwrap();

    assert_eq!(set.label_records().len(), 1);
    assert_eq!(set.label_records()[0].level, 2.0);
    assert_eq!(set.label_levels(), &[2.0]);
    for path in set.paths() {
        assert_eq!(path.connected_components().len(), 1);
    }
}

#[test]
fn test_clabel_manual_positions() {
    let mut set = two_lines();
    let labels = set
        .clabel(LabelOptions::default().with_manual(vec![Point::new(30.0, 48.0)]))
        .unwrap();

    assert_eq!(labels.len(), 1);
    assert_eq!(labels[0].level, 2.0);
    assert_approx_eq!(labels[0].data.x, 30.0, 1e-9);
    assert_approx_eq!(labels[0].data.y, 50.0, 1e-9);
}

#[test]
fn test_clabel_explicit_colors() {
    let mut set = two_lines();
    let red = Color::rgb(255, 0, 0);
    let labels = set
        .clabel(LabelOptions::default().with_colors(vec![red]))
        .unwrap();
    assert!(labels.iter().all(|l| l.color == red));
    assert_eq!(set.label_cvalues(), vec![0.0, 1.0]);
}

#[test]
fn test_short_contours_not_labeled() {
    let mut set = ContourSet::from_segments(
        vec![1.0],
        vec![vec![pts(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)])]],
        None,
        ContourOptions::lines(),
    )
    .unwrap();
    set.clabel(LabelOptions::default()).unwrap();
    assert!(set.label_records().is_empty());
    assert_eq!(set.paths()[0].len(), 3);
}

#[test]
fn test_closed_ring_split_keeps_remainder() {
    let ring = pts(&shapes::circle((50.0, 50.0), 30.0, 120));
    let mut set =
        ContourSet::from_segments(vec![1.0], vec![vec![ring]], None, ContourOptions::lines())
            .unwrap();
    set.clabel(LabelOptions::default()).unwrap();

    assert_eq!(set.label_records().len(), 1);
    let components = set.paths()[0].connected_components();
    assert_eq!(components.len(), 1);
    assert!(!components[0].is_closed());
}

#[test]
fn test_label_wider_than_closed_ring_removes_it() {
    let ring = pts(&shapes::closed_square((0.0, 0.0), 3.0));
    let line = pts(&shapes::horizontal_line(0.0, 100.0, 50.0, 101));
    let segments = vec![vec![ring, line.clone()]];
    let mut set =
        ContourSet::from_segments(vec![1.0], segments, None, ContourOptions::lines()).unwrap();
    set.clabel(LabelOptions::default().with_font_size(40.0).with_manual(Vec::new()))
        .unwrap();
    assert_eq!(set.paths()[0].connected_components().len(), 2);

    // The 12 px perimeter is shorter than the label
    assert!(set.label_width(0).unwrap() > 12.0);
    set.add_label_near(1.5, 0.0, true, 5.0, Coordinates::Data).unwrap();

    assert_eq!(set.label_records().len(), 1);
    let label = &set.label_records()[0];
    assert_coords_approx_eq!((label.data.x, label.data.y), (1.5, 0.0), 1e-9);

    let components = set.paths()[0].connected_components();
    assert_eq!(components.len(), 1);
    assert_eq!(components[0].vertices(), line.as_slice());
}

#[test]
fn test_label_positions_follow_transform() {
    let viewport = Viewport::new([0.0, 100.0, 0.0, 100.0], 200.0, 200.0);
    let mut set = two_lines().with_transform(Arc::new(viewport));
    set.clabel(LabelOptions::default().inline(false).with_levels(vec![1.0]))
        .unwrap();

    let label = &set.label_records()[0];
    // y = 10 in data is 20 px above the bottom of a 200 px canvas
    assert_approx_eq!(label.screen.y, 180.0, 1e-9);
    assert_approx_eq!(label.data.y, 10.0, 1e-9);
}

#[test]
fn test_pop_label() {
    let mut set = two_lines();
    set.clabel(LabelOptions::default().inline(false)).unwrap();
    assert_eq!(set.label_records().len(), 2);

    let popped = set.pop_label(-1).unwrap();
    assert_eq!(popped.level, 2.0);
    assert_eq!(set.label_texts(), vec!["1"]);

    assert!(matches!(set.pop_label(3), Err(ContourError::LabelIndex { index: 3, len: 1 })));
}

#[test]
fn test_add_label_near_screen_coordinates() {
    let mut set = two_lines();
    set.clabel(LabelOptions::default().with_manual(Vec::new())).unwrap();
    set.add_label_near(70.0, 13.0, false, 5.0, Coordinates::Screen).unwrap();

    assert_eq!(set.label_records().len(), 1);
    assert_eq!(set.label_records()[0].level, 1.0);
    assert_eq!(set.label_positions(), vec![Point::new(70.0, 10.0)]);
}

// ============================================================================
// Interactive session tests
// ============================================================================

#[test]
fn test_interactive_add_remove_stop() {
    let mut set = two_lines();
    let events = vec![
        left_click(50.0, 12.0),
        key("backspace"),
        left_click(50.0, 48.0),
        key("escape"),
        left_click(50.0, 12.0),
    ];
    let labels = set
        .clabel_interactive(LabelOptions::default().inline(false), events)
        .unwrap();

    assert_eq!(labels.len(), 1);
    assert_eq!(labels[0].level, 2.0);
}

#[test]
fn test_interactive_inline_ignores_remove() {
    let mut set = two_lines();
    let events = vec![left_click(50.0, 12.0), key("delete")];
    let labels = set.clabel_interactive(LabelOptions::default(), events).unwrap();

    assert_eq!(labels.len(), 1);
    assert_eq!(set.paths()[0].connected_components().len(), 2);
}

#[test]
fn test_interactive_outside_viewport_ignored() {
    let viewport = Viewport::new([0.0, 100.0, 0.0, 100.0], 100.0, 100.0);
    let mut set = two_lines().with_transform(Arc::new(viewport));
    let labels = set
        .clabel_interactive(LabelOptions::default(), vec![left_click(150.0, 90.0)])
        .unwrap();
    assert!(labels.is_empty());
}

#[test]
fn test_session_change_hook() {
    let mut set = two_lines();
    set.clabel(LabelOptions::default().inline(false).with_manual(Vec::new()))
        .unwrap();

    let mut seen = Vec::new();
    let count = LabelSession::new(&mut set, false, 5.0)
        .on_change(|s: &ContourSet| seen.push(s.label_records().len()))
        .run(vec![left_click(10.0, 11.0), left_click(90.0, 49.0), key("delete")])
        .unwrap();

    assert_eq!(count, 1);
    assert_eq!(seen, vec![1, 2, 1]);
}

#[test]
fn test_session_requires_configuration() {
    let mut set = two_lines();
    let err = LabelSession::new(&mut set, false, 5.0)
        .run(vec![left_click(10.0, 11.0)])
        .unwrap_err();
    assert!(matches!(err, ContourError::NoLabelSession));
}
