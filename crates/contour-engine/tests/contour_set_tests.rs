//! Tests for building contour sets from segments and grids.

use std::sync::Arc;

use contour_engine::{
    Color, ContourError, ContourOptions, ContourSet, Extend, LevelScale, LineStyle, MaxNLocator,
    Norm, PathCode, Point,
};
use test_utils::{
    assert_approx_eq, assert_slice_approx_eq, create_constant_grid, create_gaussian_peak,
    create_radial_grid, create_ramp_grid, create_saddle_grid, with_nans,
};

fn pts(coords: &[(f64, f64)]) -> Vec<Point> {
    coords.iter().map(|&(x, y)| Point::new(x, y)).collect()
}

fn unit_square() -> Vec<Point> {
    pts(&test_utils::shapes::UNIT_SQUARE)
}

// ============================================================================
// from_segments tests
// ============================================================================

#[test]
fn test_filled_square_end_to_end() {
    let set = ContourSet::from_segments(
        vec![0.0, 1.0],
        vec![vec![unit_square()]],
        None,
        ContourOptions::filled(),
    )
    .unwrap();

    assert!(set.is_filled());
    assert_eq!(set.layers(), &[0.5]);
    assert_eq!(set.paths().len(), 1);
    assert_eq!(set.paths()[0].vertices(), unit_square().as_slice());
    assert_eq!(set.paths()[0].codes()[0], PathCode::MoveTo);
}

#[test]
fn test_levels_round_trip() {
    let levels = vec![-1.0, 0.25, 3.0];
    let set = ContourSet::from_segments(
        levels.clone(),
        vec![vec![], vec![], vec![]],
        None,
        ContourOptions::lines().with_extend(Extend::Both),
    )
    .unwrap();

    assert_eq!(set.levels(), levels.as_slice());
    assert_eq!(set.extended_levels().len(), levels.len() + 2);
    assert_eq!(set.zmin(), -1.0);
    assert_eq!(set.zmax(), 3.0);
}

#[test]
fn test_segment_count_mismatch() {
    let err = ContourSet::from_segments(
        vec![0.0, 1.0, 2.0],
        vec![vec![unit_square()], vec![unit_square()], vec![unit_square()]],
        None,
        ContourOptions::filled(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        ContourError::SegmentCountMismatch {
            expected: "one less",
            segments: 3,
            levels: 3
        }
    ));

    let err = ContourSet::from_segments(vec![0.0, 1.0], vec![vec![]], None, ContourOptions::lines())
        .unwrap_err();
    assert!(matches!(err, ContourError::SegmentCountMismatch { expected: "same", .. }));
    assert!(err.is_validation_error());
}

#[test]
fn test_explicit_kinds_are_kept() {
    let kinds = vec![PathCode::MoveTo, PathCode::LineTo, PathCode::LineTo, PathCode::ClosePoly];
    let set = ContourSet::from_segments(
        vec![0.0, 1.0],
        vec![vec![unit_square()]],
        Some(vec![vec![Some(kinds.clone())]]),
        ContourOptions::filled(),
    )
    .unwrap();
    assert_eq!(set.paths()[0].codes(), kinds.as_slice());
    assert!(set.paths()[0].is_closed());
}

#[test]
fn test_non_increasing_levels_rejected() {
    let err = ContourSet::from_segments(
        vec![2.0, 1.0],
        vec![vec![], vec![]],
        None,
        ContourOptions::lines(),
    )
        .unwrap_err();
    assert!(matches!(err, ContourError::LevelsNotIncreasing(_)));
}

#[test]
fn test_unknown_options_reported() {
    let options: ContourOptions =
        serde_json::from_str(r#"{"filled": true, "shading": "gouraud"}"#).unwrap();
    let segments = vec![vec![unit_square()]];
    let set = ContourSet::from_segments(vec![0.0, 1.0], segments, None, options).unwrap();
    assert_eq!(set.ignored_options(), &["shading".to_string()]);
}

#[test]
fn test_invalid_extent() {
    let mut options = ContourOptions::lines();
    options.extent = Some(vec![0.0, 1.0, 2.0]);
    let err = ContourSet::from_grid(create_ramp_grid(3, 3), 3, 3, None, options).unwrap_err();
    assert!(matches!(err, ContourError::InvalidExtent(3)));
}

// ============================================================================
// Color tests
// ============================================================================

#[test]
fn test_under_over_colors_from_list() {
    let colors = vec![
        Color::rgb(0, 0, 255),
        Color::rgb(0, 255, 0),
        Color::rgb(255, 255, 0),
        Color::rgb(255, 0, 0),
    ];
    let options = ContourOptions::filled()
        .with_colors(colors.clone())
        .with_extend(Extend::Both);
    let set = ContourSet::from_segments(
        vec![0.0, 1.0, 2.0],
        vec![vec![unit_square()], vec![]],
        None,
        options,
    )
    .unwrap();

    assert_eq!(set.cvalues(), &[-1.0, 0.0, 1.0, 2.0]);
    assert_eq!(set.colormap().under(), colors[0]);
    assert_eq!(set.colormap().over(), colors[3]);
    assert_eq!(set.level_colors(), colors);
}

#[test]
fn test_line_colors_cycle() {
    let options =
        ContourOptions::lines().with_colors(vec![Color::rgb(255, 0, 0), Color::rgb(0, 0, 255)]);
    let set =
        ContourSet::from_segments(vec![1.0, 2.0, 3.0], vec![vec![], vec![], vec![]], None, options)
            .unwrap();

    assert_eq!(set.cvalues(), &[0.0, 1.0, 2.0]);
    assert_eq!(set.norm(), &Norm::NoNorm);
    assert_eq!(
        set.level_colors(),
        vec![Color::rgb(255, 0, 0), Color::rgb(0, 0, 255), Color::rgb(255, 0, 0)]
    );
    assert!(!set.is_monochrome());
}

#[test]
fn test_continuous_colors_span_colormap() {
    let set = ContourSet::from_segments(
        vec![0.0, 1.0, 2.0],
        vec![vec![], vec![], vec![]],
        None,
        ContourOptions::lines().with_cmap("viridis"),
    )
    .unwrap();

    let colors = set.level_colors();
    let cmap = set.colormap();
    assert_eq!(colors[0], cmap.colors()[0]);
    assert_eq!(colors[2], cmap.colors()[cmap.n() - 1]);
    assert_eq!(set.cvalues(), &[0.0, 1.0, 2.0]);
}

#[test]
fn test_unknown_colormap() {
    let err = ContourSet::from_segments(
        vec![1.0],
        vec![vec![]],
        None,
        ContourOptions::lines().with_cmap("no-such-map"),
    )
    .unwrap_err();
    assert!(matches!(err, ContourError::UnknownColormap(_)));
}

#[test]
fn test_monochrome_negative_levels_dashed() {
    let options = ContourOptions::lines()
        .with_levels(vec![-2.0, -1.0, 1.0, 2.0])
        .with_colors(vec![Color::BLACK]);
    let set = ContourSet::from_grid(create_saddle_grid(7, 7), 7, 7, None, options).unwrap();

    assert!(set.is_monochrome());
    assert_eq!(
        set.linestyles(),
        &[LineStyle::Dashed, LineStyle::Dashed, LineStyle::Solid, LineStyle::Solid]
    );
    assert_eq!(set.linewidths(), &[1.5; 4]);
}

// ============================================================================
// from_grid tests
// ============================================================================

#[test]
fn test_single_peak_ring() {
    #[rustfmt::skip]
    let grid = vec![
        0.0, 0.0, 0.0,
        0.0, 1.0, 0.0,
        0.0, 0.0, 0.0,
    ];
    let options = ContourOptions::lines().with_levels(vec![0.5]);
    let set = ContourSet::from_grid(grid, 3, 3, None, options).unwrap();

    let components = set.paths()[0].connected_components();
    assert_eq!(components.len(), 1);
    for p in components[0].vertices() {
        assert_approx_eq!((p.x - 1.0).abs() + (p.y - 1.0).abs(), 0.5, 1e-12);
    }
}

#[test]
fn test_radial_level_is_closed_circle() {
    let set = ContourSet::from_grid(
        create_radial_grid(21, 21),
        21,
        21,
        None,
        ContourOptions::lines().with_levels(vec![5.0]),
    )
    .unwrap();

    let components = set.paths()[0].connected_components();
    assert_eq!(components.len(), 1);
    assert!(components[0].is_closed());
    // Linear edge interpolation of a convex field lands slightly inside the circle
    for p in components[0].vertices() {
        let r = p.distance(Point::new(10.0, 10.0));
        assert!(r > 4.8 && r <= 5.0 + 1e-9, "radius {} off the circle", r);
    }
}

#[test]
fn test_ramp_contours_are_vertical() {
    let set = ContourSet::from_grid(
        create_ramp_grid(6, 4),
        6,
        4,
        None,
        ContourOptions::lines().with_levels(vec![1.5, 3.5]),
    )
    .unwrap();

    for (path, level) in set.paths().iter().zip([1.5, 3.5]) {
        assert!(!path.is_empty());
        assert!(path.vertices().iter().all(|p| (p.x - level).abs() < 1e-12));
    }
}

#[test]
fn test_extent_scales_coordinates() {
    let mut options = ContourOptions::lines().with_levels(vec![1.5]);
    options.extent = Some(vec![0.0, 30.0, 0.0, 1.0]);
    let set = ContourSet::from_grid(create_ramp_grid(4, 2), 4, 2, None, options).unwrap();

    // Columns sit at x = 0, 10, 20, 30
    assert!(set.paths()[0].vertices().iter().all(|p| (p.x - 15.0).abs() < 1e-9));
}

#[test]
fn test_auto_levels_cover_data() {
    let grid = create_gaussian_peak(30, 30, 3.0);
    let set = ContourSet::from_grid(grid, 30, 30, None, ContourOptions::lines()).unwrap();

    let levels = set.levels();
    assert!(levels.len() >= 3);
    assert!(levels.windows(2).all(|w| w[1] > w[0]));
    assert!(levels.iter().any(|&l| l > set.zmin() && l < set.zmax()));
}

#[test]
fn test_level_count_uses_locator() {
    let set = ContourSet::from_grid(
        create_ramp_grid(11, 3),
        11,
        3,
        None,
        ContourOptions::lines().with_locator(Arc::new(MaxNLocator::new(5))),
    )
    .unwrap();
    assert_slice_approx_eq!(set.levels(), &[0.0, 2.0, 4.0, 6.0, 8.0, 10.0], 1e-12);
}

#[test]
fn test_constant_grid_falls_back_to_zmin() {
    let set = ContourSet::from_grid(
        create_constant_grid(4, 4, 2.0),
        4,
        4,
        None,
        ContourOptions::lines().with_levels(vec![5.0]),
    )
    .unwrap();
    assert_eq!(set.levels(), &[2.0]);
}

#[test]
fn test_all_nan_grid_rejected() {
    let grid = vec![f64::NAN; 9];
    let err = ContourSet::from_grid(grid, 3, 3, None, ContourOptions::lines()).unwrap_err();
    assert!(matches!(err, ContourError::InvalidGrid(_)));
}

#[test]
fn test_filled_peak_bands() {
    let set = ContourSet::from_grid(
        create_gaussian_peak(21, 21, 1.0),
        21,
        21,
        None,
        ContourOptions::filled().with_levels(vec![0.0, 0.5, 1.0]),
    )
    .unwrap();

    assert_eq!(set.layers(), &[0.25, 0.75]);
    assert_eq!(set.paths().len(), 2);
    assert!(set.paths().iter().all(|p| !p.is_empty()));

    // The inner band stays inside the half-maximum radius
    let inner = set.paths()[1].bounds().unwrap();
    assert!(inner.0.x > 2.0 && inner.1.x < 18.0);
}

#[test]
fn test_log_scale_masks_non_positive() {
    let mut grid = with_nans(create_gaussian_peak(15, 15, 100.0), 15, &[(0, 0)]);
    grid[1] = 0.0;
    grid[2] = -3.0;

    let set = ContourSet::from_grid(
        grid,
        15,
        15,
        None,
        ContourOptions::filled()
            .with_levels(vec![1.0, 10.0, 100.0])
            .with_scale(LevelScale::Log),
    )
    .unwrap();

    assert!(set.zmin() > 0.0);
    assert_slice_approx_eq!(set.layers(), &[10f64.sqrt(), 1000f64.sqrt()], 1e-9);
    assert!(matches!(set.norm(), Norm::Log { .. }));
}

// ============================================================================
// find_nearest_contour tests
// ============================================================================

#[test]
fn test_nearest_contour_restricted_levels() {
    let low = pts(&[(0.0, 0.0), (10.0, 0.0)]);
    let high = pts(&[(0.0, 10.0), (10.0, 10.0)]);
    let set = ContourSet::from_segments(
        vec![1.0, 2.0],
        vec![vec![low], vec![high]],
        None,
        ContourOptions::lines(),
    )
    .unwrap();

    let nearest = set.find_nearest_contour(5.0, 2.0, None, false).unwrap().unwrap();
    assert_eq!(nearest.level, 0);

    let nearest = set.find_nearest_contour(5.0, 2.0, Some(&[1]), false).unwrap().unwrap();
    assert_eq!(nearest.level, 1);
    assert_eq!(nearest.point, Point::new(5.0, 10.0));
    assert_eq!(nearest.distance_squared, 64.0);
}

#[test]
fn test_nearest_contour_rejects_filled() {
    let segments = vec![vec![unit_square()]];
    let options = ContourOptions::filled();
    let set = ContourSet::from_segments(vec![0.0, 1.0], segments, None, options).unwrap();
    let err = set.find_nearest_contour(0.5, 0.5, None, false).unwrap_err();
    assert!(matches!(err, ContourError::FilledContourQuery));
}

#[test]
fn test_nearest_contour_empty_set() {
    let set =
        ContourSet::from_segments(vec![1.0], vec![vec![]], None, ContourOptions::lines()).unwrap();
    assert!(set.find_nearest_contour(0.0, 0.0, None, false).unwrap().is_none());
}
