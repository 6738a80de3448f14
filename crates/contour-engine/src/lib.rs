//! Contour generation, coloring and labeling.
//!
//! Builds sets of iso-lines and filled bands from gridded data or from
//! precomputed segments, maps levels to colors, places inline labels along
//! the contours and rasterizes the result.
//! - Level selection (locators, extend sentinels, log scale)
//! - Discrete and continuous level coloring
//! - Automatic, manual and interactive label placement
//! - PNG rendering through tiny-skia

pub mod color;
pub mod colormap;
pub mod contour_set;
pub mod error;
pub mod format;
pub mod geometry;
pub mod interactive;
pub mod labeler;
pub mod levels;
pub mod locator;
pub mod render;
pub mod style;
pub mod text;
pub mod tracer;
pub mod transform;

pub use color::Color;
pub use colormap::{Colormap, ColormapSpec, Norm};
pub use contour_set::{ContourSet, NearestContour, SegmentKinds};
pub use error::{ContourError, ContourResult};
pub use format::{LabelFormat, LevelText, PrintfFormat, ScalarFormatter, TickFormatter};
pub use geometry::{Path, PathCode, Point};
pub use interactive::{InputEvent, LabelSession, MouseButton, SessionAction, SessionControl};
pub use labeler::{ContourLabel, Coordinates, LabelOptions};
pub use levels::{Extend, LevelScale, LevelSet, LevelSpec};
pub use locator::{LevelLocator, LogLocator, MaxNLocator};
pub use style::{ContourOptions, Hatch, LineStyle, Origin};
pub use text::{SegmentFont, TextRenderer, TrueTypeFont};
pub use tracer::{ContourTracer, GridAxes, MarchingSquares};
pub use transform::{AxisScale, DataTransform, IdentityTransform, Viewport};
