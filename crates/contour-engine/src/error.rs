//! Error types for contour construction, labeling and rendering.

use thiserror::Error;

/// Result type alias using ContourError.
pub type ContourResult<T> = Result<T, ContourError>;

/// Primary error type for contour operations.
#[derive(Debug, Error)]
pub enum ContourError {
    // === Level Errors ===
    #[error("Specified levels {requested:?} don't match available levels {available:?}")]
    LevelsNotFound {
        requested: Vec<f64>,
        available: Vec<f64>,
    },

    #[error("Too few contour levels: got {0}, filled contours require at least 2")]
    TooFewLevels(usize),

    #[error("Contour levels must be increasing: {0:?}")]
    LevelsNotIncreasing(Vec<f64>),

    // === Configuration Errors ===
    #[error("If given, 'extent' must be None or (x0, x1, y0, y1), got {0} values")]
    InvalidExtent(usize),

    #[error("Either colors or cmap must be None")]
    ConflictingColorSource,

    #[error("Unknown color: {0}")]
    UnknownColor(String),

    #[error("Unknown colormap: {0}")]
    UnknownColormap(String),

    #[error("Invalid label format '{format}': {message}")]
    InvalidFormat { format: String, message: String },

    // === Segment Errors ===
    #[error("must be {expected} number of segments as levels: got {segments} segment lists for {levels} levels")]
    SegmentCountMismatch {
        expected: &'static str,
        segments: usize,
        levels: usize,
    },

    #[error("allkinds has different length to allsegs: {kinds} vs {segments}")]
    KindCountMismatch { kinds: usize, segments: usize },

    #[error("Invalid grid: {0}")]
    InvalidGrid(String),

    // === Query Errors ===
    #[error("Method does not support filled contours")]
    FilledContourQuery,

    #[error("No label session has been configured; call clabel first")]
    NoLabelSession,

    #[error("Label index {index} out of range for {len} labels")]
    LabelIndex { index: isize, len: usize },

    // === Rendering Errors ===
    #[error("Font error: {0}")]
    Font(String),

    #[error("Rendering failed: {0}")]
    Render(String),
}

impl ContourError {
    /// Whether this error was caused by caller-supplied input.
    pub fn is_validation_error(&self) -> bool {
        !matches!(self, ContourError::Font(_) | ContourError::Render(_))
    }
}

impl From<std::io::Error> for ContourError {
    fn from(err: std::io::Error) -> Self {
        ContourError::Render(err.to_string())
    }
}
