//! Level validation, automatic level selection, and band layers.

use serde::{Deserialize, Serialize};

use crate::error::{ContourError, ContourResult};
use crate::locator::LevelLocator;

/// Default number of levels when only a data range is known.
pub const DEFAULT_LEVEL_COUNT: usize = 7;

const LINEAR_SENTINEL: f64 = 1e250;
const LOG_LOWER_SENTINEL: f64 = 1e-250;

/// Policy for coloring data outside the explicit level range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Extend {
    #[default]
    Neither,
    Min,
    Max,
    Both,
}

impl Extend {
    pub fn extends_min(self) -> bool {
        matches!(self, Extend::Min | Extend::Both)
    }

    pub fn extends_max(self) -> bool {
        matches!(self, Extend::Max | Extend::Both)
    }

    pub fn is_active(self) -> bool {
        self != Extend::Neither
    }

    /// Number of extra bands this mode adds.
    pub fn count(self) -> usize {
        self.extends_min() as usize + self.extends_max() as usize
    }
}

/// Scale in which levels are spaced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LevelScale {
    #[default]
    Linear,
    Log,
}

/// Levels as configured: a count to auto-select, or explicit values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LevelSpec {
    Count(usize),
    Values(Vec<f64>),
}

/// Processed levels: user levels, sentinel-extended levels, and layers.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelSet {
    pub levels: Vec<f64>,
    pub extended: Vec<f64>,
    pub layers: Vec<f64>,
}

/// Check the structural requirements on a level list.
pub fn validate_levels(levels: &[f64], filled: bool) -> ContourResult<()> {
    if levels.is_empty() || (filled && levels.len() < 2) {
        return Err(ContourError::TooFewLevels(levels.len()));
    }
    if levels.windows(2).any(|w| !(w[1] > w[0])) {
        return Err(ContourError::LevelsNotIncreasing(levels.to_vec()));
    }
    Ok(())
}

/// Pick levels for `[zmin, zmax]` with a locator and trim the excess.
///
/// Levels strictly outside the data range are dropped from both ends,
/// keeping the one level just beyond each end unless that end is extended.
/// If fewer than 3 levels would remain, the untrimmed locator output is used.
pub fn autolev(locator: &dyn LevelLocator, zmin: f64, zmax: f64, extend: Extend) -> Vec<f64> {
    let lev = locator.pick_levels(zmin, zmax);
    if locator.is_symmetric() {
        return lev;
    }

    let mut i0 = lev.iter().rposition(|&l| l < zmin).unwrap_or(0) as isize;
    let mut i1 = lev
        .iter()
        .position(|&l| l > zmax)
        .map(|i| i + 1)
        .unwrap_or(lev.len()) as isize;
    if extend.extends_min() {
        i0 += 1;
    }
    if extend.extends_max() {
        i1 -= 1;
    }
    if i1 - i0 < 3 {
        tracing::debug!(
            candidates = lev.len(),
            "level trim left fewer than 3 levels, keeping locator output"
        );
        return lev;
    }
    lev[i0 as usize..i1 as usize].to_vec()
}

/// Add extend sentinels and compute per-band layers.
pub fn process_levels(levels: &[f64], filled: bool, extend: Extend, scale: LevelScale) -> LevelSet {
    let (lower, upper) = match scale {
        LevelScale::Linear => (-LINEAR_SENTINEL, LINEAR_SENTINEL),
        LevelScale::Log => (LOG_LOWER_SENTINEL, LINEAR_SENTINEL),
    };

    let mut extended = Vec::with_capacity(levels.len() + 2);
    if extend.extends_min() {
        extended.push(lower);
    }
    extended.extend_from_slice(levels);
    if extend.extends_max() {
        extended.push(upper);
    }

    let layers = if filled {
        extended
            .windows(2)
            .map(|w| match scale {
                // sqrt before multiplying keeps the sentinels from overflowing
                LevelScale::Log => w[0].sqrt() * w[1].sqrt(),
                LevelScale::Linear => 0.5 * (w[0] + w[1]),
            })
            .collect()
    } else {
        levels.to_vec()
    };

    LevelSet {
        levels: levels.to_vec(),
        extended,
        layers,
    }
}

/// Lower and upper bounds of each filled band.
///
/// When the lowest bound equals the data minimum it is nudged down so the
/// minimum itself falls inside the first band.
pub fn lowers_and_uppers(extended: &[f64], zmin: f64, scale: LevelScale) -> (Vec<f64>, Vec<f64>) {
    if extended.len() < 2 {
        return (Vec::new(), Vec::new());
    }
    let mut lowers = extended[..extended.len() - 1].to_vec();
    if lowers[0] == zmin {
        lowers[0] = match scale {
            LevelScale::Log => 0.99 * zmin,
            LevelScale::Linear => lowers[0] - 1.0,
        };
    }
    let uppers = extended[1..].to_vec();
    (lowers, uppers)
}
