//! Level locators used when contour levels are not given explicitly.

use std::fmt::Debug;

/// Picks "nice" level values spanning a data range.
pub trait LevelLocator: Debug + Send + Sync {
    /// Candidate levels for `[data_min, data_max]`, sorted ascending.
    ///
    /// Locators may return values outside the range; callers trim them.
    fn pick_levels(&self, data_min: f64, data_max: f64) -> Vec<f64>;

    /// Symmetric locators produce levels that must not be trimmed.
    fn is_symmetric(&self) -> bool {
        false
    }
}

const DEFAULT_STEPS: [f64; 5] = [1.0, 2.0, 2.5, 5.0, 10.0];

/// Chooses at most `nbins` intervals with boundaries on nice step multiples.
#[derive(Debug, Clone)]
pub struct MaxNLocator {
    nbins: usize,
    steps: Vec<f64>,
    min_n_ticks: usize,
    symmetric: bool,
}

impl MaxNLocator {
    pub fn new(nbins: usize) -> Self {
        Self {
            nbins: nbins.max(1),
            steps: DEFAULT_STEPS.to_vec(),
            min_n_ticks: 1,
            symmetric: false,
        }
    }

    /// Make the range symmetric about zero.
    pub fn symmetric(mut self, symmetric: bool) -> Self {
        self.symmetric = symmetric;
        self
    }

    pub fn min_n_ticks(mut self, min_n_ticks: usize) -> Self {
        self.min_n_ticks = min_n_ticks;
        self
    }

    /// Steps extended one decade down and up, e.g. 0.1 .. 20 for the defaults.
    fn extended_steps(&self) -> Vec<f64> {
        let n = self.steps.len();
        let mut out: Vec<f64> = self.steps[..n - 1].iter().map(|s| 0.1 * s).collect();
        out.extend_from_slice(&self.steps);
        out.push(10.0 * self.steps[1]);
        out
    }

    fn raw_ticks(&self, vmin: f64, vmax: f64) -> Vec<f64> {
        let (scale, offset) = scale_range(vmin, vmax, self.nbins);
        let vmin = vmin - offset;
        let vmax = vmax - offset;
        let steps: Vec<f64> = self.extended_steps().iter().map(|s| s * scale).collect();
        let raw_step = (vmax - vmin) / self.nbins as f64;

        let istep = steps
            .iter()
            .position(|&s| s >= raw_step)
            .unwrap_or(steps.len() - 1);

        let mut ticks = Vec::new();
        for &step in steps[..=istep].iter().rev() {
            let best_vmin = (vmin / step).floor() * step;
            let low = edge_le(vmin - best_vmin, step);
            let high = edge_ge(vmax - best_vmin, step);
            ticks = (low as i64..=high as i64)
                .map(|k| k as f64 * step + best_vmin)
                .collect();
            let nticks = ticks.iter().filter(|&&t| t >= vmin && t <= vmax).count();
            if nticks >= self.min_n_ticks {
                break;
            }
        }
        ticks.into_iter().map(|t| t + offset).collect()
    }
}

impl Default for MaxNLocator {
    fn default() -> Self {
        Self::new(10)
    }
}

impl LevelLocator for MaxNLocator {
    fn pick_levels(&self, data_min: f64, data_max: f64) -> Vec<f64> {
        let (mut vmin, mut vmax) = nonsingular(data_min, data_max);
        if self.symmetric {
            let m = vmin.abs().max(vmax.abs());
            vmin = -m;
            vmax = m;
        }
        self.raw_ticks(vmin, vmax)
    }

    fn is_symmetric(&self) -> bool {
        self.symmetric
    }
}

/// Decade levels for log-scaled contours.
#[derive(Debug, Clone)]
pub struct LogLocator {
    numticks: usize,
}

impl LogLocator {
    pub fn new(numticks: usize) -> Self {
        Self {
            numticks: numticks.max(1),
        }
    }
}

impl Default for LogLocator {
    fn default() -> Self {
        Self::new(15)
    }
}

impl LevelLocator for LogLocator {
    fn pick_levels(&self, data_min: f64, data_max: f64) -> Vec<f64> {
        let (vmin, vmax) = if data_min <= data_max {
            (data_min, data_max)
        } else {
            (data_max, data_min)
        };
        if !(vmin > 0.0) || !vmax.is_finite() {
            return Vec::new();
        }
        let log_vmin = vmin.log10();
        let log_vmax = vmax.log10();
        let numdec = log_vmax.floor() - log_vmin.ceil();
        let stride = ((numdec + 1.0) / self.numticks as f64).ceil().max(1.0);

        let mut decades = Vec::new();
        let mut d = log_vmin.floor() - stride;
        let stop = log_vmax.ceil() + 2.0 * stride;
        while d < stop {
            decades.push(10f64.powf(d));
            d += stride;
        }
        decades
    }
}

/// Levels at every multiple of a fixed interval inside the range.
#[derive(Debug, Clone)]
pub struct IntervalLocator {
    interval: f64,
}

impl IntervalLocator {
    pub fn new(interval: f64) -> Self {
        Self { interval }
    }
}

impl LevelLocator for IntervalLocator {
    fn pick_levels(&self, data_min: f64, data_max: f64) -> Vec<f64> {
        generate_contour_levels(data_min, data_max, self.interval)
    }
}

/// Generate contour levels automatically based on data range and interval
pub fn generate_contour_levels(min_value: f64, max_value: f64, interval: f64) -> Vec<f64> {
    if interval <= 0.0 || max_value <= min_value {
        return vec![];
    }

    // Start from first multiple of interval above min_value
    let first = (min_value / interval).ceil() as i64;
    let last = (max_value / interval).floor() as i64;

    (first..=last).map(|k| k as f64 * interval).collect()
}

/// Expand a degenerate range so locators always see a positive span.
fn nonsingular(vmin: f64, vmax: f64) -> (f64, f64) {
    const EXPANDER: f64 = 1e-13;
    const TINY: f64 = 1e-14;

    let (mut vmin, mut vmax) = if vmin <= vmax { (vmin, vmax) } else { (vmax, vmin) };
    let maxabs = vmin.abs().max(vmax.abs());
    if maxabs < 1e6 * f64::MIN_POSITIVE {
        return (-EXPANDER, EXPANDER);
    }
    if vmax - vmin <= maxabs * TINY {
        if vmax == 0.0 && vmin == 0.0 {
            return (-EXPANDER, EXPANDER);
        }
        vmin -= EXPANDER * vmin.abs();
        vmax += EXPANDER * vmax.abs();
    }
    (vmin, vmax)
}

/// Returns (scale, offset) for tick computation over a range.
fn scale_range(vmin: f64, vmax: f64, n: usize) -> (f64, f64) {
    const THRESHOLD: f64 = 100.0;

    let dv = (vmax - vmin).abs();
    let meanv = (vmax + vmin) / 2.0;
    let offset = if meanv.abs() / dv < THRESHOLD {
        0.0
    } else {
        10f64.powf(meanv.abs().log10().floor()).copysign(meanv)
    };
    let scale = 10f64.powf((dv / n as f64).log10().floor());
    (scale, offset)
}

fn edge_closeto(ms: f64, edge: f64) -> bool {
    (ms - edge).abs() < 1e-10
}

/// Largest n such that n * step <= x, tolerant to rounding.
fn edge_le(x: f64, step: f64) -> f64 {
    let d = (x / step).floor();
    let m = x - d * step;
    if edge_closeto(m / step, 1.0) {
        d + 1.0
    } else {
        d
    }
}

/// Smallest n such that n * step >= x, tolerant to rounding.
fn edge_ge(x: f64, step: f64) -> f64 {
    let d = (x / step).floor();
    let m = x - d * step;
    if edge_closeto(m / step, 0.0) {
        d
    } else {
        d + 1.0
    }
}
