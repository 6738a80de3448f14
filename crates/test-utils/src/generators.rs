//! Synthetic scalar fields for contouring tests.
//!
//! Every generator returns row-major `f64` values (row 0 first) over
//! integer grid coordinates, so the contour geometry can be checked by hand.

/// A grid whose value is the column index: `z = col`.
///
/// Contours at level `c` are vertical lines at `x = c`.
///
/// # Example
///
/// ```
/// use test_utils::create_ramp_grid;
///
/// let grid = create_ramp_grid(4, 2);
/// assert_eq!(grid, vec![0.0, 1.0, 2.0, 3.0, 0.0, 1.0, 2.0, 3.0]);
/// ```
pub fn create_ramp_grid(width: usize, height: usize) -> Vec<f64> {
    let mut data = Vec::with_capacity(width * height);
    for _row in 0..height {
        for col in 0..width {
            data.push(col as f64);
        }
    }
    data
}

/// A single Gaussian bump centered in the grid, peaking at `amplitude`.
///
/// Values fall towards zero at the edges, so contours well above the edge
/// values are closed rings around the center.
pub fn create_gaussian_peak(width: usize, height: usize, amplitude: f64) -> Vec<f64> {
    let cx = (width as f64 - 1.0) / 2.0;
    let cy = (height as f64 - 1.0) / 2.0;
    let sigma = (width.min(height) as f64 / 4.0).max(1.0);

    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let dx = col as f64 - cx;
            let dy = row as f64 - cy;
            let r2 = dx * dx + dy * dy;
            data.push(amplitude * (-r2 / (2.0 * sigma * sigma)).exp());
        }
    }
    data
}

/// A saddle `z = dx * dy` around the grid center.
///
/// Produces both positive and negative values, which exercises negative
/// line styles for monochrome contours.
pub fn create_saddle_grid(width: usize, height: usize) -> Vec<f64> {
    let cx = (width as f64 - 1.0) / 2.0;
    let cy = (height as f64 - 1.0) / 2.0;

    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push((col as f64 - cx) * (row as f64 - cy));
        }
    }
    data
}

/// A radial distance field `z = sqrt(dx^2 + dy^2)` from the grid center.
pub fn create_radial_grid(width: usize, height: usize) -> Vec<f64> {
    let cx = (width as f64 - 1.0) / 2.0;
    let cy = (height as f64 - 1.0) / 2.0;

    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let dx = col as f64 - cx;
            let dy = row as f64 - cy;
            data.push((dx * dx + dy * dy).sqrt());
        }
    }
    data
}

/// A wavy field with many small closed contours, for benchmarks.
///
/// `seed` shifts the phase so runs are deterministic but distinct.
pub fn create_wavy_grid(width: usize, height: usize, seed: u32) -> Vec<f64> {
    let phase = simple_hash(seed, seed.rotate_left(7), seed) as f64 / u32::MAX as f64;

    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let x = col as f64 / width.max(1) as f64 * std::f64::consts::TAU * 3.0;
            let y = row as f64 / height.max(1) as f64 * std::f64::consts::TAU * 3.0;
            data.push((x + phase).sin() * (y - phase).cos() * 10.0);
        }
    }
    data
}

/// Simple deterministic hash for reproducible test data.
fn simple_hash(x: u32, y: u32, seed: u32) -> u32 {
    let mut h = seed;
    h = h.wrapping_mul(31).wrapping_add(x);
    h = h.wrapping_mul(31).wrapping_add(y);
    h ^= h >> 16;
    h = h.wrapping_mul(0x85ebca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2ae35);
    h ^= h >> 16;
    h
}

/// A grid filled with a constant value.
pub fn create_constant_grid(width: usize, height: usize, value: f64) -> Vec<f64> {
    vec![value; width * height]
}

/// Overwrites the given `(col, row)` positions with NaN.
pub fn with_nans(mut data: Vec<f64>, width: usize, nan_positions: &[(usize, usize)]) -> Vec<f64> {
    for &(col, row) in nan_positions {
        if let Some(value) = data.get_mut(row * width + col) {
            *value = f64::NAN;
        }
    }
    data
}
