//! Synthetic grid field generators.
//!
//! Small, deterministic row-major value fields for exercising extraction
//! and interpolation without real forecast data.

/// A field where every cell holds the same value.
pub fn constant_field(width: usize, height: usize, value: f64) -> Vec<f64> {
    vec![value; width * height]
}

/// A field that increases linearly: `base + step * (row * width + col)`.
///
/// Handy for verifying interpolation weights, since the bilinear blend of a
/// linear field reproduces the field exactly.
pub fn linear_field(width: usize, height: usize, base: f64, step: f64) -> Vec<f64> {
    (0..width * height)
        .map(|i| base + step * i as f64)
        .collect()
}

/// A linear field with every cell at the given positions replaced by NaN,
/// which grid sources interpret as missing.
pub fn field_with_holes(
    width: usize,
    height: usize,
    base: f64,
    step: f64,
    holes: &[(usize, usize)],
) -> Vec<f64> {
    let mut data = linear_field(width, height, base, step);
    for &(x, y) in holes {
        if x < width && y < height {
            data[y * width + x] = f64::NAN;
        }
    }
    data
}

/// A field of NaN only: an entirely missing message.
pub fn all_missing_field(width: usize, height: usize) -> Vec<f64> {
    vec![f64::NAN; width * height]
}
