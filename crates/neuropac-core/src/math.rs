//! Mathematical utility functions shared across the analysis crates.
//!
//! # Descriptive statistics
//!
//! - [`mean`] / [`variance`] / [`std_dev`] - Population moments (divide by `n`)
//! - [`sem`] - Standard error of the mean (`std / sqrt(n - 1)`)
//! - [`zscore`] - Standardize a slice in place
//!
//! # Phase
//!
//! - [`wrap_phase`] - Wrap an angle into `[-PI, PI)`
//! - [`phase_bin`] - Map an angle to one of `n` equal-width bins

use core::f64::consts::PI;
use libm::{floor, sqrt};

/// Arithmetic mean. Returns 0.0 for an empty slice.
///
/// # Example
/// ```rust
/// use neuropac_core::mean;
///
/// assert_eq!(mean(&[1.0, 2.0, 3.0]), 2.0);
/// ```
#[inline]
pub fn mean(x: &[f64]) -> f64 {
    if x.is_empty() {
        return 0.0;
    }
    x.iter().sum::<f64>() / x.len() as f64
}

/// Population variance (divides by `n`). Returns 0.0 for an empty slice.
pub fn variance(x: &[f64]) -> f64 {
    if x.is_empty() {
        return 0.0;
    }
    let m = mean(x);
    x.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / x.len() as f64
}

/// Population standard deviation.
#[inline]
pub fn std_dev(x: &[f64]) -> f64 {
    sqrt(variance(x))
}

/// Standard error of the mean: `std / sqrt(n - 1)`.
///
/// Returns 0.0 when fewer than two values are given.
pub fn sem(x: &[f64]) -> f64 {
    if x.len() < 2 {
        return 0.0;
    }
    std_dev(x) / sqrt((x.len() - 1) as f64)
}

/// Standardize `x` in place to zero mean and unit (population) variance.
///
/// A constant slice is only centred.
pub fn zscore(x: &mut [f64]) {
    let m = mean(x);
    let s = std_dev(x);
    for v in x.iter_mut() {
        *v -= m;
        if s > 0.0 {
            *v /= s;
        }
    }
}

/// Wrap an angle in radians into `[-PI, PI)`.
///
/// # Example
/// ```rust
/// use neuropac_core::wrap_phase;
/// use std::f64::consts::PI;
///
/// assert!((wrap_phase(3.0 * PI) + PI).abs() < 1e-12);
/// ```
#[inline]
pub fn wrap_phase(angle: f64) -> f64 {
    let two_pi = 2.0 * PI;
    angle - two_pi * floor((angle + PI) / two_pi)
}

/// Index of the phase bin containing `angle`, for `n_bins` equal bins over `[-PI, PI)`.
///
/// Zero bins map every angle to 0.
#[inline]
pub fn phase_bin(angle: f64, n_bins: usize) -> usize {
    if n_bins == 0 {
        return 0;
    }
    let width = 2.0 * PI / n_bins as f64;
    let bin = ((wrap_phase(angle) + PI) / width) as usize;
    bin.min(n_bins - 1)
}
