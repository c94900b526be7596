//! Neuropac Core - DSP primitives for electrophysiology analysis
//!
//! This crate provides the small numerical building blocks the analysis
//! crates share.
//!
//! ## Filters
//!
//! - [`Biquad`] - Second-order IIR filter with RBJ cookbook coefficients
//! - [`BiquadCascade`] - Series of biquads, with causal and zero-phase
//!   (forward-backward) filtering
//!
//! ## Math
//!
//! - [`mean`], [`variance`], [`std_dev`], [`sem`], [`zscore`] - Descriptive statistics
//! - [`wrap_phase`], [`phase_bin`] - Angle helpers for phase binning
//!
//! ## Parallelism
//!
//! - [`Jobs`] - Worker count for parallel batches

pub mod biquad;
pub mod jobs;
pub mod math;

pub use biquad::{
    BUTTERWORTH_Q4, Biquad, BiquadCascade, highpass_coefficients, lowpass_coefficients, odd_extend,
};
pub use jobs::Jobs;
pub use math::{mean, phase_bin, sem, std_dev, variance, wrap_phase, zscore};
