//! Biquad (bi-quadratic) filter structure.
//!
//! Provides a generic second-order IIR filter plus the Butterworth cascades
//! used for band extraction in electrophysiology recordings.
//!
//! Coefficient calculation uses the RBJ Audio EQ Cookbook formulas.

use core::f64::consts::PI;
use libm::{cos, sin};

/// Q values of the two second-order sections of a 4th order Butterworth response.
pub const BUTTERWORTH_Q4: [f64; 2] = [0.541_196_1, 1.306_563];

/// Generic biquad filter coefficients and state.
///
/// Implements the Direct Form I biquad structure:
/// ```text
/// y[n] = b0*x[n] + b1*x[n-1] + b2*x[n-2]
///                - a1*y[n-1] - a2*y[n-2]
/// ```
#[derive(Debug, Clone)]
pub struct Biquad {
    /// Feedforward coefficients
    b0: f64,
    b1: f64,
    b2: f64,

    /// Feedback coefficients (normalized by a0)
    a1: f64,
    a2: f64,

    /// Input delay line: x[n-1], x[n-2]
    x1: f64,
    x2: f64,

    /// Output delay line: y[n-1], y[n-2]
    y1: f64,
    y2: f64,
}

impl Biquad {
    /// Creates a new biquad with passthrough coefficients.
    ///
    /// Initial state: `y[n] = x[n]` (no filtering)
    pub fn new() -> Self {
        Self {
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        }
    }

    /// Creates a biquad from a `(b0, b1, b2, a0, a1, a2)` coefficient tuple.
    pub fn from_coefficients(coeffs: (f64, f64, f64, f64, f64, f64)) -> Self {
        let mut biquad = Self::new();
        let (b0, b1, b2, a0, a1, a2) = coeffs;
        biquad.set_coefficients(b0, b1, b2, a0, a1, a2);
        biquad
    }

    /// Sets the biquad coefficients.
    ///
    /// Note: This function normalizes by a0 internally.
    pub fn set_coefficients(&mut self, b0: f64, b1: f64, b2: f64, a0: f64, a1: f64, a2: f64) {
        let a0_inv = 1.0 / a0;
        self.b0 = b0 * a0_inv;
        self.b1 = b1 * a0_inv;
        self.b2 = b2 * a0_inv;
        self.a1 = a1 * a0_inv;
        self.a2 = a2 * a0_inv;
    }

    /// Processes a single sample through the biquad filter.
    #[inline]
    pub fn process(&mut self, input: f64) -> f64 {
        let output = self.b0 * input + self.b1 * self.x1 + self.b2 * self.x2
            - self.a1 * self.y1
            - self.a2 * self.y2;

        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = output;

        output
    }

    /// Clears the filter state (delay lines).
    pub fn clear(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }
}

impl Default for Biquad {
    fn default() -> Self {
        Self::new()
    }
}

/// Calculates low-pass filter coefficients using the RBJ cookbook formula.
///
/// # Returns
///
/// (b0, b1, b2, a0, a1, a2) coefficients
pub fn lowpass_coefficients(frequency: f64, q: f64, sample_rate: f64) -> (f64, f64, f64, f64, f64, f64) {
    let omega = 2.0 * PI * frequency / sample_rate;
    let cos_omega = cos(omega);
    let alpha = sin(omega) / (2.0 * q);

    let b0 = (1.0 - cos_omega) / 2.0;
    let b1 = 1.0 - cos_omega;
    let b2 = (1.0 - cos_omega) / 2.0;
    let a0 = 1.0 + alpha;
    let a1 = -2.0 * cos_omega;
    let a2 = 1.0 - alpha;

    (b0, b1, b2, a0, a1, a2)
}

/// Calculates high-pass filter coefficients using the RBJ cookbook formula.
///
/// # Returns
///
/// (b0, b1, b2, a0, a1, a2) coefficients
pub fn highpass_coefficients(frequency: f64, q: f64, sample_rate: f64) -> (f64, f64, f64, f64, f64, f64) {
    let omega = 2.0 * PI * frequency / sample_rate;
    let cos_omega = cos(omega);
    let alpha = sin(omega) / (2.0 * q);

    let b0 = (1.0 + cos_omega) / 2.0;
    let b1 = -(1.0 + cos_omega);
    let b2 = (1.0 + cos_omega) / 2.0;
    let a0 = 1.0 + alpha;
    let a1 = -2.0 * cos_omega;
    let a2 = 1.0 - alpha;

    (b0, b1, b2, a0, a1, a2)
}

/// A cascade of biquad sections processed in series.
#[derive(Debug, Clone, Default)]
pub struct BiquadCascade {
    sections: Vec<Biquad>,
}

impl BiquadCascade {
    /// Create a cascade from the given sections.
    pub fn new(sections: Vec<Biquad>) -> Self {
        Self { sections }
    }

    /// 8th order Butterworth band-pass: a 4th order high-pass at `low_hz`
    /// followed by a 4th order low-pass at `high_hz`.
    pub fn butterworth_bandpass(low_hz: f64, high_hz: f64, sample_rate: f64) -> Self {
        let mut sections = Vec::with_capacity(4);
        for q in BUTTERWORTH_Q4 {
            sections.push(Biquad::from_coefficients(highpass_coefficients(low_hz, q, sample_rate)));
        }
        for q in BUTTERWORTH_Q4 {
            sections.push(Biquad::from_coefficients(lowpass_coefficients(high_hz, q, sample_rate)));
        }
        Self { sections }
    }

    /// Number of second-order sections.
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// True if the cascade has no sections (passthrough).
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Process one sample through every section.
    #[inline]
    pub fn process(&mut self, input: f64) -> f64 {
        self.sections.iter_mut().fold(input, |sample, section| section.process(sample))
    }

    /// Clear the state of every section.
    pub fn clear(&mut self) {
        for section in &mut self.sections {
            section.clear();
        }
    }

    /// Causal filtering of a whole signal, starting from a cleared state.
    pub fn filter(&mut self, signal: &[f64]) -> Vec<f64> {
        self.clear();
        signal.iter().map(|&x| self.process(x)).collect()
    }

    /// Zero-phase forward-backward filtering.
    ///
    /// The signal is extended at both ends by odd reflection before filtering,
    /// which keeps edge transients out of the returned samples. The padding
    /// length is `3 * (2 * sections + 1)`, clipped to `len - 1`.
    pub fn filtfilt(&mut self, signal: &[f64]) -> Vec<f64> {
        let n = signal.len();
        if n == 0 {
            return Vec::new();
        }

        let pad = (3 * (2 * self.sections.len() + 1)).min(n - 1);
        let extended = odd_extend(signal, pad);

        let mut forward = self.filter(&extended);
        forward.reverse();
        let mut backward = self.filter(&forward);
        backward.reverse();

        backward[pad..pad + n].to_vec()
    }
}

/// Odd extension of a signal by `pad` samples on each side.
///
/// `2 * x[0] - x[pad..1]` before, `2 * x[n-1] - x[n-2..n-1-pad]` after.
pub fn odd_extend(signal: &[f64], pad: usize) -> Vec<f64> {
    let n = signal.len();
    if n == 0 || pad == 0 {
        return signal.to_vec();
    }
    let pad = pad.min(n - 1);
    let first = signal[0];
    let last = signal[n - 1];

    let mut out = Vec::with_capacity(n + 2 * pad);
    out.extend((1..=pad).rev().map(|i| 2.0 * first - signal[i]));
    out.extend_from_slice(signal);
    out.extend((1..=pad).map(|i| 2.0 * last - signal[n - 1 - i]));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(frequency: f64, sample_rate: f64, n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| (2.0 * PI * frequency * i as f64 / sample_rate).sin())
            .collect()
    }

    fn rms(x: &[f64]) -> f64 {
        (x.iter().map(|v| v * v).sum::<f64>() / x.len() as f64).sqrt()
    }

    #[test]
    fn test_biquad_passthrough() {
        let mut biquad = Biquad::new();
        for i in 0..10 {
            let input = i as f64 * 0.1;
            assert!((biquad.process(input) - input).abs() < 1e-12);
        }
    }

    #[test]
    fn test_biquad_clear() {
        let mut biquad = Biquad::new();
        for _ in 0..10 {
            biquad.process(1.0);
        }
        biquad.clear();

        assert_eq!(biquad.x1, 0.0);
        assert_eq!(biquad.x2, 0.0);
        assert_eq!(biquad.y1, 0.0);
        assert_eq!(biquad.y2, 0.0);
    }

    #[test]
    fn test_biquad_lowpass_dc_pass() {
        let mut biquad = Biquad::from_coefficients(lowpass_coefficients(30.0, 0.707, 1000.0));
        let mut output = 0.0;
        for _ in 0..2000 {
            output = biquad.process(1.0);
        }
        assert!((output - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_highpass_blocks_dc() {
        let mut biquad = Biquad::from_coefficients(highpass_coefficients(4.0, 0.707, 1000.0));
        let mut output = 1.0;
        for _ in 0..5000 {
            output = biquad.process(1.0);
        }
        assert!(output.abs() < 0.01, "DC should be removed, got {output}");
    }

    #[test]
    fn test_odd_extend() {
        let x = [1.0, 2.0, 4.0, 7.0];
        let ext = odd_extend(&x, 2);
        assert_eq!(ext, vec![-2.0, 0.0, 1.0, 2.0, 4.0, 7.0, 10.0, 12.0]);
    }

    #[test]
    fn test_odd_extend_clips_pad() {
        let x = [1.0, 3.0];
        assert_eq!(odd_extend(&x, 10).len(), 4);
        assert!(odd_extend(&[], 3).is_empty());
    }

    #[test]
    fn test_bandpass_passes_center() {
        let sr = 1000.0;
        let mut bank = BiquadCascade::butterworth_bandpass(8.0, 13.0, sr);
        let x = sine(10.0, sr, 4000);
        let y = bank.filtfilt(&x);
        let ratio = rms(&y[500..3500]) / rms(&x[500..3500]);
        assert!(ratio > 0.7, "passband ratio {ratio}");
    }

    #[test]
    fn test_bandpass_rejects_out_of_band() {
        let sr = 1000.0;
        let mut bank = BiquadCascade::butterworth_bandpass(8.0, 13.0, sr);
        let x = sine(60.0, sr, 4000);
        let y = bank.filtfilt(&x);
        let ratio = rms(&y[500..3500]) / rms(&x[500..3500]);
        assert!(ratio < 0.05, "stopband ratio {ratio}");
    }

    #[test]
    fn test_filtfilt_is_zero_phase() {
        // A zero-phase band-pass leaves an in-band sine aligned with the input:
        // the zero crossings of output and input coincide.
        let sr = 1000.0;
        let mut bank = BiquadCascade::butterworth_bandpass(5.0, 20.0, sr);
        let x = sine(10.0, sr, 3000);
        let y = bank.filtfilt(&x);

        let corr: f64 = x[500..2500].iter().zip(&y[500..2500]).map(|(a, b)| a * b).sum();
        let norm = (x[500..2500].iter().map(|a| a * a).sum::<f64>()
            * y[500..2500].iter().map(|b| b * b).sum::<f64>())
        .sqrt();
        assert!(corr / norm > 0.99, "correlation {}", corr / norm);
    }

    #[test]
    fn test_filtfilt_preserves_length() {
        let mut bank = BiquadCascade::butterworth_bandpass(4.0, 8.0, 250.0);
        assert_eq!(bank.filtfilt(&[0.5; 7]).len(), 7);
        assert!(bank.filtfilt(&[]).is_empty());
        assert_eq!(bank.len(), 4);
    }
}
