//! Hilbert transform for computing analytic signals.
//!
//! The analytic signal carries the instantaneous phase and amplitude
//! (envelope) of a band-limited oscillation, the two quantities that
//! phase-amplitude coupling compares.
//!
//! # Algorithm
//!
//! The Hilbert transform is computed using the FFT method:
//! 1. Compute FFT of the real signal
//! 2. Zero out negative frequencies
//! 3. Double positive frequencies
//! 4. Keep DC (and Nyquist, for even lengths) unchanged
//! 5. Inverse FFT gives the analytic signal
//!
//! From the analytic signal:
//! - Instantaneous amplitude = |analytic|
//! - Instantaneous phase = arg(analytic)
//!
//! # Example
//!
//! ```rust
//! use neuropac_analysis::hilbert::HilbertTransform;
//! use std::f64::consts::PI;
//!
//! let hilbert = HilbertTransform::new(1000);
//!
//! let signal: Vec<f64> = (0..1000)
//!     .map(|i| (2.0 * PI * 10.0 * i as f64 / 1000.0).sin())
//!     .collect();
//!
//! let analytic = hilbert.analytic_signal(&signal);
//! let envelope: Vec<f64> = analytic.iter().map(|c| c.norm()).collect();
//! assert_eq!(envelope.len(), signal.len());
//! ```

use crate::fft::Fft;
use rustfft::num_complex::Complex;

/// Hilbert transform processor for computing analytic signals.
#[derive(Debug)]
pub struct HilbertTransform {
    fft: Fft,
}

impl HilbertTransform {
    /// Create a new Hilbert transform processor.
    ///
    /// # Arguments
    ///
    /// * `fft_size` - Size of the FFT. Input signals are zero-padded or
    ///   truncated to this size. Using the signal length avoids padding
    ///   artifacts; any length is supported.
    pub fn new(fft_size: usize) -> Self {
        Self { fft: Fft::new(fft_size) }
    }

    /// Compute the analytic signal `x(t) + i*H{x(t)}`.
    ///
    /// Returns a complex vector of the input length (up to the FFT size).
    pub fn analytic_signal(&self, signal: &[f64]) -> Vec<Complex<f64>> {
        let n = signal.len().min(self.fft.size());
        if n == 0 {
            return Vec::new();
        }

        let mut buffer: Vec<Complex<f64>> = signal[..n].iter().map(|&x| Complex::new(x, 0.0)).collect();
        buffer.resize(self.fft.size(), Complex::new(0.0, 0.0));

        self.fft.forward_complex(&mut buffer);

        // Bins 1..positive_end are doubled, bins from negative_start are zeroed.
        // For even sizes the Nyquist bin sits between them and is kept.
        let positive_end = self.fft.size().div_ceil(2);
        let negative_start = self.fft.size() / 2 + 1;

        for sample in buffer.iter_mut().take(positive_end).skip(1) {
            *sample *= 2.0;
        }
        for sample in buffer.iter_mut().skip(negative_start) {
            *sample = Complex::new(0.0, 0.0);
        }

        self.fft.inverse_complex(&mut buffer);

        buffer.truncate(n);
        buffer
    }
}
