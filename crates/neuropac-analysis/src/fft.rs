//! FFT wrapper used by the Hilbert transform

use rustfft::{FftPlanner, num_complex::Complex};
use std::sync::Arc;

/// FFT processor with cached forward and inverse plans
pub struct Fft {
    fft: Arc<dyn rustfft::Fft<f64>>,
    ifft: Arc<dyn rustfft::Fft<f64>>,
    size: usize,
}

impl Fft {
    /// Create a new FFT processor for the given size
    pub fn new(size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);
        let ifft = planner.plan_fft_inverse(size);

        Self { fft, ifft, size }
    }

    /// Get FFT size
    pub fn size(&self) -> usize {
        self.size
    }

    /// Perform forward FFT on complex input (in-place)
    pub fn forward_complex(&self, buffer: &mut [Complex<f64>]) {
        self.fft.process(buffer);
    }

    /// Perform normalized inverse FFT on complex buffer (in-place)
    pub fn inverse_complex(&self, buffer: &mut [Complex<f64>]) {
        self.ifft.process(buffer);

        let scale = 1.0 / self.size as f64;
        for c in buffer.iter_mut() {
            *c *= scale;
        }
    }
}

impl std::fmt::Debug for Fft {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fft").field("size", &self.size).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_complex_roundtrip() {
        let fft = Fft::new(250);
        let input: Vec<f64> = (0..250).map(|i| (2.0 * PI * 7.0 * i as f64 / 250.0).sin()).collect();

        let mut buffer: Vec<Complex<f64>> = input.iter().map(|&x| Complex::new(x, 0.0)).collect();
        fft.forward_complex(&mut buffer);
        fft.inverse_complex(&mut buffer);

        for (a, b) in input.iter().zip(&buffer) {
            assert!((a - b.re).abs() < 1e-9, "Mismatch: {} vs {}", a, b.re);
            assert!(b.im.abs() < 1e-9);
        }
    }

    #[test]
    fn test_dc_detection() {
        let fft = Fft::new(256);
        let mut buffer = vec![Complex::new(1.0, 0.0); 256];
        fft.forward_complex(&mut buffer);

        assert_eq!(fft.size(), 256);
        assert!((buffer[0].re - 256.0).abs() < 1e-9);
        let other_mag: f64 = buffer[1..].iter().map(|c| c.norm()).sum();
        assert!(other_mag < 1e-6);
    }
}
