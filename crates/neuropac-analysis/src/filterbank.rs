//! Bandpass filter bank for frequency band extraction.
//!
//! Each band is an 8th order Butterworth band-pass (4th order high-pass
//! followed by 4th order low-pass). Extraction is zero-phase by default so
//! that the phase of the slow band is not shifted relative to the envelope
//! of the fast band.
//!
//! # Example
//!
//! ```rust
//! use neuropac_analysis::filterbank::{FilterBank, eeg_bands};
//!
//! let mut bank = FilterBank::new(1000.0, &[eeg_bands::THETA, eeg_bands::LOW_GAMMA]);
//!
//! let signal = vec![0.0; 1000];
//! let extracted = bank.extract(&signal, true);
//! assert_eq!(extracted.len(), 2);
//! ```

use std::fmt;

use neuropac_core::BiquadCascade;

/// A frequency band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyBand {
    /// Optional human-readable name
    pub name: Option<&'static str>,
    /// Lower cutoff frequency in Hz
    pub low_hz: f64,
    /// Upper cutoff frequency in Hz
    pub high_hz: f64,
}

impl FrequencyBand {
    /// Create a named frequency band.
    pub const fn named(name: &'static str, low_hz: f64, high_hz: f64) -> Self {
        Self { name: Some(name), low_hz, high_hz }
    }

    /// Create an unnamed band from its cutoffs.
    pub const fn new(low_hz: f64, high_hz: f64) -> Self {
        Self { name: None, low_hz, high_hz }
    }

    /// True if `0 < low < high < nyquist`.
    pub fn fits(&self, sample_rate: f64) -> bool {
        self.low_hz > 0.0 && self.low_hz < self.high_hz && self.high_hz < sample_rate / 2.0
    }
}

impl fmt::Display for FrequencyBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name {
            Some(name) => write!(f, "{name} ({}-{} Hz)", self.low_hz, self.high_hz),
            None => write!(f, "{}-{} Hz", self.low_hz, self.high_hz),
        }
    }
}

/// Default EEG frequency bands.
pub mod eeg_bands {
    use super::FrequencyBand;

    /// Theta band (4-8 Hz) - Drowsiness, light sleep, memory
    pub const THETA: FrequencyBand = FrequencyBand::named("theta", 4.0, 8.0);

    /// Low gamma band (30-80 Hz) - Cognitive processing, perception
    pub const LOW_GAMMA: FrequencyBand = FrequencyBand::named("low_gamma", 30.0, 80.0);
}

/// A bank of bandpass filters for extracting multiple frequency bands.
#[derive(Debug, Clone)]
pub struct FilterBank {
    filters: Vec<BiquadCascade>,
}

impl FilterBank {
    /// Create a new filter bank with the specified bands.
    ///
    /// Bands are not checked against the Nyquist frequency here; see
    /// [`FrequencyBand::fits`].
    pub fn new(sample_rate: f64, bands: &[FrequencyBand]) -> Self {
        let filters = bands
            .iter()
            .map(|band| BiquadCascade::butterworth_bandpass(band.low_hz, band.high_hz, sample_rate))
            .collect();

        Self { filters }
    }

    /// Extract all frequency bands from the input signal.
    ///
    /// With `zero_phase` the signal is filtered forward and backward;
    /// otherwise a single causal pass from a cleared state is used.
    /// Outputs are in band order.
    pub fn extract(&mut self, signal: &[f64], zero_phase: bool) -> Vec<Vec<f64>> {
        self.filters
            .iter_mut()
            .map(|cascade| {
                if zero_phase {
                    cascade.filtfilt(signal)
                } else {
                    cascade.filter(signal)
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    const ALPHA: FrequencyBand = FrequencyBand::named("alpha", 8.0, 13.0);
    const BETA: FrequencyBand = FrequencyBand::named("beta", 13.0, 30.0);

    fn sine_wave(frequency: f64, sample_rate: f64, duration_secs: f64) -> Vec<f64> {
        let num_samples = (sample_rate * duration_secs) as usize;
        (0..num_samples)
            .map(|i| (2.0 * PI * frequency * i as f64 / sample_rate).sin())
            .collect()
    }

    fn rms(x: &[f64]) -> f64 {
        (x.iter().map(|v| v * v).sum::<f64>() / x.len() as f64).sqrt()
    }

    #[test]
    fn test_frequency_band_properties() {
        let band = FrequencyBand::new(4.0, 8.0);
        assert!(band.fits(100.0));
        assert!(!band.fits(15.0));
        assert!(!FrequencyBand::new(8.0, 4.0).fits(100.0));
        assert_eq!(band.to_string(), "4-8 Hz");
        assert_eq!(eeg_bands::THETA.to_string(), "theta (4-8 Hz)");
    }

    #[test]
    fn test_filter_bank_creation() {
        let mut bank = FilterBank::new(1000.0, &[eeg_bands::THETA, ALPHA]);
        let extracted = bank.extract(&[0.0; 64], false);
        assert_eq!(extracted.len(), 2);
        assert!(extracted.iter().all(|band| band.len() == 64));
    }

    #[test]
    fn test_filter_bank_passband() {
        let sample_rate = 1000.0;
        let mut bank = FilterBank::new(sample_rate, &[ALPHA]);

        let signal = sine_wave(10.0, sample_rate, 2.0);
        let extracted = bank.extract(&signal, true);

        let ratio = rms(&extracted[0][500..1500]) / rms(&signal[500..1500]);
        assert!(ratio > 0.5, "Passband signal should pass through, ratio was {}", ratio);
    }

    #[test]
    fn test_filter_bank_stopband() {
        let sample_rate = 1000.0;
        let mut bank = FilterBank::new(sample_rate, &[ALPHA]);

        let signal = sine_wave(50.0, sample_rate, 2.0);
        for zero_phase in [true, false] {
            let extracted = bank.extract(&signal, zero_phase);
            let ratio = rms(&extracted[0][500..]) / rms(&signal[500..]);
            assert!(ratio < 0.2, "Stopband signal should be attenuated, ratio was {}", ratio);
        }
    }

    #[test]
    fn test_filter_bank_multiple_bands() {
        let sample_rate = 1000.0;
        let mut bank = FilterBank::new(sample_rate, &[eeg_bands::THETA, BETA]);

        let mixed: Vec<f64> = sine_wave(6.0, sample_rate, 2.0)
            .iter()
            .zip(sine_wave(20.0, sample_rate, 2.0))
            .map(|(t, b)| t + b)
            .collect();

        let extracted = bank.extract(&mixed, true);
        assert!(rms(&extracted[0][500..1500]) > 0.3);
        assert!(rms(&extracted[1][500..1500]) > 0.3);
    }

    #[test]
    fn test_zero_phase_has_no_lag() {
        let sample_rate = 1000.0;
        let mut bank = FilterBank::new(sample_rate, &[FrequencyBand::new(4.0, 16.0)]);
        let signal = sine_wave(8.0, sample_rate, 3.0);
        let filtered = bank.extract(&signal, true);

        // Correlation with the input at zero lag stays close to perfect.
        let mid = &filtered[0][1000..2000];
        let reference = &signal[1000..2000];
        let dot: f64 = mid.iter().zip(reference).map(|(a, b)| a * b).sum();
        let corr = dot / (rms(mid) * rms(reference) * mid.len() as f64);
        assert!(corr > 0.98, "correlation {}", corr);
    }

    #[test]
    fn test_eeg_bands_constants() {
        assert_eq!(eeg_bands::THETA.high_hz, 8.0);
        assert_eq!(eeg_bands::LOW_GAMMA.low_hz, 30.0);
    }
}
