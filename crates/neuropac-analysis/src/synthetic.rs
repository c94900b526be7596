//! Synthetic phase-amplitude coupled signals for tests, benchmarks and demos.

use ndarray::Array2;
use rand::Rng;
use std::f64::consts::PI;

/// Generator of slow/fast oscillation mixtures where the fast amplitude
/// follows the slow phase.
///
/// Each trial gets a random slow-phase offset so that trials are not
/// phase-locked to each other.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyntheticPac {
    sample_rate: f64,
    n_samples: usize,
    phase_hz: f64,
    amplitude_hz: f64,
    coupling: f64,
    noise: f64,
    preferred_phase: f64,
}

impl SyntheticPac {
    /// 6 Hz phase, 50 Hz amplitude, coupling 0.8, noise 0.2.
    pub fn new(sample_rate: f64, n_samples: usize) -> Self {
        Self {
            sample_rate,
            n_samples,
            phase_hz: 6.0,
            amplitude_hz: 50.0,
            coupling: 0.8,
            noise: 0.2,
            preferred_phase: 0.0,
        }
    }

    /// Frequency of the slow (phase) oscillation.
    pub fn phase_hz(mut self, hz: f64) -> Self {
        self.phase_hz = hz;
        self
    }

    /// Frequency of the fast (amplitude) oscillation.
    pub fn amplitude_hz(mut self, hz: f64) -> Self {
        self.amplitude_hz = hz;
        self
    }

    /// Modulation depth in `[0, 1]`; 0 means no coupling.
    pub fn coupling(mut self, coupling: f64) -> Self {
        self.coupling = coupling.clamp(0.0, 1.0);
        self
    }

    /// Peak amplitude of additive uniform noise.
    pub fn noise(mut self, noise: f64) -> Self {
        self.noise = noise.max(0.0);
        self
    }

    /// Slow phase (radians) at which the fast amplitude peaks.
    pub fn preferred_phase(mut self, phase: f64) -> Self {
        self.preferred_phase = phase;
        self
    }

    /// Number of samples per trial.
    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    /// Sampling frequency.
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Generate `n_trials` trials as a `(samples, trials)` array.
    pub fn generate<R: Rng + ?Sized>(&self, n_trials: usize, rng: &mut R) -> Array2<f64> {
        let mut out = Array2::zeros((self.n_samples, n_trials));
        for mut column in out.columns_mut() {
            let offset = rng.random_range(0.0..2.0 * PI);
            for (i, sample) in column.iter_mut().enumerate() {
                let t = i as f64 / self.sample_rate;
                let slow_phase = 2.0 * PI * self.phase_hz * t + offset;
                let modulation = 1.0 + self.coupling * (slow_phase - self.preferred_phase).cos();
                let fast = 0.5 * modulation * (2.0 * PI * self.amplitude_hz * t).sin();
                let noise = if self.noise > 0.0 {
                    rng.random_range(-self.noise..=self.noise)
                } else {
                    0.0
                };
                *sample = slow_phase.sin() + fast + noise;
            }
        }
        out
    }
}
