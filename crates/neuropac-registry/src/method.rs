//! Coupling-strength estimators.
//!
//! Every estimator takes one phase series and one amplitude series of the
//! same length and returns a non-negative scalar, larger meaning stronger
//! coupling.

use ndarray::ArrayView1;
use neuropac_core::{phase_bin, zscore};

use crate::Descriptor;

/// Default number of phase bins for binned estimators (18 bins = 20 degrees each).
pub const DEFAULT_PHASE_BINS: usize = 18;

/// Formula used to measure phase-amplitude coupling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CouplingMethod {
    /// Mean Vector Length (Canolty et al., 2006).
    ///
    /// Magnitude of the mean of `a(t) * exp(i * phi(t))`, with the amplitude
    /// normalized by its mean.
    MeanVectorLength,

    /// Kullback-Leibler modulation index (Tort et al., 2010).
    ///
    /// Divergence of the phase-binned amplitude distribution from uniform,
    /// scaled by `ln(n_bins)`.
    KullbackLeibler,

    /// Height ratio (Lakatos et al., 2005).
    ///
    /// `(max - min) / max` of the phase-binned mean amplitude.
    HeightRatio,

    /// Normalized direct PAC (Ozkurt & Schnitzler, 2011).
    ///
    /// Amplitude is z-scored, then `|sum(z * exp(i * phi))|^2 / n`.
    NormalizedDirect,
}

impl CouplingMethod {
    /// All methods in identifier order.
    pub const ALL: [CouplingMethod; 4] = [
        CouplingMethod::MeanVectorLength,
        CouplingMethod::KullbackLeibler,
        CouplingMethod::HeightRatio,
        CouplingMethod::NormalizedDirect,
    ];

    /// Identifier digit used in model strings.
    pub const fn digit(self) -> u8 {
        match self {
            CouplingMethod::MeanVectorLength => 1,
            CouplingMethod::KullbackLeibler => 2,
            CouplingMethod::HeightRatio => 3,
            CouplingMethod::NormalizedDirect => 4,
        }
    }

    /// Look up a method by identifier digit.
    pub fn from_digit(digit: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.digit() == digit)
    }

    /// True if the method discretizes phase into bins.
    pub const fn uses_bins(self) -> bool {
        matches!(self, CouplingMethod::KullbackLeibler | CouplingMethod::HeightRatio)
    }

    /// Display names for the method.
    pub const fn descriptor(self) -> Descriptor {
        match self {
            CouplingMethod::MeanVectorLength => Descriptor {
                long_name: "Mean Vector Length (Canolty, 2006)",
                short_name: "MVL",
            },
            CouplingMethod::KullbackLeibler => Descriptor {
                long_name: "Kullback-Leibler Distance (Tort, 2010)",
                short_name: "KLD",
            },
            CouplingMethod::HeightRatio => Descriptor {
                long_name: "Height Ratio (Lakatos, 2005)",
                short_name: "HR",
            },
            CouplingMethod::NormalizedDirect => Descriptor {
                long_name: "Normalized Direct PAC (Ozkurt, 2011)",
                short_name: "ndPAC",
            },
        }
    }

    /// Estimate coupling between one phase series and one amplitude series.
    ///
    /// Both views must have the same length. An empty series, or a binned
    /// method with fewer than two bins, yields 0.0.
    pub fn estimate(self, phase: ArrayView1<f64>, amplitude: ArrayView1<f64>, n_bins: usize) -> f64 {
        let n = phase.len().min(amplitude.len());
        if n == 0 || (self.uses_bins() && n_bins < 2) {
            return 0.0;
        }

        match self {
            CouplingMethod::MeanVectorLength => mean_vector_length(phase, amplitude, n),
            CouplingMethod::KullbackLeibler => {
                let binned = binned_amplitude(phase, amplitude, n, n_bins);
                kullback_leibler(&binned)
            }
            CouplingMethod::HeightRatio => {
                let binned = binned_amplitude(phase, amplitude, n, n_bins);
                height_ratio(&binned)
            }
            CouplingMethod::NormalizedDirect => normalized_direct(phase, amplitude, n),
        }
    }
}

fn mean_vector_length(phase: ArrayView1<f64>, amplitude: ArrayView1<f64>, n: usize) -> f64 {
    let amp_mean = amplitude.iter().take(n).sum::<f64>() / n as f64;
    if amp_mean <= 0.0 {
        return 0.0;
    }

    let (mut re, mut im) = (0.0, 0.0);
    for (&phi, &a) in phase.iter().zip(amplitude.iter()).take(n) {
        let a = a / amp_mean;
        re += a * phi.cos();
        im += a * phi.sin();
    }

    (re * re + im * im).sqrt() / n as f64
}

fn normalized_direct(phase: ArrayView1<f64>, amplitude: ArrayView1<f64>, n: usize) -> f64 {
    let mut z: Vec<f64> = amplitude.iter().take(n).copied().collect();
    zscore(&mut z);

    let (mut re, mut im) = (0.0, 0.0);
    for (&phi, &a) in phase.iter().zip(&z) {
        re += a * phi.cos();
        im += a * phi.sin();
    }

    (re * re + im * im) / n as f64
}

/// Mean amplitude in each phase bin. Empty bins hold 0.0; zero bins give
/// an empty vector.
pub fn binned_amplitude(
    phase: ArrayView1<f64>,
    amplitude: ArrayView1<f64>,
    n: usize,
    n_bins: usize,
) -> Vec<f64> {
    if n_bins == 0 {
        return Vec::new();
    }
    let mut sums = vec![0.0; n_bins];
    let mut counts = vec![0usize; n_bins];

    for (&phi, &a) in phase.iter().zip(amplitude.iter()).take(n) {
        let bin = phase_bin(phi, n_bins);
        sums[bin] += a;
        counts[bin] += 1;
    }

    sums.iter()
        .zip(&counts)
        .map(|(&s, &c)| if c > 0 { s / c as f64 } else { 0.0 })
        .collect()
}

fn kullback_leibler(binned: &[f64]) -> f64 {
    let n_bins = binned.len();
    let total: f64 = binned.iter().sum();
    if total <= 0.0 || n_bins < 2 {
        return 0.0;
    }

    let entropy: f64 = binned
        .iter()
        .map(|&m| m / total)
        .filter(|&p| p > 0.0)
        .map(|p| -p * p.ln())
        .sum();

    let max_entropy = (n_bins as f64).ln();
    ((max_entropy - entropy) / max_entropy).max(0.0)
}

fn height_ratio(binned: &[f64]) -> f64 {
    let max = binned.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = binned.iter().copied().fold(f64::INFINITY, f64::min);
    if max <= 0.0 {
        return 0.0;
    }
    (max - min) / max
}
