//! Coupling-model registry for phase-amplitude coupling analysis.
//!
//! This crate maps a model identifier to a concrete coupling-strength
//! estimator and surrogate scheme. Selection is a closed set of enums; an
//! identifier outside that set fails at lookup time.
//!
//! # Model identifiers
//!
//! A model string has three digits, `"msn"`:
//!
//! | Digit | Meaning | Values |
//! |-------|---------|--------|
//! | `m` | [`CouplingMethod`] | 1 MVL, 2 KLD, 3 HR, 4 ndPAC |
//! | `s` | [`SurrogateMethod`] | 0 none, 1 trial swap, 2 block swap, 3 time lag |
//! | `n` | [`Normalization`] | 0 none, 1 `-mean`, 2 `/mean`, 3 `-mean /mean`, 4 z-score |
//!
//! # Example
//!
//! ```rust
//! use neuropac_registry::{CouplingRegistry, ModelId};
//! use ndarray::Array2;
//!
//! let registry = CouplingRegistry::new();
//! let model = registry.resolve("211".parse::<ModelId>().unwrap(), 18).unwrap();
//!
//! let phase = Array2::<f64>::zeros((2, 500));
//! let amplitude = Array2::<f64>::ones((3, 500));
//! let coupling = model.coupling(phase.view(), amplitude.view()).unwrap();
//! assert_eq!(coupling.dim(), (3, 2));
//! ```

use std::fmt;
use std::str::FromStr;

use ndarray::{Array2, Array4, ArrayView2, ArrayView3, Axis, s};
use rand::Rng;
use thiserror::Error;

pub mod method;
pub mod surrogate;

pub use method::{CouplingMethod, DEFAULT_PHASE_BINS};
pub use surrogate::SurrogateMethod;

/// Errors raised while resolving or running a coupling model.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The identifier does not name a known model.
    #[error("unknown coupling model '{0}'")]
    UnknownModel(String),

    /// Binned methods need at least two phase bins.
    #[error("invalid number of phase bins {bins} (need at least 2)")]
    InvalidBins {
        /// Requested bin count.
        bins: usize,
    },

    /// Surrogates were requested for a model without a surrogate scheme.
    #[error("model has no surrogate scheme")]
    NoSurrogate,

    /// The surrogate scheme needs more trials.
    #[error("surrogate scheme needs at least {min} trials, found {found}")]
    NotEnoughTrials {
        /// Trials available.
        found: usize,
        /// Trials required.
        min: usize,
    },

    /// The window is too short for the surrogate scheme.
    #[error("surrogate scheme needs at least {min} samples per window, found {found}")]
    WindowTooShort {
        /// Samples available.
        found: usize,
        /// Samples required.
        min: usize,
    },

    /// Phase and amplitude series have different lengths.
    #[error("phase has {phase} samples but amplitude has {amplitude}")]
    LengthMismatch {
        /// Phase series length.
        phase: usize,
        /// Amplitude series length.
        amplitude: usize,
    },

    /// Zero permutations were requested.
    #[error("number of permutations must be positive")]
    ZeroPermutations,
}

/// Display names attached alongside a strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Descriptor {
    /// Full name, including the reference.
    pub long_name: &'static str,
    /// Abbreviation.
    pub short_name: &'static str,
}

/// How raw coupling is normalized by the surrogate distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Normalization {
    /// Raw coupling.
    None,
    /// `value - mean`
    SubtractMean,
    /// `value / mean`
    DivideMean,
    /// `(value - mean) / mean`
    SubtractDivideMean,
    /// `(value - mean) / std`
    ZScore,
}

impl Normalization {
    /// All normalizations in identifier order.
    pub const ALL: [Normalization; 5] = [
        Normalization::None,
        Normalization::SubtractMean,
        Normalization::DivideMean,
        Normalization::SubtractDivideMean,
        Normalization::ZScore,
    ];

    /// Identifier digit used in model strings.
    pub const fn digit(self) -> u8 {
        match self {
            Normalization::None => 0,
            Normalization::SubtractMean => 1,
            Normalization::DivideMean => 2,
            Normalization::SubtractDivideMean => 3,
            Normalization::ZScore => 4,
        }
    }

    /// Look up a normalization by identifier digit.
    pub fn from_digit(digit: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.digit() == digit)
    }

    /// Display names for the normalization.
    pub const fn descriptor(self) -> Descriptor {
        match self {
            Normalization::None => Descriptor { long_name: "No normalization", short_name: "None" },
            Normalization::SubtractMean => Descriptor {
                long_name: "Subtract the mean of surrogates",
                short_name: "-mean",
            },
            Normalization::DivideMean => Descriptor {
                long_name: "Divide by the mean of surrogates",
                short_name: "/mean",
            },
            Normalization::SubtractDivideMean => Descriptor {
                long_name: "Subtract then divide by the mean of surrogates",
                short_name: "-mean/mean",
            },
            Normalization::ZScore => Descriptor {
                long_name: "Z-score against surrogates",
                short_name: "zscore",
            },
        }
    }

    /// Normalize one value against its surrogate mean and deviation.
    ///
    /// A zero divisor leaves the numerator undivided.
    pub fn apply(self, value: f64, mean: f64, std: f64) -> f64 {
        let divide = |num: f64, den: f64| if den != 0.0 { num / den } else { num };
        match self {
            Normalization::None => value,
            Normalization::SubtractMean => value - mean,
            Normalization::DivideMean => divide(value, mean),
            Normalization::SubtractDivideMean => divide(value - mean, mean),
            Normalization::ZScore => divide(value - mean, std),
        }
    }
}

/// A parsed model identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModelId {
    /// Coupling-strength formula.
    pub method: CouplingMethod,
    /// Surrogate scheme.
    pub surrogate: SurrogateMethod,
    /// Normalization suggested for this model.
    pub normalization: Normalization,
}

impl ModelId {
    /// Build an identifier from its parts.
    pub const fn new(method: CouplingMethod, surrogate: SurrogateMethod, normalization: Normalization) -> Self {
        Self { method, surrogate, normalization }
    }

    /// Parse a three-digit identifier such as `"112"`.
    pub fn parse(id: &str) -> Result<Self, RegistryError> {
        let unknown = || RegistryError::UnknownModel(id.to_string());
        let digits: Vec<u8> = id
            .trim()
            .chars()
            .map(|c| c.to_digit(10).map(|d| d as u8))
            .collect::<Option<_>>()
            .ok_or_else(unknown)?;

        let [m, s, n] = digits[..] else {
            return Err(unknown());
        };

        Ok(Self {
            method: CouplingMethod::from_digit(m).ok_or_else(unknown)?,
            surrogate: SurrogateMethod::from_digit(s).ok_or_else(unknown)?,
            normalization: Normalization::from_digit(n).ok_or_else(unknown)?,
        })
    }
}

impl Default for ModelId {
    fn default() -> Self {
        Self::new(CouplingMethod::MeanVectorLength, SurrogateMethod::ShuffleTrials, Normalization::None)
    }
}

impl FromStr for ModelId {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.method.digit(), self.surrogate.digit(), self.normalization.digit())
    }
}

/// A resolved coupling model: estimator, surrogate scheme and bin count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CouplingModel {
    id: ModelId,
    n_bins: usize,
}

impl CouplingModel {
    /// The identifier this model was resolved from.
    pub fn id(&self) -> ModelId {
        self.id
    }

    /// Number of phase bins for binned estimators.
    pub fn n_bins(&self) -> usize {
        self.n_bins
    }

    /// Human-readable description, e.g. `"MVL / TrialSwap / None"`.
    pub fn short_description(&self) -> String {
        format!(
            "{} / {} / {}",
            self.id.method.descriptor().short_name,
            self.id.surrogate.descriptor().short_name,
            self.id.normalization.descriptor().short_name
        )
    }

    /// Coupling between every amplitude band and every phase band.
    ///
    /// `phase` is `(n_pha_bands, n_samples)`, `amplitude` is
    /// `(n_amp_bands, n_samples)`; the result is `(n_amp_bands, n_pha_bands)`.
    pub fn coupling(&self, phase: ArrayView2<f64>, amplitude: ArrayView2<f64>) -> Result<Array2<f64>, RegistryError> {
        if phase.ncols() != amplitude.ncols() {
            return Err(RegistryError::LengthMismatch {
                phase: phase.ncols(),
                amplitude: amplitude.ncols(),
            });
        }

        let mut out = Array2::zeros((amplitude.nrows(), phase.nrows()));
        for (a, amp_row) in amplitude.outer_iter().enumerate() {
            for (p, pha_row) in phase.outer_iter().enumerate() {
                out[[a, p]] = self.id.method.estimate(pha_row, amp_row, self.n_bins);
            }
        }
        Ok(out)
    }

    /// Coupling on `n_perm` randomized phase/amplitude pairings.
    ///
    /// `phase` is `(n_pha_bands, n_samples, n_trials)` and `amplitude` is
    /// `(n_amp_bands, n_samples, n_trials)`. The result is
    /// `(n_trials, n_amp_bands, n_pha_bands, n_perm)`. All randomness comes
    /// from `rng`, drawn permutation-major then trial-minor.
    pub fn surrogates<R: Rng + ?Sized>(
        &self,
        phase: ArrayView3<f64>,
        amplitude: ArrayView3<f64>,
        n_perm: usize,
        rng: &mut R,
    ) -> Result<Array4<f64>, RegistryError> {
        if n_perm == 0 {
            return Err(RegistryError::ZeroPermutations);
        }
        let n_samples = phase.len_of(Axis(1));
        if amplitude.len_of(Axis(1)) != n_samples {
            return Err(RegistryError::LengthMismatch {
                phase: n_samples,
                amplitude: amplitude.len_of(Axis(1)),
            });
        }
        let n_trials = phase.len_of(Axis(2));
        self.id.surrogate.check(n_samples, n_trials)?;

        let n_pha = phase.len_of(Axis(0));
        let n_amp = amplitude.len_of(Axis(0));
        let mut out = Array4::zeros((n_trials, n_amp, n_pha, n_perm));

        for perm in 0..n_perm {
            for trial in 0..n_trials {
                let shuffled = self.id.surrogate.shuffle(amplitude, trial, rng);
                let value = self.coupling(phase.slice(s![.., .., trial]), shuffled.view())?;
                out.slice_mut(s![trial, .., .., perm]).assign(&value);
            }
        }
        Ok(out)
    }
}

/// Describes one registry entry for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryDescriptor {
    /// Identifier digit.
    pub digit: u8,
    /// Display names.
    pub names: Descriptor,
}

/// Registry of the available coupling models.
///
/// The registry resolves [`ModelId`]s into runnable [`CouplingModel`]s and
/// lists its entries for user interfaces.
#[derive(Debug, Clone, Copy, Default)]
pub struct CouplingRegistry;

impl CouplingRegistry {
    /// Create the registry.
    pub fn new() -> Self {
        Self
    }

    /// Resolve an identifier and bin count into a model.
    pub fn resolve(&self, id: ModelId, n_bins: usize) -> Result<CouplingModel, RegistryError> {
        if id.method.uses_bins() && n_bins < 2 {
            return Err(RegistryError::InvalidBins { bins: n_bins });
        }
        Ok(CouplingModel { id, n_bins })
    }

    /// Parse and resolve a model string in one step.
    pub fn resolve_str(&self, id: &str, n_bins: usize) -> Result<CouplingModel, RegistryError> {
        self.resolve(ModelId::parse(id)?, n_bins)
    }

    /// All coupling methods.
    pub fn all_methods(&self) -> Vec<EntryDescriptor> {
        CouplingMethod::ALL
            .iter()
            .map(|m| EntryDescriptor { digit: m.digit(), names: m.descriptor() })
            .collect()
    }

    /// All surrogate schemes.
    pub fn all_surrogates(&self) -> Vec<EntryDescriptor> {
        SurrogateMethod::ALL
            .iter()
            .map(|m| EntryDescriptor { digit: m.digit(), names: m.descriptor() })
            .collect()
    }

    /// All normalizations.
    pub fn all_normalizations(&self) -> Vec<EntryDescriptor> {
        Normalization::ALL
            .iter()
            .map(|m| EntryDescriptor { digit: m.digit(), names: m.descriptor() })
            .collect()
    }
}
