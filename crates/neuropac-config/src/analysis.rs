//! Coupling analysis configuration.

use std::path::Path;

use neuropac_analysis::{AmplitudeKind, Cfc, FrequencyBand, WindowSet};
use neuropac_core::Jobs;
use neuropac_registry::{CouplingRegistry, DEFAULT_PHASE_BINS, ModelId, RegistryError};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, read_to_string, write_creating_dirs};
use crate::validation::{Problems, ValidationError, ValidationResult};

/// Settings for one coupling analysis.
///
/// # TOML Format
///
/// ```toml
/// sample_rate = 500.0
/// n_samples = 2000
/// model = "212"
/// n_bins = 18
/// n_perm = 200
/// n_jobs = -1
/// seed = 7
/// zero_phase = true
/// windows = [[0, 1000], [1000, 2000]]
///
/// [phase]
/// bands = [[4.0, 8.0]]
///
/// [amplitude]
/// bands = [[30.0, 80.0], [80.0, 150.0]]
/// kind = "envelope"
/// ```
///
/// `windows` and `[sliding]` (`width`, `step`) are mutually exclusive;
/// without either, one window spans the whole signal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisConfig {
    /// Sampling frequency in Hz.
    pub sample_rate: f64,

    /// Samples per trial.
    pub n_samples: usize,

    /// Three-digit model identifier (method, surrogate, normalization).
    #[serde(default = "default_model")]
    pub model: String,

    /// Phase bins for binned methods.
    #[serde(default = "default_bins")]
    pub n_bins: usize,

    /// Permutations per surrogate distribution.
    #[serde(default = "default_perm")]
    pub n_perm: usize,

    /// joblib-style worker count: positive counts, `-1` all cores.
    #[serde(default = "default_jobs")]
    pub n_jobs: i64,

    /// Base seed for surrogates. Drawn at random when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Forward-backward filtering.
    #[serde(default = "default_true")]
    pub zero_phase: bool,

    /// Explicit `[start, end)` windows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub windows: Option<Vec<[usize; 2]>>,

    /// Regular sliding windows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sliding: Option<SlidingWindows>,

    /// Phase extraction.
    #[serde(default)]
    pub phase: PhaseConfig,

    /// Amplitude extraction.
    #[serde(default)]
    pub amplitude: AmplitudeConfig,
}

/// Sliding window layout.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SlidingWindows {
    /// Window length in samples.
    pub width: usize,
    /// Hop between window starts in samples.
    pub step: usize,
}

/// `[phase]` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PhaseConfig {
    /// `[low, high]` cutoffs in Hz.
    #[serde(default = "default_phase_bands")]
    pub bands: Vec<[f64; 2]>,
}

impl Default for PhaseConfig {
    fn default() -> Self {
        Self {
            bands: default_phase_bands(),
        }
    }
}

/// `[amplitude]` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AmplitudeConfig {
    /// `[low, high]` cutoffs in Hz.
    #[serde(default = "default_amplitude_bands")]
    pub bands: Vec<[f64; 2]>,
    /// Envelope or power.
    #[serde(default)]
    pub kind: AmplitudeMeasure,
}

impl Default for AmplitudeConfig {
    fn default() -> Self {
        Self {
            bands: default_amplitude_bands(),
            kind: AmplitudeMeasure::default(),
        }
    }
}

/// Serialized form of [`AmplitudeKind`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AmplitudeMeasure {
    /// Hilbert magnitude.
    #[default]
    Envelope,
    /// Squared Hilbert magnitude.
    Power,
}

impl From<AmplitudeMeasure> for AmplitudeKind {
    fn from(measure: AmplitudeMeasure) -> Self {
        match measure {
            AmplitudeMeasure::Envelope => AmplitudeKind::Envelope,
            AmplitudeMeasure::Power => AmplitudeKind::Power,
        }
    }
}

fn default_model() -> String {
    ModelId::default().to_string()
}

fn default_bins() -> usize {
    DEFAULT_PHASE_BINS
}

fn default_perm() -> usize {
    neuropac_analysis::DEFAULT_PERMUTATIONS
}

fn default_jobs() -> i64 {
    -1
}

fn default_true() -> bool {
    true
}

fn default_phase_bands() -> Vec<[f64; 2]> {
    vec![[4.0, 8.0]]
}

fn default_amplitude_bands() -> Vec<[f64; 2]> {
    vec![[30.0, 80.0]]
}

impl AnalysisConfig {
    /// Defaults for signals of `n_samples` at `sample_rate`.
    pub fn new(sample_rate: f64, n_samples: usize) -> Self {
        Self {
            sample_rate,
            n_samples,
            model: default_model(),
            n_bins: default_bins(),
            n_perm: default_perm(),
            n_jobs: default_jobs(),
            seed: None,
            zero_phase: true,
            windows: None,
            sliding: None,
            phase: PhaseConfig::default(),
            amplitude: AmplitudeConfig::default(),
        }
    }

    /// Set the model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the surrogate seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Load a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml(&read_to_string(path.as_ref())?)
    }

    /// Load a configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the configuration to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        write_creating_dirs(path.as_ref(), &self.to_toml()?)
    }

    /// Convert the configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Parsed model identifier.
    pub fn model_id(&self) -> Result<ModelId, RegistryError> {
        ModelId::parse(&self.model)
    }

    /// Worker count.
    pub fn jobs(&self) -> Jobs {
        Jobs::from_n_jobs(self.n_jobs)
    }

    /// Phase bands as [`FrequencyBand`]s.
    pub fn phase_bands(&self) -> Vec<FrequencyBand> {
        to_bands(&self.phase.bands)
    }

    /// Amplitude bands as [`FrequencyBand`]s.
    pub fn amplitude_bands(&self) -> Vec<FrequencyBand> {
        to_bands(&self.amplitude.bands)
    }

    /// The configured windows, or one window over the whole signal.
    pub fn window_set(&self) -> Result<WindowSet, ConfigError> {
        let windows = match (&self.windows, self.sliding) {
            (Some(windows), _) => WindowSet::new(windows.iter().map(|&[start, end]| (start, end)))?,
            (None, Some(s)) => WindowSet::sliding(self.n_samples, s.width, s.step)?,
            (None, None) => WindowSet::full(self.n_samples),
        };
        Ok(windows)
    }

    /// Check every field, reporting all problems at once.
    pub fn validate(&self) -> ValidationResult<()> {
        let mut problems = Problems::default();

        problems.check(self.sample_rate.is_finite() && self.sample_rate > 0.0, || {
            ValidationError::out_of_range("sample_rate", self.sample_rate, f64::MIN_POSITIVE, f64::MAX)
        });
        problems.check(self.n_samples > 0, || {
            ValidationError::invalid("n_samples", "must be positive")
        });

        match self.model_id() {
            Ok(id) => {
                if let Err(e) = CouplingRegistry::new().resolve(id, self.n_bins) {
                    problems.push(ValidationError::invalid("n_bins", e.to_string()));
                }
            }
            Err(e) => problems.push(ValidationError::invalid("model", e.to_string())),
        }
        problems.check(self.n_perm > 0, || {
            ValidationError::invalid("n_perm", "must be positive")
        });

        check_bands(&mut problems, "phase.bands", &self.phase.bands, self.sample_rate);
        check_bands(&mut problems, "amplitude.bands", &self.amplitude.bands, self.sample_rate);

        if self.windows.is_some() && self.sliding.is_some() {
            problems.push(ValidationError::invalid(
                "windows",
                "set either 'windows' or 'sliding', not both",
            ));
        }
        if let Some(windows) = &self.windows {
            problems.check(!windows.is_empty(), || {
                ValidationError::invalid("windows", "list is empty")
            });
            for (i, &[start, end]) in windows.iter().enumerate() {
                problems.check(start < end && end <= self.n_samples, || {
                    ValidationError::invalid(
                        format!("windows[{i}]"),
                        format!("[{start}, {end}) is not inside [0, {})", self.n_samples),
                    )
                });
            }
        }
        if let Some(s) = self.sliding {
            problems.check(s.width > 0 && s.step > 0, || {
                ValidationError::invalid("sliding", "width and step must be positive")
            });
            problems.check(s.width <= self.n_samples, || {
                ValidationError::out_of_range("sliding.width", s.width as f64, 1.0, self.n_samples as f64)
            });
        }

        problems.finish()
    }

    /// Validate, then build a configured engine.
    pub fn build_engine(&self) -> Result<Cfc, ConfigError> {
        self.validate()?;
        let engine = Cfc::builder(self.sample_rate, self.n_samples)
            .model(self.model_id()?)
            .n_bins(self.n_bins)
            .n_perm(self.n_perm)
            .jobs(self.jobs())
            .maybe_seed(self.seed)
            .zero_phase(self.zero_phase)
            .windows(self.window_set()?)
            .phase_bands(self.phase_bands())
            .amplitude_bands(self.amplitude_bands())
            .amplitude_kind(self.amplitude.kind.into())
            .build()?;
        Ok(engine)
    }
}

fn to_bands(bands: &[[f64; 2]]) -> Vec<FrequencyBand> {
    bands.iter().map(|&[lo, hi]| FrequencyBand::new(lo, hi)).collect()
}

fn check_bands(problems: &mut Problems, param: &str, bands: &[[f64; 2]], sample_rate: f64) {
    problems.check(!bands.is_empty(), || ValidationError::invalid(param, "no bands"));
    for (i, &[lo, hi]) in bands.iter().enumerate() {
        problems.check(FrequencyBand::new(lo, hi).fits(sample_rate), || {
            ValidationError::invalid(
                format!("{param}[{i}]"),
                format!("{lo}-{hi} Hz must lie inside (0, {}) Hz", sample_rate / 2.0),
            )
        });
    }
}
