//! Input validation and phase/amplitude extraction.
//!
//! Raw signals are laid out `(row, sample, trial)`. A 2-D input
//! `(sample, trial)` is promoted by inserting a leading row axis of size 1.
//! Every row is passed through every configured band, so a filtered array
//! has `rows * bands` leading entries ordered row-major `(row, band)`.

use ndarray::{Array, Array3, ArrayD, ArrayView3, Axis, Dimension, Ix3, s};
use tracing::debug;

use crate::CfcError;
use crate::filterbank::{FilterBank, FrequencyBand};
use crate::hilbert::HilbertTransform;

/// Signals handed to the engine.
#[derive(Debug, Clone)]
pub enum SignalInput {
    /// One array used as both phase and amplitude source.
    Shared(ArrayD<f64>),
    /// Separate phase and amplitude sources of identical shape.
    Split {
        /// Phase source.
        phase: ArrayD<f64>,
        /// Amplitude source.
        amplitude: ArrayD<f64>,
    },
}

impl SignalInput {
    /// Use one array for both roles.
    pub fn shared<D: Dimension>(x: Array<f64, D>) -> Self {
        SignalInput::Shared(x.into_dyn())
    }

    /// Use separate phase and amplitude sources.
    pub fn split<D: Dimension, E: Dimension>(phase: Array<f64, D>, amplitude: Array<f64, E>) -> Self {
        SignalInput::Split {
            phase: phase.into_dyn(),
            amplitude: amplitude.into_dyn(),
        }
    }

    /// Promote to 3-D and check shapes against the expected sample count.
    ///
    /// Runs before any filtering.
    pub fn validate(self, n_samples: usize) -> Result<ValidatedInput, CfcError> {
        let validated = match self {
            SignalInput::Shared(x) => ValidatedInput::Shared(promote(x)?),
            SignalInput::Split { phase, amplitude } => {
                // Compared as given: promotion would make (n, t) and (1, n, t) look alike.
                if phase.shape() != amplitude.shape() {
                    return Err(CfcError::ShapeMismatch {
                        phase: phase.shape().to_vec(),
                        amplitude: amplitude.shape().to_vec(),
                    });
                }
                ValidatedInput::Split {
                    phase: promote(phase)?,
                    amplitude: promote(amplitude)?,
                }
            }
        };

        let found = validated.phase().len_of(Axis(1));
        if found != n_samples {
            return Err(CfcError::Dimension {
                expected: n_samples,
                found,
            });
        }
        Ok(validated)
    }
}

impl<D: Dimension> From<Array<f64, D>> for SignalInput {
    fn from(x: Array<f64, D>) -> Self {
        SignalInput::shared(x)
    }
}

/// Input promoted to `(row, sample, trial)` with a checked sample axis.
#[derive(Debug, Clone)]
pub enum ValidatedInput {
    /// Shared source.
    Shared(Array3<f64>),
    /// Separate sources.
    Split {
        /// Phase source.
        phase: Array3<f64>,
        /// Amplitude source.
        amplitude: Array3<f64>,
    },
}

impl ValidatedInput {
    /// The phase source.
    pub fn phase(&self) -> ArrayView3<'_, f64> {
        match self {
            ValidatedInput::Shared(x) => x.view(),
            ValidatedInput::Split { phase, .. } => phase.view(),
        }
    }

    /// The amplitude source.
    pub fn amplitude(&self) -> ArrayView3<'_, f64> {
        match self {
            ValidatedInput::Shared(x) => x.view(),
            ValidatedInput::Split { amplitude, .. } => amplitude.view(),
        }
    }

    /// Number of trials.
    pub fn n_trials(&self) -> usize {
        self.phase().len_of(Axis(2))
    }
}

fn promote(x: ArrayD<f64>) -> Result<Array3<f64>, CfcError> {
    let found = x.ndim();
    let x = match found {
        2 => x.insert_axis(Axis(0)),
        3 => x,
        _ => return Err(CfcError::Rank { found }),
    };
    x.into_dimensionality::<Ix3>().map_err(|_| CfcError::Rank { found })
}

/// What the amplitude extractor keeps from the analytic signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AmplitudeKind {
    /// Magnitude of the analytic signal.
    #[default]
    Envelope,
    /// Squared magnitude.
    Power,
}

/// Band-pass then Hilbert angle.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseExtractor {
    /// Bands to extract, in output order.
    pub bands: Vec<FrequencyBand>,
    /// Forward-backward filtering.
    pub zero_phase: bool,
}

impl PhaseExtractor {
    /// Zero-phase phase extractor for the given bands.
    pub fn new(bands: Vec<FrequencyBand>) -> Self {
        Self { bands, zero_phase: true }
    }

    /// Instantaneous phase of every `(row, band)` pair.
    pub fn apply(&self, x: ArrayView3<f64>, sample_rate: f64) -> Array3<f64> {
        transform(x, sample_rate, &self.bands, self.zero_phase, |c| c.arg())
    }
}

/// Band-pass then Hilbert magnitude (or power).
#[derive(Debug, Clone, PartialEq)]
pub struct AmplitudeExtractor {
    /// Bands to extract, in output order.
    pub bands: Vec<FrequencyBand>,
    /// Forward-backward filtering.
    pub zero_phase: bool,
    /// Envelope or power.
    pub kind: AmplitudeKind,
}

impl AmplitudeExtractor {
    /// Zero-phase envelope extractor for the given bands.
    pub fn new(bands: Vec<FrequencyBand>) -> Self {
        Self {
            bands,
            zero_phase: true,
            kind: AmplitudeKind::Envelope,
        }
    }

    /// Instantaneous amplitude of every `(row, band)` pair.
    pub fn apply(&self, x: ArrayView3<f64>, sample_rate: f64) -> Array3<f64> {
        match self.kind {
            AmplitudeKind::Envelope => transform(x, sample_rate, &self.bands, self.zero_phase, |c| c.norm()),
            AmplitudeKind::Power => transform(x, sample_rate, &self.bands, self.zero_phase, |c| c.norm_sqr()),
        }
    }
}

fn transform(
    x: ArrayView3<f64>,
    sample_rate: f64,
    bands: &[FrequencyBand],
    zero_phase: bool,
    map: impl Fn(&rustfft::num_complex::Complex<f64>) -> f64,
) -> Array3<f64> {
    let (n_rows, n_samples, n_trials) = x.dim();
    let n_bands = bands.len();
    let mut bank = FilterBank::new(sample_rate, bands);
    let hilbert = HilbertTransform::new(n_samples);
    let mut out = Array3::zeros((n_rows * n_bands, n_samples, n_trials));

    for row in 0..n_rows {
        for trial in 0..n_trials {
            let series = x.slice(s![row, .., trial]).to_vec();
            for (band, filtered) in bank.extract(&series, zero_phase).into_iter().enumerate() {
                let analytic = hilbert.analytic_signal(&filtered);
                let mut lane = out.slice_mut(s![row * n_bands + band, .., trial]);
                for (dst, c) in lane.iter_mut().zip(&analytic) {
                    *dst = map(c);
                }
            }
        }
    }
    out
}

/// Validates inputs and runs the phase and amplitude extractors.
#[derive(Debug, Clone, PartialEq)]
pub struct Preprocessor {
    sample_rate: f64,
    n_samples: usize,
    phase: PhaseExtractor,
    amplitude: AmplitudeExtractor,
}

impl Preprocessor {
    /// Create a preprocessor. Every band must lie in `(0, nyquist)`.
    pub fn new(
        sample_rate: f64,
        n_samples: usize,
        phase: PhaseExtractor,
        amplitude: AmplitudeExtractor,
    ) -> Result<Self, CfcError> {
        check_bands("phase", &phase.bands, sample_rate)?;
        check_bands("amplitude", &amplitude.bands, sample_rate)?;
        Ok(Self {
            sample_rate,
            n_samples,
            phase,
            amplitude,
        })
    }

    /// Sampling frequency in Hz.
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Expected length of the time axis.
    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    /// Phase bands.
    pub fn phase_bands(&self) -> &[FrequencyBand] {
        &self.phase.bands
    }

    /// Amplitude bands.
    pub fn amplitude_bands(&self) -> &[FrequencyBand] {
        &self.amplitude.bands
    }

    /// Validate `input`, then extract phase and amplitude.
    ///
    /// Returns `(phase, amplitude)`, each `(rows * bands, samples, trials)`.
    pub fn extract(&self, input: SignalInput) -> Result<(Array3<f64>, Array3<f64>), CfcError> {
        let input = input.validate(self.n_samples)?;
        Ok(self.extract_validated(&input))
    }

    /// Extract from already validated input.
    pub fn extract_validated(&self, input: &ValidatedInput) -> (Array3<f64>, Array3<f64>) {
        debug!(
            shape = ?input.phase().shape(),
            phase_bands = self.phase.bands.len(),
            amplitude_bands = self.amplitude.bands.len(),
            "extracting phase and amplitude"
        );
        let phase = self.phase.apply(input.phase(), self.sample_rate);
        let amplitude = self.amplitude.apply(input.amplitude(), self.sample_rate);
        (phase, amplitude)
    }
}

fn check_bands(role: &'static str, bands: &[FrequencyBand], sample_rate: f64) -> Result<(), CfcError> {
    if bands.is_empty() {
        return Err(CfcError::NoBands { role });
    }
    match bands.iter().find(|b| !b.fits(sample_rate)) {
        Some(b) => Err(CfcError::InvalidBand {
            low: b.low_hz,
            high: b.high_hz,
            sample_rate,
        }),
        None => Ok(()),
    }
}
