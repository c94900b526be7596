//! Error types for coupling estimation.

use neuropac_registry::RegistryError;
use thiserror::Error;

/// Errors raised by the preprocessor, the window indexer and the engine.
#[derive(Debug, Error)]
pub enum CfcError {
    /// The sample axis does not have the expected length.
    #[error("expected {expected} samples on the time axis, found {found}")]
    Dimension {
        /// Configured sample count.
        expected: usize,
        /// Length of the input's time axis.
        found: usize,
    },

    /// Phase and amplitude sources have different shapes.
    #[error("phase source has shape {phase:?} but amplitude source has shape {amplitude:?}")]
    ShapeMismatch {
        /// Shape of the phase source.
        phase: Vec<usize>,
        /// Shape of the amplitude source.
        amplitude: Vec<usize>,
    },

    /// The input is neither 2-D nor 3-D.
    #[error("signal arrays must be 2-D or 3-D, found {found} dimensions")]
    Rank {
        /// Number of dimensions of the input.
        found: usize,
    },

    /// A window falls outside the sample axis or is empty.
    #[error("window {index} [{start}, {end}) is not a non-empty range within {n_samples} samples")]
    InvalidWindow {
        /// Position of the window in its set.
        index: usize,
        /// First sample.
        start: usize,
        /// One past the last sample.
        end: usize,
        /// Length of the sample axis.
        n_samples: usize,
    },

    /// Surrogate generation was configured with zero permutations.
    #[error("permutation count must be positive")]
    ZeroPermutations,

    /// A window set holds no windows.
    #[error("window set is empty")]
    NoWindows,

    /// A frequency band is empty or outside `(0, nyquist)`.
    #[error("band {low}-{high} Hz is invalid at sample rate {sample_rate} Hz")]
    InvalidBand {
        /// Lower cutoff.
        low: f64,
        /// Upper cutoff.
        high: f64,
        /// Sampling frequency.
        sample_rate: f64,
    },

    /// No bands were configured for phase or amplitude extraction.
    #[error("no {role} bands configured")]
    NoBands {
        /// `"phase"` or `"amplitude"`.
        role: &'static str,
    },

    /// Model lookup or coupling evaluation failed.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// A parallel surrogate task failed; the batch was aborted.
    #[error("surrogate task for window {window} failed: {source}")]
    WorkerTask {
        /// Window the task was computing.
        window: usize,
        /// Underlying failure.
        #[source]
        source: RegistryError,
    },

    /// The worker pool could not be created.
    #[error("failed to build worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    /// The number of surrogate tensors does not match the window count.
    #[error("expected surrogates for {expected} windows, found {found}")]
    SurrogateCount {
        /// Windows in the coupling tensor.
        expected: usize,
        /// Surrogate tensors supplied.
        found: usize,
    },

    /// A surrogate tensor's leading axes disagree with the coupling tensor.
    #[error("surrogates of window {window} have shape {found:?}, expected {expected:?}")]
    SurrogateShape {
        /// Window index.
        window: usize,
        /// Expected `(trials, amplitude bands, phase bands)`.
        expected: [usize; 3],
        /// Actual leading axes.
        found: [usize; 3],
    },

    /// A surrogate tensor has no permutations.
    #[error("surrogates of window {window} have no permutations")]
    NoPermutations {
        /// Window index.
        window: usize,
    },
}
