//! Neuropac Analysis - Windowed phase-amplitude coupling estimation
//!
//! This crate measures how the phase of a slow oscillation modulates the
//! amplitude of a fast one, across trials and analysis windows, and tests
//! the result against a permutation null distribution:
//!
//! - [`fft`] - FFT wrapper used by the Hilbert transform
//! - [`hilbert`] - Analytic signal, instantaneous phase and amplitude
//! - [`filterbank`] - Zero-phase Butterworth band extraction
//! - [`preprocess`] - Input validation and phase/amplitude extraction
//! - [`window`] - Analysis windows and the (window, trial) work list
//! - [`cfc`] - The coupling engine and significance testing
//! - [`synthetic`] - Synthetic coupled signals
//!
//! ## Data layout
//!
//! Signals are `(row, sample, trial)` arrays; a 2-D `(sample, trial)` input
//! gets a leading row axis of size 1. Coupling tensors are
//! `(window, trial, amplitude band, phase band)`.
//!
//! ## Example Workflow
//!
//! ```rust
//! use neuropac_analysis::{Cfc, SignalInput, WindowSet};
//! use neuropac_analysis::synthetic::SyntheticPac;
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//!
//! // 1. Two seconds of theta-gamma coupled data, 8 trials
//! let x = SyntheticPac::new(500.0, 1000).generate(8, &mut StdRng::seed_from_u64(1));
//!
//! // 2. Two one-second windows, KL modulation index with trial shuffling
//! let cfc = Cfc::builder(500.0, 1000)
//!     .model("214".parse().unwrap())
//!     .windows(WindowSet::sliding(1000, 500, 500).unwrap())
//!     .n_perm(100)
//!     .seed(42)
//!     .build()
//!     .unwrap();
//!
//! // 3. Coupling, surrogates and p-values
//! let result = cfc.compute_with_surrogates(SignalInput::shared(x)).unwrap();
//! let p = result.p_values().unwrap();
//! assert_eq!(p.dim(), (2, 8, 1, 1));
//! ```

pub mod cfc;
pub mod error;
pub mod fft;
pub mod filterbank;
pub mod hilbert;
pub mod preprocess;
pub mod synthetic;
pub mod window;

pub use cfc::{Cfc, CfcBuilder, DEFAULT_PERMUTATIONS, SurrogateResult, normalize, p_values};
pub use error::CfcError;
pub use filterbank::{FilterBank, FrequencyBand, eeg_bands};
pub use hilbert::HilbertTransform;
pub use neuropac_core::Jobs;
pub use preprocess::{AmplitudeExtractor, AmplitudeKind, PhaseExtractor, Preprocessor, SignalInput, ValidatedInput};
pub use window::{Cell, Window, WindowIndex, WindowSet, regroup};
