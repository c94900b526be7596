//! Windowed phase-amplitude coupling with surrogate statistics.
//!
//! [`Cfc`] runs the full pipeline: input validation, band-pass/Hilbert
//! extraction, one coupling evaluation per (window, trial) cell and,
//! optionally, a permutation null distribution built in parallel with one
//! task per window.
//!
//! # Example
//!
//! ```rust
//! use neuropac_analysis::cfc::Cfc;
//! use neuropac_analysis::preprocess::SignalInput;
//! use neuropac_analysis::synthetic::SyntheticPac;
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//!
//! let generator = SyntheticPac::new(500.0, 1000);
//! let trials = generator.generate(4, &mut StdRng::seed_from_u64(0));
//!
//! let cfc = Cfc::builder(500.0, 1000)
//!     .model("114".parse().unwrap())
//!     .n_perm(50)
//!     .seed(7)
//!     .build()
//!     .unwrap();
//!
//! let result = cfc.compute_with_surrogates(SignalInput::shared(trials)).unwrap();
//! assert_eq!(result.coupling.dim(), (1, 4, 1, 1));
//! let p = result.p_values().unwrap();
//! assert!(p.iter().all(|&v| v > 0.0 && v <= 1.0));
//! ```
//!
//! # Reproducibility
//!
//! Each window task owns a `StdRng` seeded with `seed + window_index`, so a
//! fixed seed gives identical surrogates for any [`Jobs`] setting. Without a
//! seed, a base seed is drawn from the OS once per call.

pub mod significance;

use ndarray::{Array3, Array4, ArrayView3, Axis, s};
use neuropac_core::Jobs;
use neuropac_registry::{CouplingModel, CouplingRegistry, DEFAULT_PHASE_BINS, ModelId, Normalization};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::CfcError;
use crate::filterbank::{FrequencyBand, eeg_bands};
use crate::preprocess::{AmplitudeExtractor, AmplitudeKind, PhaseExtractor, Preprocessor, SignalInput};
use crate::window::{WindowIndex, WindowSet, regroup};

pub use significance::{normalize, p_values};

/// Default number of permutations for surrogate testing.
pub const DEFAULT_PERMUTATIONS: usize = 200;

/// Output of [`Cfc::compute_with_surrogates`].
#[derive(Debug, Clone, PartialEq)]
pub struct SurrogateResult {
    /// Raw coupling `(windows, trials, amplitude bands, phase bands)`.
    pub coupling: Array4<f64>,
    /// Per window: `(trials, amplitude bands, phase bands, permutations)`.
    pub surrogates: Vec<Array4<f64>>,
    /// Per window mean over permutations, `(trials, amplitude bands, phase bands)`.
    pub mean: Vec<Array3<f64>>,
    /// Per window population deviation over permutations.
    pub std: Vec<Array3<f64>>,
}

impl SurrogateResult {
    /// Empirical p-values of the raw coupling.
    pub fn p_values(&self) -> Result<Array4<f64>, CfcError> {
        p_values(&self.coupling, &self.surrogates)
    }

    /// Coupling normalized against the surrogate summaries.
    pub fn normalized(&self, normalization: Normalization) -> Result<Array4<f64>, CfcError> {
        normalize(&self.coupling, &self.mean, &self.std, normalization)
    }

    /// Number of permutations per cell.
    pub fn n_perm(&self) -> usize {
        self.surrogates.first().map_or(0, |s| s.len_of(Axis(3)))
    }
}

/// Builder for [`Cfc`].
#[derive(Debug, Clone)]
pub struct CfcBuilder {
    sample_rate: f64,
    n_samples: usize,
    model: ModelId,
    n_bins: usize,
    windows: Option<WindowSet>,
    n_perm: usize,
    jobs: Jobs,
    seed: Option<u64>,
    phase_bands: Vec<FrequencyBand>,
    amplitude_bands: Vec<FrequencyBand>,
    amplitude_kind: AmplitudeKind,
    zero_phase: bool,
}

impl CfcBuilder {
    /// Coupling model.
    pub fn model(mut self, model: ModelId) -> Self {
        self.model = model;
        self
    }

    /// Phase bins for binned methods.
    pub fn n_bins(mut self, n_bins: usize) -> Self {
        self.n_bins = n_bins;
        self
    }

    /// Analysis windows. Defaults to the whole sample axis.
    pub fn windows(mut self, windows: WindowSet) -> Self {
        self.windows = Some(windows);
        self
    }

    /// Permutations per surrogate distribution.
    pub fn n_perm(mut self, n_perm: usize) -> Self {
        self.n_perm = n_perm;
        self
    }

    /// Worker count for surrogate computation.
    pub fn jobs(mut self, jobs: Jobs) -> Self {
        self.jobs = jobs;
        self
    }

    /// Base seed for surrogate randomness.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Optional base seed.
    pub fn maybe_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Bands whose phase is extracted.
    pub fn phase_bands(mut self, bands: Vec<FrequencyBand>) -> Self {
        self.phase_bands = bands;
        self
    }

    /// Bands whose amplitude is extracted.
    pub fn amplitude_bands(mut self, bands: Vec<FrequencyBand>) -> Self {
        self.amplitude_bands = bands;
        self
    }

    /// Envelope or power.
    pub fn amplitude_kind(mut self, kind: AmplitudeKind) -> Self {
        self.amplitude_kind = kind;
        self
    }

    /// Forward-backward (true) or causal (false) filtering.
    pub fn zero_phase(mut self, zero_phase: bool) -> Self {
        self.zero_phase = zero_phase;
        self
    }

    /// Validate the configuration and build the engine.
    pub fn build(self) -> Result<Cfc, CfcError> {
        if self.n_perm == 0 {
            return Err(CfcError::ZeroPermutations);
        }
        let model = CouplingRegistry::new().resolve(self.model, self.n_bins)?;

        let windows = self.windows.unwrap_or_else(|| WindowSet::full(self.n_samples));
        windows.validate(self.n_samples)?;

        let preprocessor = Preprocessor::new(
            self.sample_rate,
            self.n_samples,
            PhaseExtractor {
                bands: self.phase_bands,
                zero_phase: self.zero_phase,
            },
            AmplitudeExtractor {
                bands: self.amplitude_bands,
                zero_phase: self.zero_phase,
                kind: self.amplitude_kind,
            },
        )?;

        Ok(Cfc {
            preprocessor,
            model,
            windows,
            n_perm: self.n_perm,
            jobs: self.jobs,
            seed: self.seed,
        })
    }
}

/// Cross-frequency coupling engine.
#[derive(Debug, Clone)]
pub struct Cfc {
    preprocessor: Preprocessor,
    model: CouplingModel,
    windows: WindowSet,
    n_perm: usize,
    jobs: Jobs,
    seed: Option<u64>,
}

impl Cfc {
    /// Start configuring an engine for signals of `n_samples` at `sample_rate`.
    ///
    /// Defaults: model `"110"` (MVL, trial shuffle), 18 bins, theta phase,
    /// low-gamma amplitude envelope, zero-phase filtering, one window over
    /// the whole signal, 200 permutations, all cores.
    pub fn builder(sample_rate: f64, n_samples: usize) -> CfcBuilder {
        CfcBuilder {
            sample_rate,
            n_samples,
            model: ModelId::default(),
            n_bins: DEFAULT_PHASE_BINS,
            windows: None,
            n_perm: DEFAULT_PERMUTATIONS,
            jobs: Jobs::All,
            seed: None,
            phase_bands: vec![eeg_bands::THETA],
            amplitude_bands: vec![eeg_bands::LOW_GAMMA],
            amplitude_kind: AmplitudeKind::Envelope,
            zero_phase: true,
        }
    }

    /// The resolved coupling model.
    pub fn model(&self) -> &CouplingModel {
        &self.model
    }

    /// The analysis windows.
    pub fn windows(&self) -> &WindowSet {
        &self.windows
    }

    /// The preprocessor.
    pub fn preprocessor(&self) -> &Preprocessor {
        &self.preprocessor
    }

    /// Permutations per surrogate distribution.
    pub fn n_perm(&self) -> usize {
        self.n_perm
    }

    /// Worker count.
    pub fn jobs(&self) -> Jobs {
        self.jobs
    }

    /// Coupling tensor `(windows, trials, amplitude bands, phase bands)`.
    pub fn compute(&self, input: SignalInput) -> Result<Array4<f64>, CfcError> {
        let (phase, amplitude) = self.preprocessor.extract(input)?;
        info!(
            model = %self.model.id(),
            windows = self.windows.len(),
            trials = phase.len_of(Axis(2)),
            "computing coupling"
        );
        self.coupling_tensor(phase.view(), amplitude.view())
    }

    /// Coupling plus the surrogate population and its summaries.
    ///
    /// Surrogates are computed with one task per window on a dedicated pool
    /// of at most [`Cfc::jobs`] workers. The first failing task aborts the
    /// batch.
    pub fn compute_with_surrogates(&self, input: SignalInput) -> Result<SurrogateResult, CfcError> {
        let (phase, amplitude) = self.preprocessor.extract(input)?;
        info!(
            model = %self.model.id(),
            windows = self.windows.len(),
            trials = phase.len_of(Axis(2)),
            n_perm = self.n_perm,
            "computing coupling with surrogates"
        );
        let coupling = self.coupling_tensor(phase.view(), amplitude.view())?;
        let surrogates = self.surrogate_population(phase.view(), amplitude.view())?;

        let mean = surrogates
            .iter()
            .map(|sur| sur.map_axis(Axis(3), |lane| lane.mean().unwrap_or(0.0)))
            .collect();
        let std = surrogates.iter().map(|sur| sur.std_axis(Axis(3), 0.0)).collect();

        Ok(SurrogateResult {
            coupling,
            surrogates,
            mean,
            std,
        })
    }

    fn coupling_tensor(&self, phase: ArrayView3<f64>, amplitude: ArrayView3<f64>) -> Result<Array4<f64>, CfcError> {
        let n_trials = phase.len_of(Axis(2));
        let n_pha = phase.len_of(Axis(0));
        let n_amp = amplitude.len_of(Axis(0));
        let index = WindowIndex::enumerate(self.windows.len(), n_trials);

        let values = index
            .cells()
            .iter()
            .map(|cell| {
                let w = self.windows[cell.window];
                self.model.coupling(
                    phase.slice(s![.., w.start..w.end, cell.trial]),
                    amplitude.slice(s![.., w.start..w.end, cell.trial]),
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut out = Array4::zeros((self.windows.len(), n_trials, n_amp, n_pha));
        for (w, group) in regroup(values, &index.window_ids()).into_iter().enumerate() {
            for (t, value) in group.into_iter().enumerate() {
                out.slice_mut(s![w, t, .., ..]).assign(&value);
            }
        }
        Ok(out)
    }

    fn surrogate_population(
        &self,
        phase: ArrayView3<f64>,
        amplitude: ArrayView3<f64>,
    ) -> Result<Vec<Array4<f64>>, CfcError> {
        let base_seed = self.seed.unwrap_or_else(|| {
            let seed = rand::rng().random::<u64>();
            debug!(seed, "drew surrogate base seed");
            seed
        });

        let threads = self.jobs.threads_for(self.windows.len());
        let pool = rayon::ThreadPoolBuilder::new().num_threads(threads).build()?;
        debug!(threads, windows = self.windows.len(), "dispatching surrogate tasks");

        pool.install(|| {
            self.windows
                .as_slice()
                .par_iter()
                .enumerate()
                .map(|(window, w)| {
                    let mut rng = StdRng::seed_from_u64(base_seed.wrapping_add(window as u64));
                    let result = self.model.surrogates(
                        phase.slice(s![.., w.start..w.end, ..]),
                        amplitude.slice(s![.., w.start..w.end, ..]),
                        self.n_perm,
                        &mut rng,
                    );
                    debug!(window, ok = result.is_ok(), "surrogate task finished");
                    result.map_err(|source| CfcError::WorkerTask { window, source })
                })
                .collect()
        })
    }
}
