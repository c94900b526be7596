//! Surrogate schemes for building coupling null distributions.
//!
//! A surrogate breaks the natural pairing between phase and amplitude while
//! keeping each series' own statistics. Randomness is drawn only from the
//! caller-supplied generator.

use ndarray::{Array2, ArrayView2, Axis, s};
use rand::Rng;

use crate::{Descriptor, RegistryError};

/// Procedure used to randomize the phase/amplitude pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurrogateMethod {
    /// No surrogates; only raw coupling can be computed.
    None,

    /// Pair the phase of each trial with the amplitude of another, randomly
    /// chosen trial (Tort et al., 2010).
    ShuffleTrials,

    /// Cut the amplitude at a random sample and swap the two blocks
    /// (Bahramisharif et al., 2013).
    SwapBlocks,

    /// Circularly shift the amplitude by a random lag kept at least a tenth
    /// of the window away from zero (Canolty et al., 2006).
    TimeLag,
}

impl SurrogateMethod {
    /// All surrogate schemes in identifier order.
    pub const ALL: [SurrogateMethod; 4] = [
        SurrogateMethod::None,
        SurrogateMethod::ShuffleTrials,
        SurrogateMethod::SwapBlocks,
        SurrogateMethod::TimeLag,
    ];

    /// Identifier digit used in model strings.
    pub const fn digit(self) -> u8 {
        match self {
            SurrogateMethod::None => 0,
            SurrogateMethod::ShuffleTrials => 1,
            SurrogateMethod::SwapBlocks => 2,
            SurrogateMethod::TimeLag => 3,
        }
    }

    /// Look up a scheme by identifier digit.
    pub fn from_digit(digit: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.digit() == digit)
    }

    /// Display names for the scheme.
    pub const fn descriptor(self) -> Descriptor {
        match self {
            SurrogateMethod::None => Descriptor {
                long_name: "No surrogates",
                short_name: "None",
            },
            SurrogateMethod::ShuffleTrials => Descriptor {
                long_name: "Swap phase/amplitude across trials (Tort, 2010)",
                short_name: "TrialSwap",
            },
            SurrogateMethod::SwapBlocks => Descriptor {
                long_name: "Swap amplitude time blocks (Bahramisharif, 2013)",
                short_name: "BlockSwap",
            },
            SurrogateMethod::TimeLag => Descriptor {
                long_name: "Time lag (Canolty, 2006)",
                short_name: "TimeLag",
            },
        }
    }

    /// Check that the scheme can run on `n_trials` trials of `n_samples` samples.
    pub fn check(self, n_samples: usize, n_trials: usize) -> Result<(), RegistryError> {
        match self {
            SurrogateMethod::None => Err(RegistryError::NoSurrogate),
            SurrogateMethod::ShuffleTrials if n_trials < 2 => {
                Err(RegistryError::NotEnoughTrials { found: n_trials, min: 2 })
            }
            SurrogateMethod::SwapBlocks | SurrogateMethod::TimeLag if n_samples < 2 => {
                Err(RegistryError::WindowTooShort { found: n_samples, min: 2 })
            }
            _ => Ok(()),
        }
    }

    /// Build the surrogate amplitude `(bands, samples)` paired with the phase of `trial`.
    ///
    /// `amplitude` is the full `(bands, samples, trials)` window. Callers must
    /// run [`SurrogateMethod::check`] first.
    pub(crate) fn shuffle<R: Rng + ?Sized>(
        self,
        amplitude: ndarray::ArrayView3<f64>,
        trial: usize,
        rng: &mut R,
    ) -> Array2<f64> {
        let n_samples = amplitude.len_of(Axis(1));
        let n_trials = amplitude.len_of(Axis(2));

        match self {
            SurrogateMethod::None => amplitude.slice(s![.., .., trial]).to_owned(),
            SurrogateMethod::ShuffleTrials => {
                let mut other = rng.random_range(0..n_trials - 1);
                if other >= trial {
                    other += 1;
                }
                amplitude.slice(s![.., .., other]).to_owned()
            }
            SurrogateMethod::SwapBlocks => {
                let cut = rng.random_range(1..n_samples);
                rotate(amplitude.slice(s![.., .., trial]), cut)
            }
            SurrogateMethod::TimeLag => {
                let margin = (n_samples / 10).max(1);
                let lag = if n_samples > 2 * margin {
                    rng.random_range(margin..=n_samples - margin)
                } else {
                    rng.random_range(1..n_samples)
                };
                rotate(amplitude.slice(s![.., .., trial]), lag)
            }
        }
    }
}

/// Rotate each row left by `shift` samples.
fn rotate(series: ArrayView2<f64>, shift: usize) -> Array2<f64> {
    let n = series.ncols();
    let shift = shift % n.max(1);
    let mut out = Array2::zeros(series.raw_dim());
    out.slice_mut(s![.., ..n - shift]).assign(&series.slice(s![.., shift..]));
    out.slice_mut(s![.., n - shift..]).assign(&series.slice(s![.., ..shift]));
    out
}
