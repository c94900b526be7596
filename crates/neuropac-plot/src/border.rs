//! Mean curves with a dispersion envelope, one per class.

use ndarray::{ArrayView2, Axis};
use neuropac_core::{mean, sem, std_dev};

use crate::PlotError;

/// Width of the envelope drawn around each mean curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Deviation {
    /// Population standard deviation.
    Std,
    /// Standard error of the mean, `std / sqrt(n_obs - 1)`.
    #[default]
    Sem,
}

/// Mean curve and envelope of one class.
#[derive(Debug, Clone, PartialEq)]
pub struct BorderBand {
    /// Class label, or 0 when no labels were given.
    pub class: usize,
    /// Observations in the class.
    pub n_obs: usize,
    /// Mean over observations at each time point.
    pub mean: Vec<f64>,
    /// `mean - deviation`.
    pub lower: Vec<f64>,
    /// `mean + deviation`.
    pub upper: Vec<f64>,
}

/// Put the time axis first.
///
/// `x` is returned as-is when it has `n_time` rows, transposed when it has
/// `n_time` columns instead.
pub fn orient(x: ArrayView2<'_, f64>, n_time: usize) -> Result<ArrayView2<'_, f64>, PlotError> {
    let (rows, cols) = x.dim();
    if rows == n_time {
        Ok(x)
    } else if cols == n_time {
        Ok(x.reversed_axes())
    } else {
        Err(PlotError::TimeAxis {
            expected: n_time,
            rows,
            cols,
        })
    }
}

/// Per-class mean and envelope of `x` (time points x observations).
///
/// Classes are the sorted distinct `labels`; without labels every
/// observation belongs to class 0.
pub fn border_bands(
    x: ArrayView2<f64>,
    labels: Option<&[usize]>,
    deviation: Deviation,
) -> Result<Vec<BorderBand>, PlotError> {
    let (n_time, n_obs) = x.dim();
    if n_time == 0 || n_obs == 0 {
        return Err(PlotError::EmptyInput);
    }

    let default_labels;
    let labels = match labels {
        Some(l) if l.len() != n_obs => {
            return Err(PlotError::LabelLength {
                labels: l.len(),
                observations: n_obs,
            });
        }
        Some(l) => l,
        None => {
            default_labels = vec![0; n_obs];
            &default_labels
        }
    };

    let mut classes = labels.to_vec();
    classes.sort_unstable();
    classes.dedup();

    let bands = classes
        .into_iter()
        .map(|class| {
            let members: Vec<usize> = (0..n_obs).filter(|&i| labels[i] == class).collect();
            let subset = x.select(Axis(1), &members);

            let mut band = BorderBand {
                class,
                n_obs: members.len(),
                mean: Vec::with_capacity(n_time),
                lower: Vec::with_capacity(n_time),
                upper: Vec::with_capacity(n_time),
            };
            for row in subset.rows() {
                let values = row.to_vec();
                let m = mean(&values);
                let d = match deviation {
                    Deviation::Std => std_dev(&values),
                    Deviation::Sem => sem(&values),
                };
                band.mean.push(m);
                band.lower.push(m - d);
                band.upper.push(m + d);
            }
            band
        })
        .collect();
    Ok(bands)
}
