//! Empirical p-values and surrogate normalization.

use ndarray::{Array3, Array4, Axis, Zip};
use neuropac_registry::Normalization;

use crate::CfcError;

/// One-sided empirical p-values of `coupling` against per-window surrogates.
///
/// For each cell `(w, t, a, p)` the p-value is the fraction of
/// `surrogates[w][t, a, p, ..]` that is greater than or equal to the observed
/// value. A fraction of zero is reported as `1 / n_perm`, so every p-value
/// lies in `(0, 1]`.
pub fn p_values(coupling: &Array4<f64>, surrogates: &[Array4<f64>]) -> Result<Array4<f64>, CfcError> {
    check_windows(coupling, surrogates.len())?;

    let mut out = Array4::zeros(coupling.raw_dim());
    for (window, (sur, mut out_w)) in surrogates.iter().zip(out.outer_iter_mut()).enumerate() {
        let (n_trials, n_amp, n_pha, n_perm) = sur.dim();
        check_leading(coupling, window, [n_trials, n_amp, n_pha])?;
        if n_perm == 0 {
            return Err(CfcError::NoPermutations { window });
        }

        let floor = 1.0 / n_perm as f64;
        let observed = coupling.index_axis(Axis(0), window);
        Zip::from(&mut out_w)
            .and(&observed)
            .and(sur.lanes(Axis(3)))
            .for_each(|p, &value, perm| {
                let exceed = perm.iter().filter(|&&s| s >= value).count();
                *p = if exceed == 0 { floor } else { exceed as f64 / n_perm as f64 };
            });
    }
    Ok(out)
}

/// Normalize raw coupling against per-window surrogate mean and deviation.
pub fn normalize(
    coupling: &Array4<f64>,
    mean: &[Array3<f64>],
    std: &[Array3<f64>],
    normalization: Normalization,
) -> Result<Array4<f64>, CfcError> {
    check_windows(coupling, mean.len())?;
    check_windows(coupling, std.len())?;

    let mut out = coupling.clone();
    for (window, ((m, sd), mut out_w)) in mean.iter().zip(std).zip(out.outer_iter_mut()).enumerate() {
        let (t, a, p) = m.dim();
        check_leading(coupling, window, [t, a, p])?;
        let (t, a, p) = sd.dim();
        check_leading(coupling, window, [t, a, p])?;

        Zip::from(&mut out_w).and(m).and(sd).for_each(|value, &mu, &sigma| {
            *value = normalization.apply(*value, mu, sigma);
        });
    }
    Ok(out)
}

fn check_windows(coupling: &Array4<f64>, found: usize) -> Result<(), CfcError> {
    let expected = coupling.len_of(Axis(0));
    if found != expected {
        return Err(CfcError::SurrogateCount { expected, found });
    }
    Ok(())
}

fn check_leading(coupling: &Array4<f64>, window: usize, found: [usize; 3]) -> Result<(), CfcError> {
    let (_, t, a, p) = coupling.dim();
    let expected = [t, a, p];
    if found != expected {
        return Err(CfcError::SurrogateShape { window, expected, found });
    }
    Ok(())
}
