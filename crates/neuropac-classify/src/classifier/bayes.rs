//! Gaussian naive Bayes on top of `linfa-bayes`.

use linfa::traits::{Fit, Predict};
use linfa_bayes::GaussianNb as LinfaGaussianNb;
use ndarray::{Array1, ArrayView2};

use super::{Classifier, backend, check_features, check_fit_input, labelled};
use crate::ClassifyError;

/// Gaussian naive Bayes with empirical class priors.
///
/// Every variance is smoothed by a small fraction of the largest feature
/// variance, so constant features do not collapse the likelihood.
#[derive(Debug, Clone, Default)]
pub struct GaussianNb {
    n_features: usize,
    model: Option<LinfaGaussianNb<f64, usize>>,
}

impl GaussianNb {
    /// Fraction of the largest feature variance added to every variance.
    pub const VAR_SMOOTHING: f64 = 1e-9;
}

impl Classifier for GaussianNb {
    fn fit(&mut self, x: ArrayView2<f64>, y: &[usize]) -> Result<(), ClassifyError> {
        check_fit_input(&x, y)?;
        let model = LinfaGaussianNb::<f64, usize>::params()
            .var_smoothing(Self::VAR_SMOOTHING)
            .fit(&labelled(x, y))
            .map_err(|e| backend("gaussian naive bayes", e))?;

        self.n_features = x.ncols();
        self.model = Some(model);
        Ok(())
    }

    fn predict(&self, x: ArrayView2<f64>) -> Result<Vec<usize>, ClassifyError> {
        let model = self.model.as_ref().ok_or(ClassifyError::NotFitted)?;
        check_features(self.n_features, &x)?;

        let labels: Array1<usize> = model.predict(&x);
        Ok(labels.to_vec())
    }
}
