//! Multinomial logistic regression on top of `linfa-logistic`.

use linfa::traits::{Fit, Predict};
use linfa_logistic::{MultiFittedLogisticRegression, MultiLogisticRegression};
use ndarray::{Array1, ArrayView2};

use super::{Classifier, backend, check_features, check_fit_input, labelled};
use crate::ClassifyError;

/// Iteration cap of the L-BFGS solver.
const MAX_ITERATIONS: u64 = 100;

/// L2-regularized multinomial logistic regression.
#[derive(Debug, Clone, Default)]
pub struct LogisticRegression {
    n_features: usize,
    model: Option<MultiFittedLogisticRegression<f64, usize>>,
}

impl Classifier for LogisticRegression {
    fn fit(&mut self, x: ArrayView2<f64>, y: &[usize]) -> Result<(), ClassifyError> {
        check_fit_input(&x, y)?;
        let model = MultiLogisticRegression::<f64>::default()
            .max_iterations(MAX_ITERATIONS)
            .fit(&labelled(x, y))
            .map_err(|e| backend("logistic regression", e))?;

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
