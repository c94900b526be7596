//! Linear and quadratic discriminant analysis.
//!
//! Covariances get a small ridge so that single-feature, constant and
//! collinear inputs stay positive definite; they are then factored with
//! `nalgebra`'s Cholesky decomposition.

use nalgebra::{Cholesky, DMatrix, DVector, Dyn};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

use super::{Classifier, argmax, check_features, check_fit_input, class_means, class_rows};
use crate::ClassifyError;

/// Relative ridge added to the covariance diagonal.
const RIDGE: f64 = 1e-6;

/// Scatter matrix of `rows` around `mean`.
fn scatter(x: &ArrayView2<f64>, rows: &[usize], mean: ArrayView1<f64>) -> Array2<f64> {
    let centered = &x.select(Axis(0), rows) - &mean;
    centered.t().dot(&centered)
}

/// Cholesky factor of `cov` after adding a ridge scaled to its mean variance.
fn regularized_cholesky(cov: &Array2<f64>) -> Result<Cholesky<f64, Dyn>, ClassifyError> {
    let n = cov.nrows();
    let scale = cov.diag().sum() / n as f64;
    let ridge = if scale > 0.0 { RIDGE * scale } else { 1.0 };
    DMatrix::from_fn(n, n, |i, j| if i == j { cov[[i, j]] + ridge } else { cov[[i, j]] })
        .cholesky()
        .ok_or(ClassifyError::Singular)
}

/// Linear discriminant analysis.
///
/// Uses the pooled within-class covariance. Priors are uniform.
#[derive(Debug, Clone, Default)]
pub struct Lda {
    classes: Vec<usize>,
    /// `(classes, features)` discriminant weights.
    weights: Array2<f64>,
    intercepts: Array1<f64>,
}

impl Classifier for Lda {
    fn fit(&mut self, x: ArrayView2<f64>, y: &[usize]) -> Result<(), ClassifyError> {
        let classes = check_fit_input(&x, y)?;
        let n_features = x.ncols();
        let means = class_means(&x, y, &classes);

        let mut cov = Array2::<f64>::zeros((n_features, n_features));
        for (c, rows) in class_rows(y, &classes).iter().enumerate() {
            cov += &scatter(&x, rows, means.row(c));
        }
        let dof = x.nrows().saturating_sub(classes.len()).max(1);
        cov /= dof as f64;

        // Solve cov * W^T = means^T for all classes at once.
        let chol = regularized_cholesky(&cov)?;
        let rhs = DMatrix::from_fn(n_features, classes.len(), |i, c| means[[c, i]]);
        let solved = chol.solve(&rhs);
        let weights = Array2::from_shape_fn((classes.len(), n_features), |(c, i)| solved[(i, c)]);
        let intercepts = Array1::from_iter(
            weights
                .outer_iter()
                .zip(means.outer_iter())
                .map(|(w, m)| -0.5 * w.dot(&m)),
        );

        self.classes = classes;
        self.weights = weights;
        self.intercepts = intercepts;
        Ok(())
    }

    fn predict(&self, x: ArrayView2<f64>) -> Result<Vec<usize>, ClassifyError> {
        if self.classes.is_empty() {
            return Err(ClassifyError::NotFitted);
        }
        check_features(self.weights.ncols(), &x)?;

        let scores = x.dot(&self.weights.t()) + &self.intercepts;
        Ok(scores
            .outer_iter()
            .map(|row| self.classes[argmax(row.iter().copied())])
            .collect())
    }
}

/// Per-class Gaussian of a quadratic discriminant.
#[derive(Debug, Clone)]
struct ClassGaussian {
    mean: DVector<f64>,
    chol: Cholesky<f64, Dyn>,
    /// `log prior - 0.5 * log det(cov)`.
    offset: f64,
}

impl ClassGaussian {
    fn score(&self, row: ArrayView1<f64>) -> f64 {
        let centered = DVector::from_iterator(row.len(), row.iter().copied()) - &self.mean;
        let solved = self.chol.solve(&centered);
        self.offset - 0.5 * centered.dot(&solved)
    }
}

/// Quadratic discriminant analysis.
///
/// Every class has its own covariance, so boundaries between classes are
/// quadratic. Priors are the class frequencies of the training set.
#[derive(Debug, Clone, Default)]
pub struct Qda {
    classes: Vec<usize>,
    n_features: usize,
    gaussians: Vec<ClassGaussian>,
}

impl Classifier for Qda {
    fn fit(&mut self, x: ArrayView2<f64>, y: &[usize]) -> Result<(), ClassifyError> {
        let classes = check_fit_input(&x, y)?;
        let means = class_means(&x, y, &classes);

        let mut gaussians = Vec::with_capacity(classes.len());
        for (c, rows) in class_rows(y, &classes).iter().enumerate() {
            let dof = rows.len().saturating_sub(1).max(1);
            let cov = scatter(&x, rows, means.row(c)) / dof as f64;
            let chol = regularized_cholesky(&cov)?;
            let log_det = 2.0 * chol.l_dirty().diagonal().iter().map(|d| d.ln()).sum::<f64>();
            let log_prior = (rows.len() as f64 / y.len() as f64).ln();
            gaussians.push(ClassGaussian {
                mean: DVector::from_iterator(x.ncols(), means.row(c).iter().copied()),
                chol,
                offset: log_prior - 0.5 * log_det,
            });
        }

        self.classes = classes;
        self.n_features = x.ncols();
        self.gaussians = gaussians;
        Ok(())
    }

    fn predict(&self, x: ArrayView2<f64>) -> Result<Vec<usize>, ClassifyError> {
        if self.classes.is_empty() {
            return Err(ClassifyError::NotFitted);
        }
        check_features(self.n_features, &x)?;

        Ok(x.outer_iter()
            .map(|row| self.classes[argmax(self.gaussians.iter().map(|g| g.score(row)))])
            .collect())
    }
}
