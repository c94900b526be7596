//! Support vector machines on top of `linfa-svm`.
//!
//! `linfa-svm` fits binary problems. More than two classes are handled
//! one-vs-one: every pair of classes gets its own machine and the most
//! voted class wins, ties going to the smallest label.

use std::fmt;
use std::str::FromStr;

use linfa::Dataset;
use linfa::traits::{Fit, Predict};
use linfa_svm::{Svm as LinfaSvm, SvmParams};
use ndarray::{Array1, Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use super::{Classifier, backend, check_features, check_fit_input, class_rows, majority};
use crate::ClassifyError;

/// Box constraint of the C formulation.
const C_PENALTY: f64 = 1.0;

/// Upper bound on the margin error fraction of the nu formulation.
const NU: f64 = 0.5;

/// Degree of the polynomial kernel `(a . b + 1)^3`.
const POLY_DEGREE: f64 = 3.0;

/// Kernel function of a support vector machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SvmKernel {
    /// Plain dot product.
    Linear,
    /// Gaussian radial basis function.
    #[default]
    Rbf,
    /// Cubic polynomial.
    Poly,
}

impl fmt::Display for SvmKernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SvmKernel::Linear => "linear",
            SvmKernel::Rbf => "rbf",
            SvmKernel::Poly => "poly",
        })
    }
}

impl FromStr for SvmKernel {
    type Err = ClassifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" => Ok(SvmKernel::Linear),
            "rbf" => Ok(SvmKernel::Rbf),
            "poly" => Ok(SvmKernel::Poly),
            _ => Err(ClassifyError::UnknownName {
                kind: "kernel",
                name: s.to_string(),
            }),
        }
    }
}

/// Regularization formulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SvmFormulation {
    /// Penalty weight `C` on margin violations.
    C,
    /// Fraction `nu` of margin errors and support vectors.
    Nu,
}

/// Binary machine separating `positive` from `negative`.
struct Pair {
    positive: usize,
    negative: usize,
    model: LinfaSvm<f64, bool>,
}

/// Support vector classifier over any number of classes.
pub struct Svm {
    formulation: SvmFormulation,
    kernel: SvmKernel,
    n_features: usize,
    pairs: Vec<Pair>,
}

impl fmt::Debug for Svm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Svm")
            .field("formulation", &self.formulation)
            .field("kernel", &self.kernel)
            .field("pairs", &self.pairs.len())
            .finish_non_exhaustive()
    }
}

impl Svm {
    /// Create an unfitted machine.
    pub fn new(formulation: SvmFormulation, kernel: SvmKernel) -> Self {
        Self {
            formulation,
            kernel,
            n_features: 0,
            pairs: Vec::new(),
        }
    }

    /// Solver parameters for a training set.
    fn params(&self, x: &Array2<f64>) -> SvmParams<f64, bool> {
        let params = LinfaSvm::<f64, bool>::params();
        let params = match self.formulation {
            SvmFormulation::C => params.pos_neg_weights(C_PENALTY, C_PENALTY),
            SvmFormulation::Nu => params.nu_weight(NU),
        };
        match self.kernel {
            SvmKernel::Linear => params.linear_kernel(),
            SvmKernel::Rbf => params.gaussian_kernel(rbf_width(x)),
            SvmKernel::Poly => params.polynomial_kernel(1.0, POLY_DEGREE),
        }
    }
}

/// Width `n_features * var(x)` of the Gaussian kernel `exp(-|a - b|^2 / width)`.
fn rbf_width(x: &Array2<f64>) -> f64 {
    let width = x.ncols() as f64 * x.var(0.0);
    if width > 0.0 { width } else { 1.0 }
}

impl Classifier for Svm {
    fn fit(&mut self, x: ArrayView2<f64>, y: &[usize]) -> Result<(), ClassifyError> {
        let classes = check_fit_input(&x, y)?;
        let rows = class_rows(y, &classes);

        let mut pairs = Vec::with_capacity(classes.len() * (classes.len() - 1) / 2);
        for i in 0..classes.len() {
            for j in i + 1..classes.len() {
                let members: Vec<usize> = rows[i].iter().chain(&rows[j]).copied().collect();
                let records = x.select(Axis(0), &members);
                let targets = Array1::from_iter(members.iter().map(|&m| y[m] == classes[i]));
                let dataset = Dataset::new(records, targets);
                let model = self
                    .params(dataset.records())
                    .fit(&dataset)
                    .map_err(|e| backend("svm", e))?;
                pairs.push(Pair {
                    positive: classes[i],
                    negative: classes[j],
                    model,
                });
            }
        }

        self.n_features = x.ncols();
        self.pairs = pairs;
        Ok(())
    }

    fn predict(&self, x: ArrayView2<f64>) -> Result<Vec<usize>, ClassifyError> {
        if self.pairs.is_empty() {
            return Err(ClassifyError::NotFitted);
        }
        check_features(self.n_features, &x)?;

        let records = x.to_owned();
        let decisions: Vec<Array1<bool>> = self
            .pairs
            .iter()
            .map(|pair| {
                let decision: Array1<bool> = pair.model.predict(&records);
                decision
            })
            .collect();

        Ok((0..x.nrows())
            .map(|row| {
                majority(self.pairs.iter().zip(&decisions).map(|(pair, decision)| {
                    if decision[row] { pair.positive } else { pair.negative }
                }))
            })
            .collect())
    }
}
