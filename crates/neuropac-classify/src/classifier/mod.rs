//! Classifiers for the decoding loop.
//!
//! Nine classifiers are selected by name or digit through the closed
//! [`ClassifierKind`] enum:
//!
//! | Digit | Name        | Classifier                                  |
//! |-------|-------------|---------------------------------------------|
//! | 0     | `lda`       | Linear discriminant analysis                |
//! | 1     | `svm`       | C-support vector machine (rbf, linear, poly)|
//! | 2     | `linearsvm` | Linear support vector machine               |
//! | 3     | `nusvm`     | Nu-support vector machine                   |
//! | 4     | `nb`        | Gaussian naive Bayes                        |
//! | 5     | `knn`       | k-nearest neighbors                         |
//! | 6     | `rf`        | Random forest                               |
//! | 7     | `lr`        | Multinomial logistic regression             |
//! | 8     | `qda`       | Quadratic discriminant analysis             |
//!
//! The discriminant analyses are solved with `nalgebra`; the others are
//! backed by the `linfa` family of crates.

mod bayes;
mod discriminant;
mod forest;
mod logistic;
mod neighbors;
mod svm;

use std::fmt;
use std::str::FromStr;

use linfa::Dataset;
use ndarray::{Array1, Array2, ArrayView2, Axis, Ix1};
use serde::{Deserialize, Serialize};

use crate::ClassifyError;

pub use bayes::GaussianNb;
pub use discriminant::{Lda, Qda};
pub use forest::RandomForest;
pub use logistic::LogisticRegression;
pub use neighbors::Knn;
pub use svm::{Svm, SvmFormulation, SvmKernel};

/// Default neighbor count for k-NN.
pub const DEFAULT_NEIGHBORS: usize = 10;

/// Default tree count for the random forest.
pub const DEFAULT_TREES: usize = 100;

/// Display names returned alongside a classifier or cross-validation scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    /// Full description.
    pub long_name: String,
    /// Abbreviation.
    pub short_name: String,
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.long_name)
    }
}

/// A supervised classifier over rows of a feature matrix.
pub trait Classifier: Send {
    /// Fit on `x` (samples x features) with one label per row.
    fn fit(&mut self, x: ArrayView2<f64>, y: &[usize]) -> Result<(), ClassifyError>;

    /// Predict one label per row of `x`.
    fn predict(&self, x: ArrayView2<f64>) -> Result<Vec<usize>, ClassifyError>;
}

/// The available classifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ClassifierKind {
    /// Linear discriminant analysis with pooled covariance and uniform priors.
    #[default]
    Lda,
    /// C-support vector machine.
    Svm {
        /// Kernel function.
        #[serde(default)]
        kernel: SvmKernel,
    },
    /// Support vector machine with a linear kernel.
    LinearSvm,
    /// Nu-support vector machine with an rbf kernel.
    NuSvm,
    /// Gaussian naive Bayes.
    #[serde(rename = "gnb", alias = "nb")]
    GaussianNb,
    /// k-nearest neighbors with majority vote.
    Knn {
        /// Number of neighbors.
        #[serde(default = "default_neighbors")]
        neighbors: usize,
    },
    /// Bagged decision trees.
    #[serde(rename = "rf")]
    RandomForest {
        /// Number of trees.
        #[serde(default = "default_trees")]
        trees: usize,
    },
    /// Multinomial logistic regression.
    #[serde(rename = "lr")]
    LogisticRegression,
    /// Quadratic discriminant analysis with per-class covariance.
    Qda,
}

fn default_neighbors() -> usize {
    DEFAULT_NEIGHBORS
}

fn default_trees() -> usize {
    DEFAULT_TREES
}

impl ClassifierKind {
    /// Every classifier with default parameters, in digit order.
    pub const ALL: [ClassifierKind; 9] = [
        ClassifierKind::Lda,
        ClassifierKind::Svm { kernel: SvmKernel::Rbf },
        ClassifierKind::LinearSvm,
        ClassifierKind::NuSvm,
        ClassifierKind::GaussianNb,
        ClassifierKind::Knn { neighbors: DEFAULT_NEIGHBORS },
        ClassifierKind::RandomForest { trees: DEFAULT_TREES },
        ClassifierKind::LogisticRegression,
        ClassifierKind::Qda,
    ];

    /// Look up a classifier with default parameters by digit.
    pub fn from_digit(digit: u8) -> Option<Self> {
        Self::ALL.get(usize::from(digit)).copied()
    }

    /// Display names for this classifier.
    pub fn descriptor(&self) -> Descriptor {
        let (long_name, short_name) = match self {
            ClassifierKind::Lda => ("Linear Discriminant Analysis".to_string(), "LDA".to_string()),
            ClassifierKind::Svm { kernel } => (
                format!("Support Vector Machine (kernel={kernel})"),
                format!("SVM-{kernel}"),
            ),
            ClassifierKind::LinearSvm => ("Linear Support Vector Machine".to_string(), "LSVM".to_string()),
            ClassifierKind::NuSvm => ("Nu Support Vector Machine".to_string(), "NuSVM".to_string()),
            ClassifierKind::GaussianNb => ("Naive Bayesian".to_string(), "NB".to_string()),
            ClassifierKind::Knn { neighbors } => (
                format!("k-Nearest Neighbor (neighbor={neighbors})"),
                format!("KNN-{neighbors}"),
            ),
            ClassifierKind::RandomForest { trees } => {
                (format!("Random Forest (tree={trees})"), format!("RF-{trees}"))
            }
            ClassifierKind::LogisticRegression => ("Logistic Regression".to_string(), "LogReg".to_string()),
            ClassifierKind::Qda => ("Quadratic Discriminant Analysis".to_string(), "QDA".to_string()),
        };
        Descriptor { long_name, short_name }
    }

    /// A fresh, unfitted classifier.
    pub fn build(&self) -> Result<Box<dyn Classifier>, ClassifyError> {
        Ok(match *self {
            ClassifierKind::Lda => Box::new(Lda::default()),
            ClassifierKind::Svm { kernel } => Box::new(Svm::new(SvmFormulation::C, kernel)),
            ClassifierKind::LinearSvm => Box::new(Svm::new(SvmFormulation::C, SvmKernel::Linear)),
            ClassifierKind::NuSvm => Box::new(Svm::new(SvmFormulation::Nu, SvmKernel::Rbf)),
            ClassifierKind::GaussianNb => Box::new(GaussianNb::default()),
            ClassifierKind::Knn { neighbors } => Box::new(Knn::new(neighbors)?),
            ClassifierKind::RandomForest { trees } => Box::new(RandomForest::new(trees)?),
            ClassifierKind::LogisticRegression => Box::new(LogisticRegression::default()),
            ClassifierKind::Qda => Box::new(Qda::default()),
        })
    }
}

impl FromStr for ClassifierKind {
    type Err = ClassifyError;

    /// Parses a digit `0`-`8` or a name: `lda`, `svm`, `svm-<kernel>`,
    /// `linearsvm`, `nusvm`, `nb`/`gnb`, `knn`, `knn-<k>`, `rf`, `rf-<trees>`,
    /// `lr` or `qda`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let unknown = || ClassifyError::UnknownName {
            kind: "classifier",
            name: s.to_string(),
        };

        if let Ok(digit) = lower.parse::<u8>() {
            return Self::from_digit(digit).ok_or_else(unknown);
        }

        let parsed = match lower.as_str() {
            "lda" => Some(ClassifierKind::Lda),
            "svm" | "svc" => Some(ClassifierKind::Svm { kernel: SvmKernel::default() }),
            "linearsvm" | "lsvm" => Some(ClassifierKind::LinearSvm),
            "nusvm" => Some(ClassifierKind::NuSvm),
            "nb" | "gnb" => Some(ClassifierKind::GaussianNb),
            "knn" => Some(ClassifierKind::Knn { neighbors: DEFAULT_NEIGHBORS }),
            "rf" => Some(ClassifierKind::RandomForest { trees: DEFAULT_TREES }),
            "lr" | "logreg" => Some(ClassifierKind::LogisticRegression),
            "qda" => Some(ClassifierKind::Qda),
            other => {
                if let Some(kernel) = other.strip_prefix("svm-") {
                    kernel.parse().ok().map(|kernel| ClassifierKind::Svm { kernel })
                } else if let Some(k) = other.strip_prefix("knn-") {
                    k.parse().ok().map(|neighbors| ClassifierKind::Knn { neighbors })
                } else if let Some(n) = other.strip_prefix("rf-") {
                    n.parse().ok().map(|trees| ClassifierKind::RandomForest { trees })
                } else {
                    None
                }
            }
        };
        parsed.ok_or_else(unknown)
    }
}

/// Sorted distinct labels; errors when fewer than two.
fn classes_of(y: &[usize]) -> Result<Vec<usize>, ClassifyError> {
    let mut classes = y.to_vec();
    classes.sort_unstable();
    classes.dedup();
    if classes.len() < 2 {
        return Err(ClassifyError::SingleClass { found: classes.len() });
    }
    Ok(classes)
}

fn check_fit_input(x: &ArrayView2<f64>, y: &[usize]) -> Result<Vec<usize>, ClassifyError> {
    if x.nrows() == 0 || x.ncols() == 0 {
        return Err(ClassifyError::EmptyInput);
    }
    if x.nrows() != y.len() {
        return Err(ClassifyError::LabelLength {
            rows: x.nrows(),
            cols: x.ncols(),
            labels: y.len(),
        });
    }
    classes_of(y)
}

fn check_features(expected: usize, x: &ArrayView2<f64>) -> Result<(), ClassifyError> {
    if x.ncols() != expected {
        return Err(ClassifyError::FeatureMismatch {
            expected,
            found: x.ncols(),
        });
    }
    Ok(())
}

/// Row indices of each class, in class order.
fn class_rows(y: &[usize], classes: &[usize]) -> Vec<Vec<usize>> {
    classes
        .iter()
        .map(|&class| (0..y.len()).filter(|&i| y[i] == class).collect())
        .collect()
}

/// Per-class feature means, one row per class.
fn class_means(x: &ArrayView2<f64>, y: &[usize], classes: &[usize]) -> Array2<f64> {
    let mut means = Array2::zeros((classes.len(), x.ncols()));
    for (c, rows) in class_rows(y, classes).iter().enumerate() {
        let subset = x.select(Axis(0), rows);
        if let Some(mean) = subset.mean_axis(Axis(0)) {
            means.row_mut(c).assign(&mean);
        }
    }
    means
}

fn argmax(scores: impl Iterator<Item = f64>) -> usize {
    scores
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |best, (i, s)| if s > best.1 { (i, s) } else { best })
        .0
}

/// Most frequent label; ties go to the smallest label.
fn majority(labels: impl IntoIterator<Item = usize>) -> usize {
    let mut votes: Vec<(usize, usize)> = Vec::new();
    for label in labels {
        match votes.iter_mut().find(|(l, _)| *l == label) {
            Some((_, count)) => *count += 1,
            None => votes.push((label, 1)),
        }
    }
    votes.sort_unstable();
    votes
        .iter()
        .fold((0, 0), |best, &(label, count)| if count > best.1 { (label, count) } else { best })
        .0
}

/// A `linfa` dataset with class labels as targets.
fn labelled(x: ArrayView2<f64>, y: &[usize]) -> Dataset<f64, usize, Ix1> {
    Dataset::new(x.to_owned(), Array1::from(y.to_vec()))
}

/// Wrap a `linfa` failure.
fn backend(classifier: &'static str, err: impl fmt::Display) -> ClassifyError {
    ClassifyError::Backend {
        classifier,
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    /// Two well separated 2-D clusters.
    pub(super) fn clusters() -> (Array2<f64>, Vec<usize>) {
        let x = array![
            [0.0, 0.1],
            [0.2, -0.1],
            [-0.1, 0.0],
            [0.1, 0.2],
            [0.15, 0.05],
            [-0.05, 0.15],
            [5.0, 5.1],
            [5.2, 4.9],
            [4.9, 5.0],
            [5.1, 5.2],
            [4.95, 5.05],
            [5.05, 4.85],
        ];
        (x, vec![0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 1, 1])
    }

    /// Three clusters along one feature, four samples each.
    pub(super) fn three_clusters() -> (Array2<f64>, Vec<usize>) {
        let x = array![
            [0.0],
            [0.1],
            [-0.1],
            [0.05],
            [5.0],
            [5.1],
            [4.9],
            [5.05],
            [10.0],
            [10.1],
            [9.9],
            [10.05]
        ];
        (x, vec![0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2])
    }

    #[test]
    fn test_all_classifiers_separate_clusters() {
        let (x, y) = clusters();
        let queries = array![[0.05, 0.0], [5.0, 5.0], [4.6, 4.8], [0.4, 0.3]];
        for kind in ClassifierKind::ALL {
            let mut clf = kind.build().unwrap();
            clf.fit(x.view(), &y).unwrap();
            assert_eq!(clf.predict(queries.view()).unwrap(), vec![0, 1, 1, 0], "{kind:?}");
        }
    }

    #[test]
    fn test_all_classifiers_handle_three_classes() {
        let (x, y) = three_clusters();
        for kind in ClassifierKind::ALL {
            let kind = match kind {
                ClassifierKind::Knn { .. } => ClassifierKind::Knn { neighbors: 3 },
                other => other,
            };
            let mut clf = kind.build().unwrap();
            clf.fit(x.view(), &y).unwrap();
            assert_eq!(clf.predict(array![[0.02], [5.02], [9.95]].view()).unwrap(), vec![0, 1, 2], "{kind:?}");
        }
    }

    #[test]
    fn test_labels_need_not_be_contiguous() {
        let (x, y) = clusters();
        let y: Vec<usize> = y.iter().map(|&l| if l == 0 { 3 } else { 7 }).collect();
        for kind in [ClassifierKind::Svm { kernel: SvmKernel::Rbf }, ClassifierKind::LogisticRegression] {
            let mut clf = kind.build().unwrap();
            clf.fit(x.view(), &y).unwrap();
            assert_eq!(clf.predict(array![[0.0, 0.0], [5.0, 5.0]].view()).unwrap(), vec![3, 7], "{kind:?}");
        }
    }

    #[test]
    fn test_predict_before_fit_and_feature_mismatch() {
        let (x, y) = clusters();
        for kind in ClassifierKind::ALL {
            let mut clf = kind.build().unwrap();
            assert!(matches!(clf.predict(x.view()), Err(ClassifyError::NotFitted)), "{kind:?}");
            clf.fit(x.view(), &y).unwrap();
            assert!(
                matches!(
                    clf.predict(array![[1.0, 2.0, 3.0]].view()),
                    Err(ClassifyError::FeatureMismatch { expected: 2, found: 3 })
                ),
                "{kind:?}"
            );
        }
    }

    #[test]
    fn test_fit_input_errors() {
        let (x, y) = clusters();
        for kind in ClassifierKind::ALL {
            let mut clf = kind.build().unwrap();
            assert!(matches!(
                clf.fit(x.view(), &[0; 12]),
                Err(ClassifyError::SingleClass { found: 1 })
            ));
            assert!(matches!(
                clf.fit(x.view(), &y[..5]),
                Err(ClassifyError::LabelLength { rows: 12, cols: 2, labels: 5 })
            ));
        }
    }

    #[test]
    fn test_zero_parameters_rejected() {
        assert!(matches!(
            ClassifierKind::Knn { neighbors: 0 }.build(),
            Err(ClassifyError::ZeroNeighbors)
        ));
        assert!(matches!(
            ClassifierKind::RandomForest { trees: 0 }.build(),
            Err(ClassifyError::ZeroTrees)
        ));
    }

    #[test]
    fn test_majority_tie_goes_to_smallest_label() {
        assert_eq!(majority([4, 1]), 1);
        assert_eq!(majority([2, 5, 5, 2, 5]), 5);
    }

    #[test]
    fn test_descriptors() {
        let names: Vec<String> = ClassifierKind::ALL.iter().map(|k| k.descriptor().short_name).collect();
        assert_eq!(names, ["LDA", "SVM-rbf", "LSVM", "NuSVM", "NB", "KNN-10", "RF-100", "LogReg", "QDA"]);

        let svm = ClassifierKind::Svm { kernel: SvmKernel::Rbf }.descriptor();
        assert_eq!(svm.long_name, "Support Vector Machine (kernel=rbf)");
        let rf = ClassifierKind::RandomForest { trees: 100 }.descriptor();
        assert_eq!(rf.long_name, "Random Forest (tree=100)");
        let knn = ClassifierKind::Knn { neighbors: 10 }.descriptor();
        assert_eq!(knn.long_name, "k-Nearest Neighbor (neighbor=10)");
        assert_eq!(ClassifierKind::Qda.descriptor().long_name, "Quadratic Discriminant Analysis");
    }

    #[test]
    fn test_from_str() {
        assert_eq!("LDA".parse::<ClassifierKind>().unwrap(), ClassifierKind::Lda);
        assert_eq!("nb".parse::<ClassifierKind>().unwrap(), ClassifierKind::GaussianNb);
        assert_eq!(
            "knn".parse::<ClassifierKind>().unwrap(),
            ClassifierKind::Knn { neighbors: DEFAULT_NEIGHBORS }
        );
        assert_eq!("knn-3".parse::<ClassifierKind>().unwrap(), ClassifierKind::Knn { neighbors: 3 });
        assert_eq!(
            "svm".parse::<ClassifierKind>().unwrap(),
            ClassifierKind::Svm { kernel: SvmKernel::Rbf }
        );
        assert_eq!(
            "svm-poly".parse::<ClassifierKind>().unwrap(),
            ClassifierKind::Svm { kernel: SvmKernel::Poly }
        );
        assert_eq!("rf-20".parse::<ClassifierKind>().unwrap(), ClassifierKind::RandomForest { trees: 20 });
        assert_eq!("lr".parse::<ClassifierKind>().unwrap(), ClassifierKind::LogisticRegression);
        assert_eq!("qda".parse::<ClassifierKind>().unwrap(), ClassifierKind::Qda);
        assert!(matches!(
            "boosting".parse::<ClassifierKind>(),
            Err(ClassifyError::UnknownName { kind: "classifier", .. })
        ));
        assert!("svm-sigmoid".parse::<ClassifierKind>().is_err());
    }

    #[test]
    fn test_digits() {
        for (digit, kind) in ClassifierKind::ALL.iter().enumerate() {
            assert_eq!(digit.to_string().parse::<ClassifierKind>().unwrap(), *kind);
        }
        assert_eq!("3".parse::<ClassifierKind>().unwrap(), ClassifierKind::NuSvm);
        assert!("9".parse::<ClassifierKind>().is_err());
    }
}
