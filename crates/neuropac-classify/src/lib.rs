//! Neuropac Classify - cross-validated decoding of neural features
//!
//! Estimates how much class information a feature carries by repeatedly
//! training a classifier on part of the trials and scoring it on the rest.
//!
//! ## Example
//!
//! ```rust
//! use ndarray::Array2;
//! use neuropac_classify::{ClassifierKind, CrossValidation, CvKind, Decoder, FeatureMode, Jobs};
//!
//! let y: Vec<usize> = (0..20).map(|i| i % 2).collect();
//! let x = Array2::from_shape_fn((20, 1), |(i, _)| y[i] as f64 + 0.01 * i as f64);
//!
//! let cv = CrossValidation::new(CvKind::StratifiedKFold, 5, 2).unwrap();
//! let decoder = Decoder::new(ClassifierKind::Lda, cv);
//! let accuracy = decoder.fit(x.view(), &y, FeatureMode::Single, Jobs::SERIAL).unwrap();
//! assert_eq!(accuracy.dim(), (1, 2));
//! ```

pub mod classifier;
pub mod cv;
pub mod decoder;
pub mod error;

pub use classifier::{
    Classifier, ClassifierKind, DEFAULT_NEIGHBORS, DEFAULT_TREES, Descriptor, GaussianNb, Knn, Lda,
    LogisticRegression, Qda, RandomForest, Svm, SvmFormulation, SvmKernel,
};
pub use cv::{CrossValidation, CvKind, DEFAULT_FOLDS, DEFAULT_REPETITIONS, Split};
pub use decoder::{Decoder, FeatureMode};
pub use error::ClassifyError;
pub use neuropac_core::Jobs;
