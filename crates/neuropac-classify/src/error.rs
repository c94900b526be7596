//! Error types for the decoding harness.

use thiserror::Error;

/// Errors raised while splitting, fitting or decoding.
#[derive(Debug, Error)]
pub enum ClassifyError {
    /// No samples or no features.
    #[error("input has no samples or no features")]
    EmptyInput,

    /// Neither axis of the data matches the label count.
    #[error("data has shape ({rows}, {cols}) but there are {labels} labels")]
    LabelLength {
        /// Rows of the data.
        rows: usize,
        /// Columns of the data.
        cols: usize,
        /// Number of labels.
        labels: usize,
    },

    /// Training data contains fewer than two classes.
    #[error("training data must contain at least two classes, found {found}")]
    SingleClass {
        /// Distinct classes present.
        found: usize,
    },

    /// The fold count is unusable for the sample count.
    #[error("cannot make {n_folds} folds from {n_samples} samples")]
    InvalidFolds {
        /// Requested folds.
        n_folds: usize,
        /// Available samples.
        n_samples: usize,
    },

    /// Zero repetitions requested.
    #[error("number of repetitions must be positive")]
    ZeroRepetitions,

    /// k-NN needs at least one neighbor.
    #[error("number of neighbors must be positive")]
    ZeroNeighbors,

    /// A random forest needs at least one tree.
    #[error("number of trees must be positive")]
    ZeroTrees,

    /// A covariance could not be factored.
    #[error("covariance matrix is singular")]
    Singular,

    /// The learning backend rejected the data.
    #[error("{classifier} failed: {reason}")]
    Backend {
        /// Classifier that failed.
        classifier: &'static str,
        /// Backend error message.
        reason: String,
    },

    /// Predicting before fitting.
    #[error("classifier has not been fitted")]
    NotFitted,

    /// Test data has a different number of features than training data.
    #[error("classifier was fitted on {expected} features, got {found}")]
    FeatureMismatch {
        /// Features seen during fit.
        expected: usize,
        /// Features in the prediction input.
        found: usize,
    },

    /// A parallel decoding task failed; the batch was aborted.
    #[error("decoding feature {feature}, repetition {repetition} failed: {source}")]
    WorkerTask {
        /// Feature row of the task.
        feature: usize,
        /// Repetition of the task.
        repetition: usize,
        /// Underlying failure.
        #[source]
        source: Box<ClassifyError>,
    },

    /// The worker pool could not be created.
    #[error("failed to build worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    /// Unrecognized classifier or cross-validation name.
    #[error("unknown {kind} '{name}'")]
    UnknownName {
        /// `"classifier"`, `"kernel"` or `"cross-validation"`.
        kind: &'static str,
        /// The name given.
        name: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn label_length_display() {
        let err = ClassifyError::LabelLength { rows: 3, cols: 4, labels: 5 };
        assert_eq!(err.to_string(), "data has shape (3, 4) but there are 5 labels");
    }

    #[test]
    fn worker_task_chains_source() {
        let err = ClassifyError::WorkerTask {
            feature: 1,
            repetition: 2,
            source: Box::new(ClassifyError::SingleClass { found: 1 }),
        };
        assert!(err.to_string().contains("feature 1, repetition 2"));
        assert_eq!(
            err.source().map(ToString::to_string),
            Some("training data must contain at least two classes, found 1".to_string())
        );
    }

    #[test]
    fn unknown_name_display() {
        let err = ClassifyError::UnknownName { kind: "classifier", name: "boosting".into() };
        assert_eq!(err.to_string(), "unknown classifier 'boosting'");
    }

    #[test]
    fn backend_display() {
        let err = ClassifyError::Backend { classifier: "svm", reason: "empty dataset".into() };
        assert_eq!(err.to_string(), "svm failed: empty dataset");
    }
}
