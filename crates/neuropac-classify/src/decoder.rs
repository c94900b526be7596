//! Repeated cross-validated decoding.
//!
//! [`Decoder::fit`] scores how well a feature matrix predicts class labels.
//! Each output cell is the accuracy (in percent) of one feature set over
//! every test fold of one repetition.

use std::fmt;

use ndarray::{Array2, ArrayView2, Axis};
use neuropac_core::Jobs;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::ClassifyError;
use crate::classifier::ClassifierKind;
use crate::cv::{CrossValidation, Split};

/// How features are grouped into decoding problems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureMode {
    /// Decode every feature on its own, one output row per feature.
    #[default]
    Single,
    /// Decode all features together, one output row.
    Multi,
}

/// A classifier paired with a cross-validation scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Decoder {
    classifier: ClassifierKind,
    cv: CrossValidation,
}

impl Decoder {
    /// Pair a classifier with a cross-validation scheme.
    pub fn new(classifier: ClassifierKind, cv: CrossValidation) -> Self {
        Self { classifier, cv }
    }

    /// The classifier.
    pub fn classifier(&self) -> ClassifierKind {
        self.classifier
    }

    /// The cross-validation scheme.
    pub fn cv(&self) -> CrossValidation {
        self.cv
    }

    /// E.g. `"10-times, 10 Stratified k-folds with a Linear Discriminant Analysis"`.
    pub fn describe(&self) -> String {
        format!(
            "{} with a {}",
            self.cv.descriptor().long_name,
            self.classifier.descriptor().long_name
        )
    }

    /// Decoding accuracy in percent, shape `(rows, repetitions)`.
    ///
    /// `x` is `(trials, features)`; if its rows do not match `y` but its
    /// columns do, it is read as `(features, trials)`. Rows of the result
    /// are one per feature in [`FeatureMode::Single`], one in
    /// [`FeatureMode::Multi`].
    ///
    /// Tasks run on a dedicated pool sized from `jobs`. The first failing
    /// task aborts the batch.
    pub fn fit(
        &self,
        x: ArrayView2<f64>,
        y: &[usize],
        mode: FeatureMode,
        jobs: Jobs,
    ) -> Result<Array2<f64>, ClassifyError> {
        let (rows, cols) = x.dim();
        if rows == 0 || cols == 0 || y.is_empty() {
            return Err(ClassifyError::EmptyInput);
        }
        let x = if rows == y.len() {
            x
        } else if cols == y.len() {
            x.reversed_axes()
        } else {
            return Err(ClassifyError::LabelLength {
                rows,
                cols,
                labels: y.len(),
            });
        };

        let n_classes = count_classes(y);
        if n_classes < 2 {
            return Err(ClassifyError::SingleClass { found: n_classes });
        }

        let n_features = x.ncols();
        let feature_sets: Vec<Vec<usize>> = match mode {
            FeatureMode::Single => (0..n_features).map(|f| vec![f]).collect(),
            FeatureMode::Multi => vec![(0..n_features).collect()],
        };
        let repetitions = self.cv.repetitions();
        let folds: Vec<Vec<Split>> = (0..repetitions)
            .map(|rep| self.cv.splits(y, rep))
            .collect::<Result<_, _>>()?;

        info!(
            decoder = %self.describe(),
            trials = y.len(),
            features = n_features,
            ?mode,
            "decoding"
        );

        let tasks: Vec<(usize, usize)> = (0..feature_sets.len())
            .flat_map(|row| (0..repetitions).map(move |rep| (row, rep)))
            .collect();
        let threads = jobs.threads_for(tasks.len());
        let pool = rayon::ThreadPoolBuilder::new().num_threads(threads).build()?;
        debug!(threads, tasks = tasks.len(), "dispatching decoding tasks");

        let scores: Vec<f64> = pool.install(|| {
            tasks
                .par_iter()
                .map(|&(row, rep)| {
                    let result = self.score(x, y, &feature_sets[row], &folds[rep]);
                    debug!(row, rep, ok = result.is_ok(), "decoding task finished");
                    result.map_err(|source| ClassifyError::WorkerTask {
                        feature: row,
                        repetition: rep,
                        source: Box::new(source),
                    })
                })
                .collect::<Result<_, _>>()
        })?;

        Ok(Array2::from_shape_fn((feature_sets.len(), repetitions), |(row, rep)| {
            scores[row * repetitions + rep]
        }))
    }

    /// Percent of test trials predicted correctly across all folds.
    fn score(
        &self,
        x: ArrayView2<f64>,
        y: &[usize],
        features: &[usize],
        folds: &[Split],
    ) -> Result<f64, ClassifyError> {
        let x = x.select(Axis(1), features);
        let (mut correct, mut total) = (0usize, 0usize);

        for split in folds {
            let mut clf = self.classifier.build()?;
            let y_train: Vec<usize> = split.train.iter().map(|&i| y[i]).collect();
            clf.fit(x.select(Axis(0), &split.train).view(), &y_train)?;

            let predicted = clf.predict(x.select(Axis(0), &split.test).view())?;
            correct += predicted
                .iter()
                .zip(&split.test)
                .filter(|&(&p, &i)| p == y[i])
                .count();
            total += split.test.len();
        }

        if total == 0 {
            return Ok(0.0);
        }
        Ok(100.0 * correct as f64 / total as f64)
    }
}

impl fmt::Display for Decoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

fn count_classes(y: &[usize]) -> usize {
    let mut classes = y.to_vec();
    classes.sort_unstable();
    classes.dedup();
    classes.len()
}
