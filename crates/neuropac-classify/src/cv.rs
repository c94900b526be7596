//! Repeated cross-validation splitters.
//!
//! A [`CrossValidation`] describes `repetitions` independent runs of one
//! splitting scheme. Repetition `k` shuffles with random state `k`, so a
//! given (scheme, labels, repetition) always yields the same folds.

use std::fmt;
use std::str::FromStr;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::ClassifyError;
use crate::classifier::Descriptor;

/// Default number of folds.
pub const DEFAULT_FOLDS: usize = 10;

/// Default number of repetitions.
pub const DEFAULT_REPETITIONS: usize = 10;

/// Splitting scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CvKind {
    /// Shuffled k-fold keeping class proportions in every fold.
    #[default]
    #[serde(rename = "skfold")]
    StratifiedKFold,
    /// Shuffled k-fold.
    #[serde(rename = "kfold")]
    KFold,
    /// `n_folds` random splits with a `1 / n_folds` test share per class.
    #[serde(rename = "sss")]
    StratifiedShuffleSplit,
    /// `n_folds` random splits with a `1 / n_folds` test share.
    #[serde(rename = "ss")]
    ShuffleSplit,
}

impl CvKind {
    /// Short code used in names and configuration files.
    pub const fn code(self) -> &'static str {
        match self {
            CvKind::StratifiedKFold => "skfold",
            CvKind::KFold => "kfold",
            CvKind::StratifiedShuffleSplit => "sss",
            CvKind::ShuffleSplit => "ss",
        }
    }
}

impl FromStr for CvKind {
    type Err = ClassifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skfold" => Ok(CvKind::StratifiedKFold),
            "kfold" => Ok(CvKind::KFold),
            "sss" => Ok(CvKind::StratifiedShuffleSplit),
            "ss" => Ok(CvKind::ShuffleSplit),
            _ => Err(ClassifyError::UnknownName {
                kind: "cross-validation",
                name: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for CvKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Train and test sample indices of one fold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    /// Training rows.
    pub train: Vec<usize>,
    /// Test rows.
    pub test: Vec<usize>,
}

/// A repeated cross-validation scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrossValidation {
    kind: CvKind,
    n_folds: usize,
    repetitions: usize,
}

impl Default for CrossValidation {
    fn default() -> Self {
        Self {
            kind: CvKind::StratifiedKFold,
            n_folds: DEFAULT_FOLDS,
            repetitions: DEFAULT_REPETITIONS,
        }
    }
}

impl CrossValidation {
    /// Create a scheme. Needs at least two folds and one repetition.
    pub fn new(kind: CvKind, n_folds: usize, repetitions: usize) -> Result<Self, ClassifyError> {
        if n_folds < 2 {
            return Err(ClassifyError::InvalidFolds { n_folds, n_samples: 0 });
        }
        if repetitions == 0 {
            return Err(ClassifyError::ZeroRepetitions);
        }
        Ok(Self {
            kind,
            n_folds,
            repetitions,
        })
    }

    /// Splitting scheme.
    pub fn kind(&self) -> CvKind {
        self.kind
    }

    /// Folds (or random splits) per repetition.
    pub fn n_folds(&self) -> usize {
        self.n_folds
    }

    /// Number of repetitions.
    pub fn repetitions(&self) -> usize {
        self.repetitions
    }

    /// Display names, e.g. `"10-times, 5 k-folds"` / `"10rep x5 kfold"`.
    pub fn descriptor(&self) -> Descriptor {
        let (rep, folds) = (self.repetitions, self.n_folds);
        let long_name = match self.kind {
            CvKind::StratifiedKFold => format!("{rep}-times, {folds} Stratified k-folds"),
            CvKind::KFold => format!("{rep}-times, {folds} k-folds"),
            CvKind::StratifiedShuffleSplit => format!("{rep}-times, test size 1/{folds} Shuffle Stratified Split"),
            CvKind::ShuffleSplit => format!("{rep}-times, test size 1/{folds} Shuffle Split"),
        };
        Descriptor {
            long_name,
            short_name: format!("{rep}rep x{folds} {}", self.kind.code()),
        }
    }

    /// The folds of repetition `repetition` for labels `y`.
    pub fn splits(&self, y: &[usize], repetition: usize) -> Result<Vec<Split>, ClassifyError> {
        let n = y.len();
        if self.n_folds > n {
            return Err(ClassifyError::InvalidFolds {
                n_folds: self.n_folds,
                n_samples: n,
            });
        }
        let mut rng = StdRng::seed_from_u64(repetition as u64);

        let splits = match self.kind {
            CvKind::KFold => {
                let mut order: Vec<usize> = (0..n).collect();
                order.shuffle(&mut rng);
                folds_from_assignment(n, self.n_folds, |fold| contiguous_fold(&order, self.n_folds, fold))
            }
            CvKind::StratifiedKFold => {
                let assignment = stratified_assignment(y, self.n_folds, &mut rng);
                folds_from_assignment(n, self.n_folds, |fold| {
                    (0..n).filter(|&i| assignment[i] == fold).collect()
                })
            }
            CvKind::ShuffleSplit => {
                let n_test = n.div_ceil(self.n_folds);
                (0..self.n_folds)
                    .map(|_| {
                        let mut order: Vec<usize> = (0..n).collect();
                        order.shuffle(&mut rng);
                        let (test, train) = order.split_at(n_test);
                        sorted_split(train.to_vec(), test.to_vec())
                    })
                    .collect()
            }
            CvKind::StratifiedShuffleSplit => (0..self.n_folds)
                .map(|_| {
                    let mut train = Vec::new();
                    let mut test = Vec::new();
                    for class in class_members(y) {
                        let mut members = class;
                        members.shuffle(&mut rng);
                        let n_test = (members.len() as f64 / self.n_folds as f64)
                            .round()
                            .clamp(1.0, (members.len().saturating_sub(1)).max(1) as f64)
                            as usize;
                        test.extend_from_slice(&members[..n_test]);
                        train.extend_from_slice(&members[n_test..]);
                    }
                    sorted_split(train, test)
                })
                .collect(),
        };
        Ok(splits)
    }
}

impl fmt::Display for CrossValidation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.descriptor().long_name)
    }
}

/// Rows grouped by sorted class label.
fn class_members(y: &[usize]) -> Vec<Vec<usize>> {
    let mut classes: Vec<usize> = y.to_vec();
    classes.sort_unstable();
    classes.dedup();
    classes
        .iter()
        .map(|&c| (0..y.len()).filter(|&i| y[i] == c).collect())
        .collect()
}

/// Deal shuffled class members to folds round-robin, continuing the count
/// across classes so fold sizes differ by at most one.
fn stratified_assignment(y: &[usize], n_folds: usize, rng: &mut StdRng) -> Vec<usize> {
    let mut assignment = vec![0; y.len()];
    let mut next = 0;
    for mut members in class_members(y) {
        members.shuffle(rng);
        for i in members {
            assignment[i] = next % n_folds;
            next += 1;
        }
    }
    assignment
}

/// Fold `fold` of `order` cut into `n_folds` contiguous chunks, the first
/// `n % n_folds` chunks one longer.
fn contiguous_fold(order: &[usize], n_folds: usize, fold: usize) -> Vec<usize> {
    let n = order.len();
    let base = n / n_folds;
    let extra = n % n_folds;
    let start = fold * base + fold.min(extra);
    let len = base + usize::from(fold < extra);
    order[start..start + len].to_vec()
}

fn folds_from_assignment(n: usize, n_folds: usize, test_of: impl Fn(usize) -> Vec<usize>) -> Vec<Split> {
    (0..n_folds)
        .map(|fold| {
            let test = test_of(fold);
            let mut in_test = vec![false; n];
            for &i in &test {
                in_test[i] = true;
            }
            let train = (0..n).filter(|&i| !in_test[i]).collect();
            sorted_split(train, test)
        })
        .collect()
}

fn sorted_split(mut train: Vec<usize>, mut test: Vec<usize>) -> Split {
    train.sort_unstable();
    test.sort_unstable();
    Split { train, test }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels() -> Vec<usize> {
        // 12 of class 0, 8 of class 1
        (0..20).map(|i| usize::from(i >= 12)).collect()
    }

    fn assert_partition(splits: &[Split], n: usize) {
        let mut seen = vec![0; n];
        for split in splits {
            for &i in &split.test {
                seen[i] += 1;
            }
            assert_eq!(split.train.len() + split.test.len(), n);
        }
        assert!(seen.iter().all(|&c| c == 1), "every sample is tested once: {seen:?}");
    }

    #[test]
    fn test_kfold_partitions() {
        let cv = CrossValidation::new(CvKind::KFold, 6, 1).unwrap();
        let splits = cv.splits(&labels(), 0).unwrap();
        assert_eq!(splits.len(), 6);
        assert_partition(&splits, 20);
        let sizes: Vec<usize> = splits.iter().map(|s| s.test.len()).collect();
        assert_eq!(sizes, vec![4, 4, 3, 3, 3, 3]);
    }

    #[test]
    fn test_stratified_kfold_keeps_proportions() {
        let y = labels();
        let cv = CrossValidation::new(CvKind::StratifiedKFold, 4, 1).unwrap();
        let splits = cv.splits(&y, 3).unwrap();
        assert_partition(&splits, 20);
        for split in &splits {
            let ones = split.test.iter().filter(|&&i| y[i] == 1).count();
            assert_eq!(split.test.len(), 5);
            assert!((1..=3).contains(&ones), "class 1 count {ones}");
        }
    }

    #[test]
    fn test_shuffle_split_sizes() {
        let cv = CrossValidation::new(CvKind::ShuffleSplit, 5, 1).unwrap();
        let splits = cv.splits(&labels(), 0).unwrap();
        assert_eq!(splits.len(), 5);
        for split in &splits {
            assert_eq!(split.test.len(), 4);
            assert_eq!(split.train.len(), 16);
        }
    }

    #[test]
    fn test_stratified_shuffle_split_sizes() {
        let y = labels();
        let cv = CrossValidation::new(CvKind::StratifiedShuffleSplit, 4, 1).unwrap();
        for split in cv.splits(&y, 1).unwrap() {
            let zeros = split.test.iter().filter(|&&i| y[i] == 0).count();
            let ones = split.test.iter().filter(|&&i| y[i] == 1).count();
            assert_eq!((zeros, ones), (3, 2));
        }
    }

    #[test]
    fn test_repetitions_are_seeded() {
        let cv = CrossValidation::new(CvKind::StratifiedKFold, 5, 3).unwrap();
        let y = labels();
        assert_eq!(cv.splits(&y, 2).unwrap(), cv.splits(&y, 2).unwrap());
        assert_ne!(cv.splits(&y, 0).unwrap(), cv.splits(&y, 1).unwrap());
    }

    #[test]
    fn test_invalid() {
        assert!(matches!(
            CrossValidation::new(CvKind::KFold, 1, 5),
            Err(ClassifyError::InvalidFolds { n_folds: 1, .. })
        ));
        assert!(matches!(
            CrossValidation::new(CvKind::KFold, 5, 0),
            Err(ClassifyError::ZeroRepetitions)
        ));
        let cv = CrossValidation::new(CvKind::KFold, 30, 1).unwrap();
        assert!(matches!(
            cv.splits(&labels(), 0),
            Err(ClassifyError::InvalidFolds { n_folds: 30, n_samples: 20 })
        ));
    }

    #[test]
    fn test_descriptor() {
        let cv = CrossValidation::new(CvKind::KFold, 5, 10).unwrap();
        assert_eq!(cv.descriptor().long_name, "10-times, 5 k-folds");
        assert_eq!(cv.descriptor().short_name, "10rep x5 kfold");
        assert_eq!(cv.to_string(), "10-times, 5 k-folds");
        let cv = CrossValidation::default();
        assert_eq!(cv.descriptor().long_name, "10-times, 10 Stratified k-folds");
    }

    #[test]
    fn test_kind_codes() {
        for kind in [CvKind::StratifiedKFold, CvKind::KFold, CvKind::StratifiedShuffleSplit, CvKind::ShuffleSplit] {
            assert_eq!(kind.code().parse::<CvKind>().unwrap(), kind);
        }
        assert!("loo".parse::<CvKind>().is_err());
    }
}
