//! End-to-end decoding tests across classifiers and splitters.

use ndarray::Array2;
use neuropac_classify::{
    ClassifierKind, ClassifyError, CrossValidation, CvKind, Decoder, FeatureMode, Jobs,
};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::num::NonZeroUsize;

/// Three classes, 30 trials each. Feature 0 shifts the class means far
/// apart, feature 1 shifts them slightly, feature 2 is pure noise.
fn three_class(seed: u64) -> (Array2<f64>, Vec<usize>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let y: Vec<usize> = (0..90).map(|i| i / 30).collect();
    let x = Array2::from_shape_fn((90, 3), |(i, f)| {
        let noise: f64 = rng.random_range(-1.0..1.0);
        match f {
            0 => 10.0 * y[i] as f64 + noise,
            1 => 0.3 * y[i] as f64 + noise,
            _ => noise,
        }
    });
    (x, y)
}

#[test]
fn test_all_classifiers_decode_separable_feature() {
    let (x, y) = three_class(1);
    let cv = CrossValidation::new(CvKind::StratifiedKFold, 5, 2).unwrap();

    for kind in ClassifierKind::ALL {
        let kind = match kind {
            ClassifierKind::RandomForest { .. } => ClassifierKind::RandomForest { trees: 25 },
            other => other,
        };
        let acc = Decoder::new(kind, cv)
            .fit(x.view(), &y, FeatureMode::Single, Jobs::SERIAL)
            .unwrap();
        assert_eq!(acc.dim(), (3, 2));
        assert!(acc.row(0).iter().all(|&a| a > 95.0), "{kind:?}: {acc}");
        // Chance is 33%.
        assert!(acc.row(2).iter().all(|&a| a < 70.0), "{kind:?}: {acc}");
    }
}

#[test]
fn test_all_splitters_run() {
    let (x, y) = three_class(2);
    for kind in [
        CvKind::StratifiedKFold,
        CvKind::KFold,
        CvKind::StratifiedShuffleSplit,
        CvKind::ShuffleSplit,
    ] {
        let cv = CrossValidation::new(kind, 3, 4).unwrap();
        let acc = Decoder::new(ClassifierKind::Lda, cv)
            .fit(x.view(), &y, FeatureMode::Multi, Jobs::SERIAL)
            .unwrap();
        assert_eq!(acc.dim(), (1, 4), "{kind}");
        assert!(acc.iter().all(|&a| (0.0..=100.0).contains(&a)));
        assert!(acc.iter().all(|&a| a > 90.0), "{kind}: {acc}");
    }
}

#[test]
fn test_parallel_matches_serial() {
    let (x, y) = three_class(3);
    let cv = CrossValidation::new(CvKind::ShuffleSplit, 4, 6).unwrap();
    let decoder = Decoder::new(ClassifierKind::Knn { neighbors: 3 }, cv);

    let serial = decoder.fit(x.view(), &y, FeatureMode::Single, Jobs::SERIAL).unwrap();
    let jobs = Jobs::Fixed(NonZeroUsize::new(4).unwrap());
    let parallel = decoder.fit(x.view(), &y, FeatureMode::Single, jobs).unwrap();
    assert_eq!(serial, parallel);
}

#[test]
fn test_worker_failure_aborts_batch() {
    let (x, y) = three_class(4);
    let cv = CrossValidation::new(CvKind::KFold, 3, 2).unwrap();
    let decoder = Decoder::new(ClassifierKind::Knn { neighbors: 0 }, cv);

    let err = decoder
        .fit(x.view(), &y, FeatureMode::Single, Jobs::All)
        .unwrap_err();
    match err {
        ClassifyError::WorkerTask { source, .. } => {
            assert!(matches!(*source, ClassifyError::ZeroNeighbors));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_too_many_folds() {
    let (x, y) = three_class(5);
    let cv = CrossValidation::new(CvKind::KFold, 100, 1).unwrap();
    let err = Decoder::new(ClassifierKind::Lda, cv)
        .fit(x.view(), &y, FeatureMode::Multi, Jobs::SERIAL)
        .unwrap_err();
    assert!(matches!(
        err,
        ClassifyError::InvalidFolds { n_folds: 100, n_samples: 90 }
    ));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Stratified k-fold tests every sample exactly once, for any label set.
    #[test]
    fn stratified_folds_partition(
        labels in prop::collection::vec(0usize..4, 10..60),
        n_folds in 2usize..6,
        rep in 0usize..20,
    ) {
        let cv = CrossValidation::new(CvKind::StratifiedKFold, n_folds, 1).unwrap();
        let splits = cv.splits(&labels, rep).unwrap();
        let mut tested = vec![0; labels.len()];
        for split in &splits {
            for &i in &split.test {
                tested[i] += 1;
            }
            prop_assert!(split.train.iter().all(|i| !split.test.contains(i)));
        }
        prop_assert!(tested.iter().all(|&c| c == 1));
    }
}
