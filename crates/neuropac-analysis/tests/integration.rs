//! Integration tests for neuropac-analysis crate.
//!
//! Exercises the public coupling pipeline end to end on synthetic data:
//! tensor shapes, p-value bounds, window/trial ordering, input validation
//! and determinism across worker counts.

use std::num::NonZeroUsize;

use ndarray::{Array2, Array3, s};
use neuropac_analysis::synthetic::SyntheticPac;
use neuropac_analysis::{
    Cfc, CfcError, FrequencyBand, Jobs, Preprocessor, SignalInput, WindowIndex, WindowSet, p_values, regroup,
};
use neuropac_analysis::preprocess::{AmplitudeExtractor, PhaseExtractor};
use neuropac_registry::{ModelId, Normalization, RegistryError};
use rand::SeedableRng;
use rand::rngs::StdRng;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const SAMPLE_RATE: f64 = 500.0;

/// `(samples, trials)` coupled data.
fn dataset(n_samples: usize, n_trials: usize, seed: u64) -> Array2<f64> {
    SyntheticPac::new(SAMPLE_RATE, n_samples).generate(n_trials, &mut StdRng::seed_from_u64(seed))
}

fn engine(n_samples: usize) -> neuropac_analysis::CfcBuilder {
    Cfc::builder(SAMPLE_RATE, n_samples).seed(1234)
}

// ===========================================================================
// 1. Shape invariant
// ===========================================================================

#[test]
fn coupling_shape_matches_windows_trials_and_bands() {
    let windows = WindowSet::sliding(1000, 400, 200).unwrap();
    let phase_bands = vec![FrequencyBand::new(4.0, 8.0), FrequencyBand::new(8.0, 13.0)];
    let amplitude_bands = vec![
        FrequencyBand::new(30.0, 60.0),
        FrequencyBand::new(60.0, 90.0),
        FrequencyBand::new(90.0, 120.0),
    ];
    let x = dataset(1000, 5, 0);

    for model in ["110", "210", "310", "410"] {
        let cfc = engine(1000)
            .model(model.parse().unwrap())
            .windows(windows.clone())
            .phase_bands(phase_bands.clone())
            .amplitude_bands(amplitude_bands.clone())
            .build()
            .unwrap();
        let coupling = cfc.compute(SignalInput::shared(x.clone())).unwrap();
        assert_eq!(coupling.dim(), (windows.len(), 5, 3, 2), "model {model}");
    }
}

#[test]
fn multi_row_input_multiplies_bands() {
    // Two rows through one phase band and two amplitude bands.
    let x = Array3::from_shape_fn((2, 600, 3), |(r, i, t)| {
        ((i as f64) * 0.2 + r as f64).sin() + 0.1 * ((i * (t + 1)) as f64 * 0.7).cos()
    });
    let cfc = engine(600)
        .amplitude_bands(vec![FrequencyBand::new(30.0, 60.0), FrequencyBand::new(60.0, 90.0)])
        .build()
        .unwrap();
    let coupling = cfc.compute(SignalInput::shared(x)).unwrap();
    assert_eq!(coupling.dim(), (1, 3, 4, 2));
}

// ===========================================================================
// 2. P-value bounds
// ===========================================================================

#[test]
fn p_values_lie_in_unit_interval() {
    let cfc = engine(1000)
        .windows(WindowSet::sliding(1000, 500, 250).unwrap())
        .n_perm(40)
        .build()
        .unwrap();
    let result = cfc.compute_with_surrogates(SignalInput::shared(dataset(1000, 4, 1))).unwrap();
    let p = result.p_values().unwrap();

    assert_eq!(p.dim(), result.coupling.dim());
    assert!(p.iter().all(|&v| v > 0.0 && v <= 1.0));
    // Every p-value is a multiple of 1 / n_perm.
    assert!(p.iter().all(|&v| ((v * 40.0).round() - v * 40.0).abs() < 1e-9));
}

#[test]
fn zero_exceedances_report_one_over_n_perm() {
    let result = engine(1000)
        .n_perm(200)
        .build()
        .unwrap()
        .compute_with_surrogates(SignalInput::shared(dataset(1000, 4, 2)))
        .unwrap();

    let mut coupling = result.coupling.clone();
    coupling.fill(f64::MAX);
    let p = p_values(&coupling, &result.surrogates).unwrap();
    assert!(p.iter().all(|&v| v == 1.0 / 200.0));
}

// ===========================================================================
// 3. Regrouping order
// ===========================================================================

#[test]
fn regrouping_reconstructs_window_major_groups() {
    let index = WindowIndex::enumerate(3, 2);
    let values: Vec<String> = index
        .cells()
        .iter()
        .map(|c| format!("w{}t{}", c.window, c.trial))
        .collect();

    let groups = regroup(values, &index.window_ids());
    assert_eq!(
        groups,
        vec![
            vec!["w0t0".to_string(), "w0t1".to_string()],
            vec!["w1t0".to_string(), "w1t1".to_string()],
            vec!["w2t0".to_string(), "w2t1".to_string()],
        ]
    );
}

#[test]
fn coupling_axes_follow_window_and_trial_order() {
    // Trial 1 is the only coupled trial; its cells must land on axis-1 index 1
    // in every window.
    let n = 1500;
    let coupled = SyntheticPac::new(SAMPLE_RATE, n).coupling(1.0).noise(0.0);
    let flat = SyntheticPac::new(SAMPLE_RATE, n).coupling(0.0).noise(0.0);
    let mut x = Array2::zeros((n, 3));
    x.column_mut(0).assign(&flat.generate(1, &mut StdRng::seed_from_u64(3)).column(0));
    x.column_mut(1).assign(&coupled.generate(1, &mut StdRng::seed_from_u64(4)).column(0));
    x.column_mut(2).assign(&flat.generate(1, &mut StdRng::seed_from_u64(5)).column(0));

    let windows = WindowSet::sliding(n, 500, 500).unwrap();
    let coupling = engine(n).windows(windows).build().unwrap().compute(SignalInput::shared(x)).unwrap();

    for w in 0..3_usize {
        let row: ndarray::ArrayView1<f64> = coupling.slice(s![w, .., 0, 0]);
        assert!(row[1] > row[0] && row[1] > row[2], "window {w}: {row:?}");
    }
}

// ===========================================================================
// 4/5. Input validation
// ===========================================================================

#[test]
fn dimension_mismatch_detected_before_filtering() {
    let cfc = engine(100).phase_bands(vec![FrequencyBand::new(4.0, 8.0)]).build().unwrap();
    let err = cfc.compute(SignalInput::shared(Array3::<f64>::zeros((1, 90, 4)))).unwrap_err();
    assert!(matches!(err, CfcError::Dimension { expected: 100, found: 90 }));
    assert!(err.to_string().contains("100"));

    let pre = Preprocessor::new(
        SAMPLE_RATE,
        100,
        PhaseExtractor::new(vec![FrequencyBand::new(4.0, 8.0)]),
        AmplitudeExtractor::new(vec![FrequencyBand::new(30.0, 60.0)]),
    )
    .unwrap();
    assert!(matches!(
        pre.extract(Array2::<f64>::zeros((99, 2)).into()),
        Err(CfcError::Dimension { expected: 100, found: 99 })
    ));
}

#[test]
fn shape_mismatch_detected() {
    let cfc = engine(100).build().unwrap();
    let input = SignalInput::split(Array3::<f64>::zeros((1, 100, 5)), Array3::<f64>::zeros((1, 100, 4)));
    let err = cfc.compute(input).unwrap_err();
    match err {
        CfcError::ShapeMismatch { phase, amplitude } => {
            assert_eq!(phase, vec![1, 100, 5]);
            assert_eq!(amplitude, vec![1, 100, 4]);
        }
        other => panic!("expected ShapeMismatch, got {other:?}"),
    }
}

#[test]
fn unknown_model_fails_at_lookup() {
    assert!(matches!(
        "519".parse::<ModelId>(),
        Err(RegistryError::UnknownModel(ref id)) if id == "519"
    ));
}

// ===========================================================================
// 6. End-to-end scenario
// ===========================================================================

#[test]
fn end_to_end_single_window_four_trials() {
    let cfc = engine(1000).n_perm(200).build().unwrap();
    let result = cfc.compute_with_surrogates(SignalInput::shared(dataset(1000, 4, 7))).unwrap();

    assert_eq!(result.coupling.dim(), (1, 4, 1, 1));
    assert_eq!(result.surrogates.len(), 1);
    assert_eq!(result.surrogates[0].dim(), (4, 1, 1, 200));

    let p = result.p_values().unwrap();
    assert_eq!(p.dim(), (1, 4, 1, 1));
    assert!(p.iter().all(|&v| v > 0.0 && v <= 1.0));

    let z = result.normalized(Normalization::ZScore).unwrap();
    assert_eq!(z.dim(), (1, 4, 1, 1));
}

#[test]
fn split_sources_are_used_for_their_roles() {
    let phase_source = dataset(1000, 4, 8);
    let amplitude_source = dataset(1000, 4, 9);
    let cfc = engine(1000).build().unwrap();

    let split = cfc
        .compute(SignalInput::split(phase_source.clone(), amplitude_source.clone()))
        .unwrap();
    let shared = cfc.compute(SignalInput::shared(phase_source)).unwrap();
    assert_eq!(split.dim(), shared.dim());
    assert_ne!(split, shared);
}

// ===========================================================================
// 7. Determinism under concurrency
// ===========================================================================

#[test]
fn jobs_one_and_four_give_identical_results() {
    let x = dataset(1200, 5, 10);
    let run = |jobs: Jobs| {
        engine(1200)
            .model("213".parse().unwrap())
            .windows(WindowSet::sliding(1200, 300, 300).unwrap())
            .n_perm(25)
            .jobs(jobs)
            .build()
            .unwrap()
            .compute_with_surrogates(SignalInput::shared(x.clone()))
            .unwrap()
    };

    let one = run(Jobs::Fixed(NonZeroUsize::new(1).unwrap()));
    let four = run(Jobs::Fixed(NonZeroUsize::new(4).unwrap()));
    let all = run(Jobs::All);

    assert_eq!(one.coupling.dim(), four.coupling.dim());
    assert_eq!(one, four);
    assert_eq!(one, all);
}

#[test]
fn different_seeds_change_surrogates_only() {
    let x = dataset(800, 4, 11);
    let run = |seed: u64| {
        engine(800)
            .seed(seed)
            .n_perm(20)
            .build()
            .unwrap()
            .compute_with_surrogates(SignalInput::shared(x.clone()))
            .unwrap()
    };
    let a = run(1);
    let b = run(2);
    assert_eq!(a.coupling, b.coupling);
    assert_ne!(a.surrogates, b.surrogates);
}

#[test]
fn every_surrogate_scheme_runs() {
    let x = dataset(600, 3, 12);
    for model in ["111", "121", "131", "441"] {
        let result = engine(600)
            .model(model.parse().unwrap())
            .n_perm(10)
            .build()
            .unwrap()
            .compute_with_surrogates(SignalInput::shared(x.clone()))
            .unwrap();
        assert_eq!(result.surrogates[0].dim(), (3, 1, 1, 10), "model {model}");
        assert!(result.std[0].iter().all(|v| v.is_finite() && *v >= 0.0));
    }
}
