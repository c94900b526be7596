//! Property-based tests for neuropac-core primitives.
//!
//! Tests filter stability, length preservation, and phase helpers using
//! proptest for randomized input generation.

use neuropac_core::{BiquadCascade, odd_extend, phase_bin, std_dev, wrap_phase, zscore};
use proptest::prelude::*;
use std::f64::consts::PI;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// For any band inside (0, Nyquist), the Butterworth band-pass produces
    /// finite output for random bounded input.
    #[test]
    fn bandpass_stability(
        low in 1.0f64..40.0f64,
        width in 2.0f64..100.0f64,
        input in prop::collection::vec(-1.0f64..=1.0f64, 16..256),
    ) {
        let sr = 500.0;
        let high = (low + width).min(240.0);
        let mut cascade = BiquadCascade::butterworth_bandpass(low, high, sr);

        for out in cascade.filtfilt(&input) {
            prop_assert!(out.is_finite(), "non-finite output for band {}-{}", low, high);
        }
    }

    /// Forward-backward filtering never changes the signal length.
    #[test]
    fn filtfilt_preserves_length(len in 1usize..300) {
        let mut cascade = BiquadCascade::butterworth_bandpass(4.0, 8.0, 250.0);
        let x = vec![0.25; len];
        prop_assert_eq!(cascade.filtfilt(&x).len(), len);
    }

    /// Odd extension keeps the original samples in the middle.
    #[test]
    fn odd_extend_keeps_signal(
        x in prop::collection::vec(-10.0f64..10.0f64, 2..64),
        pad in 0usize..80,
    ) {
        let ext = odd_extend(&x, pad);
        let p = pad.min(x.len() - 1);
        prop_assert_eq!(ext.len(), x.len() + 2 * p);
        prop_assert_eq!(&ext[p..p + x.len()], &x[..]);
    }

    /// Wrapped angles stay in [-PI, PI) and preserve the angle modulo 2*PI.
    #[test]
    fn wrap_phase_range(angle in -100.0f64..100.0f64) {
        let w = wrap_phase(angle);
        prop_assert!((-PI..PI).contains(&w));
        prop_assert!((angle.sin() - w.sin()).abs() < 1e-9);
        prop_assert!((angle.cos() - w.cos()).abs() < 1e-9);
    }

    /// Phase bins are always valid indices.
    #[test]
    fn phase_bin_in_range(angle in -20.0f64..20.0f64, n_bins in 1usize..64) {
        prop_assert!(phase_bin(angle, n_bins) < n_bins);
    }

    /// Z-scored data of non-constant input has unit deviation.
    #[test]
    fn zscore_unit_deviation(mut x in prop::collection::vec(-5.0f64..5.0f64, 3..64)) {
        prop_assume!(std_dev(&x) > 1e-6);
        zscore(&mut x);
        prop_assert!((std_dev(&x) - 1.0).abs() < 1e-9);
    }
}
