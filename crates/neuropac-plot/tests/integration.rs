//! Figure pipeline tests: coupling-shaped data through the renderers.

use ndarray::{Array2, Array3};
use neuropac_plot::{
    AxesStyle, BorderPlotOptions, Deviation, HeatmapOptions, PanelOptions, PlotError,
    ReferenceLines, SubplotGrid, border_bands, render_border_plot, render_heatmap, render_panels,
};
use proptest::prelude::*;

#[test]
fn test_class_bands_separate() {
    // Class 1 sits 2.0 above class 0 at every time point.
    let labels: Vec<usize> = (0..20).map(|j| j % 2).collect();
    let x = Array2::from_shape_fn((30, 20), |(i, j)| {
        i as f64 * 0.1 + 2.0 * labels[j] as f64 + 0.01 * (j / 2) as f64
    });
    let bands = border_bands(x.view(), Some(&labels), Deviation::Sem).unwrap();
    assert_eq!(bands.len(), 2);
    for t in 0..30 {
        assert!(bands[0].upper[t] < bands[1].lower[t]);
        assert!((bands[1].mean[t] - bands[0].mean[t] - 2.0).abs() < 1e-9);
    }
}

#[test]
fn test_comodulogram_heatmap() {
    // (windows, amplitude bands, phase bands)
    let z = Array3::from_shape_fn((3, 5, 4), |(w, a, p)| (w + a * p) as f64 / 20.0);
    let phase_hz = [4.0, 6.0, 8.0, 10.0];
    let amp_hz = [40.0, 50.0, 60.0, 70.0, 80.0];
    let options = HeatmapOptions {
        axes: AxesStyle::default().labels("Phase (Hz)", "Amplitude (Hz)"),
        title: "Comodulogram".into(),
        value_range: Some((0.0, 1.0)),
        ..HeatmapOptions::default()
    };
    let svg = render_heatmap(z.view().into_dyn(), Some(&phase_hz), Some(&amp_hz), &options).unwrap();
    assert!(svg.contains("Comodulogram"));
    assert!(svg.contains("Amplitude (Hz)"));
}

#[test]
fn test_panel_limit_is_configurable() {
    let y = Array3::from_shape_fn((12, 16, 1), |(p, i, _)| (p * i) as f64);
    let strict = PanelOptions::default();
    assert!(matches!(
        render_panels(y.view().into_dyn(), None, &strict),
        Err(PlotError::TooManyPanels { requested: 12, .. })
    ));
    let relaxed = PanelOptions {
        max_panels: 12,
        lines: ReferenceLines::new().horizontal(0.0),
        ..PanelOptions::default()
    };
    assert!(render_panels(y.view().into_dyn(), None, &relaxed).is_ok());
}

#[test]
fn test_border_plot_std() {
    let time: Vec<f64> = (0..10).map(f64::from).collect();
    let x = Array2::from_shape_fn((3, 10), |(j, i)| (i + j) as f64);
    let options = BorderPlotOptions {
        deviation: Deviation::Std,
        ..BorderPlotOptions::default()
    };
    assert!(render_border_plot(&time, x.view(), None, &options).is_ok());
}

proptest! {
    /// The grid always has room for every panel and never a spare row.
    #[test]
    fn grid_fits_panels(n in 1usize..200) {
        let grid = SubplotGrid::for_panels(n, 200).unwrap();
        prop_assert!(grid.cells() >= n);
        prop_assert!((grid.rows - 1) * grid.cols < n);
    }
}
