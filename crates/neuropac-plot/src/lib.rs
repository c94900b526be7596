//! Neuropac Plot - figures for coupling and decoding results
//!
//! Pure data preparation ([`border_bands`], [`SubplotGrid`]) is kept apart
//! from drawing, so the numbers behind a figure can be tested without
//! rendering it. The renderers produce standalone SVG documents through
//! the `plotters` SVG backend.
//!
//! ## Example
//!
//! ```rust
//! use ndarray::Array2;
//! use neuropac_plot::{BorderPlotOptions, ReferenceLines, render_border_plot};
//!
//! let time: Vec<f64> = (0..100).map(|i| i as f64 / 100.0).collect();
//! let trials = Array2::from_shape_fn((100, 8), |(i, j)| (time[i] * 10.0).sin() + 0.05 * j as f64);
//!
//! let options = BorderPlotOptions {
//!     lines: ReferenceLines::new().vertical(0.5),
//!     ..BorderPlotOptions::default()
//! };
//! let svg = render_border_plot(&time, trials.view(), None, &options).unwrap();
//! assert!(svg.contains("<svg"));
//! ```

pub mod border;
pub mod error;
pub mod layout;
pub mod render;

pub use border::{BorderBand, Deviation, border_bands, orient};
pub use error::PlotError;
pub use layout::{
    AxesStyle, DEFAULT_COLORS, DEFAULT_MAX_PANELS, GRAY, LineStyle, ReferenceLines, SubplotGrid,
    pick_color, to_panels,
};
pub use plotters::style::RGBColor;
pub use render::{
    BorderPlotOptions, DEFAULT_SIZE, HeatmapOptions, PanelKind, PanelOptions, render_border_plot,
    render_heatmap, render_panels,
};
