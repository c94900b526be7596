//! SVG rendering of border plots, multi-panel line plots and heatmaps.
//!
//! Every renderer returns the finished SVG document as a `String`; writing
//! it to disk is left to the caller.

use ndarray::{ArrayView2, ArrayViewD, Axis};
use plotters::coord::Shift;
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;
use tracing::debug;

use crate::border::{Deviation, border_bands, orient};
use crate::error::render_err;
use crate::layout::{
    AxesStyle, DEFAULT_MAX_PANELS, LineStyle, ReferenceLines, SubplotGrid, fit_range, pick_color,
    to_panels,
};
use crate::PlotError;

/// Default figure size in pixels.
pub const DEFAULT_SIZE: (u32, u32) = (960, 640);

type Area<'b> = DrawingArea<SVGBackend<'b>, Shift>;
type Chart<'a, 'b> = ChartContext<'a, SVGBackend<'b>, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

/// Options for [`render_border_plot`].
#[derive(Debug, Clone, PartialEq)]
pub struct BorderPlotOptions {
    /// Title, labels and limits.
    pub axes: AxesStyle,
    /// Envelope width.
    pub deviation: Deviation,
    /// One colour per class; the default palette when empty.
    pub colors: Vec<RGBColor>,
    /// Opacity of the envelope.
    pub alpha: f64,
    /// Width of the mean curves.
    pub line_width: u32,
    /// One legend entry per class. No legend when empty.
    pub legend: Vec<String>,
    /// Lines drawn over the data.
    pub lines: ReferenceLines,
    /// Figure size in pixels.
    pub size: (u32, u32),
}

impl Default for BorderPlotOptions {
    fn default() -> Self {
        Self {
            axes: AxesStyle::default(),
            deviation: Deviation::Sem,
            colors: Vec::new(),
            alpha: 0.2,
            line_width: 2,
            legend: Vec::new(),
            lines: ReferenceLines::default(),
            size: DEFAULT_SIZE,
        }
    }
}

/// Marks used by [`render_panels`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanelKind {
    /// Connected lines.
    #[default]
    Line,
    /// Unconnected points.
    Scatter,
}

/// Options for [`render_panels`].
#[derive(Debug, Clone, PartialEq)]
pub struct PanelOptions {
    /// Styling shared by every panel.
    pub axes: AxesStyle,
    /// Figure title above all panels.
    pub title: String,
    /// Lines or points.
    pub kind: PanelKind,
    /// Refuse to draw more panels than this.
    pub max_panels: usize,
    /// Series colours; the default palette when empty.
    pub colors: Vec<RGBColor>,
    /// Lines drawn over every panel.
    pub lines: ReferenceLines,
    /// Figure size in pixels.
    pub size: (u32, u32),
}

impl Default for PanelOptions {
    fn default() -> Self {
        Self {
            axes: AxesStyle::default(),
            title: String::new(),
            kind: PanelKind::Line,
            max_panels: DEFAULT_MAX_PANELS,
            colors: Vec::new(),
            lines: ReferenceLines::default(),
            size: DEFAULT_SIZE,
        }
    }
}

/// Options for [`render_heatmap`].
#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapOptions {
    /// Styling shared by every panel.
    pub axes: AxesStyle,
    /// Figure title above all panels.
    pub title: String,
    /// Refuse to draw more panels than this.
    pub max_panels: usize,
    /// Colour scale limits; fitted to the data when `None`.
    pub value_range: Option<(f64, f64)>,
    /// Draw a colour bar next to each panel.
    pub colorbar: bool,
    /// Figure size in pixels.
    pub size: (u32, u32),
}

impl Default for HeatmapOptions {
    fn default() -> Self {
        Self {
            axes: AxesStyle::default(),
            title: String::new(),
            max_panels: DEFAULT_MAX_PANELS,
            value_range: None,
            colorbar: true,
            size: DEFAULT_SIZE,
        }
    }
}

/// Mean curve and deviation envelope of `x` against `time`, one curve per class.
///
/// `x` holds one observation per column and one time point per row; it
/// is transposed when its columns match `time` instead.
pub fn render_border_plot(
    time: &[f64],
    x: ArrayView2<f64>,
    labels: Option<&[usize]>,
    options: &BorderPlotOptions,
) -> Result<String, PlotError> {
    let x = orient(x, time.len())?;
    let bands = border_bands(x, labels, options.deviation)?;

    let x_range = options
        .axes
        .x_range
        .unwrap_or_else(|| fit_range(time.iter().copied()));
    let y_range = options.axes.y_range.unwrap_or_else(|| {
        fit_range(
            bands
                .iter()
                .flat_map(|b| b.lower.iter().chain(&b.upper).copied()),
        )
    });
    debug!(classes = bands.len(), points = time.len(), "rendering border plot");

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, options.size).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;
        let mut chart = build_chart(&root, &options.axes, x_range, y_range)?;

        for (i, band) in bands.iter().enumerate() {
            let color = pick_color(&options.colors, i);

            let envelope: Vec<(f64, f64)> = time
                .iter()
                .copied()
                .zip(band.upper.iter().copied())
                .chain(time.iter().copied().zip(band.lower.iter().copied()).rev())
                .collect();
            chart
                .draw_series(std::iter::once(Polygon::new(
                    envelope,
                    color.mix(options.alpha).filled(),
                )))
                .map_err(render_err)?;

            let curve = time.iter().copied().zip(band.mean.iter().copied());
            let series = chart
                .draw_series(LineSeries::new(curve, color.stroke_width(options.line_width)))
                .map_err(render_err)?;
            if let Some(name) = options.legend.get(i) {
                series
                    .label(name.as_str())
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
            }
        }

        draw_reference_lines(&mut chart, &options.lines, x_range, y_range)?;
        if !options.legend.is_empty() {
            chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()
                .map_err(render_err)?;
        }
        root.present().map_err(render_err)?;
    }
    Ok(svg)
}

/// One line plot per panel.
///
/// `y` may be a vector (one panel, one series), a matrix (one panel, one
/// series per column) or a 3-D array whose first axis selects the panel.
/// `x` defaults to sample indices.
pub fn render_panels(
    y: ArrayViewD<f64>,
    x: Option<&[f64]>,
    options: &PanelOptions,
) -> Result<String, PlotError> {
    let panels = to_panels(y)?;
    let (n_panels, n_points, _) = panels.dim();
    let grid = SubplotGrid::for_panels(n_panels, options.max_panels)?;
    let x = axis_vector(x, n_points)?;
    let x_range = options
        .axes
        .x_range
        .unwrap_or_else(|| fit_range(x.iter().copied()));
    debug!(panels = n_panels, rows = grid.rows, cols = grid.cols, "rendering panels");

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, options.size).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;
        let root = titled(root, &options.title)?;
        let areas = root.split_evenly((grid.rows, grid.cols));

        for (panel, area) in panels.outer_iter().zip(&areas) {
            let y_range = options
                .axes
                .y_range
                .unwrap_or_else(|| fit_range(panel.iter().copied()));
            let mut chart = build_chart(area, &options.axes, x_range, y_range)?;

            for (j, column) in panel.axis_iter(Axis(1)).enumerate() {
                let color = pick_color(&options.colors, j);
                let points = x.iter().copied().zip(column.iter().copied());
                let drawn = match options.kind {
                    PanelKind::Line => chart
                        .draw_series(LineSeries::new(points, color.stroke_width(1)))
                        .map(|_| ()),
                    PanelKind::Scatter => chart
                        .draw_series(points.map(|p| Circle::new(p, 2, color.filled())))
                        .map(|_| ()),
                };
                drawn.map_err(render_err)?;
            }
            draw_reference_lines(&mut chart, &options.lines, x_range, y_range)?;
        }
        root.present().map_err(render_err)?;
    }
    Ok(svg)
}

/// One image per panel, e.g. a comodulogram of amplitude x phase bands.
///
/// Panels are `(rows, cols)` matrices laid out like [`render_panels`].
/// Row 0 is drawn at the bottom. `x` and `y` give the cell centres along
/// columns and rows and default to indices.
pub fn render_heatmap(
    z: ArrayViewD<f64>,
    x: Option<&[f64]>,
    y: Option<&[f64]>,
    options: &HeatmapOptions,
) -> Result<String, PlotError> {
    let panels = to_panels(z)?;
    let (n_panels, n_rows, n_cols) = panels.dim();
    let grid = SubplotGrid::for_panels(n_panels, options.max_panels)?;
    let x_edges = cell_edges(&axis_vector(x, n_cols)?);
    let y_edges = cell_edges(&axis_vector(y, n_rows)?);
    let (lo, hi) = options
        .value_range
        .unwrap_or_else(|| fit_range(panels.iter().copied()));
    let x_range = options.axes.x_range.unwrap_or_else(|| fit_range(x_edges.iter().copied()));
    let y_range = options.axes.y_range.unwrap_or_else(|| fit_range(y_edges.iter().copied()));
    debug!(panels = n_panels, n_rows, n_cols, lo, hi, "rendering heatmap");

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, options.size).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;
        let root = titled(root, &options.title)?;
        let areas = root.split_evenly((grid.rows, grid.cols));

        for (panel, area) in panels.outer_iter().zip(&areas) {
            let (image_area, bar_area) = if options.colorbar {
                let (width, _) = area.dim_in_pixel();
                let (image, bar) = area.split_horizontally(width.saturating_sub(70) as i32);
                (image, Some(bar))
            } else {
                (area.clone(), None)
            };

            let mut chart = build_chart(&image_area, &options.axes, x_range, y_range)?;
            let cells = panel.indexed_iter().map(|((r, c), &v)| {
                Rectangle::new(
                    [(x_edges[c], y_edges[r]), (x_edges[c + 1], y_edges[r + 1])],
                    heat_color(v, lo, hi).filled(),
                )
            });
            chart.draw_series(cells).map_err(render_err)?;

            if let Some(bar) = bar_area {
                draw_colorbar(&bar, lo, hi)?;
            }
        }
        root.present().map_err(render_err)?;
    }
    Ok(svg)
}

fn titled<'b>(root: Area<'b>, title: &str) -> Result<Area<'b>, PlotError> {
    if title.is_empty() {
        return Ok(root);
    }
    root.titled(title, ("sans-serif", 22)).map_err(render_err)
}

fn build_chart<'a, 'b>(
    area: &'a Area<'b>,
    axes: &AxesStyle,
    (x_lo, x_hi): (f64, f64),
    (y_lo, y_hi): (f64, f64),
) -> Result<Chart<'a, 'b>, PlotError> {
    let mut builder = ChartBuilder::on(area);
    builder.margin(10).x_label_area_size(35).y_label_area_size(55);
    if !axes.title.is_empty() {
        builder.caption(axes.title.as_str(), ("sans-serif", 18));
    }
    let mut chart = builder
        .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)
        .map_err(render_err)?;
    chart
        .configure_mesh()
        .x_desc(axes.x_label.as_str())
        .y_desc(axes.y_label.as_str())
        .draw()
        .map_err(render_err)?;
    Ok(chart)
}

fn draw_reference_lines(
    chart: &mut Chart<'_, '_>,
    lines: &ReferenceLines,
    (x_lo, x_hi): (f64, f64),
    (y_lo, y_hi): (f64, f64),
) -> Result<(), PlotError> {
    for &(x, style) in &lines.vertical {
        draw_line(chart, (x, y_lo), (x, y_hi), style)?;
    }
    for &(y, style) in &lines.horizontal {
        draw_line(chart, (x_lo, y), (x_hi, y), style)?;
    }
    Ok(())
}

/// Number of dashes along a dashed reference line.
const DASHES: usize = 40;

fn draw_line(
    chart: &mut Chart<'_, '_>,
    from: (f64, f64),
    to: (f64, f64),
    style: LineStyle,
) -> Result<(), PlotError> {
    let stroke = style.color.stroke_width(style.width);
    let segments: Vec<[(f64, f64); 2]> = if style.dashed {
        let at = |t: f64| (from.0 + t * (to.0 - from.0), from.1 + t * (to.1 - from.1));
        let step = 1.0 / (2 * DASHES) as f64;
        (0..DASHES)
            .map(|k| {
                let t = 2.0 * k as f64 * step;
                [at(t), at(t + step)]
            })
            .collect()
    } else {
        vec![[from, to]]
    };
    chart
        .draw_series(segments.into_iter().map(|s| PathElement::new(s.to_vec(), stroke)))
        .map_err(render_err)?;
    Ok(())
}

fn draw_colorbar(area: &Area<'_>, lo: f64, hi: f64) -> Result<(), PlotError> {
    const STEPS: usize = 64;
    let mut chart = ChartBuilder::on(area)
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(45)
        .build_cartesian_2d(0.0..1.0, lo..hi)
        .map_err(render_err)?;
    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(0)
        .draw()
        .map_err(render_err)?;

    let step = (hi - lo) / STEPS as f64;
    chart
        .draw_series((0..STEPS).map(|k| {
            let v0 = lo + k as f64 * step;
            Rectangle::new(
                [(0.0, v0), (1.0, v0 + step)],
                heat_color(v0 + step / 2.0, lo, hi).filled(),
            )
        }))
        .map_err(render_err)?;
    Ok(())
}

/// Blue for `lo`, red for `hi`.
fn heat_color(value: f64, lo: f64, hi: f64) -> HSLColor {
    let t = if value.is_finite() && hi > lo {
        ((value - lo) / (hi - lo)).clamp(0.0, 1.0)
    } else {
        0.0
    };
    HSLColor((1.0 - t) * 240.0 / 360.0, 0.9, 0.5)
}

fn axis_vector(values: Option<&[f64]>, expected: usize) -> Result<Vec<f64>, PlotError> {
    match values {
        Some(v) if v.len() != expected => Err(PlotError::AxisLength {
            expected,
            found: v.len(),
        }),
        Some(v) => Ok(v.to_vec()),
        None => Ok((0..expected).map(|i| i as f64).collect()),
    }
}

/// `n + 1` cell boundaries around `n` cell centres.
fn cell_edges(centers: &[f64]) -> Vec<f64> {
    match centers {
        [] => vec![0.0, 1.0],
        [c] => vec![c - 0.5, c + 0.5],
        _ => {
            let n = centers.len();
            let mut edges = Vec::with_capacity(n + 1);
            edges.push(centers[0] - (centers[1] - centers[0]) / 2.0);
            edges.extend(centers.windows(2).map(|w| (w[0] + w[1]) / 2.0));
            edges.push(centers[n - 1] + (centers[n - 1] - centers[n - 2]) / 2.0);
            edges
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array1, Array2, Array3};

    fn sine_trials() -> (Vec<f64>, Array2<f64>) {
        let time: Vec<f64> = (0..50).map(|i| i as f64 / 50.0).collect();
        let x = Array2::from_shape_fn((50, 6), |(i, j)| {
            (time[i] * 6.0).sin() + 0.1 * j as f64
        });
        (time, x)
    }

    #[test]
    fn test_border_plot_svg() {
        let (time, x) = sine_trials();
        let options = BorderPlotOptions {
            axes: AxesStyle::default().title("Mean").labels("Time (s)", "uV"),
            legend: vec!["odd".into(), "even".into()],
            lines: ReferenceLines::new().vertical(0.5).horizontal(0.0),
            ..BorderPlotOptions::default()
        };
        let labels = [0, 1, 0, 1, 0, 1];
        let svg = render_border_plot(&time, x.view(), Some(&labels), &options).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("<polygon") || svg.contains("<path"));
        assert!(svg.contains("Time (s)"));
        assert!(svg.contains("odd"));
    }

    #[test]
    fn test_border_plot_transposed() {
        let (time, x) = sine_trials();
        let a = render_border_plot(&time, x.view(), None, &BorderPlotOptions::default()).unwrap();
        let b = render_border_plot(&time, x.t(), None, &BorderPlotOptions::default()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_border_plot_time_mismatch() {
        let (_, x) = sine_trials();
        let err = render_border_plot(&[0.0; 7], x.view(), None, &BorderPlotOptions::default());
        assert!(matches!(err, Err(PlotError::TimeAxis { expected: 7, .. })));
    }

    #[test]
    fn test_panels() {
        let y = Array3::from_shape_fn((5, 20, 2), |(p, i, j)| (p + i * j) as f64);
        let svg = render_panels(y.view().into_dyn(), None, &PanelOptions::default()).unwrap();
        assert!(svg.starts_with("<svg"));

        let options = PanelOptions {
            kind: PanelKind::Scatter,
            title: "Scatter".into(),
            ..PanelOptions::default()
        };
        let v = Array1::from_shape_fn(10, |i| i as f64);
        let svg = render_panels(v.view().into_dyn(), None, &options).unwrap();
        assert!(svg.contains("<circle"));
        assert!(svg.contains("Scatter"));
    }

    #[test]
    fn test_panels_limits() {
        let y = Array3::<f64>::zeros((11, 4, 1));
        assert!(matches!(
            render_panels(y.view().into_dyn(), None, &PanelOptions::default()),
            Err(PlotError::TooManyPanels { requested: 11, max: 10 })
        ));
        let y = Array2::<f64>::zeros((4, 2));
        assert!(matches!(
            render_panels(y.view().into_dyn(), Some(&[0.0, 1.0]), &PanelOptions::default()),
            Err(PlotError::AxisLength { expected: 4, found: 2 })
        ));
    }

    #[test]
    fn test_heatmap() {
        let z = Array3::from_shape_fn((2, 4, 6), |(p, r, c)| (p * 24 + r * 6 + c) as f64);
        let svg = render_heatmap(z.view().into_dyn(), None, None, &HeatmapOptions::default()).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("<rect"));
    }

    #[test]
    fn test_cell_edges() {
        assert_eq!(cell_edges(&[1.0, 2.0, 3.0]), vec![0.5, 1.5, 2.5, 3.5]);
        assert_eq!(cell_edges(&[4.0]), vec![3.5, 4.5]);
    }

    #[test]
    fn test_heat_color_ends() {
        let cold = heat_color(0.0, 0.0, 1.0);
        let hot = heat_color(1.0, 0.0, 1.0);
        assert!((cold.0 - 240.0 / 360.0).abs() < 1e-12);
        assert!(hot.0.abs() < 1e-12);
        assert_eq!(heat_color(f64::NAN, 0.0, 1.0).0, cold.0);
    }
}
