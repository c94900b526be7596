//! Figure layout: subplot grids, axis styling, reference lines and colours.

use ndarray::{ArrayView3, ArrayViewD, Axis, Ix3};
use plotters::style::RGBColor;

use crate::PlotError;

/// Default cap on the number of panels in one figure.
pub const DEFAULT_MAX_PANELS: usize = 10;

/// Class colours, used in order and cycled.
pub const DEFAULT_COLORS: [RGBColor; 8] = [
    RGBColor(0, 0, 139),     // darkblue
    RGBColor(0, 100, 0),     // darkgreen
    RGBColor(139, 0, 0),     // darkred
    RGBColor(255, 140, 0),   // darkorange
    RGBColor(128, 0, 128),   // purple
    RGBColor(255, 215, 0),   // gold
    RGBColor(105, 105, 105), // dimgray
    RGBColor(0, 0, 0),       // black
];

/// Default colour of vertical reference lines.
pub const GRAY: RGBColor = RGBColor(128, 128, 128);

/// Colour `index` of `palette`, cycling. Falls back to [`DEFAULT_COLORS`]
/// when `palette` is empty.
pub fn pick_color(palette: &[RGBColor], index: usize) -> RGBColor {
    let palette = if palette.is_empty() { &DEFAULT_COLORS[..] } else { palette };
    palette[index % palette.len()]
}

/// Rows and columns of a subplot grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubplotGrid {
    /// Grid rows.
    pub rows: usize,
    /// Grid columns.
    pub cols: usize,
}

impl SubplotGrid {
    /// Grid for `n` panels.
    ///
    /// Fewer than four panels sit on one row. Otherwise the column count is
    /// `round(sqrt(n))` and rows are added until every panel fits.
    pub fn for_panels(n: usize, max_panels: usize) -> Result<Self, PlotError> {
        if n == 0 {
            return Err(PlotError::EmptyInput);
        }
        if n > max_panels {
            return Err(PlotError::TooManyPanels {
                requested: n,
                max: max_panels,
            });
        }
        if n < 4 {
            return Ok(Self { rows: 1, cols: n });
        }

        let cols = (n as f64).sqrt().round() as usize;
        let mut rows = (n as f64 / cols as f64).round() as usize;
        while rows * cols < n {
            rows += 1;
        }
        Ok(Self { rows, cols })
    }

    /// Number of cells.
    pub fn cells(&self) -> usize {
        self.rows * self.cols
    }
}

/// View any 1-D, 2-D or 3-D array as `(panels, rows, cols)`.
///
/// A vector becomes one panel with one column, a matrix one panel.
pub fn to_panels(y: ArrayViewD<'_, f64>) -> Result<ArrayView3<'_, f64>, PlotError> {
    let found = y.ndim();
    let y = match found {
        1 => y.insert_axis(Axis(0)).insert_axis(Axis(2)),
        2 => y.insert_axis(Axis(0)),
        3 => y,
        _ => return Err(PlotError::Rank { found }),
    };
    if y.is_empty() {
        return Err(PlotError::EmptyInput);
    }
    y.into_dimensionality::<Ix3>().map_err(|_| PlotError::Rank { found })
}

/// Stroke of a reference line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineStyle {
    /// Stroke colour.
    pub color: RGBColor,
    /// Stroke width in pixels.
    pub width: u32,
    /// Dashed instead of solid.
    pub dashed: bool,
}

impl LineStyle {
    /// Grey dashed, width 1.
    pub const VERTICAL: LineStyle = LineStyle {
        color: GRAY,
        width: 1,
        dashed: true,
    };

    /// Black solid, width 1.
    pub const HORIZONTAL: LineStyle = LineStyle {
        color: RGBColor(0, 0, 0),
        width: 1,
        dashed: false,
    };
}

/// Vertical and horizontal lines drawn across a panel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceLines {
    /// `(x, style)` of each vertical line.
    pub vertical: Vec<(f64, LineStyle)>,
    /// `(y, style)` of each horizontal line.
    pub horizontal: Vec<(f64, LineStyle)>,
}

impl ReferenceLines {
    /// No lines.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a vertical line with the default style.
    pub fn vertical(self, x: f64) -> Self {
        self.vertical_styled(x, LineStyle::VERTICAL)
    }

    /// Add a vertical line.
    pub fn vertical_styled(mut self, x: f64, style: LineStyle) -> Self {
        self.vertical.push((x, style));
        self
    }

    /// Add a horizontal line with the default style.
    pub fn horizontal(self, y: f64) -> Self {
        self.horizontal_styled(y, LineStyle::HORIZONTAL)
    }

    /// Add a horizontal line.
    pub fn horizontal_styled(mut self, y: f64, style: LineStyle) -> Self {
        self.horizontal.push((y, style));
        self
    }

    /// True when there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.vertical.is_empty() && self.horizontal.is_empty()
    }
}

/// Title, labels and limits of one set of axes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AxesStyle {
    /// Panel title.
    pub title: String,
    /// X-axis label.
    pub x_label: String,
    /// Y-axis label.
    pub y_label: String,
    /// Fixed x limits; fitted to the data when `None`.
    pub x_range: Option<(f64, f64)>,
    /// Fixed y limits; fitted to the data when `None`.
    pub y_range: Option<(f64, f64)>,
}

impl AxesStyle {
    /// Set the title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set both axis labels.
    pub fn labels(mut self, x: impl Into<String>, y: impl Into<String>) -> Self {
        self.x_label = x.into();
        self.y_label = y.into();
        self
    }

    /// Fix the x limits.
    pub fn x_range(mut self, lo: f64, hi: f64) -> Self {
        self.x_range = Some((lo, hi));
        self
    }

    /// Fix the y limits.
    pub fn y_range(mut self, lo: f64, hi: f64) -> Self {
        self.y_range = Some((lo, hi));
        self
    }
}

/// Finite `(min, max)` of `values`, widened when degenerate.
pub(crate) fn fit_range(values: impl IntoIterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !lo.is_finite() {
        return (0.0, 1.0);
    }
    if hi - lo < 1e-12 {
        let pad = if lo.abs() > 0.0 { lo.abs() * 0.05 } else { 0.5 };
        return (lo - pad, hi + pad);
    }
    (lo, hi)
}
