//! Error types for figure preparation and rendering.

use thiserror::Error;

/// Errors raised while shaping data for a figure or drawing it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlotError {
    /// Nothing to draw.
    #[error("input has no samples")]
    EmptyInput,

    /// Array rank outside what the plot accepts.
    #[error("expected an array with 1 to 3 dimensions, found {found}")]
    Rank {
        /// Rank of the input.
        found: usize,
    },

    /// Neither axis of the data matches the time vector.
    #[error("data has shape ({rows}, {cols}) but the time axis has {expected} points")]
    TimeAxis {
        /// Time points.
        expected: usize,
        /// Rows of the data.
        rows: usize,
        /// Columns of the data.
        cols: usize,
    },

    /// Label count differs from the number of observations.
    #[error("{labels} labels for {observations} observations")]
    LabelLength {
        /// Number of labels.
        labels: usize,
        /// Number of observations.
        observations: usize,
    },

    /// An axis vector does not match the data it annotates.
    #[error("axis vector has {found} points, data has {expected}")]
    AxisLength {
        /// Points in the data.
        expected: usize,
        /// Points in the axis vector.
        found: usize,
    },

    /// More panels than the configured maximum.
    #[error("{requested} panels exceed the limit of {max}; raise the panel limit to draw them")]
    TooManyPanels {
        /// Panels needed.
        requested: usize,
        /// Configured maximum.
        max: usize,
    },

    /// The drawing backend failed.
    #[error("rendering failed: {0}")]
    Render(String),
}

/// Map a plotters drawing error.
pub(crate) fn render_err(e: impl std::fmt::Display) -> PlotError {
    PlotError::Render(e.to_string())
}
