//! Analysis windows and the (window, trial) work list.
//!
//! A [`WindowSet`] partitions the time axis into analysis epochs. The
//! [`WindowIndex`] flattens every (window, trial) pair into a single list so
//! that the engine can map over cells without nested loops, and [`regroup`]
//! turns the flat results back into per-window groups.

use std::ops::Range;

use crate::CfcError;

/// A half-open range of samples `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Window {
    /// First sample.
    pub start: usize,
    /// One past the last sample.
    pub end: usize,
}

impl Window {
    /// Create a window.
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Number of samples in the window.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// True if the window holds no samples.
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// The window as a slice range.
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl From<(usize, usize)> for Window {
    fn from((start, end): (usize, usize)) -> Self {
        Self { start, end }
    }
}

/// An ordered, immutable list of windows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowSet {
    windows: Vec<Window>,
}

impl WindowSet {
    /// Create a window set. Windows must be non-empty ranges; bounds against
    /// the sample axis are checked by [`WindowSet::validate`].
    pub fn new(windows: impl IntoIterator<Item = impl Into<Window>>) -> Result<Self, CfcError> {
        let windows: Vec<Window> = windows.into_iter().map(Into::into).collect();
        if windows.is_empty() {
            return Err(CfcError::NoWindows);
        }
        if let Some((index, w)) = windows.iter().enumerate().find(|(_, w)| w.is_empty()) {
            return Err(CfcError::InvalidWindow {
                index,
                start: w.start,
                end: w.end,
                n_samples: w.end,
            });
        }
        Ok(Self { windows })
    }

    /// A single window covering the whole sample axis.
    pub fn full(n_samples: usize) -> Self {
        Self {
            windows: vec![Window::new(0, n_samples)],
        }
    }

    /// Regular windows of `width` samples, advancing by `step`.
    ///
    /// Only windows that fit entirely in `n_samples` are produced.
    pub fn sliding(n_samples: usize, width: usize, step: usize) -> Result<Self, CfcError> {
        if width == 0 || step == 0 || width > n_samples {
            return Err(CfcError::InvalidWindow {
                index: 0,
                start: 0,
                end: width,
                n_samples,
            });
        }
        let windows = (0..=n_samples - width)
            .step_by(step)
            .map(|start| Window::new(start, start + width))
            .collect();
        Ok(Self { windows })
    }

    /// Check every window against the sample axis length.
    pub fn validate(&self, n_samples: usize) -> Result<(), CfcError> {
        for (index, w) in self.windows.iter().enumerate() {
            if w.is_empty() || w.end > n_samples {
                return Err(CfcError::InvalidWindow {
                    index,
                    start: w.start,
                    end: w.end,
                    n_samples,
                });
            }
        }
        Ok(())
    }

    /// Number of windows.
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    /// Always false; a window set holds at least one window.
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Windows in order.
    pub fn as_slice(&self) -> &[Window] {
        &self.windows
    }

    /// Iterate over the windows in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Window> {
        self.windows.iter()
    }
}

impl std::ops::Index<usize> for WindowSet {
    type Output = Window;

    fn index(&self, index: usize) -> &Window {
        &self.windows[index]
    }
}

impl<'a> IntoIterator for &'a WindowSet {
    type Item = &'a Window;
    type IntoIter = std::slice::Iter<'a, Window>;

    fn into_iter(self) -> Self::IntoIter {
        self.windows.iter()
    }
}

/// One (window, trial) cell of the work list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    /// Position in the flat enumeration.
    pub flat: usize,
    /// Window index.
    pub window: usize,
    /// Trial index.
    pub trial: usize,
}

/// Window-major, trial-minor enumeration of all (window, trial) cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowIndex {
    n_windows: usize,
    n_trials: usize,
    cells: Vec<Cell>,
}

impl WindowIndex {
    /// Enumerate the Cartesian product of windows and trials.
    pub fn enumerate(n_windows: usize, n_trials: usize) -> Self {
        let cells = (0..n_windows)
            .flat_map(|window| (0..n_trials).map(move |trial| (window, trial)))
            .enumerate()
            .map(|(flat, (window, trial))| Cell { flat, window, trial })
            .collect();
        Self { n_windows, n_trials, cells }
    }

    /// Number of windows.
    pub fn n_windows(&self) -> usize {
        self.n_windows
    }

    /// Number of trials.
    pub fn n_trials(&self) -> usize {
        self.n_trials
    }

    /// All cells in enumeration order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True when there are no windows or no trials.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Flat position of each cell.
    pub fn flat_ids(&self) -> Vec<usize> {
        self.cells.iter().map(|c| c.flat).collect()
    }

    /// Window of each cell.
    pub fn window_ids(&self) -> Vec<usize> {
        self.cells.iter().map(|c| c.window).collect()
    }

    /// Trial of each cell.
    pub fn trial_ids(&self) -> Vec<usize> {
        self.cells.iter().map(|c| c.trial).collect()
    }
}

/// Group flat values by window id.
///
/// Groups come out in window order; within a group values keep their flat
/// order. `values` and `window_ids` are paired position by position.
pub fn regroup<T>(values: Vec<T>, window_ids: &[usize]) -> Vec<Vec<T>> {
    debug_assert_eq!(values.len(), window_ids.len());
    let n_groups = window_ids.iter().max().map_or(0, |&m| m + 1);
    let mut groups: Vec<Vec<T>> = std::iter::repeat_with(Vec::new).take(n_groups).collect();
    for (value, &window) in values.into_iter().zip(window_ids) {
        groups[window].push(value);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enumerate_order() {
        let index = WindowIndex::enumerate(3, 2);
        assert_eq!(index.len(), 6);
        assert_eq!(index.flat_ids(), vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(index.window_ids(), vec![0, 0, 1, 1, 2, 2]);
        assert_eq!(index.trial_ids(), vec![0, 1, 0, 1, 0, 1]);
    }

    #[test]
    fn test_regroup_preserves_order() {
        let index = WindowIndex::enumerate(3, 2);
        let values: Vec<(usize, usize)> = index.cells().iter().map(|c| (c.window, c.trial)).collect();
        let groups = regroup(values, &index.window_ids());

        assert_eq!(groups.len(), 3);
        for (w, group) in groups.iter().enumerate() {
            assert_eq!(group, &vec![(w, 0), (w, 1)]);
        }
    }

    #[test]
    fn test_regroup_empty() {
        let groups: Vec<Vec<f64>> = regroup(Vec::new(), &[]);
        assert!(groups.is_empty());
        assert!(WindowIndex::enumerate(0, 5).is_empty());
    }

    #[test]
    fn test_window_set_validate() {
        let set = WindowSet::new([(0, 50), (50, 100)]).unwrap();
        assert!(set.validate(100).is_ok());
        assert!(matches!(
            set.validate(80),
            Err(CfcError::InvalidWindow { index: 1, end: 100, n_samples: 80, .. })
        ));
    }

    #[test]
    fn test_window_set_rejects_empty() {
        assert!(matches!(WindowSet::new(Vec::<Window>::new()), Err(CfcError::NoWindows)));
        assert!(matches!(
            WindowSet::new([(10, 10)]),
            Err(CfcError::InvalidWindow { index: 0, .. })
        ));
    }

    #[test]
    fn test_sliding() {
        let set = WindowSet::sliding(100, 40, 30).unwrap();
        assert_eq!(set.as_slice(), &[Window::new(0, 40), Window::new(30, 70), Window::new(60, 100)]);
        assert!(WindowSet::sliding(10, 20, 5).is_err());
        assert!(WindowSet::sliding(10, 5, 0).is_err());
    }

    #[test]
    fn test_full() {
        let set = WindowSet::full(256);
        assert_eq!(set.len(), 1);
        assert_eq!(set[0].range(), 0..256);
        assert_eq!(set[0].len(), 256);
    }
}
