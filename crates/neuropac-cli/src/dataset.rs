//! JSON datasets exchanged between commands.

use std::path::Path;

use anyhow::{Context, bail};
use ndarray::{Array2, Array4, ArrayD, IxDyn};
use serde::{Deserialize, Serialize};

/// Trials of one channel, optionally labelled.
///
/// ```json
/// { "sample_rate": 500.0, "trials": [[0.1, 0.2, ...], ...], "labels": [0, 1, ...] }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Dataset {
    /// Sampling frequency in Hz.
    pub sample_rate: f64,
    /// One sample vector per trial.
    pub trials: Vec<Vec<f64>>,
    /// One class label per trial.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<usize>>,
}

impl Dataset {
    /// Build from a `(samples, trials)` array.
    pub fn from_columns(sample_rate: f64, x: &Array2<f64>, labels: Option<Vec<usize>>) -> Self {
        Self {
            sample_rate,
            trials: x.columns().into_iter().map(|c| c.to_vec()).collect(),
            labels,
        }
    }

    /// Read and check a dataset file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read dataset '{}'", path.display()))?;
        let dataset: Dataset = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse dataset '{}'", path.display()))?;
        dataset.check()?;
        Ok(dataset)
    }

    /// Write the dataset as JSON.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string(self)?;
        std::fs::write(path, json).with_context(|| format!("failed to write '{}'", path.display()))
    }

    fn check(&self) -> anyhow::Result<()> {
        if self.trials.is_empty() {
            bail!("dataset has no trials");
        }
        let n = self.trials[0].len();
        if let Some(bad) = self.trials.iter().position(|t| t.len() != n) {
            bail!(
                "trial {bad} has {} samples, trial 0 has {n}",
                self.trials[bad].len()
            );
        }
        if let Some(labels) = &self.labels
            && labels.len() != self.trials.len()
        {
            bail!("{} labels for {} trials", labels.len(), self.trials.len());
        }
        Ok(())
    }

    /// Samples per trial.
    pub fn n_samples(&self) -> usize {
        self.trials.first().map_or(0, Vec::len)
    }

    /// `(samples, trials)` array.
    pub fn to_columns(&self) -> Array2<f64> {
        Array2::from_shape_fn((self.n_samples(), self.trials.len()), |(i, t)| self.trials[t][i])
    }

    /// `(trials, samples)` array.
    pub fn to_rows(&self) -> Array2<f64> {
        Array2::from_shape_fn((self.trials.len(), self.n_samples()), |(t, i)| self.trials[t][i])
    }

    /// Labels, or an error naming the command that needs them.
    pub fn require_labels(&self, command: &str) -> anyhow::Result<&[usize]> {
        self.labels
            .as_deref()
            .with_context(|| format!("'{command}' needs a dataset with \"labels\""))
    }
}

/// N-d result serialized as shape plus row-major data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tensor {
    /// Axis lengths.
    pub shape: Vec<usize>,
    /// Values in row-major order.
    pub data: Vec<f64>,
}

impl Tensor {
    /// Rebuild the array, checking that shape and data agree.
    pub fn to_array(&self) -> anyhow::Result<ArrayD<f64>> {
        ArrayD::from_shape_vec(IxDyn(&self.shape), self.data.clone())
            .with_context(|| format!("data does not fit shape {:?}", self.shape))
    }
}

impl From<&Array4<f64>> for Tensor {
    fn from(x: &Array4<f64>) -> Self {
        Self {
            shape: x.shape().to_vec(),
            data: x.iter().copied().collect(),
        }
    }
}

impl From<&Array2<f64>> for Tensor {
    fn from(x: &Array2<f64>) -> Self {
        Self {
            shape: x.shape().to_vec(),
            data: x.iter().copied().collect(),
        }
    }
}
