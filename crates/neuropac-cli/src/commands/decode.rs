//! Cross-validated decoding command.

use std::path::PathBuf;

use anyhow::{Context, ensure};
use clap::{Args, ValueEnum};
use ndarray::{Array2, Array4, Axis};
use neuropac_analysis::SignalInput;
use neuropac_classify::{ClassifierKind, FeatureMode};
use neuropac_config::{AnalysisConfig, DecodingConfig};
use serde::{Deserialize, Serialize};

use crate::dataset::{Dataset, Tensor};

/// Feature grouping for CLI
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum CliFeatures {
    Single,
    Multi,
}

impl From<CliFeatures> for FeatureMode {
    fn from(f: CliFeatures) -> Self {
        match f {
            CliFeatures::Single => FeatureMode::Single,
            CliFeatures::Multi => FeatureMode::Multi,
        }
    }
}

#[derive(Args)]
pub struct DecodeArgs {
    /// Labelled input dataset (JSON)
    #[arg(short, long)]
    input: PathBuf,

    /// Decoding configuration (TOML); defaults to 10x10 stratified k-fold LDA
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Decode coupling values computed with this analysis config instead of
    /// raw samples
    #[arg(long)]
    analysis: Option<PathBuf>,

    /// Override the configured classifier: a digit 0-8 or a name such as
    /// `svm-linear`, `knn-5` or `rf-50`
    #[arg(long)]
    classifier: Option<ClassifierKind>,

    /// Override the configured feature grouping
    #[arg(long, value_enum)]
    features: Option<CliFeatures>,

    /// Write accuracies as JSON
    #[arg(short, long)]
    output: Option<PathBuf>,
}

/// JSON layout of `neuropac decode --output`.
#[derive(Serialize, Deserialize)]
pub(crate) struct DecodeReport {
    pub decoder: String,
    /// Accuracy in percent, `(features, repetitions)`.
    pub accuracy: Tensor,
}

pub fn run(args: DecodeArgs) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => DecodingConfig::load(path)?,
        None => DecodingConfig::default(),
    };
    if let Some(classifier) = args.classifier {
        config.classifier = classifier;
    }
    let mode = args.features.map_or(config.features, FeatureMode::from);
    let decoder = config.build_decoder()?;

    let dataset = Dataset::load(&args.input)?;
    let labels = dataset.require_labels("decode")?;

    let features = match &args.analysis {
        Some(path) => {
            let analysis = AnalysisConfig::load(path)?;
            ensure!(
                (analysis.sample_rate - dataset.sample_rate).abs() <= f64::EPSILON * dataset.sample_rate,
                "analysis sample rate {} Hz does not match dataset sample rate {} Hz",
                analysis.sample_rate,
                dataset.sample_rate
            );
            let engine = analysis
                .build_engine()
                .with_context(|| format!("invalid analysis config '{}'", path.display()))?;
            println!("Extracting {} features...", engine.model().short_description());
            trial_features(&engine.compute(SignalInput::from(dataset.to_columns()))?)
        }
        None => dataset.to_rows(),
    };

    println!("Decoding with {}...", decoder.describe());
    let accuracy = decoder.fit(features.view(), labels, mode, config.jobs())?;

    println!();
    println!("  {:>8}  {:>10}  {:>10}", "Feature", "Mean (%)", "Std (%)");
    for (row, scores) in accuracy.axis_iter(Axis(0)).enumerate() {
        let mean = scores.mean().unwrap_or(f64::NAN);
        let std = scores.std(0.0);
        println!("  {row:>8}  {mean:>10.2}  {std:>10.2}");
    }

    if let Some(path) = &args.output {
        let report = DecodeReport {
            decoder: decoder.describe(),
            accuracy: Tensor::from(&accuracy),
        };
        std::fs::write(path, serde_json::to_string_pretty(&report)?)
            .with_context(|| format!("failed to write '{}'", path.display()))?;
        println!("\nWrote accuracies to {}", path.display());
    }
    Ok(())
}

/// Flatten `(windows, trials, amplitude, phase)` coupling into `(trials, features)`.
fn trial_features(coupling: &Array4<f64>) -> Array2<f64> {
    let (_, n_trials, n_amp, n_pha) = coupling.dim();
    let per_window = n_amp * n_pha;
    Array2::from_shape_fn((n_trials, coupling.len_of(Axis(0)) * per_window), |(trial, f)| {
        let cell = f % per_window;
        coupling[[f / per_window, trial, cell / n_pha, cell % n_pha]]
    })
}
