//! Coupling estimation command.

use std::path::PathBuf;

use anyhow::{Context, ensure};
use clap::Args;
use ndarray::{Array4, Axis};
use neuropac_analysis::{FrequencyBand, SignalInput};
use neuropac_config::AnalysisConfig;
use neuropac_registry::Normalization;
use serde::{Deserialize, Serialize};

use crate::dataset::{Dataset, Tensor};

#[derive(Args)]
pub struct CfcArgs {
    /// Analysis configuration (TOML)
    #[arg(short, long)]
    config: PathBuf,

    /// Input dataset (JSON)
    #[arg(short, long)]
    input: PathBuf,

    /// Compute surrogates, p-values and the configured normalization
    #[arg(long)]
    surrogates: bool,

    /// Write the result as JSON
    #[arg(short, long)]
    output: Option<PathBuf>,
}

/// JSON layout of `neuropac cfc --output`.
#[derive(Serialize, Deserialize)]
pub(crate) struct CfcReport {
    pub model: String,
    pub description: String,
    pub windows: Vec<[usize; 2]>,
    pub phase_bands: Vec<[f64; 2]>,
    pub amplitude_bands: Vec<[f64; 2]>,
    /// `(windows, trials, amplitude bands, phase bands)`.
    pub coupling: Tensor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p_values: Option<Tensor>,
}

pub fn run(args: CfcArgs) -> anyhow::Result<()> {
    let config = AnalysisConfig::load(&args.config)?;
    let dataset = Dataset::load(&args.input)?;
    ensure!(
        (config.sample_rate - dataset.sample_rate).abs() <= f64::EPSILON * dataset.sample_rate,
        "config sample rate {} Hz does not match dataset sample rate {} Hz",
        config.sample_rate,
        dataset.sample_rate
    );

    let engine = config
        .build_engine()
        .with_context(|| format!("invalid analysis config '{}'", args.config.display()))?;
    let model = *engine.model();
    println!("Computing {} on {} trials...", model.short_description(), dataset.trials.len());

    let input = SignalInput::from(dataset.to_columns());
    let (coupling, p_values) = if args.surrogates {
        let result = engine.compute_with_surrogates(input)?;
        tracing::info!(n_perm = result.n_perm(), "surrogates done");
        let normalization = model.id().normalization;
        let coupling = if normalization == Normalization::None {
            result.coupling.clone()
        } else {
            result.normalized(normalization)?
        };
        (coupling, Some(result.p_values()?))
    } else {
        (engine.compute(input)?, None)
    };

    let windows: Vec<[usize; 2]> = engine.windows().iter().map(|w| [w.start, w.end]).collect();
    print_summary(&windows, &coupling, p_values.as_ref());

    if let Some(path) = &args.output {
        let report = CfcReport {
            model: model.id().to_string(),
            description: model.short_description(),
            windows,
            phase_bands: band_edges(engine.preprocessor().phase_bands()),
            amplitude_bands: band_edges(engine.preprocessor().amplitude_bands()),
            coupling: Tensor::from(&coupling),
            p_values: p_values.as_ref().map(Tensor::from),
        };
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(path, json).with_context(|| format!("failed to write '{}'", path.display()))?;
        println!("\nWrote coupling to {}", path.display());
    }
    Ok(())
}

fn print_summary(windows: &[[usize; 2]], coupling: &Array4<f64>, p_values: Option<&Array4<f64>>) {
    println!();
    println!("  {:>16}  {:>12}  {:>12}", "Window", "Mean", "Max");
    for (w, [start, end]) in windows.iter().enumerate() {
        let cells = coupling.index_axis(Axis(0), w);
        let mean = cells.mean().unwrap_or(f64::NAN);
        let max = cells.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let label = format!("{start}-{end}");
        print!("  {label:>16}  {mean:>12.5}  {max:>12.5}");
        if let Some(p) = p_values {
            let p = p.index_axis(Axis(0), w);
            let significant = p.iter().filter(|&&v| v < 0.05).count();
            print!("  ({significant}/{} cells p < 0.05)", p.len());
        }
        println!();
    }
}

fn band_edges(bands: &[FrequencyBand]) -> Vec<[f64; 2]> {
    bands.iter().map(|b| [b.low_hz, b.high_hz]).collect()
}
