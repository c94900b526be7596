//! SVG figure command.

use std::path::{Path, PathBuf};

use anyhow::{Context, ensure};
use clap::{Args, Subcommand, ValueEnum};
use ndarray::Axis;
use neuropac_plot::{
    AxesStyle, BorderPlotOptions, Deviation, HeatmapOptions, PanelKind, PanelOptions,
    ReferenceLines, render_border_plot, render_heatmap, render_panels,
};

use crate::commands::cfc::CfcReport;
use crate::commands::decode::DecodeReport;
use crate::dataset::Dataset;

/// Envelope width for CLI
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum CliDeviation {
    #[default]
    Sem,
    Std,
}

impl From<CliDeviation> for Deviation {
    fn from(d: CliDeviation) -> Self {
        match d {
            CliDeviation::Sem => Deviation::Sem,
            CliDeviation::Std => Deviation::Std,
        }
    }
}

#[derive(Args)]
pub struct PlotArgs {
    #[command(subcommand)]
    command: PlotCommand,
}

#[derive(Subcommand)]
enum PlotCommand {
    /// Mean +/- deviation of the trials of a dataset, one curve per label
    Trials {
        /// Input dataset (JSON)
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output SVG file
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,

        /// Envelope width
        #[arg(long, value_enum, default_value_t)]
        deviation: CliDeviation,

        /// Mark this time (seconds) with a vertical line
        #[arg(long)]
        onset: Option<f64>,

        /// Figure title
        #[arg(long)]
        title: Option<String>,
    },

    /// Trial-averaged comodulogram per window from `neuropac cfc --output`
    Coupling {
        /// Coupling report (JSON)
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output SVG file
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,

        /// Plot p-values instead of coupling
        #[arg(long)]
        p_values: bool,

        /// Figure title
        #[arg(long)]
        title: Option<String>,
    },

    /// Mean decoding accuracy per feature from `neuropac decode --output`
    Accuracy {
        /// Decoding report (JSON)
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output SVG file
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,

        /// Chance level in percent, drawn as a horizontal line
        #[arg(long)]
        chance: Option<f64>,
    },
}

pub fn run(args: PlotArgs) -> anyhow::Result<()> {
    match args.command {
        PlotCommand::Trials {
            input,
            output,
            deviation,
            onset,
            title,
        } => {
            let dataset = Dataset::load(&input)?;
            let time: Vec<f64> = (0..dataset.n_samples())
                .map(|i| i as f64 / dataset.sample_rate)
                .collect();
            let labels = dataset.labels.as_deref();
            let legend = legend_for(labels);

            let mut lines = ReferenceLines::new();
            if let Some(t) = onset {
                lines = lines.vertical(t);
            }
            let options = BorderPlotOptions {
                axes: AxesStyle::default()
                    .title(title.unwrap_or_default())
                    .labels("Time (s)", "Amplitude"),
                deviation: deviation.into(),
                legend,
                lines,
                ..BorderPlotOptions::default()
            };
            let svg = render_border_plot(&time, dataset.to_columns().view(), labels, &options)?;
            write_svg(&output, &svg)
        }

        PlotCommand::Coupling {
            input,
            output,
            p_values,
            title,
        } => {
            let report: CfcReport = read_json(&input)?;
            let tensor = if p_values {
                report
                    .p_values
                    .as_ref()
                    .context("report has no p-values; rerun cfc with --surrogates")?
            } else {
                &report.coupling
            };
            let values = tensor.to_array()?;
            ensure!(values.ndim() == 4, "expected 4-D coupling, found {}-D", values.ndim());
            let averaged = values
                .mean_axis(Axis(1))
                .context("coupling report has no trials")?;

            let phase: Vec<f64> = report.phase_bands.iter().map(|[lo, hi]| (lo + hi) / 2.0).collect();
            let amplitude: Vec<f64> =
                report.amplitude_bands.iter().map(|[lo, hi]| (lo + hi) / 2.0).collect();
            let default_title = format!("{} ({} windows)", report.description, report.windows.len());
            let options = HeatmapOptions {
                axes: AxesStyle::default().labels("Phase (Hz)", "Amplitude (Hz)"),
                title: title.unwrap_or(default_title),
                value_range: p_values.then_some((0.0, 1.0)),
                ..HeatmapOptions::default()
            };
            let svg = render_heatmap(
                averaged.view(),
                Some(phase.as_slice()).filter(|p| !p.is_empty()),
                Some(amplitude.as_slice()).filter(|a| !a.is_empty()),
                &options,
            )?;
            write_svg(&output, &svg)
        }

        PlotCommand::Accuracy {
            input,
            output,
            chance,
        } => {
            let report: DecodeReport = read_json(&input)?;
            let accuracy = report.accuracy.to_array()?;
            ensure!(accuracy.ndim() == 2, "expected 2-D accuracy, found {}-D", accuracy.ndim());
            let mean = accuracy
                .mean_axis(Axis(1))
                .context("decoding report has no repetitions")?;

            let mut lines = ReferenceLines::new();
            if let Some(level) = chance {
                lines = lines.horizontal(level);
            }
            let options = PanelOptions {
                axes: AxesStyle::default()
                    .labels("Feature", "Accuracy (%)")
                    .y_range(0.0, 100.0),
                title: report.decoder,
                kind: if mean.len() == 1 { PanelKind::Scatter } else { PanelKind::Line },
                lines,
                ..PanelOptions::default()
            };
            let svg = render_panels(mean.view(), None, &options)?;
            write_svg(&output, &svg)
        }
    }
}

fn legend_for(labels: Option<&[usize]>) -> Vec<String> {
    let Some(labels) = labels else {
        return Vec::new();
    };
    let mut classes = labels.to_vec();
    classes.sort_unstable();
    classes.dedup();
    classes.iter().map(|c| format!("Class {c}")).collect()
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read '{}'", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("failed to parse '{}'", path.display()))
}

fn write_svg(path: &Path, svg: &str) -> anyhow::Result<()> {
    std::fs::write(path, svg).with_context(|| format!("failed to write '{}'", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}
