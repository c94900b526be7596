//! Synthetic dataset generation command.

use std::path::PathBuf;

use anyhow::{bail, ensure};
use clap::Args;
use ndarray::{Axis, concatenate};
use neuropac_analysis::synthetic::SyntheticPac;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::dataset::Dataset;

#[derive(Args)]
pub struct GenerateArgs {
    /// Output JSON dataset
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Sample rate in Hz
    #[arg(long, default_value = "500.0")]
    sample_rate: f64,

    /// Samples per trial
    #[arg(long, default_value = "2000")]
    samples: usize,

    /// Number of coupled trials
    #[arg(long, default_value = "20")]
    trials: usize,

    /// Additional trials without coupling; when set the dataset is labelled
    /// 1 for coupled and 0 for uncoupled trials
    #[arg(long, default_value = "0")]
    uncoupled_trials: usize,

    /// Phase-providing frequency in Hz
    #[arg(long, default_value = "6.0")]
    phase_hz: f64,

    /// Amplitude-carrying frequency in Hz
    #[arg(long, default_value = "50.0")]
    amplitude_hz: f64,

    /// Coupling strength (0-1)
    #[arg(long, default_value = "0.8")]
    coupling: f64,

    /// Standard deviation of additive noise
    #[arg(long, default_value = "0.2")]
    noise: f64,

    /// Random seed
    #[arg(long)]
    seed: Option<u64>,
}

pub fn run(args: GenerateArgs) -> anyhow::Result<()> {
    ensure!(args.sample_rate > 0.0, "sample rate must be positive");
    ensure!(args.samples > 0, "need at least one sample per trial");
    if args.trials + args.uncoupled_trials == 0 {
        bail!("need at least one trial");
    }
    ensure!(
        (0.0..=1.0).contains(&args.coupling),
        "coupling must be within 0-1, got {}",
        args.coupling
    );
    ensure!(
        args.amplitude_hz < args.sample_rate / 2.0,
        "amplitude frequency {} Hz is above Nyquist",
        args.amplitude_hz
    );

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let generator = SyntheticPac::new(args.sample_rate, args.samples)
        .phase_hz(args.phase_hz)
        .amplitude_hz(args.amplitude_hz)
        .noise(args.noise);

    let coupled = generator.coupling(args.coupling).generate(args.trials, &mut rng);
    let (x, labels) = if args.uncoupled_trials > 0 {
        let flat = generator.coupling(0.0).generate(args.uncoupled_trials, &mut rng);
        let x = concatenate(Axis(1), &[coupled.view(), flat.view()])?;
        let mut labels = vec![1; args.trials];
        labels.resize(args.trials + args.uncoupled_trials, 0);
        (x, Some(labels))
    } else {
        (coupled, None)
    };

    println!(
        "Generating {} trials of {} samples ({} Hz phase -> {} Hz amplitude)...",
        x.ncols(),
        args.samples,
        args.phase_hz,
        args.amplitude_hz
    );

    Dataset::from_columns(args.sample_rate, &x, labels).save(&args.output)?;
    println!("Saved to {}", args.output.display());
    Ok(())
}
