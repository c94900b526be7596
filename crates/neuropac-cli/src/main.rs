//! Neuropac CLI - coupling analysis, decoding and figures from the command line.

mod commands;
mod dataset;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "neuropac")]
#[command(author, version, about = "Phase-amplitude coupling toolkit", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List coupling methods, surrogate schemes and normalizations
    Models(commands::models::ModelsArgs),

    /// Write a synthetic phase-amplitude coupled dataset
    Generate(commands::generate::GenerateArgs),

    /// Compute coupling (and optionally surrogates and p-values)
    Cfc(commands::cfc::CfcArgs),

    /// Cross-validated decoding accuracy
    Decode(commands::decode::DecodeArgs),

    /// Mean +/- deviation plot of a dataset as SVG
    Plot(commands::plot::PlotArgs),
}

fn main() -> anyhow::Result<()> {
    // Logs on stderr, tables on stdout.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Models(args) => commands::models::run(args),
        Commands::Generate(args) => commands::generate::run(args),
        Commands::Cfc(args) => commands::cfc::run(args),
        Commands::Decode(args) => commands::decode::run(args),
        Commands::Plot(args) => commands::plot::run(args),
    }
}
