//! Coupling model listing command.

#![allow(clippy::print_literal)] // Table headers use literal strings intentionally

use clap::Args;
use neuropac_registry::{CouplingRegistry, EntryDescriptor, ModelId};

#[derive(Args)]
pub struct ModelsArgs {
    /// Describe one model identifier, e.g. "212"
    #[arg(value_name = "MODEL")]
    model: Option<String>,
}

pub fn run(args: ModelsArgs) -> anyhow::Result<()> {
    if let Some(model) = &args.model {
        let id = ModelId::parse(model)?;
        println!("Model {id}");
        println!("{}", "=".repeat(6 + model.len()));
        println!();
        println!("  Method:        {}", id.method.descriptor().long_name);
        println!("  Surrogates:    {}", id.surrogate.descriptor().long_name);
        println!("  Normalization: {}", id.normalization.descriptor().long_name);
        return Ok(());
    }

    let registry = CouplingRegistry::new();
    print_table("Coupling methods (first digit)", &registry.all_methods());
    print_table("Surrogate schemes (second digit)", &registry.all_surrogates());
    print_table("Normalizations (third digit)", &registry.all_normalizations());

    println!("Example usage:");
    println!();
    println!("  neuropac models 212");
    println!("  neuropac cfc --config analysis.toml --input data.json --surrogates");
    Ok(())
}

fn print_table(title: &str, entries: &[EntryDescriptor]) {
    println!("{title}:");
    println!();
    println!("  {:5}  {:12}  {}", "Digit", "Name", "Description");
    println!("  {:5}  {:12}  {}", "-----", "----", "-----------");
    for entry in entries {
        println!(
            "  {:5}  {:12}  {}",
            entry.digit, entry.names.short_name, entry.names.long_name
        );
    }
    println!();
}
