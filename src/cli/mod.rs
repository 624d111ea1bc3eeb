//! CLI module - argument parsing, prompts and command runners

mod args;
pub mod baseline;
pub mod eda;
pub mod preprocess;
mod prompts;

use std::path::Path;

use anyhow::Result;
use console::style;
use polars::prelude::DataFrame;

use crate::pipeline::load_dataset_with_progress;
use crate::utils::print_success;

pub use args::*;
pub use prompts::*;

/// Load the input table and print its shape
pub(crate) fn load_input(path: &Path, infer_schema_length: usize) -> Result<DataFrame> {
    let (df, rows, cols, memory_mb) = load_dataset_with_progress(path, infer_schema_length)?;
    print_success("Dataset loaded");

    println!("\n    {} Dataset Statistics:", style("✧").cyan());
    println!("      Path: {}", path.display());
    println!("      Rows: {}", rows);
    println!("      Columns: {}", cols);
    println!("      Estimated memory: {:.2} MB", memory_mb);

    Ok(df)
}

/// Run the selected subcommand
pub fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Eda(args) => eda::run_eda(args, cli.infer_schema_length, cli.no_confirm),
        Commands::Preprocess(args) => {
            preprocess::run_preprocess(args, cli.infer_schema_length, cli.no_confirm)
        }
        Commands::Baseline(args) => {
            baseline::run_baseline_command(args, cli.infer_schema_length, cli.no_confirm)
        }
    }
}
