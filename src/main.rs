//! creditlens: credit-default EDA and baseline CLI
//!
//! `eda` writes summary tables and charts, `preprocess` writes the cleaned
//! table and reports split shapes, `baseline` fits and evaluates the model.

use anyhow::Result;
use clap::Parser;

use creditlens::cli::{run, Cli};

fn main() -> Result<()> {
    let cli = Cli::parse();
    run(&cli)
}
