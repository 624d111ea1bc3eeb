//! `creditlens preprocess` - clean, save the deduplicated table, split

use std::time::Instant;

use anyhow::Result;

use super::args::PreprocessArgs;
use super::load_input;
use super::prompts::confirm_overwrite;
use crate::pipeline::{clean, save_csv, split_features_target, train_test_split};
use crate::report::display_clean_summary;
use crate::utils::{
    print_banner, print_completion, print_config, print_count, print_info, print_step_header,
    print_step_time, print_success, with_spinner, ConfigCard,
};

pub fn run_preprocess(args: &PreprocessArgs, infer_schema_length: usize, no_confirm: bool) -> Result<()> {
    let output_path = args.output_path();
    let split_config = args.split.config();

    print_banner(env!("CARGO_PKG_VERSION"));
    print_config(&ConfigCard {
        input: &args.data.input,
        target: &args.data.target,
        output: &output_path,
        test_size: Some(split_config.test_size),
        seed: split_config.seed,
    });

    // Step 1: Load
    print_step_header(1, "Load Dataset");
    let step_start = Instant::now();
    let df = load_input(&args.data.input, infer_schema_length)?;
    print_step_time(step_start.elapsed());

    // Step 2: Clean
    print_step_header(2, "Clean Rows");
    let step_start = Instant::now();
    let (mut cleaned, summary) = clean(&df, &args.clean.options())?;
    display_clean_summary(&summary);
    print_step_time(step_start.elapsed());

    // Step 3: Save
    print_step_header(3, "Save Deduplicated Table");
    if confirm_overwrite(&output_path, no_confirm)? {
        let step_start = Instant::now();
        with_spinner(
            "Writing output file...",
            || save_csv(&mut cleaned, &output_path),
            |_| format!("Saved to {}", output_path.display()),
        )?;
        print_step_time(step_start.elapsed());
    } else {
        print_info("Existing file kept");
    }

    // Step 4: Split
    print_step_header(4, "Train/Test Split");
    let step_start = Instant::now();
    let features = split_features_target(&cleaned, &args.data.target, None)?;
    print_count("numeric feature(s)", features.partition.numeric.len(), None);
    print_count(
        "categorical feature(s)",
        features.partition.categorical.len(),
        None,
    );

    let split = train_test_split(&features.features, &features.target, &split_config)?;
    println!(
        "      Train shape: ({}, {})",
        split.x_train.height(),
        split.x_train.width()
    );
    println!(
        "      Test shape:  ({}, {})",
        split.x_test.height(),
        split.x_test.width()
    );
    print_success("Split complete");
    print_step_time(step_start.elapsed());

    print_completion("Preprocessing");
    Ok(())
}
