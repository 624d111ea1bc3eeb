//! `creditlens eda` - dataset overview, summary tables and charts

use std::time::Instant;

use anyhow::Result;
use console::style;

use super::args::EdaArgs;
use super::load_input;
use super::prompts::confirm_overwrite;
use crate::eda::{missing_counts, plan_plots, write_tables, EdaConfig};
use crate::pipeline::{ensure_target_present, target_counts};
use crate::report::{display_corr_with_target, display_missing, display_target_counts};
use crate::utils::{
    create_chart_progress, finish_chart_progress, print_banner, print_completion, print_config,
    print_count, print_info, print_section, print_step_header, print_step_time, print_success,
    print_warning, with_spinner, ConfigCard,
};

/// Correlations with the target listed on the console
const TOP_CORRELATIONS_PRINTED: usize = 12;

pub fn run_eda(args: &EdaArgs, infer_schema_length: usize, no_confirm: bool) -> Result<()> {
    let config = EdaConfig {
        target: args.data.target.clone(),
        output_dir: args.output_dir.clone(),
        top_features: args.top_features,
        sample_size: args.sample_size,
        seed: args.seed,
        plots: !args.no_plots,
        ..EdaConfig::default()
    };

    print_banner(env!("CARGO_PKG_VERSION"));
    print_config(&ConfigCard {
        input: &args.data.input,
        target: &config.target,
        output: &config.output_dir,
        test_size: None,
        seed: config.seed,
    });

    // Step 1: Load and describe
    print_step_header(1, "Load Dataset");
    let step_start = Instant::now();
    let df = load_input(&args.data.input, infer_schema_length)?;
    ensure_target_present(&df, &config.target)?;

    print_section("FIRST ROWS");
    println!("{}", df.head(Some(5)));

    print_section("COLUMNS");
    for column in df.get_columns() {
        println!(
            "      {} {}",
            column.name(),
            style(format!("({})", column.dtype())).dim()
        );
    }

    display_missing(&missing_counts(&df));
    display_target_counts(&config.target, &target_counts(&df, &config.target)?);
    print_step_time(step_start.elapsed());

    // Step 2: Summary tables
    print_step_header(2, "Summary Tables");
    if !confirm_overwrite(&config.output_dir, no_confirm)? {
        println!("Cancelled by user.");
        return Ok(());
    }

    let step_start = Instant::now();
    let tables = with_spinner(
        "Computing summaries and correlations...",
        || write_tables(&df, &config),
        |tables| {
            format!(
                "Wrote {} tables to {}",
                tables.written.len(),
                config.output_dir.display()
            )
        },
    )?;
    display_corr_with_target(&tables.corr_with_target, TOP_CORRELATIONS_PRINTED);
    print_step_time(step_start.elapsed());

    // Step 3: Charts
    print_step_header(3, "Charts");
    if !config.plots {
        print_info("Chart rendering skipped (--no-plots)");
    } else {
        let step_start = Instant::now();
        let plan = plan_plots(&df, &config, &tables)?;
        if plan.class_plots_skipped {
            print_warning(&format!(
                "Target '{}' is not 0/1; per-class charts skipped",
                config.target
            ));
        } else {
            print_count(
                "feature(s) charted per class",
                plan.features.len(),
                Some(&format!("(sample of at most {} rows)", config.sample_size)),
            );
        }

        let pb = create_chart_progress(plan.jobs.len());
        for job in &plan.jobs {
            if let Some(name) = job.path().file_name() {
                pb.set_message(name.to_string_lossy().into_owned());
            }
            if let Err(err) = job.render(&tables.correlations) {
                pb.abandon();
                return Err(err);
            }
            pb.inc(1);
        }
        finish_chart_progress(&pb, plan.jobs.len(), plan.class_plots_skipped);
        print_step_time(step_start.elapsed());
    }

    print_success(&format!("Outputs saved to {}", config.output_dir.display()));
    print_completion("EDA");
    Ok(())
}
