//! `creditlens baseline` - fit and evaluate the logistic-regression baseline

use std::time::Instant;

use anyhow::Result;

use super::args::BaselineArgs;
use super::load_input;
use super::prompts::confirm_overwrite;
use crate::pipeline::{analyze_target_column, run_baseline, BaselineConfig, TargetAnalysis};
use crate::report::{
    display_classification_report, display_clean_summary, display_coefficients,
    export_baseline_report,
};
use crate::utils::{
    print_banner, print_completion, print_config, print_count, print_info, print_step_header,
    print_step_time, print_success, print_warning, with_spinner, ConfigCard,
};

pub fn run_baseline_command(
    args: &BaselineArgs,
    infer_schema_length: usize,
    no_confirm: bool,
) -> Result<()> {
    let config = BaselineConfig {
        target: args.data.target.clone(),
        target_mapping: args.target_mapping(),
        clean: args.clean.options(),
        split: args.split.config(),
        estimator: args.estimator_config(),
    };

    print_banner(env!("CARGO_PKG_VERSION"));
    let report_display = args.report.clone().unwrap_or_default();
    print_config(&ConfigCard {
        input: &args.data.input,
        target: &config.target,
        output: &report_display,
        test_size: Some(config.split.test_size),
        seed: config.split.seed,
    });

    // Step 1: Load
    print_step_header(1, "Load Dataset");
    let step_start = Instant::now();
    let df = load_input(&args.data.input, infer_schema_length)?;

    if config.target_mapping.is_none() {
        if let TargetAnalysis::NeedsMapping { unique_values } =
            analyze_target_column(&df, &config.target)?
        {
            anyhow::bail!(
                "Target column '{}' is not binary 0/1 (values: {:?}). \
                 Use --event-value and --non-event-value to map it.",
                config.target,
                unique_values
            );
        }
    }
    print_step_time(step_start.elapsed());

    // Step 2: Fit
    print_step_header(2, "Fit Baseline");
    let step_start = Instant::now();
    let outcome = with_spinner(
        "Cleaning, transforming and fitting...",
        || run_baseline(&df, &config),
        |outcome| {
            format!(
                "Fitted on {} rows, evaluated on {} rows",
                outcome.n_train, outcome.n_test
            )
        },
    )?;

    display_clean_summary(&outcome.clean_summary);
    if outcome.unmapped_rows > 0 {
        print_warning(&format!(
            "{} row(s) matched neither target value and were excluded",
            outcome.unmapped_rows
        ));
    }
    print_count("numeric feature(s)", outcome.partition.numeric.len(), None);
    print_count(
        "categorical feature(s)",
        outcome.partition.categorical.len(),
        Some(&format!("({} one-hot columns)", outcome.transform.encoder().width())),
    );

    for column in outcome.transform.scaler().constant_columns() {
        print_warning(&format!(
            "Column '{}' is constant on the training rows; centered without scaling",
            column
        ));
    }
    for unseen in &outcome.unseen {
        print_warning(&format!(
            "Column '{}': {} test row(s) carried categories unseen in training (e.g. {:?}); encoded as all zeros",
            unseen.column, unseen.rows, unseen.examples
        ));
    }
    if !outcome.model.converged {
        print_warning(&format!(
            "Estimator did not converge within {} iterations",
            outcome.model.iterations
        ));
    }
    print_step_time(step_start.elapsed());

    // Step 3: Evaluate
    print_step_header(3, "Evaluation");
    display_classification_report(&outcome.evaluation);
    if outcome.evaluation.roc_auc.is_none() {
        print_warning("ROC-AUC is undefined: the test labels hold a single class");
    }
    display_coefficients(&outcome.model, args.top_coefficients);

    // Step 4: Report
    if let Some(report_path) = &args.report {
        print_step_header(4, "Save Report");
        if confirm_overwrite(report_path, no_confirm)? {
            export_baseline_report(&args.data.input, &config, &outcome, report_path)?;
            print_success(&format!("Report saved to {}", report_path.display()));
        } else {
            print_info("Existing report kept");
        }
    }

    print_completion("Baseline");
    Ok(())
}
