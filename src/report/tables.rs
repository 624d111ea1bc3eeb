//! Console tables for cleaning, target, correlation and model results

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, CellAlignment, Color, Table};
use console::style;

use crate::pipeline::{CleanSummary, Evaluation, LogisticModel, TargetCounts};
use crate::utils::print_section;

fn header(cells: &[&str]) -> Vec<Cell> {
    cells
        .iter()
        .map(|c| Cell::new(c).add_attribute(Attribute::Bold))
        .collect()
}

fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table
}

fn print_indented(table: &Table) {
    for line in table.to_string().lines() {
        println!("    {}", line);
    }
}

fn metric_cell(value: f64) -> Cell {
    Cell::new(format!("{:.4}", value)).set_alignment(CellAlignment::Right)
}

/// Rows removed by each cleaning step
pub fn display_clean_summary(summary: &CleanSummary) {
    print_section("CLEANING SUMMARY");

    let mut table = new_table();
    table.set_header(header(&["Step", "Rows"]));

    table.add_row(vec![Cell::new("Rows before"), Cell::new(summary.rows_before)]);
    table.add_row(vec![
        Cell::new("Duplicates removed"),
        Cell::new(summary.duplicates_removed).fg(if summary.duplicates_removed > 0 {
            Color::Red
        } else {
            Color::White
        }),
    ]);
    if let Some(id) = &summary.id_column_dropped {
        table.add_row(vec![
            Cell::new(format!("Identifier '{}' dropped", id)),
            Cell::new("-"),
        ]);
    }
    table.add_row(vec![
        Cell::new("Rows with missing removed"),
        Cell::new(summary.missing_rows_removed).fg(if summary.missing_rows_removed > 0 {
            Color::Red
        } else {
            Color::White
        }),
    ]);
    table.add_row(vec![
        Cell::new("Rows after"),
        Cell::new(summary.rows_after)
            .fg(Color::Green)
            .add_attribute(Attribute::Bold),
    ]);

    print_indented(&table);
}

/// Target value counts with the default rate underneath
pub fn display_target_counts(target: &str, counts: &TargetCounts) {
    print_section(&format!("TARGET '{}'", target));

    let mut table = new_table();
    table.set_header(header(&["Value", "Count"]));
    for (value, n) in &counts.counts {
        table.add_row(vec![Cell::new(value), Cell::new(n)]);
    }
    print_indented(&table);

    println!(
        "      Default rate: {}",
        style(format!("{:.4}", counts.default_rate)).yellow().bold()
    );
}

/// Missing value count per column; only columns with any missing are listed
pub fn display_missing(missing: &[(String, usize)]) {
    print_section("MISSING VALUES");

    let with_missing: Vec<&(String, usize)> = missing.iter().filter(|(_, n)| *n > 0).collect();
    if with_missing.is_empty() {
        println!("      {}", style("No missing values").dim());
        return;
    }

    let mut table = new_table();
    table.set_header(header(&["Column", "Missing"]));
    for (column, n) in with_missing {
        table.add_row(vec![Cell::new(column), Cell::new(n).fg(Color::Yellow)]);
    }
    print_indented(&table);
}

/// The strongest absolute correlations with the target
pub fn display_corr_with_target(corr: &[(String, f64)], top: usize) {
    print_section("TOP CORRELATIONS WITH TARGET");

    if corr.is_empty() {
        println!("      {}", style("No numeric correlations available").dim());
        return;
    }

    let mut table = new_table();
    table.set_header(header(&["Feature", "|corr|"]));
    for (feature, value) in corr.iter().take(top) {
        table.add_row(vec![Cell::new(feature), metric_cell(*value)]);
    }
    print_indented(&table);
}

/// Precision/recall/F1 per class, averages, ROC-AUC and confusion counts
pub fn display_classification_report(evaluation: &Evaluation) {
    let report = &evaluation.report;
    print_section("CLASSIFICATION REPORT");

    let mut table = new_table();
    table.set_header(header(&["", "precision", "recall", "f1-score", "support"]));

    for class in &report.classes {
        table.add_row(vec![
            Cell::new(class.label),
            metric_cell(class.precision),
            metric_cell(class.recall),
            metric_cell(class.f1),
            Cell::new(class.support).set_alignment(CellAlignment::Right),
        ]);
    }
    table.add_row(vec![
        Cell::new("accuracy"),
        Cell::new(""),
        Cell::new(""),
        metric_cell(report.accuracy),
        Cell::new(report.confusion.total()).set_alignment(CellAlignment::Right),
    ]);
    for (name, avg) in [
        ("macro avg", &report.macro_avg),
        ("weighted avg", &report.weighted_avg),
    ] {
        table.add_row(vec![
            Cell::new(name),
            metric_cell(avg.precision),
            metric_cell(avg.recall),
            metric_cell(avg.f1),
            Cell::new(avg.support).set_alignment(CellAlignment::Right),
        ]);
    }
    print_indented(&table);

    let cm = &report.confusion;
    println!(
        "      Confusion: TN={} FP={} FN={} TP={}",
        cm.true_negative, cm.false_positive, cm.false_negative, cm.true_positive
    );

    match evaluation.roc_auc {
        Some(auc) => println!(
            "      ROC-AUC: {}",
            style(format!("{:.4}", auc)).green().bold()
        ),
        None => println!("      ROC-AUC: {}", style("undefined").dim()),
    }
}

/// Largest-magnitude coefficients of the fitted model
pub fn display_coefficients(model: &LogisticModel, top: usize) {
    print_section("TOP COEFFICIENTS");

    let mut table = new_table();
    table.set_header(header(&["Feature", "Weight"]));
    for (feature, weight) in model.coefficients().into_iter().take(top) {
        table.add_row(vec![
            Cell::new(feature),
            metric_cell(weight).fg(if weight >= 0.0 { Color::Red } else { Color::Green }),
        ]);
    }
    print_indented(&table);

    println!(
        "      Intercept: {:.4}   Iterations: {}   Objective: {:.6}",
        model.bias, model.iterations, model.final_loss
    );
}
