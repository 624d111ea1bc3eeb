//! Writing EDA tables and charts to the output directory

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use polars::prelude::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::correlation::{correlation_matrix, correlation_with_target, CorrelationMatrix};
use super::plots::{
    render_boxplot_by_class, render_correlation_heatmap, render_count_plot,
    render_histogram_by_class,
};
use super::summary::{column_summary, describe, numeric_values};
use crate::pipeline::{extract_target_labels, save_csv, take_rows, ColumnKind};

/// EDA settings
#[derive(Debug, Clone)]
pub struct EdaConfig {
    pub target: String,
    pub output_dir: PathBuf,
    /// Features with the strongest target correlation that get hist/box charts
    pub top_features: usize,
    /// Features charted when no correlation with the target is available
    pub fallback_features: usize,
    /// Rows sampled for the per-feature charts
    pub sample_size: usize,
    pub seed: u64,
    pub plots: bool,
}

impl Default for EdaConfig {
    fn default() -> Self {
        Self {
            target: "default".to_string(),
            output_dir: PathBuf::from("eda_outputs"),
            top_features: 8,
            fallback_features: 6,
            sample_size: 3000,
            seed: 42,
            plots: true,
        }
    }
}

/// Tables written by [`write_tables`]
#[derive(Debug, Clone)]
pub struct EdaTables {
    pub written: Vec<PathBuf>,
    pub correlations: CorrelationMatrix,
    /// `|corr|` with the target, strongest first
    pub corr_with_target: Vec<(String, f64)>,
}

/// One chart to render
#[derive(Debug, Clone)]
pub enum PlotJob {
    Heatmap {
        path: PathBuf,
    },
    Histogram {
        feature: String,
        samples: Vec<(f64, u8)>,
        path: PathBuf,
    },
    BoxPlot {
        feature: String,
        samples: Vec<(f64, u8)>,
        path: PathBuf,
    },
    Counts {
        column: String,
        counts: Vec<(String, usize)>,
        path: PathBuf,
    },
}

impl PlotJob {
    pub fn path(&self) -> &Path {
        match self {
            PlotJob::Heatmap { path }
            | PlotJob::Histogram { path, .. }
            | PlotJob::BoxPlot { path, .. }
            | PlotJob::Counts { path, .. } => path,
        }
    }

    /// Render the chart to its PNG file
    pub fn render(&self, correlations: &CorrelationMatrix) -> Result<()> {
        match self {
            PlotJob::Heatmap { path } => render_correlation_heatmap(correlations, path),
            PlotJob::Histogram { samples, path, .. } => render_histogram_by_class(samples, path),
            PlotJob::BoxPlot { samples, path, .. } => render_boxplot_by_class(samples, path),
            PlotJob::Counts { counts, path, .. } => render_count_plot(counts, path),
        }
    }
}

/// Charts to render for a table
#[derive(Debug, Clone, Default)]
pub struct PlotPlan {
    pub jobs: Vec<PlotJob>,
    /// Features that get per-class charts
    pub features: Vec<String>,
    /// Set when the target is not 0/1 and the per-class charts were skipped
    pub class_plots_skipped: bool,
}

/// File-name-safe form of a column name
pub fn file_stem_for(column: &str) -> String {
    column
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

fn write_table(df: &mut DataFrame, path: PathBuf, written: &mut Vec<PathBuf>) -> Result<()> {
    save_csv(df, &path)?;
    written.push(path);
    Ok(())
}

/// Write column_summary.csv, describe.csv, correlation_matrix.csv and
/// corr_with_target.csv
pub fn write_tables(df: &DataFrame, config: &EdaConfig) -> Result<EdaTables> {
    std::fs::create_dir_all(&config.output_dir).with_context(|| {
        format!(
            "Failed to create output directory: {}",
            config.output_dir.display()
        )
    })?;
    let dir = &config.output_dir;
    let mut written = Vec::new();

    write_table(
        &mut column_summary(df)?,
        dir.join("column_summary.csv"),
        &mut written,
    )?;
    write_table(&mut describe(df)?, dir.join("describe.csv"), &mut written)?;

    let correlations = correlation_matrix(df)?;
    write_table(
        &mut correlations.to_dataframe()?,
        dir.join("correlation_matrix.csv"),
        &mut written,
    )?;

    let corr_with_target = correlation_with_target(&correlations, &config.target);
    let mut ranking = DataFrame::new(vec![
        Column::new(
            "feature".into(),
            corr_with_target
                .iter()
                .map(|(name, _)| name.clone())
                .collect::<Vec<_>>(),
        ),
        Column::new(
            "abs_corr".into(),
            corr_with_target.iter().map(|(_, c)| *c).collect::<Vec<_>>(),
        ),
    ])?;
    write_table(&mut ranking, dir.join("corr_with_target.csv"), &mut written)?;

    Ok(EdaTables {
        written,
        correlations,
        corr_with_target,
    })
}

/// Features that get per-class charts.
///
/// The strongest target correlations first; without any, the first
/// `fallback_features` non-target columns.
pub fn select_plot_features(
    df: &DataFrame,
    config: &EdaConfig,
    corr_with_target: &[(String, f64)],
) -> Vec<String> {
    if !corr_with_target.is_empty() {
        return corr_with_target
            .iter()
            .take(config.top_features)
            .map(|(name, _)| name.clone())
            .collect();
    }

    df.get_column_names()
        .iter()
        .map(|s| s.to_string())
        .filter(|name| name != &config.target)
        .take(config.fallback_features)
        .collect()
}

/// A seeded sample of at most `sample_size` rows
pub fn sample_rows(df: &DataFrame, sample_size: usize, seed: u64) -> Result<DataFrame> {
    if df.height() <= sample_size {
        return Ok(df.clone());
    }
    let mut indices: Vec<usize> = (0..df.height()).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);
    indices.truncate(sample_size);
    take_rows(df, &indices)
}

/// Non-null category counts, most frequent first; ties keep first-seen order
pub fn category_counts(df: &DataFrame, column: &str) -> Result<Vec<(String, usize)>> {
    let col = df
        .column(column)?
        .cast(&DataType::String)
        .with_context(|| format!("Failed to read column '{}' as text", column))?;

    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();
    for value in col.str()?.into_iter().flatten() {
        let n = counts.entry(value.to_string()).or_insert(0);
        if *n == 0 {
            order.push(value.to_string());
        }
        *n += 1;
    }

    let mut ranked: Vec<(String, usize)> = order
        .into_iter()
        .map(|value| {
            let n = counts[&value];
            (value, n)
        })
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    Ok(ranked)
}

fn class_samples(values: &[Option<f64>], labels: &[Option<u8>]) -> Vec<(f64, u8)> {
    values
        .iter()
        .zip(labels)
        .filter_map(|(v, l)| match (v, l) {
            (Some(v), Some(l)) if v.is_finite() => Some((*v, *l)),
            _ => None,
        })
        .collect()
}

/// Plan the heatmap, per-class charts and category count charts
pub fn plan_plots(df: &DataFrame, config: &EdaConfig, tables: &EdaTables) -> Result<PlotPlan> {
    let dir: &Path = &config.output_dir;
    let mut plan = PlotPlan::default();

    plan.jobs.push(PlotJob::Heatmap {
        path: dir.join("corr_heatmap.png"),
    });

    let features = select_plot_features(df, config, &tables.corr_with_target);
    let sample = sample_rows(df, config.sample_size, config.seed)?;

    match extract_target_labels(&sample, &config.target, None) {
        Ok(labels) => {
            for feature in &features {
                let column = sample.column(feature)?;
                if ColumnKind::of(column.dtype()) != ColumnKind::Numeric {
                    continue;
                }
                let samples = class_samples(&numeric_values(&sample, feature)?, &labels);
                let stem = file_stem_for(feature);

                plan.jobs.push(PlotJob::Histogram {
                    feature: feature.clone(),
                    samples: samples.clone(),
                    path: dir.join(format!("hist_{}.png", stem)),
                });
                plan.jobs.push(PlotJob::BoxPlot {
                    feature: feature.clone(),
                    samples,
                    path: dir.join(format!("box_{}.png", stem)),
                });
            }
            plan.features = features;
        }
        Err(_) => plan.class_plots_skipped = true,
    }

    for column in df.get_columns() {
        if ColumnKind::of(column.dtype()) != ColumnKind::Categorical {
            continue;
        }
        let name = column.name().as_str();
        plan.jobs.push(PlotJob::Counts {
            column: name.to_string(),
            counts: category_counts(df, name)?,
            path: dir.join(format!("count_{}.png", file_stem_for(name))),
        });
    }

    Ok(plan)
}

/// Plan and render every chart, returning the written paths
pub fn write_plots(df: &DataFrame, config: &EdaConfig, tables: &EdaTables) -> Result<Vec<PathBuf>> {
    let plan = plan_plots(df, config, tables)?;
    plan.jobs
        .iter()
        .map(|job| {
            job.render(&tables.correlations)?;
            Ok(job.path().to_path_buf())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_stem_replaces_separators() {
        assert_eq!(file_stem_for("PAY_AMT1"), "PAY_AMT1");
        assert_eq!(file_stem_for("bill/amt 1"), "bill_amt_1");
    }

    #[test]
    fn test_category_counts_ordered_by_frequency() {
        let df = df! { "EDU" => [Some("uni"), Some("grad"), None, Some("grad"), Some("hs")] }
            .unwrap();
        let counts = category_counts(&df, "EDU").unwrap();
        assert_eq!(
            counts,
            vec![
                ("grad".to_string(), 2),
                ("uni".to_string(), 1),
                ("hs".to_string(), 1)
            ]
        );
    }

    #[test]
    fn test_sample_rows_is_seeded_and_bounded() {
        let df = df! { "x" => (0..100i64).collect::<Vec<_>>() }.unwrap();
        let a = sample_rows(&df, 10, 7).unwrap();
        let b = sample_rows(&df, 10, 7).unwrap();
        assert_eq!(a.height(), 10);
        assert!(a.equals(&b));
        assert_eq!(sample_rows(&df, 500, 7).unwrap().height(), 100);
    }

    #[test]
    fn test_fallback_plot_features_skip_target() {
        let df = df! {
            "default" => [0i64, 1],
            "a" => [1i64, 2],
            "b" => ["x", "y"],
        }
        .unwrap();
        let config = EdaConfig::default();
        let features = select_plot_features(&df, &config, &[]);
        assert_eq!(features, vec!["a".to_string(), "b".to_string()]);
    }
}
