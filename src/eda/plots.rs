//! PNG charts rendered with plotters
//!
//! plotters is built without a font backend, so charts carry no text; the
//! file name identifies the feature.

use std::path::Path;

use anyhow::Result;
use plotters::prelude::*;

use super::correlation::CorrelationMatrix;
use super::summary::quantile_sorted;

/// Number of bins in the per-class histograms
pub const HISTOGRAM_BINS: usize = 30;

const CLASS_COLORS: [RGBColor; 2] = [RGBColor(31, 119, 180), RGBColor(255, 127, 14)];

fn render_error<E: std::fmt::Display>(path: &Path) -> impl Fn(E) -> anyhow::Error + '_ {
    move |e| anyhow::anyhow!("Failed to render {}: {}", path.display(), e)
}

fn class_color(label: u8) -> RGBColor {
    CLASS_COLORS[usize::from(label.min(1))]
}

/// Blue-white-red color for a correlation in [-1, 1]; NaN is light grey
pub fn diverging_color(value: f64) -> RGBColor {
    const COLD: (f64, f64, f64) = (59.0, 76.0, 192.0);
    const MID: (f64, f64, f64) = (221.0, 221.0, 221.0);
    const WARM: (f64, f64, f64) = (180.0, 4.0, 38.0);

    if value.is_nan() {
        return RGBColor(245, 245, 245);
    }
    let v = value.clamp(-1.0, 1.0);
    let (from, to, t) = if v < 0.0 {
        (MID, COLD, -v)
    } else {
        (MID, WARM, v)
    };
    let lerp = |a: f64, b: f64| (a + (b - a) * t).round() as u8;
    RGBColor(lerp(from.0, to.0), lerp(from.1, to.1), lerp(from.2, to.2))
}

/// Widen a degenerate range so it can be drawn
fn padded_range(min: f64, max: f64) -> (f64, f64) {
    if (max - min).abs() < f64::EPSILON {
        (min - 0.5, max + 0.5)
    } else {
        let pad = (max - min) * 0.05;
        (min - pad, max + pad)
    }
}

/// Density histogram shared by all classes: `(bin_edges, densities)`.
///
/// Densities integrate to 1 over the bins; an empty input gives all zeros.
pub fn density_histogram(values: &[f64], min: f64, max: f64, bins: usize) -> (Vec<f64>, Vec<f64>) {
    let bins = bins.max(1);
    let (lo, hi) = if (max - min).abs() < f64::EPSILON {
        (min - 0.5, max + 0.5)
    } else {
        (min, max)
    };
    let width = (hi - lo) / bins as f64;
    let edges: Vec<f64> = (0..=bins).map(|k| lo + width * k as f64).collect();

    let mut counts = vec![0usize; bins];
    for &v in values {
        let k = (((v - lo) / width).floor() as isize).clamp(0, bins as isize - 1) as usize;
        counts[k] += 1;
    }

    let total = values.len() as f64;
    let densities = counts
        .into_iter()
        .map(|c| {
            if total > 0.0 {
                c as f64 / (total * width)
            } else {
                0.0
            }
        })
        .collect();

    (edges, densities)
}

/// Correlation heatmap, one cell per matrix entry
pub fn render_correlation_heatmap(matrix: &CorrelationMatrix, path: &Path) -> Result<()> {
    let root = BitMapBackend::new(path, (800, 800)).into_drawing_area();
    root.fill(&WHITE).map_err(render_error(path))?;

    let n = matrix.len();
    if n > 0 {
        let cells = root.margin(20, 20, 20, 20).split_evenly((n, n));
        for (k, cell) in cells.iter().enumerate() {
            let value = matrix.values[(k / n, k % n)];
            cell.fill(&diverging_color(value)).map_err(render_error(path))?;
        }
    }

    root.present().map_err(render_error(path))?;
    Ok(())
}

/// Per-class density step histograms of one feature
pub fn render_histogram_by_class(samples: &[(f64, u8)], path: &Path) -> Result<()> {
    let root = BitMapBackend::new(path, (700, 400)).into_drawing_area();
    root.fill(&WHITE).map_err(render_error(path))?;

    let min = samples.iter().map(|s| s.0).fold(f64::INFINITY, f64::min);
    let max = samples.iter().map(|s| s.0).fold(f64::NEG_INFINITY, f64::max);
    if samples.is_empty() || !min.is_finite() || !max.is_finite() {
        root.present().map_err(render_error(path))?;
        return Ok(());
    }

    let per_class: Vec<(u8, Vec<f64>, Vec<f64>)> = [0u8, 1u8]
        .iter()
        .map(|&label| {
            let values: Vec<f64> = samples
                .iter()
                .filter(|s| s.1 == label)
                .map(|s| s.0)
                .collect();
            let (edges, densities) = density_histogram(&values, min, max, HISTOGRAM_BINS);
            (label, edges, densities)
        })
        .collect();

    let y_max = per_class
        .iter()
        .flat_map(|(_, _, d)| d.iter().copied())
        .fold(0.0, f64::max);
    let y_max = if y_max > 0.0 { y_max * 1.1 } else { 1.0 };
    let (x_lo, x_hi) = padded_range(min, max);

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .build_cartesian_2d(x_lo..x_hi, 0f64..y_max)
        .map_err(render_error(path))?;

    for (label, edges, densities) in &per_class {
        let color = class_color(*label);
        chart
            .draw_series(densities.iter().enumerate().map(|(k, &d)| {
                Rectangle::new([(edges[k], 0.0), (edges[k + 1], d)], color.mix(0.2).filled())
            }))
            .map_err(render_error(path))?;

        let mut step: Vec<(f64, f64)> = vec![(edges[0], 0.0)];
        for (k, &d) in densities.iter().enumerate() {
            step.push((edges[k], d));
            step.push((edges[k + 1], d));
        }
        step.push((edges[edges.len() - 1], 0.0));
        chart
            .draw_series(std::iter::once(PathElement::new(step, color.stroke_width(2))))
            .map_err(render_error(path))?;
    }

    root.present().map_err(render_error(path))?;
    Ok(())
}

/// Quartiles, whisker ends and outliers of a sample
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub whisker_low: f64,
    pub whisker_high: f64,
    pub outliers: Vec<f64>,
}

impl BoxStats {
    /// Whiskers reach the most extreme values within 1.5 IQR of the box
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let q1 = quantile_sorted(&sorted, 0.25);
        let median = quantile_sorted(&sorted, 0.5);
        let q3 = quantile_sorted(&sorted, 0.75);
        let iqr = q3 - q1;
        let (fence_low, fence_high) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);

        let inside: Vec<f64> = sorted
            .iter()
            .copied()
            .filter(|v| *v >= fence_low && *v <= fence_high)
            .collect();
        let outliers = sorted
            .iter()
            .copied()
            .filter(|v| *v < fence_low || *v > fence_high)
            .collect();

        Some(Self {
            q1,
            median,
            q3,
            whisker_low: inside.first().copied().unwrap_or(q1),
            whisker_high: inside.last().copied().unwrap_or(q3),
            outliers,
        })
    }
}

/// Side-by-side box plots of one feature for class 0 and class 1
pub fn render_boxplot_by_class(samples: &[(f64, u8)], path: &Path) -> Result<()> {
    let root = BitMapBackend::new(path, (600, 400)).into_drawing_area();
    root.fill(&WHITE).map_err(render_error(path))?;

    let boxes: Vec<(u8, BoxStats)> = [0u8, 1u8]
        .iter()
        .filter_map(|&label| {
            let values: Vec<f64> = samples
                .iter()
                .filter(|s| s.1 == label)
                .map(|s| s.0)
                .collect();
            BoxStats::from_values(&values).map(|stats| (label, stats))
        })
        .collect();

    if boxes.is_empty() {
        root.present().map_err(render_error(path))?;
        return Ok(());
    }

    let min = samples.iter().map(|s| s.0).fold(f64::INFINITY, f64::min);
    let max = samples.iter().map(|s| s.0).fold(f64::NEG_INFINITY, f64::max);
    let (y_lo, y_hi) = padded_range(min, max);

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .build_cartesian_2d(0f64..2f64, y_lo..y_hi)
        .map_err(render_error(path))?;

    for (label, stats) in &boxes {
        let color = class_color(*label);
        let center = f64::from(*label) + 0.5;
        let (left, right) = (center - 0.3, center + 0.3);

        chart
            .draw_series(std::iter::once(Rectangle::new(
                [(left, stats.q1), (right, stats.q3)],
                color.mix(0.6).filled(),
            )))
            .map_err(render_error(path))?;

        let lines = vec![
            vec![(left, stats.median), (right, stats.median)],
            vec![(center, stats.q3), (center, stats.whisker_high)],
            vec![(center, stats.q1), (center, stats.whisker_low)],
            vec![(center - 0.15, stats.whisker_high), (center + 0.15, stats.whisker_high)],
            vec![(center - 0.15, stats.whisker_low), (center + 0.15, stats.whisker_low)],
        ];
        chart
            .draw_series(
                lines
                    .into_iter()
                    .map(|points| PathElement::new(points, BLACK.stroke_width(2))),
            )
            .map_err(render_error(path))?;

        chart
            .draw_series(
                stats
                    .outliers
                    .iter()
                    .map(|&v| Circle::new((center, v), 3, BLACK.stroke_width(1))),
            )
            .map_err(render_error(path))?;
    }

    root.present().map_err(render_error(path))?;
    Ok(())
}

/// Bar chart of category counts, in the order given
pub fn render_count_plot(counts: &[(String, usize)], path: &Path) -> Result<()> {
    let root = BitMapBackend::new(path, (600, 400)).into_drawing_area();
    root.fill(&WHITE).map_err(render_error(path))?;

    let max_count = counts.iter().map(|(_, n)| *n).max().unwrap_or(0);
    if counts.is_empty() || max_count == 0 {
        root.present().map_err(render_error(path))?;
        return Ok(());
    }

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .build_cartesian_2d(0f64..counts.len() as f64, 0f64..max_count as f64 * 1.05)
        .map_err(render_error(path))?;

    chart
        .draw_series(counts.iter().enumerate().map(|(k, (_, n))| {
            Rectangle::new(
                [(k as f64 + 0.1, 0.0), (k as f64 + 0.9, *n as f64)],
                CLASS_COLORS[0].filled(),
            )
        }))
        .map_err(render_error(path))?;

    root.present().map_err(render_error(path))?;
    Ok(())
}
