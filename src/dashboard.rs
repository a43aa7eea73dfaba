//! Dashboard statistics
//!
//! Computes every chart of the descriptive dashboard from the insurance
//! DataFrame: summary statistics, histograms, smoker counts, the
//! age-vs-charges scatter, children per region, the numeric correlation
//! matrix, charges-per-region boxplots and region shares.
//!
//! Each chart checks the columns it needs and degrades independently: a
//! missing or unusable column skips that one chart and contributes
//! exactly one warning, everything else still renders.

use polars::prelude::*;
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::data::missing_columns;

/// Numeric columns considered for the summary table and correlation
/// heatmap. CSV string columns (sex, smoker, region) are excluded.
pub const NUMERIC_COLUMNS: [&str; 4] = ["age", "bmi", "children", "charges"];

const BMI_HISTOGRAM_BINS: usize = 20;
const AGE_HISTOGRAM_BINS: usize = 10;

/// Full dashboard payload. `None` sections were skipped; each skip has a
/// matching entry in `warnings`.
#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub row_count: usize,
    pub summary: Vec<ColumnSummary>,
    pub bmi_histogram: Option<Histogram>,
    pub smoker_counts: Option<CategoryCounts>,
    pub age_charges: Option<ScatterSeries>,
    pub children_by_region: Option<CategoryCounts>,
    pub correlation: Option<CorrelationMatrix>,
    pub charges_by_region: Option<Vec<BoxplotStats>>,
    pub age_histogram: Option<Histogram>,
    pub region_shares: Option<CategoryCounts>,
    pub warnings: Vec<String>,
}

/// Descriptive statistics for one numeric column.
#[derive(Debug, Serialize)]
pub struct ColumnSummary {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

#[derive(Debug, Serialize)]
pub struct Histogram {
    pub column: String,
    pub bins: Vec<HistogramBin>,
}

#[derive(Debug, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Label/value pairs, sorted by descending value.
#[derive(Debug, Serialize)]
pub struct CategoryCounts {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

#[derive(Debug, Serialize)]
pub struct ScatterSeries {
    pub points: Vec<ScatterPoint>,
}

#[derive(Debug, Serialize)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
}

/// Pearson correlations; `values[i][j]` pairs `columns[i]` with `columns[j]`.
#[derive(Debug, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

/// Five-number summary of charges for one region.
#[derive(Debug, Serialize)]
pub struct BoxplotStats {
    pub label: String,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl Dashboard {
    /// Compute all dashboard sections over a loaded dataset.
    pub fn from_dataframe(df: &DataFrame) -> Dashboard {
        let mut warnings = Vec::new();

        let summary = numeric_summary(df);

        let bmi_histogram = chart(df, &["bmi"], "BMI histogram", &mut warnings, |df| {
            histogram(df, "bmi", BMI_HISTOGRAM_BINS)
        });

        let smoker_counts = chart(df, &["smoker"], "smoker count chart", &mut warnings, |df| {
            value_counts(df, "smoker")
        });

        let age_charges = chart(
            df,
            &["age", "charges"],
            "age vs charges chart",
            &mut warnings,
            |df| scatter(df, "age", "charges"),
        );

        let children_by_region = chart(
            df,
            &["region", "children"],
            "children per region chart",
            &mut warnings,
            |df| group_sum(df, "region", "children"),
        );

        let correlation = correlation_matrix(df, &mut warnings);

        let charges_by_region = chart(
            df,
            &["region", "charges"],
            "charges per region boxplot",
            &mut warnings,
            |df| region_boxplots(df, "region", "charges"),
        );

        let age_histogram = chart(df, &["age"], "age histogram", &mut warnings, |df| {
            histogram(df, "age", AGE_HISTOGRAM_BINS)
        });

        let region_shares = chart(df, &["region"], "region share chart", &mut warnings, |df| {
            value_counts(df, "region")
        });

        Dashboard {
            row_count: df.height(),
            summary,
            bmi_histogram,
            smoker_counts,
            age_charges,
            children_by_region,
            correlation,
            charges_by_region,
            age_histogram,
            region_shares,
            warnings,
        }
    }
}

/// Column-presence gate for one chart. Pushes exactly one warning when
/// anything is missing.
fn require(df: &DataFrame, cols: &[&str], chart: &str, warnings: &mut Vec<String>) -> bool {
    let missing = missing_columns(df, cols);
    if missing.is_empty() {
        true
    } else {
        warnings.push(format!(
            "Skipped {}: column(s) not found in dataset: {}",
            chart,
            missing.join(", ")
        ));
        false
    }
}

/// Runs one chart behind its column gate. A builder that comes back empty
/// even though its columns exist (an all-null column, say) still
/// contributes exactly one warning, so every `None` section in the payload
/// has a matching warning entry.
fn chart<T>(
    df: &DataFrame,
    cols: &[&str],
    name: &str,
    warnings: &mut Vec<String>,
    build: impl FnOnce(&DataFrame) -> Option<T>,
) -> Option<T> {
    if !require(df, cols, name, warnings) {
        return None;
    }
    let section = build(df);
    if section.is_none() {
        warnings.push(format!(
            "Skipped {}: no usable values in column(s) {}",
            name,
            cols.join(", ")
        ));
    }
    section
}

/// Extract a column as f64 values, dropping nulls.
fn numeric_column(df: &DataFrame, name: &str) -> Option<Vec<f64>> {
    let column = df.column(name).ok()?;
    let casted = column.cast(&DataType::Float64).ok()?;
    let values: Vec<f64> = casted.f64().ok()?.into_iter().flatten().collect();
    if values.is_empty() {
        None
    } else {
        Some(values)
    }
}

fn string_column(df: &DataFrame, name: &str) -> Option<Vec<String>> {
    let column = df.column(name).ok()?;
    let values: Vec<String> = column
        .str()
        .ok()?
        .into_iter()
        .flatten()
        .map(|s| s.to_string())
        .collect();
    if values.is_empty() {
        None
    } else {
        Some(values)
    }
}

/// Linear-interpolated percentile over an ascending-sorted slice.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    if sorted.len() == 1 {
        return sorted[0];
    }
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - lower as f64;
    sorted[lower] + fraction * (sorted[upper] - sorted[lower])
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator, matching the describe
/// table convention).
fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}

fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    if n < 2 {
        return f64::NAN;
    }
    let mx = mean(&x[..n]);
    let my = mean(&y[..n]);
    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for i in 0..n {
        let dx = x[i] - mx;
        let dy = y[i] - my;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return f64::NAN;
    }
    cov / (var_x.sqrt() * var_y.sqrt())
}

/// Describe-style table over whichever numeric columns are present.
fn numeric_summary(df: &DataFrame) -> Vec<ColumnSummary> {
    NUMERIC_COLUMNS
        .iter()
        .filter_map(|name| {
            let mut values = numeric_column(df, name)?;
            values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            Some(ColumnSummary {
                column: name.to_string(),
                count: values.len(),
                mean: mean(&values),
                std: std_dev(&values),
                min: values[0],
                q25: percentile(&values, 25.0),
                median: percentile(&values, 50.0),
                q75: percentile(&values, 75.0),
                max: values[values.len() - 1],
            })
        })
        .collect()
}

fn histogram(df: &DataFrame, column: &str, n_bins: usize) -> Option<Histogram> {
    let values = numeric_column(df, column)?;
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

    // Degenerate single-value column: one bin holding everything
    if max <= min {
        return Some(Histogram {
            column: column.to_string(),
            bins: vec![HistogramBin {
                lower: min,
                upper: max,
                count: values.len(),
            }],
        });
    }

    let width = (max - min) / n_bins as f64;
    let mut counts = vec![0usize; n_bins];
    for v in &values {
        let mut idx = ((v - min) / width) as usize;
        if idx >= n_bins {
            idx = n_bins - 1; // max value lands in the last bin
        }
        counts[idx] += 1;
    }

    let bins = counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            lower: min + i as f64 * width,
            upper: min + (i + 1) as f64 * width,
            count,
        })
        .collect();

    Some(Histogram {
        column: column.to_string(),
        bins,
    })
}

fn value_counts(df: &DataFrame, column: &str) -> Option<CategoryCounts> {
    let values = string_column(df, column)?;
    let mut counts: FxHashMap<String, usize> = FxHashMap::default();
    for v in values {
        *counts.entry(v).or_insert(0) += 1;
    }
    Some(sorted_counts(
        counts.into_iter().map(|(k, v)| (k, v as f64)).collect(),
    ))
}

fn group_sum(df: &DataFrame, key_column: &str, value_column: &str) -> Option<CategoryCounts> {
    let keys = string_column(df, key_column)?;
    let values = numeric_column(df, value_column)?;
    if keys.len() != values.len() {
        return None;
    }
    let mut sums: FxHashMap<String, f64> = FxHashMap::default();
    for (key, value) in keys.into_iter().zip(values) {
        *sums.entry(key).or_insert(0.0) += value;
    }
    Some(sorted_counts(sums.into_iter().collect()))
}

/// Sort by descending value, ties broken by label for stable output.
fn sorted_counts(mut entries: Vec<(String, f64)>) -> CategoryCounts {
    entries.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    CategoryCounts {
        labels: entries.iter().map(|(label, _)| label.clone()).collect(),
        values: entries.iter().map(|(_, value)| *value).collect(),
    }
}

fn scatter(df: &DataFrame, x_column: &str, y_column: &str) -> Option<ScatterSeries> {
    let x = numeric_column(df, x_column)?;
    let y = numeric_column(df, y_column)?;
    let points = x
        .into_iter()
        .zip(y)
        .map(|(x, y)| ScatterPoint { x, y })
        .collect();
    Some(ScatterSeries { points })
}

fn correlation_matrix(df: &DataFrame, warnings: &mut Vec<String>) -> Option<CorrelationMatrix> {
    let present: Vec<(&str, Vec<f64>)> = NUMERIC_COLUMNS
        .iter()
        .filter_map(|name| numeric_column(df, name).map(|values| (*name, values)))
        .collect();

    if present.len() < 2 {
        warnings.push(
            "Skipped correlation heatmap: fewer than two numeric columns in dataset".to_string(),
        );
        return None;
    }

    let values = present
        .iter()
        .map(|(_, x)| {
            present
                .iter()
                .map(|(_, y)| pearson(x, y))
                .collect::<Vec<f64>>()
        })
        .collect();

    Some(CorrelationMatrix {
        columns: present.iter().map(|(name, _)| name.to_string()).collect(),
        values,
    })
}

fn region_boxplots(
    df: &DataFrame,
    key_column: &str,
    value_column: &str,
) -> Option<Vec<BoxplotStats>> {
    let keys = string_column(df, key_column)?;
    let values = numeric_column(df, value_column)?;
    if keys.len() != values.len() {
        return None;
    }

    let mut groups: FxHashMap<String, Vec<f64>> = FxHashMap::default();
    for (key, value) in keys.into_iter().zip(values) {
        groups.entry(key).or_default().push(value);
    }

    let mut stats: Vec<BoxplotStats> = groups
        .into_iter()
        .map(|(label, mut group)| {
            group.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            BoxplotStats {
                label,
                min: group[0],
                q1: percentile(&group, 25.0),
                median: percentile(&group, 50.0),
                q3: percentile(&group, 75.0),
                max: group[group.len() - 1],
            }
        })
        .collect();

    stats.sort_by(|a, b| a.label.cmp(&b.label));
    Some(stats)
}
