use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

use super::model::{columns, Column, Dataset, Value};

// ---------------------------------------------------------------------------
// Summary – a derived table, or the reason it was not computed
// ---------------------------------------------------------------------------

/// Outcome of a derived summary. `Skipped` is a normal result (missing
/// optional column, nothing numeric to correlate, empty view), never an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum Summary<T> {
    Computed(T),
    Skipped(SkipReason),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    MissingColumn { column: String },
    NotNumeric { column: String },
    TooFewNumericColumns { found: usize },
    EmptyView,
    InvalidBins,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingColumn { column } => write!(f, "column '{column}' not present"),
            SkipReason::NotNumeric { column } => write!(f, "column '{column}' is not numeric"),
            SkipReason::TooFewNumericColumns { found } => {
                write!(f, "needs at least two numeric columns, found {found}")
            }
            SkipReason::EmptyView => write!(f, "no rows match the current filter"),
            SkipReason::InvalidBins => write!(f, "bin count must be between 1 and {MAX_BINS}"),
        }
    }
}

impl<T> Summary<T> {
    pub fn computed(&self) -> Option<&T> {
        match self {
            Summary::Computed(v) => Some(v),
            Summary::Skipped(_) => None,
        }
    }

    pub fn is_computed(&self) -> bool {
        matches!(self, Summary::Computed(_))
    }

    pub fn skip_reason(&self) -> Option<&SkipReason> {
        match self {
            Summary::Computed(_) => None,
            Summary::Skipped(reason) => Some(reason),
        }
    }
}

impl<T> From<Result<T, SkipReason>> for Summary<T> {
    fn from(result: Result<T, SkipReason>) -> Self {
        match result {
            Ok(v) => Summary::Computed(v),
            Err(reason) => Summary::Skipped(reason),
        }
    }
}

/// group value → attrition label → cell.
pub type CrossTab<T> = BTreeMap<String, BTreeMap<String, T>>;

// ---------------------------------------------------------------------------
// Column lookups
// ---------------------------------------------------------------------------

fn require<'a>(view: &'a Dataset, name: &str) -> Result<&'a Column, SkipReason> {
    view.column(name).ok_or_else(|| SkipReason::MissingColumn {
        column: name.to_string(),
    })
}

fn require_numeric<'a>(view: &'a Dataset, name: &str) -> Result<&'a Column, SkipReason> {
    let col = require(view, name)?;
    if !col.is_numeric() {
        return Err(SkipReason::NotNumeric {
            column: name.to_string(),
        });
    }
    Ok(col)
}

fn percentages(counts: &BTreeMap<String, usize>) -> BTreeMap<String, f64> {
    let total: usize = counts.values().sum();
    if total == 0 {
        return BTreeMap::new();
    }
    counts
        .iter()
        .map(|(label, &n)| (label.clone(), n as f64 * 100.0 / total as f64))
        .collect()
}

// ---------------------------------------------------------------------------
// Attrition rates
// ---------------------------------------------------------------------------

/// Share (0–100) of each distinct `Attrition` value among the rows that have
/// one. Empty when the view is empty or has no `Attrition` column.
pub fn attrition_rate(view: &Dataset) -> BTreeMap<String, f64> {
    let Some(attrition) = view.column(columns::ATTRITION) else {
        log::warn!("no '{}' column, attrition rate not computed", columns::ATTRITION);
        return BTreeMap::new();
    };

    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for label in attrition.values.iter().filter_map(Value::label) {
        *counts.entry(label).or_default() += 1;
    }
    percentages(&counts)
}

/// Count rows per (group value, attrition label). Rows where either is null
/// are dropped. Every group lists every attrition label seen, with zero
/// where the group has none.
pub fn attrition_counts(view: &Dataset, group_column: &str) -> Summary<CrossTab<usize>> {
    count_pairs(view, group_column).into()
}

fn count_pairs(view: &Dataset, group_column: &str) -> Result<CrossTab<usize>, SkipReason> {
    let group = require(view, group_column)?;
    let attrition = require(view, columns::ATTRITION)?;

    let mut table: CrossTab<usize> = BTreeMap::new();
    for (g, a) in group.values.iter().zip(&attrition.values) {
        if let (Some(g), Some(a)) = (g.label(), a.label()) {
            *table.entry(g).or_default().entry(a).or_default() += 1;
        }
    }

    let labels: BTreeSet<String> = table.values().flat_map(|row| row.keys().cloned()).collect();
    for row in table.values_mut() {
        for label in &labels {
            row.entry(label.clone()).or_insert(0);
        }
    }
    Ok(table)
}

/// Attrition distribution within each value of `group_column`. Each group's
/// percentages sum to 100.
pub fn cross_tab_rate(view: &Dataset, group_column: &str) -> Summary<CrossTab<f64>> {
    match count_pairs(view, group_column) {
        Ok(counts) => Summary::Computed(
            counts
                .into_iter()
                .map(|(group, row)| (group, percentages(&row)))
                .collect(),
        ),
        Err(reason) => {
            log::debug!("cross tab by '{group_column}' skipped: {reason}");
            Summary::Skipped(reason)
        }
    }
}

// ---------------------------------------------------------------------------
// Numeric distributions
// ---------------------------------------------------------------------------

/// Five-number summary plus mean, as drawn by a box plot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxStats {
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub mean: f64,
}

impl BoxStats {
    /// `None` for an empty sample.
    pub fn from_values(mut values: Vec<f64>) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        values.sort_by(f64::total_cmp);
        let n = values.len();
        let mean = values.iter().sum::<f64>() / n as f64;
        Some(BoxStats {
            count: n,
            min: values[0],
            q1: quantile(&values, 0.25),
            median: quantile(&values, 0.5),
            q3: quantile(&values, 0.75),
            max: values[n - 1],
            mean,
        })
    }
}

/// Linear-interpolated quantile of sorted, non-empty data.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

fn box_stats_by_label(samples: BTreeMap<String, Vec<f64>>) -> BTreeMap<String, BoxStats> {
    samples
        .into_iter()
        .filter_map(|(label, values)| BoxStats::from_values(values).map(|s| (label, s)))
        .collect()
}

/// Box statistics of numeric `column` for each attrition label.
pub fn distribution_by_attrition(
    view: &Dataset,
    column: &str,
) -> Summary<BTreeMap<String, BoxStats>> {
    let grouped = || -> Result<BTreeMap<String, BoxStats>, SkipReason> {
        let col = require_numeric(view, column)?;
        let attrition = require(view, columns::ATTRITION)?;
        if view.is_empty() {
            return Err(SkipReason::EmptyView);
        }

        let mut samples: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        for (v, a) in col.values.iter().zip(&attrition.values) {
            if let (Some(v), Some(a)) = (v.as_f64(), a.label()) {
                samples.entry(a).or_default().push(v);
            }
        }
        Ok(box_stats_by_label(samples))
    };
    grouped().into()
}

/// Box statistics of numeric `value_column` within each value of
/// `group_column`, split by attrition label (group → label → stats).
pub fn distribution_by_group(
    view: &Dataset,
    value_column: &str,
    group_column: &str,
) -> Summary<CrossTab<BoxStats>> {
    let grouped = || -> Result<CrossTab<BoxStats>, SkipReason> {
        let col = require_numeric(view, value_column)?;
        let group = require(view, group_column)?;
        let attrition = require(view, columns::ATTRITION)?;
        if view.is_empty() {
            return Err(SkipReason::EmptyView);
        }

        let mut samples: CrossTab<Vec<f64>> = BTreeMap::new();
        let rows = col.values.iter().zip(&group.values).zip(&attrition.values);
        for ((v, g), a) in rows {
            if let (Some(v), Some(g), Some(a)) = (v.as_f64(), g.label(), a.label()) {
                samples.entry(g).or_default().entry(a).or_default().push(v);
            }
        }
        Ok(samples
            .into_iter()
            .map(|(g, by_label)| (g, box_stats_by_label(by_label)))
            .collect())
    };
    let summary: Summary<_> = grouped().into();
    if let Some(reason) = summary.skip_reason() {
        log::debug!("'{value_column}' by '{group_column}' skipped: {reason}");
    }
    summary
}

/// Largest bin count a histogram accepts.
pub const MAX_BINS: usize = 1000;

/// Equal-width histogram of a numeric column, split by attrition label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub column: String,
    /// `bins + 1` ascending edges. Bins are half-open except the last.
    pub edges: Vec<f64>,
    /// Attrition label → count per bin.
    pub counts: BTreeMap<String, Vec<usize>>,
}

impl Histogram {
    pub fn bins(&self) -> usize {
        self.edges.len().saturating_sub(1)
    }

    /// Count per bin over all labels.
    pub fn totals(&self) -> Vec<usize> {
        let mut totals = vec![0; self.bins()];
        for row in self.counts.values() {
            for (t, c) in totals.iter_mut().zip(row) {
                *t += c;
            }
        }
        totals
    }
}

/// Bucket numeric `column` into `bins` equal-width bins over its observed
/// range. A constant column collapses to a single bin. `bins` must lie in
/// `1..=MAX_BINS`.
pub fn histogram(view: &Dataset, column: &str, bins: usize) -> Summary<Histogram> {
    let build = || -> Result<Histogram, SkipReason> {
        if bins == 0 || bins > MAX_BINS {
            return Err(SkipReason::InvalidBins);
        }
        let col = require_numeric(view, column)?;
        let attrition = require(view, columns::ATTRITION)?;

        let points: Vec<(f64, String)> = col
            .values
            .iter()
            .zip(&attrition.values)
            .filter_map(|(v, a)| Some((v.as_f64()?, a.label()?)))
            .collect();
        if points.is_empty() {
            return Err(SkipReason::EmptyView);
        }

        let (min, max) = points
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (v, _)| {
                (lo.min(*v), hi.max(*v))
            });
        let bins = if max > min { bins } else { 1 };
        let width = (max - min) / bins as f64;
        let edges: Vec<f64> = (0..=bins)
            .map(|i| if i == bins { max } else { min + width * i as f64 })
            .collect();

        let mut counts: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (v, label) in points {
            let idx = if width > 0.0 {
                (((v - min) / width).floor() as usize).min(bins - 1)
            } else {
                0
            };
            counts.entry(label).or_insert_with(|| vec![0; bins])[idx] += 1;
        }

        Ok(Histogram {
            column: column.to_string(),
            edges,
            counts,
        })
    };
    build().into()
}

// ---------------------------------------------------------------------------
// Correlation
// ---------------------------------------------------------------------------

/// Symmetric Pearson correlation matrix over the numeric columns.
///
/// Off-diagonal cells are `None` when the pair has fewer than two complete
/// rows or one side has zero variance. The diagonal is always 1.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    columns: Vec<String>,
    values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Coefficient for a column pair, in either order.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        self.values[i][j]
    }

    /// Every unordered pair of distinct columns with its coefficient.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str, Option<f64>)> + '_ {
        let n = self.columns.len();
        (0..n).flat_map(move |i| {
            (i + 1..n).map(move |j| {
                (
                    self.columns[i].as_str(),
                    self.columns[j].as_str(),
                    self.values[i][j],
                )
            })
        })
    }
}

/// Pearson correlation using only rows where both cells are numeric.
///
/// Each side is divided by its largest magnitude first so sums of squares stay
/// finite for values near `f64::MAX`.
pub fn pearson_pairwise(a: &[Value], b: &[Value]) -> Option<f64> {
    let mut pairs: Vec<(f64, f64)> = a
        .iter()
        .zip(b)
        .filter_map(|(x, y)| Some((x.as_f64()?, y.as_f64()?)))
        .collect();
    if pairs.len() < 2 {
        return None;
    }

    let scale_x = pairs.iter().fold(0.0_f64, |m, p| m.max(p.0.abs()));
    let scale_y = pairs.iter().fold(0.0_f64, |m, p| m.max(p.1.abs()));
    if scale_x == 0.0 || scale_y == 0.0 || !scale_x.is_finite() || !scale_y.is_finite() {
        return None;
    }
    for p in &mut pairs {
        p.0 /= scale_x;
        p.1 /= scale_y;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
    for &(x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    let r = sxy / (sxx.sqrt() * syy.sqrt());
    r.is_finite().then(|| r.clamp(-1.0, 1.0))
}

/// Correlation between every pair of numeric columns (pairwise-complete).
/// Not applicable for an empty view or fewer than two numeric columns.
pub fn correlation_matrix(view: &Dataset) -> Summary<CorrelationMatrix> {
    if view.is_empty() {
        return Summary::Skipped(SkipReason::EmptyView);
    }
    let numeric: Vec<&Column> = view.numeric_columns().collect();
    if numeric.len() < 2 {
        return Summary::Skipped(SkipReason::TooFewNumericColumns {
            found: numeric.len(),
        });
    }

    let n = numeric.len();
    let mut values = vec![vec![None; n]; n];
    for i in 0..n {
        values[i][i] = Some(1.0);
        for j in (i + 1)..n {
            let r = pearson_pairwise(&numeric[i].values, &numeric[j].values);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    Summary::Computed(CorrelationMatrix {
        columns: numeric.iter().map(|c| c.name.clone()).collect(),
        values,
    })
}
