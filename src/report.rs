use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::data::filter::FilterSpec;
use crate::data::model::{columns, Dataset};
use crate::data::summary::{
    attrition_counts, attrition_rate, correlation_matrix, cross_tab_rate, distribution_by_attrition,
    distribution_by_group, histogram, BoxStats, CorrelationMatrix, CrossTab, Histogram, Summary,
};

/// Columns whose attrition counts are shown as grouped bars.
pub const COUNT_COLUMNS: [&str; 5] = [
    columns::DEPARTMENT,
    columns::GENDER,
    columns::EDUCATION,
    columns::MARITAL_STATUS,
    columns::JOB_ROLE,
];

/// Numeric columns shown as box plots against attrition.
pub const DISTRIBUTION_COLUMNS: [&str; 4] = [
    columns::AGE,
    columns::MONTHLY_INCOME,
    columns::YEARS_SINCE_LAST_PROMOTION,
    columns::YEARS_WITH_CURR_MANAGER,
];

/// `(value, group)` pairs shown as box plots per group, split by attrition.
pub const GROUPED_DISTRIBUTIONS: [(&str, &str); 1] =
    [(columns::MONTHLY_INCOME, columns::EDUCATION)];

pub const HISTOGRAM_COLUMNS: [&str; 2] = [columns::AGE, columns::YEARS_AT_COMPANY];

/// Columns with an attrition-rate KPI table.
pub const RATE_COLUMNS: [&str; 2] = [columns::DEPARTMENT, columns::GENDER];

pub const DEFAULT_BINS: usize = 20;

/// Strongest correlation pairs listed in the text report.
const TOP_CORRELATIONS: usize = 15;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOptions {
    pub bins: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self { bins: DEFAULT_BINS }
    }
}

/// One summary of the catalogue, labelled with the column it describes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section<T> {
    pub column: String,
    pub summary: Summary<T>,
}

/// A value column summarised within each value of a grouping column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedSection<T> {
    pub column: String,
    pub group: String,
    pub summary: Summary<T>,
}

// ---------------------------------------------------------------------------
// DashboardReport – the whole catalogue for one filter
// ---------------------------------------------------------------------------

/// Every derived summary for one filtered view. Each entry is computed
/// independently; a missing optional column only skips its own sections.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardReport {
    pub filter: FilterSpec,
    pub total_rows: usize,
    pub rows: usize,
    pub attrition_rate: BTreeMap<String, f64>,
    pub counts: Vec<Section<CrossTab<usize>>>,
    pub distributions: Vec<Section<BTreeMap<String, BoxStats>>>,
    pub grouped_distributions: Vec<GroupedSection<CrossTab<BoxStats>>>,
    pub histograms: Vec<Section<Histogram>>,
    pub rates: Vec<Section<CrossTab<f64>>>,
    pub correlation: Summary<CorrelationMatrix>,
}

impl DashboardReport {
    /// Compute the catalogue over `view`. `filter` and `total_rows` describe
    /// the unfiltered context and default to "no filter" over `view` itself.
    pub fn build(view: &Dataset, options: &ReportOptions) -> Self {
        fn sections<T>(cols: &[&str], f: impl Fn(&str) -> Summary<T>) -> Vec<Section<T>> {
            cols.iter()
                .map(|&c| Section {
                    column: c.to_string(),
                    summary: f(c),
                })
                .collect()
        }

        DashboardReport {
            filter: FilterSpec::default(),
            total_rows: view.len(),
            rows: view.len(),
            attrition_rate: attrition_rate(view),
            counts: sections(&COUNT_COLUMNS, |c| attrition_counts(view, c)),
            distributions: sections(&DISTRIBUTION_COLUMNS, |c| distribution_by_attrition(view, c)),
            grouped_distributions: GROUPED_DISTRIBUTIONS
                .iter()
                .map(|&(column, group)| GroupedSection {
                    column: column.to_string(),
                    group: group.to_string(),
                    summary: distribution_by_group(view, column, group),
                })
                .collect(),
            histograms: sections(&HISTOGRAM_COLUMNS, |c| histogram(view, c, options.bins)),
            rates: sections(&RATE_COLUMNS, |c| cross_tab_rate(view, c)),
            correlation: correlation_matrix(view),
        }
    }

    pub fn with_context(mut self, filter: FilterSpec, total_rows: usize) -> Self {
        self.filter = filter;
        self.total_rows = total_rows;
        self
    }
}

// ---------------------------------------------------------------------------
// Text rendering
// ---------------------------------------------------------------------------

fn write_cross_tab<T>(
    f: &mut fmt::Formatter<'_>,
    table: &CrossTab<T>,
    cell: impl Fn(&T) -> String,
) -> fmt::Result {
    let labels: Vec<&String> = table
        .values()
        .flat_map(|row| row.keys())
        .fold(Vec::new(), |mut acc, l| {
            if !acc.contains(&l) {
                acc.push(l);
            }
            acc
        });
    let width = table.keys().map(|k| k.len()).max().unwrap_or(0).max(5);

    write!(f, "  {:<width$}", "group")?;
    for label in &labels {
        write!(f, " {label:>10}")?;
    }
    writeln!(f)?;
    for (group, row) in table {
        write!(f, "  {group:<width$}")?;
        for label in &labels {
            let text = row.get(*label).map(&cell).unwrap_or_default();
            write!(f, " {text:>10}")?;
        }
        writeln!(f)?;
    }
    Ok(())
}

fn write_skipped(
    f: &mut fmt::Formatter<'_>,
    summary_name: &str,
    reason: &impl fmt::Display,
) -> fmt::Result {
    writeln!(f, "{summary_name}")?;
    writeln!(f, "  (skipped: {reason})")
}

const BOX_HEADER: [&str; 7] = ["n", "min", "q1", "median", "q3", "max", "mean"];

fn write_box_header(f: &mut fmt::Formatter<'_>, keys: &[&str]) -> fmt::Result {
    write!(f, " ")?;
    for key in keys {
        write!(f, " {key:<10}")?;
    }
    let [n, rest @ ..] = BOX_HEADER;
    write!(f, " {n:>6}")?;
    for name in rest {
        write!(f, " {name:>10}")?;
    }
    writeln!(f)
}

fn write_box_row(f: &mut fmt::Formatter<'_>, keys: &[&str], s: &BoxStats) -> fmt::Result {
    write!(f, " ")?;
    for key in keys {
        write!(f, " {key:<10}")?;
    }
    write!(f, " {:>6}", s.count)?;
    for v in [s.min, s.q1, s.median, s.q3, s.max, s.mean] {
        write!(f, " {v:>10.2}")?;
    }
    writeln!(f)
}

impl fmt::Display for DashboardReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Employees in view: {} of {}", self.rows, self.total_rows)?;
        writeln!(f)?;

        writeln!(f, "Overall attrition rate")?;
        if self.attrition_rate.is_empty() {
            writeln!(f, "  (no data)")?;
        }
        for (label, pct) in &self.attrition_rate {
            writeln!(f, "  {label:<10} {pct:>7.2}%")?;
        }

        for section in &self.counts {
            writeln!(f)?;
            let title = format!("Attrition count by {}", section.column);
            match &section.summary {
                Summary::Computed(table) => {
                    writeln!(f, "{title}")?;
                    write_cross_tab(f, table, |n| n.to_string())?;
                }
                Summary::Skipped(reason) => write_skipped(f, &title, reason)?,
            }
        }

        for section in &self.distributions {
            writeln!(f)?;
            let title = format!("{} by attrition", section.column);
            match &section.summary {
                Summary::Computed(groups) => {
                    writeln!(f, "{title}")?;
                    write_box_header(f, &["attrition"])?;
                    for (label, s) in groups {
                        write_box_row(f, &[label.as_str()], s)?;
                    }
                }
                Summary::Skipped(reason) => write_skipped(f, &title, reason)?,
            }
        }

        for section in &self.grouped_distributions {
            writeln!(f)?;
            let title = format!("{} by {} and attrition", section.column, section.group);
            match &section.summary {
                Summary::Computed(groups) => {
                    writeln!(f, "{title}")?;
                    write_box_header(f, &[section.group.as_str(), "attrition"])?;
                    for (group, by_label) in groups {
                        for (label, s) in by_label {
                            write_box_row(f, &[group.as_str(), label.as_str()], s)?;
                        }
                    }
                }
                Summary::Skipped(reason) => write_skipped(f, &title, reason)?,
            }
        }

        for section in &self.histograms {
            writeln!(f)?;
            let title = format!("{} histogram", section.column);
            match &section.summary {
                Summary::Computed(hist) => {
                    writeln!(f, "{title}")?;
                    let labels: Vec<&String> = hist.counts.keys().collect();
                    write!(f, "  {:<21}", "bin")?;
                    for label in &labels {
                        write!(f, " {label:>8}")?;
                    }
                    writeln!(f)?;
                    for bin in 0..hist.bins() {
                        let close = if bin + 1 == hist.bins() { "]" } else { ")" };
                        let range =
                            format!("[{:.1}, {:.1}{close}", hist.edges[bin], hist.edges[bin + 1]);
                        write!(f, "  {range:<21}")?;
                        for label in &labels {
                            write!(f, " {:>8}", hist.counts[*label][bin])?;
                        }
                        writeln!(f)?;
                    }
                }
                Summary::Skipped(reason) => write_skipped(f, &title, reason)?,
            }
        }

        for section in &self.rates {
            writeln!(f)?;
            let title = format!("Attrition rate by {} (%)", section.column);
            match &section.summary {
                Summary::Computed(table) => {
                    writeln!(f, "{title}")?;
                    write_cross_tab(f, table, |pct| format!("{pct:.2}"))?;
                }
                Summary::Skipped(reason) => write_skipped(f, &title, reason)?,
            }
        }

        writeln!(f)?;
        let title = "Correlation of numeric features";
        match &self.correlation {
            Summary::Computed(matrix) => {
                writeln!(f, "{title}")?;
                let mut pairs: Vec<(&str, &str, f64)> = matrix
                    .pairs()
                    .filter_map(|(a, b, r)| Some((a, b, r?)))
                    .collect();
                pairs.sort_by(|x, y| y.2.abs().total_cmp(&x.2.abs()));
                for (a, b, r) in pairs.iter().take(TOP_CORRELATIONS) {
                    writeln!(f, "  {:<45} {r:>6.2}", format!("{a} ~ {b}"))?;
                }
                if pairs.len() > TOP_CORRELATIONS {
                    writeln!(f, "  ... {} more pairs", pairs.len() - TOP_CORRELATIONS)?;
                }
            }
            Summary::Skipped(reason) => write_skipped(f, title, reason)?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn employees() -> Dataset {
        Dataset::from_rows(
            &["Age", "Attrition", "Department", "Gender", "MonthlyIncome"],
            &[
                vec!["25", "Yes", "Sales", "Male", "2100"],
                vec!["31", "No", "Sales", "Female", "4800"],
                vec!["38", "No", "Research & Development", "Female", "6100"],
                vec!["44", "Yes", "Research & Development", "Male", "3900"],
                vec!["52", "No", "Human Resources", "Male", "9100"],
            ],
        )
        .unwrap()
    }

    #[test]
    fn builds_every_section() {
        let report = DashboardReport::build(&employees(), &ReportOptions::default());
        assert_eq!(report.rows, 5);
        assert_eq!(report.counts.len(), COUNT_COLUMNS.len());
        assert_eq!(report.distributions.len(), DISTRIBUTION_COLUMNS.len());
        assert_eq!(report.histograms.len(), HISTOGRAM_COLUMNS.len());
        assert_eq!(report.grouped_distributions.len(), GROUPED_DISTRIBUTIONS.len());
        assert_eq!(report.rates.len(), RATE_COLUMNS.len());

        let skipped: Vec<&str> = report
            .counts
            .iter()
            .filter(|s| !s.summary.is_computed())
            .map(|s| s.column.as_str())
            .collect();
        assert_eq!(skipped, vec!["Education", "MaritalStatus", "JobRole"]);
        assert!(report.correlation.is_computed());
    }

    #[test]
    fn text_rendering_mentions_rates_and_skips() {
        let report = DashboardReport::build(&employees(), &ReportOptions::default())
            .with_context(FilterSpec::default(), 12);
        let text = report.to_string();
        assert!(text.contains("Employees in view: 5 of 12"));
        assert!(text.contains(&format!("{:<10} {:>7.2}%", "Yes", 40.0)));
        assert!(text.contains("column 'JobRole' not present"));
        assert!(text.contains("Age ~ MonthlyIncome"));
    }

    #[test]
    fn json_marks_skipped_sections() {
        let report = DashboardReport::build(&employees(), &ReportOptions::default());
        let json = serde_json::to_value(&report).unwrap();
        let education = &json["counts"][2];
        assert_eq!(education["column"], "Education");
        assert_eq!(education["summary"]["status"], "skipped");
        assert_eq!(education["summary"]["data"]["reason"], "missing_column");
        assert_eq!(json["rates"][0]["summary"]["status"], "computed");
    }

    #[test]
    fn income_by_education_box_plot() {
        let skipped = DashboardReport::build(&employees(), &ReportOptions::default());
        let section = &skipped.grouped_distributions[0];
        assert_eq!(section.column, "MonthlyIncome");
        assert_eq!(section.group, "Education");
        assert!(!section.summary.is_computed());
        let text = skipped.to_string();
        assert!(text.contains(
            "MonthlyIncome by Education and attrition\n  (skipped: column 'Education' not present)"
        ));

        let with_education = Dataset::from_rows(
            &["Attrition", "Education", "MonthlyIncome"],
            &[
                vec!["Yes", "2", "2100"],
                vec!["No", "2", "4800"],
                vec!["No", "2", "6100"],
                vec!["No", "4", "9100"],
            ],
        )
        .unwrap();
        let report = DashboardReport::build(&with_education, &ReportOptions::default());
        let by_education = report.grouped_distributions[0].summary.computed().unwrap();
        assert_eq!(by_education["2"]["No"].count, 2);
        assert_eq!(by_education["2"]["No"].median, 5450.0);
        assert_eq!(by_education["4"]["No"].count, 1);

        let json = serde_json::to_value(&report).unwrap();
        let section = &json["grouped_distributions"][0];
        assert_eq!(section["group"], "Education");
        assert_eq!(section["summary"]["data"]["2"]["Yes"]["max"], 2100.0);
    }

    #[test]
    fn empty_view_renders_without_panicking() {
        let empty = employees().take(&[]);
        let report = DashboardReport::build(&empty, &ReportOptions::default());
        assert!(report.attrition_rate.is_empty());
        assert!(!report.correlation.is_computed());
        let text = report.to_string();
        assert!(text.contains("(no data)"));
    }
}
