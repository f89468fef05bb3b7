//! attrition-dash: HR attrition exploration.
//!
//! Loads an employee CSV once per session, narrows it with a [`FilterSpec`]
//! and derives the summaries an attrition dashboard shows: overall and
//! per-group attrition rates, count tables, box statistics, histograms and
//! a pairwise-complete correlation matrix.

pub mod cli;
pub mod data;
pub mod error;
pub mod report;
pub mod state;

pub use data::export::{to_csv_string, write_csv, write_csv_file};
pub use data::filter::{apply_filter, filter_options, filtered_indices, AgeRange, FilterSpec};
pub use data::loader::{load_csv, DatasetCache};
pub use data::model::{Column, ColumnKind, Dataset, Value};
pub use data::summary::{
    attrition_counts, attrition_rate, correlation_matrix, cross_tab_rate, distribution_by_attrition,
    distribution_by_group, histogram, BoxStats, CorrelationMatrix, CrossTab, Histogram, SkipReason,
    Summary, MAX_BINS,
};
pub use error::{DataLoadError, ExportError};
pub use report::{DashboardReport, ReportOptions};
pub use state::AppState;
