//! Command-line interface definitions and argument parsing

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::data::filter::{AgeRange, FilterSpec};
use crate::report::DEFAULT_BINS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Explore HR attrition: filter the employee dataset and summarise who leaves
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the employee CSV file
    #[arg(short, long, env = "ATTRITION_DATA", default_value = "data/EA.csv")]
    pub data: PathBuf,

    /// Keep only this department (repeatable; default: all departments)
    #[arg(long = "department", value_name = "NAME")]
    pub departments: Vec<String>,

    /// Keep only this gender (repeatable; default: all genders)
    #[arg(long = "gender", value_name = "NAME")]
    pub genders: Vec<String>,

    /// Lower age bound, inclusive
    #[arg(long)]
    pub age_min: Option<f64>,

    /// Upper age bound, inclusive
    #[arg(long)]
    pub age_max: Option<f64>,

    /// Report format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Number of histogram bins
    #[arg(long, default_value_t = DEFAULT_BINS)]
    pub bins: usize,

    /// Write the filtered rows to this CSV file
    #[arg(short, long, value_name = "PATH")]
    pub export: Option<PathBuf>,

    /// Print the first N filtered rows before the report
    #[arg(long, value_name = "N")]
    pub preview: Option<usize>,

    /// Print the available filter values and exit
    #[arg(long)]
    pub list_options: bool,

    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Build the filter from the flags.
    ///
    /// A single age bound is completed from `default_ages` (the dataset's
    /// observed range), or left open when the dataset has none.
    pub fn filter_spec(&self, default_ages: Option<AgeRange>) -> FilterSpec {
        let age_range = match (self.age_min, self.age_max) {
            (None, None) => None,
            (min, max) => {
                let min = min.or(default_ages.map(|r| r.min)).unwrap_or(f64::NEG_INFINITY);
                let max = max.or(default_ages.map(|r| r.max)).unwrap_or(f64::INFINITY);
                Some(AgeRange::new(min, max))
            }
        };

        FilterSpec {
            departments: self.departments.iter().cloned().collect(),
            age_range,
            genders: self.genders.iter().cloned().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_unrestricted() {
        let args = Args::try_parse_from(["attrition-dash", "--data", "hr.csv"]).unwrap();
        assert_eq!(args.data, PathBuf::from("hr.csv"));
        assert_eq!(args.format, OutputFormat::Text);
        assert_eq!(args.bins, DEFAULT_BINS);
        assert!(args.filter_spec(Some(AgeRange::new(18.0, 60.0))).is_unrestricted());
    }

    #[test]
    fn repeated_flags_build_sets() {
        let args = Args::try_parse_from([
            "attrition-dash",
            "--department",
            "Sales",
            "--department",
            "Human Resources",
            "--gender",
            "Female",
            "--format",
            "json",
        ])
        .unwrap();
        let spec = args.filter_spec(None);
        assert_eq!(spec.departments.len(), 2);
        assert!(spec.genders.contains("Female"));
        assert_eq!(args.format, OutputFormat::Json);
    }

    #[test]
    fn one_sided_age_bound_uses_dataset_range() {
        let args = Args::try_parse_from(["attrition-dash", "--age-min", "30"]).unwrap();
        assert_eq!(
            args.filter_spec(Some(AgeRange::new(18.0, 60.0))).age_range,
            Some(AgeRange::new(30.0, 60.0))
        );
        assert_eq!(
            args.filter_spec(None).age_range,
            Some(AgeRange::new(30.0, f64::INFINITY))
        );
    }
}
