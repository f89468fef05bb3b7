use std::collections::BTreeSet;

use serde::Serialize;

use super::model::{columns, Column, Dataset};

// ---------------------------------------------------------------------------
// Filter predicate: which employees are in scope
// ---------------------------------------------------------------------------

/// Inclusive age bounds. `min > max` is allowed and matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AgeRange {
    pub min: f64,
    pub max: f64,
}

impl AgeRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, age: f64) -> bool {
        self.min <= age && age <= self.max
    }
}

/// User-chosen constraints.
///
/// An empty value set means "no restriction" on that column, so the
/// everything-selected default of the sidebar is a no-op rather than an empty
/// result. `age_range: None` likewise leaves `Age` unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterSpec {
    pub departments: BTreeSet<String>,
    pub age_range: Option<AgeRange>,
    pub genders: BTreeSet<String>,
}

impl FilterSpec {
    /// True when the spec cannot exclude any row.
    pub fn is_unrestricted(&self) -> bool {
        self.departments.is_empty() && self.genders.is_empty() && self.age_range.is_none()
    }
}

/// Derive the "everything selected" spec for a dataset: every distinct
/// department and gender, and the age range widened to whole years.
pub fn filter_options(dataset: &Dataset) -> FilterSpec {
    let labels = |name: &str| -> BTreeSet<String> {
        dataset
            .column(name)
            .map(|col| col.unique_values().iter().filter_map(|v| v.label()).collect())
            .unwrap_or_default()
    };

    let age_range = dataset.column(columns::AGE).and_then(|col| {
        let (min, max) = col.numbers().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
        (min <= max).then(|| AgeRange::new(min.floor(), max.ceil()))
    });

    FilterSpec {
        departments: labels(columns::DEPARTMENT),
        age_range,
        genders: labels(columns::GENDER),
    }
}

/// Does row `row` of `col` carry one of the allowed labels?
fn label_allowed(col: &Column, row: usize, allowed: &BTreeSet<String>) -> bool {
    col.values[row]
        .label()
        .is_some_and(|label| allowed.contains(&label))
}

/// Return indices of rows that pass every constraint of `spec`.
///
/// A row passes when:
/// * `Department` is absent or `spec.departments` is empty, or its value is selected
/// * `Gender`, same rule with `spec.genders`
/// * `spec.age_range` is unset, or the row's `Age` is numeric and within it.
///   Age is treated as required: a null `Age` or a missing `Age` column fails.
pub fn filtered_indices(dataset: &Dataset, spec: &FilterSpec) -> Vec<usize> {
    let department = dataset
        .column(columns::DEPARTMENT)
        .filter(|_| !spec.departments.is_empty());
    let gender = dataset
        .column(columns::GENDER)
        .filter(|_| !spec.genders.is_empty());
    let age = dataset.column(columns::AGE);

    if spec.age_range.is_some() && age.is_none() {
        log::warn!("age range set but dataset has no '{}' column", columns::AGE);
    }

    (0..dataset.len())
        .filter(|&row| {
            if let Some(col) = department {
                if !label_allowed(col, row, &spec.departments) {
                    return false;
                }
            }
            if let Some(col) = gender {
                if !label_allowed(col, row, &spec.genders) {
                    return false;
                }
            }
            if let Some(range) = &spec.age_range {
                let in_range = age
                    .and_then(|col| col.values[row].as_f64())
                    .is_some_and(|a| range.contains(a));
                if !in_range {
                    return false;
                }
            }
            true
        })
        .collect()
}

/// Apply `spec`, returning a new dataset with the matching rows in their
/// original order. `dataset` is never modified.
pub fn apply_filter(dataset: &Dataset, spec: &FilterSpec) -> Dataset {
    let indices = filtered_indices(dataset, spec);
    log::debug!("filter kept {} of {} rows", indices.len(), dataset.len());
    dataset.take(&indices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Value;

    fn sample() -> Dataset {
        Dataset::from_rows(
            &["Age", "Attrition", "Department", "Gender"],
            &[
                vec!["25", "Yes", "Sales", "Male"],
                vec!["30", "No", "Research & Development", "Female"],
                vec!["35", "Yes", "Sales", "Female"],
                vec!["40", "No", "Human Resources", "Male"],
                vec!["45", "No", "Sales", ""],
                vec!["", "No", "Sales", "Male"],
            ],
        )
        .unwrap()
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn unrestricted_spec_keeps_everything() {
        let ds = sample();
        let spec = FilterSpec::default();
        assert!(spec.is_unrestricted());
        assert_eq!(apply_filter(&ds, &spec), ds);
    }

    #[test]
    fn department_and_gender_sets() {
        let ds = sample();
        let spec = FilterSpec {
            departments: set(&["Sales"]),
            genders: set(&["Female"]),
            ..Default::default()
        };
        assert_eq!(filtered_indices(&ds, &spec), vec![2]);
    }

    #[test]
    fn null_category_never_matches() {
        let ds = sample();
        let spec = FilterSpec {
            genders: set(&["Male", "Female"]),
            ..Default::default()
        };
        assert_eq!(filtered_indices(&ds, &spec), vec![0, 1, 2, 3, 5]);
    }

    #[test]
    fn age_range_is_inclusive_and_drops_null_age() {
        let ds = sample();
        let spec = FilterSpec {
            age_range: Some(AgeRange::new(30.0, 40.0)),
            ..Default::default()
        };
        let out = apply_filter(&ds, &spec);
        assert_eq!(
            out.column("Age").unwrap().values,
            vec![Value::Integer(30), Value::Integer(35), Value::Integer(40)]
        );
    }

    #[test]
    fn inverted_range_matches_nothing() {
        let ds = sample();
        let spec = FilterSpec {
            age_range: Some(AgeRange::new(50.0, 20.0)),
            ..Default::default()
        };
        let out = apply_filter(&ds, &spec);
        assert!(out.is_empty());
        assert_eq!(out.columns().len(), 4);
    }

    #[test]
    fn absent_columns_skip_their_checks() {
        let ds = Dataset::from_rows(&["Age", "Attrition"], &[vec!["30", "Yes"]]).unwrap();
        let spec = FilterSpec {
            departments: set(&["Sales"]),
            genders: set(&["Female"]),
            ..Default::default()
        };
        assert_eq!(filtered_indices(&ds, &spec), vec![0]);
    }

    #[test]
    fn age_range_without_age_column_matches_nothing() {
        let ds = Dataset::from_rows(&["Attrition"], &[vec!["Yes"]]).unwrap();
        let spec = FilterSpec {
            age_range: Some(AgeRange::new(0.0, 100.0)),
            ..Default::default()
        };
        assert!(filtered_indices(&ds, &spec).is_empty());
    }

    #[test]
    fn options_select_everything() {
        let ds = sample();
        let opts = filter_options(&ds);
        assert_eq!(
            opts.departments,
            set(&["Human Resources", "Research & Development", "Sales"])
        );
        assert_eq!(opts.genders, set(&["Female", "Male"]));
        assert_eq!(opts.age_range, Some(AgeRange::new(25.0, 45.0)));

        // Rows with a null Age or Gender fall out, every complete row stays.
        assert_eq!(filtered_indices(&ds, &opts), vec![0, 1, 2, 3]);
    }

    #[test]
    fn options_without_age_column() {
        let ds = Dataset::from_rows(&["Attrition"], &[vec!["Yes"]]).unwrap();
        let opts = filter_options(&ds);
        assert!(opts.is_unrestricted());
    }
}
