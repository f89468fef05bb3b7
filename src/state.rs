use std::path::PathBuf;
use std::sync::Arc;

use crate::data::filter::{apply_filter, FilterSpec};
use crate::data::loader::DatasetCache;
use crate::data::model::Dataset;
use crate::error::DataLoadError;
use crate::report::{DashboardReport, ReportOptions};

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// Everything one session needs, independent of how results are shown.
///
/// The dataset is read through the owned [`DatasetCache`], so changing the
/// filter never re-reads the file. The filtered view is recomputed in full
/// on every filter change.
#[derive(Debug)]
pub struct AppState {
    cache: DatasetCache,

    /// Current user constraints.
    filter: FilterSpec,

    /// Rows passing `filter` (valid once `fresh` is set).
    view: Dataset,
    fresh: bool,
}

impl AppState {
    pub fn new(data_path: impl Into<PathBuf>) -> Self {
        Self {
            cache: DatasetCache::new(data_path),
            filter: FilterSpec::default(),
            view: Dataset::default(),
            fresh: false,
        }
    }

    /// The full dataset, loaded on first access.
    pub fn dataset(&mut self) -> Result<Arc<Dataset>, DataLoadError> {
        self.cache.get()
    }

    /// Replace the filter and recompute the view.
    pub fn set_filter(&mut self, spec: FilterSpec) -> Result<&Dataset, DataLoadError> {
        self.filter = spec;
        self.refilter()
    }

    /// Back to the unrestricted filter.
    pub fn reset_filter(&mut self) -> Result<&Dataset, DataLoadError> {
        self.set_filter(FilterSpec::default())
    }

    /// Recompute the view from the cached dataset.
    pub fn refilter(&mut self) -> Result<&Dataset, DataLoadError> {
        let dataset = self.cache.get()?;
        self.view = apply_filter(&dataset, &self.filter);
        self.fresh = true;
        Ok(&self.view)
    }

    /// The current filtered view, computing it if no filter has run yet.
    pub fn view(&mut self) -> Result<&Dataset, DataLoadError> {
        if !self.fresh {
            return self.refilter();
        }
        Ok(&self.view)
    }

    /// Build the summary catalogue for the current view.
    pub fn report(&mut self, options: &ReportOptions) -> Result<DashboardReport, DataLoadError> {
        let total_rows = self.dataset()?.len();
        let filter = self.filter.clone();
        let view = self.view()?;
        Ok(DashboardReport::build(view, options).with_context(filter, total_rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::AgeRange;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn data_file() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Age,Attrition,Department").unwrap();
        writeln!(file, "25,Yes,Sales").unwrap();
        writeln!(file, "30,No,Sales").unwrap();
        writeln!(file, "35,Yes,Human Resources").unwrap();
        file
    }

    #[test]
    fn view_defaults_to_whole_dataset() {
        let file = data_file();
        let mut state = AppState::new(file.path());
        assert_eq!(state.view().unwrap().len(), 3);
    }

    #[test]
    fn filter_changes_reuse_the_cached_dataset() {
        let file = data_file();
        let mut state = AppState::new(file.path());
        let first = state.dataset().unwrap();

        let spec = FilterSpec {
            age_range: Some(AgeRange::new(26.0, 40.0)),
            ..Default::default()
        };
        assert_eq!(state.set_filter(spec).unwrap().len(), 2);
        assert_eq!(state.reset_filter().unwrap().len(), 3);
        assert!(Arc::ptr_eq(&first, &state.dataset().unwrap()));
        // the cached dataset is never narrowed by filtering
        assert_eq!(first.len(), 3);
    }

    #[test]
    fn report_carries_filter_context() {
        let file = data_file();
        let mut state = AppState::new(file.path());
        let mut spec = FilterSpec::default();
        spec.departments.insert("Sales".to_string());
        state.set_filter(spec.clone()).unwrap();

        let report = state.report(&ReportOptions::default()).unwrap();
        assert_eq!(report.rows, 2);
        assert_eq!(report.total_rows, 3);
        assert_eq!(report.filter, spec);
    }

    #[test]
    fn missing_file_surfaces_load_error() {
        let mut state = AppState::new("/definitely/not/here.csv");
        assert!(matches!(state.view(), Err(DataLoadError::Io { .. })));
    }
}
