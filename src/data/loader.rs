use std::collections::BTreeSet;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::DataLoadError;

use super::model::{Column, Dataset};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the employee dataset from a CSV file.
///
/// Layout: header row with column names, one employee per row. Column kinds
/// are inferred from content (see [`Column::infer`]); no column is required
/// here, missing ones are dealt with by the consumers.
pub fn load_csv(path: &Path) -> Result<Dataset, DataLoadError> {
    let file = File::open(path).map_err(|source| DataLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let dataset = read_csv(file, path)?;

    log::info!(
        "Loaded {} rows x {} columns from {}",
        dataset.len(),
        dataset.columns().len(),
        path.display()
    );
    for col in dataset.columns() {
        log::debug!("column {:?}: {:?}", col.name, col.kind);
    }

    Ok(dataset)
}

/// Parse CSV from any reader. `path` only labels errors.
pub fn read_csv<R: std::io::Read>(input: R, path: &Path) -> Result<Dataset, DataLoadError> {
    let csv_err = |source: csv::Error| DataLoadError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::Reader::from_reader(input);
    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if headers.is_empty() {
        return Err(DataLoadError::Empty {
            path: path.to_path_buf(),
        });
    }

    let mut seen = BTreeSet::new();
    for (position, h) in headers.iter().enumerate() {
        if h.is_empty() {
            return Err(DataLoadError::Malformed {
                path: path.to_path_buf(),
                reason: format!("empty column name at position {}", position + 1),
            });
        }
        if !seen.insert(h.as_str()) {
            return Err(DataLoadError::Malformed {
                path: path.to_path_buf(),
                reason: format!("duplicate column name '{h}'"),
            });
        }
    }

    // Columnar buffers of raw text, one per header.
    let mut raw: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for result in reader.records() {
        let record = result.map_err(csv_err)?;
        for (col_idx, buf) in raw.iter_mut().enumerate() {
            buf.push(record.get(col_idx).unwrap_or("").to_string());
        }
    }

    if raw[0].is_empty() {
        return Err(DataLoadError::Empty {
            path: path.to_path_buf(),
        });
    }

    let columns = headers
        .iter()
        .zip(raw.iter())
        .map(|(name, cells)| Column::infer(name.as_str(), cells))
        .collect();

    Dataset::from_columns(columns).ok_or_else(|| DataLoadError::Malformed {
        path: path.to_path_buf(),
        reason: "columns have unequal lengths".to_string(),
    })
}

// ---------------------------------------------------------------------------
// Load-once cache
// ---------------------------------------------------------------------------

/// Reads the dataset file once and hands out shared handles afterwards.
///
/// Owned by the session context; there is no process-global instance. A
/// failed load is not remembered, so the next call tries the file again.
#[derive(Debug)]
pub struct DatasetCache {
    path: PathBuf,
    dataset: Option<Arc<Dataset>>,
}

impl DatasetCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            dataset: None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.dataset.is_some()
    }

    /// The cached dataset, loading it on first use.
    pub fn get(&mut self) -> Result<Arc<Dataset>, DataLoadError> {
        if let Some(ds) = &self.dataset {
            return Ok(Arc::clone(ds));
        }
        let ds = Arc::new(load_csv(&self.path)?);
        self.dataset = Some(Arc::clone(&ds));
        Ok(ds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{ColumnKind, Value};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{contents}").unwrap();
        file
    }

    #[test]
    fn loads_and_infers_types() {
        let file = write_temp("Age,Attrition,MonthlyIncome\n41,Yes,5993\n49,No,5130.5\n");
        let ds = load_csv(file.path()).unwrap();

        assert_eq!(ds.len(), 2);
        assert_eq!(ds.column("Age").unwrap().kind, ColumnKind::Numeric);
        assert_eq!(ds.column("Attrition").unwrap().kind, ColumnKind::Categorical);
        assert_eq!(
            ds.column("MonthlyIncome").unwrap().values,
            vec![Value::Float(5993.0), Value::Float(5130.5)]
        );
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_csv(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, DataLoadError::Io { .. }));
    }

    #[test]
    fn empty_file_is_rejected() {
        let file = write_temp("");
        assert!(matches!(load_csv(file.path()), Err(DataLoadError::Empty { .. })));
    }

    #[test]
    fn header_only_is_rejected() {
        let file = write_temp("Age,Attrition\n");
        assert!(matches!(load_csv(file.path()), Err(DataLoadError::Empty { .. })));
    }

    #[test]
    fn ragged_rows_are_malformed() {
        let file = write_temp("Age,Attrition\n30,Yes\n31\n");
        assert!(matches!(load_csv(file.path()), Err(DataLoadError::Csv { .. })));
    }

    #[test]
    fn duplicate_headers_are_malformed() {
        let file = write_temp("Age,Age\n30,31\n");
        assert!(matches!(load_csv(file.path()), Err(DataLoadError::Malformed { .. })));
    }

    #[test]
    fn empty_header_is_malformed() {
        let file = write_temp("Age,,Attrition\n30,x,Yes\n");
        match load_csv(file.path()) {
            Err(DataLoadError::Malformed { reason, .. }) => assert!(reason.contains("position 2")),
            other => panic!("expected Malformed, got {other:?}"),
        }
    }

    #[test]
    fn cache_reads_file_once() {
        let file = write_temp("Age,Attrition\n30,Yes\n");
        let mut cache = DatasetCache::new(file.path());
        assert!(!cache.is_loaded());

        let first = cache.get().unwrap();
        // Removing the file proves the second call never touches disk.
        let path = file.path().to_path_buf();
        drop(file);
        assert!(!path.exists());

        let second = cache.get().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(cache.is_loaded());
    }

    #[test]
    fn failed_load_is_not_cached() {
        let mut cache = DatasetCache::new("/definitely/not/here.csv");
        assert!(cache.get().is_err());
        assert!(!cache.is_loaded());
    }
}
