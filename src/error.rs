use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Loader errors
// ---------------------------------------------------------------------------

/// Failure to turn the input file into a [`Dataset`](crate::data::model::Dataset).
///
/// Fatal to the session: the caller reports it and stops, there is no retry.
#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{} is malformed: {reason}", .path.display())]
    Malformed { path: PathBuf, reason: String },

    #[error("{} contains no data rows", .path.display())]
    Empty { path: PathBuf },
}

// ---------------------------------------------------------------------------
// Export errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
