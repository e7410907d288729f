use thiserror::Error;

use crate::ingest::ImportReport;

/// Errors raised by the bid store, the persistent backends and bulk import
#[derive(Error, Debug)]
pub enum StoreError {
    /// Key absent from both the cache and the persistent store
    #[error("bid not found: {0}")]
    NotFound(String),
    /// Duplicate key on insert
    #[error("bid already exists: {0}")]
    Conflict(String),
    #[error("invalid bid: {0}")]
    InvalidRecord(String),
    /// A single cell could not be converted; the owning row is skipped
    #[error("malformed field `{field}` in row {row}: {reason}")]
    MalformedField {
        row: usize,
        field: &'static str,
        reason: String,
    },
    /// Row shape does not match the header; aborts the whole import
    #[error("corrupt structure at line {line}: expected {expected} fields, found {found}")]
    CorruptStructure {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("no data in import source")]
    EmptyInput,
    /// The persistent store could not be reached or failed the request
    #[error("storage error: {0}")]
    Storage(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// A fatal error stopped an import after it had started writing.
    /// `report` holds the rows stored before the failure.
    #[error("import aborted after {} imported rows: {source}", .report.imported)]
    ImportAborted {
        report: Box<ImportReport>,
        #[source]
        source: Box<StoreError>,
    },
}

impl StoreError {
    /// True for errors that abort an import instead of skipping a row
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            StoreError::CorruptStructure { .. }
                | StoreError::EmptyInput
                | StoreError::Storage(_)
                | StoreError::Io(_)
                | StoreError::ImportAborted { .. }
        )
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Storage(err.to_string())
    }
}
