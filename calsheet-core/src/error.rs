//! Error types for calsheet.

use thiserror::Error;

/// Errors that can occur in calsheet operations.
#[derive(Error, Debug)]
pub enum CalSheetError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Calendar not found: {0}")]
    CalendarNotFound(String),

    #[error("Workbook not found: {0}")]
    WorkbookNotFound(String),

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Row {row} is out of range for table '{table}'")]
    RowOutOfRange { table: String, row: usize },

    #[error("Table '{table}' has no '{marker}' row")]
    MissingMarker { table: String, marker: String },

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Provider '{0}' not found in PATH")]
    ProviderNotInstalled(String),

    #[error("Provider request timed out after {0}s")]
    ProviderTimeout(u64),

    #[error("Property store error: {0}")]
    Properties(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Coarse classification used at operation boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The calendar or the container store could not be resolved.
    /// Nothing was written.
    Resolution,
    /// Anything else.
    Unexpected,
}

impl CalSheetError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CalSheetError::CalendarNotFound(_) | CalSheetError::WorkbookNotFound(_) => {
                ErrorKind::Resolution
            }
            _ => ErrorKind::Unexpected,
        }
    }
}

impl From<serde_json::Error> for CalSheetError {
    fn from(e: serde_json::Error) -> Self {
        CalSheetError::Serialization(e.to_string())
    }
}

/// Result type alias for calsheet operations.
pub type CalSheetResult<T> = Result<T, CalSheetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_errors_are_classified() {
        assert_eq!(
            CalSheetError::CalendarNotFound("work".into()).kind(),
            ErrorKind::Resolution
        );
        assert_eq!(
            CalSheetError::WorkbookNotFound("/tmp/x.json".into()).kind(),
            ErrorKind::Resolution
        );
        assert_eq!(
            CalSheetError::Provider("boom".into()).kind(),
            ErrorKind::Unexpected
        );
    }
}
