//! Error types for the rowboat library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for rowboat operations.
#[derive(Debug, Error)]
pub enum TableError {
    /// Column name not present in the table's catalog.
    #[error("column not found: {name}")]
    UnknownColumn { name: String },

    /// Column name collision on add or rename.
    #[error("column already exists: {name}")]
    DuplicateColumn { name: String },

    /// Join mode string was not one of inner/left/right/outer.
    #[error("invalid join type: {0}")]
    InvalidJoinType(String),

    /// Cell holds a variant with no coercion rule to the requested type.
    #[error("type mismatch: cannot convert {from} cell to {to}")]
    TypeMismatch {
        from: &'static str,
        to: &'static str,
    },

    /// Textual value could not be parsed as the requested type.
    #[error("cannot convert '{value}' to {to}")]
    ConversionFailed { value: String, to: &'static str },

    /// Row index beyond the current row count.
    #[error("row index {index} out of range (table has {len} rows)")]
    IndexOutOfRange { index: usize, len: usize },

    /// Column sets of two tables do not line up for an append.
    #[error("column mismatch: {0}")]
    ColumnMismatch(String),

    /// Empty file or no data to operate on.
    #[error("empty data: {0}")]
    EmptyData(String),

    /// Statistical operation with undefined result.
    #[error("statistics error: {0}")]
    Stats(String),

    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type alias for rowboat operations.
pub type Result<T> = std::result::Result<T, TableError>;
