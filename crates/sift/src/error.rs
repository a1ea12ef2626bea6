//! Error types for the sift library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for sift operations.
///
/// Structural failures abort the whole call. Per-operation problems found
/// during reconciliation are not errors; they are collected as
/// [`Conflict`](crate::reconcile::Conflict)s instead.
#[derive(Debug, Error)]
pub enum SiftError {
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

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Empty file or no data to load.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// A column name that is not part of the schema.
    #[error("Unknown column '{0}'")]
    UnknownColumn(String),

    /// A row that does not fit the dataset schema.
    #[error("Schema mismatch at row {row}: {message}")]
    SchemaMismatch { row: usize, message: String },

    /// The data cannot support an explicitly requested column kind.
    #[error("Column '{column}' cannot be classified as {requested}: {reason}")]
    AmbiguousType {
        column: String,
        requested: String,
        reason: String,
    },

    /// Predicate parameters outside the column's profile or domain.
    #[error("Invalid predicate on '{column}': {reason}")]
    InvalidPredicate {
        column: String,
        reason: String,
        /// The specific values that were rejected.
        rejected: Vec<String>,
    },

    /// A view position outside the captured view.
    #[error("View position {position} out of range for view of length {len}")]
    PositionOutOfRange { position: usize, len: usize },

    /// The ledger was captured against an older dataset version.
    #[error(
        "Stale ledger: captured at version {ledger_version}, dataset is at version {dataset_version}"
    )]
    StaleLedger {
        ledger_version: u64,
        dataset_version: u64,
    },
}

impl SiftError {
    /// Build an `InvalidPredicate` error listing the rejected values.
    pub(crate) fn invalid_predicate(
        column: impl Into<String>,
        reason: impl Into<String>,
        rejected: Vec<String>,
    ) -> Self {
        SiftError::InvalidPredicate {
            column: column.into(),
            reason: reason.into(),
            rejected,
        }
    }
}

/// Result type alias for sift operations.
pub type Result<T> = std::result::Result<T, SiftError>;
