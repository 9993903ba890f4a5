//! Error types for schema loading and row validation

use thiserror::Error;

/// Result type for schema operations
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Errors raised while loading a schema or its rows, or while reading one row.
///
/// Violations are not errors: they are the validator's output and never show
/// up here.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Invalid schema format: {0}")]
    InvalidFormat(String),

    #[error("Invalid field spec for {table}.{field}: {reason}")]
    InvalidField {
        table: String,
        field: String,
        reason: String,
    },

    #[error("Invalid row data: {0}")]
    InvalidRows(String),

    #[error("Row {row} could not be processed: {reason}")]
    RowFault { row: usize, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

