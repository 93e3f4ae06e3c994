//! Error types for gridbase-core

use thiserror::Error;

use crate::id::{RecordId, TableId};

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in gridbase-core
#[derive(Debug, Error)]
pub enum Error {
    /// Table not found by id
    #[error("Table #{0} not found")]
    UnknownTable(TableId),

    /// Table not found by name
    #[error("Table not found: {0}")]
    UnknownTableName(String),

    /// Column not found on a table
    #[error("Column '{column}' not found on table '{table}'")]
    UnknownColumn { table: String, column: String },

    /// Record not found on a table
    #[error("Record #{record} not found on table '{table}'")]
    UnknownRecord { table: String, record: RecordId },

    /// Duplicate table name
    #[error("Table name already exists: {0}")]
    DuplicateTable(String),

    /// Duplicate column name within a table
    #[error("Column name already exists on table '{table}': {column}")]
    DuplicateColumn { table: String, column: String },

    /// Column is not a lookup column but was used as one
    #[error("Column '{0}' is not a lookup column")]
    NotALookupColumn(String),

    /// Lookup column configuration points at a missing display field
    #[error("Display field '{field}' not found on lookup target table '{table}'")]
    InvalidDisplayField { table: String, field: String },

    /// Invalid table or column name
    #[error("Invalid name: {0}")]
    InvalidName(String),

    /// Too many columns on a table
    #[error("Table '{0}' exceeds the column limit")]
    TooManyColumns(String),

    /// Value stored under a column that does not accept it
    #[error("Value not valid for column '{column}': {reason}")]
    InvalidValue { column: String, reason: String },
}
