//! Formula error taxonomy
//!
//! Every failure mode is a distinct, user-readable kind so the table
//! designer UI can highlight the offending reference or character instead
//! of showing a blanket "formula invalid" message. All of these are local,
//! recoverable conditions; none abort the evaluating process.

use thiserror::Error;

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Errors that can occur while parsing, resolving, checking, or evaluating
/// a formula
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormulaError {
    /// Invalid character outside a reference body, with its byte offset
    #[error("Invalid character '{character}' at position {position}")]
    Lex { position: usize, character: char },

    /// A '{{' was never closed by a matching '}}'
    #[error("Unterminated reference starting at position {position}: missing '}}'")]
    UnterminatedReference { position: usize },

    /// Malformed expression, with a human-readable expectation
    #[error("Parse error: {0}")]
    Parse(String),

    /// A referenced column name does not exist on the expected table
    #[error("Unknown column '{column}' on table '{table}'")]
    UnknownColumn { column: String, table: String },

    /// A cross-table reference's first segment is not a lookup column
    #[error("Column '{0}' is not a lookup column")]
    NotALookupColumn(String),

    /// A resolved value cannot be coerced to a number
    #[error("Value of '{column}' is not numeric")]
    TypeMismatch { column: String },

    /// Evaluation-time division by zero
    #[error("Division by zero")]
    DivisionByZero,

    /// Decimal arithmetic exceeded the representable range
    #[error("Numeric overflow in formula arithmetic")]
    Overflow,

    /// The formula would create a circular computed-column dependency
    #[error("Circular dependency: {path}")]
    Cycle { path: String },

    /// The test harness has no record to evaluate against
    #[error("Table '{table}' has no records to test the formula against")]
    NoSampleRecord { table: String },

    /// Schema registry inconsistency (not a user formula mistake)
    #[error("Schema error: {0}")]
    Schema(String),
}

impl From<gridbase_core::Error> for FormulaError {
    fn from(err: gridbase_core::Error) -> Self {
        FormulaError::Schema(err.to_string())
    }
}
