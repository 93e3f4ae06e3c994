//! Record value types

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::id::RecordId;

/// Represents the value stored in a record under one column
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Value {
    /// No value (unset cell)
    Empty,

    /// Numeric value (decimal, not binary float)
    Number(Decimal),

    /// Text value
    Text(String),

    /// Boolean value
    Boolean(bool),

    /// Calendar date value
    Date(NaiveDate),

    /// Reference to a single record in another table (lookup column)
    Link(RecordId),

    /// References to a set of records in another table, in link order
    /// (multiple-lookup column)
    Links(Vec<RecordId>),
}

impl Value {
    /// Create a text value
    pub fn text<S: Into<String>>(s: S) -> Self {
        Value::Text(s.into())
    }

    /// Create a number value from anything convertible to [`Decimal`]
    pub fn number<N: Into<Decimal>>(n: N) -> Self {
        Value::Number(n.into())
    }

    /// Check if the value is unset
    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Empty)
    }

    /// Try to coerce the value to a decimal number
    ///
    /// Coercions mirror the formula evaluation rules: numbers pass through,
    /// booleans become 1/0, text is parsed as a decimal literal, and an
    /// unset value counts as zero. Dates and links have no numeric meaning.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Boolean(true) => Some(Decimal::ONE),
            Value::Boolean(false) => Some(Decimal::ZERO),
            Value::Text(s) => s.trim().parse().ok(),
            Value::Empty => Some(Decimal::ZERO),
            Value::Date(_) | Value::Link(_) | Value::Links(_) => None,
        }
    }

    /// The first linked record, if this is a link value
    ///
    /// For [`Value::Links`] the first entry in stored link order is
    /// returned, which is the documented policy for reading a
    /// multiple-lookup column as a scalar.
    pub fn first_link(&self) -> Option<RecordId> {
        match self {
            Value::Link(id) => Some(*id),
            Value::Links(ids) => ids.first().copied(),
            _ => None,
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Empty
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Empty => Ok(()),
            Value::Number(n) => write!(f, "{}", n.normalize()),
            Value::Text(s) => write!(f, "{s}"),
            Value::Boolean(true) => write!(f, "true"),
            Value::Boolean(false) => write!(f, "false"),
            Value::Date(d) => write!(f, "{d}"),
            Value::Link(id) => write!(f, "#{id}"),
            Value::Links(ids) => {
                for (i, id) in ids.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "#{id}")?;
                }
                Ok(())
            }
        }
    }
}

impl From<Decimal> for Value {
    fn from(n: Decimal) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}
