//! Record storage

use ahash::AHashMap;

use crate::id::RecordId;
use crate::value::Value;

/// A record belonging to exactly one table, holding one value per column
#[derive(Debug, Clone)]
pub struct Record {
    /// Record identifier; higher ids were created later
    pub id: RecordId,
    values: AHashMap<String, Value>,
}

impl Record {
    pub(crate) fn new(id: RecordId, values: AHashMap<String, Value>) -> Self {
        Self { id, values }
    }

    /// The stored value for a column, or [`Value::Empty`] if unset
    pub fn value(&self, column: &str) -> &Value {
        static EMPTY: Value = Value::Empty;
        self.values.get(column).unwrap_or(&EMPTY)
    }

    /// Columns that have a stored value, in arbitrary order
    pub fn values(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}
