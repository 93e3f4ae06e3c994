//! Table definitions

use crate::column::Column;
use crate::id::TableId;

/// A user-defined table: an identifier, a name, and an ordered set of columns
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Table {
    /// Table identifier, stable across schema edits
    pub id: TableId,
    /// Table name, unique within the catalog
    pub name: String,
    columns: Vec<Column>,
}

impl Table {
    pub(crate) fn new(id: TableId, name: String, columns: Vec<Column>) -> Self {
        Self { id, name, columns }
    }

    /// Columns in definition order
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Find a column by name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Whether a column with the given name exists
    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Columns that are formula-backed
    pub fn computed_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.is_computed())
    }

    pub(crate) fn push_column(&mut self, column: Column) {
        self.columns.push(column);
    }

    pub(crate) fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.name == name)
    }
}
