//! Column definitions
//!
//! Columns are data, not compile-time types: [`ColumnType`] is a tagged
//! variant over plain scalars, lookups into another table, and
//! formula-backed computed columns. All reference resolution goes through
//! this indirection.

use crate::id::TableId;

/// The kind of a plain scalar column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ScalarKind {
    Text,
    Number,
    Date,
    Boolean,
}

/// The semantic type of a column
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ColumnType {
    /// Directly entered scalar value
    Scalar(ScalarKind),

    /// Reference to a single record on `target`, displayed via
    /// `display_field` on the target table
    Lookup {
        target: TableId,
        display_field: String,
    },

    /// References to a set of records on `target`
    MultipleLookup {
        target: TableId,
        display_field: String,
    },

    /// Value derived from a stored formula rather than entered directly
    Computed { formula: String },
}

/// A column on a [`Table`](crate::Table)
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Column {
    /// Column name, unique within its table
    pub name: String,
    /// Semantic type tag
    pub column_type: ColumnType,
    /// Whether lookup candidate search should match against this column
    pub searchable: bool,
}

impl Column {
    /// Create a plain scalar column
    pub fn scalar<S: Into<String>>(name: S, kind: ScalarKind) -> Self {
        Self {
            name: name.into(),
            column_type: ColumnType::Scalar(kind),
            searchable: false,
        }
    }

    /// Create a lookup column pointing at one record on `target`
    pub fn lookup<S: Into<String>, F: Into<String>>(name: S, target: TableId, display_field: F) -> Self {
        Self {
            name: name.into(),
            column_type: ColumnType::Lookup {
                target,
                display_field: display_field.into(),
            },
            searchable: false,
        }
    }

    /// Create a multiple-lookup column pointing at a set of records on `target`
    pub fn multiple_lookup<S: Into<String>, F: Into<String>>(
        name: S,
        target: TableId,
        display_field: F,
    ) -> Self {
        Self {
            name: name.into(),
            column_type: ColumnType::MultipleLookup {
                target,
                display_field: display_field.into(),
            },
            searchable: false,
        }
    }

    /// Create a computed column backed by `formula`
    pub fn computed<S: Into<String>, F: Into<String>>(name: S, formula: F) -> Self {
        Self {
            name: name.into(),
            column_type: ColumnType::Computed {
                formula: formula.into(),
            },
            searchable: false,
        }
    }

    /// Mark the column as searchable for lookup candidate search
    pub fn searchable(mut self) -> Self {
        self.searchable = true;
        self
    }

    /// Whether the column is a lookup or multiple-lookup column
    pub fn is_lookup(&self) -> bool {
        matches!(
            self.column_type,
            ColumnType::Lookup { .. } | ColumnType::MultipleLookup { .. }
        )
    }

    /// Whether the column is formula-backed
    pub fn is_computed(&self) -> bool {
        matches!(self.column_type, ColumnType::Computed { .. })
    }

    /// Whether the column holds plain text
    pub fn is_text(&self) -> bool {
        matches!(self.column_type, ColumnType::Scalar(ScalarKind::Text))
    }

    /// Lookup target table and display field, if this is a lookup column
    pub fn lookup_target(&self) -> Option<(TableId, &str)> {
        match &self.column_type {
            ColumnType::Lookup {
                target,
                display_field,
            }
            | ColumnType::MultipleLookup {
                target,
                display_field,
            } => Some((*target, display_field.as_str())),
            _ => None,
        }
    }

    /// Stored formula text, if this is a computed column
    pub fn formula(&self) -> Option<&str> {
        match &self.column_type {
            ColumnType::Computed { formula } => Some(formula.as_str()),
            _ => None,
        }
    }
}
