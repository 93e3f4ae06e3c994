//! The catalog: schema registry plus record store
//!
//! A [`Catalog`] owns the live, runtime-defined schema (tables and their
//! columns) and the records stored under it. The formula engine consults it
//! read-only; the only mutations are explicit schema edits and record
//! insertion.

use ahash::AHashMap;

use crate::column::{Column, ColumnType};
use crate::error::{Error, Result};
use crate::id::{RecordId, TableId};
use crate::record::Record;
use crate::table::Table;
use crate::value::Value;
use crate::{MAX_COLUMNS, MAX_NAME_LEN};

/// In-memory schema registry and record store
#[derive(Debug, Default)]
pub struct Catalog {
    tables: Vec<Table>,
    by_name: AHashMap<String, TableId>,
    records: AHashMap<TableId, Vec<Record>>,
    next_table_id: u64,
    next_record_id: u64,
}

impl Catalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self {
            tables: Vec::new(),
            by_name: AHashMap::new(),
            records: AHashMap::new(),
            next_table_id: 1,
            next_record_id: 1,
        }
    }

    // === Schema ===

    /// Add a table with the given columns, returning its id
    ///
    /// Lookup columns may target previously added tables or the table under
    /// construction itself; their display field must exist on the target.
    pub fn add_table<S: Into<String>>(&mut self, name: S, columns: Vec<Column>) -> Result<TableId> {
        let name = name.into();
        validate_name(&name)?;
        if self.by_name.contains_key(&name) {
            return Err(Error::DuplicateTable(name));
        }
        if columns.len() > MAX_COLUMNS {
            return Err(Error::TooManyColumns(name));
        }

        let id = TableId(self.next_table_id);
        for (i, column) in columns.iter().enumerate() {
            validate_name(&column.name)?;
            if columns[..i].iter().any(|c| c.name == column.name) {
                return Err(Error::DuplicateColumn {
                    table: name,
                    column: column.name.clone(),
                });
            }
            self.validate_lookup_config(column, id, &name, &columns)?;
        }

        self.next_table_id += 1;
        self.by_name.insert(name.clone(), id);
        self.tables.push(Table::new(id, name, columns));
        self.records.insert(id, Vec::new());
        Ok(id)
    }

    /// Add a column to an existing table
    pub fn add_column(&mut self, table: TableId, column: Column) -> Result<()> {
        validate_name(&column.name)?;
        {
            let t = self.require_table(table)?;
            if t.has_column(&column.name) {
                return Err(Error::DuplicateColumn {
                    table: t.name.clone(),
                    column: column.name,
                });
            }
            if t.columns().len() >= MAX_COLUMNS {
                return Err(Error::TooManyColumns(t.name.clone()));
            }
            self.validate_lookup_config(&column, table, &t.name, t.columns())?;
        }
        let t = self
            .tables
            .iter_mut()
            .find(|t| t.id == table)
            .ok_or(Error::UnknownTable(table))?;
        t.push_column(column);
        Ok(())
    }

    /// Replace the stored formula of an existing computed column
    pub fn set_column_formula(&mut self, table: TableId, column: &str, formula: &str) -> Result<()> {
        let t = self
            .tables
            .iter_mut()
            .find(|t| t.id == table)
            .ok_or(Error::UnknownTable(table))?;
        let table_name = t.name.clone();
        let col = t.column_mut(column).ok_or_else(|| Error::UnknownColumn {
            table: table_name.clone(),
            column: column.to_string(),
        })?;
        match &mut col.column_type {
            ColumnType::Computed { formula: stored } => {
                *stored = formula.to_string();
                Ok(())
            }
            _ => Err(Error::InvalidValue {
                column: column.to_string(),
                reason: "not a computed column".into(),
            }),
        }
    }

    /// Find a table by id
    pub fn table(&self, id: TableId) -> Option<&Table> {
        self.tables.iter().find(|t| t.id == id)
    }

    /// Find a table by id, failing with [`Error::UnknownTable`]
    pub fn require_table(&self, id: TableId) -> Result<&Table> {
        self.table(id).ok_or(Error::UnknownTable(id))
    }

    /// Find a table by name
    pub fn table_by_name(&self, name: &str) -> Option<&Table> {
        self.by_name.get(name).and_then(|id| self.table(*id))
    }

    /// All tables in creation order
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    // === Records ===

    /// Insert a record, returning its id
    ///
    /// Every supplied column name must exist on the table. Computed columns
    /// cannot be written: their value is derived on read, never stored.
    pub fn insert_record<S, I>(&mut self, table: TableId, values: I) -> Result<RecordId>
    where
        S: Into<String>,
        I: IntoIterator<Item = (S, Value)>,
    {
        let mut stored = AHashMap::new();
        {
            let t = self.require_table(table)?;
            for (name, value) in values {
                let name = name.into();
                let column = t.column(&name).ok_or_else(|| Error::UnknownColumn {
                    table: t.name.clone(),
                    column: name.clone(),
                })?;
                if column.is_computed() {
                    return Err(Error::InvalidValue {
                        column: name,
                        reason: "computed columns are derived, not stored".into(),
                    });
                }
                if matches!(value, Value::Link(_) | Value::Links(_)) && !column.is_lookup() {
                    return Err(Error::InvalidValue {
                        column: name,
                        reason: "link values are only valid for lookup columns".into(),
                    });
                }
                if !value.is_empty() {
                    stored.insert(name, value);
                }
            }
        }

        let id = RecordId(self.next_record_id);
        self.next_record_id += 1;
        self.records
            .entry(table)
            .or_default()
            .push(Record::new(id, stored));
        Ok(id)
    }

    /// All records of a table in creation order
    pub fn records(&self, table: TableId) -> &[Record] {
        self.records.get(&table).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Fetch a record by id
    pub fn record(&self, table: TableId, id: RecordId) -> Option<&Record> {
        self.records(table).iter().find(|r| r.id == id)
    }

    /// The most recently created record of a table
    ///
    /// Record ids are assigned monotonically, so this is the record with the
    /// highest id. The formula test harness samples this record, and its id
    /// is disclosed in the harness response so test results are reproducible.
    pub fn latest_record(&self, table: TableId) -> Option<&Record> {
        self.records(table).last()
    }

    fn validate_lookup_config(
        &self,
        column: &Column,
        own_table: TableId,
        own_name: &str,
        own_columns: &[Column],
    ) -> Result<()> {
        let Some((target, display_field)) = column.lookup_target() else {
            return Ok(());
        };
        // Self-referential lookups check the column set under construction.
        let (found, table_name) = if target == own_table {
            (
                own_columns.iter().any(|c| c.name == display_field),
                own_name.to_string(),
            )
        } else {
            let t = self.require_table(target)?;
            (t.has_column(display_field), t.name.clone())
        };
        if !found {
            return Err(Error::InvalidDisplayField {
                table: table_name,
                field: display_field.to_string(),
            });
        }
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name.len() > MAX_NAME_LEN {
        return Err(Error::InvalidName(name.to_string()));
    }
    // Dots would be ambiguous with cross-table reference syntax; braces
    // cannot appear inside a formula reference body.
    if name.contains(['.', '{', '}']) {
        return Err(Error::InvalidName(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ScalarKind;
    use pretty_assertions::assert_eq;

    fn two_table_catalog() -> (Catalog, TableId, TableId) {
        let mut catalog = Catalog::new();
        let categories = catalog
            .add_table(
                "Categories",
                vec![
                    Column::scalar("Name", ScalarKind::Text).searchable(),
                    Column::scalar("TaxRate", ScalarKind::Number),
                ],
            )
            .unwrap();
        let orders = catalog
            .add_table(
                "Orders",
                vec![
                    Column::scalar("Subtotal", ScalarKind::Number),
                    Column::lookup("Category", categories, "Name"),
                ],
            )
            .unwrap();
        (catalog, categories, orders)
    }

    #[test]
    fn test_add_table_and_lookup() {
        let (catalog, categories, orders) = two_table_catalog();
        assert_eq!(catalog.table(orders).unwrap().name, "Orders");
        assert_eq!(
            catalog
                .table(orders)
                .unwrap()
                .column("Category")
                .unwrap()
                .lookup_target(),
            Some((categories, "Name"))
        );
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut catalog = Catalog::new();
        catalog.add_table("T", vec![]).unwrap();
        assert!(matches!(
            catalog.add_table("T", vec![]),
            Err(Error::DuplicateTable(_))
        ));

        let id = catalog
            .add_table("U", vec![Column::scalar("A", ScalarKind::Text)])
            .unwrap();
        assert!(matches!(
            catalog.add_column(id, Column::scalar("A", ScalarKind::Number)),
            Err(Error::DuplicateColumn { .. })
        ));
    }

    #[test]
    fn test_lookup_display_field_must_exist() {
        let mut catalog = Catalog::new();
        let t = catalog
            .add_table("T", vec![Column::scalar("A", ScalarKind::Text)])
            .unwrap();
        let err = catalog.add_table("U", vec![Column::lookup("Ref", t, "Missing")]);
        assert!(matches!(err, Err(Error::InvalidDisplayField { .. })));
    }

    #[test]
    fn test_names_with_dots_rejected() {
        let mut catalog = Catalog::new();
        assert!(matches!(
            catalog.add_table("A.B", vec![]),
            Err(Error::InvalidName(_))
        ));
        assert!(matches!(
            catalog.add_table("T", vec![Column::scalar("A.B", ScalarKind::Text)]),
            Err(Error::InvalidName(_))
        ));
    }

    #[test]
    fn test_record_ids_monotonic_and_latest() {
        let (mut catalog, _, orders) = two_table_catalog();
        let first = catalog
            .insert_record(orders, [("Subtotal", Value::number(1))])
            .unwrap();
        let second = catalog
            .insert_record(orders, [("Subtotal", Value::number(2))])
            .unwrap();
        assert!(second > first);
        assert_eq!(catalog.latest_record(orders).unwrap().id, second);
    }

    #[test]
    fn test_computed_columns_not_writable() {
        let mut catalog = Catalog::new();
        let t = catalog
            .add_table(
                "T",
                vec![
                    Column::scalar("A", ScalarKind::Number),
                    Column::computed("B", "{A} + 1"),
                ],
            )
            .unwrap();
        let err = catalog.insert_record(t, [("B", Value::number(5))]);
        assert!(matches!(err, Err(Error::InvalidValue { .. })));
    }

    #[test]
    fn test_unknown_column_on_insert() {
        let (mut catalog, _, orders) = two_table_catalog();
        let err = catalog.insert_record(orders, [("Nope", Value::number(1))]);
        assert!(matches!(err, Err(Error::UnknownColumn { .. })));
    }

    #[test]
    fn test_set_column_formula() {
        let mut catalog = Catalog::new();
        let t = catalog
            .add_table(
                "T",
                vec![
                    Column::scalar("A", ScalarKind::Number),
                    Column::computed("B", "{A}"),
                ],
            )
            .unwrap();
        catalog.set_column_formula(t, "B", "{A} * 2").unwrap();
        assert_eq!(
            catalog.table(t).unwrap().column("B").unwrap().formula(),
            Some("{A} * 2")
        );
        assert!(catalog.set_column_formula(t, "A", "{B}").is_err());
    }
}
