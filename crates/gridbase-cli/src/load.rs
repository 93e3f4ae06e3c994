//! JSON catalog files
//!
//! The CLI operates on a whole catalog serialized as a single JSON
//! document:
//!
//! ```json
//! {
//!   "tables": [
//!     {
//!       "name": "Categories",
//!       "columns": [
//!         { "name": "Name", "type": "text", "searchable": true },
//!         { "name": "TaxRate", "type": "number" }
//!       ],
//!       "records": [
//!         { "Name": "Food", "TaxRate": 0.1 }
//!       ]
//!     },
//!     {
//!       "name": "Orders",
//!       "columns": [
//!         { "name": "Subtotal", "type": "number" },
//!         { "name": "Category", "type": "lookup",
//!           "target": "Categories", "display_field": "Name" },
//!         { "name": "Total", "type": "formula",
//!           "formula": "{Subtotal} * (1 + {Category.TaxRate})" }
//!       ],
//!       "records": [
//!         { "Subtotal": 200, "Category": 1 }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! Column types are `text`, `number`, `date`, `boolean`, `lookup`,
//! `multiple_lookup`, and `formula`. A lookup cell holds the 1-based row
//! number of a record in the target table (an array of row numbers for
//! `multiple_lookup`); the target table's records must appear earlier in
//! the file. Dates are `YYYY-MM-DD` strings. Formula columns are defined
//! through the same validation gate the schema editor uses, so a file
//! carrying a malformed formula or a circular dependency fails to load.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use gridbase::prelude::*;
use rust_decimal::Decimal;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct CatalogFile {
    tables: Vec<TableFile>,
}

#[derive(Debug, Deserialize)]
struct TableFile {
    name: String,
    columns: Vec<ColumnFile>,
    #[serde(default)]
    records: Vec<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
struct ColumnFile {
    name: String,
    #[serde(rename = "type")]
    column_type: String,
    target: Option<String>,
    display_field: Option<String>,
    formula: Option<String>,
    #[serde(default)]
    searchable: bool,
}

/// Load a catalog from a JSON file
pub fn load_catalog(path: &Path) -> Result<Catalog> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read '{}'", path.display()))?;
    let file: CatalogFile = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse '{}'", path.display()))?;

    let mut catalog = Catalog::new();

    // Tables first, so lookup columns can target any table in the file
    // regardless of declaration order.
    let mut table_ids: HashMap<String, TableId> = HashMap::new();
    for table in &file.tables {
        let id = catalog
            .add_table(table.name.clone(), Vec::new())
            .with_context(|| format!("table '{}'", table.name))?;
        table_ids.insert(table.name.clone(), id);
    }

    // Plain and lookup columns. Formula columns wait until every column
    // they could reference exists.
    let mut formulas: Vec<(TableId, &ColumnFile)> = Vec::new();
    for table in &file.tables {
        let id = table_ids[&table.name];
        for column in &table.columns {
            if column.column_type == "formula" {
                formulas.push((id, column));
                continue;
            }
            let built = build_column(column, &table_ids)
                .with_context(|| format!("column '{}.{}'", table.name, column.name))?;
            catalog
                .add_column(id, built)
                .with_context(|| format!("column '{}.{}'", table.name, column.name))?;
        }
    }
    define_formulas(&mut catalog, formulas)?;

    // Records last, table by table in file order. Each table's row-number
    // to record-id mapping is kept so later tables can link into it.
    let mut rows: HashMap<String, Vec<RecordId>> = HashMap::new();
    for table in &file.tables {
        let id = table_ids[&table.name];
        let mut ids = Vec::with_capacity(table.records.len());
        for (row, record) in table.records.iter().enumerate() {
            let values = convert_record(&catalog, id, record, &rows)
                .with_context(|| format!("record {} of '{}'", row + 1, table.name))?;
            ids.push(
                catalog
                    .insert_record(id, values)
                    .with_context(|| format!("record {} of '{}'", row + 1, table.name))?,
            );
        }
        rows.insert(table.name.clone(), ids);
    }

    Ok(catalog)
}

fn build_column(column: &ColumnFile, table_ids: &HashMap<String, TableId>) -> Result<Column> {
    let built = match column.column_type.as_str() {
        "text" => Column::scalar(&column.name, ScalarKind::Text),
        "number" => Column::scalar(&column.name, ScalarKind::Number),
        "date" => Column::scalar(&column.name, ScalarKind::Date),
        "boolean" => Column::scalar(&column.name, ScalarKind::Boolean),
        "lookup" | "multiple_lookup" => {
            let Some(target) = &column.target else {
                bail!("lookup column is missing 'target'");
            };
            let Some(display) = &column.display_field else {
                bail!("lookup column is missing 'display_field'");
            };
            let Some(&target_id) = table_ids.get(target) else {
                bail!("lookup target '{target}' is not a table in this file");
            };
            if column.column_type == "lookup" {
                Column::lookup(&column.name, target_id, display)
            } else {
                Column::multiple_lookup(&column.name, target_id, display)
            }
        }
        other => bail!("unknown column type '{other}'"),
    };
    Ok(if column.searchable {
        built.searchable()
    } else {
        built
    })
}

/// Define formula columns through the acyclicity gate
///
/// A formula may reference formula columns declared later in the file, so
/// definitions are retried until a full pass makes no progress; a stall
/// means a genuine error (a cycle, or a reference that never resolves).
fn define_formulas(catalog: &mut Catalog, mut pending: Vec<(TableId, &ColumnFile)>) -> Result<()> {
    while !pending.is_empty() {
        let before = pending.len();
        let mut failed = Vec::new();
        let mut last_error = None;
        for (table, column) in pending {
            let Some(formula) = &column.formula else {
                bail!("formula column '{}' is missing 'formula'", column.name);
            };
            match catalog.define_computed_column(table, &column.name, formula) {
                Ok(_) => {}
                Err(e) => {
                    last_error = Some((column.name.clone(), e));
                    failed.push((table, column));
                }
            }
        }
        if failed.len() == before {
            let (column, e) = last_error.expect("non-empty pending implies an error");
            bail!("formula column '{column}': {e}");
        }
        pending = failed;
    }
    Ok(())
}

fn convert_record(
    catalog: &Catalog,
    table: TableId,
    record: &serde_json::Map<String, serde_json::Value>,
    rows: &HashMap<String, Vec<RecordId>>,
) -> Result<Vec<(String, Value)>> {
    let t = catalog.require_table(table)?;
    let mut values = Vec::with_capacity(record.len());
    for (name, json) in record {
        let Some(column) = t.column(name) else {
            bail!("no column named '{name}'");
        };
        if json.is_null() {
            continue;
        }
        let value = convert_value(catalog, column, json, rows)
            .with_context(|| format!("value for '{name}'"))?;
        values.push((name.clone(), value));
    }
    Ok(values)
}

fn convert_value(
    catalog: &Catalog,
    column: &Column,
    json: &serde_json::Value,
    rows: &HashMap<String, Vec<RecordId>>,
) -> Result<Value> {
    use serde_json::Value as Json;

    if let Some((target, _)) = column.lookup_target() {
        let target_name = &catalog.require_table(target)?.name;
        return match json {
            Json::Number(n) => Ok(Value::Link(resolve_row(target_name, n, rows)?)),
            Json::Array(items) => {
                let mut ids = Vec::with_capacity(items.len());
                for item in items {
                    let Json::Number(n) = item else {
                        bail!("expected row numbers into '{target_name}'");
                    };
                    ids.push(resolve_row(target_name, n, rows)?);
                }
                Ok(Value::Links(ids))
            }
            _ => bail!("expected a row number into '{target_name}'"),
        };
    }

    match (&column.column_type, json) {
        (ColumnType::Scalar(ScalarKind::Number), Json::Number(n)) => {
            // Parse the literal text rather than going through f64.
            let n: Decimal = n.to_string().parse()?;
            Ok(Value::Number(n))
        }
        (ColumnType::Scalar(ScalarKind::Text), Json::String(s)) => Ok(Value::text(s)),
        (ColumnType::Scalar(ScalarKind::Boolean), Json::Bool(b)) => Ok(Value::Boolean(*b)),
        (ColumnType::Scalar(ScalarKind::Date), Json::String(s)) => {
            let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .with_context(|| format!("'{s}' is not a YYYY-MM-DD date"))?;
            Ok(Value::Date(date))
        }
        _ => bail!("value does not match the column's type"),
    }
}

fn resolve_row(
    table_name: &str,
    row: &serde_json::Number,
    rows: &HashMap<String, Vec<RecordId>>,
) -> Result<RecordId> {
    let Some(ids) = rows.get(table_name) else {
        bail!("records of '{table_name}' are declared later in the file; move them first");
    };
    let Some(row) = row.as_u64().filter(|&r| r >= 1) else {
        bail!("row numbers are 1-based positive integers, got {row}");
    };
    ids.get(row as usize - 1)
        .copied()
        .with_context(|| format!("'{table_name}' has no row {row}"))
}
