//! Lookup candidate search
//!
//! The mechanism by which a user picks the concrete record a lookup column
//! points to: a case-insensitive substring search over the lookup target
//! table, returning the configured display field plus a few extra text
//! fields for disambiguation. Not part of the formula engine itself.

use std::collections::BTreeMap;

use gridbase_core::{Catalog, Column, Error, RecordId, Result, Table, TableId};
use serde::Serialize;

/// Maximum number of candidates returned per search
pub const SEARCH_LIMIT: usize = 20;

/// Number of extra fields surfaced per candidate for disambiguation
const CONTEXT_FIELDS: usize = 3;

/// One record a lookup column could point to
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LookupCandidate {
    pub id: RecordId,
    /// The target table's configured display field, rendered as text
    pub display: String,
    /// A few additional target-table fields for disambiguation
    pub context: BTreeMap<String, String>,
}

/// Search the target table of a lookup column for candidate records
///
/// An empty query returns the most recently created records. A non-empty
/// query is matched case-insensitively as a substring against the target
/// table's searchable columns, falling back to all text columns, then to
/// the display field alone. Matches are returned in record order, capped
/// at [`SEARCH_LIMIT`].
pub fn search_lookup_candidates(
    catalog: &Catalog,
    table: TableId,
    column: &str,
    query: &str,
) -> Result<Vec<LookupCandidate>> {
    let owner = catalog.require_table(table)?;
    let column = owner.column(column).ok_or_else(|| Error::UnknownColumn {
        table: owner.name.clone(),
        column: column.to_string(),
    })?;
    let Some((target_id, display_field)) = column.lookup_target() else {
        return Err(Error::NotALookupColumn(column.name.clone()));
    };
    let target = catalog.require_table(target_id)?;

    let query = query.trim();
    let candidates = if query.is_empty() {
        // Most recent first.
        catalog
            .records(target_id)
            .iter()
            .rev()
            .take(SEARCH_LIMIT)
            .map(|r| candidate(target, r.id, display_field, catalog))
            .collect()
    } else {
        let needle = query.to_lowercase();
        let haystack_columns = searchable_columns(target, display_field);
        catalog
            .records(target_id)
            .iter()
            .filter(|r| {
                haystack_columns.iter().any(|c| {
                    r.value(&c.name)
                        .to_string()
                        .to_lowercase()
                        .contains(&needle)
                })
            })
            .take(SEARCH_LIMIT)
            .map(|r| candidate(target, r.id, display_field, catalog))
            .collect()
    };

    tracing::debug!(
        table = %target.name,
        query,
        "lookup candidate search"
    );
    Ok(candidates)
}

/// The columns a query is matched against: explicitly searchable columns,
/// else all text columns, else the display field alone
fn searchable_columns<'a>(target: &'a Table, display_field: &str) -> Vec<&'a Column> {
    let marked: Vec<&Column> = target.columns().iter().filter(|c| c.searchable).collect();
    if !marked.is_empty() {
        return marked;
    }
    let text: Vec<&Column> = target.columns().iter().filter(|c| c.is_text()).collect();
    if !text.is_empty() {
        return text;
    }
    target
        .columns()
        .iter()
        .filter(|c| c.name == display_field)
        .collect()
}

fn candidate(
    target: &Table,
    id: RecordId,
    display_field: &str,
    catalog: &Catalog,
) -> LookupCandidate {
    let record = catalog.record(target.id, id);
    let display = record
        .map(|r| r.value(display_field).to_string())
        .unwrap_or_default();

    let mut context = BTreeMap::new();
    if let Some(record) = record {
        for column in target
            .columns()
            .iter()
            .filter(|c| c.is_text() && c.name != display_field)
            .take(CONTEXT_FIELDS)
        {
            let value = record.value(&column.name);
            if !value.is_empty() {
                context.insert(column.name.clone(), value.to_string());
            }
        }
    }

    LookupCandidate {
        id,
        display,
        context,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridbase_core::{ScalarKind, Value};
    use pretty_assertions::assert_eq;

    fn fixture() -> (Catalog, TableId, TableId) {
        let mut catalog = Catalog::new();
        let suppliers = catalog
            .add_table(
                "Suppliers",
                vec![
                    Column::scalar("Name", ScalarKind::Text).searchable(),
                    Column::scalar("Email", ScalarKind::Text),
                    Column::scalar("Rating", ScalarKind::Number),
                ],
            )
            .unwrap();
        let orders = catalog
            .add_table(
                "Orders",
                vec![Column::lookup("Supplier", suppliers, "Name")],
            )
            .unwrap();
        (catalog, suppliers, orders)
    }

    #[test]
    fn test_substring_search_case_insensitive() {
        let (mut catalog, suppliers, orders) = fixture();
        let acme = catalog
            .insert_record(
                suppliers,
                [("Name", Value::text("Acme Corp")), ("Email", Value::text("hi@acme.io"))],
            )
            .unwrap();
        catalog
            .insert_record(suppliers, [("Name", Value::text("Globex"))])
            .unwrap();

        let results = search_lookup_candidates(&catalog, orders, "Supplier", "acme").unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, acme);
        assert_eq!(results[0].display, "Acme Corp");
        assert_eq!(results[0].context.get("Email").map(String::as_str), Some("hi@acme.io"));
    }

    #[test]
    fn test_empty_query_returns_most_recent_first() {
        let (mut catalog, suppliers, orders) = fixture();
        for i in 0..3 {
            catalog
                .insert_record(suppliers, [("Name", Value::text(format!("S{i}")))])
                .unwrap();
        }

        let results = search_lookup_candidates(&catalog, orders, "Supplier", "").unwrap();
        let names: Vec<&str> = results.iter().map(|c| c.display.as_str()).collect();
        assert_eq!(names, vec!["S2", "S1", "S0"]);
    }

    #[test]
    fn test_result_cap() {
        let (mut catalog, suppliers, orders) = fixture();
        for i in 0..30 {
            catalog
                .insert_record(suppliers, [("Name", Value::text(format!("Supplier {i}")))])
                .unwrap();
        }

        let results = search_lookup_candidates(&catalog, orders, "Supplier", "supplier").unwrap();
        assert_eq!(results.len(), SEARCH_LIMIT);
    }

    #[test]
    fn test_non_lookup_column_rejected() {
        let (mut catalog, _, orders) = fixture();
        catalog
            .add_column(orders, Column::scalar("Notes", ScalarKind::Text))
            .unwrap();

        let err = search_lookup_candidates(&catalog, orders, "Notes", "x").unwrap_err();
        assert!(matches!(err, Error::NotALookupColumn(_)));
    }
}
