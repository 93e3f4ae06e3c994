//! Formula test harness
//!
//! Runs the full pipeline — tokenize, parse, resolve against one sample
//! record, evaluate — without persisting anything. Used for author-time
//! validation behind the formula editor's test button.

use gridbase_core::{Catalog, RecordId, TableId};
use gridbase_formula::{evaluate, parse_formula, resolve, FormulaError, FormulaResult, ResolveContext};
use rust_decimal::Decimal;

/// Result of a successful formula test run
#[derive(Debug, Clone, PartialEq)]
pub struct FormulaTest {
    /// The evaluated scalar
    pub result: Decimal,
    /// Whether the formula text contains any `{Lookup.Field}` reference
    pub uses_cross_table_refs: bool,
    /// The record the formula was evaluated against, disclosed so the
    /// result is reproducible
    pub tested_with_record: RecordId,
}

/// Test a formula against the most recently created record of a table
///
/// Sample record policy: the record with the highest id. An empty table is
/// reported as [`FormulaError::NoSampleRecord`], which is distinguishable
/// from every parse, resolution, and arithmetic error.
pub fn test_formula(catalog: &Catalog, table: TableId, formula: &str) -> FormulaResult<FormulaTest> {
    let table = catalog.require_table(table)?;

    let expr = parse_formula(formula)?;

    let Some(record) = catalog.latest_record(table.id) else {
        return Err(FormulaError::NoSampleRecord {
            table: table.name.clone(),
        });
    };

    let ctx = ResolveContext::new(catalog, table, record);
    let resolution = resolve(&expr, &ctx)?;
    let result = evaluate(&resolution.expr)?;

    tracing::debug!(
        table = %table.name,
        record = %record.id,
        %result,
        "formula test evaluated"
    );

    Ok(FormulaTest {
        result,
        uses_cross_table_refs: resolution.uses_cross_table_refs,
        tested_with_record: record.id,
    })
}
