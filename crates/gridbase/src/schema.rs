//! Gated schema edits for computed columns
//!
//! Defining or editing a computed column must never persist a formula that
//! parses incorrectly, references unknown names, or creates a circular
//! dependency. The check runs inside the mutating call, against the catalog
//! state at commit time, so a schema change between an earlier validation
//! and the save cannot slip a cycle through.

use gridbase_core::{Catalog, Column, TableId};
use gridbase_formula::{check_computed_column, parse_formula, DependencySet, FormulaResult};

/// Extension trait adding gated computed-column definition to [`Catalog`]
pub trait CatalogSchemaExt {
    /// Define a new computed column, or replace the formula of an existing
    /// one, after parsing the formula and verifying the dependency graph
    /// stays acyclic
    ///
    /// Returns the formula's resolved dependency set on success; a caching
    /// layer would invalidate on any column in that set. On any error the
    /// catalog is unchanged.
    fn define_computed_column(
        &mut self,
        table: TableId,
        column: &str,
        formula: &str,
    ) -> FormulaResult<DependencySet>;
}

impl CatalogSchemaExt for Catalog {
    fn define_computed_column(
        &mut self,
        table: TableId,
        column: &str,
        formula: &str,
    ) -> FormulaResult<DependencySet> {
        let expr = parse_formula(formula)?;
        let deps = check_computed_column(self, table, column, &expr)?;

        let exists = self
            .require_table(table)?
            .column(column)
            .is_some();
        if exists {
            self.set_column_formula(table, column, formula)?;
        } else {
            self.add_column(table, Column::computed(column, formula))?;
        }

        tracing::debug!(
            table = %table,
            column,
            dependencies = deps.referenced.len(),
            "computed column accepted"
        );
        Ok(deps)
    }
}
