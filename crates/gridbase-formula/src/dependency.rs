//! Dependency cycle checking for computed columns
//!
//! The dependency graph is rebuilt on demand from current catalog state at
//! each definition-time check; there is no long-lived graph object to keep
//! consistent with concurrent schema edits. An edge `X -> Y` exists when
//! X's formula references computed column Y, directly or through a one-hop
//! lookup. DFS with an explicit recursion stack reports any back edge as a
//! cycle, named by its path.
//!
//! This check runs once when a formula is saved, never per evaluation.

use ahash::AHashSet;
use gridbase_core::{Catalog, Table, TableId};

use crate::ast::{Expr, Reference};
use crate::error::{FormulaError, FormulaResult};
use crate::parser::parse_formula;

/// A column identified across tables
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnKey {
    pub table: TableId,
    pub column: String,
}

impl ColumnKey {
    pub fn new(table: TableId, column: impl Into<String>) -> Self {
        Self {
            table,
            column: column.into(),
        }
    }
}

/// The resolved dependency set of an accepted formula
///
/// `referenced` holds every column the formula reads, including fields
/// reached through lookup hops and the dependencies of computed columns it
/// expands — the set a caching layer would have to invalidate on. `computed`
/// is the subset that are themselves formula-backed.
#[derive(Debug, Default, Clone)]
pub struct DependencySet {
    pub referenced: AHashSet<ColumnKey>,
    pub computed: AHashSet<ColumnKey>,
}

/// Check that defining `column` on `table` with the given formula does not
/// create a circular computed-column dependency
///
/// Also validates, against schema only (no record needed), that every
/// reference in the proposed formula and in every reachable stored formula
/// resolves: unknown names and non-lookup first segments fail closed here,
/// at definition time.
pub fn check_computed_column(
    catalog: &Catalog,
    table: TableId,
    column: &str,
    expr: &Expr,
) -> FormulaResult<DependencySet> {
    let owner = catalog.require_table(table)?;
    let mut checker = Checker {
        catalog,
        origin: table,
        deps: DependencySet::default(),
        stack: Vec::new(),
        visited: AHashSet::new(),
    };
    checker.visit(ColumnKey::new(table, column), owner, expr)?;
    Ok(checker.deps)
}

struct Checker<'a> {
    catalog: &'a Catalog,
    origin: TableId,
    deps: DependencySet,
    stack: Vec<ColumnKey>,
    visited: AHashSet<ColumnKey>,
}

impl<'a> Checker<'a> {
    fn visit(&mut self, key: ColumnKey, table: &'a Table, expr: &Expr) -> FormulaResult<()> {
        self.stack.push(key.clone());

        for reference in expr.references() {
            let dep = self.edge(table, reference)?;
            let Some((dep_key, dep_table, dep_formula)) = dep else {
                continue;
            };

            if self.stack.contains(&dep_key) {
                return Err(FormulaError::Cycle {
                    path: self.render_cycle(&dep_key),
                });
            }
            if self.visited.contains(&dep_key) {
                continue;
            }

            let dep_expr = parse_formula(&dep_formula).map_err(|e| {
                FormulaError::Schema(format!(
                    "stored formula of '{}' is invalid: {e}",
                    dep_key.column
                ))
            })?;
            self.visit(dep_key, dep_table, &dep_expr)?;
        }

        self.stack.pop();
        self.visited.insert(key);
        Ok(())
    }

    /// Resolve one reference against the schema, recording it in the
    /// dependency set; returns the target node if it is a computed column
    fn edge(
        &mut self,
        table: &'a Table,
        reference: &Reference,
    ) -> FormulaResult<Option<(ColumnKey, &'a Table, String)>> {
        match reference {
            Reference::Column(name) => {
                let column = table.column(name).ok_or_else(|| FormulaError::UnknownColumn {
                    column: name.clone(),
                    table: table.name.clone(),
                })?;
                self.deps.referenced.insert(ColumnKey::new(table.id, name));
                match column.formula() {
                    Some(formula) => {
                        let key = ColumnKey::new(table.id, name);
                        self.deps.computed.insert(key.clone());
                        Ok(Some((key, table, formula.to_string())))
                    }
                    None => Ok(None),
                }
            }

            Reference::CrossTable { lookup, field } => {
                let column = table.column(lookup).ok_or_else(|| FormulaError::UnknownColumn {
                    column: lookup.clone(),
                    table: table.name.clone(),
                })?;
                let Some((target_id, _)) = column.lookup_target() else {
                    return Err(FormulaError::NotALookupColumn(lookup.clone()));
                };
                self.deps.referenced.insert(ColumnKey::new(table.id, lookup));

                let target = self.catalog.require_table(target_id)?;
                let target_column =
                    target.column(field).ok_or_else(|| FormulaError::UnknownColumn {
                        column: field.clone(),
                        table: target.name.clone(),
                    })?;
                self.deps.referenced.insert(ColumnKey::new(target_id, field));
                match target_column.formula() {
                    Some(formula) => {
                        let key = ColumnKey::new(target_id, field);
                        self.deps.computed.insert(key.clone());
                        Ok(Some((key, target, formula.to_string())))
                    }
                    None => Ok(None),
                }
            }
        }
    }

    /// Render the cycle path, e.g. `A -> B -> A`; columns outside the
    /// defining table are qualified with their table name
    fn render_cycle(&self, repeated: &ColumnKey) -> String {
        let start = self
            .stack
            .iter()
            .position(|k| k == repeated)
            .unwrap_or(0);
        let mut names: Vec<String> = self.stack[start..]
            .iter()
            .map(|k| self.render_key(k))
            .collect();
        names.push(self.render_key(repeated));
        names.join(" -> ")
    }

    fn render_key(&self, key: &ColumnKey) -> String {
        if key.table == self.origin {
            key.column.clone()
        } else {
            match self.catalog.table(key.table) {
                Some(t) => format!("{}.{}", t.name, key.column),
                None => key.column.clone(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridbase_core::{Column, ScalarKind};

    fn check(catalog: &Catalog, table: TableId, column: &str, formula: &str) -> FormulaResult<DependencySet> {
        let expr = parse_formula(formula).unwrap();
        check_computed_column(catalog, table, column, &expr)
    }

    #[test]
    fn test_acyclic_chain_accepted() {
        let mut catalog = Catalog::new();
        let t = catalog
            .add_table(
                "T",
                vec![
                    Column::scalar("C", ScalarKind::Number),
                    Column::computed("B", "{C}"),
                ],
            )
            .unwrap();

        // A = {B}, B = {C}, C plain: no cycle.
        let deps = check(&catalog, t, "A", "{B}").unwrap();
        assert!(deps.computed.contains(&ColumnKey::new(t, "B")));
        assert!(deps.referenced.contains(&ColumnKey::new(t, "C")));
    }

    #[test]
    fn test_two_column_cycle_rejected() {
        let mut catalog = Catalog::new();
        let t = catalog
            .add_table("T", vec![Column::computed("B", "{A}"), Column::computed("A", "{B}")])
            .unwrap();

        // Redefining A = {B} while B = {A} must be rejected.
        let err = check(&catalog, t, "A", "{B}").unwrap_err();
        assert_eq!(
            err,
            FormulaError::Cycle {
                path: "A -> B -> A".into()
            }
        );
    }

    #[test]
    fn test_self_cycle_rejected() {
        let mut catalog = Catalog::new();
        let t = catalog
            .add_table("T", vec![Column::computed("A", "1")])
            .unwrap();

        let err = check(&catalog, t, "A", "{A} + 1").unwrap_err();
        assert_eq!(err, FormulaError::Cycle { path: "A -> A".into() });
    }

    #[test]
    fn test_cross_table_cycle_rejected() {
        let mut catalog = Catalog::new();
        let rates = catalog
            .add_table("Rates", vec![Column::scalar("Name", ScalarKind::Text)])
            .unwrap();
        let orders = catalog
            .add_table(
                "Orders",
                vec![
                    Column::scalar("Name", ScalarKind::Text),
                    Column::lookup("Rate", rates, "Name"),
                ],
            )
            .unwrap();
        catalog
            .add_column(rates, Column::lookup("Order", orders, "Name"))
            .unwrap();
        // Rates.Fee references back into Orders.Total, which we now try to
        // define as referencing Rates.Fee.
        catalog
            .add_column(rates, Column::computed("Fee", "{Order.Total}"))
            .unwrap();
        catalog
            .add_column(orders, Column::computed("Total", "1"))
            .unwrap();

        let err = check(&catalog, orders, "Total", "{Rate.Fee}").unwrap_err();
        assert_eq!(
            err,
            FormulaError::Cycle {
                path: "Total -> Rates.Fee -> Total".into()
            }
        );
    }

    #[test]
    fn test_unknown_reference_fails_at_definition_time() {
        let mut catalog = Catalog::new();
        let t = catalog
            .add_table("T", vec![Column::scalar("A", ScalarKind::Number)])
            .unwrap();

        assert!(matches!(
            check(&catalog, t, "X", "{Missing}"),
            Err(FormulaError::UnknownColumn { .. })
        ));
        assert!(matches!(
            check(&catalog, t, "X", "{A.Field}"),
            Err(FormulaError::NotALookupColumn(_))
        ));
    }

    #[test]
    fn test_dependency_set_spans_lookup_hop() {
        let mut catalog = Catalog::new();
        let categories = catalog
            .add_table(
                "Categories",
                vec![
                    Column::scalar("Name", ScalarKind::Text),
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

        let deps = check(&catalog, orders, "Total", "{Category.TaxRate} * {Subtotal}").unwrap();
        assert!(deps.referenced.contains(&ColumnKey::new(orders, "Subtotal")));
        assert!(deps.referenced.contains(&ColumnKey::new(orders, "Category")));
        assert!(deps.referenced.contains(&ColumnKey::new(categories, "TaxRate")));
        assert!(deps.computed.is_empty());
    }
}
