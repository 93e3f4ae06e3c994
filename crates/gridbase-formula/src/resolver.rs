//! Reference resolver
//!
//! Binds every reference in an expression tree against the owning table, a
//! concrete record, and the live catalog. Resolution fails closed on any
//! unresolvable name; an unset lookup link resolves to a defined empty
//! binding instead of erroring.

use gridbase_core::{Catalog, Record, Table, Value};

use crate::ast::{BinaryOp, Expr, Reference};
use crate::error::{FormulaError, FormulaResult};
use crate::parser::parse_formula;

/// Read-only context a formula is resolved against
pub struct ResolveContext<'a> {
    pub catalog: &'a Catalog,
    pub table: &'a Table,
    pub record: &'a Record,
}

impl<'a> ResolveContext<'a> {
    pub fn new(catalog: &'a Catalog, table: &'a Table, record: &'a Record) -> Self {
        Self {
            catalog,
            table,
            record,
        }
    }
}

/// An expression with every reference replaced by its bound value
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedExpr {
    Number(rust_decimal::Decimal),
    /// A reference bound to the value it resolved to; `column` is kept for
    /// error attribution during evaluation
    Binding { column: String, value: Value },
    BinaryOp {
        op: BinaryOp,
        left: Box<ResolvedExpr>,
        right: Box<ResolvedExpr>,
    },
    Grouping(Box<ResolvedExpr>),
}

/// Outcome of resolving an expression
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub expr: ResolvedExpr,
    /// Whether the resolved formula itself (not formulas of computed
    /// columns it references) contains a cross-table reference
    pub uses_cross_table_refs: bool,
}

/// Resolve every reference in `expr` against the context
pub fn resolve(expr: &Expr, ctx: &ResolveContext) -> FormulaResult<Resolution> {
    let mut resolver = Resolver { stack: Vec::new() };
    let resolved = resolver.resolve_expr(expr, ctx)?;
    Ok(Resolution {
        expr: resolved,
        uses_cross_table_refs: expr.uses_cross_table_refs(),
    })
}

struct Resolver {
    /// Computed columns currently being expanded, as (table id, column name).
    /// Definitions are cycle-checked at save time; this guards catalogs
    /// assembled through the raw mutators.
    stack: Vec<(gridbase_core::TableId, String)>,
}

impl Resolver {
    fn resolve_expr(&mut self, expr: &Expr, ctx: &ResolveContext) -> FormulaResult<ResolvedExpr> {
        match expr {
            Expr::Number(n) => Ok(ResolvedExpr::Number(*n)),
            Expr::Reference(r) => self.resolve_reference(r, ctx),
            Expr::BinaryOp { op, left, right } => Ok(ResolvedExpr::BinaryOp {
                op: *op,
                left: Box::new(self.resolve_expr(left, ctx)?),
                right: Box::new(self.resolve_expr(right, ctx)?),
            }),
            Expr::Grouping(inner) => Ok(ResolvedExpr::Grouping(Box::new(
                self.resolve_expr(inner, ctx)?,
            ))),
        }
    }

    fn resolve_reference(
        &mut self,
        reference: &Reference,
        ctx: &ResolveContext,
    ) -> FormulaResult<ResolvedExpr> {
        match reference {
            Reference::Column(name) => {
                let column = ctx.table.column(name).ok_or_else(|| {
                    FormulaError::UnknownColumn {
                        column: name.clone(),
                        table: ctx.table.name.clone(),
                    }
                })?;

                if let Some(formula) = column.formula() {
                    return self.expand_computed(ctx.table.id, name, formula, ctx);
                }

                Ok(ResolvedExpr::Binding {
                    column: name.clone(),
                    value: ctx.record.value(name).clone(),
                })
            }

            Reference::CrossTable { lookup, field } => {
                let column = ctx.table.column(lookup).ok_or_else(|| {
                    FormulaError::UnknownColumn {
                        column: lookup.clone(),
                        table: ctx.table.name.clone(),
                    }
                })?;
                let Some((target_id, _)) = column.lookup_target() else {
                    return Err(FormulaError::NotALookupColumn(lookup.clone()));
                };

                let bound_name = format!("{lookup}.{field}");

                // Unset link: the whole sub-expression resolves to a defined
                // empty value (0 under arithmetic), not an error. For a
                // multiple-lookup column the first stored link is used.
                let Some(linked) = ctx.record.value(lookup).first_link() else {
                    return Ok(ResolvedExpr::Binding {
                        column: bound_name,
                        value: Value::Empty,
                    });
                };

                let target_table = ctx
                    .catalog
                    .table(target_id)
                    .ok_or_else(|| FormulaError::Schema(format!("lookup target table #{target_id} not found")))?;
                let target_column = target_table.column(field).ok_or_else(|| {
                    FormulaError::UnknownColumn {
                        column: field.clone(),
                        table: target_table.name.clone(),
                    }
                })?;

                // Dangling links behave like unset ones.
                let Some(target_record) = ctx.catalog.record(target_id, linked) else {
                    return Ok(ResolvedExpr::Binding {
                        column: bound_name,
                        value: Value::Empty,
                    });
                };

                if let Some(formula) = target_column.formula() {
                    let target_ctx = ResolveContext::new(ctx.catalog, target_table, target_record);
                    return self.expand_computed(target_id, field, formula, &target_ctx);
                }

                Ok(ResolvedExpr::Binding {
                    column: bound_name,
                    value: target_record.value(field).clone(),
                })
            }
        }
    }

    /// Inline a referenced computed column by resolving its stored formula
    fn expand_computed(
        &mut self,
        table: gridbase_core::TableId,
        column: &str,
        formula: &str,
        ctx: &ResolveContext,
    ) -> FormulaResult<ResolvedExpr> {
        let key = (table, column.to_string());
        if self.stack.contains(&key) {
            let mut path: Vec<&str> = self.stack.iter().map(|(_, c)| c.as_str()).collect();
            path.push(column);
            return Err(FormulaError::Cycle {
                path: path.join(" -> "),
            });
        }

        let expr = parse_formula(formula).map_err(|e| {
            FormulaError::Schema(format!("stored formula of '{column}' is invalid: {e}"))
        })?;

        self.stack.push(key);
        let resolved = self.resolve_expr(&expr, ctx)?;
        self.stack.pop();

        Ok(ResolvedExpr::Grouping(Box::new(resolved)))
    }
}
