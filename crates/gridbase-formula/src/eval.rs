//! Formula evaluator
//!
//! Walks a fully resolved expression down to a single decimal scalar.
//! All arithmetic is decimal, never binary float, so currency-like
//! computations round the way users expect. Results are not rounded here;
//! display formatting is a presentation concern.

use rust_decimal::Decimal;

use crate::ast::BinaryOp;
use crate::error::{FormulaError, FormulaResult};
use crate::resolver::ResolvedExpr;

/// Evaluate a resolved expression to a decimal scalar
pub fn evaluate(expr: &ResolvedExpr) -> FormulaResult<Decimal> {
    match expr {
        ResolvedExpr::Number(n) => Ok(*n),

        ResolvedExpr::Binding { column, value } => {
            value
                .as_decimal()
                .ok_or_else(|| FormulaError::TypeMismatch {
                    column: column.clone(),
                })
        }

        ResolvedExpr::BinaryOp { op, left, right } => {
            let lhs = evaluate(left)?;
            let rhs = evaluate(right)?;
            apply(*op, lhs, rhs)
        }

        ResolvedExpr::Grouping(inner) => evaluate(inner),
    }
}

fn apply(op: BinaryOp, lhs: Decimal, rhs: Decimal) -> FormulaResult<Decimal> {
    let result = match op {
        BinaryOp::Add => lhs.checked_add(rhs),
        BinaryOp::Subtract => lhs.checked_sub(rhs),
        BinaryOp::Multiply => lhs.checked_mul(rhs),
        BinaryOp::Divide => {
            if rhs.is_zero() {
                return Err(FormulaError::DivisionByZero);
            }
            lhs.checked_div(rhs)
        }
    };
    result.ok_or(FormulaError::Overflow)
}
