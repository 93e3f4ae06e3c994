//! # gridbase-formula
//!
//! Formula parser, reference resolver, and evaluator for gridbase
//! computed columns.
//!
//! This crate provides the pipeline
//! text → tokens → AST → resolved bindings → decimal scalar:
//! - Tokenizing and parsing the `{Column}` / `{Lookup.Field}` grammar
//! - Reference resolution against the live, runtime-defined schema
//! - Decimal evaluation with defined coercion and division-by-zero rules
//! - Definition-time dependency cycle checking
//!
//! ## Example
//!
//! ```rust,ignore
//! use gridbase_formula::{evaluate, parse_formula, resolve, ResolveContext};
//!
//! let expr = parse_formula("{Category.TaxRate} * {Subtotal}")?;
//! let resolution = resolve(&expr, &ResolveContext::new(&catalog, table, record))?;
//! let result = evaluate(&resolution.expr)?;
//! ```

pub mod ast;
pub mod dependency;
pub mod error;
pub mod eval;
pub mod parser;
pub mod resolver;
pub mod token;

pub use ast::{BinaryOp, Expr, Reference};
pub use dependency::{check_computed_column, ColumnKey, DependencySet};
pub use error::{FormulaError, FormulaResult};
pub use eval::evaluate;
pub use parser::parse_formula;
pub use resolver::{resolve, Resolution, ResolveContext, ResolvedExpr};
pub use token::{tokenize, Token};
