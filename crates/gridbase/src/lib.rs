//! # gridbase
//!
//! Formula engine and schema tooling for the gridbase no-code table
//! designer: user-defined tables with typed columns, including columns
//! computed from a small formula language and lookups into other tables.
//!
//! ## Example
//!
//! ```rust
//! use gridbase::prelude::*;
//!
//! let mut catalog = Catalog::new();
//! let orders = catalog
//!     .add_table("Orders", vec![Column::scalar("Subtotal", ScalarKind::Number)])
//!     .unwrap();
//! catalog
//!     .insert_record(orders, [("Subtotal", Value::number(200))])
//!     .unwrap();
//!
//! // Gate a computed column on the cycle check, then test a formula
//! // against the most recent record.
//! catalog
//!     .define_computed_column(orders, "Total", "{Subtotal} * 1.1")
//!     .unwrap();
//! let test = test_formula(&catalog, orders, "{Total} / 2").unwrap();
//! assert_eq!(test.result, rust_decimal::Decimal::from(110));
//! ```

pub mod api;
pub mod harness;
pub mod prelude;
pub mod schema;
pub mod search;

pub use api::{
    handle_formula_test, handle_lookup_search, FormulaTestRequest, FormulaTestResponse,
    LookupSearchRequest, LookupSearchResponse,
};
pub use harness::{test_formula, FormulaTest};
pub use schema::CatalogSchemaExt;
pub use search::{search_lookup_candidates, LookupCandidate, SEARCH_LIMIT};

// Re-export core and formula types
pub use gridbase_core::{
    Catalog, Column, ColumnType, Error, Record, RecordId, ScalarKind, Table, TableId, Value,
};
pub use gridbase_formula::{
    check_computed_column, evaluate, parse_formula, resolve, tokenize, BinaryOp, ColumnKey,
    DependencySet, Expr, FormulaError, FormulaResult, Reference, Resolution, ResolveContext,
    ResolvedExpr, Token,
};
