//! Convenience prelude
//!
//! ```rust
//! use gridbase::prelude::*;
//! ```

pub use crate::api::{
    handle_formula_test, handle_lookup_search, FormulaTestRequest, FormulaTestResponse,
    LookupSearchRequest, LookupSearchResponse,
};
pub use crate::harness::{test_formula, FormulaTest};
pub use crate::schema::CatalogSchemaExt;
pub use crate::search::{search_lookup_candidates, LookupCandidate};
pub use gridbase_core::{
    Catalog, Column, ColumnType, Record, RecordId, ScalarKind, Table, TableId, Value,
};
pub use gridbase_formula::{parse_formula, Expr, FormulaError, FormulaResult, Reference};
