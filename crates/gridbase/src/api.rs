//! Boundary contracts with the CRUD/UI layers
//!
//! Plain request/response types for the two endpoints the table designer
//! calls into this core: testing a formula and searching lookup
//! candidates. Failures carry the specific error kind rendered as readable
//! text so the UI can highlight the offending reference rather than show a
//! blanket "formula invalid" message.

use gridbase_core::{Catalog, RecordId, TableId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::harness::{test_formula, FormulaTest};
use crate::search::{search_lookup_candidates, LookupCandidate};

/// Request to test a formula against one sample record of a table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormulaTestRequest {
    pub formula: String,
    pub table: TableId,
}

/// Response to a formula test
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormulaTestResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uses_cross_table_refs: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tested_with_record: Option<RecordId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FormulaTestResponse {
    fn ok(test: FormulaTest) -> Self {
        Self {
            success: true,
            result: Some(test.result),
            uses_cross_table_refs: Some(test.uses_cross_table_refs),
            tested_with_record: Some(test.tested_with_record),
            error: None,
        }
    }

    fn err(message: String) -> Self {
        Self {
            success: false,
            result: None,
            uses_cross_table_refs: None,
            tested_with_record: None,
            error: Some(message),
        }
    }
}

/// Handle a formula test request
pub fn handle_formula_test(catalog: &Catalog, request: &FormulaTestRequest) -> FormulaTestResponse {
    match test_formula(catalog, request.table, &request.formula) {
        Ok(test) => FormulaTestResponse::ok(test),
        Err(e) => {
            tracing::warn!(table = %request.table, error = %e, "formula test failed");
            FormulaTestResponse::err(e.to_string())
        }
    }
}

/// Request to search candidate records for a lookup column
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupSearchRequest {
    pub table: TableId,
    pub column: String,
    #[serde(default)]
    pub query: String,
}

/// Response to a lookup candidate search
#[derive(Debug, Clone, Serialize)]
pub struct LookupSearchResponse {
    pub success: bool,
    pub results: Vec<LookupCandidate>,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Handle a lookup candidate search request
pub fn handle_lookup_search(catalog: &Catalog, request: &LookupSearchRequest) -> LookupSearchResponse {
    match search_lookup_candidates(catalog, request.table, &request.column, &request.query) {
        Ok(results) => LookupSearchResponse {
            success: true,
            count: results.len(),
            results,
            error: None,
        },
        Err(e) => {
            tracing::warn!(table = %request.table, error = %e, "lookup search failed");
            LookupSearchResponse {
                success: false,
                results: Vec::new(),
                count: 0,
                error: Some(e.to_string()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridbase_core::{Column, ScalarKind, Value};

    #[test]
    fn test_formula_test_response_shapes() {
        let mut catalog = Catalog::new();
        let t = catalog
            .add_table("T", vec![Column::scalar("A", ScalarKind::Number)])
            .unwrap();
        catalog.insert_record(t, [("A", Value::number(3))]).unwrap();

        let ok = handle_formula_test(
            &catalog,
            &FormulaTestRequest {
                formula: "{A} + 4".into(),
                table: t,
            },
        );
        assert!(ok.success);
        assert_eq!(ok.result, Some(7.into()));
        assert_eq!(ok.error, None);

        let failed = handle_formula_test(
            &catalog,
            &FormulaTestRequest {
                formula: "{Missing}".into(),
                table: t,
            },
        );
        assert!(!failed.success);
        assert!(failed.error.unwrap().contains("Missing"));
        assert_eq!(failed.result, None);
    }

    #[test]
    fn test_success_json_omits_error_field() {
        let mut catalog = Catalog::new();
        let t = catalog
            .add_table("T", vec![Column::scalar("A", ScalarKind::Number)])
            .unwrap();
        catalog.insert_record(t, [("A", Value::number(1))]).unwrap();

        let response = handle_formula_test(
            &catalog,
            &FormulaTestRequest {
                formula: "{A}".into(),
                table: t,
            },
        );
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], true);
        assert!(json.get("error").is_none());
        assert!(json.get("tested_with_record").is_some());
    }
}
