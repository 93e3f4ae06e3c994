//! Computed-column definition and boundary-contract tests

use gridbase::prelude::*;
use gridbase::ColumnKey;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;

#[test]
fn mutual_recursion_rejected_before_either_is_persisted() {
    let mut catalog = Catalog::new();
    let t = catalog
        .add_table("T", vec![Column::scalar("C", ScalarKind::Number)])
        .unwrap();

    // A = {B} cannot be defined while B does not exist.
    assert!(catalog.define_computed_column(t, "A", "{B}").is_err());

    // B = {C} then A = {B} is a fine chain.
    catalog.define_computed_column(t, "B", "{C}").unwrap();
    catalog.define_computed_column(t, "A", "{B}").unwrap();

    // Closing the loop is rejected and leaves the stored formula intact.
    let err = catalog.define_computed_column(t, "B", "{A}").unwrap_err();
    assert!(matches!(err, FormulaError::Cycle { .. }));
    assert_eq!(
        catalog.table(t).unwrap().column("B").unwrap().formula(),
        Some("{C}")
    );
}

#[test]
fn computed_columns_chain_through_evaluation() {
    let mut catalog = Catalog::new();
    let t = catalog
        .add_table("T", vec![Column::scalar("C", ScalarKind::Number)])
        .unwrap();
    catalog.define_computed_column(t, "B", "{C} * 2").unwrap();
    catalog.define_computed_column(t, "A", "{B} + 1").unwrap();
    catalog.insert_record(t, [("C", Value::number(10))]).unwrap();

    let test = test_formula(&catalog, t, "{A}").unwrap();
    assert_eq!(test.result, Decimal::from(21));
}

#[test]
fn dependency_set_reported_for_invalidation() {
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

    let deps = catalog
        .define_computed_column(orders, "Total", "{Subtotal} * (1 + {Category.TaxRate})")
        .unwrap();
    assert!(deps.referenced.contains(&ColumnKey::new(orders, "Subtotal")));
    assert!(deps.referenced.contains(&ColumnKey::new(orders, "Category")));
    assert!(deps
        .referenced
        .contains(&ColumnKey::new(categories, "TaxRate")));
}

#[test]
fn formula_test_endpoint_round_trips_json() {
    let mut catalog = Catalog::new();
    let t = catalog
        .add_table("T", vec![Column::scalar("A", ScalarKind::Number)])
        .unwrap();
    catalog.insert_record(t, [("A", Value::number(3))]).unwrap();

    let request: FormulaTestRequest =
        serde_json::from_value(serde_json::json!({ "formula": "{A} * 4", "table": t.0 })).unwrap();
    let response = handle_formula_test(&catalog, &request);
    let json = serde_json::to_value(&response).unwrap();

    assert_eq!(json["success"], true);
    assert_eq!(json["uses_cross_table_refs"], false);
    assert_eq!(json["result"], serde_json::json!("12"));

    // Failure shape: readable kind, no result.
    let bad = handle_formula_test(
        &catalog,
        &FormulaTestRequest {
            formula: "{A} / 0".into(),
            table: t,
        },
    );
    let json = serde_json::to_value(&bad).unwrap();
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "Division by zero");
    assert!(json.get("result").is_none());
}

#[test]
fn lookup_search_endpoint_shape() {
    let mut catalog = Catalog::new();
    let suppliers = catalog
        .add_table(
            "Suppliers",
            vec![
                Column::scalar("Name", ScalarKind::Text).searchable(),
                Column::scalar("Email", ScalarKind::Text),
            ],
        )
        .unwrap();
    let orders = catalog
        .add_table("Orders", vec![Column::lookup("Supplier", suppliers, "Name")])
        .unwrap();
    catalog
        .insert_record(
            suppliers,
            [
                ("Name", Value::text("Acme Corp")),
                ("Email", Value::text("sales@acme.example")),
            ],
        )
        .unwrap();

    let response = handle_lookup_search(
        &catalog,
        &LookupSearchRequest {
            table: orders,
            column: "Supplier".into(),
            query: "acme".into(),
        },
    );
    assert!(response.success);
    assert_eq!(response.count, 1);

    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["results"][0]["display"], "Acme Corp");
    assert_eq!(json["results"][0]["context"]["Email"], "sales@acme.example");
}
