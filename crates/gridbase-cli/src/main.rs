//! gridbase CLI - formula engine tooling for JSON catalog files

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use gridbase::prelude::*;
use gridbase::{check_computed_column, ColumnKey, DependencySet};
use std::path::PathBuf;

mod load;

use load::load_catalog;

#[derive(Parser)]
#[command(name = "gridbase")]
#[command(author, version, about = "Formula testing and lookup search over a catalog file")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Test a formula against the most recent record of a table
    Test {
        /// Catalog JSON file
        catalog: PathBuf,

        /// Table to test against
        #[arg(short, long)]
        table: String,

        /// Formula text, e.g. '{Subtotal} * 1.1'
        formula: String,

        /// Print the raw JSON response instead of readable text
        #[arg(long)]
        json: bool,
    },

    /// Check whether a computed-column definition would be accepted
    Check {
        /// Catalog JSON file
        catalog: PathBuf,

        /// Table the column would live on
        #[arg(short, long)]
        table: String,

        /// Name of the proposed column
        #[arg(short, long)]
        column: String,

        /// Formula text
        formula: String,
    },

    /// Search candidate records for a lookup column
    Search {
        /// Catalog JSON file
        catalog: PathBuf,

        /// Table holding the lookup column
        #[arg(short, long)]
        table: String,

        /// Lookup column name
        #[arg(short, long)]
        column: String,

        /// Substring to match (empty: most recent records)
        query: Option<String>,

        /// Print the raw JSON response instead of readable text
        #[arg(long)]
        json: bool,
    },

    /// Show tables, columns, and record counts of a catalog file
    Info {
        /// Catalog JSON file
        catalog: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Test {
            catalog,
            table,
            formula,
            json,
        } => test(&catalog, &table, &formula, json),
        Commands::Check {
            catalog,
            table,
            column,
            formula,
        } => check(&catalog, &table, &column, &formula),
        Commands::Search {
            catalog,
            table,
            column,
            query,
            json,
        } => search(&catalog, &table, &column, query.as_deref().unwrap_or(""), json),
        Commands::Info { catalog } => info(&catalog),
    }
}

fn require_table(catalog: &Catalog, name: &str) -> Result<TableId> {
    catalog
        .table_by_name(name)
        .map(|t| t.id)
        .ok_or_else(|| anyhow!("no table named '{name}'"))
}

fn test(path: &PathBuf, table: &str, formula: &str, json: bool) -> Result<()> {
    let catalog = load_catalog(path)?;
    let table = require_table(&catalog, table)?;

    if json {
        let response = handle_formula_test(
            &catalog,
            &FormulaTestRequest {
                formula: formula.to_string(),
                table,
            },
        );
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    let result = test_formula(&catalog, table, formula).context("Formula test failed")?;
    println!("result: {}", result.result.normalize());
    println!(
        "cross-table references: {}",
        if result.uses_cross_table_refs { "yes" } else { "no" }
    );
    println!("tested with record: #{}", result.tested_with_record);
    Ok(())
}

fn check(path: &PathBuf, table: &str, column: &str, formula: &str) -> Result<()> {
    let catalog = load_catalog(path)?;
    let table = require_table(&catalog, table)?;

    let expr = parse_formula(formula).context("Formula rejected")?;
    let deps =
        check_computed_column(&catalog, table, column, &expr).context("Definition rejected")?;

    println!("ok: {} dependencies", deps.referenced.len());
    for line in render_dependencies(&catalog, &deps) {
        println!("  {line}");
    }
    Ok(())
}

fn render_dependencies(catalog: &Catalog, deps: &DependencySet) -> Vec<String> {
    let render = |key: &ColumnKey| match catalog.table(key.table) {
        Some(t) => format!("{}.{}", t.name, key.column),
        None => key.column.clone(),
    };
    let mut lines: Vec<String> = deps
        .referenced
        .iter()
        .map(|key| {
            if deps.computed.contains(key) {
                format!("{} (computed)", render(key))
            } else {
                render(key)
            }
        })
        .collect();
    lines.sort();
    lines
}

fn search(path: &PathBuf, table: &str, column: &str, query: &str, json: bool) -> Result<()> {
    let catalog = load_catalog(path)?;
    let table = require_table(&catalog, table)?;

    if json {
        let response = handle_lookup_search(
            &catalog,
            &LookupSearchRequest {
                table,
                column: column.to_string(),
                query: query.to_string(),
            },
        );
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    let results =
        search_lookup_candidates(&catalog, table, column, query).context("Search failed")?;
    for candidate in &results {
        println!("#{}\t{}", candidate.id, candidate.display);
    }
    eprintln!("{} candidates", results.len());
    Ok(())
}

fn info(path: &PathBuf) -> Result<()> {
    let catalog = load_catalog(path)?;

    println!("File: {}", path.display());
    println!("Tables: {}", catalog.tables().len());

    for table in catalog.tables() {
        println!();
        println!(
            "  {} ({} records)",
            table.name,
            catalog.records(table.id).len()
        );
        for column in table.columns() {
            let suffix = if column.searchable { " (searchable)" } else { "" };
            println!(
                "    {}: {}{suffix}",
                column.name,
                describe_type(&catalog, column)
            );
        }
    }

    Ok(())
}

fn describe_type(catalog: &Catalog, column: &Column) -> String {
    match &column.column_type {
        ColumnType::Scalar(ScalarKind::Text) => "text".into(),
        ColumnType::Scalar(ScalarKind::Number) => "number".into(),
        ColumnType::Scalar(ScalarKind::Date) => "date".into(),
        ColumnType::Scalar(ScalarKind::Boolean) => "boolean".into(),
        ColumnType::Lookup {
            target,
            display_field,
        } => format!("lookup -> {} ({display_field})", table_name(catalog, *target)),
        ColumnType::MultipleLookup {
            target,
            display_field,
        } => format!(
            "multiple lookup -> {} ({display_field})",
            table_name(catalog, *target)
        ),
        ColumnType::Computed { formula } => format!("formula: {formula}"),
    }
}

fn table_name(catalog: &Catalog, id: TableId) -> String {
    catalog
        .table(id)
        .map(|t| t.name.clone())
        .unwrap_or_else(|| id.to_string())
}
