//! # gridbase-core
//!
//! Core data structures for the gridbase table designer.
//!
//! Tables and columns are data, not compile-time types: a [`Catalog`] holds
//! user-defined [`Table`]s whose [`Column`]s carry a [`ColumnType`] tag
//! (plain scalar, lookup into another table, or formula-backed). Records
//! store one [`Value`] per column, keyed by column name.
//!
//! ## Example
//!
//! ```rust
//! use gridbase_core::{Catalog, Column, ScalarKind, Value};
//!
//! let mut catalog = Catalog::new();
//! let items = catalog
//!     .add_table(
//!         "Items",
//!         vec![
//!             Column::scalar("Name", ScalarKind::Text),
//!             Column::scalar("Price", ScalarKind::Number),
//!         ],
//!     )
//!     .unwrap();
//!
//! catalog
//!     .insert_record(items, [("Name", Value::text("Widget")), ("Price", Value::number(42))])
//!     .unwrap();
//! ```

pub mod catalog;
pub mod column;
pub mod error;
pub mod id;
pub mod record;
pub mod table;
pub mod value;

// Re-exports for convenience
pub use catalog::Catalog;
pub use column::{Column, ColumnType, ScalarKind};
pub use error::{Error, Result};
pub use id::{RecordId, TableId};
pub use record::Record;
pub use table::Table;
pub use value::Value;

/// Maximum number of columns in a table
pub const MAX_COLUMNS: usize = 500;

/// Maximum length of a table or column name
pub const MAX_NAME_LEN: usize = 255;
