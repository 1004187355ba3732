//! SQL statement builders.
//!
//! Two statement shapes are produced:
//!
//! - [`BulkInsert`]: a parameterized `INSERT`/`REPLACE` template, built once
//!   and executed per batch.
//! - [`Upsert`]: a fully inlined `INSERT ... ON CONFLICT` /
//!   `ON DUPLICATE KEY UPDATE` statement, built per row.
//!
//! [`CreateTable`] creates a missing target table with column types taken
//! from the data.
//!
//! # Example
//!
//! ```rust
//! use tabload_core::builder::{BulkInsert, InsertVerb};
//! use tabload_core::dialect::SqliteDialect;
//!
//! let sql = BulkInsert::new(InsertVerb::Insert)
//!     .into_table("t")
//!     .columns(&["x", "y"])
//!     .build(&SqliteDialect::new());
//!
//! assert_eq!(sql, r#"INSERT INTO "t" ("x", "y") VALUES (?, ?)"#);
//! ```

pub mod create;
pub mod insert;
pub mod upsert;

pub use create::{ColumnType, CreateTable};
pub use insert::{BulkInsert, InsertVerb};
pub use upsert::{UpdateStrategy, Upsert};
