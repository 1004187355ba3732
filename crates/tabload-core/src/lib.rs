//! # tabload-core
//!
//! Batched SQL writing for tabular data, and tree-to-table flattening.
//!
//! This crate provides:
//! - Bulk `INSERT`/`REPLACE` writers that slice a table into batches and
//!   execute one parameterized template per batch
//! - A per-row `UPSERT` writer with inlined, escaped literals
//! - Dialect-aware quoting and placeholder styles (generic, SQLite, MySQL)
//! - A depth-first flattener that turns hierarchical trees into rows
//!
//! The database itself sits behind the [`Executor`] trait, so the core has
//! no driver dependency.
//!
//! ## Generating statements
//!
//! ```rust
//! use tabload_core::prelude::*;
//!
//! let options = WriteOptions::new("people")
//!     .mode(WriteMode::Upsert)
//!     .dialect(DialectKind::Sqlite)
//!     .conflict_key(&["id"]);
//! let rows = vec![
//!     vec![SqlValue::from("id"), SqlValue::from("name")],
//!     vec![SqlValue::from(1), SqlValue::from("O'Brien")],
//! ];
//!
//! let writer = make_writer(options, rows.into()).unwrap();
//! assert_eq!(
//!     writer.statements().into_vec(),
//!     [r#"INSERT INTO "people" ("id", "name") VALUES (1, 'O''Brien') ON CONFLICT ("id") DO UPDATE SET "name" = excluded."name""#]
//! );
//! ```

#![warn(missing_docs)]

pub mod builder;
pub mod dialect;
pub mod error;
pub mod executor;
pub mod flatten;
pub mod slice;
pub mod table;
pub mod value;
pub mod writer;

pub use error::{ExecError, LoadError, Result};
pub use executor::Executor;
pub use table::{Record, Table, TabularInput};
pub use value::{SqlValue, ToSqlValue};
pub use writer::{load, make_writer, WriteMode, WriteOptions, Writer};

/// Commonly used types.
pub mod prelude {
    pub use crate::builder::UpdateStrategy;
    pub use crate::dialect::{Dialect, DialectKind, PlaceholderStyle};
    pub use crate::error::{LoadError, Result};
    pub use crate::executor::Executor;
    pub use crate::flatten::{DfsExpansion, Element, FlattenOptions, FlattenedRow, TreeNode};
    pub use crate::table::{Record, Table, TabularInput};
    pub use crate::value::{SqlValue, ToSqlValue};
    pub use crate::writer::{load, make_writer, BatchSpec, WriteMode, WriteOptions, Writer};
}
