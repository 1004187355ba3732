//! # tabload-sqlite
//!
//! A blocking [`Executor`](tabload_core::Executor) over a single `sqlx`
//! SQLite connection.
//!
//! ```rust,no_run
//! use tabload_core::prelude::*;
//! use tabload_sqlite::SqliteExecutor;
//!
//! # fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//! let mut executor = SqliteExecutor::connect("sqlite://points.db")?;
//! let rows = vec![
//!     vec![SqlValue::from("x"), SqlValue::from("y")],
//!     vec![SqlValue::from(1.0), SqlValue::from(2.0)],
//! ];
//! let options = WriteOptions::new("points").dialect(DialectKind::Sqlite);
//! load(&mut executor, rows.into(), options)?;
//!
//! let table = executor.fetch_table("SELECT x, y FROM points")?;
//! assert_eq!(table.nrows(), 1);
//! # Ok(())
//! # }
//! ```

mod error;
mod executor;
mod fetch;

pub use error::{Result, SqliteError};
pub use executor::SqliteExecutor;
