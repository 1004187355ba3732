//! Bulk writers.
//!
//! A write moves through a fixed sequence of stages:
//!
//! 1. **Configured** - [`WriteOptions::validate`] rejects options that
//!    cannot run (unknown mode, upsert without conflict key, a mode the
//!    dialect cannot express).
//! 2. **Sliced** - [`make_writer`] normalizes the input into a [`Table`]
//!    and picks the writer for the mode.
//! 3. **Executing** - [`Writer::write`] creates and empties the table when
//!    asked, then runs batches (insert/replace) or
//!    per-row statements (upsert) and commits on the batch cadence.
//! 4. **Committed / Failed** - `write` returns the affected-row total, or
//!    the first execution error. Nothing is rolled back here; batches
//!    committed before the failure stay committed.
//!
//! # Example
//!
//! ```rust,ignore
//! use tabload_core::prelude::*;
//!
//! let options = WriteOptions::new("points")
//!     .dialect(DialectKind::Sqlite)
//!     .batch(BatchSpec::new(128, true)?);
//! let rows = vec![
//!     vec!["x".to_sql_value(), "y".to_sql_value()],
//!     vec![1.0.to_sql_value(), 2.0.to_sql_value()],
//! ];
//! let affected = load(&mut executor, rows.into(), options)?;
//! ```

mod insert_replace;
mod options;
mod upsert;

use tracing::{debug, warn};

pub use insert_replace::InsertReplaceWriter;
pub use options::{BatchSpec, WriteMode, WriteOptions, DEFAULT_BATCH_SIZE};
pub use upsert::{UpsertStatements, UpsertWriter};

use crate::builder::CreateTable;
use crate::error::{LoadError, Result};
use crate::executor::Executor;
use crate::table::{Table, TabularInput};

/// Statements a writer executes, for inspection.
#[derive(Debug)]
pub enum Statements<'a> {
    /// One parameterized template executed per batch.
    Template(String),
    /// One inlined statement per row, generated lazily.
    PerRow(UpsertStatements<'a>),
}

impl Statements<'_> {
    /// Collects every statement text.
    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Self::Template(sql) => vec![sql],
            Self::PerRow(statements) => statements.collect(),
        }
    }
}

/// A configured write of one table.
pub trait Writer: std::fmt::Debug {
    /// Returns the options the writer was built with.
    fn options(&self) -> &WriteOptions;

    /// Returns the normalized table.
    fn table(&self) -> &Table;

    /// Returns the statements [`Writer::write`] would execute.
    fn statements(&self) -> Statements<'_>;

    /// Returns the `CREATE TABLE` statement run before the first batch,
    /// if the options ask for one.
    fn create_statement(&self) -> Option<String> {
        create_statement(self.options(), self.table())
    }

    /// Writes the table and returns the total affected-row count.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Execution`] with the driver's error as soon as
    /// any statement or commit fails.
    fn write(&self, executor: &mut dyn Executor) -> Result<u64>;
}

/// Validates `options`, normalizes `input`, and returns the writer for the
/// configured mode.
///
/// # Errors
///
/// Returns [`LoadError::Configuration`] for invalid options (checked before
/// the input is touched) or a table to create without field names, and
/// [`LoadError::MalformedInput`] for input that cannot be normalized.
pub fn make_writer(options: WriteOptions, input: TabularInput) -> Result<Box<dyn Writer>> {
    options.validate()?;
    let table = input.into_table(options.with_header)?;
    if options.create_table && table.header().unwrap_or(&[]).is_empty() {
        return Err(LoadError::config(
            "creating a table needs named fields; the input has no header",
        ));
    }
    match options.mode {
        WriteMode::Insert | WriteMode::Replace => {
            Ok(Box::new(InsertReplaceWriter::new(options, table)))
        }
        WriteMode::Upsert => Ok(Box::new(UpsertWriter::new(options, table)?)),
    }
}

/// Writes `input` through `executor` as described by `options`.
///
/// # Errors
///
/// See [`make_writer`] and [`Writer::write`].
pub fn load(
    executor: &mut dyn Executor,
    input: TabularInput,
    options: WriteOptions,
) -> Result<u64> {
    make_writer(options, input)?.write(executor)
}

/// Counts a missing affected-row count as zero.
fn settle(count: Option<u64>) -> u64 {
    count.unwrap_or_else(|| {
        warn!("Driver reported no affected-row count, counting it as zero");
        0
    })
}

/// `CREATE TABLE` for `table` when requested. In upsert mode the conflict
/// key becomes the primary key.
fn create_statement(options: &WriteOptions, table: &Table) -> Option<String> {
    if !options.create_table {
        return None;
    }
    let builder = CreateTable::new()
        .table(&options.table_name)
        .columns_from(table);
    let builder = match options.mode {
        WriteMode::Upsert => builder.primary_key(&options.conflict_key),
        WriteMode::Insert | WriteMode::Replace => builder,
    };
    Some(builder.build(options.dialect.dialect()))
}

/// Creates and empties the target table as the options ask. Returns
/// whether a statement was executed.
fn prepare_table(
    options: &WriteOptions,
    table: &Table,
    executor: &mut dyn Executor,
) -> Result<bool> {
    let mut executed = false;
    if let Some(sql) = create_statement(options, table) {
        debug!(sql = %sql, "Creating table");
        executor.execute(&sql).map_err(LoadError::Execution)?;
        executed = true;
    }
    if options.truncate_first {
        let dialect = options.dialect.dialect();
        let sql = dialect.truncate_table(&dialect.quote_table(&options.table_name));
        debug!(sql = %sql, "Truncating table");
        executor.execute(&sql).map_err(LoadError::Execution)?;
        executed = true;
    }
    Ok(executed)
}

fn commit(executor: &mut dyn Executor) -> Result<()> {
    executor.commit().map_err(LoadError::Execution)?;
    debug!("Committed");
    Ok(())
}
