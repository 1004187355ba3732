//! Database execution surface.
//!
//! Writers never talk to a driver directly; they drive an [`Executor`],
//! which owns the connection and its open transaction.

use crate::error::ExecError;
use crate::value::SqlValue;

/// Operations a writer needs from a database connection.
///
/// Affected-row counts are optional: `None` means the driver did not
/// report one, which writers count as zero.
pub trait Executor {
    /// Executes a statement with no parameters.
    ///
    /// # Errors
    ///
    /// Returns the driver's error unchanged.
    fn execute(&mut self, sql: &str) -> Result<Option<u64>, ExecError>;

    /// Executes `template` once per row, binding the row's values to its
    /// placeholders in order.
    ///
    /// # Errors
    ///
    /// Returns the driver's error unchanged.
    fn execute_many(
        &mut self,
        template: &str,
        rows: &[Vec<SqlValue>],
    ) -> Result<Option<u64>, ExecError>;

    /// Commits the work done since the previous commit.
    ///
    /// # Errors
    ///
    /// Returns the driver's error unchanged.
    fn commit(&mut self) -> Result<(), ExecError>;
}

impl<E: Executor + ?Sized> Executor for &mut E {
    fn execute(&mut self, sql: &str) -> Result<Option<u64>, ExecError> {
        (**self).execute(sql)
    }

    fn execute_many(
        &mut self,
        template: &str,
        rows: &[Vec<SqlValue>],
    ) -> Result<Option<u64>, ExecError> {
        (**self).execute_many(template, rows)
    }

    fn commit(&mut self) -> Result<(), ExecError> {
        (**self).commit()
    }
}
