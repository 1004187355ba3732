//! Batched INSERT / REPLACE writer.

use tracing::{debug, info};

use super::{commit, prepare_table, settle, Statements, WriteMode, WriteOptions, Writer};
use crate::builder::{BulkInsert, InsertVerb};
use crate::error::{LoadError, Result};
use crate::executor::Executor;
use crate::slice::slice;
use crate::table::Table;

/// Writes a table with one parameterized template, executed once per batch.
#[derive(Debug)]
pub struct InsertReplaceWriter {
    options: WriteOptions,
    table: Table,
}

impl InsertReplaceWriter {
    /// Creates a writer. `options` must already be validated.
    #[must_use]
    pub const fn new(options: WriteOptions, table: Table) -> Self {
        Self { options, table }
    }

    /// Builds the statement template.
    ///
    /// Without a header the column list is left out and the arity comes
    /// from the rows.
    #[must_use]
    pub fn template(&self) -> String {
        let verb = match self.options.mode {
            WriteMode::Replace => InsertVerb::Replace,
            WriteMode::Insert | WriteMode::Upsert => InsertVerb::Insert,
        };
        let builder = BulkInsert::new(verb)
            .into_table(&self.options.table_name)
            .placeholders(self.options.placeholder_style());
        let builder = match self.table.header() {
            Some(header) => builder.columns(header),
            None => builder.arity(self.table.arity()),
        };
        builder.build(self.options.dialect.dialect())
    }
}

impl Writer for InsertReplaceWriter {
    fn options(&self) -> &WriteOptions {
        &self.options
    }

    fn table(&self) -> &Table {
        &self.table
    }

    fn statements(&self) -> Statements<'_> {
        Statements::Template(self.template())
    }

    fn write(&self, executor: &mut dyn Executor) -> Result<u64> {
        info!(
            table = %self.options.table_name,
            mode = %self.options.mode,
            rows = self.table.nrows(),
            "Writing table"
        );

        let prepared = prepare_table(&self.options, &self.table, executor)?;
        let sql = self.template();
        debug!(sql = %sql, "Prepared template");

        let batches = slice(self.table.rows(), self.options.batch.batch_size);
        let total = batches.total();
        let mut affected = 0;

        for (index, batch) in batches.enumerate() {
            let count = executor
                .execute_many(&sql, batch)
                .map_err(LoadError::Execution)?;
            affected += settle(count);
            debug!(
                batch = index + 1,
                of = total,
                rows = batch.len(),
                "Executed batch"
            );

            if self.options.batch.commit_per_batch || index + 1 == total {
                commit(executor)?;
            }
        }

        if total == 0 && prepared {
            commit(executor)?;
        }

        info!(
            table = %self.options.table_name,
            affected,
            "Write finished"
        );
        Ok(affected)
    }
}
