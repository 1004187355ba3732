//! Per-row UPSERT writer.

use std::fmt;
use std::slice::Iter;

use tracing::{debug, info, warn};

use super::{commit, prepare_table, settle, Statements, WriteOptions, Writer};
use crate::builder::{UpdateStrategy, Upsert};
use crate::dialect::Dialect;
use crate::error::{LoadError, Result};
use crate::executor::Executor;
use crate::table::{Record, Table};
use crate::value::SqlValue;

/// Writes a table as one inlined upsert statement per row.
#[derive(Debug)]
pub struct UpsertWriter {
    options: WriteOptions,
    table: Table,
}

impl UpsertWriter {
    /// Creates a writer. `options` must already be validated.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Configuration`] if the table has no header or
    /// a conflict key field is not one of the header's fields.
    pub fn new(options: WriteOptions, table: Table) -> Result<Self> {
        let Some(header) = table.header() else {
            return Err(LoadError::config(
                "upsert needs named fields; the input has no header",
            ));
        };
        if let Some(missing) = options
            .conflict_key
            .iter()
            .find(|field| !header.contains(field))
        {
            return Err(LoadError::config(format!(
                "conflict key field '{missing}' is not in the header"
            )));
        }
        Ok(Self { options, table })
    }

    /// Lazily generates one statement per row.
    #[must_use]
    pub fn upsert_statements(&self) -> UpsertStatements<'_> {
        UpsertStatements {
            rows: self.table.rows().iter(),
            header: self.table.header().unwrap_or(&[]),
            table_name: &self.options.table_name,
            conflict_key: &self.options.conflict_key,
            strategy: self.options.update_strategy,
            dialect: self.options.dialect.dialect(),
        }
    }
}

impl Writer for UpsertWriter {
    fn options(&self) -> &WriteOptions {
        &self.options
    }

    fn table(&self) -> &Table {
        &self.table
    }

    fn statements(&self) -> Statements<'_> {
        Statements::PerRow(self.upsert_statements())
    }

    fn write(&self, executor: &mut dyn Executor) -> Result<u64> {
        info!(
            table = %self.options.table_name,
            mode = %self.options.mode,
            rows = self.table.nrows(),
            "Writing table"
        );

        let mut pending = prepare_table(&self.options, &self.table, executor)?;
        let batch_size = self.options.batch.batch_size.get();
        let mut affected = 0;

        for (index, sql) in self.upsert_statements().enumerate() {
            let count = executor.execute(&sql).map_err(LoadError::Execution)?;
            affected += settle(count);
            pending = true;
            debug!(row = index + 1, sql = %sql, "Executed upsert");

            if self.options.batch.commit_per_batch && (index + 1) % batch_size == 0 {
                commit(executor)?;
                pending = false;
            }
        }

        if pending {
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

/// Single-pass sequence of inlined upsert statements, one per row.
///
/// Rows whose fields are all NULL have nothing to write and are skipped.
pub struct UpsertStatements<'a> {
    rows: Iter<'a, Vec<SqlValue>>,
    header: &'a [String],
    table_name: &'a str,
    conflict_key: &'a [String],
    strategy: UpdateStrategy,
    dialect: &'static dyn Dialect,
}

impl fmt::Debug for UpsertStatements<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpsertStatements")
            .field("remaining", &self.rows.len())
            .field("table_name", &self.table_name)
            .field("dialect", &self.dialect.name())
            .finish_non_exhaustive()
    }
}

impl Iterator for UpsertStatements<'_> {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let row = self.rows.next()?;
            let record: Record = self
                .header
                .iter()
                .cloned()
                .zip(row.iter().cloned())
                .collect();
            let upsert = Upsert::new()
                .into_table(self.table_name)
                .record(&record)
                .on_conflict(self.conflict_key)
                .strategy(self.strategy);
            if upsert.is_empty() {
                warn!(table = %self.table_name, "Skipping row with no non-NULL fields");
                continue;
            }
            return Some(upsert.build(self.dialect));
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.rows.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::DialectKind;
    use crate::writer::WriteMode;

    fn table() -> Table {
        Table::new(
            vec!["id".into(), "name".into()],
            vec![
                vec![SqlValue::Int(1), SqlValue::Text("a".into())],
                vec![SqlValue::Null, SqlValue::Null],
                vec![SqlValue::Int(2), SqlValue::Null],
            ],
        )
        .unwrap()
    }

    fn options() -> WriteOptions {
        WriteOptions::new("t")
            .mode(WriteMode::Upsert)
            .dialect(DialectKind::MySql)
            .conflict_key(&["id"])
    }

    #[test]
    fn test_statements_skip_empty_rows() {
        let writer = UpsertWriter::new(options(), table()).unwrap();
        let statements = writer.statements().into_vec();
        assert_eq!(
            statements,
            [
                "INSERT INTO `t` (`id`, `name`) VALUES (1, 'a') \
                 ON DUPLICATE KEY UPDATE `name` = VALUES(`name`)",
                "INSERT INTO `t` (`id`) VALUES (2) ON DUPLICATE KEY UPDATE `id` = `id`",
            ]
        );
    }

    #[test]
    fn test_requires_header() {
        let table = Table::without_header(vec![vec![SqlValue::Int(1)]]).unwrap();
        let err = UpsertWriter::new(options(), table).unwrap_err();
        assert!(matches!(err, LoadError::Configuration(_)));
    }

    #[test]
    fn test_conflict_key_must_be_in_header() {
        let err = UpsertWriter::new(options().conflict_key(&["id", "idd"]), table()).unwrap_err();
        assert!(matches!(err, LoadError::Configuration(_)));
        assert!(err.to_string().contains("'idd'"));
    }
}
