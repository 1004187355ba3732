//! Reading query results back into tables.

use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Row, TypeInfo, ValueRef};
use tracing::debug;

use tabload_core::value::SqlValue;
use tabload_core::Table;

use crate::error::Result;
use crate::executor::SqliteExecutor;

impl SqliteExecutor {
    /// Runs `select` and collects the result set into a [`Table`] whose
    /// header is the result's column names.
    ///
    /// An empty result set yields an empty table without header fields.
    ///
    /// # Errors
    ///
    /// Returns the database error if the query fails or a value cannot be
    /// decoded.
    pub fn fetch_table(&mut self, select: &str) -> Result<Table> {
        let conn = &mut self.conn;
        let rows = self.runtime.block_on(sqlx::query(select).fetch_all(conn))?;

        let header = rows.first().map_or_else(Vec::new, |row| {
            row.columns()
                .iter()
                .map(|column| column.name().to_string())
                .collect()
        });
        let values = rows
            .iter()
            .map(|row| {
                (0..row.len())
                    .map(|i| decode(row, i))
                    .collect::<std::result::Result<Vec<_>, _>>()
            })
            .collect::<std::result::Result<Vec<_>, sqlx::Error>>()?;

        debug!(rows = values.len(), "Fetched table");
        Ok(Table::new(header, values)?)
    }
}

/// Decodes one cell by its runtime storage class.
fn decode(row: &SqliteRow, index: usize) -> std::result::Result<SqlValue, sqlx::Error> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(SqlValue::Null);
    }
    let storage = raw.type_info().name().to_string();
    let value = match storage.as_str() {
        "INTEGER" => SqlValue::Int(row.try_get(index)?),
        "REAL" => SqlValue::Float(row.try_get(index)?),
        "BLOB" => SqlValue::Blob(row.try_get(index)?),
        _ => SqlValue::Text(row.try_get(index)?),
    };
    Ok(value)
}
