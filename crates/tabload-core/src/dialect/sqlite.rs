//! SQLite dialect implementation.

use super::Dialect;

/// SQLite dialect.
///
/// `REPLACE INTO` is an alias for `INSERT OR REPLACE`; upserts use
/// `ON CONFLICT (...) DO UPDATE SET` with `excluded.col` references
/// (SQLite 3.24.0+).
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteDialect;

impl SqliteDialect {
    /// Creates a new SQLite dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn identifier_quote(&self) -> char {
        '"' // SQLite also accepts backticks, but double quotes are standard
    }

    fn supports_replace(&self) -> bool {
        true
    }

    fn supports_upsert(&self) -> bool {
        true // SQLite 3.24.0+
    }

    fn truncate_table(&self, table: &str) -> String {
        // No TRUNCATE; the truncate optimizer handles an unqualified DELETE.
        format!("DELETE FROM {table}")
    }
}
