//! MySQL dialect implementation.

use super::{Dialect, PlaceholderStyle};
use crate::builder::ColumnType;

/// MySQL / MariaDB dialect.
///
/// Identifiers are delimited with backticks and batch templates use `%s`
/// markers. Upserts use `ON DUPLICATE KEY UPDATE`, which resolves the
/// conflict against whichever unique index fired, so the conflict key only
/// decides which columns are left out of the update list.
#[derive(Debug, Default, Clone, Copy)]
pub struct MySqlDialect;

impl MySqlDialect {
    /// Creates a new MySQL dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for MySqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn identifier_quote(&self) -> char {
        '`'
    }

    fn placeholder_style(&self) -> PlaceholderStyle {
        PlaceholderStyle::Format
    }

    fn supports_replace(&self) -> bool {
        true
    }

    fn supports_upsert(&self) -> bool {
        true
    }

    fn inserted_value(&self, column: &str) -> String {
        format!("VALUES({column})")
    }

    fn upsert_clause(&self, conflict_columns: &[String], assignments: &[String]) -> String {
        if assignments.is_empty() {
            // ON DUPLICATE KEY UPDATE needs at least one assignment; a
            // self-assignment of the key leaves the row untouched.
            return conflict_columns
                .first()
                .map(|key| format!(" ON DUPLICATE KEY UPDATE {key} = {key}"))
                .unwrap_or_default();
        }
        format!(" ON DUPLICATE KEY UPDATE {}", assignments.join(", "))
    }

    fn column_type(&self, ty: ColumnType) -> &'static str {
        match ty {
            ColumnType::Integer => "BIGINT",
            ColumnType::Real => "DOUBLE",
            ColumnType::Text => "LONGTEXT",
            ColumnType::Blob => "LONGBLOB",
        }
    }

    // Key columns need a bounded length.
    fn key_column_type(&self, ty: ColumnType) -> &'static str {
        match ty {
            ColumnType::Text => "VARCHAR(255)",
            ColumnType::Blob => "VARBINARY(255)",
            other => self.column_type(other),
        }
    }
}
