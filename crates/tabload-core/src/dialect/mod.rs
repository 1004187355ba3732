//! SQL Dialect support.
//!
//! Databases disagree on identifier delimiters, parameter markers and the
//! shape of the conflict-handling clause of an upsert. The [`Dialect`] trait
//! captures those differences; [`DialectKind`] is the closed set of dialects
//! a writer can be configured with.

mod generic;
mod mysql;
mod sqlite;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use generic::GenericDialect;
pub use mysql::MySqlDialect;
pub use sqlite::SqliteDialect;

use crate::builder::ColumnType;
use crate::error::LoadError;

/// Positional parameter marker used in batch templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceholderStyle {
    /// `?` markers.
    Question,
    /// printf-style `%s` markers. A literal `%` in an identifier must be
    /// written as `%%`.
    Format,
}

impl PlaceholderStyle {
    /// Returns the marker for one parameter.
    #[must_use]
    pub const fn marker(self) -> &'static str {
        match self {
            Self::Question => "?",
            Self::Format => "%s",
        }
    }

    /// Escapes characters the execution layer would read as a marker.
    #[must_use]
    pub fn escape(self, text: &str) -> String {
        match self {
            Self::Question => text.to_string(),
            Self::Format => text.replace('%', "%%"),
        }
    }
}

impl FromStr for PlaceholderStyle {
    type Err = LoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "question" | "?" => Ok(Self::Question),
            "format" | "%s" => Ok(Self::Format),
            other => Err(LoadError::config(format!(
                "invalid placeholder style '{other}', expected one of: question, format"
            ))),
        }
    }
}

/// Trait for SQL dialect-specific behavior.
pub trait Dialect {
    /// Returns the name of the dialect.
    fn name(&self) -> &'static str;

    /// Returns the identifier quote character (e.g., `"` for standard SQL, `` ` `` for MySQL).
    fn identifier_quote(&self) -> char {
        '"'
    }

    /// Returns the parameter placeholder style.
    fn placeholder_style(&self) -> PlaceholderStyle {
        PlaceholderStyle::Question
    }

    /// Returns whether the dialect supports `REPLACE INTO`.
    fn supports_replace(&self) -> bool {
        false
    }

    /// Returns whether the dialect supports a conflict-handling insert.
    fn supports_upsert(&self) -> bool {
        false
    }

    /// Quotes an identifier, doubling any quote character inside it.
    fn quote_identifier(&self, name: &str) -> String {
        let quote = self.identifier_quote();
        let mut doubled = String::with_capacity(2);
        doubled.push(quote);
        doubled.push(quote);
        let escaped = name.replace(quote, &doubled);
        format!("{quote}{escaped}{quote}")
    }

    /// Quotes a possibly schema-qualified table name.
    ///
    /// Each `.`-separated component is delimited on its own. Components the
    /// caller already delimited are kept as they are.
    fn quote_table(&self, name: &str) -> String {
        let quote = self.identifier_quote();
        split_qualified(name, quote)
            .into_iter()
            .map(|part| {
                if is_delimited(part, quote) {
                    part.to_string()
                } else {
                    self.quote_identifier(part)
                }
            })
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Reference to the value the failed insert tried to write into
    /// `column` (an already quoted identifier).
    fn inserted_value(&self, column: &str) -> String {
        format!("excluded.{column}")
    }

    /// Renders the conflict-handling tail of an upsert, including the
    /// leading space.
    ///
    /// `conflict_columns` and the left-hand sides of `assignments` are
    /// quoted identifiers.
    fn upsert_clause(&self, conflict_columns: &[String], assignments: &[String]) -> String {
        let target = conflict_columns.join(", ");
        if assignments.is_empty() {
            format!(" ON CONFLICT ({target}) DO NOTHING")
        } else {
            format!(
                " ON CONFLICT ({target}) DO UPDATE SET {}",
                assignments.join(", ")
            )
        }
    }

    /// Column type name for a storage class.
    fn column_type(&self, ty: ColumnType) -> &'static str {
        match ty {
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Text => "TEXT",
            ColumnType::Blob => "BLOB",
        }
    }

    /// Column type name for a storage class used in a primary key.
    fn key_column_type(&self, ty: ColumnType) -> &'static str {
        self.column_type(ty)
    }

    /// Statement that empties `table` (an already quoted name).
    fn truncate_table(&self, table: &str) -> String {
        format!("TRUNCATE TABLE {table}")
    }
}

/// Splits `schema.table` on dots that are not inside delimiters.
fn split_qualified(name: &str, quote: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut quoted = false;
    for (i, c) in name.char_indices() {
        if c == quote {
            quoted = !quoted;
        } else if c == '.' && !quoted {
            parts.push(&name[start..i]);
            start = i + 1;
        }
    }
    parts.push(&name[start..]);
    parts
}

fn is_delimited(part: &str, quote: char) -> bool {
    part.len() >= 2 && part.starts_with(quote) && part.ends_with(quote)
}

/// The closed set of dialects a writer can target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectKind {
    /// ANSI SQL; plain inserts only.
    #[default]
    Generic,
    /// MySQL / MariaDB.
    #[serde(alias = "mariadb")]
    MySql,
    /// SQLite 3.24+.
    Sqlite,
}

static GENERIC: GenericDialect = GenericDialect::new();
static MYSQL: MySqlDialect = MySqlDialect::new();
static SQLITE: SqliteDialect = SqliteDialect::new();

impl DialectKind {
    /// Resolves the kind into its dialect implementation.
    #[must_use]
    pub fn dialect(self) -> &'static dyn Dialect {
        match self {
            Self::Generic => &GENERIC,
            Self::MySql => &MYSQL,
            Self::Sqlite => &SQLITE,
        }
    }
}

impl fmt::Display for DialectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dialect().name())
    }
}

impl FromStr for DialectKind {
    type Err = LoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "generic" | "ansi" => Ok(Self::Generic),
            "mysql" | "mariadb" => Ok(Self::MySql),
            "sqlite" | "sqlite3" => Ok(Self::Sqlite),
            other => Err(LoadError::config(format!(
                "unknown dialect '{other}', expected one of: generic, mysql, sqlite"
            ))),
        }
    }
}
