//! Parameterized INSERT / REPLACE template builder using the typestate pattern.
//!
//! The template carries one placeholder group and is executed once per
//! batch with every row of the batch bound in turn.

use std::marker::PhantomData;

use crate::dialect::{Dialect, PlaceholderStyle};

// Typestate markers

/// Marker: No table specified yet.
pub struct NoTable;
/// Marker: Table has been specified.
pub struct HasTable;

/// Statement verb of a bulk template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertVerb {
    /// `INSERT INTO`.
    Insert,
    /// `REPLACE INTO`.
    Replace,
}

impl InsertVerb {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Insert => "INSERT",
            Self::Replace => "REPLACE",
        }
    }
}

/// A parameterized `INSERT`/`REPLACE` template builder.
pub struct BulkInsert<Table> {
    verb: InsertVerb,
    table: Option<String>,
    columns: Vec<String>,
    arity: usize,
    placeholders: Option<PlaceholderStyle>,
    _state: PhantomData<Table>,
}

impl BulkInsert<NoTable> {
    /// Creates a new template builder for `verb`.
    #[must_use]
    pub const fn new(verb: InsertVerb) -> Self {
        Self {
            verb,
            table: None,
            columns: Vec::new(),
            arity: 0,
            placeholders: None,
            _state: PhantomData,
        }
    }

    /// Specifies the table to insert into.
    #[must_use]
    pub fn into_table(self, table: &str) -> BulkInsert<HasTable> {
        BulkInsert {
            verb: self.verb,
            table: Some(String::from(table)),
            columns: self.columns,
            arity: self.arity,
            placeholders: self.placeholders,
            _state: PhantomData,
        }
    }
}

// Methods available after specifying table
impl BulkInsert<HasTable> {
    /// Specifies the columns to insert into.
    #[must_use]
    pub fn columns<S: AsRef<str>>(mut self, cols: &[S]) -> Self {
        self.columns = cols.iter().map(|s| String::from(s.as_ref())).collect();
        self.arity = self.columns.len();
        self
    }

    /// Sets the number of values per row when no column list is given.
    #[must_use]
    pub const fn arity(mut self, arity: usize) -> Self {
        self.arity = arity;
        self
    }

    /// Overrides the dialect's parameter marker.
    #[must_use]
    pub const fn placeholders(mut self, style: PlaceholderStyle) -> Self {
        self.placeholders = Some(style);
        self
    }

    /// Builds the statement template.
    ///
    /// Identifiers are delimited for `dialect`. With `%s` markers a literal
    /// `%` in an identifier is doubled so the driver does not read it as a
    /// marker.
    #[must_use]
    pub fn build(self, dialect: &dyn Dialect) -> String {
        let style = self
            .placeholders
            .unwrap_or_else(|| dialect.placeholder_style());

        let mut sql = String::from(self.verb.keyword());
        sql.push_str(" INTO ");

        if let Some(ref table) = self.table {
            sql.push_str(&style.escape(&dialect.quote_table(table)));
        }

        if !self.columns.is_empty() {
            let quoted: Vec<String> = self
                .columns
                .iter()
                .map(|col| style.escape(&dialect.quote_identifier(col)))
                .collect();
            sql.push_str(" (");
            sql.push_str(&quoted.join(", "));
            sql.push(')');
        }

        sql.push_str(" VALUES (");
        let placeholders = vec![style.marker(); self.arity];
        sql.push_str(&placeholders.join(", "));
        sql.push(')');

        sql
    }
}
