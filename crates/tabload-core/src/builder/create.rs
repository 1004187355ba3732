//! CREATE TABLE builder using the typestate pattern.
//!
//! Column types are inferred from the data: the first non-NULL value of a
//! column decides its storage class, and a column that is NULL throughout
//! falls back to text.

use std::marker::PhantomData;

use super::insert::{HasTable, NoTable};
use crate::dialect::Dialect;
use crate::table::Table;
use crate::value::SqlValue;

/// Storage class of a created column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// Whole numbers and booleans.
    Integer,
    /// Floating point numbers.
    Real,
    /// Strings and anything rendered as text.
    Text,
    /// Raw bytes.
    Blob,
}

impl ColumnType {
    /// Storage class for `value`, or `None` for NULL.
    #[must_use]
    pub const fn of(value: &SqlValue) -> Option<Self> {
        match value {
            SqlValue::Null => None,
            SqlValue::Bool(_) | SqlValue::Int(_) => Some(Self::Integer),
            SqlValue::Float(_) => Some(Self::Real),
            SqlValue::Text(_) | SqlValue::Other(_) | SqlValue::List(_) => Some(Self::Text),
            SqlValue::Blob(_) => Some(Self::Blob),
        }
    }

    /// Storage class of the column at `index`, from its first non-NULL
    /// value.
    #[must_use]
    pub fn infer(rows: &[Vec<SqlValue>], index: usize) -> Self {
        rows.iter()
            .find_map(|row| row.get(index).and_then(Self::of))
            .unwrap_or(Self::Text)
    }
}

/// A column definition.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ColumnDef {
    name: String,
    ty: ColumnType,
}

/// A `CREATE TABLE` statement builder.
pub struct CreateTable<State> {
    table: Option<String>,
    columns: Vec<ColumnDef>,
    primary_key: Vec<String>,
    if_not_exists: bool,
    _state: PhantomData<State>,
}

impl CreateTable<NoTable> {
    /// Creates a new builder. `IF NOT EXISTS` is on by default.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            table: None,
            columns: Vec::new(),
            primary_key: Vec::new(),
            if_not_exists: true,
            _state: PhantomData,
        }
    }

    /// Specifies the table to create.
    #[must_use]
    pub fn table(self, table: &str) -> CreateTable<HasTable> {
        CreateTable {
            table: Some(String::from(table)),
            columns: self.columns,
            primary_key: self.primary_key,
            if_not_exists: self.if_not_exists,
            _state: PhantomData,
        }
    }
}

impl Default for CreateTable<NoTable> {
    fn default() -> Self {
        Self::new()
    }
}

impl CreateTable<HasTable> {
    /// Adds a column.
    #[must_use]
    pub fn column(mut self, name: &str, ty: ColumnType) -> Self {
        self.columns.push(ColumnDef {
            name: String::from(name),
            ty,
        });
        self
    }

    /// Adds one column per header field of `table`, typed from its rows.
    /// A header-less table adds nothing.
    #[must_use]
    pub fn columns_from(mut self, table: &Table) -> Self {
        let header = table.header().unwrap_or(&[]);
        for (index, name) in header.iter().enumerate() {
            self = self.column(name, ColumnType::infer(table.rows(), index));
        }
        self
    }

    /// Declares a primary key over `fields`.
    #[must_use]
    pub fn primary_key<S: AsRef<str>>(mut self, fields: &[S]) -> Self {
        self.primary_key = fields.iter().map(|s| String::from(s.as_ref())).collect();
        self
    }

    /// Toggles `IF NOT EXISTS`.
    #[must_use]
    pub const fn if_not_exists(mut self, enabled: bool) -> Self {
        self.if_not_exists = enabled;
        self
    }

    /// Returns true if no column was added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Builds the statement.
    #[must_use]
    pub fn build(self, dialect: &dyn Dialect) -> String {
        let mut sql = String::from("CREATE TABLE ");
        if self.if_not_exists {
            sql.push_str("IF NOT EXISTS ");
        }
        if let Some(ref table) = self.table {
            sql.push_str(&dialect.quote_table(table));
        }

        let mut defs: Vec<String> = self
            .columns
            .iter()
            .map(|col| {
                let ty = if self.primary_key.contains(&col.name) {
                    dialect.key_column_type(col.ty)
                } else {
                    dialect.column_type(col.ty)
                };
                format!("{} {ty}", dialect.quote_identifier(&col.name))
            })
            .collect();
        if !self.primary_key.is_empty() {
            let key: Vec<String> = self
                .primary_key
                .iter()
                .map(|field| dialect.quote_identifier(field))
                .collect();
            defs.push(format!("PRIMARY KEY ({})", key.join(", ")));
        }

        sql.push_str(" (");
        sql.push_str(&defs.join(", "));
        sql.push(')');
        sql
    }
}
