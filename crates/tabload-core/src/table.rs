//! Tabular input.
//!
//! Callers hand rows over in one of three shapes, captured by
//! [`TabularInput`]. Each is normalized once into a [`Table`]: an optional
//! header plus content rows that all share the header's arity.

use crate::error::{LoadError, Result};
use crate::value::SqlValue;

/// One row viewed as ordered `(field, value)` pairs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, SqlValue)>,
}

impl Record {
    /// Creates an empty record.
    #[must_use]
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Adds a field, replacing the value if the field already exists.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.insert(field, value);
        self
    }

    /// Sets a field, keeping its original position if it already exists.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<SqlValue>) {
        let field = field.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| *name == field) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((field, value)),
        }
    }

    /// Returns the value of a field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&SqlValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    /// Iterates the fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the record has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<SqlValue>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Self::new();
        for (field, value) in iter {
            record.insert(field, value);
        }
        record
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for Record {
    fn from(map: serde_json::Map<String, serde_json::Value>) -> Self {
        map.into_iter().collect()
    }
}

/// A materialized table.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    header: Option<Vec<String>>,
    rows: Vec<Vec<SqlValue>>,
}

impl Table {
    /// Creates a table with a header.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::MalformedInput`] if a row's arity differs from
    /// the header's.
    pub fn new(header: Vec<String>, rows: Vec<Vec<SqlValue>>) -> Result<Self> {
        check_arity(&rows, header.len())?;
        Ok(Self {
            header: Some(header),
            rows,
        })
    }

    /// Creates a table whose rows are all content.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::MalformedInput`] if rows differ in arity.
    pub fn without_header(rows: Vec<Vec<SqlValue>>) -> Result<Self> {
        if let Some(first) = rows.first() {
            check_arity(&rows, first.len())?;
        }
        Ok(Self { header: None, rows })
    }

    /// Returns the field names, if the table has a header.
    #[must_use]
    pub fn header(&self) -> Option<&[String]> {
        self.header.as_deref()
    }

    /// Returns the content rows.
    #[must_use]
    pub fn rows(&self) -> &[Vec<SqlValue>] {
        &self.rows
    }

    /// Returns the number of content rows.
    #[must_use]
    pub fn nrows(&self) -> usize {
        self.rows.len()
    }

    /// Returns the number of values per row.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.header
            .as_ref()
            .map_or_else(|| self.rows.first().map_or(0, Vec::len), Vec::len)
    }

    /// Dict-per-row view. Rows of a header-less table have no named
    /// fields and come back empty.
    pub fn records(&self) -> impl Iterator<Item = Record> + '_ {
        let header = self.header.as_deref().unwrap_or(&[]);
        self.rows.iter().map(move |row| {
            header
                .iter()
                .cloned()
                .zip(row.iter().cloned())
                .collect::<Record>()
        })
    }
}

fn check_arity(rows: &[Vec<SqlValue>], arity: usize) -> Result<()> {
    match rows.iter().position(|row| row.len() != arity) {
        Some(index) => Err(LoadError::malformed(format!(
            "row {index} has {} values but the table has {arity} fields",
            rows[index].len()
        ))),
        None => Ok(()),
    }
}

/// The shapes of tabular data a writer accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum TabularInput {
    /// An already materialized table; its header is authoritative.
    Table(Table),
    /// A sequence of rows. With a declared header the first row holds the
    /// field names.
    Rows(Vec<Vec<SqlValue>>),
    /// A sequence of per-row mappings. The header is the union of field
    /// names in first-seen order; missing fields are NULL.
    Records(Vec<Record>),
}

impl TabularInput {
    /// Normalizes the input into a [`Table`].
    ///
    /// `with_header` only affects [`TabularInput::Rows`].
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Configuration`] when a header is declared but
    /// there are no rows, and [`LoadError::MalformedInput`] when the header
    /// row is not made of names, rows differ in arity, or records carry no
    /// fields at all.
    pub fn into_table(self, with_header: bool) -> Result<Table> {
        match self {
            Self::Table(table) => Ok(table),
            Self::Rows(rows) if with_header => {
                let mut rows = rows.into_iter();
                let header = rows.next().ok_or_else(|| {
                    LoadError::config("input is declared with a header but has no rows")
                })?;
                let header = header
                    .into_iter()
                    .enumerate()
                    .map(|(i, name)| match name {
                        SqlValue::Text(s) | SqlValue::Other(s) => Ok(s),
                        other => Err(LoadError::malformed(format!(
                            "header field {i} is not a name: {other}"
                        ))),
                    })
                    .collect::<Result<Vec<_>>>()?;
                Table::new(header, rows.collect())
            }
            Self::Rows(rows) => Table::without_header(rows),
            Self::Records(records) => {
                let mut header: Vec<String> = Vec::new();
                for record in &records {
                    for (field, _) in record.iter() {
                        if !header.iter().any(|h| h == field) {
                            header.push(field.to_string());
                        }
                    }
                }
                if header.is_empty() && !records.is_empty() {
                    return Err(LoadError::malformed(format!(
                        "{} records but none of them has a field",
                        records.len()
                    )));
                }
                let rows = records
                    .iter()
                    .map(|record| {
                        header
                            .iter()
                            .map(|field| record.get(field).cloned().unwrap_or(SqlValue::Null))
                            .collect::<Vec<_>>()
                    })
                    .collect();
                Table::new(header, rows)
            }
        }
    }

    /// Interprets a JSON document as tabular input.
    ///
    /// Accepts an array of arrays ([`TabularInput::Rows`]) or an array of
    /// objects ([`TabularInput::Records`]).
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::MalformedInput`] for any other shape.
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        use serde_json::Value;

        let Value::Array(items) = value else {
            return Err(LoadError::malformed(
                "expected an array of rows or an array of objects",
            ));
        };
        if items.iter().all(Value::is_array) {
            let rows = items
                .into_iter()
                .map(|item| match item {
                    Value::Array(cells) => {
                        cells.into_iter().map(SqlValue::from).collect::<Vec<_>>()
                    }
                    _ => Vec::new(),
                })
                .collect();
            return Ok(Self::Rows(rows));
        }
        if items.iter().all(Value::is_object) {
            let records = items
                .into_iter()
                .map(|item| match item {
                    Value::Object(map) => Record::from(map),
                    _ => Record::new(),
                })
                .collect();
            return Ok(Self::Records(records));
        }
        Err(LoadError::malformed("rows must be all arrays or all objects"))
    }
}

impl From<Table> for TabularInput {
    fn from(table: Table) -> Self {
        Self::Table(table)
    }
}

impl From<Vec<Vec<SqlValue>>> for TabularInput {
    fn from(rows: Vec<Vec<SqlValue>>) -> Self {
        Self::Rows(rows)
    }
}

impl From<Vec<Record>> for TabularInput {
    fn from(records: Vec<Record>) -> Self {
        Self::Records(records)
    }
}
