//! Inline UPSERT builder.
//!
//! Unlike bulk templates, an upsert is rendered per row with its values
//! inlined, since the update list may embed the same literals. NULL fields
//! are dropped from both the column list and the update list.

use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::dialect::Dialect;
use crate::error::LoadError;
use crate::table::Record;
use crate::value::SqlValue;

// Typestate markers

/// Marker: No table specified yet.
pub struct NoTable;
/// Marker: Table has been specified.
pub struct HasTable;
/// Marker: No values specified yet.
pub struct NoValues;
/// Marker: Values have been specified.
pub struct HasValues;
/// Marker: No conflict target specified yet.
pub struct NoConflict;
/// Marker: Conflict target has been specified.
pub struct HasConflict;

/// How the update list refers to the new values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateStrategy {
    /// Refer to the row the insert attempted (`VALUES(col)`, `excluded.col`).
    #[default]
    Reference,
    /// Repeat the literal value.
    Literal,
}

impl fmt::Display for UpdateStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reference => f.write_str("reference"),
            Self::Literal => f.write_str("literal"),
        }
    }
}

impl FromStr for UpdateStrategy {
    type Err = LoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "reference" | "values" | "excluded" => Ok(Self::Reference),
            "literal" => Ok(Self::Literal),
            other => Err(LoadError::config(format!(
                "invalid update strategy '{other}', expected one of: reference, literal"
            ))),
        }
    }
}

/// A type-safe inline UPSERT builder.
pub struct Upsert<Table, Values, Conflict> {
    table: Option<String>,
    fields: Vec<(String, SqlValue)>,
    conflict_columns: Vec<String>,
    strategy: UpdateStrategy,
    _state: PhantomData<(Table, Values, Conflict)>,
}

impl Upsert<NoTable, NoValues, NoConflict> {
    /// Creates a new UPSERT builder.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            table: None,
            fields: Vec::new(),
            conflict_columns: Vec::new(),
            strategy: UpdateStrategy::Reference,
            _state: PhantomData,
        }
    }
}

impl Default for Upsert<NoTable, NoValues, NoConflict> {
    fn default() -> Self {
        Self::new()
    }
}

// Transition: NoTable -> HasTable
impl<Values, Conflict> Upsert<NoTable, Values, Conflict> {
    /// Specifies the table to insert into.
    #[must_use]
    pub fn into_table(self, table: &str) -> Upsert<HasTable, Values, Conflict> {
        Upsert {
            table: Some(String::from(table)),
            fields: self.fields,
            conflict_columns: self.conflict_columns,
            strategy: self.strategy,
            _state: PhantomData,
        }
    }
}

// Transition: NoValues -> HasValues
impl<Conflict> Upsert<HasTable, NoValues, Conflict> {
    /// Sets the row to write. NULL fields are left out.
    #[must_use]
    pub fn record(self, record: &Record) -> Upsert<HasTable, HasValues, Conflict> {
        let fields = record
            .iter()
            .filter(|(_, value)| !value.is_null())
            .map(|(field, value)| (field.to_string(), value.clone()))
            .collect();
        Upsert {
            table: self.table,
            fields,
            conflict_columns: self.conflict_columns,
            strategy: self.strategy,
            _state: PhantomData,
        }
    }
}

// Transition: NoConflict -> HasConflict
impl Upsert<HasTable, HasValues, NoConflict> {
    /// Specifies the conflict key columns.
    #[must_use]
    pub fn on_conflict<S: AsRef<str>>(
        self,
        cols: &[S],
    ) -> Upsert<HasTable, HasValues, HasConflict> {
        Upsert {
            table: self.table,
            fields: self.fields,
            conflict_columns: cols.iter().map(|s| String::from(s.as_ref())).collect(),
            strategy: self.strategy,
            _state: PhantomData,
        }
    }
}

// Methods available after ON CONFLICT
impl Upsert<HasTable, HasValues, HasConflict> {
    /// Chooses how the update list refers to the new values.
    #[must_use]
    pub const fn strategy(mut self, strategy: UpdateStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Returns true if the row has no non-NULL field to write.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Builds the fully inlined statement.
    #[must_use]
    pub fn build(self, dialect: &dyn Dialect) -> String {
        let mut sql = String::from("INSERT INTO ");

        if let Some(ref table) = self.table {
            sql.push_str(&dialect.quote_table(table));
        }

        let columns: Vec<String> = self
            .fields
            .iter()
            .map(|(field, _)| dialect.quote_identifier(field))
            .collect();
        let values: Vec<String> = self
            .fields
            .iter()
            .map(|(_, value)| value.to_sql_inline())
            .collect();

        sql.push_str(" (");
        sql.push_str(&columns.join(", "));
        sql.push_str(") VALUES (");
        sql.push_str(&values.join(", "));
        sql.push(')');

        let assignments: Vec<String> = self
            .fields
            .iter()
            .zip(columns.iter().zip(values.iter()))
            .filter(|((field, _), _)| !self.conflict_columns.contains(field))
            .map(|(_, (column, literal))| match self.strategy {
                UpdateStrategy::Reference => {
                    format!("{column} = {}", dialect.inserted_value(column))
                }
                UpdateStrategy::Literal => format!("{column} = {literal}"),
            })
            .collect();

        let conflict: Vec<String> = self
            .conflict_columns
            .iter()
            .map(|col| dialect.quote_identifier(col))
            .collect();
        sql.push_str(&dialect.upsert_clause(&conflict, &assignments));

        sql
    }
}
