//! SQL values and literal encoding.
//!
//! Values travel to the database either as bound parameters of a batch
//! template or, for upserts, inlined into the statement text. Inlining goes
//! through [`SqlValue::to_sql_inline`], which is the only place literal
//! quoting happens.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone};

/// A scalar cell of a table.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// NULL value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// Text value.
    Text(String),
    /// Binary blob value.
    Blob(Vec<u8>),
    /// Any other value, kept as its display string and quoted like text.
    Other(String),
    /// Composite value rendered as a parenthesised literal list.
    List(Vec<SqlValue>),
}

impl SqlValue {
    /// Wraps any displayable value as [`SqlValue::Other`].
    pub fn other(value: impl fmt::Display) -> Self {
        Self::Other(value.to_string())
    }

    /// Returns true for [`SqlValue::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns true for integer and float values.
    #[must_use]
    pub const fn is_number(&self) -> bool {
        matches!(self, Self::Int(_) | Self::Float(_))
    }

    /// Returns the SQL representation for inline use (escaped).
    ///
    /// Numbers are never quoted. Text and other values are single-quoted
    /// with embedded quotes doubled. Non-finite floats have no numeric
    /// literal and are rendered as quoted text.
    #[must_use]
    pub fn to_sql_inline(&self) -> String {
        match self {
            Self::Null => String::from("NULL"),
            Self::Bool(b) => {
                if *b {
                    String::from("TRUE")
                } else {
                    String::from("FALSE")
                }
            }
            Self::Int(n) => format!("{n}"),
            Self::Float(f) if f.is_finite() => format!("{f}"),
            Self::Float(f) => quote_text(&f.to_string()),
            Self::Text(s) | Self::Other(s) => quote_text(s),
            Self::Blob(b) => {
                let hex: String = b.iter().map(|byte| format!("{byte:02X}")).collect();
                format!("X'{hex}'")
            }
            Self::List(items) => {
                let inner: Vec<String> = items.iter().map(Self::to_sql_inline).collect();
                format!("({})", inner.join(", "))
            }
        }
    }

    /// Returns the value as plain text for drivers that bind everything
    /// outside their native types as strings.
    #[must_use]
    pub fn to_text(&self) -> Option<String> {
        match self {
            Self::Null => None,
            Self::Bool(b) => Some(b.to_string()),
            Self::Int(n) => Some(n.to_string()),
            Self::Float(f) => Some(f.to_string()),
            Self::Text(s) | Self::Other(s) => Some(s.clone()),
            Self::Blob(b) => Some(String::from_utf8_lossy(b).into_owned()),
            Self::List(_) => Some(self.to_sql_inline()),
        }
    }
}

/// Encodes a single value as a SQL literal.
#[must_use]
pub fn encode(value: &SqlValue) -> String {
    value.to_sql_inline()
}

fn quote_text(s: &str) -> String {
    // Escape single quotes by doubling them
    let escaped = s.replace('\'', "''");
    format!("'{escaped}'")
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql_inline())
    }
}

impl From<serde_json::Value> for SqlValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => n
                .as_i64()
                .map(Self::Int)
                .or_else(|| n.as_f64().map(Self::Float))
                .unwrap_or_else(|| Self::Other(n.to_string())),
            Value::String(s) => Self::Text(s),
            Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            obj @ Value::Object(_) => Self::Other(obj.to_string()),
        }
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Trait for types that can be converted to SQL values.
pub trait ToSqlValue {
    /// Converts the value to a `SqlValue`.
    fn to_sql_value(self) -> SqlValue;
}

impl ToSqlValue for SqlValue {
    fn to_sql_value(self) -> SqlValue {
        self
    }
}

impl ToSqlValue for bool {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Bool(self)
    }
}

impl ToSqlValue for i64 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(self)
    }
}

impl ToSqlValue for i32 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(i64::from(self))
    }
}

impl ToSqlValue for u32 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(i64::from(self))
    }
}

impl ToSqlValue for f64 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Float(self)
    }
}

impl ToSqlValue for f32 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Float(f64::from(self))
    }
}

impl ToSqlValue for String {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(self)
    }
}

impl ToSqlValue for &str {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(String::from(self))
    }
}

impl<T: ToSqlValue> ToSqlValue for Option<T> {
    fn to_sql_value(self) -> SqlValue {
        match self {
            Some(v) => v.to_sql_value(),
            None => SqlValue::Null,
        }
    }
}

impl<T: ToSqlValue> ToSqlValue for Vec<T> {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::List(self.into_iter().map(ToSqlValue::to_sql_value).collect())
    }
}

impl ToSqlValue for &[u8] {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Blob(self.to_vec())
    }
}

impl ToSqlValue for NaiveDate {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::other(self)
    }
}

impl ToSqlValue for NaiveDateTime {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::other(self.format("%Y-%m-%d %H:%M:%S%.f"))
    }
}

impl<Tz: TimeZone> ToSqlValue for DateTime<Tz>
where
    Tz::Offset: fmt::Display,
{
    fn to_sql_value(self) -> SqlValue {
        SqlValue::other(self.to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_value_inline_null() {
        assert_eq!(encode(&SqlValue::Null), "NULL");
        assert_eq!(None::<i64>.to_sql_value().to_sql_inline(), "NULL");
    }

    #[test]
    fn test_sql_value_inline_numbers_unquoted() {
        assert_eq!(encode(&42_i64.to_sql_value()), "42");
        assert_eq!(SqlValue::Int(-100).to_sql_inline(), "-100");
        assert_eq!(SqlValue::Float(2.5).to_sql_inline(), "2.5");
    }

    #[test]
    fn test_sql_value_inline_non_finite_float() {
        assert_eq!(SqlValue::Float(f64::NAN).to_sql_inline(), "'NaN'");
        assert_eq!(SqlValue::Float(f64::INFINITY).to_sql_inline(), "'inf'");
    }

    #[test]
    fn test_sql_value_inline_bool() {
        assert_eq!(SqlValue::Bool(true).to_sql_inline(), "TRUE");
        assert_eq!(SqlValue::Bool(false).to_sql_inline(), "FALSE");
    }

    #[test]
    fn test_sql_value_inline_text_escaping() {
        // Single quotes are escaped by doubling
        assert_eq!(encode(&"O'Brien".to_sql_value()), "'O''Brien'");
        assert_eq!(SqlValue::Text(String::from("''")).to_sql_inline(), "''''''");
        // Backslashes are not an escape character
        assert_eq!(SqlValue::Text(String::from(r"a\b")).to_sql_inline(), r"'a\b'");
    }

    #[test]
    fn test_sql_injection_prevention() {
        let malicious = "'; DROP TABLE users; --";
        let inline = malicious.to_sql_value().to_sql_inline();
        assert_eq!(inline, "'''; DROP TABLE users; --'");
    }

    #[test]
    fn test_other_values_quoted_like_text() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        assert_eq!(date.to_sql_value().to_sql_inline(), "'2024-01-31'");
        assert_eq!(SqlValue::other("it's").to_sql_inline(), "'it''s'");
    }

    #[test]
    fn test_list_encodes_each_element() {
        let value = vec![1_i64.to_sql_value(), SqlValue::Null, "x'y".to_sql_value()];
        assert_eq!(value.to_sql_value().to_sql_inline(), "(1, NULL, 'x''y')");

        let nested = SqlValue::List(vec![SqlValue::List(vec![SqlValue::Int(1)])]);
        assert_eq!(nested.to_sql_inline(), "((1))");
    }

    #[test]
    fn test_blob_inline() {
        let value = [0xde_u8, 0xad].as_slice().to_sql_value();
        assert_eq!(value.to_sql_inline(), "X'DEAD'");
    }

    #[test]
    fn test_from_json() {
        let value: serde_json::Value =
            serde_json::from_str(r#"[null, true, 3, 1.5, "a", {"k": 1}]"#).unwrap();
        assert_eq!(
            SqlValue::from(value),
            SqlValue::List(vec![
                SqlValue::Null,
                SqlValue::Bool(true),
                SqlValue::Int(3),
                SqlValue::Float(1.5),
                SqlValue::Text(String::from("a")),
                SqlValue::Other(String::from(r#"{"k":1}"#)),
            ])
        );
    }
}
