//! Flattened rows and the buffer they are accumulated in.

use std::collections::{BTreeMap, HashMap};

use serde_json::{Map, Value};

use super::node::TreeNode;
use crate::table::Record;
use crate::value::SqlValue;

/// The value buffered for one tag.
#[derive(Debug, PartialEq, Eq)]
pub enum FieldValue<'a, N> {
    /// The node's trimmed text.
    Text(String),
    /// The node's attributes, for nodes without text.
    Attributes(BTreeMap<String, String>),
    /// The node itself.
    Node(&'a N),
}

impl<N> Clone for FieldValue<'_, N> {
    fn clone(&self) -> Self {
        match self {
            Self::Text(text) => Self::Text(text.clone()),
            Self::Attributes(attributes) => Self::Attributes(attributes.clone()),
            Self::Node(node) => Self::Node(node),
        }
    }
}

impl<N: TreeNode> FieldValue<'_, N> {
    /// Converts the value to a SQL value. Attributes become a JSON object
    /// string; a node becomes its trimmed text.
    #[must_use]
    pub fn to_sql_value(&self) -> SqlValue {
        match self {
            Self::Text(text) => SqlValue::Text(text.clone()),
            Self::Attributes(attributes) => {
                SqlValue::Other(attributes_json(attributes).to_string())
            }
            Self::Node(node) => node
                .text()
                .map(str::trim)
                .filter(|text| !text.is_empty())
                .map_or(SqlValue::Null, |text| SqlValue::Text(text.to_string())),
        }
    }

    /// Converts the value to JSON.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Text(text) => Value::String(text.clone()),
            Self::Attributes(attributes) => attributes_json(attributes),
            Self::Node(_) => match self.to_sql_value() {
                SqlValue::Text(text) => Value::String(text),
                _ => Value::Null,
            },
        }
    }
}

fn attributes_json(attributes: &BTreeMap<String, String>) -> Value {
    Value::Object(
        attributes
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect(),
    )
}

/// One emitted row: ordered `tag -> value` pairs plus the tag of the
/// repeat group that closed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlattenedRow<'a, N> {
    group: String,
    fields: Vec<(String, FieldValue<'a, N>)>,
}

impl<'a, N> FlattenedRow<'a, N> {
    /// The tag whose collision closed this row, or the root tag for the
    /// final row.
    #[must_use]
    pub fn group(&self) -> &str {
        &self.group
    }

    /// Looks up a field by name.
    #[must_use]
    pub fn get(&self, tag: &str) -> Option<&FieldValue<'a, N>> {
        self.fields.iter().find(|(t, _)| t == tag).map(|(_, v)| v)
    }

    /// Iterates fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue<'a, N>)> {
        self.fields.iter().map(|(t, v)| (t.as_str(), v))
    }

    /// Field names in insertion order.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(t, _)| t.as_str())
    }

    /// Number of fields in the row.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the row has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<N: TreeNode> FlattenedRow<'_, N> {
    /// Converts the row into a writer record.
    #[must_use]
    pub fn to_record(&self) -> Record {
        self.fields
            .iter()
            .map(|(tag, value)| (tag.clone(), value.to_sql_value()))
            .collect()
    }

    /// Converts the row into a JSON object.
    #[must_use]
    pub fn to_json(&self) -> Map<String, Value> {
        self.fields
            .iter()
            .map(|(tag, value)| (tag.clone(), value.to_json()))
            .collect()
    }
}

/// The row being accumulated.
///
/// `fields` doubles as the insertion-order stack: closing a row on a
/// colliding tag keeps exactly the entries buffered before that tag's
/// first occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowBuffer<'a, N> {
    fields: Vec<(String, FieldValue<'a, N>)>,
    duplicates: HashMap<String, usize>,
}

impl<N> Default for RowBuffer<'_, N> {
    fn default() -> Self {
        Self {
            fields: Vec::new(),
            duplicates: HashMap::new(),
        }
    }
}

impl<'a, N> RowBuffer<'a, N> {
    /// Creates an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if `tag` is buffered.
    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.position(tag).is_some()
    }

    /// Returns true if nothing is buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Buffered tags in insertion order.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(t, _)| t.as_str())
    }

    fn position(&self, tag: &str) -> Option<usize> {
        self.fields.iter().position(|(t, _)| t == tag)
    }

    /// Appends `tag`, which must not be buffered yet.
    #[must_use]
    pub fn with_field(mut self, tag: impl Into<String>, value: FieldValue<'a, N>) -> Self {
        self.fields.push((tag.into(), value));
        self
    }

    /// Appends a repeat of a duplicate tag as `tag_2`, `tag_3`, ...
    /// or under its plain name when it is not buffered yet.
    #[must_use]
    pub fn with_duplicate(mut self, tag: &str, value: FieldValue<'a, N>) -> Self {
        if !self.contains(tag) {
            return self.with_field(tag, value);
        }
        let counter = self.duplicates.entry(tag.to_string()).or_insert(1);
        let name = loop {
            *counter += 1;
            let name = format!("{tag}_{counter}");
            if !self.fields.iter().any(|(t, _)| *t == name) {
                break name;
            }
        };
        self.with_field(name, value)
    }

    /// Closes the row on a collision of `tag`.
    ///
    /// Returns the emitted row and the buffer the next row starts from:
    /// every entry before `tag`'s first occurrence, with duplicate counters
    /// reset. Entries after it belong to a consumed sibling subtree and are
    /// dropped.
    #[must_use]
    pub fn close_on(self, tag: &str) -> (FlattenedRow<'a, N>, Self) {
        let keep = self.position(tag).unwrap_or(self.fields.len());
        let carried = self.fields[..keep].to_vec();
        let row = FlattenedRow {
            group: tag.to_string(),
            fields: self.fields,
        };
        let next = Self {
            fields: carried,
            duplicates: HashMap::new(),
        };
        (row, next)
    }

    /// Emits the buffered row under `group`, or nothing if it is empty.
    #[must_use]
    pub fn finish(self, group: &str) -> Option<FlattenedRow<'a, N>> {
        if self.fields.is_empty() {
            return None;
        }
        Some(FlattenedRow {
            group: group.to_string(),
            fields: self.fields,
        })
    }
}
