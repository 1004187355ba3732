//! Depth-first expansion of a tree into rows.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::node::TreeNode;
use super::row::{FieldValue, FlattenedRow, RowBuffer};
use crate::error::{LoadError, Result};

/// Flattening switches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlattenOptions {
    /// Tags allowed to repeat within one row.
    pub duplicate_tags: BTreeSet<String>,
    /// Buffer the attributes of nodes that carry no text.
    pub with_attributes: bool,
    /// Buffer the node itself instead of its text or attributes.
    pub with_element: bool,
}

impl FlattenOptions {
    /// Creates options with no duplicate tags and text-only capture.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares `tag` a duplicate tag.
    #[must_use]
    pub fn duplicate_tag(mut self, tag: impl Into<String>) -> Self {
        self.duplicate_tags.insert(tag.into());
        self
    }

    /// Captures the attributes of nodes that carry no text.
    #[must_use]
    pub const fn with_attributes(mut self, enabled: bool) -> Self {
        self.with_attributes = enabled;
        self
    }

    /// Buffers nodes themselves instead of their text or attributes.
    #[must_use]
    pub const fn with_element(mut self, enabled: bool) -> Self {
        self.with_element = enabled;
        self
    }
}

/// Traversal state. A fresh traversal starts `Idle`; every row closed on a
/// collision passes through `RowClosed` back into `Traversing`.
enum State<'a, N> {
    Idle,
    Traversing(RowBuffer<'a, N>),
    RowClosed(FlattenedRow<'a, N>, RowBuffer<'a, N>),
    Done(Option<FlattenedRow<'a, N>>),
}

/// Flattens a tree into rows, one per repeat group.
///
/// Nodes are visited depth-first in document order. A node with text (or
/// with attributes, when enabled) buffers `tag -> value` into the current
/// row. When a tag that is not a duplicate tag is already buffered, the
/// current row is emitted and the next one starts from the fields buffered
/// before that tag. After the whole tree is visited, the remaining buffer
/// is emitted under the root's tag.
#[derive(Debug, Clone, Default)]
pub struct DfsExpansion {
    options: FlattenOptions,
}

impl DfsExpansion {
    /// Creates a flattener with `options`.
    #[must_use]
    pub const fn new(options: FlattenOptions) -> Self {
        Self { options }
    }

    /// Returns the flattening switches.
    #[must_use]
    pub const fn options(&self) -> &FlattenOptions {
        &self.options
    }

    /// Flattens the tree under `root`.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::MalformedTree`] if the root has no local tag.
    pub fn flatten<'a, N: TreeNode>(&self, root: &'a N) -> Result<Vec<FlattenedRow<'a, N>>> {
        let root_tag = root.local_name();
        if root_tag.is_empty() {
            return Err(LoadError::MalformedTree(format!(
                "root element '{}' has no local tag",
                root.tag()
            )));
        }

        let mut rows = Vec::new();
        let mut state = State::Idle;
        let mut stack = vec![root];

        loop {
            state = match state {
                State::Idle => State::Traversing(RowBuffer::new()),
                State::Traversing(buffer) => match stack.pop() {
                    Some(node) => {
                        let children: Vec<&'a N> = node.children().collect();
                        stack.extend(children.into_iter().rev());
                        self.visit(buffer, node)
                    }
                    None => State::Done(buffer.finish(root_tag)),
                },
                State::RowClosed(row, buffer) => {
                    debug!(group = row.group(), fields = row.len(), "Row closed");
                    rows.push(row);
                    State::Traversing(buffer)
                }
                State::Done(last) => {
                    rows.extend(last);
                    break;
                }
            };
        }

        debug!(root = root_tag, rows = rows.len(), "Flattened tree");
        Ok(rows)
    }

    fn visit<'a, N: TreeNode>(&self, buffer: RowBuffer<'a, N>, node: &'a N) -> State<'a, N> {
        let Some(value) = self.field_value(node) else {
            return State::Traversing(buffer);
        };
        let tag = node.local_name();
        trace!(tag, "Buffering field");

        if !buffer.contains(tag) {
            return State::Traversing(buffer.with_field(tag, value));
        }
        if self.options.duplicate_tags.contains(tag) {
            return State::Traversing(buffer.with_duplicate(tag, value));
        }
        let (row, next) = buffer.close_on(tag);
        State::RowClosed(row, next.with_field(tag, value))
    }

    fn field_value<'a, N: TreeNode>(&self, node: &'a N) -> Option<FieldValue<'a, N>> {
        if let Some(text) = node.text().map(str::trim).filter(|t| !t.is_empty()) {
            return Some(if self.options.with_element {
                FieldValue::Node(node)
            } else {
                FieldValue::Text(text.to_string())
            });
        }
        if !self.options.with_attributes {
            return None;
        }
        let attributes = node.attributes();
        if attributes.is_empty() {
            return None;
        }
        Some(if self.options.with_element {
            FieldValue::Node(node)
        } else {
            FieldValue::Attributes(attributes)
        })
    }
}
