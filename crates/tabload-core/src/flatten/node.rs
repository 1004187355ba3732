//! Tree nodes the flattener walks.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A tagged node of a hierarchical document.
pub trait TreeNode {
    /// The node's tag as written, possibly namespace-qualified.
    fn tag(&self) -> &str;

    /// The tag with any `{uri}` or `prefix:` namespace removed.
    fn local_name(&self) -> &str {
        strip_namespace(self.tag())
    }

    /// The node's own text, if any.
    fn text(&self) -> Option<&str>;

    /// The node's attributes.
    fn attributes(&self) -> BTreeMap<String, String>;

    /// The node's children in document order.
    fn children(&self) -> impl Iterator<Item = &Self>;
}

/// Removes a `{uri}` (Clark notation) or `prefix:` namespace from a tag.
#[must_use]
pub fn strip_namespace(tag: &str) -> &str {
    let tag = match tag.strip_prefix('{') {
        Some(rest) => rest.split_once('}').map_or("", |(_, local)| local),
        None => tag,
    };
    tag.rsplit_once(':').map_or(tag, |(_, local)| local)
}

/// An owned tree node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    /// Tag, optionally namespace-qualified.
    pub tag: String,
    /// Text content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Attributes.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    /// Child elements.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Element>,
}

impl Element {
    /// Creates an element with no text, attributes or children.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// Sets the text content.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Adds an attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Appends a child element.
    #[must_use]
    pub fn with_child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    /// Parses an element tree from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Serialization`](crate::error::LoadError::Serialization)
    /// if the document is not an element tree.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl TreeNode for Element {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    fn attributes(&self) -> BTreeMap<String, String> {
        self.attributes.clone()
    }

    fn children(&self) -> impl Iterator<Item = &Self> {
        self.children.iter()
    }
}
