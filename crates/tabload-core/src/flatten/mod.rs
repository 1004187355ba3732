//! Tree-to-table flattening.
//!
//! [`DfsExpansion`] walks any [`TreeNode`] implementation and produces
//! [`FlattenedRow`]s, which convert into writer [`Record`](crate::table::Record)s.
//!
//! ```rust
//! use tabload_core::flatten::{DfsExpansion, Element, FlattenOptions};
//!
//! let tree = Element::new("root")
//!     .with_child(Element::new("item").with_text("a"))
//!     .with_child(Element::new("item").with_text("b"));
//!
//! let rows = DfsExpansion::new(FlattenOptions::new()).flatten(&tree).unwrap();
//! assert_eq!(rows.len(), 2);
//!
//! let rows = DfsExpansion::new(FlattenOptions::new().duplicate_tag("item"))
//!     .flatten(&tree)
//!     .unwrap();
//! assert_eq!(rows[0].tags().collect::<Vec<_>>(), ["item", "item_2"]);
//! ```

mod dfs;
mod node;
mod row;

pub use dfs::{DfsExpansion, FlattenOptions};
pub use node::{strip_namespace, Element, TreeNode};
pub use row::{FieldValue, FlattenedRow, RowBuffer};
