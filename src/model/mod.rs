//! Document model types.
//!
//! This module defines the arena tree the render stages mutate, the
//! transient table layout model, and the input and output document types.

mod document;
mod table;
mod tree;

pub use document::{Document, Source};
pub use table::{Cell, TableModel, TableRow};
pub use tree::{Element, Node, NodeId, NodeKind, Traverse, Tree};
