//! Tree Module - owned element tree
//!
//! - Node: `MarkupNode`, the parsed element record
//! - Builder: event stream → tree, with document-level well-formedness checks

pub mod builder;
pub mod node;

pub use builder::build_tree;
pub use node::MarkupNode;
