//! B-tree index over fixed-size pages.
//!
//! - [`layout`] - Byte offsets and capacities ([`TreeLayout`])
//! - [`LeafNode`] / [`InternalNode`] - Typed views over a page buffer
//! - [`BTree`] - Search, insert, split
//! - [`Cursor`] / [`Scan`] - Ordered traversal along the leaf chain
//! - [`render_tree`] / [`render_constants`] - `.btree` and `.constants` output

mod cursor;
pub mod layout;
mod node;
mod printer;
mod tree;

pub use cursor::{Cursor, Scan};
pub use layout::TreeLayout;
pub use node::{node_type, InternalNode, LeafNode};
pub use printer::{render_constants, render_tree};
pub use tree::BTree;
