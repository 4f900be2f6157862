//! Node header and type definitions.
//!
//! Every page starts with a [`NodeHeader`] shared by both node variants:
//! - [`NodeType`] discriminator
//! - is-root flag
//! - parent page number

use crate::common::{Error, PageId, Result};

use super::page::{read_u32, write_u32};

/// Kind of node stored in a page.
///
/// Uses `#[repr(u8)]` to guarantee a 1-byte representation for serialization.
/// A zeroed page reads as `Internal`, so fresh pages are always initialized
/// explicitly before use.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    /// Routing node: (child, key) cells plus a right child.
    Internal = 0,
    /// Data node: (key, value) cells plus a next-leaf link.
    Leaf = 1,
}

impl NodeType {
    /// Convert from u8, returning None for unknown values.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(NodeType::Internal),
            1 => Some(NodeType::Leaf),
            _ => None,
        }
    }
}

/// Accessors for the metadata at the beginning of every node page.
///
/// The header is never materialized; each field is read and written in place.
///
/// # Layout (6 bytes)
/// ```text
/// Offset  Size  Field
/// ------  ----  -----
/// 0       1     node_type (NodeType as u8)
/// 1       1     is_root (0 or 1)
/// 2       4     parent page number (little-endian, 0 = unset)
/// ```
pub struct NodeHeader;

impl NodeHeader {
    /// Size of the header in bytes.
    pub const SIZE: usize = 6;

    /// Offset of each field within the header.
    pub const OFFSET_NODE_TYPE: usize = 0;
    pub const OFFSET_IS_ROOT: usize = 1;
    pub const OFFSET_PARENT: usize = 2;

    /// Read the node type of a node buffer.
    ///
    /// # Errors
    /// Returns [`Error::CorruptNode`] if the type byte is unknown.
    pub fn node_type(data: &[u8], page: PageId) -> Result<NodeType> {
        let tag = data[Self::OFFSET_NODE_TYPE];
        NodeType::from_u8(tag).ok_or(Error::CorruptNode { page, tag })
    }

    pub fn set_node_type(data: &mut [u8], node_type: NodeType) {
        data[Self::OFFSET_NODE_TYPE] = node_type as u8;
    }

    pub fn is_root(data: &[u8]) -> bool {
        data[Self::OFFSET_IS_ROOT] != 0
    }

    pub fn set_root(data: &mut [u8], is_root: bool) {
        data[Self::OFFSET_IS_ROOT] = is_root as u8;
    }

    pub fn parent(data: &[u8]) -> PageId {
        PageId::new(read_u32(data, Self::OFFSET_PARENT))
    }

    pub fn set_parent(data: &mut [u8], parent: PageId) {
        write_u32(data, Self::OFFSET_PARENT, parent.0);
    }
}

// ============================================================================
// TESTS
// ============================================================================
