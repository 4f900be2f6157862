//! Byte layout of tree nodes and the capacities derived from it.

use crate::common::config::PAGE_SIZE;
use crate::common::{Result, StorageConfig};
use crate::storage::page::NodeHeader;

/// Size of the header shared by both node kinds.
pub const COMMON_NODE_HEADER_SIZE: usize = NodeHeader::SIZE;

/*
 * Leaf node header: common header, cell count, next-leaf link.
 */
pub const LEAF_NODE_NUM_CELLS_OFFSET: usize = COMMON_NODE_HEADER_SIZE;
pub const LEAF_NODE_NEXT_LEAF_OFFSET: usize = LEAF_NODE_NUM_CELLS_OFFSET + 4;
pub const LEAF_NODE_HEADER_SIZE: usize = LEAF_NODE_NEXT_LEAF_OFFSET + 4;
pub const LEAF_NODE_KEY_SIZE: usize = 4;
pub const LEAF_NODE_SPACE_FOR_CELLS: usize = PAGE_SIZE - LEAF_NODE_HEADER_SIZE;

/*
 * Internal node header: common header, key count, right child.
 * Each cell is (child page number, key).
 */
pub const INTERNAL_NODE_NUM_KEYS_OFFSET: usize = COMMON_NODE_HEADER_SIZE;
pub const INTERNAL_NODE_RIGHT_CHILD_OFFSET: usize = INTERNAL_NODE_NUM_KEYS_OFFSET + 4;
pub const INTERNAL_NODE_HEADER_SIZE: usize = INTERNAL_NODE_RIGHT_CHILD_OFFSET + 4;
pub const INTERNAL_NODE_CHILD_SIZE: usize = 4;
pub const INTERNAL_NODE_KEY_SIZE: usize = 4;
pub const INTERNAL_NODE_CELL_SIZE: usize = INTERNAL_NODE_CHILD_SIZE + INTERNAL_NODE_KEY_SIZE;
pub const INTERNAL_NODE_SPACE_FOR_CELLS: usize = PAGE_SIZE - INTERNAL_NODE_HEADER_SIZE;

/// Sizes and fan-outs for one tree, fixed when the table is opened.
///
/// The byte offsets are the same for every tree; only the value size (and
/// with it the leaf capacity) depends on the row type stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeLayout {
    /// Bytes of serialized row stored after each leaf key.
    pub value_size: usize,
    /// Cells a leaf holds before it must split.
    pub leaf_max_cells: usize,
    /// Keys an internal node holds before it must split.
    pub internal_max_keys: usize,
}

impl TreeLayout {
    /// The largest capacities that fit in one page.
    pub const fn physical(value_size: usize) -> Self {
        Self {
            value_size,
            leaf_max_cells: LEAF_NODE_SPACE_FOR_CELLS / (LEAF_NODE_KEY_SIZE + value_size),
            internal_max_keys: INTERNAL_NODE_SPACE_FOR_CELLS / INTERNAL_NODE_CELL_SIZE,
        }
    }

    /// Physical capacities narrowed by any overrides in `config`.
    ///
    /// # Errors
    /// Returns `Error::Config` if an override is out of range.
    pub fn from_config(value_size: usize, config: &StorageConfig) -> Result<Self> {
        let physical = Self::physical(value_size);
        config.validate_against(physical.leaf_max_cells, physical.internal_max_keys)?;

        Ok(Self {
            value_size,
            leaf_max_cells: config.leaf_max_cells.unwrap_or(physical.leaf_max_cells),
            internal_max_keys: config.internal_max_keys.unwrap_or(physical.internal_max_keys),
        })
    }

    #[inline]
    pub fn leaf_cell_size(&self) -> usize {
        LEAF_NODE_KEY_SIZE + self.value_size
    }

    /// Cells that stay in the old (left) leaf after a split: the ceiling half.
    #[inline]
    pub fn leaf_left_split_count(&self) -> usize {
        (self.leaf_max_cells + 1) - self.leaf_right_split_count()
    }

    /// Cells that move to the new (right) leaf after a split.
    #[inline]
    pub fn leaf_right_split_count(&self) -> usize {
        (self.leaf_max_cells + 1) / 2
    }
}
