//! Typed views over the two node formats.
//!
//! A node is just a page buffer; [`LeafNode`] and [`InternalNode`] wrap a
//! borrowed buffer and read or write fields at fixed offsets. They do no I/O.
//! Read-only views wrap `&[u8]`, mutable views wrap `&mut [u8]`.
//!
//! ```text
//! Leaf:     [hdr 6][num_cells 4][next_leaf 4][key 4|value]...[key 4|value]
//! Internal: [hdr 6][num_keys 4][right_child 4][child 4|key 4]...
//! ```

use crate::common::{Error, PageId, Result};
use crate::storage::page::{read_u32, write_u32, NodeHeader, NodeType};

use super::layout::{
    TreeLayout, INTERNAL_NODE_CELL_SIZE, INTERNAL_NODE_CHILD_SIZE, INTERNAL_NODE_HEADER_SIZE,
    INTERNAL_NODE_NUM_KEYS_OFFSET, INTERNAL_NODE_RIGHT_CHILD_OFFSET, LEAF_NODE_HEADER_SIZE,
    LEAF_NODE_KEY_SIZE, LEAF_NODE_NEXT_LEAF_OFFSET, LEAF_NODE_NUM_CELLS_OFFSET,
};

// ============================================================================
// Leaf nodes
// ============================================================================

/// A leaf node: sorted (key, value) cells and a link to the next leaf.
pub struct LeafNode<B> {
    buf: B,
    layout: TreeLayout,
}

impl<B: AsRef<[u8]>> LeafNode<B> {
    pub fn new(buf: B, layout: TreeLayout) -> Self {
        Self { buf, layout }
    }

    #[inline]
    fn data(&self) -> &[u8] {
        self.buf.as_ref()
    }

    #[inline]
    fn cell_offset(&self, cell_num: usize) -> usize {
        LEAF_NODE_HEADER_SIZE + cell_num * self.layout.leaf_cell_size()
    }

    pub fn num_cells(&self) -> usize {
        read_u32(self.data(), LEAF_NODE_NUM_CELLS_OFFSET) as usize
    }

    /// The next leaf to the right, or `None` for the rightmost leaf.
    pub fn next_leaf(&self) -> Option<PageId> {
        match read_u32(self.data(), LEAF_NODE_NEXT_LEAF_OFFSET) {
            0 => None,
            page => Some(PageId::new(page)),
        }
    }

    pub fn is_root(&self) -> bool {
        NodeHeader::is_root(self.data())
    }

    pub fn parent(&self) -> PageId {
        NodeHeader::parent(self.data())
    }

    /// Raw bytes of one cell (key followed by value).
    pub fn cell(&self, cell_num: usize) -> &[u8] {
        let start = self.cell_offset(cell_num);
        &self.data()[start..start + self.layout.leaf_cell_size()]
    }

    pub fn key(&self, cell_num: usize) -> u32 {
        read_u32(self.data(), self.cell_offset(cell_num))
    }

    pub fn value(&self, cell_num: usize) -> &[u8] {
        let start = self.cell_offset(cell_num) + LEAF_NODE_KEY_SIZE;
        &self.data()[start..start + self.layout.value_size]
    }

    pub fn max_key(&self) -> Option<u32> {
        match self.num_cells() {
            0 => None,
            n => Some(self.key(n - 1)),
        }
    }

    /// Index of `key`, or the index where it would be inserted.
    pub fn find(&self, key: u32) -> usize {
        let mut min_index = 0;
        let mut one_past_max_index = self.num_cells();
        while one_past_max_index != min_index {
            let index = (min_index + one_past_max_index) / 2;
            let key_at_index = self.key(index);
            if key == key_at_index {
                return index;
            }
            if key < key_at_index {
                one_past_max_index = index;
            } else {
                min_index = index + 1;
            }
        }
        min_index
    }
}

impl<'a> LeafNode<&'a [u8]> {
    /// Like [`LeafNode::value`], but borrowing from the page instead of the view.
    pub fn into_value(self, cell_num: usize) -> &'a [u8] {
        let start = self.cell_offset(cell_num) + LEAF_NODE_KEY_SIZE;
        let buf: &'a [u8] = self.buf;
        &buf[start..start + self.layout.value_size]
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> LeafNode<B> {
    #[inline]
    fn data_mut(&mut self) -> &mut [u8] {
        self.buf.as_mut()
    }

    /// Turn the buffer into an empty, non-root leaf with no sibling.
    pub fn initialize(&mut self) {
        let data = self.data_mut();
        NodeHeader::set_node_type(data, NodeType::Leaf);
        NodeHeader::set_root(data, false);
        write_u32(data, LEAF_NODE_NUM_CELLS_OFFSET, 0);
        write_u32(data, LEAF_NODE_NEXT_LEAF_OFFSET, 0);
    }

    pub fn set_num_cells(&mut self, num_cells: usize) {
        write_u32(self.data_mut(), LEAF_NODE_NUM_CELLS_OFFSET, num_cells as u32);
    }

    pub fn set_next_leaf(&mut self, next: Option<PageId>) {
        let page = next.map_or(0, |p| p.0);
        write_u32(self.data_mut(), LEAF_NODE_NEXT_LEAF_OFFSET, page);
    }

    pub fn set_root(&mut self, is_root: bool) {
        NodeHeader::set_root(self.data_mut(), is_root);
    }

    pub fn set_parent(&mut self, parent: PageId) {
        NodeHeader::set_parent(self.data_mut(), parent);
    }

    /// Overwrite a whole cell with raw bytes taken from another leaf.
    pub fn set_cell(&mut self, cell_num: usize, cell: &[u8]) {
        let start = self.cell_offset(cell_num);
        let size = self.layout.leaf_cell_size();
        self.data_mut()[start..start + size].copy_from_slice(cell);
    }

    /// Write a key and its value into a cell.
    ///
    /// `value` shorter than the value size is zero-padded.
    pub fn write_cell(&mut self, cell_num: usize, key: u32, value: &[u8]) {
        let start = self.cell_offset(cell_num);
        let value_size = self.layout.value_size;
        let data = self.data_mut();
        write_u32(data, start, key);
        let dest = &mut data[start + LEAF_NODE_KEY_SIZE..start + LEAF_NODE_KEY_SIZE + value_size];
        dest.fill(0);
        dest[..value.len()].copy_from_slice(value);
    }

    /// Insert a cell at `cell_num`, shifting later cells one slot right.
    ///
    /// The caller guarantees the leaf has room.
    pub fn insert(&mut self, cell_num: usize, key: u32, value: &[u8]) {
        let num_cells = self.num_cells();
        debug_assert!(num_cells < self.layout.leaf_max_cells, "leaf is full");

        if cell_num < num_cells {
            let cell_size = self.layout.leaf_cell_size();
            let from = self.cell_offset(cell_num);
            let to = self.cell_offset(num_cells);
            self.data_mut().copy_within(from..to, from + cell_size);
        }
        self.write_cell(cell_num, key, value);
        self.set_num_cells(num_cells + 1);
    }
}

// ============================================================================
// Internal nodes
// ============================================================================

/// An internal node: sorted (child, key) cells plus a right child.
///
/// Each key is the maximum key found under its child. The right child holds
/// everything greater than the last key.
pub struct InternalNode<B> {
    buf: B,
}

impl<B: AsRef<[u8]>> InternalNode<B> {
    pub fn new(buf: B) -> Self {
        Self { buf }
    }

    #[inline]
    fn data(&self) -> &[u8] {
        self.buf.as_ref()
    }

    #[inline]
    fn cell_offset(cell_num: usize) -> usize {
        INTERNAL_NODE_HEADER_SIZE + cell_num * INTERNAL_NODE_CELL_SIZE
    }

    pub fn num_keys(&self) -> usize {
        read_u32(self.data(), INTERNAL_NODE_NUM_KEYS_OFFSET) as usize
    }

    /// The right child, [`PageId::INVALID`] while the node is empty.
    pub fn right_child(&self) -> PageId {
        PageId::new(read_u32(self.data(), INTERNAL_NODE_RIGHT_CHILD_OFFSET))
    }

    pub fn is_root(&self) -> bool {
        NodeHeader::is_root(self.data())
    }

    pub fn parent(&self) -> PageId {
        NodeHeader::parent(self.data())
    }

    pub fn key(&self, key_num: usize) -> u32 {
        read_u32(self.data(), Self::cell_offset(key_num) + INTERNAL_NODE_CHILD_SIZE)
    }

    /// Child `child_num`, where `num_keys` names the right child.
    ///
    /// # Errors
    /// - `Error::InvalidChild` if `child_num > num_keys`
    /// - `Error::InvalidPage` if the slot holds the invalid-page sentinel or
    ///   points back at the root
    pub fn child(&self, child_num: usize) -> Result<PageId> {
        let num_keys = self.num_keys();
        let child = if child_num > num_keys {
            return Err(Error::InvalidChild {
                index: child_num,
                num_keys,
            });
        } else if child_num == num_keys {
            self.right_child()
        } else {
            PageId::new(read_u32(self.data(), Self::cell_offset(child_num)))
        };

        // The root never moves off page 0, so it is never anyone's child.
        if !child.is_valid() || child == PageId::ROOT {
            return Err(Error::InvalidPage { index: child_num });
        }
        Ok(child)
    }

    /// All children in key order, right child last.
    pub fn children(&self) -> Result<Vec<PageId>> {
        (0..=self.num_keys()).map(|i| self.child(i)).collect()
    }

    /// Index of the child whose subtree should contain `key`.
    ///
    /// Picks the leftmost child whose key is `>= key`, so a key equal to a
    /// boundary routes left. Returns `num_keys` (the right child) if every
    /// key is smaller.
    pub fn find_child_index(&self, key: u32) -> usize {
        let mut min_index = 0;
        let mut max_index = self.num_keys(); // there is one more child than key
        while min_index != max_index {
            let index = (min_index + max_index) / 2;
            let key_to_right = self.key(index);
            if key_to_right >= key {
                max_index = index;
            } else {
                min_index = index + 1;
            }
        }
        min_index
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> InternalNode<B> {
    #[inline]
    fn data_mut(&mut self) -> &mut [u8] {
        self.buf.as_mut()
    }

    /// Turn the buffer into an empty, non-root internal node.
    ///
    /// The right child starts as the invalid sentinel rather than 0, since
    /// 0 is the root's page and would make this node the root's parent.
    pub fn initialize(&mut self) {
        let data = self.data_mut();
        NodeHeader::set_node_type(data, NodeType::Internal);
        NodeHeader::set_root(data, false);
        write_u32(data, INTERNAL_NODE_NUM_KEYS_OFFSET, 0);
        write_u32(data, INTERNAL_NODE_RIGHT_CHILD_OFFSET, PageId::INVALID.0);
    }

    pub fn set_num_keys(&mut self, num_keys: usize) {
        write_u32(self.data_mut(), INTERNAL_NODE_NUM_KEYS_OFFSET, num_keys as u32);
    }

    pub fn set_right_child(&mut self, child: PageId) {
        write_u32(self.data_mut(), INTERNAL_NODE_RIGHT_CHILD_OFFSET, child.0);
    }

    pub fn set_root(&mut self, is_root: bool) {
        NodeHeader::set_root(self.data_mut(), is_root);
    }

    pub fn set_parent(&mut self, parent: PageId) {
        NodeHeader::set_parent(self.data_mut(), parent);
    }

    pub fn set_key(&mut self, key_num: usize, key: u32) {
        let offset = Self::cell_offset(key_num) + INTERNAL_NODE_CHILD_SIZE;
        write_u32(self.data_mut(), offset, key);
    }

    /// Write a (child, key) cell.
    pub fn set_cell(&mut self, cell_num: usize, child: PageId, key: u32) {
        let offset = Self::cell_offset(cell_num);
        let data = self.data_mut();
        write_u32(data, offset, child.0);
        write_u32(data, offset + INTERNAL_NODE_CHILD_SIZE, key);
    }

    /// Insert a cell at `cell_num`, shifting later cells one slot right.
    pub fn insert_cell(&mut self, cell_num: usize, child: PageId, key: u32) {
        let num_keys = self.num_keys();
        if cell_num < num_keys {
            let from = Self::cell_offset(cell_num);
            let to = Self::cell_offset(num_keys);
            self.data_mut()
                .copy_within(from..to, from + INTERNAL_NODE_CELL_SIZE);
        }
        self.set_cell(cell_num, child, key);
        self.set_num_keys(num_keys + 1);
    }
}

/// Read the node type of a page buffer.
pub fn node_type(data: &[u8], page: PageId) -> Result<NodeType> {
    NodeHeader::node_type(data, page)
}
