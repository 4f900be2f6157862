//! The B-tree engine: search, insertion and node splitting.
//!
//! # Structure
//! ```text
//!                    page 0 (root, internal)
//!                 ┌──────────┬──────────┐
//!                 │ child│key│right child│
//!                 └──┬───────┴────┬──────┘
//!                    ▼            ▼
//!             leaf (≤ key)  →  leaf (> key)     leaves linked left to right
//! ```
//!
//! The root always lives on page 0. When the root splits, its bytes move to
//! a fresh page that becomes the left child, and page 0 is rewritten as the
//! new internal root. Nodes refer to each other only by page number; the
//! [`Pager`] owns every page.

use tracing::debug;

use crate::common::{Error, PageId, Result};
use crate::storage::page::{NodeHeader, NodeType};
use crate::storage::Pager;

use super::cursor::Cursor;
use super::layout::{TreeLayout, LEAF_NODE_KEY_SIZE};
use super::node::{node_type, InternalNode, LeafNode};

/// A B-tree of `u32` keys and fixed-size values stored in one file.
pub struct BTree {
    pager: Pager,
    layout: TreeLayout,
    root: PageId,
}

impl BTree {
    /// Wrap a pager, creating an empty root leaf if the file is new.
    pub fn open(mut pager: Pager, layout: TreeLayout) -> Result<Self> {
        let root = PageId::ROOT;
        if pager.num_pages() == 0 {
            // New database file. Initialize page 0 as leaf node.
            let page = pager.get_page(root)?;
            let mut leaf = LeafNode::new(page.as_mut_slice(), layout);
            leaf.initialize();
            leaf.set_root(true);
            debug!("initialized empty root leaf");
        }

        Ok(Self {
            pager,
            layout,
            root,
        })
    }

    /// Flush every page and close the file.
    pub fn close(self) -> Result<()> {
        self.pager.close()
    }

    pub fn layout(&self) -> &TreeLayout {
        &self.layout
    }

    pub fn root(&self) -> PageId {
        self.root
    }

    pub fn pager(&self) -> &Pager {
        &self.pager
    }

    // ========================================================================
    // Node access
    // ========================================================================

    pub(crate) fn node_type(&mut self, page: PageId) -> Result<NodeType> {
        node_type(self.pager.get_page(page)?.as_slice(), page)
    }

    pub(crate) fn leaf(&mut self, page: PageId) -> Result<LeafNode<&[u8]>> {
        let layout = self.layout;
        Ok(LeafNode::new(self.pager.get_page(page)?.as_slice(), layout))
    }

    fn leaf_mut(&mut self, page: PageId) -> Result<LeafNode<&mut [u8]>> {
        let layout = self.layout;
        Ok(LeafNode::new(self.pager.get_page(page)?.as_mut_slice(), layout))
    }

    pub(crate) fn internal(&mut self, page: PageId) -> Result<InternalNode<&[u8]>> {
        Ok(InternalNode::new(self.pager.get_page(page)?.as_slice()))
    }

    fn internal_mut(&mut self, page: PageId) -> Result<InternalNode<&mut [u8]>> {
        Ok(InternalNode::new(self.pager.get_page(page)?.as_mut_slice()))
    }

    fn set_parent(&mut self, page: PageId, parent: PageId) -> Result<()> {
        NodeHeader::set_parent(self.pager.get_page(page)?.as_mut_slice(), parent);
        Ok(())
    }

    /// Largest key in the subtree rooted at `page`, `None` if it is empty.
    pub fn subtree_max_key(&mut self, page: PageId) -> Result<Option<u32>> {
        let mut page = page;
        loop {
            match self.node_type(page)? {
                NodeType::Leaf => return Ok(self.leaf(page)?.max_key()),
                NodeType::Internal => {
                    let node = self.internal(page)?;
                    page = node.child(node.num_keys())?;
                }
            }
        }
    }

    /// Largest key of a node that is known to be non-empty.
    fn node_max_key(&mut self, page: PageId) -> Result<u32> {
        Ok(self.subtree_max_key(page)?.unwrap_or(0))
    }

    /// Largest key in the whole tree.
    pub fn max_key(&mut self) -> Result<Option<u32>> {
        self.subtree_max_key(self.root)
    }

    /// Number of entries, counted along the leaf chain.
    pub fn len(&mut self) -> Result<usize> {
        let mut page = Some(self.find(0)?.page);
        let mut count = 0;
        while let Some(current) = page {
            let leaf = self.leaf(current)?;
            count += leaf.num_cells();
            page = leaf.next_leaf();
        }
        Ok(count)
    }

    pub fn is_empty(&mut self) -> Result<bool> {
        Ok(self.max_key()?.is_none())
    }

    // ========================================================================
    // Search
    // ========================================================================

    /// Position of `key`, or the position where it would be inserted.
    ///
    /// Descends from the root, picking in each internal node the leftmost
    /// child whose maximum is `>= key`, then binary-searches the leaf.
    pub fn find(&mut self, key: u32) -> Result<Cursor> {
        let mut page = self.root;
        loop {
            match self.node_type(page)? {
                NodeType::Leaf => {
                    let cell = self.leaf(page)?.find(key);
                    return Ok(Cursor::new(page, cell));
                }
                NodeType::Internal => {
                    let node = self.internal(page)?;
                    page = node.child(node.find_child_index(key))?;
                }
            }
        }
    }

    /// Look up the value stored under `key`.
    pub fn get(&mut self, key: u32) -> Result<Option<Vec<u8>>> {
        let cursor = self.find(key)?;
        let leaf = self.leaf(cursor.page)?;
        if cursor.cell < leaf.num_cells() && leaf.key(cursor.cell) == key {
            Ok(Some(leaf.value(cursor.cell).to_vec()))
        } else {
            Ok(None)
        }
    }

    // ========================================================================
    // Insertion
    // ========================================================================

    /// Insert `value` under `key`.
    ///
    /// `value` must not be longer than the layout's value size; shorter
    /// values are zero-padded.
    ///
    /// # Errors
    /// - `Error::DuplicateKey` if the key exists; the tree is unchanged
    /// - fatal errors if a split needs a page past the bound
    pub fn insert(&mut self, key: u32, value: &[u8]) -> Result<()> {
        debug_assert!(value.len() <= self.layout.value_size, "value too large");

        let cursor = self.find(key)?;
        let leaf = self.leaf(cursor.page)?;
        let num_cells = leaf.num_cells();
        if cursor.cell < num_cells && leaf.key(cursor.cell) == key {
            return Err(Error::DuplicateKey(key));
        }

        if num_cells >= self.layout.leaf_max_cells {
            return self.leaf_split_and_insert(cursor, key, value);
        }

        self.leaf_mut(cursor.page)?.insert(cursor.cell, key, value);
        Ok(())
    }

    /// Split a full leaf and insert the new cell into the right half.
    ///
    /// The old cells plus the new one are divided in index order: the old
    /// (left) leaf keeps the ceiling half, a new right leaf takes the rest.
    fn leaf_split_and_insert(&mut self, cursor: Cursor, key: u32, value: &[u8]) -> Result<()> {
        let layout = self.layout;
        let old_page = cursor.page;
        let old_max = self.node_max_key(old_page)?;

        let (parent, next_leaf, is_root, mut cells) = {
            let old = self.leaf(old_page)?;
            let cells: Vec<Vec<u8>> = (0..old.num_cells()).map(|i| old.cell(i).to_vec()).collect();
            (old.parent(), old.next_leaf(), old.is_root(), cells)
        };

        let mut new_cell = vec![0u8; layout.leaf_cell_size()];
        new_cell[..LEAF_NODE_KEY_SIZE].copy_from_slice(&key.to_le_bytes());
        new_cell[LEAF_NODE_KEY_SIZE..LEAF_NODE_KEY_SIZE + value.len()].copy_from_slice(value);
        cells.insert(cursor.cell, new_cell);

        let new_page = self.pager.allocate_page()?;
        let (left_cells, right_cells) = cells.split_at(layout.leaf_left_split_count());

        {
            let mut new_leaf = self.leaf_mut(new_page)?;
            new_leaf.initialize();
            new_leaf.set_parent(parent);
            new_leaf.set_next_leaf(next_leaf);
            for (i, cell) in right_cells.iter().enumerate() {
                new_leaf.set_cell(i, cell);
            }
            new_leaf.set_num_cells(right_cells.len());
        }
        {
            let mut old_leaf = self.leaf_mut(old_page)?;
            for (i, cell) in left_cells.iter().enumerate() {
                old_leaf.set_cell(i, cell);
            }
            old_leaf.set_num_cells(left_cells.len());
            old_leaf.set_next_leaf(Some(new_page));
        }

        debug!(
            left = old_page.0,
            right = new_page.0,
            left_cells = left_cells.len(),
            right_cells = right_cells.len(),
            "split leaf"
        );

        if is_root {
            self.create_new_root(new_page)
        } else {
            let new_max = self.node_max_key(old_page)?;
            self.update_internal_node_key(parent, old_max, new_max)?;
            self.internal_node_insert(parent, new_page)
        }
    }

    /// Grow the tree by one level.
    ///
    /// The old root is copied to a new page that becomes the left child;
    /// page 0 is reinitialized as an internal root over that copy and
    /// `right_child`.
    fn create_new_root(&mut self, right_child: PageId) -> Result<()> {
        let root = self.root;
        let left_child = self.pager.allocate_page()?;

        // Left child has data copied from old root
        self.pager.copy_page(root, left_child)?;
        NodeHeader::set_root(self.pager.get_page(left_child)?.as_mut_slice(), false);

        if self.node_type(left_child)? == NodeType::Internal {
            let children = self.internal(left_child)?.children()?;
            for child in children {
                self.set_parent(child, left_child)?;
            }
        }

        let left_max = self.node_max_key(left_child)?;
        {
            let mut root_node = self.internal_mut(root)?;
            root_node.initialize();
            root_node.set_root(true);
            root_node.insert_cell(0, left_child, left_max);
            root_node.set_right_child(right_child);
        }
        self.set_parent(left_child, root)?;
        self.set_parent(right_child, root)?;

        debug!(
            left = left_child.0,
            right = right_child.0,
            key = left_max,
            "created new root"
        );
        Ok(())
    }

    /// Point the routing key that used to read `old_key` at `new_key`.
    ///
    /// Nothing to do if `old_key` belonged to the right child, which has no
    /// routing key.
    fn update_internal_node_key(&mut self, page: PageId, old_key: u32, new_key: u32) -> Result<()> {
        let mut node = self.internal_mut(page)?;
        let index = node.find_child_index(old_key);
        if index < node.num_keys() {
            node.set_key(index, new_key);
        }
        Ok(())
    }

    /// Add `child` to the internal node `parent`, splitting it if full.
    fn internal_node_insert(&mut self, parent: PageId, child: PageId) -> Result<()> {
        let child_max = self.node_max_key(child)?;
        let (num_keys, right_child, index) = {
            let node = self.internal(parent)?;
            (node.num_keys(), node.right_child(), node.find_child_index(child_max))
        };

        // An internal node with an invalid right child is empty
        if !right_child.is_valid() {
            self.internal_mut(parent)?.set_right_child(child);
            return self.set_parent(child, parent);
        }

        if num_keys >= self.layout.internal_max_keys {
            return self.internal_node_split_and_insert(parent, child);
        }

        let right_max = self.node_max_key(right_child)?;
        {
            let mut node = self.internal_mut(parent)?;
            if child_max > right_max {
                // Replace right child
                node.insert_cell(num_keys, right_child, right_max);
                node.set_right_child(child);
            } else {
                node.insert_cell(index, child, child_max);
            }
        }
        self.set_parent(child, parent)
    }

    /// Split a full internal node while adding `child` to it.
    ///
    /// All children of the node plus the pending one are ordered by subtree
    /// maximum; the old node keeps the ceiling half and a new internal node
    /// takes the rest. The new node is then promoted into the parent, or a
    /// new root is created if the old node was the root.
    fn internal_node_split_and_insert(&mut self, old_page: PageId, child: PageId) -> Result<()> {
        let old_max = self.node_max_key(old_page)?;
        let child_max = self.node_max_key(child)?;

        let (is_root, parent, mut entries) = {
            let old = self.internal(old_page)?;
            let mut entries = Vec::with_capacity(old.num_keys() + 2);
            for i in 0..old.num_keys() {
                entries.push((old.child(i)?, old.key(i)));
            }
            entries.push((old.child(old.num_keys())?, old_max));
            (old.is_root(), old.parent(), entries)
        };
        let position = entries.partition_point(|&(_, max)| max < child_max);
        entries.insert(position, (child, child_max));

        let new_page = self.pager.allocate_page()?;
        self.internal_mut(new_page)?.initialize();

        let (left, right) = entries.split_at(entries.len() - entries.len() / 2);
        self.write_children(old_page, left)?;
        self.write_children(new_page, right)?;

        debug!(
            left = old_page.0,
            right = new_page.0,
            left_children = left.len(),
            right_children = right.len(),
            "split internal node"
        );

        if is_root {
            self.create_new_root(new_page)
        } else {
            let new_max = self.node_max_key(old_page)?;
            self.update_internal_node_key(parent, old_max, new_max)?;
            self.internal_node_insert(parent, new_page)
        }
    }

    /// Rewrite an internal node's cells to exactly `children`, in order,
    /// and point each child back at it.
    fn write_children(&mut self, page: PageId, children: &[(PageId, u32)]) -> Result<()> {
        let Some((&(last, _), cells)) = children.split_last() else {
            return Err(Error::InvalidChild {
                index: 0,
                num_keys: 0,
            });
        };

        {
            let mut node = self.internal_mut(page)?;
            for (i, &(child, max)) in cells.iter().enumerate() {
                node.set_cell(i, child, max);
            }
            node.set_num_keys(cells.len());
            node.set_right_child(last);
        }
        for &(child, _) in children {
            self.set_parent(child, page)?;
        }
        Ok(())
    }
}
