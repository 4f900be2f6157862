//! Cursors: positions in the tree and in-order iteration over the leaves.

use crate::common::{PageId, Result};

use super::tree::BTree;

/// A position in the tree: a leaf page and a cell index within it.
///
/// A cursor does not borrow the tree; every access goes through the
/// [`BTree`] passed in. Any insert invalidates outstanding cursors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub page: PageId,
    pub cell: usize,
    /// Set once the cursor has moved past the last entry.
    pub end_of_table: bool,
}

impl Cursor {
    pub(crate) fn new(page: PageId, cell: usize) -> Self {
        Self {
            page,
            cell,
            end_of_table: false,
        }
    }

    /// Key of the entry under the cursor.
    pub fn key(&self, tree: &mut BTree) -> Result<u32> {
        Ok(tree.leaf(self.page)?.key(self.cell))
    }

    /// Value bytes of the entry under the cursor.
    pub fn value<'t>(&self, tree: &'t mut BTree) -> Result<&'t [u8]> {
        Ok(tree.leaf(self.page)?.into_value(self.cell))
    }

    /// Move to the next entry, crossing into the next leaf when this one is
    /// exhausted. Past the rightmost leaf the cursor is at end of table.
    pub fn advance(&mut self, tree: &mut BTree) -> Result<()> {
        let leaf = tree.leaf(self.page)?;
        self.cell += 1;
        if self.cell >= leaf.num_cells() {
            match leaf.next_leaf() {
                Some(next) => {
                    self.page = next;
                    self.cell = 0;
                }
                None => self.end_of_table = true,
            }
        }
        Ok(())
    }
}

impl BTree {
    /// Cursor at the smallest key.
    ///
    /// Starts at end of table when the tree is empty.
    pub fn start(&mut self) -> Result<Cursor> {
        let mut cursor = self.find(0)?;
        cursor.end_of_table = self.leaf(cursor.page)?.num_cells() == 0;
        Ok(cursor)
    }

    /// Iterate over all entries in ascending key order.
    pub fn scan(&mut self) -> Scan<'_> {
        Scan {
            tree: self,
            cursor: None,
            done: false,
        }
    }
}

/// Iterator over `(key, value)` pairs, created by [`BTree::scan`].
///
/// Stops after the first error.
pub struct Scan<'t> {
    tree: &'t mut BTree,
    cursor: Option<Cursor>,
    done: bool,
}

impl Scan<'_> {
    fn step(&mut self) -> Result<Option<(u32, Vec<u8>)>> {
        let mut cursor = match self.cursor {
            Some(cursor) => cursor,
            None => self.tree.start()?,
        };
        if cursor.end_of_table {
            return Ok(None);
        }

        let key = cursor.key(self.tree)?;
        let value = cursor.value(self.tree)?.to_vec();
        cursor.advance(self.tree)?;
        self.cursor = Some(cursor);
        Ok(Some((key, value)))
    }
}

impl Iterator for Scan<'_> {
    type Item = Result<(u32, Vec<u8>)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.step() {
            Ok(Some(entry)) => Some(Ok(entry)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}
