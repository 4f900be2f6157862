//! Page identifier type.

use std::fmt;

use crate::common::config::PAGE_SIZE;

/// Identifies a page in the database file.
///
/// Page `N` starts at byte `N × PAGE_SIZE`. Page 0 always holds the root
/// of the table's tree, which is why a leaf's next-sibling link can use 0
/// to mean "no sibling".
///
/// # Example
/// ```
/// use pagedb::PageId;
///
/// let page_id = PageId::new(3);
/// assert!(page_id.is_valid());
/// assert_eq!(page_id.offset(), 3 * 4096);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId(pub u32);

impl PageId {
    /// Invalid/sentinel page ID.
    ///
    /// Stored as the right child of an internal node that has no children yet.
    pub const INVALID: PageId = PageId(u32::MAX);

    /// The page that always holds the root node.
    pub const ROOT: PageId = PageId(0);

    /// Create a new PageId.
    #[inline]
    pub fn new(id: u32) -> Self {
        PageId(id)
    }

    /// Check if this page ID is valid (not the sentinel value).
    #[inline]
    pub fn is_valid(&self) -> bool {
        *self != Self::INVALID
    }

    /// Byte offset of this page within the file.
    #[inline]
    pub fn offset(&self) -> u64 {
        self.0 as u64 * PAGE_SIZE as u64
    }

    /// Slot index in the pager's cache.
    #[inline]
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::INVALID {
            write!(f, "Page(INVALID)")
        } else {
            write!(f, "Page({})", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_id_invalid() {
        assert!(!PageId::INVALID.is_valid());
        assert_eq!(PageId::INVALID.0, u32::MAX);
        assert!(PageId::ROOT.is_valid());
    }

    #[test]
    fn test_page_id_offset() {
        assert_eq!(PageId::ROOT.offset(), 0);
        assert_eq!(PageId::new(2).offset(), 8192);
        // No overflow for the top of the u32 range.
        assert_eq!(PageId::new(u32::MAX - 1).offset(), (u32::MAX as u64 - 1) * 4096);
    }

    #[test]
    fn test_page_id_display() {
        assert_eq!(format!("{}", PageId::new(42)), "Page(42)");
        assert_eq!(format!("{}", PageId::INVALID), "Page(INVALID)");
    }
}
