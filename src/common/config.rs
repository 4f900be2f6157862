//! Configuration constants and storage settings for pagedb.

use crate::common::{Error, Result};

/// Size of a page in bytes (4KB).
///
/// Every node of the tree occupies exactly one page, and page `N` lives at
/// file offset `N × PAGE_SIZE`.
pub const PAGE_SIZE: usize = 4096;

/// Default bound on the number of pages a table may touch.
///
/// The pager only grows its cache to the highest page touched, so any bound up
/// to `u32::MAX` is cheap to configure.
pub const TABLE_MAX_PAGES: u32 = 100;

/// Runtime storage settings.
///
/// # Validation Rules
/// - `max_pages` must be >= 1
/// - `leaf_max_cells`, when set, must be in `2..=physical leaf capacity`
/// - `internal_max_keys`, when set, must be in `2..=physical internal capacity`
///
/// The capacity overrides never change the byte layout of a page, only how
/// many cells the tree is willing to put in one. They exist for exercising
/// deep trees with few rows.
///
/// # Example
/// ```
/// use pagedb::StorageConfig;
///
/// let config = StorageConfig::default().with_internal_max_keys(3);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageConfig {
    /// Highest page count the pager will hand out.
    pub max_pages: u32,
    /// Cells per leaf before it splits; `None` derives it from the page size.
    pub leaf_max_cells: Option<usize>,
    /// Keys per internal node before it splits; `None` derives it from the page size.
    pub internal_max_keys: Option<usize>,
}

impl StorageConfig {
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn with_leaf_max_cells(mut self, cells: usize) -> Self {
        self.leaf_max_cells = Some(cells);
        self
    }

    pub fn with_internal_max_keys(mut self, keys: usize) -> Self {
        self.internal_max_keys = Some(keys);
        self
    }

    /// Validate the settings against the physical page capacities.
    ///
    /// `leaf_capacity` and `internal_capacity` are what fits in one page for
    /// the row size in use (see [`TreeLayout`](crate::btree::TreeLayout)).
    ///
    /// # Errors
    /// Returns [`Error::Config`] naming the first offending setting.
    pub fn validate_against(&self, leaf_capacity: usize, internal_capacity: usize) -> Result<()> {
        if self.max_pages == 0 {
            return Err(Error::Config("max_pages must be >= 1, got 0".to_string()));
        }
        if let Some(cells) = self.leaf_max_cells {
            if !(2..=leaf_capacity).contains(&cells) {
                return Err(Error::Config(format!(
                    "leaf_max_cells must be 2-{}, got {}",
                    leaf_capacity, cells
                )));
            }
        }
        if let Some(keys) = self.internal_max_keys {
            if !(2..=internal_capacity).contains(&keys) {
                return Err(Error::Config(format!(
                    "internal_max_keys must be 2-{}, got {}",
                    internal_capacity, keys
                )));
            }
        }
        Ok(())
    }

    /// Validate against the capacities of the default 293-byte row.
    pub fn validate(&self) -> Result<()> {
        let layout = crate::btree::TreeLayout::physical(crate::table::ROW_SIZE);
        self.validate_against(layout.leaf_max_cells, layout.internal_max_keys)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            max_pages: TABLE_MAX_PAGES,
            leaf_max_cells: None,
            internal_max_keys: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_size_is_power_of_two() {
        assert!(PAGE_SIZE.is_power_of_two());
        assert_eq!(PAGE_SIZE, 4096);
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = StorageConfig::default();
        assert_eq!(config.max_pages, TABLE_MAX_PAGES);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_pages_rejected() {
        let config = StorageConfig::default().with_max_pages(0);
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_largest_page_bound_accepted() {
        let config = StorageConfig::default().with_max_pages(u32::MAX);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_capacity_overrides_bounded() {
        assert!(StorageConfig::default().with_leaf_max_cells(1).validate().is_err());
        assert!(StorageConfig::default().with_leaf_max_cells(14).validate().is_err());
        assert!(StorageConfig::default().with_leaf_max_cells(13).validate().is_ok());
        assert!(StorageConfig::default().with_internal_max_keys(3).validate().is_ok());
        assert!(StorageConfig::default().with_internal_max_keys(511).validate().is_err());
    }
}
