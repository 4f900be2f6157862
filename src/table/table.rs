//! Table - typed rows on top of a [`BTree`].

use std::marker::PhantomData;
use std::path::Path;

use tracing::{debug, info};

use crate::btree::{render_constants, render_tree, BTree, Scan, TreeLayout};
use crate::common::{Error, Result, StorageConfig};
use crate::storage::{Pager, StatsSnapshot};

use super::record::{CatalogRow, Record, UserRow};

/// A table of `R` rows stored in one database file.
///
/// # Example
/// ```no_run
/// use pagedb::{StorageConfig, Table, UserRow};
///
/// let mut table = Table::<UserRow>::open("users.db", &StorageConfig::default())?;
/// table.insert_row(&UserRow::new(1, "alice", "alice@example.com")?)?;
/// for row in table.select() {
///     println!("{}", row?);
/// }
/// table.close()?;
/// # Ok::<(), pagedb::Error>(())
/// ```
pub struct Table<R: Record> {
    tree: BTree,
    _rows: PhantomData<R>,
}

impl<R: Record> Table<R> {
    /// Open (or create) the table stored in `path`.
    ///
    /// # Errors
    /// - `Error::Config` if `config` is out of range for this row size
    /// - fatal errors if the file cannot be opened or is corrupt
    pub fn open<P: AsRef<Path>>(path: P, config: &StorageConfig) -> Result<Self> {
        let layout = TreeLayout::from_config(R::SIZE, config)?;
        let pager = Pager::open(path, config.max_pages)?;
        let tree = BTree::open(pager, layout)?;
        Ok(Self {
            tree,
            _rows: PhantomData,
        })
    }

    /// Store `row` under `key`.
    ///
    /// # Errors
    /// - `Error::DuplicateKey` if `key` is present; nothing is written
    /// - fatal errors from the storage layer
    pub fn insert(&mut self, key: u32, row: &R) -> Result<()> {
        let mut buf = vec![0u8; R::SIZE];
        row.serialize(&mut buf);
        self.tree.insert(key, &buf)?;
        debug!(key, "inserted row");
        Ok(())
    }

    /// Fetch the row stored under `key`.
    pub fn get(&mut self, key: u32) -> Result<Option<R>> {
        Ok(self.tree.get(key)?.map(|bytes| R::deserialize(&bytes)))
    }

    /// All rows in ascending key order.
    pub fn select(&mut self) -> Rows<'_, R> {
        Rows {
            scan: self.tree.scan(),
            _rows: PhantomData,
        }
    }

    /// Largest key in the table, `None` when empty.
    pub fn max_key(&mut self) -> Result<Option<u32>> {
        self.tree.max_key()
    }

    /// Number of rows.
    pub fn len(&mut self) -> Result<usize> {
        self.tree.len()
    }

    pub fn is_empty(&mut self) -> Result<bool> {
        self.tree.is_empty()
    }

    /// The `.btree` rendering of the table's tree.
    pub fn render_tree(&mut self) -> Result<String> {
        render_tree(&mut self.tree)
    }

    /// The `.constants` rendering of the table's layout.
    pub fn constants(&self) -> String {
        render_constants(self.tree.layout())
    }

    /// Pages in use, counting page 0.
    pub fn num_pages(&self) -> u32 {
        self.tree.pager().num_pages()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.tree.pager().stats().snapshot()
    }

    /// Write every page back to the file and close it.
    pub fn close(self) -> Result<()> {
        info!(pages = self.num_pages(), stats = %self.stats(), "closing table");
        self.tree.close()
    }
}

impl Table<UserRow> {
    /// Insert a user keyed by its own id.
    pub fn insert_row(&mut self, row: &UserRow) -> Result<()> {
        self.insert(row.id, row)
    }
}

impl Table<CatalogRow> {
    /// Register a table in the catalog and return the key it was stored under.
    ///
    /// The key is one past the largest key in the catalog (1 when empty).
    /// The entry's root page is the highest page in use at this moment.
    ///
    /// # Errors
    /// - `Error::StringTooLong` if `name` or `sql` do not fit
    /// - `Error::DuplicateKey` if the key space is exhausted
    pub fn create_table(&mut self, name: &str, sql: &str) -> Result<u32> {
        let rootpage = self.num_pages().saturating_sub(1);
        let row = CatalogRow::new(rootpage, name, sql)?;

        let key = match self.max_key()? {
            Some(max) => max.checked_add(1).ok_or(Error::DuplicateKey(max))?,
            None => 1,
        };
        self.insert(key, &row)?;

        info!(table = name, key, rootpage, "registered table");
        Ok(key)
    }
}

/// Iterator over the rows of a [`Table`], created by [`Table::select`].
pub struct Rows<'t, R> {
    scan: Scan<'t>,
    _rows: PhantomData<R>,
}

impl<R: Record> Iterator for Rows<'_, R> {
    type Item = Result<R>;

    fn next(&mut self) -> Option<Self::Item> {
        self.scan
            .next()
            .map(|entry| entry.map(|(_, bytes)| R::deserialize(&bytes)))
    }
}
