//! pagedb - a single-file, paged B-tree table store.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                             pagedb                              │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │              Front end (frontend/)                       │   │
//! │  │     insert / select / create table, .btree .constants    │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │              Table (table/)                              │   │
//! │  │        Table<R> + UserRow / CatalogRow codecs            │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │              B-tree (btree/)                             │   │
//! │  │     find, insert, leaf/internal split, cursor scan       │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │              Storage (storage/)                          │   │
//! │  │        Pager + Page + NodeHeader + PagerStats            │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (PageId, Error, config)
//! - [`storage`] - The pager and page formats
//! - [`btree`] - Node layouts and the tree algorithms
//! - [`table`] - Row types and the table facade
//! - [`frontend`] - Statement parsing and the line-at-a-time session
//!
//! # Quick Start
//! ```no_run
//! use pagedb::{StorageConfig, Table, UserRow};
//!
//! let mut table = Table::<UserRow>::open("my_database.db", &StorageConfig::default())?;
//! table.insert_row(&UserRow::new(1, "user1", "person1@example.com")?)?;
//! assert_eq!(table.len()?, 1);
//! table.close()?;
//! # Ok::<(), pagedb::Error>(())
//! ```

pub mod btree;
pub mod common;
pub mod frontend;
pub mod storage;
pub mod table;

// Re-export commonly used items at crate root for convenience
pub use common::config::{PAGE_SIZE, TABLE_MAX_PAGES};
pub use common::{Error, PageId, Result, StorageConfig};

pub use btree::{BTree, Cursor, TreeLayout};
pub use frontend::{Outcome, Session, TableKind};
pub use storage::page::Page;
pub use storage::{Pager, PagerStats, StatsSnapshot};
pub use table::{CatalogRow, Record, Table, UserRow, ROW_SIZE};
