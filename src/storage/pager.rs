//! Pager - the page cache in front of the database file.
//!
//! The [`Pager`] handles all direct file operations:
//! - Lazily loading pages on first access
//! - Handing out fresh page numbers
//! - Writing cached pages back when the database is closed

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use tracing::{debug, info};

use crate::common::config::PAGE_SIZE;
use crate::common::{Error, PageId, Result};
use crate::storage::page::Page;
use crate::storage::stats::PagerStats;

/// Owns the database file and a cache of its pages.
///
/// # File Layout
/// The database is stored as a single file with pages laid out sequentially:
/// ```text
/// ┌─────────┬─────────┬─────────┬─────────┬─────────┐
/// │ Page 0  │ Page 1  │ Page 2  │  ...    │ Page N  │
/// │ (4KB)   │ (4KB)   │ (4KB)   │         │ (4KB)   │
/// └─────────┴─────────┴─────────┴─────────┴─────────┘
/// Offset:  0      4096     8192    ...    N×4096
/// ```
///
/// # Cache
/// One slot per page number, `None` until the page is first touched. The
/// slot vector grows on demand up to the highest page touched, so a large
/// `max_pages` costs nothing until the pages exist. There is no eviction: a
/// slot, once filled, stays until [`Pager::close`].
///
/// # Durability
/// Nothing is written until [`Pager::close`], which writes every cached page
/// and calls `fsync()` once.
pub struct Pager {
    file: File,
    /// Pages present in the file when it was opened (or last closed).
    file_pages: u32,
    /// One past the highest page number touched so far.
    num_pages: u32,
    /// Page numbers must stay below this bound.
    max_pages: u32,
    pages: Vec<Option<Box<Page>>>,
    stats: PagerStats,
}

impl Pager {
    /// Open a database file, creating it if it doesn't exist.
    ///
    /// # Errors
    /// - `Error::CorruptFile` if the file length is not a whole number of pages
    /// - `Error::Io` if the file cannot be opened
    pub fn open<P: AsRef<Path>>(path: P, max_pages: u32) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        let length = file.metadata()?.len();
        if length % PAGE_SIZE as u64 != 0 {
            return Err(Error::CorruptFile { length });
        }
        let file_pages = (length / PAGE_SIZE as u64) as u32;

        info!(
            path = %path.as_ref().display(),
            pages = file_pages,
            max_pages,
            "opened database file"
        );

        Ok(Self {
            file,
            file_pages,
            num_pages: file_pages,
            max_pages,
            pages: Vec::new(),
            stats: PagerStats::new(),
        })
    }

    /// Get a page, loading it on first access.
    ///
    /// Pages inside the file are read from `page_id × PAGE_SIZE`. Pages past
    /// the end of the file come back zeroed; they reach the disk on close.
    ///
    /// # Errors
    /// - `Error::PageOutOfBounds` if `page_id` is not below `max_pages`
    /// - `Error::Io` if the read fails
    pub fn get_page(&mut self, page_id: PageId) -> Result<&mut Page> {
        self.check_bounds(page_id)?;

        if page_id.0 >= self.num_pages {
            self.num_pages = page_id.0 + 1;
        }

        let on_disk = page_id.0 < self.file_pages;
        let Self {
            file, pages, stats, ..
        } = self;
        if pages.len() <= page_id.index() {
            pages.resize_with(page_id.index() + 1, || None);
        }
        let slot = &mut pages[page_id.index()];

        if slot.is_some() {
            stats.cache_hits += 1;
        } else {
            stats.cache_misses += 1;
            let mut page = Page::boxed();
            if on_disk {
                file.seek(SeekFrom::Start(page_id.offset()))?;
                file.read_exact(page.as_mut_slice())?;
                stats.pages_read += 1;
                debug!(page = page_id.0, "loaded page from disk");
            }
            *slot = Some(page);
        }

        Ok(&mut **slot.get_or_insert_with(Page::boxed))
    }

    /// Hand out the next unused page number, zeroed and cached.
    ///
    /// Page numbers are never recycled, so this is always the current
    /// page count.
    ///
    /// # Errors
    /// Returns `Error::PageOutOfBounds` once the page bound is reached.
    pub fn allocate_page(&mut self) -> Result<PageId> {
        let page_id = PageId::new(self.num_pages);
        self.get_page(page_id)?.reset();
        self.stats.pages_allocated += 1;
        debug!(page = page_id.0, "allocated page");
        Ok(page_id)
    }

    /// Overwrite page `dst` with the contents of page `src`.
    pub fn copy_page(&mut self, src: PageId, dst: PageId) -> Result<()> {
        let mut scratch = Page::boxed();
        scratch.copy_from(self.get_page(src)?);
        self.get_page(dst)?.copy_from(&scratch);
        Ok(())
    }

    /// Write one cached page to its place in the file.
    ///
    /// # Errors
    /// - `Error::FlushUncachedPage` if the page was never loaded
    /// - `Error::Io` if the seek or write fails
    pub fn flush(&mut self, page_id: PageId) -> Result<()> {
        let page = self
            .pages
            .get(page_id.index())
            .and_then(|slot| slot.as_deref())
            .ok_or(Error::FlushUncachedPage(page_id))?;

        self.file.seek(SeekFrom::Start(page_id.offset()))?;
        self.file.write_all(page.as_slice())?;
        self.stats.pages_written += 1;

        debug!(page = page_id.0, "flushed page");
        Ok(())
    }

    /// Flush every cached page and close the file.
    pub fn close(mut self) -> Result<()> {
        for page_num in 0..self.num_pages {
            let page_id = PageId::new(page_num);
            if self.is_cached(page_id) {
                self.flush(page_id)?;
            }
        }
        self.file.sync_all()?;

        info!(
            pages = self.num_pages,
            stats = %self.stats.snapshot(),
            "closed database file"
        );
        Ok(())
    }

    /// Whether a page currently sits in the cache.
    pub fn is_cached(&self, page_id: PageId) -> bool {
        matches!(self.pages.get(page_id.index()), Some(Some(_)))
    }

    /// One past the highest page number in use.
    #[inline]
    pub fn num_pages(&self) -> u32 {
        self.num_pages
    }

    /// Get pager statistics.
    pub fn stats(&self) -> &PagerStats {
        &self.stats
    }

    fn check_bounds(&self, page_id: PageId) -> Result<()> {
        if page_id.0 >= self.max_pages {
            return Err(Error::PageOutOfBounds {
                page: page_id.0,
                max: self.max_pages,
            });
        }
        Ok(())
    }
}
