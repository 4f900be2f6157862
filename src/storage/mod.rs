//! Storage layer - disk I/O, page cache and page formats.
//!
//! This module handles persistent storage:
//! - [`Pager`] - File I/O and the page cache
//! - [`page`] - Page buffer and the common node header
//! - [`PagerStats`] - Cache and I/O counters

pub mod page;
mod pager;
mod stats;

pub use pager::Pager;
pub use stats::{PagerStats, StatsSnapshot};
