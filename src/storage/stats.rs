//! Pager statistics tracking.

use std::fmt;

/// Counters kept by the [`Pager`](crate::storage::Pager).
///
/// The pager is single-threaded and every access already takes `&mut self`,
/// so these are plain integers.
///
/// # Example
/// ```
/// use pagedb::storage::PagerStats;
///
/// let mut stats = PagerStats::new();
/// stats.cache_hits += 3;
/// stats.cache_misses += 1;
/// assert_eq!(stats.snapshot().hit_rate(), 0.75);
/// ```
#[derive(Debug, Default)]
pub struct PagerStats {
    /// Number of times a page was already cached.
    pub cache_hits: u64,

    /// Number of times a page slot had to be filled.
    pub cache_misses: u64,

    /// Number of pages read from disk.
    pub pages_read: u64,

    /// Number of pages written to disk.
    pub pages_written: u64,

    /// Number of fresh pages handed out by `allocate_page`.
    pub pages_allocated: u64,
}

impl PagerStats {
    /// Create a new stats tracker with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a snapshot of current statistics.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            cache_hits: self.cache_hits,
            cache_misses: self.cache_misses,
            pages_read: self.pages_read,
            pages_written: self.pages_written,
            pages_allocated: self.pages_allocated,
        }
    }
}

/// A point-in-time copy of pager statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub pages_read: u64,
    pub pages_written: u64,
    pub pages_allocated: u64,
}

impl StatsSnapshot {
    /// Calculate cache hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.cache_hits + self.cache_misses;
        if total == 0 {
            0.0
        } else {
            self.cache_hits as f64 / total as f64
        }
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Stats {{ hits: {}, misses: {}, read: {}, written: {}, allocated: {}, hit_rate: {:.2}% }}",
            self.cache_hits,
            self.cache_misses,
            self.pages_read,
            self.pages_written,
            self.pages_allocated,
            self.hit_rate() * 100.0
        )
    }
}
