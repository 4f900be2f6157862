//! Error types for pagedb.

use thiserror::Error;

use crate::common::PageId;

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors in pagedb.
///
/// Errors come in two classes. User errors (bad input, duplicate keys) leave
/// the table untouched and the shell keeps going. Fatal errors mean a storage
/// invariant broke; there is no log to roll back to, so the caller must stop
/// without flushing. [`Error::is_fatal`] tells them apart.
#[derive(Debug, Error)]
pub enum Error {
    // ------------------------------------------------------------------
    // User errors
    // ------------------------------------------------------------------
    /// Statement had the right keyword but malformed arguments.
    #[error("Syntax error. Could not parse statement.")]
    Syntax,

    /// A `create table` column list that could not be parsed.
    #[error("syntax error, {0}")]
    Schema(String),

    /// Input did not start with a known statement keyword.
    #[error("Unrecognized keyword at start of '{0}'.")]
    UnrecognizedStatement(String),

    /// Input started with `.` but named no known meta-command.
    #[error("Unrecognized command '{0}'.")]
    UnrecognizedCommand(String),

    /// A string field is longer than its fixed-width column.
    #[error("String is too long.")]
    StringTooLong,

    /// The id of an `insert` was negative.
    #[error("ID must be positive.")]
    NegativeId,

    /// The key is already present in the table.
    #[error("Error: Duplicate key.")]
    DuplicateKey(u32),

    /// The statement kind is not stored by the open table.
    #[error("Error: '{0}' is not supported by this table.")]
    UnsupportedStatement(&'static str),

    /// Invalid storage settings.
    #[error("invalid configuration: {0}")]
    Config(String),

    // ------------------------------------------------------------------
    // Fatal errors
    // ------------------------------------------------------------------
    /// I/O error from disk operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file length is not a whole number of pages.
    #[error("Db file is not a whole number of pages. Corrupt file. (length {length})")]
    CorruptFile { length: u64 },

    /// A page number beyond the configured bound was requested.
    #[error("Tried to fetch page number out of bounds. {page} >= {max}")]
    PageOutOfBounds { page: u32, max: u32 },

    /// A node type byte that is neither leaf nor internal.
    #[error("Corrupt node on {page}: unknown node type {tag}")]
    CorruptNode { page: PageId, tag: u8 },

    /// An internal node was asked for a child it does not have.
    #[error("Tried to access child {index} of node with {num_keys} keys")]
    InvalidChild { index: usize, num_keys: usize },

    /// A child slot holds the invalid-page sentinel.
    #[error("Tried to access child {index} of node, but was invalid page")]
    InvalidPage { index: usize },

    /// Flush was requested for a page that was never loaded.
    #[error("Tried to flush null page {0}")]
    FlushUncachedPage(PageId),
}

impl Error {
    /// Whether this error signals a broken storage invariant.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::Io(_)
                | Error::CorruptFile { .. }
                | Error::PageOutOfBounds { .. }
                | Error::CorruptNode { .. }
                | Error::InvalidChild { .. }
                | Error::InvalidPage { .. }
                | Error::FlushUncachedPage(_)
        )
    }
}
