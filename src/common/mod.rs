//! Common types and utilities shared across pagedb.
//!
//! This module contains fundamental primitives used throughout the codebase:
//! - Configuration constants and [`StorageConfig`]
//! - Error types
//! - [`PageId`]

pub mod config;
pub mod error;
mod page_id;

pub use config::StorageConfig;
pub use error::{Error, Result};
pub use page_id::PageId;
