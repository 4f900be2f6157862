//! Page types and layout.
//!
//! This module contains:
//! - [`Page`] - The raw 4KB data container
//! - [`NodeHeader`] - Metadata at the start of every node page
//! - [`NodeType`] - Discriminator for the two node formats

mod node_header;
#[allow(clippy::module_inception)]
mod page;

pub use node_header::{NodeHeader, NodeType};
pub use page::{read_u32, write_u32, Page};
