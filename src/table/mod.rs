//! Table layer - row formats and the typed table facade.

mod record;
#[allow(clippy::module_inception)]
mod table;

pub use record::{CatalogRow, Record, UserRow, COLUMN_LONG_SIZE, COLUMN_SHORT_SIZE, ROW_SIZE};
pub use table::{Rows, Table};
