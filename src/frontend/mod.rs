//! Front end - the line-oriented command language.
//!
//! - [`statement`] - `insert`, `select`, `create table`
//! - [`meta`] - `.exit`, `.btree`, `.constants`
//! - [`Session`] - runs lines against an open table

pub mod meta;
mod session;
pub mod statement;

pub use meta::MetaCommand;
pub use session::{Outcome, Session, TableKind};
pub use statement::{prepare, Statement};
