//! Meta-commands: input lines starting with `.`.

use crate::common::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaCommand {
    /// Flush, close and leave.
    Exit,
    /// Print the tree structure.
    BTree,
    /// Print the layout constants.
    Constants,
}

/// Parse a meta-command line.
///
/// # Errors
/// Returns `Error::UnrecognizedCommand` for anything else.
pub fn parse_meta(input: &str) -> Result<MetaCommand> {
    match input.trim() {
        ".exit" => Ok(MetaCommand::Exit),
        ".btree" => Ok(MetaCommand::BTree),
        ".constants" => Ok(MetaCommand::Constants),
        other => Err(Error::UnrecognizedCommand(other.to_string())),
    }
}
