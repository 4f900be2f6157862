//! Session - executes one input line against an open table.
//!
//! The session owns the table and writes user-visible output to any
//! [`Write`]. User errors are printed and swallowed; fatal errors are
//! returned so the caller can stop without flushing.

use std::fmt;
use std::io::Write;
use std::path::Path;

use tracing::warn;

use crate::common::{Error, Result, StorageConfig};
use crate::table::{CatalogRow, Record, Table, UserRow};

use super::meta::{parse_meta, MetaCommand};
use super::statement::{prepare, Statement};

/// Which row kind a database file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableKind {
    /// `insert` / `select` over user rows.
    #[default]
    Users,
    /// `create table` / `select` over catalog rows.
    Catalog,
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableKind::Users => write!(f, "users"),
            TableKind::Catalog => write!(f, "catalog"),
        }
    }
}

/// What the caller should do after a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Exit,
}

enum Database {
    Users(Table<UserRow>),
    Catalog(Table<CatalogRow>),
}

pub struct Session {
    db: Database,
}

impl Session {
    /// Open the database file as `kind`.
    pub fn open<P: AsRef<Path>>(path: P, kind: TableKind, config: &StorageConfig) -> Result<Self> {
        let db = match kind {
            TableKind::Users => Database::Users(Table::open(path, config)?),
            TableKind::Catalog => Database::Catalog(Table::open(path, config)?),
        };
        Ok(Self { db })
    }

    /// Execute one line, writing its output to `out`.
    ///
    /// Blank lines are ignored. `.exit` returns [`Outcome::Exit`]; the
    /// caller then closes the session.
    ///
    /// # Errors
    /// Only fatal errors are returned. User errors are written to `out`.
    pub fn execute_line<W: Write>(&mut self, line: &str, out: &mut W) -> Result<Outcome> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Outcome::Continue);
        }

        let result = if line.starts_with('.') {
            self.execute_meta(line, out)
        } else {
            self.execute_statement(line, out).map(|()| Outcome::Continue)
        };

        match result {
            Err(err) if !err.is_fatal() => {
                writeln!(out, "{}", err)?;
                Ok(Outcome::Continue)
            }
            other => other,
        }
    }

    fn execute_meta<W: Write>(&mut self, line: &str, out: &mut W) -> Result<Outcome> {
        match parse_meta(line)? {
            MetaCommand::Exit => return Ok(Outcome::Exit),
            MetaCommand::BTree => {
                let tree = match &mut self.db {
                    Database::Users(table) => table.render_tree()?,
                    Database::Catalog(table) => table.render_tree()?,
                };
                write!(out, "Tree:\n{}", tree)?;
            }
            MetaCommand::Constants => {
                let constants = match &self.db {
                    Database::Users(table) => table.constants(),
                    Database::Catalog(table) => table.constants(),
                };
                write!(out, "Constants:\n{}", constants)?;
            }
        }
        Ok(Outcome::Continue)
    }

    fn execute_statement<W: Write>(&mut self, line: &str, out: &mut W) -> Result<()> {
        let statement = prepare(line)?;
        match (&mut self.db, statement) {
            (Database::Users(table), Statement::Insert(row)) => table.insert_row(&row)?,
            (Database::Catalog(table), Statement::CreateTable(create)) => {
                table.create_table(&create.name, &create.sql)?;
            }
            (Database::Users(table), Statement::Select) => print_rows(table, out)?,
            (Database::Catalog(table), Statement::Select) => print_rows(table, out)?,
            (_, statement) => {
                warn!(statement = statement.keyword(), "statement not supported by table kind");
                return Err(Error::UnsupportedStatement(statement.keyword()));
            }
        }
        writeln!(out, "Executed.")?;
        Ok(())
    }

    /// Flush and close the database file.
    pub fn close(self) -> Result<()> {
        match self.db {
            Database::Users(table) => table.close(),
            Database::Catalog(table) => table.close(),
        }
    }
}

fn print_rows<R: Record, W: Write>(table: &mut Table<R>, out: &mut W) -> Result<()> {
    for row in table.select() {
        writeln!(out, "{}", row?)?;
    }
    Ok(())
}
