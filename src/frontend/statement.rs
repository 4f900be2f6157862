//! Statement parsing: `insert`, `select` and `create table`.

use crate::common::{Error, Result};
use crate::table::UserRow;

/// A parsed statement, ready to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Insert(UserRow),
    Select,
    CreateTable(CreateTable),
}

impl Statement {
    /// Keyword used in messages about this statement.
    pub fn keyword(&self) -> &'static str {
        match self {
            Statement::Insert(_) => "insert",
            Statement::Select => "select",
            Statement::CreateTable(_) => "create table",
        }
    }
}

/// A `create table <name>(<col> <type>, ...)` statement.
///
/// Column definitions are checked while parsing but only the raw text is
/// kept; the catalog stores the statement verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTable {
    pub name: String,
    /// The full statement text, as stored in the catalog.
    pub sql: String,
}

/// Column types accepted by `create table`.
const COLUMN_TYPES: [&str; 2] = ["INT", "STRING"];

const CREATE_TABLE_USAGE: &str = "create table tableName(col1 type1, col2 type2...);";

/// Parse one input line into a statement.
///
/// # Errors
/// - `Error::UnrecognizedStatement` if the first word is not a statement keyword
/// - `Error::Syntax`, `Error::NegativeId`, `Error::StringTooLong` for a bad `insert`
/// - `Error::Schema` for a bad `create table`
pub fn prepare(input: &str) -> Result<Statement> {
    let input = input.trim();
    match input.split_whitespace().next() {
        Some("insert") => prepare_insert(input),
        Some("create") => prepare_create_table(input).map(Statement::CreateTable),
        Some("select") if input == "select" => Ok(Statement::Select),
        _ => Err(Error::UnrecognizedStatement(input.to_string())),
    }
}

fn prepare_insert(input: &str) -> Result<Statement> {
    let args: Vec<&str> = input.split_whitespace().collect();
    let ["insert", id, username, email] = args[..] else {
        return Err(Error::Syntax);
    };

    let id: i64 = id.parse().map_err(|_| Error::Syntax)?;
    if id < 0 {
        return Err(Error::NegativeId);
    }
    let id = u32::try_from(id).map_err(|_| Error::Syntax)?;

    Ok(Statement::Insert(UserRow::new(id, username, email)?))
}

fn prepare_create_table(input: &str) -> Result<CreateTable> {
    let usage = || Error::Schema(CREATE_TABLE_USAGE.to_string());

    let rest = input.strip_prefix("create").ok_or_else(usage)?;
    let rest = strip_keyword(rest, "table").ok_or_else(usage)?;

    let name_end = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(rest.len());
    let (name, rest) = rest.split_at(name_end);
    if name.is_empty() {
        return Err(usage());
    }

    let body = rest.trim_start().strip_prefix('(').ok_or_else(usage)?;
    let close = body.rfind(')').ok_or_else(usage)?;
    let trailer = body[close + 1..].trim();
    if !(trailer.is_empty() || trailer == ";") {
        return Err(usage());
    }

    body[..close].split(',').try_for_each(check_column)?;

    Ok(CreateTable {
        name: name.to_string(),
        sql: input.to_string(),
    })
}

/// Strip leading whitespace followed by `keyword` and at least one more
/// whitespace character.
fn strip_keyword<'a>(input: &'a str, keyword: &str) -> Option<&'a str> {
    let trimmed = input.trim_start();
    if trimmed.len() == input.len() {
        return None;
    }
    let rest = trimmed.strip_prefix(keyword)?;
    let after = rest.trim_start();
    (after.len() < rest.len()).then_some(after)
}

/// A column definition is exactly `<name> <type>`.
fn check_column(column: &str) -> Result<()> {
    let parts: Vec<&str> = column.split_whitespace().collect();
    let [_, ty] = parts[..] else {
        return Err(Error::Schema(format!(
            "column definition '{}' must be '<name> <type>'",
            column.trim()
        )));
    };

    if !COLUMN_TYPES.contains(&ty) {
        return Err(Error::Schema(format!("unsupported column type '{}'", ty)));
    }
    Ok(())
}
