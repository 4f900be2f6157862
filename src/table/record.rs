//! Row types and their fixed-width wire format.
//!
//! Every row kind packs into exactly [`ROW_SIZE`] bytes:
//! ```text
//! ┌──────────┬──────────────────────┬───────────────────────────────┐
//! │ u32 (4)  │ short string (33)    │ long string (256)             │
//! └──────────┴──────────────────────┴───────────────────────────────┘
//! offset 0   4                      37                              293
//! ```
//! Strings are NUL-padded, not length-prefixed; one byte of each area is
//! reserved so a full-length string still ends in NUL.

use std::fmt;

use crate::common::{Error, Result};
use crate::storage::page::{read_u32, write_u32};

/// Longest accepted short string (username, table name).
pub const COLUMN_SHORT_SIZE: usize = 32;
/// Longest accepted long string (email, table sql).
pub const COLUMN_LONG_SIZE: usize = 255;

const NUMBER_SIZE: usize = 4;
const SHORT_SIZE: usize = COLUMN_SHORT_SIZE + 1;
const LONG_SIZE: usize = COLUMN_LONG_SIZE + 1;

const NUMBER_OFFSET: usize = 0;
const SHORT_OFFSET: usize = NUMBER_OFFSET + NUMBER_SIZE;
const LONG_OFFSET: usize = SHORT_OFFSET + SHORT_SIZE;

/// Serialized size of every row kind.
pub const ROW_SIZE: usize = NUMBER_SIZE + SHORT_SIZE + LONG_SIZE;

/// A row that can be stored as a B-tree value.
pub trait Record: Sized + fmt::Display {
    /// Exact serialized size in bytes.
    const SIZE: usize;

    /// Write the row into `dest`, which is exactly `SIZE` bytes.
    fn serialize(&self, dest: &mut [u8]);

    /// Read a row back from `SIZE` bytes.
    fn deserialize(src: &[u8]) -> Self;
}

/// Check a string fits a fixed-width area of `capacity` usable bytes.
fn check_len(value: &str, capacity: usize) -> Result<()> {
    if value.len() > capacity {
        return Err(Error::StringTooLong);
    }
    Ok(())
}

fn write_fixed_str(dest: &mut [u8], value: &str) {
    dest.fill(0);
    dest[..value.len()].copy_from_slice(value.as_bytes());
}

fn read_fixed_str(src: &[u8]) -> String {
    let end = src.iter().position(|&b| b == 0).unwrap_or(src.len());
    String::from_utf8_lossy(&src[..end]).into_owned()
}

/// Encode a `(number, short, long)` triple; the layout shared by both rows.
fn serialize_triple(dest: &mut [u8], number: u32, short: &str, long: &str) {
    write_u32(dest, NUMBER_OFFSET, number);
    write_fixed_str(&mut dest[SHORT_OFFSET..LONG_OFFSET], short);
    write_fixed_str(&mut dest[LONG_OFFSET..ROW_SIZE], long);
}

fn deserialize_triple(src: &[u8]) -> (u32, String, String) {
    (
        read_u32(src, NUMBER_OFFSET),
        read_fixed_str(&src[SHORT_OFFSET..LONG_OFFSET]),
        read_fixed_str(&src[LONG_OFFSET..ROW_SIZE]),
    )
}

// ============================================================================
// User rows
// ============================================================================

/// A user account row, keyed by `id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRow {
    pub id: u32,
    username: String,
    email: String,
}

impl UserRow {
    /// # Errors
    /// Returns `Error::StringTooLong` if `username` exceeds 32 bytes or
    /// `email` exceeds 255 bytes.
    pub fn new(id: u32, username: &str, email: &str) -> Result<Self> {
        check_len(username, COLUMN_SHORT_SIZE)?;
        check_len(email, COLUMN_LONG_SIZE)?;
        Ok(Self {
            id,
            username: username.to_string(),
            email: email.to_string(),
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

impl Record for UserRow {
    const SIZE: usize = ROW_SIZE;

    fn serialize(&self, dest: &mut [u8]) {
        serialize_triple(dest, self.id, &self.username, &self.email);
    }

    fn deserialize(src: &[u8]) -> Self {
        let (id, username, email) = deserialize_triple(src);
        Self {
            id,
            username,
            email,
        }
    }
}

impl fmt::Display for UserRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.id, self.username, self.email)
    }
}

// ============================================================================
// Catalog rows
// ============================================================================

/// A catalog entry describing a table created with `create table`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRow {
    /// Highest page in use when the table was registered.
    pub rootpage: u32,
    name: String,
    sql: String,
}

impl CatalogRow {
    /// # Errors
    /// Returns `Error::StringTooLong` if `name` exceeds 32 bytes or `sql`
    /// exceeds 255 bytes.
    pub fn new(rootpage: u32, name: &str, sql: &str) -> Result<Self> {
        check_len(name, COLUMN_SHORT_SIZE)?;
        check_len(sql, COLUMN_LONG_SIZE)?;
        Ok(Self {
            rootpage,
            name: name.to_string(),
            sql: sql.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }
}

impl Record for CatalogRow {
    const SIZE: usize = ROW_SIZE;

    fn serialize(&self, dest: &mut [u8]) {
        serialize_triple(dest, self.rootpage, &self.name, &self.sql);
    }

    fn deserialize(src: &[u8]) -> Self {
        let (rootpage, name, sql) = deserialize_triple(src);
        Self {
            rootpage,
            name,
            sql,
        }
    }
}

impl fmt::Display for CatalogRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.rootpage, self.name, self.sql)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_size() {
        assert_eq!(ROW_SIZE, 293);
        assert_eq!(SHORT_OFFSET, 4);
        assert_eq!(LONG_OFFSET, 37);
    }

    #[test]
    fn test_user_row_wire_format() {
        let row = UserRow::new(7, "bob", "bob@example.com").unwrap();
        let mut buf = [0xAAu8; ROW_SIZE];
        row.serialize(&mut buf);

        assert_eq!(&buf[0..4], &[7, 0, 0, 0]);
        assert_eq!(&buf[4..7], b"bob");
        assert!(buf[7..37].iter().all(|&b| b == 0));
        assert_eq!(&buf[37..52], b"bob@example.com");
        assert!(buf[52..].iter().all(|&b| b == 0));

        assert_eq!(UserRow::deserialize(&buf), row);
    }

    #[test]
    fn test_strings_at_capacity_are_kept_whole() {
        let username = "a".repeat(COLUMN_SHORT_SIZE);
        let email = "b".repeat(COLUMN_LONG_SIZE);
        let row = UserRow::new(1, &username, &email).unwrap();

        let mut buf = [0u8; ROW_SIZE];
        row.serialize(&mut buf);
        let back = UserRow::deserialize(&buf);
        assert_eq!(back.username(), username);
        assert_eq!(back.email(), email);
    }

    #[test]
    fn test_strings_over_capacity_are_rejected() {
        let long_name = "a".repeat(COLUMN_SHORT_SIZE + 1);
        let long_email = "b".repeat(COLUMN_LONG_SIZE + 1);

        assert!(matches!(UserRow::new(1, &long_name, "x"), Err(Error::StringTooLong)));
        assert!(matches!(UserRow::new(1, "x", &long_email), Err(Error::StringTooLong)));
        assert!(matches!(
            CatalogRow::new(1, &long_name, "x"),
            Err(Error::StringTooLong)
        ));
    }

    #[test]
    fn test_display() {
        let user = UserRow::new(1, "user1", "person1@example.com").unwrap();
        assert_eq!(user.to_string(), "(1, user1, person1@example.com)");

        let sql = "create table t1(id INT, val STRING);";
        let entry = CatalogRow::new(0, "t1", sql).unwrap();
        assert_eq!(entry.to_string(), format!("(0, t1, {})", sql));
    }

    #[test]
    fn test_catalog_row_round_trip() {
        let entry = CatalogRow::new(3, "accounts", "create table accounts(id INT);").unwrap();
        let mut buf = [0u8; ROW_SIZE];
        entry.serialize(&mut buf);
        assert_eq!(CatalogRow::deserialize(&buf), entry);
    }
}
