//! Shell transcripts and persistence across sessions.

use pagedb::{Error, Outcome, Session, StorageConfig, Table, TableKind, UserRow, PAGE_SIZE};
use std::path::Path;
use tempfile::tempdir;

/// Feed lines to a session the way the shell does, stopping at `.exit`.
/// Closes the session afterwards and returns everything it printed.
fn run_session(path: &Path, kind: TableKind, lines: &[String]) -> String {
    let mut session = Session::open(path, kind, &StorageConfig::default()).unwrap();
    let mut out = Vec::new();
    for line in lines {
        if session.execute_line(line, &mut out).unwrap() == Outcome::Exit {
            break;
        }
    }
    session.close().unwrap();
    String::from_utf8(out).unwrap()
}

fn lines(input: &[&str]) -> Vec<String> {
    input.iter().map(|s| s.to_string()).collect()
}

// ============================================================================
// Catalog transcripts
// ============================================================================

#[test]
fn test_creates_and_retrieves_a_row() {
    let dir = tempdir().unwrap();
    let output = run_session(
        &dir.path().join("test.db"),
        TableKind::Catalog,
        &lines(&["create table t1(id INT, val STRING);", "select", ".exit"]),
    );

    assert_eq!(
        output,
        "Executed.\n(0, t1, create table t1(id INT, val STRING);)\nExecuted.\n"
    );
}

#[test]
fn test_keeps_data_after_closing_connection() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test.db");

    let first = run_session(
        &path,
        TableKind::Catalog,
        &lines(&["create table t1(id INT, val STRING);", ".exit"]),
    );
    assert_eq!(first, "Executed.\n");

    let second = run_session(&path, TableKind::Catalog, &lines(&["select", ".exit"]));
    assert_eq!(
        second,
        "(0, t1, create table t1(id INT, val STRING);)\nExecuted.\n"
    );
}

#[test]
fn test_prints_one_node_btree() {
    let dir = tempdir().unwrap();
    let output = run_session(
        &dir.path().join("test.db"),
        TableKind::Catalog,
        &lines(&[
            "create table t1(col1 INT);",
            "create table t3(col3 INT);",
            "create table t2(col2 INT);",
            ".btree",
            ".exit",
        ]),
    );

    assert_eq!(
        output,
        "Executed.\nExecuted.\nExecuted.\nTree:\n- leaf (size 3)\n  - 1\n  - 2\n  - 3\n"
    );
}

#[test]
fn test_prints_three_leaf_node_btree() {
    let dir = tempdir().unwrap();
    let mut input: Vec<String> = (1..=14)
        .map(|i| format!("create table t{}(col{} INT);", i, i))
        .collect();
    input.push(".btree".to_string());
    input.push(".exit".to_string());

    let output = run_session(&dir.path().join("test.db"), TableKind::Catalog, &input);

    let mut expected = "Executed.\n".repeat(14);
    expected.push_str("Tree:\n- internal (size 1)\n  - leaf (size 7)\n");
    for key in 1..=7 {
        expected.push_str(&format!("    - {}\n", key));
    }
    expected.push_str("  - key 7\n  - leaf (size 7)\n");
    for key in 8..=14 {
        expected.push_str(&format!("    - {}\n", key));
    }
    assert_eq!(output, expected);
}

#[test]
fn test_catalog_fills_up_fatally() {
    let dir = tempdir().unwrap();
    let mut session =
        Session::open(dir.path().join("test.db"), TableKind::Catalog, &StorageConfig::default())
            .unwrap();

    let mut out = Vec::new();
    let mut fatal = None;
    for i in 0..1401 {
        let line = format!("create table t{}(id INT, val STRING);", i);
        if let Err(err) = session.execute_line(&line, &mut out) {
            fatal = Some(err);
            break;
        }
    }

    let err = fatal.expect("catalog never filled up");
    assert!(err.is_fatal());
    assert_eq!(
        err.to_string(),
        "Tried to fetch page number out of bounds. 100 >= 100"
    );
}

// ============================================================================
// User table transcripts
// ============================================================================

#[test]
fn test_prints_constants() {
    let dir = tempdir().unwrap();
    let output = run_session(
        &dir.path().join("test.db"),
        TableKind::Users,
        &lines(&[".constants", ".exit"]),
    );

    assert_eq!(
        output,
        "Constants:\n\
         ROW_SIZE: 293\n\
         COMMON_NODE_HEADER_SIZE: 6\n\
         LEAF_NODE_HEADER_SIZE: 14\n\
         LEAF_NODE_CELL_SIZE: 297\n\
         LEAF_NODE_SPACE_FOR_CELLS: 4082\n\
         LEAF_NODE_MAX_CELLS: 13\n"
    );
}

#[test]
fn test_meta_command_error() {
    let dir = tempdir().unwrap();
    let output = run_session(
        &dir.path().join("test.db"),
        TableKind::Users,
        &lines(&[".invalid_command", ".exit"]),
    );
    assert_eq!(output, "Unrecognized command '.invalid_command'.\n");
}

#[test]
fn test_maximum_length_strings() {
    let dir = tempdir().unwrap();
    let username = "a".repeat(32);
    let email = "a".repeat(255);
    let output = run_session(
        &dir.path().join("test.db"),
        TableKind::Users,
        &[
            format!("insert 1 {} {}", username, email),
            "select".to_string(),
            ".exit".to_string(),
        ],
    );
    assert_eq!(
        output,
        format!("Executed.\n(1, {}, {})\nExecuted.\n", username, email)
    );
}

#[test]
fn test_too_long_strings_and_negative_id() {
    let dir = tempdir().unwrap();
    let output = run_session(
        &dir.path().join("test.db"),
        TableKind::Users,
        &[
            format!("insert 1 {} a@b.c", "a".repeat(33)),
            format!("insert 1 a {}", "a".repeat(256)),
            "insert -1 cstack foo@bar.com".to_string(),
            "select".to_string(),
            ".exit".to_string(),
        ],
    );
    assert_eq!(
        output,
        "String is too long.\nString is too long.\nID must be positive.\nExecuted.\n"
    );
}

#[test]
fn test_duplicate_id_message() {
    let dir = tempdir().unwrap();
    let output = run_session(
        &dir.path().join("test.db"),
        TableKind::Users,
        &lines(&[
            "insert 1 user1 person1@example.com",
            "insert 1 user1 person1@example.com",
            "select",
            ".exit",
        ]),
    );
    assert_eq!(
        output,
        "Executed.\nError: Duplicate key.\n(1, user1, person1@example.com)\nExecuted.\n"
    );
}

#[test]
fn test_statement_not_supported_by_users() {
    let dir = tempdir().unwrap();
    let output = run_session(
        &dir.path().join("test.db"),
        TableKind::Users,
        &lines(&["create table t1(id INT);", ".exit"]),
    );
    assert_eq!(output, "Error: 'create table' is not supported by this table.\n");
}

// ============================================================================
// Persistence
// ============================================================================

#[test]
fn test_reopen_after_splits() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test.db");
    let config = StorageConfig::default()
        .with_leaf_max_cells(4)
        .with_internal_max_keys(3);

    let rows: Vec<UserRow> = (0..120)
        .map(|i| (i * 53) % 120)
        .map(|id| UserRow::new(id, &format!("u{}", id), &format!("u{}@x.org", id)).unwrap())
        .collect();

    let (before, tree_before, pages) = {
        let mut table = Table::<UserRow>::open(&path, &config).unwrap();
        for row in &rows {
            table.insert_row(row).unwrap();
        }
        let before: Vec<UserRow> = table.select().map(|r| r.unwrap()).collect();
        let tree = table.render_tree().unwrap();
        let pages = table.num_pages();
        table.close().unwrap();
        (before, tree, pages)
    };

    assert_eq!(
        std::fs::metadata(&path).unwrap().len(),
        pages as u64 * PAGE_SIZE as u64
    );

    let mut table = Table::<UserRow>::open(&path, &config).unwrap();
    let after: Vec<UserRow> = table.select().map(|r| r.unwrap()).collect();
    assert_eq!(after, before);
    assert_eq!(after.len(), 120);
    assert_eq!(table.render_tree().unwrap(), tree_before);

    // The reopened tree keeps accepting inserts.
    table
        .insert_row(&UserRow::new(500, "late", "late@x.org").unwrap())
        .unwrap();
    assert!(matches!(
        table.insert_row(&UserRow::new(5, "dup", "dup@x.org").unwrap()),
        Err(Error::DuplicateKey(5))
    ));
    assert_eq!(table.len().unwrap(), 121);
}

#[test]
fn test_corrupt_file_length_is_fatal() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test.db");
    std::fs::write(&path, vec![0u8; PAGE_SIZE + 1]).unwrap();

    match Session::open(&path, TableKind::Users, &StorageConfig::default()) {
        Err(err) => assert!(err.is_fatal()),
        Ok(_) => panic!("expected a corrupt file error"),
    }
}
