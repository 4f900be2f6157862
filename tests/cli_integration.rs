//! The `pagedb` binary driven over piped stdin.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use pagedb::PAGE_SIZE;
use tempfile::tempdir;

/// Run the shell on `path` with `args`, feeding it `input` and closing stdin.
fn run_shell(path: &Path, args: &[&str], input: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_pagedb"))
        .arg(path)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    // The shell may exit before reading everything; a broken pipe is fine.
    let mut stdin = child.stdin.take().unwrap();
    let _ = stdin.write_all(input.as_bytes());
    drop(stdin);
    child.wait_with_output().unwrap()
}

fn stdout(output: &Output) -> &str {
    std::str::from_utf8(&output.stdout).unwrap()
}

fn file_len(path: &Path) -> u64 {
    std::fs::metadata(path).unwrap().len()
}

const SMALL: [&str; 4] = ["--max-pages", "3", "--leaf-max-cells", "2"];

// ============================================================================
// Normal exit
// ============================================================================

#[test]
fn test_exit_command_flushes_and_succeeds() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test.db");

    let output = run_shell(&path, &[], "insert 1 user1 person1@example.com\nselect\n.exit\n");

    assert!(output.status.success());
    assert_eq!(
        stdout(&output),
        "db > Executed.\ndb > (1, user1, person1@example.com)\nExecuted.\ndb > "
    );
    assert_eq!(file_len(&path), PAGE_SIZE as u64);
}

#[test]
fn test_end_of_input_flushes_and_succeeds() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test.db");

    let first = run_shell(&path, &[], "insert 1 a b\ninsert 2 c d\n");
    assert!(first.status.success());
    assert_eq!(stdout(&first), "db > Executed.\ndb > Executed.\ndb > ");

    let second = run_shell(&path, &[], "select\n");
    assert!(second.status.success());
    assert_eq!(
        stdout(&second),
        "db > (1, a, b)\n(2, c, d)\nExecuted.\ndb > "
    );
}

#[test]
fn test_user_errors_keep_the_shell_running() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test.db");

    let output = run_shell(&path, &[], "insertx 1 a b\n.foo\n\ninsert -1 a b\n.exit\n");

    assert!(output.status.success());
    assert_eq!(
        stdout(&output),
        "db > Unrecognized keyword at start of 'insertx 1 a b'.\n\
         db > Unrecognized command '.foo'.\n\
         db > db > ID must be positive.\n\
         db > "
    );
}

// ============================================================================
// Fatal exit
// ============================================================================

#[test]
fn test_fatal_error_exits_without_writing() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test.db");

    let first = run_shell(&path, &SMALL, "insert 1 a b\ninsert 2 c d\n.exit\n");
    assert!(first.status.success());
    assert_eq!(stdout(&first), "db > Executed.\ndb > Executed.\ndb > ");
    assert_eq!(file_len(&path), PAGE_SIZE as u64);

    // Row 3 splits the root leaf into pages 1 and 2. Row 5 splits the right
    // leaf again, which needs page 3.
    let second = run_shell(
        &path,
        &SMALL,
        "insert 3 e f\ninsert 4 g h\ninsert 5 i j\ninsert 6 k l\n.exit\n",
    );
    assert!(!second.status.success());
    let transcript = stdout(&second);
    assert_eq!(
        transcript,
        "db > Executed.\ndb > Executed.\ndb > Tried to fetch page number out of bounds. 3 >= 3\n"
    );
    assert_eq!(file_len(&path), PAGE_SIZE as u64);

    // Nothing from the failed session reached the file.
    let third = run_shell(&path, &SMALL, "select\n.exit\n");
    assert!(third.status.success());
    assert_eq!(stdout(&third), "db > (1, a, b)\n(2, c, d)\nExecuted.\ndb > ");
}

#[test]
fn test_corrupt_file_is_reported_on_stdout() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test.db");
    std::fs::write(&path, vec![0u8; PAGE_SIZE + 1]).unwrap();

    let output = run_shell(&path, &[], ".exit\n");

    assert!(!output.status.success());
    assert_eq!(
        stdout(&output),
        format!(
            "Db file is not a whole number of pages. Corrupt file. (length {})\n",
            PAGE_SIZE + 1
        )
    );
    assert_eq!(file_len(&path), PAGE_SIZE as u64 + 1);
}
