use crate::cli::support::{qnote_in, seed, WORK_NOTES};
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

// ============================================================================
// export / import round trips between isolated data directories
// ============================================================================

#[test]
fn test_export_to_file_then_import_elsewhere() {
    let src = tempdir().unwrap();
    let dst = tempdir().unwrap();
    seed(src.path(), WORK_NOTES);
    let file = src.path().join("backup.qnot");

    qnote_in(src.path())
        .args(["export", "-o"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 3 notes (2 books, 2 tags)"));

    let bytes = fs::read(&file).unwrap();
    assert_eq!(&bytes[..4], b"QNOT");

    qnote_in(dst.path())
        .arg("import")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Version: 1"))
        .stdout(predicate::str::contains("Created: "))
        .stdout(predicate::str::contains("Saved Note: <Note ID:"))
        .stdout(predicate::str::contains("Title: Standup notes Book: Work Tags: urgent, team"))
        .stdout(predicate::str::contains("3 notes imported, 0 duplicates skipped"));

    qnote_in(dst.path())
        .args(["search", "went well"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Work\tRetro"));
}

#[test]
fn test_reimport_skips_duplicates_unless_forced() {
    let dir = tempdir().unwrap();
    seed(dir.path(), WORK_NOTES);
    let file = dir.path().join("backup.qnot");

    qnote_in(dir.path())
        .args(["--quiet", "export", "--out-file"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    qnote_in(dir.path())
        .arg("import")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Skipping Dup: <Note ID:"))
        .stdout(predicate::str::contains("0 notes imported, 3 duplicates skipped"));

    qnote_in(dir.path())
        .args(["--format", "json", "import", "--skip-dup-check"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            r#"{"saved":3,"skipped":0,"errors":0}"#,
        ));
}

#[test]
fn test_export_to_stdout_and_import_from_stdin() {
    let src = tempdir().unwrap();
    let dst = tempdir().unwrap();
    seed(src.path(), WORK_NOTES);

    let output = qnote_in(src.path()).arg("export").output().unwrap();
    assert!(output.status.success());
    assert_eq!(&output.stdout[..4], b"QNOT");

    qnote_in(dst.path())
        .args(["--format", "json", "import"])
        .write_stdin(output.stdout)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""saved":3"#));
}

#[test]
fn test_compressed_export_round_trip() {
    let src = tempdir().unwrap();
    let dst = tempdir().unwrap();
    seed(src.path(), WORK_NOTES);
    let file = src.path().join("backup.qnot");

    qnote_in(src.path())
        .args(["export", "-c", "-o"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("backup.qnot.gz"));

    let gz = src.path().join("backup.qnot.gz");
    assert!(!file.exists());
    let bytes = fs::read(&gz).unwrap();
    assert_eq!(&bytes[..2], &[0x1f, 0x8b]);

    // The .gz extension implies --compress
    qnote_in(dst.path())
        .arg("import")
        .arg(&gz)
        .assert()
        .success()
        .stdout(predicate::str::contains("3 notes imported"));
}

#[test]
fn test_compressed_stdin_needs_flag() {
    let src = tempdir().unwrap();
    let dst = tempdir().unwrap();
    seed(src.path(), WORK_NOTES);

    let output = qnote_in(src.path())
        .args(["export", "--compress"])
        .output()
        .unwrap();
    assert_eq!(&output.stdout[..2], &[0x1f, 0x8b]);

    qnote_in(dst.path())
        .arg("import")
        .write_stdin(output.stdout.clone())
        .assert()
        .code(3)
        .stderr(predicate::str::contains("corrupt"));

    qnote_in(dst.path())
        .args(["import", "-c"])
        .write_stdin(output.stdout)
        .assert()
        .success()
        .stdout(predicate::str::contains("3 notes imported"));
}

#[test]
fn test_export_book_moves_only_that_book() {
    let src = tempdir().unwrap();
    let dst = tempdir().unwrap();
    seed(src.path(), WORK_NOTES);
    let file = src.path().join("home.qnot");

    qnote_in(src.path())
        .args(["export", "book", "Home", "-o"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 1 notes (1 books, 0 tags)"));

    qnote_in(dst.path())
        .arg("import")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Groceries"))
        .stdout(predicate::str::contains("Standup").not());
}

#[test]
fn test_export_unknown_book_writes_nothing() {
    let dir = tempdir().unwrap();
    seed(dir.path(), WORK_NOTES);
    let file = dir.path().join("out.qnot");

    qnote_in(dir.path())
        .args(["export", "book", "Work", "Nope", "-o"])
        .arg(&file)
        .assert()
        .code(3)
        .stderr(predicate::str::contains("book not found: Nope"));

    assert!(!file.exists());
}

#[test]
fn test_import_preserve_modified_flag() {
    let src = tempdir().unwrap();
    let dst = tempdir().unwrap();
    seed(src.path(), WORK_NOTES);
    let file = src.path().join("backup.qnot");

    qnote_in(src.path())
        .args(["export", "-o"])
        .arg(&file)
        .assert()
        .success();

    qnote_in(dst.path())
        .args(["import", "-p", "-s"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("3 notes imported"));
}

#[test]
fn test_import_corrupt_stream() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("junk.qnot");
    fs::write(&file, b"NOPE not a notebook").unwrap();

    qnote_in(dir.path())
        .args(["--format", "json", "import"])
        .arg(&file)
        .assert()
        .code(3)
        .stderr(predicate::str::contains("\"type\":\"corrupt_format\""));
}

#[test]
fn test_import_missing_file() {
    let dir = tempdir().unwrap();
    qnote_in(dir.path())
        .args(["import"])
        .arg(dir.path().join("absent.qnot"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("failed to open"));
}

#[test]
fn test_empty_store_exports_header_only() {
    let dir = tempdir().unwrap();
    let output = qnote_in(dir.path()).arg("export").output().unwrap();
    assert!(output.status.success());
    assert_eq!(output.stdout.len(), 16);
}

#[test]
fn test_export_report_as_json() {
    let dir = tempdir().unwrap();
    seed(dir.path(), WORK_NOTES);
    let file = dir.path().join("backup.qnot");

    let output = qnote_in(dir.path())
        .args(["--format", "json", "export", "-o"])
        .arg(&file)
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["notes"], 3);
    assert_eq!(report["books"], 2);
    assert_eq!(report["bytes"], fs::metadata(&file).unwrap().len());
}
