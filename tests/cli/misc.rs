use crate::cli::support::{qnote, qnote_in};
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

// ============================================================================
// Help, version and global flag tests
// ============================================================================

#[test]
fn test_help_flag() {
    qnote()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: qnote"))
        .stdout(predicate::str::contains("export"))
        .stdout(predicate::str::contains("import"))
        .stdout(predicate::str::contains("search"));
}

#[test]
fn test_no_command_prints_version() {
    let dir = tempdir().unwrap();
    qnote_in(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_unknown_subcommand_json_envelope() {
    qnote()
        .args(["--format", "json", "bogus"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("\"type\":\"usage_error\""));
}

#[test]
fn test_unknown_format_rejected() {
    qnote()
        .args(["--format", "xml", "search", "x"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown format"));
}

#[test]
fn test_data_dir_that_is_a_file() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("not-a-dir");
    fs::write(&file, "x").unwrap();

    qnote_in(dir.path())
        .arg("--data-dir")
        .arg(&file)
        .args(["search", "anything"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("invalid data directory"));
}

#[test]
fn test_data_dir_error_as_json() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("not-a-dir");
    fs::write(&file, "x").unwrap();

    qnote_in(dir.path())
        .arg("--data-dir")
        .arg(&file)
        .args(["--format", "json", "search", "anything"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("\"type\":\"invalid_data_dir\""));
}

#[test]
fn test_log_level_debug_shows_phases() {
    let dir = tempdir().unwrap();
    qnote_in(dir.path())
        .args(["--log-level", "debug", "search", "x"])
        .assert()
        .success()
        .stderr(predicate::str::contains("parse_args"))
        .stderr(predicate::str::contains("open_database"));
}

#[test]
fn test_default_log_level_is_quiet() {
    let dir = tempdir().unwrap();
    qnote_in(dir.path())
        .args(["search", "x"])
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}

#[test]
fn test_config_default_book_is_used() {
    let dir = tempdir().unwrap();
    let config_dir = dir.path().join("config");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("config.toml"), "default_book = \"Inbox\"\n").unwrap();

    qnote_in(dir.path())
        .args(["new", "json", r#"[{"title":"Loose","type":"basic"}]"#])
        .assert()
        .success()
        .stdout(predicate::str::contains("Book: Inbox"));
}

#[test]
fn test_invalid_config_is_reported() {
    let dir = tempdir().unwrap();
    let config_dir = dir.path().join("config");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("config.toml"), "[import]\nworkers = 0\n").unwrap();

    qnote_in(dir.path())
        .args(["search", "x"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("import.workers"));
}
