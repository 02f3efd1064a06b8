use crate::cli::support::qnote_in;
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn test_new_json_from_argument() {
    let dir = tempdir().unwrap();
    qnote_in(dir.path())
        .args([
            "new",
            "json",
            r#"[{"title":"A","type":"basic","tags":["x"],"body":"b","book":"Personal"},
                {"title":"B","type":"url","body":"https://example.com","book":"Links"}]"#,
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Note added: <Note ID:"))
        .stdout(predicate::str::contains("Title: A Book: Personal Tags: x"))
        .stdout(predicate::str::contains("2 notes added"));
}

#[test]
fn test_new_json_from_stdin() {
    let dir = tempdir().unwrap();
    qnote_in(dir.path())
        .args(["new", "json"])
        .write_stdin(r#"[{"title":"Piped","type":"basic","book":"Work"}]"#)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 notes added"));
}

#[test]
fn test_new_json_bad_type_fails_only_that_note() {
    let dir = tempdir().unwrap();
    qnote_in(dir.path())
        .args([
            "new",
            "json",
            r#"[{"title":"Good","type":"basic"},{"title":"Bad","type":"memo"}]"#,
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 notes added"))
        .stdout(predicate::str::contains("1 notes failed"))
        .stderr(predicate::str::contains("\"Bad\""))
        .stderr(predicate::str::contains("memo"));
}

#[test]
fn test_new_json_summary_as_json() {
    let dir = tempdir().unwrap();
    qnote_in(dir.path())
        .args([
            "--format",
            "json",
            "new",
            "json",
            r#"[{"title":"One","type":"basic"},{"title":"Two","type":"basic"}]"#,
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            r#"{"saved":2,"skipped":0,"errors":0}"#,
        ))
        .stdout(predicate::str::contains("Note added").not());
}

#[test]
fn test_new_json_with_explicit_workers() {
    let dir = tempdir().unwrap();
    qnote_in(dir.path())
        .args([
            "new",
            "json",
            "--workers",
            "1",
            r#"[{"title":"Solo","type":"basic"}]"#,
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 notes added"));
}

#[test]
fn test_new_json_malformed_input() {
    let dir = tempdir().unwrap();
    qnote_in(dir.path())
        .args(["new", "json", r#"[{"title":"#])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("JSON error"));
}

#[test]
fn test_new_json_rejects_non_array() {
    let dir = tempdir().unwrap();
    qnote_in(dir.path())
        .args(["new", "json", r#"{"title":"A","type":"basic"}"#])
        .assert()
        .failure();
}
