use crate::cli::support::{qnote_in, seed, WORK_NOTES};
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn test_search_finds_created_notes() {
    let dir = tempdir().unwrap();
    seed(dir.path(), WORK_NOTES);

    qnote_in(dir.path())
        .args(["search", "eggs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Home\tGroceries"))
        .stdout(predicate::str::contains("Standup").not());
}

#[test]
fn test_search_matches_tags_and_books() {
    let dir = tempdir().unwrap();
    seed(dir.path(), WORK_NOTES);

    qnote_in(dir.path())
        .args(["search", "team"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Standup notes"))
        .stdout(predicate::str::contains("Retro"));

    qnote_in(dir.path())
        .args(["search", "Home"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Groceries"));
}

#[test]
fn test_search_json_output() {
    let dir = tempdir().unwrap();
    seed(dir.path(), WORK_NOTES);

    let output = qnote_in(dir.path())
        .args(["--format", "json", "search", "retro"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let hits: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let hits = hits.as_array().unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["title"], "Retro");
    assert_eq!(hits[0]["book"], "Work");
}

#[test]
fn test_search_limit() {
    let dir = tempdir().unwrap();
    seed(dir.path(), WORK_NOTES);

    let output = qnote_in(dir.path())
        .args(["search", "team", "--limit", "1"])
        .output()
        .unwrap();
    assert_eq!(String::from_utf8_lossy(&output.stdout).lines().count(), 1);
}

#[test]
fn test_search_no_matches() {
    let dir = tempdir().unwrap();
    seed(dir.path(), WORK_NOTES);

    qnote_in(dir.path())
        .args(["search", "nothing-like-this"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No matches"));
}

#[test]
fn test_search_zero_limit_rejected() {
    qnote_in(tempdir().unwrap().path())
        .args(["search", "x", "--limit", "0"])
        .assert()
        .code(2);
}
