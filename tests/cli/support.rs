use std::path::Path;

use assert_cmd::{cargo::cargo_bin_cmd, Command};

/// Get a Command for qnote
pub fn qnote() -> Command {
    cargo_bin_cmd!("qnote")
}

/// A qnote command isolated to `dir`: config and data both live underneath it
pub fn qnote_in(dir: &Path) -> Command {
    let mut cmd = qnote();
    cmd.env("QNOTE_CONFIG_DIR", dir.join("config"))
        .env("QNOTE_DATA_DIR", dir.join("data"))
        .env_remove("QNOTE_LOG")
        .env_remove("RUST_LOG");
    cmd
}

/// Create notes through `new json`
pub fn seed(dir: &Path, json: &str) {
    qnote_in(dir)
        .args(["--quiet", "new", "json", json])
        .assert()
        .success();
}

pub const WORK_NOTES: &str = r#"[
    {"title":"Standup notes","type":"basic","tags":["urgent","team"],"body":"yesterday, today","book":"Work"},
    {"title":"Retro","type":"basic","tags":["team"],"body":"went well","book":"Work"},
    {"title":"Groceries","type":"basic","tags":[],"body":"eggs, milk","book":"Home"}
]"#;
