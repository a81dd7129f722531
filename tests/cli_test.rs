//! Runs the built binary for commands that need no network access.

use std::process::Command;
use tempfile::TempDir;

fn bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_mlb-stats-to-sqlite"))
}

#[test]
fn test_groups_runs_without_a_data_directory() {
    let output = bin()
        .arg("groups")
        .env_remove("HOME")
        .env_remove("XDG_DATA_HOME")
        .env_remove("MLB_STATS_DB")
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("hitting -> f_hitting"));
    assert!(stdout.contains("pitching -> f_pitching"));
}

#[test]
fn test_groups_ignores_unusable_db_path() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, "").unwrap();

    let output = bin()
        .args(["groups", "--db"])
        .arg(blocker.join("stats.db"))
        .output()
        .unwrap();

    assert!(output.status.success());
}

#[test]
fn test_levels_on_missing_database_fails_without_creating_it() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("missing.db");

    let output = bin()
        .args(["levels", "--db"])
        .arg(&db_path)
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("run `load` first"));
    assert!(!db_path.exists());
}
