// CLI smoke tests against a fake Windows home
// Run with: cargo test --test cli_test

mod common;

use std::fs;
use std::path::Path;
use std::process::Command;

use common::FakeHome;

fn run_cli(home: &FakeHome, args: &[&str]) -> (bool, String, String) {
    let config = home.path().join("cli_config.json");
    fs::write(&config, r#"{"platform": "windows"}"#).unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_browser-artifacts"))
        .arg("--config")
        .arg(&config)
        .arg("--home")
        .arg(home.path())
        .arg("--snapshot-dir")
        .arg(home.snapshots.path())
        .args(args)
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (output.status.success(), stdout, stderr)
}

#[test]
fn test_preview_json() {
    let home = FakeHome::new();
    home.with_edge_history(25, true);

    let (success, stdout, stderr) = run_cli(
        &home,
        &["preview", "-b", "edge", "-t", "history", "-p", "2", "--json"],
    );
    assert!(success, "preview failed: {}", stderr);

    let page: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(page["totalRecords"], 25);
    assert_eq!(page["totalPages"], 2);
    assert_eq!(page["currentPage"], 2);
    assert_eq!(page["records"].as_array().unwrap().len(), 5);
    assert_eq!(home.snapshot_count(), 0);
}

#[test]
fn test_preview_reports_error_kind() {
    let home = FakeHome::new();

    let (success, _, stderr) = run_cli(&home, &["preview", "-b", "brave"]);
    assert!(!success);
    assert!(stderr.contains("database_file_not_found"), "stderr: {}", stderr);
}

#[test]
fn test_unknown_browser() {
    let home = FakeHome::new();

    let (success, _, stderr) = run_cli(&home, &["preview", "-b", "netscape"]);
    assert!(!success);
    assert!(stderr.contains("unsupported_browser"), "stderr: {}", stderr);
}

#[test]
fn test_export_writes_csv() {
    let home = FakeHome::new();
    home.with_edge_history(3, true);
    let out = home.path().join("export_edge.csv");

    let (success, stdout, stderr) = run_cli(
        &home,
        &["export", "-b", "edge", "-o", out.to_str().unwrap()],
    );
    assert!(success, "export failed: {}", stderr);
    assert!(stdout.contains("export_"));

    let bytes = fs::read(&out).unwrap();
    assert!(bytes.starts_with(b"\xEF\xBB\xBF"));
    let text = String::from_utf8_lossy(&bytes[3..]).to_string();
    assert!(text.starts_with("Kind,URL,Title,Visit Count,Timestamp"));
    assert_eq!(text.lines().count(), 5);
}

#[test]
fn test_export_failure_writes_nothing() {
    let home = FakeHome::new();
    let out = home.path().join("never.csv");

    let (success, _, stderr) = run_cli(
        &home,
        &["export", "-b", "brave", "-o", out.to_str().unwrap()],
    );
    assert!(!success);
    assert!(stderr.contains("database_file_not_found"), "stderr: {}", stderr);
    assert!(!out.exists());
}

#[test]
fn test_paths_lists_every_bucket() {
    let home = FakeHome::new();
    home.with_edge_history(1, false);

    let (success, stdout, stderr) = run_cli(&home, &["paths"]);
    assert!(success, "paths failed: {}", stderr);
    assert_eq!(stdout.lines().count(), 12);
    assert!(stdout.contains(&Path::new("User Data").join("Default").join("History").display().to_string()));
}

#[test]
fn test_scan_all_browsers() {
    let home = FakeHome::new();
    home.with_edge_history(4, true);

    let (success, stdout, stderr) = run_cli(&home, &["scan", "-t", "history"]);
    assert!(success, "scan failed: {}", stderr);
    assert!(stdout.contains("Edge"));
    assert!(stdout.contains("4 records"));
    assert!(stdout.contains("database_file_not_found"));
    assert!(stdout.contains("profile_not_found"));
}

#[test]
fn test_help() {
    let home = FakeHome::new();
    let (success, stdout, _) = run_cli(&home, &["--help"]);
    assert!(success);
    for command in ["preview", "export", "scan", "paths"] {
        assert!(stdout.contains(command), "help missing {}", command);
    }
}
