use std::fs;
use std::path::Path;
use std::process::{Command, Output};

const RATES: &str = include_str!("fixtures/rates.json");
const INDEX: &str = include_str!("fixtures/index.html");

fn run_cli(root: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tax_rate_updater"))
        .current_dir(root)
        .arg("--root")
        .arg(root)
        .args(args)
        .env_remove("RATES_ROOT")
        .env_remove("LOG_FILE_PATH")
        .env("RUST_LOG", "warn")
        .output()
        .expect("failed to run tax_rate_updater")
}

#[test]
fn test_cli_success_prints_summary() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("scripts")).unwrap();
    fs::write(dir.path().join("scripts/rates.json"), RATES).unwrap();
    fs::write(dir.path().join("index.html"), INDEX).unwrap();

    let output = run_cli(dir.path(), &[]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout.contains("fallback with 51 states."));
    assert!(stdout.contains("  Tax year: 2025"));
    assert!(stdout.contains("  Last updated: 2025-01-15"));
    assert!(dir.path().join("data/rates.json").exists());
}

#[test]
fn test_cli_missing_input_exits_non_zero() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("index.html"), INDEX).unwrap();

    let output = run_cli(dir.path(), &["update"]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("rate file not found"), "stderr: {stderr}");
    assert!(output.stdout.is_empty());
    assert_eq!(fs::read_to_string(dir.path().join("index.html")).unwrap(), INDEX);
}

#[test]
fn test_cli_schema_error_exits_non_zero() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("scripts")).unwrap();
    fs::write(
        dir.path().join("scripts/rates.json"),
        r#"{ "year": 2025, "updated": "2025-01-15", "states": [] }"#,
    )
    .unwrap();
    fs::write(dir.path().join("index.html"), INDEX).unwrap();

    let output = run_cli(dir.path(), &[]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("expected at least 50"), "stderr: {stderr}");
    assert!(!dir.path().join("data/rates.json").exists());
}
