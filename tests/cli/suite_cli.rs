use std::path::{Path, PathBuf};

use serde_json::Value;
use tempfile::tempdir;

const SAMPLE_SUITE: &str = r#"
name: customers
expectations:
  - kind: column_values_not_null
    column: customer_id
  - kind: column_values_between
    column: orders
    min: 0
    max: 100
"#;

fn write_suite(dir: &Path, body: &str) -> PathBuf {
    let file = dir.join("suite.yaml");
    std::fs::write(&file, body).expect("write suite");
    file
}

fn run_suite_cmd(store_root: &Path, file: &Path, extra: &[&str]) -> std::process::Output {
    let mut args = vec![
        "suite",
        "--store-root",
        store_root.to_str().expect("utf8 path"),
        "--file",
        file.to_str().expect("utf8 path"),
    ];
    args.extend_from_slice(extra);
    assert_cmd::cargo::cargo_bin_cmd!("veriq")
        .args(&args)
        .output()
        .expect("run command")
}

#[test]
fn suite_add_stores_definition_and_prints_it() {
    let dir = tempdir().expect("tempdir");
    let file = write_suite(dir.path(), SAMPLE_SUITE);
    let store_root = dir.path().join("store");

    let output = run_suite_cmd(&store_root, &file, &[]);
    assert_eq!(output.status.code(), Some(0));

    let payload: Value =
        serde_json::from_slice(&output.stdout).expect("stdout json");
    assert_eq!(payload["name"], Value::from("customers"));
    assert_eq!(
        payload["expectations"][0]["kind"],
        Value::from("column_values_not_null")
    );
    assert!(store_root.join("suites/customers.json").exists());
}

#[test]
fn suite_re_add_without_update_exits_three() {
    let dir = tempdir().expect("tempdir");
    let file = write_suite(dir.path(), SAMPLE_SUITE);
    let store_root = dir.path().join("store");

    assert_eq!(run_suite_cmd(&store_root, &file, &[]).status.code(), Some(0));
    let output = run_suite_cmd(&store_root, &file, &[]);
    assert_eq!(output.status.code(), Some(3));

    let stderr = String::from_utf8(output.stderr).expect("stderr utf8");
    let error: Value =
        serde_json::from_str(stderr.lines().last().expect("error line")).expect("json");
    assert_eq!(error["error"], Value::from("input_usage_error"));
}

#[test]
fn suite_update_overwrites_stored_definition() {
    let dir = tempdir().expect("tempdir");
    let file = write_suite(dir.path(), SAMPLE_SUITE);
    let store_root = dir.path().join("store");
    assert_eq!(run_suite_cmd(&store_root, &file, &[]).status.code(), Some(0));

    let reduced = write_suite(
        dir.path(),
        "name: customers\nexpectations:\n  - kind: column_values_unique\n    column: customer_id\n",
    );
    let output = run_suite_cmd(&store_root, &reduced, &["--update"]);
    assert_eq!(output.status.code(), Some(0));

    let payload: Value = serde_json::from_slice(&output.stdout).expect("stdout json");
    assert_eq!(payload["expectations"].as_array().expect("array").len(), 1);
}

#[test]
fn suite_with_invalid_mostly_is_rejected() {
    let dir = tempdir().expect("tempdir");
    let file = write_suite(
        dir.path(),
        "name: customers\nexpectations:\n  - kind: column_values_not_null\n    column: customer_id\n    mostly: 1.5\n",
    );

    let output = run_suite_cmd(&dir.path().join("store"), &file, &[]);
    assert_eq!(output.status.code(), Some(3));
}
