use std::path::Path;

use serde_json::Value;
use tempfile::tempdir;

const SAMPLE_CSV: &str = "\
customer_id,email
1,a@example.com
2,b@example.com
";

fn validate_once(dir: &Path, store_root: &Path, suite_name: &str, label: &str) {
    let input = dir.join(format!("{suite_name}.csv"));
    let suite = dir.join(format!("{suite_name}.yaml"));
    std::fs::write(&input, SAMPLE_CSV).expect("write input");
    std::fs::write(
        &suite,
        format!(
            "name: {suite_name}\nexpectations:\n  - kind: column_values_unique\n    column: customer_id\n"
        ),
    )
    .expect("write suite");

    let output = assert_cmd::cargo::cargo_bin_cmd!("veriq")
        .args([
            "validate",
            "--store-root",
            store_root.to_str().expect("utf8 path"),
            "--input",
            input.to_str().expect("utf8 path"),
            "--suite",
            suite.to_str().expect("utf8 path"),
            "--label",
            label,
        ])
        .output()
        .expect("run command");
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn runs_lists_persisted_history() {
    let dir = tempdir().expect("tempdir");
    let store_root = dir.path().join("store");
    validate_once(dir.path(), &store_root, "customers", "a");
    validate_once(dir.path(), &store_root, "orders", "b");

    let output = assert_cmd::cargo::cargo_bin_cmd!("veriq")
        .args([
            "runs",
            "--store-root",
            store_root.to_str().expect("utf8 path"),
        ])
        .output()
        .expect("run command");

    assert_eq!(output.status.code(), Some(0));
    let payload: Value = serde_json::from_slice(&output.stdout).expect("stdout json");
    assert_eq!(payload["run_count"], Value::from(2));
    assert_eq!(payload["runs"][0]["suite_name"], Value::from("customers"));
    assert_eq!(payload["runs"][0]["success"], Value::Bool(true));
    assert_eq!(
        payload["runs"][1]["statistics"]["success_percent"],
        Value::from(100.0)
    );
}

#[test]
fn runs_filters_by_suite() {
    let dir = tempdir().expect("tempdir");
    let store_root = dir.path().join("store");
    validate_once(dir.path(), &store_root, "customers", "a");
    validate_once(dir.path(), &store_root, "orders", "b");

    let output = assert_cmd::cargo::cargo_bin_cmd!("veriq")
        .args([
            "runs",
            "--store-root",
            store_root.to_str().expect("utf8 path"),
            "--suite",
            "orders",
        ])
        .output()
        .expect("run command");

    assert_eq!(output.status.code(), Some(0));
    let payload: Value = serde_json::from_slice(&output.stdout).expect("stdout json");
    assert_eq!(payload["run_count"], Value::from(1));
    assert_eq!(payload["runs"][0]["suite_name"], Value::from("orders"));
}

#[test]
fn runs_on_empty_store_reports_zero() {
    let dir = tempdir().expect("tempdir");
    let output = assert_cmd::cargo::cargo_bin_cmd!("veriq")
        .args([
            "runs",
            "--store-root",
            dir.path().join("missing").to_str().expect("utf8 path"),
        ])
        .output()
        .expect("run command");

    assert_eq!(output.status.code(), Some(0));
    let payload: Value = serde_json::from_slice(&output.stdout).expect("stdout json");
    assert_eq!(payload["run_count"], Value::from(0));
}
