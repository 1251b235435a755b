use std::path::{Path, PathBuf};

use serde_json::Value;
use tempfile::tempdir;

const SAMPLE_CSV: &str = "\
customer_id,email,orders
1,a@example.com,2
2,b@example.com,3
3,c@example.com,4
";

const SAMPLE_SUITE: &str = r#"
name: customers
expectations:
  - kind: table_column_count_equal
    value: 3
  - kind: column_values_unique
    column: customer_id
  - kind: column_values_match_regex
    column: email
    pattern: "^[^@]+@[^@]+$"
"#;

fn write_fixtures(dir: &Path) -> (PathBuf, PathBuf) {
    let input = dir.join("customers.csv");
    let suite = dir.join("suite.yaml");
    std::fs::write(&input, SAMPLE_CSV).expect("write input");
    std::fs::write(&suite, SAMPLE_SUITE).expect("write suite");
    (input, suite)
}

fn parse_stdout_json(stdout: &[u8]) -> Value {
    let text = String::from_utf8(stdout.to_vec()).expect("stdout utf8");
    serde_json::from_str(text.trim()).expect("stdout json")
}

fn stderr_lines(stderr: &[u8]) -> Vec<String> {
    String::from_utf8(stderr.to_vec())
        .expect("stderr utf8")
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn validate_passing_suite_exits_zero_with_run_payload() {
    let dir = tempdir().expect("tempdir");
    let (input, suite) = write_fixtures(dir.path());
    let store_root = dir.path().join("store");

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
            "nightly",
        ])
        .output()
        .expect("run command");

    assert_eq!(output.status.code(), Some(0));
    let payload = parse_stdout_json(&output.stdout);
    assert_eq!(payload["suite_name"], Value::from("customers"));
    assert_eq!(payload["success"], Value::Bool(true));
    assert_eq!(payload["statistics"]["evaluated_expectations"], Value::from(3));
    assert_eq!(payload["statistics"]["success_percent"], Value::from(100.0));
    assert!(
        payload["run_id"]["run_name"]
            .as_str()
            .expect("run name")
            .ends_with("-nightly")
    );
    assert!(
        payload["batch_id"]
            .as_str()
            .expect("batch id")
            .starts_with("batch_")
    );

    let lines = stderr_lines(&output.stderr);
    assert_eq!(lines[0], "created suite `customers`");
    assert_eq!(lines[1], "PASS table_column_count_equal");
    assert_eq!(lines[2], "PASS column_values_unique column=customer_id");
    assert_eq!(lines[3], "PASS column_values_match_regex column=email");
    assert!(
        lines
            .last()
            .expect("store note")
            .starts_with("stored validation run `customers/")
    );

    assert!(store_root.join("suites/customers.json").exists());
    assert!(store_root.join("validations/customers").exists());
}

#[test]
fn validate_failing_expectation_exits_two() {
    let dir = tempdir().expect("tempdir");
    let (input, suite) = write_fixtures(dir.path());
    std::fs::write(
        &input,
        "customer_id,email,orders\n1,a@example.com,2\n1,b@example.com,3\n",
    )
    .expect("write duplicate ids");

    let output = assert_cmd::cargo::cargo_bin_cmd!("veriq")
        .args([
            "validate",
            "--store-root",
            dir.path().join("store").to_str().expect("utf8 path"),
            "--input",
            input.to_str().expect("utf8 path"),
            "--suite",
            suite.to_str().expect("utf8 path"),
        ])
        .output()
        .expect("run command");

    assert_eq!(output.status.code(), Some(2));
    let payload = parse_stdout_json(&output.stdout);
    assert_eq!(payload["success"], Value::Bool(false));
    assert_eq!(
        payload["statistics"]["unsuccessful_expectations"],
        Value::from(1)
    );
    let lines = stderr_lines(&output.stderr);
    assert!(lines.iter().any(|line| line.starts_with("FAIL column_values_unique")));
}

#[test]
fn validate_missing_input_exits_three_with_json_error() {
    let dir = tempdir().expect("tempdir");
    let (_, suite) = write_fixtures(dir.path());

    let output = assert_cmd::cargo::cargo_bin_cmd!("veriq")
        .args([
            "validate",
            "--store-root",
            dir.path().join("store").to_str().expect("utf8 path"),
            "--input",
            dir.path().join("absent.csv").to_str().expect("utf8 path"),
            "--suite",
            suite.to_str().expect("utf8 path"),
        ])
        .output()
        .expect("run command");

    assert_eq!(output.status.code(), Some(3));
    assert!(output.stdout.is_empty());
    let lines = stderr_lines(&output.stderr);
    let error: Value = serde_json::from_str(lines.last().expect("error line")).expect("json");
    assert_eq!(error["error"], Value::from("input_usage_error"));
}

#[test]
fn validate_without_persist_leaves_no_run_history() {
    let dir = tempdir().expect("tempdir");
    let (input, suite) = write_fixtures(dir.path());
    let store_root = dir.path().join("store");

    let output = assert_cmd::cargo::cargo_bin_cmd!("veriq")
        .args([
            "validate",
            "--store-root",
            store_root.to_str().expect("utf8 path"),
            "--input",
            input.to_str().expect("utf8 path"),
            "--suite",
            suite.to_str().expect("utf8 path"),
            "--persist",
            "false",
        ])
        .output()
        .expect("run command");

    assert_eq!(output.status.code(), Some(0));
    assert!(!store_root.join("validations").exists());
}

#[test]
fn validate_unknown_flag_maps_to_cli_parse_error() {
    let output = assert_cmd::cargo::cargo_bin_cmd!("veriq")
        .args(["validate", "--no-such-flag"])
        .output()
        .expect("run command");

    assert_eq!(output.status.code(), Some(3));
    let lines = stderr_lines(&output.stderr);
    let error: Value = serde_json::from_str(lines.last().expect("error line")).expect("json");
    assert_eq!(error["error"], Value::from("input_usage_error"));
    assert_eq!(error["details"]["kind"], Value::from("cli_parse_error"));
}
