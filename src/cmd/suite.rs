use std::path::PathBuf;

use serde::Serialize;
use serde_json::{Value, json};

use crate::cmd::load_suite_file;
use crate::domain::expectation::ExpectationSuite;
use crate::store::{StoreError, SuiteStore};

/// Input arguments for suite registration.
#[derive(Debug, Clone)]
pub struct SuiteCommandArgs {
    pub file: PathBuf,
    pub store_root: PathBuf,
    pub update: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SuiteCommandResponse {
    pub exit_code: i32,
    pub payload: Value,
    pub notes: Vec<String>,
}

pub fn run(args: &SuiteCommandArgs) -> SuiteCommandResponse {
    match execute(args) {
        Ok((suite, notes)) => match serde_json::to_value(&suite) {
            Ok(payload) => SuiteCommandResponse {
                exit_code: 0,
                payload,
                notes,
            },
            Err(_) => SuiteCommandResponse {
                exit_code: 1,
                payload: json!({
                    "error": "internal_error",
                    "message": "failed to serialize suite"
                }),
                notes,
            },
        },
        Err(CommandError::InputUsage(message)) => SuiteCommandResponse {
            exit_code: 3,
            payload: json!({
                "error": "input_usage_error",
                "message": message,
            }),
            notes: vec![],
        },
        Err(CommandError::Internal(message)) => SuiteCommandResponse {
            exit_code: 1,
            payload: json!({
                "error": "internal_error",
                "message": message,
            }),
            notes: vec![],
        },
    }
}

fn execute(args: &SuiteCommandArgs) -> Result<(ExpectationSuite, Vec<String>), CommandError> {
    let suite = load_suite_file(&args.file).map_err(CommandError::InputUsage)?;
    let store = SuiteStore::new(&args.store_root);

    let stored = if args.update {
        store.add_or_update(&suite)
    } else {
        store.add(&suite)
    }
    .map_err(map_store_error)?;

    let action = if args.update { "updated" } else { "added" };
    let notes = vec![format!("{action} suite `{}`", stored.name)];
    Ok((stored, notes))
}

fn map_store_error(error: StoreError) -> CommandError {
    match error {
        StoreError::SuiteExists { .. } | StoreError::InvalidName { .. } => {
            CommandError::InputUsage(error.to_string())
        }
        other => CommandError::Internal(other.to_string()),
    }
}

enum CommandError {
    InputUsage(String),
    Internal(String),
}
