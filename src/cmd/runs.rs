use std::path::PathBuf;

use serde::Serialize;
use serde_json::{Value, json};

use crate::store::{StoreError, ValidationResultStore};

/// Input arguments for listing persisted validation runs.
#[derive(Debug, Clone)]
pub struct RunsCommandArgs {
    pub store_root: PathBuf,
    pub suite: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RunsCommandResponse {
    pub exit_code: i32,
    pub payload: Value,
}

/// Summarizes the stored run history in stable key order; this is the
/// feed an external report builder renders.
pub fn run(args: &RunsCommandArgs) -> RunsCommandResponse {
    match execute(args) {
        Ok(payload) => RunsCommandResponse {
            exit_code: 0,
            payload,
        },
        Err(CommandError::InputUsage(message)) => RunsCommandResponse {
            exit_code: 3,
            payload: json!({
                "error": "input_usage_error",
                "message": message,
            }),
        },
        Err(CommandError::Internal(message)) => RunsCommandResponse {
            exit_code: 1,
            payload: json!({
                "error": "internal_error",
                "message": message,
            }),
        },
    }
}

fn execute(args: &RunsCommandArgs) -> Result<Value, CommandError> {
    let store = ValidationResultStore::new(&args.store_root);
    let keys = match &args.suite {
        Some(suite_name) => store.list_for_suite(suite_name),
        None => store.list(),
    }
    .map_err(map_store_error)?;

    let mut runs = Vec::with_capacity(keys.len());
    for key in keys {
        let run = store
            .get(&key)
            .map_err(|error| CommandError::Internal(error.to_string()))?;
        runs.push(json!({
            "suite_name": run.suite_name,
            "run_name": run.run_id.run_name,
            "run_time": run.run_id.run_time,
            "batch_id": run.batch_id,
            "success": run.success,
            "statistics": run.statistics,
        }));
    }

    Ok(json!({
        "run_count": runs.len(),
        "runs": runs,
    }))
}

fn map_store_error(error: StoreError) -> CommandError {
    match error {
        StoreError::InvalidName { .. } => CommandError::InputUsage(error.to_string()),
        other => CommandError::Internal(other.to_string()),
    }
}

enum CommandError {
    InputUsage(String),
    Internal(String),
}
