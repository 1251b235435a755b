use std::fs::File;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Value, json};

use crate::cmd::load_suite_file;
use crate::domain::dataset::Dataset;
use crate::domain::run::{ExpectationResult, RunIdentifier, ValidationRun};
use crate::engine::run::{default_batch_id, run_suite_with_observer};
use crate::io::{self, Format, IoError};
use crate::store::{RunKey, StoreError, SuiteStore, ValidationResultStore};

const MAX_STORE_ERROR_CHARS: usize = 120;

/// Input arguments for validate command execution API.
#[derive(Debug, Clone)]
pub struct ValidateCommandArgs {
    pub input: PathBuf,
    pub from: Option<Format>,
    pub suite: PathBuf,
    pub store_root: PathBuf,
    pub label: String,
    pub batch_id: Option<String>,
    pub persist: bool,
}

/// Structured command response carrying exit-code mapping, the JSON
/// payload, and the stderr lines the command emitted, in order
/// (suite/store notes, one PASS/FAIL line per expectation, persistence
/// warnings). Notes are written to stderr as they occur, so progress is
/// visible while the run is still evaluating.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ValidateCommandResponse {
    pub exit_code: i32,
    pub payload: Value,
    pub notes: Vec<String>,
}

pub fn run(args: &ValidateCommandArgs) -> ValidateCommandResponse {
    match execute(args) {
        Ok((run, notes)) => run_response(run, notes),
        Err(CommandError::InputUsage(message)) => ValidateCommandResponse {
            exit_code: 3,
            payload: json!({
                "error": "input_usage_error",
                "message": message,
            }),
            notes: vec![],
        },
        Err(CommandError::Internal(message)) => ValidateCommandResponse {
            exit_code: 1,
            payload: json!({
                "error": "internal_error",
                "message": message,
            }),
            notes: vec![],
        },
    }
}

fn run_response(run: ValidationRun, notes: Vec<String>) -> ValidateCommandResponse {
    let exit_code = if run.success { 0 } else { 2 };
    match serde_json::to_value(&run) {
        Ok(payload) => ValidateCommandResponse {
            exit_code,
            payload,
            notes,
        },
        Err(_) => ValidateCommandResponse {
            exit_code: 1,
            payload: json!({
                "error": "internal_error",
                "message": "failed to serialize validation run"
            }),
            notes,
        },
    }
}

fn execute(args: &ValidateCommandArgs) -> Result<(ValidationRun, Vec<String>), CommandError> {
    let suite = load_suite_file(&args.suite).map_err(CommandError::InputUsage)?;

    // A dataset that cannot be loaded is fatal: nothing is evaluated.
    let input_format = io::resolve_input_format(args.from, Some(args.input.as_path()))
        .map_err(map_io_as_input_usage)?;
    let file = File::open(&args.input).map_err(|error| {
        CommandError::InputUsage(format!(
            "failed to open input file `{}`: {error}",
            args.input.display()
        ))
    })?;
    let rows = io::reader::read_values(file, input_format).map_err(map_io_as_input_usage)?;
    let dataset = Dataset::from_rows(&rows);

    let mut notes = Vec::new();
    let suite_store = SuiteStore::new(&args.store_root);
    let (suite, created) = suite_store.ensure(&suite).map_err(map_store_error)?;
    push_note(
        &mut notes,
        if created {
            format!("created suite `{}`", suite.name)
        } else {
            format!("using existing suite `{}`", suite.name)
        },
    );

    let run_id = RunIdentifier::generate(&args.label);
    let batch_id = args
        .batch_id
        .clone()
        .unwrap_or_else(|| default_batch_id(&dataset));
    let run = run_suite_with_observer(&suite, &dataset, run_id, batch_id, |result| {
        push_note(&mut notes, progress_line(result));
    });

    if args.persist {
        persist_run(&args.store_root, &run, &mut notes);
    }

    Ok((run, notes))
}

fn progress_line(result: &ExpectationResult) -> String {
    let verdict = if result.success { "PASS" } else { "FAIL" };
    format!("{verdict} {}", result.expectation.describe())
}

/// Emits the note to stderr immediately and records it in the response.
fn push_note(notes: &mut Vec<String>, line: String) {
    eprintln!("{line}");
    notes.push(line);
}

/// A rejected store write is a warning, not a run failure: the run is
/// complete, only its history entry may be missing.
fn persist_run(store_root: &Path, run: &ValidationRun, notes: &mut Vec<String>) {
    let stored = RunKey::new(&run.suite_name, &run.run_id.run_name, &run.batch_id)
        .and_then(|key| {
            ValidationResultStore::new(store_root)
                .set(&key, run)
                .map(|()| key)
        });
    match stored {
        Ok(key) => push_note(notes, format!("stored validation run `{key}`")),
        Err(error) => push_note(
            notes,
            format!(
                "warning: validation run not stored: {}",
                truncate(&error.to_string(), MAX_STORE_ERROR_CHARS)
            ),
        ),
    }
}

fn truncate(message: &str, max_chars: usize) -> String {
    if message.chars().count() <= max_chars {
        return message.to_string();
    }
    let truncated: String = message.chars().take(max_chars).collect();
    format!("{truncated}...")
}

fn map_io_as_input_usage(error: IoError) -> CommandError {
    CommandError::InputUsage(error.to_string())
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
