use std::path::PathBuf;
use std::process;

use clap::error::ErrorKind;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::{Value, json};
use veriq::cmd::{runs, suite, validate};
use veriq::io::Format;

#[derive(Debug, Parser)]
#[command(
    name = "veriq",
    version,
    about = "Declarative tabular data validation CLI"
)]
struct Cli {
    /// Root directory of the suite and validation result stores.
    #[arg(long, global = true, default_value = ".veriq")]
    store_root: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Validate a dataset against an expectation suite.
    Validate(ValidateArgs),
    /// Register an expectation suite in the store.
    Suite(SuiteArgs),
    /// List persisted validation runs.
    Runs(RunsArgs),
}

#[derive(Debug, clap::Args)]
struct ValidateArgs {
    #[arg(long)]
    input: PathBuf,

    #[arg(long, value_enum)]
    from: Option<CliInputFormat>,

    #[arg(long)]
    suite: PathBuf,

    #[arg(long, default_value = "run")]
    label: String,

    #[arg(long)]
    batch_id: Option<String>,

    #[arg(long, action = clap::ArgAction::Set, default_value_t = true)]
    persist: bool,
}

#[derive(Debug, clap::Args)]
struct SuiteArgs {
    #[arg(long)]
    file: PathBuf,

    #[arg(long, default_value_t = false)]
    update: bool,
}

#[derive(Debug, clap::Args)]
struct RunsArgs {
    #[arg(long)]
    suite: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliInputFormat {
    Json,
    Yaml,
    Csv,
    Jsonl,
}

impl From<CliInputFormat> for Format {
    fn from(value: CliInputFormat) -> Self {
        match value {
            CliInputFormat::Json => Self::Json,
            CliInputFormat::Yaml => Self::Yaml,
            CliInputFormat::Csv => Self::Csv,
            CliInputFormat::Jsonl => Self::Jsonl,
        }
    }
}

#[derive(Serialize)]
struct CliError<'a> {
    error: &'a str,
    message: String,
    code: i32,
    details: Value,
}

fn main() {
    process::exit(run());
}

fn run() -> i32 {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(error) => return handle_parse_error(error),
    };

    let store_root = cli.store_root;
    match cli.command {
        Commands::Validate(args) => run_validate(args, store_root),
        Commands::Suite(args) => run_suite(args, store_root),
        Commands::Runs(args) => run_runs(args, store_root),
    }
}

fn handle_parse_error(error: clap::Error) -> i32 {
    match error.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            print!("{error}");
            0
        }
        _ => {
            emit_error(
                "input_usage_error",
                error.to_string(),
                json!({"kind": "cli_parse_error"}),
                3,
            );
            3
        }
    }
}

fn run_validate(args: ValidateArgs, store_root: PathBuf) -> i32 {
    let command_args = validate::ValidateCommandArgs {
        input: args.input,
        from: args.from.map(Into::into),
        suite: args.suite,
        store_root,
        label: args.label,
        batch_id: args.batch_id,
        persist: args.persist,
    };
    // Validate streams its own progress notes to stderr as it runs.
    let response = validate::run(&command_args);
    emit_response("validate", response.exit_code, &response.payload)
}

fn run_suite(args: SuiteArgs, store_root: PathBuf) -> i32 {
    let command_args = suite::SuiteCommandArgs {
        file: args.file,
        store_root,
        update: args.update,
    };
    let response = suite::run(&command_args);
    emit_notes(&response.notes);
    emit_response("suite", response.exit_code, &response.payload)
}

fn run_runs(args: RunsArgs, store_root: PathBuf) -> i32 {
    let command_args = runs::RunsCommandArgs {
        store_root,
        suite: args.suite,
    };
    let response = runs::run(&command_args);
    emit_response("runs", response.exit_code, &response.payload)
}

/// Payloads of successful and failed-validation runs go to stdout,
/// error payloads to stderr.
fn emit_response(command: &'static str, exit_code: i32, payload: &Value) -> i32 {
    let emitted = match exit_code {
        0 | 2 => emit_json_stdout(payload),
        3 | 1 => emit_json_stderr(payload),
        other => {
            emit_error(
                "internal_error",
                format!("unexpected {command} exit code: {other}"),
                json!({"command": command}),
                1,
            );
            return 1;
        }
    };
    if emitted {
        exit_code
    } else {
        emit_error(
            "internal_error",
            format!("failed to serialize {command} response"),
            json!({"command": command}),
            1,
        );
        1
    }
}

fn emit_notes(notes: &[String]) {
    for note in notes {
        eprintln!("{note}");
    }
}

fn emit_json_stdout(value: &Value) -> bool {
    match serde_json::to_string(value) {
        Ok(serialized) => {
            println!("{serialized}");
            true
        }
        Err(_) => false,
    }
}

fn emit_json_stderr(value: &Value) -> bool {
    match serde_json::to_string(value) {
        Ok(serialized) => {
            eprintln!("{serialized}");
            true
        }
        Err(_) => false,
    }
}

fn emit_error(error: &'static str, message: String, details: Value, code: i32) {
    let payload = CliError {
        error,
        message,
        code,
        details,
    };
    match serde_json::to_string(&payload) {
        Ok(serialized) => eprintln!("{serialized}"),
        Err(_) => eprintln!(
            "{{\"error\":\"internal_error\",\"message\":\"failed to serialize error\",\"code\":1}}"
        ),
    }
}
