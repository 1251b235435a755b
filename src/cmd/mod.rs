pub mod runs;
pub mod suite;
pub mod validate;

use std::fs::File;
use std::path::Path;

use serde_json::Value;

use crate::domain::expectation::{ExpectationSuite, validate_suite};
use crate::io;

/// Loads and validates a suite definition file (YAML or JSON, by
/// extension). Errors are returned as user-facing messages.
pub(crate) fn load_suite_file(path: &Path) -> Result<ExpectationSuite, String> {
    let format = io::resolve_input_format(None, Some(path)).map_err(|error| {
        format!(
            "unable to resolve suite format from `{}`: {error}",
            path.display()
        )
    })?;
    let file = File::open(path)
        .map_err(|error| format!("failed to open suite file `{}`: {error}", path.display()))?;
    let values = io::reader::read_values(file, format).map_err(|error| error.to_string())?;
    if values.len() != 1 {
        return Err("suite file must contain exactly one suite object".to_string());
    }
    let suite_value = values.into_iter().next().unwrap_or(Value::Null);
    let suite: ExpectationSuite = serde_json::from_value(suite_value)
        .map_err(|error| format!("invalid suite definition: {error}"))?;
    validate_suite(&suite).map_err(|error| format!("invalid suite definition: {error}"))?;
    Ok(suite)
}
