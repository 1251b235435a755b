use serde_json::Value;
use thiserror::Error;

/// Error raised while applying a per-row predicate to one value.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct PredicateError {
    message: String,
}

impl PredicateError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Per-element outcome of a predicate application. Errors are carried
/// as data until the mask is assembled so they stay observable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PredicateOutcome {
    Evaluated(bool),
    Errored(String),
}

/// Applies `predicate` to every value in order, producing one outcome
/// per value. No predicate error propagates; each failure is recorded
/// against its own element only.
pub fn evaluate_outcomes<'a, I, F>(values: I, predicate: F) -> Vec<PredicateOutcome>
where
    I: IntoIterator<Item = &'a Value>,
    F: Fn(&Value) -> Result<bool, PredicateError>,
{
    values
        .into_iter()
        .map(|value| match predicate(value) {
            Ok(passed) => PredicateOutcome::Evaluated(passed),
            Err(error) => PredicateOutcome::Errored(error.to_string()),
        })
        .collect()
}

/// Folds outcomes into a boolean mask. Errored elements become `false`
/// here, at the assembly point, keeping the error text available to the
/// caller up to this moment.
pub fn fold_mask(outcomes: &[PredicateOutcome]) -> Vec<bool> {
    outcomes
        .iter()
        .map(|outcome| matches!(outcome, PredicateOutcome::Evaluated(true)))
        .collect()
}
