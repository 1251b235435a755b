use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use serde_json::{Value, json};

use crate::domain::dataset::Dataset;
use crate::domain::expectation::{Expectation, NamedPredicate, ValueType};
use crate::domain::run::{ExpectationResult, ObservedStats};
use crate::engine::predicate::{PredicateError, PredicateOutcome, evaluate_outcomes, fold_mask};
use crate::util::num::compare_numbers;

const MAX_UNEXPECTED_SAMPLES: usize = 20;

/// Evaluates one expectation against the dataset. Never errors: a
/// missing column or unevaluable aggregate becomes a failing result
/// with an explanatory observation, so one bad expectation cannot
/// abort the rest of a run.
///
/// Null policy per kind: `column_values_not_null` counts nulls as the
/// violations over all rows; every other column kind excludes nulls
/// from both the numerator and denominator; `column_mean_between`
/// averages numeric non-null values, treats non-numeric non-null
/// values as unexpected (failing the expectation), and fails when no
/// numeric values exist.
pub fn evaluate_expectation(expectation: &Expectation, dataset: &Dataset) -> ExpectationResult {
    let (success, observed) = match expectation {
        Expectation::TableColumnCountEqual { value } => {
            let actual = dataset.column_count();
            (actual == *value, aggregate_observation(json!(actual)))
        }
        Expectation::TableRowCountBetween { min, max } => {
            let rows = dataset.row_count();
            let within = min.is_none_or(|min| rows >= min) && max.is_none_or(|max| rows <= max);
            (within, aggregate_observation(json!(rows)))
        }
        Expectation::ColumnValuesNotNull { column, mostly } => {
            with_column(dataset, column, |values| {
                let all: Vec<&Value> = values.iter().collect();
                let outcomes = evaluate_outcomes(all.iter().copied(), |value| Ok(!value.is_null()));
                masked_observation(&all, &outcomes, *mostly)
            })
        }
        Expectation::ColumnValuesUnique { column } => {
            with_column(dataset, column, evaluate_unique)
        }
        Expectation::ColumnValuesOfType { column, value_type } => {
            let value_type = *value_type;
            with_column(dataset, column, move |values| {
                let (success, mut observed) =
                    evaluate_masked_skipping_nulls(values, 1.0, |value| {
                        Ok(value_type.matches(value))
                    });
                observed.observed_value = Some(json!({ "expected_type": value_type.as_str() }));
                (success, observed)
            })
        }
        Expectation::ColumnValuesMatchRegex {
            column,
            pattern,
            mostly,
        } => with_column(dataset, column, |values| {
            evaluate_regex(values, pattern, *mostly)
        }),
        Expectation::ColumnValuesMatchDateFormat {
            column,
            format,
            mostly,
        } => with_column(dataset, column, |values| {
            evaluate_masked_skipping_nulls(values, *mostly, |value| {
                let text = value
                    .as_str()
                    .ok_or_else(|| PredicateError::new("value is not a string"))?;
                Ok(parses_with_format(text, format))
            })
        }),
        Expectation::ColumnValuesBetween {
            column,
            min,
            max,
            mostly,
        } => with_column(dataset, column, |values| {
            evaluate_masked_skipping_nulls(values, *mostly, |value| {
                let number = value
                    .as_number()
                    .ok_or_else(|| PredicateError::new("value is not numeric"))?;
                let above_min = min
                    .as_ref()
                    .is_none_or(|min| compare_numbers(number, min) != Ordering::Less);
                let below_max = max
                    .as_ref()
                    .is_none_or(|max| compare_numbers(number, max) != Ordering::Greater);
                Ok(above_min && below_max)
            })
        }),
        Expectation::ColumnMeanBetween { column, min, max } => {
            with_column(dataset, column, |values| evaluate_mean(values, *min, *max))
        }
        Expectation::ColumnValuesSatisfy {
            column,
            predicate,
            mostly,
        } => with_column(dataset, column, |values| {
            evaluate_masked_skipping_nulls(values, *mostly, |value| {
                apply_named_predicate(predicate, value)
            })
        }),
    };

    ExpectationResult {
        expectation: expectation.clone(),
        success,
        observed,
    }
}

fn with_column<F>(dataset: &Dataset, column: &str, eval: F) -> (bool, ObservedStats)
where
    F: FnOnce(&[Value]) -> (bool, ObservedStats),
{
    match dataset.column(column) {
        Some(found) => eval(&found.values),
        None => (
            false,
            ObservedStats {
                observed_value: Some(json!({ "missing_column": column })),
                ..ObservedStats::default()
            },
        ),
    }
}

fn aggregate_observation(observed_value: Value) -> ObservedStats {
    ObservedStats {
        observed_value: Some(observed_value),
        ..ObservedStats::default()
    }
}

fn evaluate_masked_skipping_nulls<F>(
    values: &[Value],
    mostly: f64,
    predicate: F,
) -> (bool, ObservedStats)
where
    F: Fn(&Value) -> Result<bool, PredicateError>,
{
    let non_null: Vec<&Value> = values.iter().filter(|value| !value.is_null()).collect();
    let outcomes = evaluate_outcomes(non_null.iter().copied(), predicate);
    masked_observation(&non_null, &outcomes, mostly)
}

/// Folds per-element outcomes into a pass/fail decision: success iff
/// the passing fraction reaches `mostly` (vacuously true for an empty
/// element set). Offending values are sampled up to a fixed cap.
fn masked_observation(
    values: &[&Value],
    outcomes: &[PredicateOutcome],
    mostly: f64,
) -> (bool, ObservedStats) {
    let mask = fold_mask(outcomes);
    let element_count = values.len();
    let mut unexpected_count = 0usize;
    let mut unexpected_samples = Vec::new();

    for (value, passed) in values.iter().zip(&mask) {
        if !*passed {
            unexpected_count += 1;
            if unexpected_samples.len() < MAX_UNEXPECTED_SAMPLES {
                unexpected_samples.push((*value).clone());
            }
        }
    }

    let unexpected_percent = if element_count == 0 {
        0.0
    } else {
        100.0 * unexpected_count as f64 / element_count as f64
    };
    let success = if element_count == 0 {
        true
    } else {
        let passed_fraction = (element_count - unexpected_count) as f64 / element_count as f64;
        passed_fraction >= mostly
    };

    (
        success,
        ObservedStats {
            element_count,
            unexpected_count,
            unexpected_percent,
            unexpected_samples,
            observed_value: None,
        },
    )
}

/// Nulls are excluded from duplicate detection; every occurrence of a
/// duplicated value counts as unexpected.
fn evaluate_unique(values: &[Value]) -> (bool, ObservedStats) {
    let mut counts: BTreeMap<String, (usize, Value)> = BTreeMap::new();
    let mut element_count = 0usize;
    for value in values.iter().filter(|value| !value.is_null()) {
        element_count += 1;
        let signature =
            serde_json::to_string(value).unwrap_or_else(|_| "<serialization-error>".to_string());
        counts.entry(signature).or_insert((0, value.clone())).0 += 1;
    }

    let mut unexpected_count = 0usize;
    let mut unexpected_samples = Vec::new();
    let mut duplicated_values = 0usize;
    for (count, value) in counts.values() {
        if *count > 1 {
            duplicated_values += 1;
            unexpected_count += *count;
            if unexpected_samples.len() < MAX_UNEXPECTED_SAMPLES {
                unexpected_samples.push(value.clone());
            }
        }
    }

    let unexpected_percent = if element_count == 0 {
        0.0
    } else {
        100.0 * unexpected_count as f64 / element_count as f64
    };

    (
        unexpected_count == 0,
        ObservedStats {
            element_count,
            unexpected_count,
            unexpected_percent,
            unexpected_samples,
            observed_value: Some(json!({ "duplicated_values": duplicated_values })),
        },
    )
}

fn evaluate_regex(values: &[Value], pattern: &str, mostly: f64) -> (bool, ObservedStats) {
    match Regex::new(pattern) {
        Ok(regex) => evaluate_masked_skipping_nulls(values, mostly, |value| {
            let text = value
                .as_str()
                .ok_or_else(|| PredicateError::new("value is not a string"))?;
            Ok(regex.is_match(text))
        }),
        // Suite validation rejects bad patterns up front; if one slips
        // through, every element fails closed instead of aborting.
        Err(error) => {
            let message = error.to_string();
            evaluate_masked_skipping_nulls(values, mostly, |_| {
                Err(PredicateError::new(message.clone()))
            })
        }
    }
}

fn parses_with_format(text: &str, format: &str) -> bool {
    NaiveDateTime::parse_from_str(text, format).is_ok()
        || NaiveDate::parse_from_str(text, format).is_ok()
}

/// The mean is taken over numeric non-null values. Non-numeric non-null
/// cells are recorded as unexpected and fail the expectation, as does a
/// column with no numeric values at all.
fn evaluate_mean(values: &[Value], min: f64, max: f64) -> (bool, ObservedStats) {
    let mut numeric: Vec<f64> = Vec::new();
    let mut element_count = 0usize;
    let mut unexpected_count = 0usize;
    let mut unexpected_samples = Vec::new();
    for value in values.iter().filter(|value| !value.is_null()) {
        element_count += 1;
        match value.as_f64() {
            Some(number) => numeric.push(number),
            None => {
                unexpected_count += 1;
                if unexpected_samples.len() < MAX_UNEXPECTED_SAMPLES {
                    unexpected_samples.push(value.clone());
                }
            }
        }
    }

    let unexpected_percent = if element_count == 0 {
        0.0
    } else {
        100.0 * unexpected_count as f64 / element_count as f64
    };

    if numeric.is_empty() {
        // Mean is undefined without numeric values; flagged as a failure.
        return (
            false,
            ObservedStats {
                element_count,
                unexpected_count,
                unexpected_percent,
                unexpected_samples,
                observed_value: Some(Value::Null),
            },
        );
    }

    let mean = numeric.iter().sum::<f64>() / numeric.len() as f64;
    (
        unexpected_count == 0 && min <= mean && mean <= max,
        ObservedStats {
            element_count,
            unexpected_count,
            unexpected_percent,
            unexpected_samples,
            observed_value: Some(json!(mean)),
        },
    )
}

fn apply_named_predicate(
    predicate: &NamedPredicate,
    value: &Value,
) -> Result<bool, PredicateError> {
    match predicate {
        NamedPredicate::IntBetween { min, max } => {
            let parsed = integer_value(value)?;
            Ok(*min <= parsed && parsed <= *max)
        }
    }
}

fn integer_value(value: &Value) -> Result<i64, PredicateError> {
    match value {
        Value::Number(number) => {
            if let Some(parsed) = number.as_i64() {
                return Ok(parsed);
            }
            if let Some(parsed) = number.as_f64() {
                return Ok(parsed.trunc() as i64);
            }
            Err(PredicateError::new(format!(
                "cannot read {number} as an integer"
            )))
        }
        Value::String(text) => text.trim().parse::<i64>().map_err(|error| {
            PredicateError::new(format!("cannot parse `{text}` as an integer: {error}"))
        }),
        other => Err(PredicateError::new(format!(
            "cannot read {} as an integer",
            value_type_name(other)
        ))),
    }
}

fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
