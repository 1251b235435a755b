use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::domain::error::SuiteError;
use crate::util::num::compare_numbers;

fn default_mostly() -> f64 {
    1.0
}

/// A single named, parameterized assertion over a dataset or one of its
/// columns. Immutable once declared.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expectation {
    TableColumnCountEqual {
        value: usize,
    },
    TableRowCountBetween {
        #[serde(default)]
        min: Option<usize>,
        #[serde(default)]
        max: Option<usize>,
    },
    ColumnValuesNotNull {
        column: String,
        #[serde(default = "default_mostly")]
        mostly: f64,
    },
    ColumnValuesUnique {
        column: String,
    },
    ColumnValuesOfType {
        column: String,
        value_type: ValueType,
    },
    ColumnValuesMatchRegex {
        column: String,
        pattern: String,
        #[serde(default = "default_mostly")]
        mostly: f64,
    },
    ColumnValuesMatchDateFormat {
        column: String,
        format: String,
        #[serde(default = "default_mostly")]
        mostly: f64,
    },
    ColumnValuesBetween {
        column: String,
        #[serde(default)]
        min: Option<Number>,
        #[serde(default)]
        max: Option<Number>,
        #[serde(default = "default_mostly")]
        mostly: f64,
    },
    ColumnMeanBetween {
        column: String,
        min: f64,
        max: f64,
    },
    ColumnValuesSatisfy {
        column: String,
        predicate: NamedPredicate,
        #[serde(default = "default_mostly")]
        mostly: f64,
    },
}

impl Expectation {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::TableColumnCountEqual { .. } => "table_column_count_equal",
            Self::TableRowCountBetween { .. } => "table_row_count_between",
            Self::ColumnValuesNotNull { .. } => "column_values_not_null",
            Self::ColumnValuesUnique { .. } => "column_values_unique",
            Self::ColumnValuesOfType { .. } => "column_values_of_type",
            Self::ColumnValuesMatchRegex { .. } => "column_values_match_regex",
            Self::ColumnValuesMatchDateFormat { .. } => "column_values_match_date_format",
            Self::ColumnValuesBetween { .. } => "column_values_between",
            Self::ColumnMeanBetween { .. } => "column_mean_between",
            Self::ColumnValuesSatisfy { .. } => "column_values_satisfy",
        }
    }

    pub fn column(&self) -> Option<&str> {
        match self {
            Self::TableColumnCountEqual { .. } | Self::TableRowCountBetween { .. } => None,
            Self::ColumnValuesNotNull { column, .. }
            | Self::ColumnValuesUnique { column }
            | Self::ColumnValuesOfType { column, .. }
            | Self::ColumnValuesMatchRegex { column, .. }
            | Self::ColumnValuesMatchDateFormat { column, .. }
            | Self::ColumnValuesBetween { column, .. }
            | Self::ColumnMeanBetween { column, .. }
            | Self::ColumnValuesSatisfy { column, .. } => Some(column),
        }
    }

    /// One-line summary for progress output.
    pub fn describe(&self) -> String {
        match self {
            Self::ColumnValuesSatisfy {
                column, predicate, ..
            } => format!(
                "{} column={column} predicate={}",
                self.kind_name(),
                predicate.describe()
            ),
            _ => match self.column() {
                Some(column) => format!("{} column={column}", self.kind_name()),
                None => self.kind_name().to_string(),
            },
        }
    }
}

/// Expected scalar type for `column_values_of_type`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    String,
    Number,
    Integer,
    Boolean,
    Null,
}

impl ValueType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Null => "null",
        }
    }

    pub fn matches(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
            Self::Integer => value.as_i64().is_some() || value.as_u64().is_some(),
            Self::Boolean => value.is_boolean(),
            Self::Null => value.is_null(),
        }
    }
}

/// Serializable per-row rule for `column_values_satisfy`. Each variant
/// names one registered predicate; evaluation failures fail the row,
/// never the run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum NamedPredicate {
    /// Parse the value as an integer, then check `min <= n <= max`.
    /// A value that cannot be read as an integer errors, which counts
    /// as a failing row.
    IntBetween { min: i64, max: i64 },
}

impl NamedPredicate {
    pub fn describe(&self) -> String {
        match self {
            Self::IntBetween { min, max } => format!("int_between({min}, {max})"),
        }
    }
}

/// A named, ordered collection of expectations. Expectations may be
/// appended across revisions but existing entries are not mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ExpectationSuite {
    pub name: String,
    #[serde(default)]
    pub expectations: Vec<Expectation>,
}

/// Rejects malformed suites up front: empty names, out-of-range
/// `mostly`, inverted bounds, and uncompilable regexes.
pub fn validate_suite(suite: &ExpectationSuite) -> Result<(), SuiteError> {
    if suite.name.trim().is_empty() {
        return Err(SuiteError::EmptyName);
    }

    for (index, expectation) in suite.expectations.iter().enumerate() {
        validate_expectation(expectation).map_err(|message| SuiteError::InvalidExpectation {
            index,
            kind: expectation.kind_name(),
            message,
        })?;
    }

    Ok(())
}

fn validate_expectation(expectation: &Expectation) -> Result<(), String> {
    if expectation.column().is_some_and(str::is_empty) {
        return Err("column name must not be empty".to_string());
    }

    match expectation {
        Expectation::TableRowCountBetween {
            min: Some(min),
            max: Some(max),
        } if min > max => Err("min must be <= max".to_string()),
        Expectation::ColumnValuesBetween {
            min: Some(min),
            max: Some(max),
            mostly,
            ..
        } => {
            if compare_numbers(min, max) == std::cmp::Ordering::Greater {
                return Err("min must be <= max".to_string());
            }
            validate_mostly(*mostly)
        }
        Expectation::ColumnValuesBetween { mostly, .. } => validate_mostly(*mostly),
        Expectation::ColumnMeanBetween { min, max, .. } if min > max => {
            Err("min must be <= max".to_string())
        }
        Expectation::ColumnValuesMatchRegex {
            pattern, mostly, ..
        } => {
            regex::Regex::new(pattern).map_err(|error| format!("invalid pattern: {error}"))?;
            validate_mostly(*mostly)
        }
        Expectation::ColumnValuesMatchDateFormat { format, mostly, .. } => {
            if format.is_empty() {
                return Err("date format must not be empty".to_string());
            }
            validate_mostly(*mostly)
        }
        Expectation::ColumnValuesNotNull { mostly, .. } => validate_mostly(*mostly),
        Expectation::ColumnValuesSatisfy {
            predicate, mostly, ..
        } => {
            let NamedPredicate::IntBetween { min, max } = predicate;
            if min > max {
                return Err("predicate min must be <= max".to_string());
            }
            validate_mostly(*mostly)
        }
        _ => Ok(()),
    }
}

fn validate_mostly(mostly: f64) -> Result<(), String> {
    if (0.0..=1.0).contains(&mostly) {
        Ok(())
    } else {
        Err(format!("mostly must be within [0.0, 1.0], got {mostly}"))
    }
}
