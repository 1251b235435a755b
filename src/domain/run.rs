use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::expectation::Expectation;
use crate::util::time::{format_rfc3339_utc, format_run_name};

/// Identifies one validation run. The run name embeds a UTC timestamp
/// and a caller-chosen label: `YYYYMMDD-HHMMSS-<label>`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunIdentifier {
    pub run_name: String,
    pub run_time: String,
}

impl RunIdentifier {
    pub fn generate(label: &str) -> Self {
        Self::at(Utc::now(), label)
    }

    pub fn at(now: DateTime<Utc>, label: &str) -> Self {
        Self {
            run_name: format_run_name(now, label),
            run_time: format_rfc3339_utc(now),
        }
    }
}

/// Observed statistics recorded alongside each expectation outcome so a
/// result is independently informative.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ObservedStats {
    pub element_count: usize,
    pub unexpected_count: usize,
    pub unexpected_percent: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unexpected_samples: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_value: Option<Value>,
}

/// Outcome of evaluating one expectation against one dataset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExpectationResult {
    pub expectation: Expectation,
    pub success: bool,
    pub observed: ObservedStats,
}

/// Aggregate counters over one run.
/// Invariant: `successful + unsuccessful == evaluated`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunStatistics {
    pub evaluated_expectations: usize,
    pub successful_expectations: usize,
    pub unsuccessful_expectations: usize,
    pub success_percent: f64,
}

impl RunStatistics {
    pub fn from_results(results: &[ExpectationResult]) -> Self {
        let evaluated = results.len();
        let successful = results.iter().filter(|result| result.success).count();
        let success_percent = if evaluated == 0 {
            100.0
        } else {
            100.0 * successful as f64 / evaluated as f64
        };
        Self {
            evaluated_expectations: evaluated,
            successful_expectations: successful,
            unsuccessful_expectations: evaluated - successful,
            success_percent,
        }
    }
}

/// One execution of a suite against one dataset snapshot: ordered
/// results plus the aggregate statistics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationRun {
    pub suite_name: String,
    pub run_id: RunIdentifier,
    pub batch_id: String,
    pub success: bool,
    pub results: Vec<ExpectationResult>,
    pub statistics: RunStatistics,
}
