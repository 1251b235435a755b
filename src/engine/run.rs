use crate::domain::dataset::Dataset;
use crate::domain::expectation::ExpectationSuite;
use crate::domain::run::{ExpectationResult, RunIdentifier, RunStatistics, ValidationRun};
use crate::engine::evaluate::evaluate_expectation;

/// Default batch identifier: a deterministic fingerprint of the
/// dataset contents, so re-validating the same snapshot maps to the
/// same key component.
pub fn default_batch_id(dataset: &Dataset) -> String {
    format!("batch_{}", dataset.fingerprint())
}

/// Evaluates the whole suite in declaration order, one result per
/// expectation in the same order. A failing expectation never aborts
/// the remainder of the suite.
pub fn run_suite(
    suite: &ExpectationSuite,
    dataset: &Dataset,
    run_id: RunIdentifier,
    batch_id: String,
) -> ValidationRun {
    run_suite_with_observer(suite, dataset, run_id, batch_id, |_| {})
}

/// Like [`run_suite`], reporting each result to `observer` as it
/// completes. Drives the CLI's per-expectation progress lines.
pub fn run_suite_with_observer<F>(
    suite: &ExpectationSuite,
    dataset: &Dataset,
    run_id: RunIdentifier,
    batch_id: String,
    mut observer: F,
) -> ValidationRun
where
    F: FnMut(&ExpectationResult),
{
    let mut results = Vec::with_capacity(suite.expectations.len());
    for expectation in &suite.expectations {
        let result = evaluate_expectation(expectation, dataset);
        observer(&result);
        results.push(result);
    }

    let statistics = RunStatistics::from_results(&results);
    let success = statistics.unsuccessful_expectations == 0;
    ValidationRun {
        suite_name: suite.name.clone(),
        run_id,
        batch_id,
        success,
        results,
        statistics,
    }
}
