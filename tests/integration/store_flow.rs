use chrono::{TimeZone, Utc};
use serde_json::json;
use tempfile::tempdir;
use veriq::domain::dataset::Dataset;
use veriq::domain::expectation::{Expectation, ExpectationSuite};
use veriq::domain::run::RunIdentifier;
use veriq::engine::run::{default_batch_id, run_suite};
use veriq::store::{RunKey, StoreError, SuiteStore, ValidationResultStore};

fn sample_suite() -> ExpectationSuite {
    ExpectationSuite {
        name: "customers".to_string(),
        expectations: vec![Expectation::ColumnValuesUnique {
            column: "customer_id".to_string(),
        }],
    }
}

fn sample_dataset() -> Dataset {
    Dataset::from_rows(&[
        json!({"customer_id": "1"}),
        json!({"customer_id": "2"}),
    ])
}

#[test]
fn ensure_registers_once_then_reuses_the_stored_suite() {
    let dir = tempdir().expect("tempdir");
    let store = SuiteStore::new(dir.path());
    let suite = sample_suite();

    let (_, created) = store.ensure(&suite).expect("first ensure");
    assert!(created);

    let mut changed = suite.clone();
    changed.expectations.push(Expectation::TableColumnCountEqual { value: 1 });
    let (stored, created) = store.ensure(&changed).expect("second ensure");
    assert!(!created);
    assert_eq!(stored.expectations.len(), 1);
}

#[test]
fn completed_run_round_trips_through_the_result_store() {
    let dir = tempdir().expect("tempdir");
    let suite = sample_suite();
    let dataset = sample_dataset();
    let run_id = RunIdentifier::at(
        Utc.with_ymd_and_hms(2026, 8, 23, 16, 0, 0).unwrap(),
        "flow",
    );
    let batch_id = default_batch_id(&dataset);
    let run = run_suite(&suite, &dataset, run_id, batch_id.clone());

    let store = ValidationResultStore::new(dir.path());
    let key = RunKey::new(&run.suite_name, &run.run_id.run_name, &batch_id).expect("key");
    store.set(&key, &run).expect("store run");

    let loaded = store.get(&key).expect("load run");
    assert_eq!(loaded, run);
    assert_eq!(loaded.run_id.run_name, "20260823-160000-flow");
    assert_eq!(loaded.run_id.run_time, "2026-08-23T16:00:00Z");
}

#[test]
fn same_snapshot_yields_the_same_batch_id() {
    let first = default_batch_id(&sample_dataset());
    let second = default_batch_id(&sample_dataset());
    assert_eq!(first, second);

    let other = default_batch_id(&Dataset::from_rows(&[json!({"customer_id": "3"})]));
    assert_ne!(first, other);
}

#[test]
fn listing_spans_suites_and_respects_the_filter() {
    let dir = tempdir().expect("tempdir");
    let store = ValidationResultStore::new(dir.path());
    let dataset = sample_dataset();

    for (name, label) in [("customers", "a"), ("orders", "b"), ("customers", "c")] {
        let suite = ExpectationSuite {
            name: name.to_string(),
            expectations: vec![Expectation::TableColumnCountEqual { value: 1 }],
        };
        let run_id = RunIdentifier::at(
            Utc.with_ymd_and_hms(2026, 8, 23, 16, 30, 0).unwrap(),
            label,
        );
        let run = run_suite(&suite, &dataset, run_id, "batch_fixed".to_string());
        let key = RunKey::new(&run.suite_name, &run.run_id.run_name, &run.batch_id).expect("key");
        store.set(&key, &run).expect("store run");
    }

    let all = store.list().expect("list all");
    assert_eq!(all.len(), 3);
    assert!(all.windows(2).all(|pair| pair[0] <= pair[1]));

    let filtered = store.list_for_suite("customers").expect("filtered");
    assert_eq!(filtered.len(), 2);
    assert!(filtered.iter().all(|key| key.suite_name == "customers"));
}

#[test]
fn path_escaping_names_never_reach_the_filesystem() {
    let error = RunKey::new("../outside", "run", "batch").expect_err("must reject");
    assert!(matches!(error, StoreError::InvalidName { .. }));

    let dir = tempdir().expect("tempdir");
    let store = SuiteStore::new(dir.path());
    let suite = ExpectationSuite {
        name: "nested/name".to_string(),
        expectations: vec![],
    };
    let error = store.add(&suite).expect_err("must reject");
    assert!(matches!(error, StoreError::InvalidName { .. }));
}
