use std::fs::File;
use std::path::{Path, PathBuf};

use crate::domain::expectation::ExpectationSuite;
use crate::store::{StoreError, validate_component, write_json_atomic};

/// File-backed store of named expectation suites:
/// `<root>/suites/<name>.json`.
#[derive(Debug, Clone)]
pub struct SuiteStore {
    root: PathBuf,
}

impl SuiteStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn get(&self, name: &str) -> Result<ExpectationSuite, StoreError> {
        let path = self.suite_path(name)?;
        if !path.exists() {
            return Err(StoreError::SuiteNotFound {
                name: name.to_string(),
            });
        }
        read_suite(&path)
    }

    /// Stores a new suite; errors when a suite of that name exists.
    pub fn add(&self, suite: &ExpectationSuite) -> Result<ExpectationSuite, StoreError> {
        let path = self.suite_path(&suite.name)?;
        if path.exists() {
            return Err(StoreError::SuiteExists {
                name: suite.name.clone(),
            });
        }
        write_json_atomic(&path, suite)?;
        Ok(suite.clone())
    }

    pub fn add_or_update(&self, suite: &ExpectationSuite) -> Result<ExpectationSuite, StoreError> {
        let path = self.suite_path(&suite.name)?;
        write_json_atomic(&path, suite)?;
        Ok(suite.clone())
    }

    /// Idempotent create-if-absent-else-fetch. Returns the stored
    /// suite and whether this call created it.
    pub fn ensure(&self, suite: &ExpectationSuite) -> Result<(ExpectationSuite, bool), StoreError> {
        let path = self.suite_path(&suite.name)?;
        if path.exists() {
            return Ok((read_suite(&path)?, false));
        }
        write_json_atomic(&path, suite)?;
        Ok((suite.clone(), true))
    }

    fn suite_path(&self, name: &str) -> Result<PathBuf, StoreError> {
        validate_component("suite", name)?;
        Ok(self.root.join("suites").join(format!("{name}.json")))
    }
}

fn read_suite(path: &Path) -> Result<ExpectationSuite, StoreError> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(file)?)
}
