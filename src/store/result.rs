use std::fmt;
use std::fs::File;
use std::path::PathBuf;

use crate::domain::run::ValidationRun;
use crate::store::{StoreError, validate_component, write_json_atomic};

/// Composite key identifying one persisted validation run: the
/// (suite, run, batch) triple. Every component is validated so the key
/// maps onto a fixed store layout.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct RunKey {
    pub suite_name: String,
    pub run_name: String,
    pub batch_id: String,
}

impl RunKey {
    pub fn new(suite_name: &str, run_name: &str, batch_id: &str) -> Result<Self, StoreError> {
        validate_component("suite", suite_name)?;
        validate_component("run", run_name)?;
        validate_component("batch", batch_id)?;
        Ok(Self {
            suite_name: suite_name.to_string(),
            run_name: run_name.to_string(),
            batch_id: batch_id.to_string(),
        })
    }

    pub fn to_tuple(&self) -> (&str, &str, &str) {
        (&self.suite_name, &self.run_name, &self.batch_id)
    }
}

impl fmt::Display for RunKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.suite_name, self.run_name, self.batch_id)
    }
}

/// File-backed store of completed validation runs:
/// `<root>/validations/<suite>/<run>/<batch>.json`.
#[derive(Debug, Clone)]
pub struct ValidationResultStore {
    root: PathBuf,
}

impl ValidationResultStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn set(&self, key: &RunKey, run: &ValidationRun) -> Result<(), StoreError> {
        write_json_atomic(&self.run_path(key), run)
    }

    pub fn get(&self, key: &RunKey) -> Result<ValidationRun, StoreError> {
        let path = self.run_path(key);
        if !path.exists() {
            return Err(StoreError::RunNotFound {
                key: key.to_string(),
            });
        }
        let file = File::open(path)?;
        Ok(serde_json::from_reader(file)?)
    }

    /// Lists keys of all persisted runs in lexicographic
    /// (suite, run, batch) order. Entries that do not match the store
    /// layout are skipped.
    pub fn list(&self) -> Result<Vec<RunKey>, StoreError> {
        let mut keys = Vec::new();
        let validations = self.validations_dir();
        if !validations.exists() {
            return Ok(keys);
        }

        for suite_entry in sorted_entries(&validations)? {
            let Some(suite_name) = dir_name(&suite_entry) else {
                continue;
            };
            for run_entry in sorted_entries(&suite_entry)? {
                let Some(run_name) = dir_name(&run_entry) else {
                    continue;
                };
                for batch_entry in sorted_entries(&run_entry)? {
                    let Some(batch_id) = json_stem(&batch_entry) else {
                        continue;
                    };
                    if let Ok(key) = RunKey::new(&suite_name, &run_name, &batch_id) {
                        keys.push(key);
                    }
                }
            }
        }

        keys.sort();
        Ok(keys)
    }

    pub fn list_for_suite(&self, suite_name: &str) -> Result<Vec<RunKey>, StoreError> {
        validate_component("suite", suite_name)?;
        Ok(self
            .list()?
            .into_iter()
            .filter(|key| key.suite_name == suite_name)
            .collect())
    }

    fn validations_dir(&self) -> PathBuf {
        self.root.join("validations")
    }

    fn run_path(&self, key: &RunKey) -> PathBuf {
        self.validations_dir()
            .join(&key.suite_name)
            .join(&key.run_name)
            .join(format!("{}.json", key.batch_id))
    }
}

fn sorted_entries(dir: &PathBuf) -> Result<Vec<PathBuf>, StoreError> {
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .map(|entry| entry.path())
        .collect();
    entries.sort();
    Ok(entries)
}

fn dir_name(path: &PathBuf) -> Option<String> {
    if !path.is_dir() {
        return None;
    }
    path.file_name().map(|name| name.to_string_lossy().into_owned())
}

fn json_stem(path: &PathBuf) -> Option<String> {
    if !path.is_file() || path.extension().is_none_or(|ext| ext != "json") {
        return None;
    }
    path.file_stem().map(|stem| stem.to_string_lossy().into_owned())
}
