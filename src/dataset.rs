//! Stored dataset definitions and the repository that serves them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identifier of a stored dataset.
pub type DatasetId = i64;

/// Runtime parameter values keyed by name.
pub type Params = Map<String, Value>;

/// Error type for dataset lookups.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("dataset repository unavailable: {0}")]
    Unavailable(String),

    #[error("invalid dataset definition {id}: {message}")]
    Invalid { id: DatasetId, message: String },
}

/// Declared parameter of a dataset template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    pub name: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub default: Option<Value>,
}

/// A named, reusable SQL template bound to a data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetDefinition {
    pub id: DatasetId,
    #[serde(default)]
    pub name: String,
    /// Name of the data source connection the template runs against.
    #[serde(alias = "datasource_name")]
    pub datasource: String,
    /// Raw SQL template with `{{param:KEY}}` / `{{dataset:ID}}` placeholders.
    #[serde(alias = "sql_script")]
    pub sql: String,
    /// Declared parameters.
    #[serde(default, alias = "params_config")]
    pub params: Vec<ParamSpec>,
}

impl DatasetDefinition {
    /// Merge declared parameter defaults under caller-supplied values.
    pub fn effective_params(&self, given: &Params) -> Params {
        let mut merged = Params::new();
        for spec in &self.params {
            if let Some(default) = &spec.default {
                merged.insert(spec.name.clone(), default.clone());
            }
        }
        for (key, value) in given {
            merged.insert(key.clone(), value.clone());
        }
        merged
    }
}

/// Source of dataset definitions.
pub trait DatasetRepository: Send + Sync {
    /// Look up a dataset; `Ok(None)` when the id is unknown.
    fn dataset(&self, id: DatasetId) -> Result<Option<DatasetDefinition>, DatasetError>;
}

/// Repository backed by a map, used by the CLI and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    datasets: HashMap<DatasetId, DatasetDefinition>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, dataset: DatasetDefinition) {
        self.datasets.insert(dataset.id, dataset);
    }

    pub fn with(mut self, dataset: DatasetDefinition) -> Self {
        self.insert(dataset);
        self
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }
}

impl FromIterator<DatasetDefinition> for InMemoryRepository {
    fn from_iter<I: IntoIterator<Item = DatasetDefinition>>(iter: I) -> Self {
        let mut repo = Self::new();
        for dataset in iter {
            repo.insert(dataset);
        }
        repo
    }
}

impl DatasetRepository for InMemoryRepository {
    fn dataset(&self, id: DatasetId) -> Result<Option<DatasetDefinition>, DatasetError> {
        Ok(self.datasets.get(&id).cloned())
    }
}
