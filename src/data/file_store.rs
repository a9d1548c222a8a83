//! Attribute files: a top-level mapping from attribute key to value.
//!
//! YAML is the usual format for compliance-runner attribute files. Files
//! ending in `.json` are parsed as JSON; everything else as YAML.

use crate::data::AttributeStore;
use crate::domain::AttributeKey;
use crate::error::{ConfigError, ResolutionError};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Attribute values loaded from a file at construction time
#[derive(Debug, Clone)]
pub struct FileStore {
    name: String,
    values: BTreeMap<String, Value>,
}

impl FileStore {
    /// Reads and parses an attribute file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|err| ConfigError::io(path, err))?;
        let name = path.display().to_string();

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let store = if is_json {
            Self::from_json_str(&content)?
        } else {
            Self::from_yaml_str(&content)?
        };

        tracing::debug!(file = %name, attributes = store.values.len(), "loaded attribute file");
        Ok(store.named(name))
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        // An empty YAML document parses as null rather than an empty mapping
        if content.trim().is_empty() {
            return Ok(Self::from_values(BTreeMap::new()));
        }
        let values: BTreeMap<String, Value> = serde_yaml::from_str(content)?;
        Ok(Self::from_values(values))
    }

    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let values: BTreeMap<String, Value> = serde_json::from_str(content)?;
        Ok(Self::from_values(values))
    }

    fn from_values(values: BTreeMap<String, Value>) -> Self {
        Self {
            name: "attribute file".to_string(),
            values,
        }
    }

    fn named(mut self, name: String) -> Self {
        self.name = name;
        self
    }

    /// Keys present in the file, sorted
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

impl AttributeStore for FileStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn resolve(&self, key: &AttributeKey) -> Result<Value, ResolutionError> {
        self.values
            .get(key.as_str())
            .cloned()
            .ok_or_else(|| ResolutionError::missing(key))
    }
}
