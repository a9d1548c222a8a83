//! Map-backed attribute store for tests and embedding.

use crate::data::AttributeStore;
use crate::domain::AttributeKey;
use crate::error::ResolutionError;
use serde_json::Value;
use std::collections::BTreeMap;

/// Holds attribute values in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: BTreeMap<AttributeKey, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<AttributeKey>, value: Value) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<AttributeKey>, value: Value) {
        self.values.insert(key.into(), value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<BTreeMap<String, Value>> for MemoryStore {
    fn from(values: BTreeMap<String, Value>) -> Self {
        Self {
            values: values
                .into_iter()
                .map(|(key, value)| (AttributeKey::new(key), value))
                .collect(),
        }
    }
}

impl AttributeStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn resolve(&self, key: &AttributeKey) -> Result<Value, ResolutionError> {
        self.values
            .get(key)
            .cloned()
            .ok_or_else(|| ResolutionError::missing(key))
    }
}
