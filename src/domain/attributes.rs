//! Resolved attribute snapshot handed to assertions.

use crate::domain::{AttributeKey, SubnetRecord, VpcName, value_kind};
use crate::error::ResolutionError;
use serde_json::Value;
use std::collections::BTreeMap;

/// Outcome of resolving every attribute a control declared.
///
/// Built once per control before any assertion runs; assertions only read it.
/// A failed lookup stays recorded so each dependent assertion can report it.
#[derive(Debug, Clone, Default)]
pub struct ResolvedAttributes {
    entries: BTreeMap<AttributeKey, Result<Value, ResolutionError>>,
}

impl ResolvedAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: AttributeKey, value: Result<Value, ResolutionError>) {
        self.entries.insert(key, value);
    }

    /// Raw value for a key. Keys never resolved count as missing.
    pub fn value(&self, key: &AttributeKey) -> Result<&Value, ResolutionError> {
        match self.entries.get(key) {
            Some(Ok(value)) => Ok(value),
            Some(Err(err)) => Err(err.clone()),
            None => Err(ResolutionError::missing(key)),
        }
    }

    /// Value that must be a string
    pub fn string(&self, key: &AttributeKey) -> Result<&str, ResolutionError> {
        let value = self.value(key)?;
        value
            .as_str()
            .ok_or_else(|| ResolutionError::incompatible(key, "a string", value_kind(value)))
    }

    pub fn vpc_name(&self, key: &AttributeKey) -> Result<VpcName, ResolutionError> {
        self.string(key).map(VpcName::new)
    }

    /// Value that must be a sequence; elements are not inspected
    pub fn sequence(&self, key: &AttributeKey) -> Result<&[Value], ResolutionError> {
        let value = self.value(key)?;
        match value {
            Value::Array(items) => Ok(items.as_slice()),
            other => Err(ResolutionError::incompatible(key, "a sequence", value_kind(other))),
        }
    }

    /// Value that must be a sequence of subnet records, in store order
    pub fn subnets(&self, key: &AttributeKey) -> Result<Vec<SubnetRecord>, ResolutionError> {
        self.sequence(key)?
            .iter()
            .enumerate()
            .map(|(index, item)| {
                serde_json::from_value(item.clone()).map_err(|err| {
                    ResolutionError::incompatible(
                        key,
                        "a sequence of subnet records with a string name",
                        format!("element {}: {}", index, err),
                    )
                })
            })
            .collect()
    }

    /// Values that resolved successfully
    pub fn resolved(&self) -> impl Iterator<Item = (&AttributeKey, &Value)> {
        self.entries
            .iter()
            .filter_map(|(key, value)| value.as_ref().ok().map(|v| (key, v)))
    }

    /// Lookups that failed, in key order
    pub fn errors(&self) -> impl Iterator<Item = &ResolutionError> {
        self.entries.values().filter_map(|value| value.as_ref().err())
    }
}
