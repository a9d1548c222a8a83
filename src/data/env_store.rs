//! Attribute values from environment variables.
//!
//! `vpc_shared_net_subnets` with prefix `ATTR_` is read from
//! `ATTR_VPC_SHARED_NET_SUBNETS`. Values are parsed as JSON so sequences and
//! records can be passed; anything that is not valid JSON is taken as a
//! plain string.

use crate::data::AttributeStore;
use crate::domain::AttributeKey;
use crate::error::ResolutionError;
use serde_json::Value;
use std::collections::BTreeMap;
use std::env::VarError;

/// Configuration for the environment store.
///
/// `overrides`, when present, replaces the process environment entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvStoreConfig {
    pub prefix: String,
    pub overrides: Option<BTreeMap<String, String>>,
}

pub struct EnvStore {
    config: EnvStoreConfig,
    name: String,
}

impl EnvStore {
    pub fn new(config: EnvStoreConfig) -> Self {
        let name = format!("environment ({}*)", config.prefix);
        Self { config, name }
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self::new(EnvStoreConfig {
            prefix: prefix.into(),
            overrides: None,
        })
    }

    /// Environment variable name that holds `key`
    pub fn variable_name(&self, key: &AttributeKey) -> String {
        format!("{}{}", self.config.prefix, key.as_str().to_uppercase())
    }
}

impl AttributeStore for EnvStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn resolve(&self, key: &AttributeKey) -> Result<Value, ResolutionError> {
        let variable = self.variable_name(key);

        let raw = match &self.config.overrides {
            Some(overrides) => overrides
                .get(&variable)
                .cloned()
                .ok_or_else(|| ResolutionError::missing(key))?,
            None => match std::env::var(&variable) {
                Ok(raw) => raw,
                Err(VarError::NotPresent) => return Err(ResolutionError::missing(key)),
                Err(VarError::NotUnicode(_)) => {
                    return Err(ResolutionError::source_failure(
                        key,
                        &self.name,
                        format!("{} is not valid unicode", variable),
                    ));
                }
            },
        };

        Ok(parse_value(raw))
    }
}

/// JSON if it parses, otherwise the raw string
fn parse_value(raw: String) -> Value {
    serde_json::from_str(&raw).unwrap_or(Value::String(raw))
}
