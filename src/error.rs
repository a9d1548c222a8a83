//! Error types shared by attribute stores, controls and configuration.

use crate::domain::AttributeKey;
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to turn an attribute key into a usable value.
///
/// Kept apart from assertion failures: a resolution error means the check
/// could not be set up, not that the infrastructure is non-compliant.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolutionError {
    #[error("attribute `{key}` was not provided by any attribute store")]
    Missing { key: AttributeKey },

    #[error("attribute `{key}` should be {expected}, found {found}")]
    Incompatible {
        key: AttributeKey,
        expected: String,
        found: String,
    },

    #[error("attribute `{key}` could not be read from {source_name}: {message}")]
    Source {
        key: AttributeKey,
        source_name: String,
        message: String,
    },
}

impl ResolutionError {
    pub fn missing(key: &AttributeKey) -> Self {
        Self::Missing { key: key.clone() }
    }

    pub fn incompatible(key: &AttributeKey, expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::Incompatible {
            key: key.clone(),
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub fn source_failure(key: &AttributeKey, source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Source {
            key: key.clone(),
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// The attribute this error is about
    pub fn key(&self) -> &AttributeKey {
        match self {
            Self::Missing { key } | Self::Incompatible { key, .. } | Self::Source { key, .. } => key,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing { .. })
    }
}

/// Configuration and attribute-file loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
