//! Check configuration loaded from TOML.
//!
//! Every section is optional; an empty file yields the defaults, which check
//! `vpc_shared_net_subnets` for a single subnet named `prod-subnet`.
//!
//! ```
//! use vpc_control::config::CheckConfig;
//!
//! let config = CheckConfig::from_toml_str(r#"
//!     [expectations]
//!     subnet_name = "staging-subnet"
//!
//!     [[sources]]
//!     type = "file"
//!     path = "attributes.yml"
//! "#).unwrap();
//!
//! assert_eq!(config.expectations.subnet_name, "staging-subnet");
//! assert_eq!(config.expectations.subnet_count, 1);
//! assert_eq!(config.sources.len(), 1);
//! ```

use crate::data::{AttributeStore, ChainStore, EnvStore, FileStore, TerraformStore};
use crate::data::terraform::DEFAULT_TERRAFORM_BINARY;
use crate::domain::AttributeKey;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const VPC_NAME_KEY: &str = "vpc_shared_net_prod_name";
pub const SUBNETS_KEY: &str = "vpc_shared_net_subnets";
pub const EXPECTED_SUBNET_COUNT: usize = 1;
pub const EXPECTED_SUBNET_NAME: &str = "prod-subnet";

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CheckConfig {
    pub attributes: AttributeKeys,
    pub expectations: Expectations,
    /// Attribute sources, consulted in order
    pub sources: Vec<SourceConfig>,
}

/// Keys the VPC control reads
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AttributeKeys {
    pub vpc_name: AttributeKey,
    pub subnets: AttributeKey,
}

impl Default for AttributeKeys {
    fn default() -> Self {
        Self {
            vpc_name: AttributeKey::new(VPC_NAME_KEY),
            subnets: AttributeKey::new(SUBNETS_KEY),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Expectations {
    pub subnet_count: usize,
    pub subnet_name: String,
}

impl Default for Expectations {
    fn default() -> Self {
        Self {
            subnet_count: EXPECTED_SUBNET_COUNT,
            subnet_name: EXPECTED_SUBNET_NAME.to_string(),
        }
    }
}

/// Where attribute values come from
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceConfig {
    File {
        path: PathBuf,
    },
    Env {
        prefix: String,
    },
    Terraform {
        dir: PathBuf,
        #[serde(default = "default_terraform_binary")]
        binary: PathBuf,
    },
}

fn default_terraform_binary() -> PathBuf {
    PathBuf::from(DEFAULT_TERRAFORM_BINARY)
}

impl SourceConfig {
    /// Builds the store. Attribute files are read here, so a bad file fails at startup.
    pub fn build(&self) -> Result<Box<dyn AttributeStore>, ConfigError> {
        let store: Box<dyn AttributeStore> = match self {
            Self::File { path } => Box::new(FileStore::load(path)?),
            Self::Env { prefix } => Box::new(EnvStore::with_prefix(prefix.clone())),
            Self::Terraform { dir, binary } => Box::new(TerraformStore::with_binary(binary.clone(), dir.clone())),
        };
        Ok(store)
    }
}

impl CheckConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads and validates configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|err| ConfigError::io(path, err))?;
        Self::from_toml_str(&contents)
    }

    /// Parses and validates configuration from a TOML string
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.attributes.vpc_name.is_empty() {
            return Err(ConfigError::Invalid("attributes.vpc_name must not be empty".to_string()));
        }
        if self.attributes.subnets.is_empty() {
            return Err(ConfigError::Invalid("attributes.subnets must not be empty".to_string()));
        }
        for source in &self.sources {
            if let SourceConfig::Env { prefix } = source
                && prefix.is_empty()
            {
                return Err(ConfigError::Invalid("env source prefix must not be empty".to_string()));
            }
        }
        Ok(())
    }

    /// Appends a source after the configured ones
    pub fn with_source(mut self, source: SourceConfig) -> Self {
        self.sources.push(source);
        self
    }

    /// Builds a chain over every configured source, in order
    pub fn build_store(&self) -> Result<ChainStore, ConfigError> {
        let mut chain = ChainStore::new();
        for source in &self.sources {
            chain.push(source.build()?);
        }
        Ok(chain)
    }
}
