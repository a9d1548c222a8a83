//! Attribute values from `terraform output -json`.
//!
//! Output format: `{"<name>": {"sensitive": false, "type": ..., "value": ...}}`
//! The command runs at most once per store; the parsed outputs (or the
//! failure) are reused for every key.

use crate::data::AttributeStore;
use crate::domain::AttributeKey;
use crate::error::ResolutionError;
use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::OnceLock;

pub const DEFAULT_TERRAFORM_BINARY: &str = "terraform";

/// One entry of `terraform output -json`
#[derive(Debug, Deserialize)]
struct TerraformOutput {
    value: Value,
    #[serde(default)]
    sensitive: bool,
}

pub struct TerraformStore {
    binary: PathBuf,
    working_dir: PathBuf,
    name: String,
    outputs: OnceLock<Result<BTreeMap<String, Value>, String>>,
}

impl TerraformStore {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self::with_binary(DEFAULT_TERRAFORM_BINARY, working_dir)
    }

    pub fn with_binary(binary: impl Into<PathBuf>, working_dir: impl Into<PathBuf>) -> Self {
        let working_dir = working_dir.into();
        let name = format!("terraform outputs ({})", working_dir.display());
        Self {
            binary: binary.into(),
            working_dir,
            name,
            outputs: OnceLock::new(),
        }
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    fn outputs(&self) -> &Result<BTreeMap<String, Value>, String> {
        self.outputs.get_or_init(|| {
            fetch_outputs(&self.binary, &self.working_dir).map_err(|err| format!("{:#}", err))
        })
    }
}

impl AttributeStore for TerraformStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn resolve(&self, key: &AttributeKey) -> Result<Value, ResolutionError> {
        match self.outputs() {
            Ok(outputs) => outputs
                .get(key.as_str())
                .cloned()
                .ok_or_else(|| ResolutionError::missing(key)),
            Err(message) => Err(ResolutionError::source_failure(key, &self.name, message.clone())),
        }
    }
}

/// Runs `terraform output -json` in `working_dir` and parses the result
fn fetch_outputs(binary: &Path, working_dir: &Path) -> Result<BTreeMap<String, Value>> {
    tracing::debug!(binary = %binary.display(), dir = %working_dir.display(), "reading terraform outputs");

    let output = Command::new(binary)
        .args(["output", "-json"])
        .current_dir(working_dir)
        .stdin(Stdio::null())
        .output()
        .with_context(|| format!("Failed to run {}", binary.display()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!("{} exited with {}: {}", binary.display(), output.status, stderr.trim());
    }

    let stdout = String::from_utf8(output.stdout).context("Terraform output is not valid UTF-8")?;
    parse_outputs(&stdout)
}

/// Parses the JSON document printed by `terraform output -json`
pub fn parse_outputs(json: &str) -> Result<BTreeMap<String, Value>> {
    let outputs: BTreeMap<String, TerraformOutput> =
        serde_json::from_str(json).context("Invalid terraform output JSON")?;

    Ok(outputs
        .into_iter()
        .map(|(name, output)| {
            if output.sensitive {
                tracing::debug!(output = %name, "using sensitive terraform output");
            }
            (name, output.value)
        })
        .collect())
}
