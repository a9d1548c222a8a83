//! Type-safe value objects for VPC attributes.
//!
//! Attribute values arrive as untyped JSON from whichever store supplied them.
//! The newtypes here give the pieces the check cares about a name:
//! - attribute keys used to look values up
//! - the VPC name and subnet names being compared
//! - subnet records, with any extra fields kept but not interpreted

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Key under which an attribute store holds a value
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeKey(String);

impl AttributeKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for AttributeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AttributeKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Name of the shared VPC network (e.g., "shared-net-prod")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VpcName(String);

impl VpcName {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VpcName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Subnet name (e.g., "prod-subnet")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubnetName(String);

impl SubnetName {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubnetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One element of the subnet sequence attribute.
///
/// Terraform network modules emit the name as `subnet_name`, hand-written
/// attribute files tend to use `name`; either is accepted. When both are
/// present `name` wins and `subnet_name` stays in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSubnetRecord")]
pub struct SubnetRecord {
    pub name: SubnetName,
    /// Remaining fields (region, ip range, flow logs...) are carried through untouched
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl SubnetRecord {
    pub fn new(name: SubnetName) -> Self {
        Self {
            name,
            extra: BTreeMap::new(),
        }
    }
}

/// Wire form of a subnet record before the name field is chosen
#[derive(Deserialize)]
struct RawSubnetRecord {
    #[serde(default)]
    name: Option<SubnetName>,
    #[serde(default)]
    subnet_name: Option<SubnetName>,
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

impl TryFrom<RawSubnetRecord> for SubnetRecord {
    type Error = String;

    fn try_from(raw: RawSubnetRecord) -> Result<Self, Self::Error> {
        let RawSubnetRecord {
            name,
            subnet_name,
            mut extra,
        } = raw;

        match (name, subnet_name) {
            (Some(name), Some(subnet_name)) => {
                extra.insert("subnet_name".to_string(), Value::String(subnet_name.as_str().to_string()));
                Ok(Self { name, extra })
            }
            (Some(name), None) | (None, Some(name)) => Ok(Self { name, extra }),
            (None, None) => Err("missing field `name` or `subnet_name`".to_string()),
        }
    }
}

/// Short description of a JSON value's shape, used in incompatibility errors
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}
