//! Named groups of assertions.

use crate::domain::{Assertion, AssertionResult, AttributeKey, ResolvedAttributes};
use crate::error::ResolutionError;

/// Shape check run on a declared attribute once it has resolved
pub type AttributeCheck = fn(&ResolvedAttributes, &AttributeKey) -> Result<(), ResolutionError>;

/// A control: an id, a group title, the attributes it reads and its assertions.
///
/// Attributes are declared up front so the harness can resolve them all
/// before the first assertion runs.
#[derive(Debug)]
pub struct Control {
    id: String,
    title: String,
    attributes: Vec<AttributeKey>,
    checks: Vec<(AttributeKey, AttributeCheck)>,
    assertions: Vec<Assertion>,
}

impl Control {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            attributes: Vec::new(),
            checks: Vec::new(),
            assertions: Vec::new(),
        }
    }

    /// Declares an attribute the control reads. Duplicates are ignored.
    pub fn attribute(mut self, key: AttributeKey) -> Self {
        if !self.attributes.contains(&key) {
            self.attributes.push(key);
        }
        self
    }

    /// Declares an attribute whose value must pass `check` during setup
    pub fn checked_attribute(mut self, key: AttributeKey, check: AttributeCheck) -> Self {
        self.checks.push((key.clone(), check));
        self.attribute(key)
    }

    pub fn assertion(mut self, assertion: Assertion) -> Self {
        self.assertions.push(assertion);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn attributes(&self) -> &[AttributeKey] {
        &self.attributes
    }

    pub fn assertions(&self) -> &[Assertion] {
        &self.assertions
    }

    /// Applies attribute checks, replacing each value that fails with its error.
    /// Lookups that already failed are left as they are.
    pub fn check_attributes(&self, attributes: &mut ResolvedAttributes) {
        for (key, check) in &self.checks {
            if attributes.value(key).is_err() {
                continue;
            }
            if let Err(err) = check(attributes, key) {
                attributes.insert(key.clone(), Err(err));
            }
        }
    }

    /// Runs every assertion in declaration order; a failure never stops the rest
    pub fn evaluate(&self, attributes: &ResolvedAttributes) -> Vec<AssertionResult> {
        self.assertions
            .iter()
            .map(|assertion| assertion.evaluate(attributes))
            .collect()
    }
}
