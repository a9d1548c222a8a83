//! Titled predicates evaluated against resolved attributes.

use crate::domain::ResolvedAttributes;
use crate::error::ResolutionError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Derives the value under test from the resolved attributes
pub type Derivation = Box<dyn Fn(&ResolvedAttributes) -> Result<Value, ResolutionError> + Send + Sync>;

/// Comparison applied to a derived value
#[derive(Debug, Clone, PartialEq)]
pub enum Expectation {
    Equals(Value),
}

impl Expectation {
    pub fn matches(&self, actual: &Value) -> bool {
        match self {
            Self::Equals(expected) => expected == actual,
        }
    }

    pub fn expected(&self) -> &Value {
        match self {
            Self::Equals(expected) => expected,
        }
    }
}

/// A single titled check, e.g. "should have only one subnet"
pub struct Assertion {
    title: String,
    derive: Derivation,
    expectation: Expectation,
}

impl Assertion {
    pub fn new<F>(title: impl Into<String>, derive: F, expectation: Expectation) -> Self
    where
        F: Fn(&ResolvedAttributes) -> Result<Value, ResolutionError> + Send + Sync + 'static,
    {
        Self {
            title: title.into(),
            derive: Box::new(derive),
            expectation,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn expectation(&self) -> &Expectation {
        &self.expectation
    }

    /// Evaluates the predicate. Never fails: resolution problems become an errored result.
    pub fn evaluate(&self, attributes: &ResolvedAttributes) -> AssertionResult {
        match (self.derive)(attributes) {
            Ok(actual) if self.expectation.matches(&actual) => AssertionResult::passed(&self.title),
            Ok(actual) => AssertionResult::failed(&self.title, self.expectation.expected().clone(), actual),
            Err(err) => AssertionResult::errored(&self.title, &err),
        }
    }
}

impl fmt::Debug for Assertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Assertion")
            .field("title", &self.title)
            .field("expectation", &self.expectation)
            .finish_non_exhaustive()
    }
}

/// Per-assertion outcome kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssertionStatus {
    Passed,
    /// The value resolved but did not meet the expectation
    Failed,
    /// An attribute the assertion needs could not be resolved
    Errored,
}

/// Result reported to the harness for one assertion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssertionResult {
    pub title: String,
    pub passed: bool,
    pub status: AssertionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<Value>,
}

impl AssertionResult {
    pub fn passed(title: &str) -> Self {
        Self {
            title: title.to_string(),
            passed: true,
            status: AssertionStatus::Passed,
            detail: None,
            expected: None,
            actual: None,
        }
    }

    pub fn failed(title: &str, expected: Value, actual: Value) -> Self {
        let detail = format!("expected {}, got {}", describe(&expected), describe(&actual));
        Self {
            title: title.to_string(),
            passed: false,
            status: AssertionStatus::Failed,
            detail: Some(detail),
            expected: Some(expected),
            actual: Some(actual),
        }
    }

    pub fn errored(title: &str, error: &ResolutionError) -> Self {
        Self {
            title: title.to_string(),
            passed: false,
            status: AssertionStatus::Errored,
            detail: Some(error.to_string()),
            expected: None,
            actual: None,
        }
    }
}

/// Human-readable rendering of a value inside a detail message
fn describe(value: &Value) -> String {
    match value {
        Value::Null => "nothing".to_string(),
        other => other.to_string(),
    }
}
