//! Control registration and the evaluation loop.
//!
//! A profile is an ordered set of controls. Running it resolves each
//! control's attributes against the injected store, evaluates its assertions
//! and aggregates the results.

use crate::data::{AttributeStore, resolve_all};
use crate::domain::{AssertionResult, AssertionStatus, AttributeKey, Control};
use crate::error::{ConfigError, ResolutionError};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug)]
pub struct Profile {
    name: String,
    controls: Vec<Control>,
}

impl Profile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            controls: Vec::new(),
        }
    }

    /// Registers a control. Control ids must be unique within a profile.
    pub fn register(&mut self, control: Control) -> Result<(), ConfigError> {
        if self.controls.iter().any(|c| c.id() == control.id()) {
            return Err(ConfigError::Invalid(format!("control `{}` is already registered", control.id())));
        }
        tracing::debug!(control = control.id(), title = control.title(), "registered control");
        self.controls.push(control);
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn controls(&self) -> &[Control] {
        &self.controls
    }

    /// Evaluates every control in registration order
    pub fn run(&self, store: &dyn AttributeStore) -> ProfileReport {
        let controls: Vec<ControlReport> = self
            .controls
            .iter()
            .map(|control| run_control(control, store))
            .collect();

        let summary = controls.iter().fold(Summary::default(), |mut summary, report| {
            summary.add(&report.summary);
            summary
        });

        ProfileReport {
            profile: self.name.clone(),
            summary,
            controls,
        }
    }
}

/// Resolves a control's attributes, then evaluates its assertions
pub fn run_control(control: &Control, store: &dyn AttributeStore) -> ControlReport {
    tracing::info!(control = control.id(), title = control.title(), "evaluating control");

    let mut attributes = resolve_all(store, control.attributes());
    control.check_attributes(&mut attributes);

    let setup_errors: Vec<ResolutionError> = attributes.errors().cloned().collect();
    for err in &setup_errors {
        tracing::warn!(control = control.id(), key = %err.key(), error = %err, "attribute resolution failed");
    }

    let results = control.evaluate(&attributes);
    let summary = Summary::from_results(&results);

    tracing::info!(
        control = control.id(),
        passed = summary.passed,
        failed = summary.failed,
        errored = summary.errored,
        "control finished"
    );

    ControlReport {
        id: control.id().to_string(),
        title: control.title().to_string(),
        attributes: attributes
            .resolved()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect(),
        setup_errors,
        results,
        summary,
    }
}

/// Assertion counts by status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub passed: usize,
    pub failed: usize,
    pub errored: usize,
}

impl Summary {
    pub fn from_results(results: &[AssertionResult]) -> Self {
        results.iter().fold(Self::default(), |mut summary, result| {
            match result.status {
                AssertionStatus::Passed => summary.passed += 1,
                AssertionStatus::Failed => summary.failed += 1,
                AssertionStatus::Errored => summary.errored += 1,
            }
            summary
        })
    }

    fn add(&mut self, other: &Summary) {
        self.passed += other.passed;
        self.failed += other.failed;
        self.errored += other.errored;
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed + self.errored
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ControlReport {
    pub id: String,
    pub title: String,
    /// Attribute values as resolved for this run
    pub attributes: BTreeMap<AttributeKey, Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub setup_errors: Vec<ResolutionError>,
    pub results: Vec<AssertionResult>,
    pub summary: Summary,
}

/// Overall verdict of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    Passed,
    Failed,
    /// At least one attribute could not be resolved
    Errored,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileReport {
    pub profile: String,
    pub summary: Summary,
    pub controls: Vec<ControlReport>,
}

impl ProfileReport {
    pub fn outcome(&self) -> RunOutcome {
        let has_setup_errors = self.controls.iter().any(|c| !c.setup_errors.is_empty());
        if has_setup_errors || self.summary.errored > 0 {
            RunOutcome::Errored
        } else if self.summary.failed > 0 {
            RunOutcome::Failed
        } else {
            RunOutcome::Passed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::default_vpc_control;
    use crate::data::MemoryStore;
    use serde_json::json;

    fn vpc_profile() -> Profile {
        let mut profile = Profile::new("platform_basic");
        profile.register(default_vpc_control()).unwrap();
        profile
    }

    fn store(subnets: Value) -> MemoryStore {
        MemoryStore::new()
            .with("vpc_shared_net_prod_name", json!("shared-net-prod"))
            .with("vpc_shared_net_subnets", subnets)
    }

    #[test]
    fn test_duplicate_control_rejected() {
        let mut profile = vpc_profile();
        assert!(profile.register(default_vpc_control()).is_err());
        assert_eq!(profile.controls().len(), 1);
    }

    #[test]
    fn test_passing_run() {
        let report = vpc_profile().run(&store(json!([{"name": "prod-subnet"}])));

        assert_eq!(report.outcome(), RunOutcome::Passed);
        assert_eq!(report.summary, Summary { passed: 2, failed: 0, errored: 0 });
        assert_eq!(report.controls[0].title, "VPC configuration");
        assert_eq!(
            report.controls[0].attributes.get(&AttributeKey::new("vpc_shared_net_prod_name")),
            Some(&json!("shared-net-prod"))
        );
    }

    #[test]
    fn test_failing_run() {
        let report = vpc_profile().run(&store(json!([{"name": "staging-subnet"}])));

        assert_eq!(report.outcome(), RunOutcome::Failed);
        assert_eq!(report.summary, Summary { passed: 1, failed: 1, errored: 0 });
        assert!(report.controls[0].setup_errors.is_empty());
    }

    #[test]
    fn test_missing_attribute_is_setup_error() {
        let report = vpc_profile().run(&MemoryStore::new());
        let control = &report.controls[0];

        assert_eq!(report.outcome(), RunOutcome::Errored);
        assert_eq!(control.setup_errors.len(), 2);
        assert!(control.setup_errors.iter().all(ResolutionError::is_missing));
        assert_eq!(control.summary, Summary { passed: 0, failed: 0, errored: 2 });
        assert!(control.attributes.is_empty());
    }

    #[test]
    fn test_missing_vpc_name_errors_run_but_assertions_pass() {
        let store = MemoryStore::new().with("vpc_shared_net_subnets", json!([{"name": "prod-subnet"}]));
        let report = vpc_profile().run(&store);

        assert_eq!(report.summary.passed, 2);
        assert_eq!(report.controls[0].setup_errors.len(), 1);
        assert_eq!(report.outcome(), RunOutcome::Errored);
    }

    #[test]
    fn test_non_string_vpc_name_is_setup_error() {
        let store = MemoryStore::new()
            .with("vpc_shared_net_prod_name", json!(42))
            .with("vpc_shared_net_subnets", json!([{"name": "prod-subnet"}]));
        let report = vpc_profile().run(&store);
        let control = &report.controls[0];

        assert_eq!(report.outcome(), RunOutcome::Errored);
        assert_eq!(control.setup_errors.len(), 1);
        assert!(matches!(
            &control.setup_errors[0],
            ResolutionError::Incompatible { key, found, .. }
                if key.as_str() == "vpc_shared_net_prod_name" && found == "a number"
        ));
        assert!(!control.attributes.contains_key(&AttributeKey::new("vpc_shared_net_prod_name")));
        assert_eq!(report.summary.passed, 2);
    }

    #[test]
    fn test_subnet_record_without_name_errors_naming_only() {
        let report = vpc_profile().run(&store(json!([{"ip_cidr_range": "10.0.0.0/24"}])));
        let control = &report.controls[0];

        assert!(control.setup_errors.is_empty());
        assert_eq!(control.summary, Summary { passed: 1, failed: 0, errored: 1 });
        assert_eq!(report.outcome(), RunOutcome::Errored);
    }

    #[test]
    fn test_report_json_shape() {
        let report = vpc_profile().run(&store(json!([])));
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["profile"], "platform_basic");
        assert_eq!(json["controls"][0]["id"], "VPC");
        assert_eq!(json["controls"][0]["results"][0]["passed"], false);
        assert_eq!(json["controls"][0]["results"][0]["detail"], "expected 1, got 0");
        assert!(json["controls"][0].get("setup_errors").is_none());
        assert_eq!(json["summary"]["failed"], 2);
    }

    #[test]
    fn test_summary_total() {
        let summary = Summary { passed: 1, failed: 2, errored: 3 };
        assert_eq!(summary.total(), 6);
    }
}
