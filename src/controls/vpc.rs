//! The shared VPC network control.
//!
//! Reads the VPC name and its subnet list, then asserts there is exactly one
//! subnet and that it is the prod subnet. The naming assertion always runs,
//! even when the count is wrong: with no subnets it fails with "got nothing",
//! with several it looks at the first one only.

use crate::config::{AttributeKeys, Expectations};
use crate::domain::{Assertion, AttributeKey, Control, Expectation, ResolvedAttributes};
use crate::error::ResolutionError;
use serde_json::Value;

pub const CONTROL_ID: &str = "VPC";
pub const CONTROL_TITLE: &str = "VPC configuration";
pub const SUBNET_COUNT_TITLE: &str = "should have only one subnet";
pub const SUBNET_NAME_TITLE: &str = "should be a prod subnet";

/// Builds the VPC control for the given keys and expectations
pub fn vpc_control(keys: &AttributeKeys, expectations: &Expectations) -> Control {
    let count_key = keys.subnets.clone();
    let name_key = keys.subnets.clone();

    Control::new(CONTROL_ID, CONTROL_TITLE)
        .checked_attribute(keys.vpc_name.clone(), check_vpc_name)
        .checked_attribute(keys.subnets.clone(), check_subnet_sequence)
        .assertion(Assertion::new(
            SUBNET_COUNT_TITLE,
            move |attrs: &ResolvedAttributes| attrs.sequence(&count_key).map(|subnets| Value::from(subnets.len())),
            Expectation::Equals(Value::from(expectations.subnet_count)),
        ))
        .assertion(Assertion::new(
            SUBNET_NAME_TITLE,
            move |attrs: &ResolvedAttributes| {
                let subnets = attrs.subnets(&name_key)?;
                Ok(subnets
                    .first()
                    .map_or(Value::Null, |subnet| Value::from(subnet.name.as_str())))
            },
            Expectation::Equals(Value::from(expectations.subnet_name.as_str())),
        ))
}

fn check_vpc_name(attrs: &ResolvedAttributes, key: &AttributeKey) -> Result<(), ResolutionError> {
    let name = attrs.vpc_name(key)?;
    tracing::debug!(vpc = %name, "checking shared VPC");
    Ok(())
}

/// Only the outer shape; records are validated by the naming assertion
fn check_subnet_sequence(attrs: &ResolvedAttributes, key: &AttributeKey) -> Result<(), ResolutionError> {
    attrs.sequence(key).map(|_| ())
}

/// The control with default keys and expectations
pub fn default_vpc_control() -> Control {
    vpc_control(&AttributeKeys::default(), &Expectations::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{AttributeStore, MemoryStore, resolve_all};
    use crate::domain::{AssertionResult, AssertionStatus};
    use serde_json::json;

    fn run(subnets: Value) -> Vec<AssertionResult> {
        let store = MemoryStore::new()
            .with("vpc_shared_net_prod_name", json!("shared-net-prod"))
            .with("vpc_shared_net_subnets", subnets);
        run_with(&store)
    }

    fn run_with(store: &dyn AttributeStore) -> Vec<AssertionResult> {
        let control = default_vpc_control();
        let mut attrs = resolve_all(store, control.attributes());
        control.check_attributes(&mut attrs);
        control.evaluate(&attrs)
    }

    #[test]
    fn test_control_registration_metadata() {
        let control = default_vpc_control();

        assert_eq!(control.id(), "VPC");
        assert_eq!(control.title(), "VPC configuration");
        let titles: Vec<&str> = control.assertions().iter().map(|a| a.title()).collect();
        assert_eq!(titles, vec!["should have only one subnet", "should be a prod subnet"]);
        assert_eq!(control.attributes().len(), 2);
    }

    #[test]
    fn test_single_prod_subnet_passes() {
        let results = run(json!([{"name": "prod-subnet"}]));

        assert!(results.iter().all(|r| r.passed));
    }

    #[test]
    fn test_no_subnets() {
        let results = run(json!([]));

        assert_eq!(results[0].status, AssertionStatus::Failed);
        assert_eq!(results[0].detail.as_deref(), Some("expected 1, got 0"));

        assert_eq!(results[1].status, AssertionStatus::Failed);
        assert_eq!(results[1].actual, Some(Value::Null));
        assert_eq!(results[1].detail.as_deref(), Some("expected \"prod-subnet\", got nothing"));
    }

    #[test]
    fn test_two_subnets_checks_first_name() {
        let results = run(json!([{"name": "prod-subnet"}, {"name": "dev-subnet"}]));

        assert_eq!(results[0].status, AssertionStatus::Failed);
        assert_eq!(results[0].actual, Some(json!(2)));
        assert_eq!(results[1].status, AssertionStatus::Passed);
    }

    #[test]
    fn test_wrong_subnet_name() {
        let results = run(json!([{"name": "staging-subnet"}]));

        assert!(results[0].passed);
        assert_eq!(results[1].status, AssertionStatus::Failed);
        assert_eq!(results[1].expected, Some(json!("prod-subnet")));
        assert_eq!(results[1].actual, Some(json!("staging-subnet")));
        assert_eq!(
            results[1].detail.as_deref(),
            Some("expected \"prod-subnet\", got \"staging-subnet\"")
        );
    }

    #[test]
    fn test_name_comparison_is_exact() {
        for name in ["Prod-Subnet", "", "prod-subnet ", "PROD-SUBNET"] {
            let results = run(json!([{"name": name}]));
            assert!(results[0].passed);
            assert_eq!(results[1].status, AssertionStatus::Failed, "name {:?}", name);
        }
    }

    #[test]
    fn test_cardinality_only_passes_for_one() {
        let cases = [
            (json!([]), false),
            (json!([{"name": "prod-subnet"}]), true),
            (json!([{"name": "a"}, {"name": "b"}]), false),
            (json!([{"name": "a"}, {"name": "b"}, {"name": "c"}]), false),
        ];
        for (subnets, expected) in cases {
            let results = run(subnets);
            assert_eq!(results[0].passed, expected);
        }
    }

    #[test]
    fn test_terraform_subnet_name_field() {
        let results = run(json!([{"subnet_name": "prod-subnet", "subnet_ip": "10.10.10.0/24"}]));
        assert!(results.iter().all(|r| r.passed));
    }

    #[test]
    fn test_record_without_name_only_breaks_naming() {
        let results = run(json!([{"ip_cidr_range": "10.0.0.0/24"}]));

        assert_eq!(results[0].status, AssertionStatus::Passed);
        assert_eq!(results[1].status, AssertionStatus::Errored);
        assert!(results[1].detail.as_ref().unwrap().contains("element 0"));
    }

    #[test]
    fn test_record_with_both_name_fields() {
        let results = run(json!([{"name": "prod-subnet", "subnet_name": "prod-subnet"}]));
        assert!(results.iter().all(|r| r.passed));
    }

    #[test]
    fn test_non_string_vpc_name_is_rejected_at_setup() {
        let control = default_vpc_control();
        let store = MemoryStore::new()
            .with("vpc_shared_net_prod_name", json!(42))
            .with("vpc_shared_net_subnets", json!([{"name": "prod-subnet"}]));

        let mut attrs = resolve_all(&store, control.attributes());
        control.check_attributes(&mut attrs);

        let errors: Vec<&ResolutionError> = attrs.errors().collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].key().as_str(), "vpc_shared_net_prod_name");
        assert!(control.evaluate(&attrs).iter().all(|r| r.passed));
    }

    #[test]
    fn test_missing_subnets_attribute_is_errored() {
        let store = MemoryStore::new().with("vpc_shared_net_prod_name", json!("shared-net-prod"));
        let results = run_with(&store);

        for result in &results {
            assert_eq!(result.status, AssertionStatus::Errored);
            assert!(!result.passed);
            assert!(result.detail.as_ref().unwrap().contains("vpc_shared_net_subnets"));
        }
    }

    #[test]
    fn test_non_sequence_subnets_is_errored() {
        let results = run(json!("prod-subnet"));

        assert_eq!(results[0].status, AssertionStatus::Errored);
        assert_eq!(results[1].status, AssertionStatus::Errored);
    }

    #[test]
    fn test_missing_vpc_name_does_not_affect_assertions() {
        let store = MemoryStore::new().with("vpc_shared_net_subnets", json!([{"name": "prod-subnet"}]));
        let results = run_with(&store);

        assert!(results.iter().all(|r| r.passed));
    }

    #[test]
    fn test_custom_expectations() {
        let expectations = Expectations {
            subnet_count: 2,
            subnet_name: "dev-subnet".to_string(),
        };
        let control = vpc_control(&AttributeKeys::default(), &expectations);
        let store = MemoryStore::new().with(
            "vpc_shared_net_subnets",
            json!([{"name": "dev-subnet"}, {"name": "prod-subnet"}]),
        );

        let results = control.evaluate(&resolve_all(&store, control.attributes()));
        assert!(results.iter().all(|r| r.passed));
        // Titles are fixed regardless of expectations
        assert_eq!(results[0].title, "should have only one subnet");
    }
}
