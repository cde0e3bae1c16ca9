//! Unit tests for DecisionEngine

use super::*;
use crate::champion::{Assignment, ChampionChallenger};
use crate::error::SdkError;
use underwrite_core::{Decision, RoutingContext, RuleInput};
use underwrite_runtime::{ConfigurationError, ExecutionTarget};

const BUNDLE: &str = r#"
tree:
  id: channel_tree
  default_strategy: standard
  nodes:
    - key: channel
      is_root: true
      type: condition
      condition_type: categorical
      attribute: channel
      branches:
        - label: Web
          values: [web, mobile]
        - label: Branch
          values: [branch]
    - key: web
      parent: channel
      branch: Web
      type: strategy
      strategy_id: standard
      params:
        channel_cap: 3000
    - key: branch
      parent: channel
      branch: Branch
      type: assessment
      assessment_id: branch_review
---
strategy:
  id: standard
  evaluation_mode: dual_path
  knock_out_rules:
    - id: ko_bankruptcy
      field: bankruptcies
      operator: eq
      threshold: 0
---
strategy:
  id: standard_v2
  evaluation_mode: dual_path
  knock_out_rules:
    - id: ko_bankruptcy
      field: bankruptcies
      operator: eq
      threshold: 0
    - id: ko_income
      field: monthly_income
      operator: gte
      threshold: 2000
---
assessment:
  id: branch_review
  rules:
    - id: min_residence
      field: residence_years
      operator: gte
      threshold: 1
      severity: refer
"#;

fn engine() -> DecisionEngine {
    DecisionEngine::new(DecisionConfig::from_yaml(BUNDLE).unwrap())
}

fn context(channel: &str) -> RoutingContext {
    RoutingContext {
        channel: Some(channel.to_string()),
        ..Default::default()
    }
}

fn applicant() -> RuleInput {
    RuleInput {
        bankruptcies: Some(0),
        monthly_income: Some(1500.0),
        residence_years: Some(0.5),
        ..Default::default()
    }
}

#[test]
fn test_decide_routes_and_executes() {
    let record = engine().decide(&applicant(), &context("web")).unwrap();

    assert_eq!(record.outcome, Decision::Approve);
    assert_eq!(record.result.target, ExecutionTarget::Strategy("standard".to_string()));
    assert_eq!(record.routing.terminal_node.as_deref(), Some("web"));
    assert!(record.routing.strategy_params.contains_key("channel_cap"));
    assert!(record.application_id.is_none());
    assert!(record.assignment.is_none());
}

#[test]
fn test_decision_id_format() {
    let record = engine().decide(&applicant(), &context("web")).unwrap();

    let parts: Vec<&str> = record.decision_id.split('_').collect();
    assert_eq!(parts.len(), 3);
    assert_eq!(parts[0], "dec");
    assert_eq!(parts[1].len(), 14);
    assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
    assert_eq!(parts[2].len(), 6);
    assert!(parts[2].chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn test_decide_assessment_terminal() {
    let record = engine().decide(&applicant(), &context("branch")).unwrap();

    assert_eq!(
        record.result.target,
        ExecutionTarget::Assessment("branch_review".to_string())
    );
    assert_eq!(record.outcome, Decision::Refer);
    assert_eq!(record.result.reasons, vec!["min_residence".to_string()]);
}

#[test]
fn test_unmatched_channel_uses_default_strategy() {
    let record = engine().decide(&applicant(), &context("phone")).unwrap();

    assert!(record.routing.used_default_strategy);
    assert_eq!(record.routing.strategy_id.as_deref(), Some("standard"));
    assert_eq!(record.outcome, Decision::Approve);
}

#[test]
fn test_decide_application_with_full_challenger_split() {
    let engine = engine()
        .with_champion_challenger(ChampionChallenger::new("standard", "standard_v2", 100).unwrap())
        .unwrap();
    let snapshot = ApplicationSnapshot::new("app-1", applicant(), context("web"));

    let record = engine.decide_application(&snapshot).unwrap();

    assert_eq!(record.application_id.as_deref(), Some("app-1"));
    assert_eq!(record.assignment, Some(Assignment::Challenger));
    assert_eq!(
        record.result.target,
        ExecutionTarget::Strategy("standard_v2".to_string())
    );
    // standard_v2 knocks out incomes below 2000
    assert_eq!(record.outcome, Decision::Decline);
}

#[test]
fn test_split_ignores_applications_routed_elsewhere() {
    let engine = engine()
        .with_champion_challenger(ChampionChallenger::new("standard", "standard_v2", 100).unwrap())
        .unwrap();
    let snapshot = ApplicationSnapshot::new("app-2", applicant(), context("branch"));

    let record = engine.decide_application(&snapshot).unwrap();
    assert!(record.assignment.is_none());
}

#[test]
fn test_split_with_unknown_strategy_is_rejected() {
    let result =
        engine().with_champion_challenger(ChampionChallenger::new("standard", "missing", 10).unwrap());

    assert!(matches!(
        result,
        Err(SdkError::Configuration(ConfigurationError::UnknownStrategy(id))) if id == "missing"
    ));
}

#[test]
fn test_config_without_tree() {
    let yaml = r#"
strategy:
  id: standard
  evaluation_mode: sequential
"#;
    let err = DecisionConfig::from_yaml(yaml).unwrap_err();
    assert!(matches!(err, SdkError::ConfigError(msg) if msg.contains("no decision tree")));
}

#[test]
fn test_config_with_unknown_strategy_reference() {
    let yaml = r#"
tree:
  id: t
  nodes:
    - key: only
      is_root: true
      type: strategy
      strategy_id: nowhere
"#;
    let err = DecisionConfig::from_yaml(yaml).unwrap_err();
    assert!(matches!(err, SdkError::Configuration(_)));
}

#[test]
fn test_config_with_several_trees_needs_a_selection() {
    let yaml = r#"
tree:
  id: first
  nodes:
    - key: only
      is_root: true
      type: strategy
      strategy_id: standard
---
tree:
  id: second
  nodes:
    - key: only
      is_root: true
      type: strategy
      strategy_id: standard
---
strategy:
  id: standard
  evaluation_mode: sequential
"#;
    let bundle = underwrite_parser::BundleParser::parse(yaml).unwrap();
    let err = DecisionConfig::from_bundle(bundle.clone(), None, None).unwrap_err();
    assert!(matches!(err, SdkError::ConfigError(msg) if msg.contains("first, second")));

    let config = DecisionConfig::from_bundle(bundle, Some("second"), None).unwrap();
    assert_eq!(config.tree_id(), Some("second"));
}

#[test]
fn test_duplicate_strategy_ids_are_rejected() {
    let yaml = format!(
        "{}\n---\nstrategy:\n  id: standard\n  evaluation_mode: sequential\n",
        BUNDLE
    );
    let err = DecisionConfig::from_yaml(&yaml).unwrap_err();
    assert!(matches!(err, SdkError::ConfigError(msg) if msg.contains("Duplicate strategy id")));
}

#[test]
fn test_default_strategy_override_must_exist() {
    let bundle = underwrite_parser::BundleParser::parse(BUNDLE).unwrap();
    let err = DecisionConfig::from_bundle(bundle, None, Some("missing")).unwrap_err();
    assert!(matches!(err, SdkError::Configuration(_)));
}
