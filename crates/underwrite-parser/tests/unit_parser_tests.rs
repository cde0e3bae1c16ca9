//! Unit tests for the YAML configuration parsers
//!
//! Covers rule, catalog, tree, strategy and bundle parsing end to end.

use underwrite_core::{
    ComparisonOperator, ConditionType, Decision, EvaluationMode, NodeKind, RuleKind, Severity,
    Threshold, Value,
};
use underwrite_parser::*;

// =============================================================================
// Rule Parser Tests
// =============================================================================

#[test]
fn test_parse_between_rule_with_list() {
    let yaml = r#"
rule:
  id: loan_term_band
  name: Loan term band
  field: term_months
  operator: between
  threshold: [6, 60]
"#;

    let result = RuleParser::parse(yaml);
    assert!(result.is_ok(), "Failed to parse rule: {:?}", result.err());

    let rule = result.unwrap();
    match rule.kind {
        RuleKind::Threshold(condition) => {
            assert_eq!(condition.operator, ComparisonOperator::Between);
            assert_eq!(condition.threshold.bounds(), Some((6.0, 60.0)));
        }
        other => panic!("Expected threshold rule, got {:?}", other),
    }
}

#[test]
fn test_parse_membership_rule() {
    let yaml = r#"
rule:
  id: employment_not_unemployed
  field: employment_status
  operator: not_in
  threshold: [unemployed]
  severity: hard
"#;

    let rule = RuleParser::parse(yaml).unwrap();
    match rule.kind {
        RuleKind::Threshold(condition) => {
            assert_eq!(condition.operator, ComparisonOperator::NotIn);
            assert_eq!(condition.threshold, Threshold::list(["unemployed"]));
        }
        other => panic!("Expected threshold rule, got {:?}", other),
    }
}

#[test]
fn test_operator_symbols_accepted() {
    let yaml = r#"
rule:
  id: min_age
  field: age
  operator: ">="
  threshold: 18
"#;

    let rule = RuleParser::parse(yaml).unwrap();
    match rule.kind {
        RuleKind::Threshold(condition) => assert_eq!(condition.operator, ComparisonOperator::Gte),
        other => panic!("Expected threshold rule, got {:?}", other),
    }
}

#[test]
fn test_invalid_severity() {
    let yaml = r#"
rule:
  id: min_age
  field: age
  operator: gte
  threshold: 18
  severity: critical
"#;

    let result = RuleParser::parse(yaml);
    assert!(matches!(
        result,
        Err(ParseError::InvalidValue { ref field, .. }) if field == "severity"
    ));
}

#[test]
fn test_rule_missing_id() {
    let yaml = r#"
rule:
  field: age
  operator: gte
  threshold: 18
"#;

    assert!(matches!(
        RuleParser::parse(yaml),
        Err(ParseError::MissingField { ref field }) if field == "id"
    ));
}

// =============================================================================
// Catalog Parser Tests
// =============================================================================

#[test]
fn test_catalog_custom_rules_marked_custom() {
    let yaml = r#"
catalog:
  custom:
    - id: min_residence
      field: residence_years
      operator: gte
      threshold: 1
      severity: refer
    - id: max_open_lines
      field: open_credit_lines
      operator: lte
      threshold: 12
"#;

    let catalog = CatalogParser::parse(yaml).unwrap();
    assert_eq!(catalog.custom.len(), 2);
    assert!(catalog.custom.iter().all(|r| r.is_custom));
    assert_eq!(catalog.custom[0].severity, Severity::Refer);
    assert_eq!(catalog.custom[1].severity, Severity::Hard);
}

// =============================================================================
// Tree Parser Tests
// =============================================================================

#[test]
fn test_parse_numeric_range_tree() {
    let yaml = r#"
tree:
  id: amount_bands
  nodes:
    - key: root
      is_root: true
      type: condition
      condition_type: numeric_range
      attribute: loan_amount
      branches:
        - label: Small
          max: 1000
        - label: Medium
          min: 1000
          max: 10000
        - label: Other
    - key: small
      parent: root
      branch: Small
      type: strategy
      strategy_id: micro
    - key: note
      parent: root
      branch: Medium
      type: annotation
      note: reviewed quarterly
    - key: medium
      parent: note
      type: strategy
      strategy_id: standard
"#;

    let tree = TreeParser::parse(yaml).unwrap();
    assert_eq!(tree.version, 1);
    assert!(tree.default_strategy.is_none());
    assert_eq!(tree.nodes.len(), 4);

    match &tree.nodes[0].kind {
        NodeKind::Condition(spec) => {
            assert_eq!(spec.condition_type, ConditionType::NumericRange);
            assert_eq!(spec.branches.len(), 3);
            assert!(spec.branches[2].is_catch_all());
        }
        other => panic!("Expected condition node, got {:?}", other),
    }
    assert!(matches!(tree.nodes[2].kind, NodeKind::Annotation { .. }));
    assert_eq!(tree.nodes[3].branch_label, None);
}

#[test]
fn test_tree_accepts_long_field_names() {
    let yaml = r#"
tree:
  id: t
  nodes:
    - node_key: leaf
      parent_node_id: root
      branch_label: "Yes"
      type: assessment
      assessment_id: a1
"#;

    let tree = TreeParser::parse(yaml).unwrap();
    let node = &tree.nodes[0];
    assert_eq!(node.node_key, "leaf");
    assert_eq!(node.parent_node_id.as_deref(), Some("root"));
    assert_eq!(node.branch_label.as_deref(), Some("Yes"));
}

#[test]
fn test_tree_node_missing_key() {
    let yaml = r#"
tree:
  id: t
  nodes:
    - type: strategy
      strategy_id: s
"#;

    assert!(matches!(
        TreeParser::parse(yaml),
        Err(ParseError::MissingField { ref field }) if field == "key"
    ));
}

#[test]
fn test_strategy_node_requires_strategy_id() {
    let yaml = r#"
tree:
  id: t
  nodes:
    - key: s
      type: strategy
"#;

    assert!(matches!(
        TreeParser::parse(yaml),
        Err(ParseError::MissingField { ref field }) if field == "strategy_id"
    ));
}

// =============================================================================
// Strategy Parser Tests
// =============================================================================

#[test]
fn test_parse_scoring_strategy() {
    let yaml = r#"
strategy:
  id: score_only
  name: Score only
  evaluation_mode: scoring
  score_cutoffs:
    - band: A
      min_score: 720
      outcome: approve
    - band: C
      min_score: 580
      outcome: refer
"#;

    let strategy = StrategyParser::parse(yaml).unwrap();
    assert_eq!(strategy.evaluation_mode, EvaluationMode::Scoring);
    assert_eq!(strategy.name.as_deref(), Some("Score only"));
    assert_eq!(strategy.band_for(600.0).map(|b| b.outcome), Some(Decision::Refer));
}

#[test]
fn test_cutoff_requires_min_score() {
    let yaml = r#"
strategy:
  id: s
  evaluation_mode: scoring
  score_cutoffs:
    - band: A
      outcome: approve
"#;

    assert!(matches!(
        StrategyParser::parse(yaml),
        Err(ParseError::MissingField { ref field }) if field == "min_score"
    ));
}

// =============================================================================
// Bundle Parser Tests
// =============================================================================

#[test]
fn test_bundle_auto_split_without_separators() {
    let yaml = r#"
tree:
  id: t
  default_strategy: s
  nodes:
    - key: root
      is_root: true
      type: condition
      condition_type: categorical
      attribute: channel
      branches:
        - label: Web
          values: [web]
        - label: Other
    - key: web
      parent: root
      branch: Web
      type: strategy
      strategy_id: s
      params:
        channel_cap: 3000
strategy:
  id: s
  evaluation_mode: dual_path
assessment:
  id: a
  rules: []
"#;

    let bundle = BundleParser::parse(yaml).unwrap();
    assert_eq!(bundle.trees.len(), 1);
    assert_eq!(bundle.strategies.len(), 1);
    assert_eq!(bundle.assessments.len(), 1);
    assert!(bundle.catalog.is_none());

    match &bundle.trees[0].nodes[1].kind {
        NodeKind::Strategy { params, .. } => {
            assert_eq!(params.get("channel_cap"), Some(&Value::Number(3000.0)))
        }
        other => panic!("Expected strategy node, got {:?}", other),
    }
}

#[test]
fn test_bundle_merge() {
    let mut first = BundleParser::parse("strategy:\n  id: a\n  evaluation_mode: scoring\n").unwrap();
    let second = BundleParser::parse("strategy:\n  id: b\n  evaluation_mode: scoring\n").unwrap();

    first.merge(second).unwrap();
    let ids: Vec<_> = first.strategies.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);
}

#[test]
fn test_bundle_invalid_yaml() {
    let result = BundleParser::parse("tree: [unclosed\n");
    assert!(matches!(result, Err(ParseError::YamlError(_))));
}
