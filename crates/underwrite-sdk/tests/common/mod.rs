//! Common fixtures for SDK integration tests

#![allow(dead_code)]

use underwrite_sdk::{
    ApplicationSnapshot, DecisionConfig, DecisionEngine, RoutingContext, RuleInput,
};

/// Consumer bundle: returning customers go to a dual-path strategy, new
/// customers split on score between the legacy catalog and a manual
/// assessment.
///
/// `income_threshold` feeds the custom catalog rule, `band_a_min` the top
/// score band of the returning-customer strategy.
pub fn bundle(income_threshold: f64, band_a_min: f64) -> String {
    format!(
        r#"
catalog:
  custom:
    - id: min_income_custom
      name: Minimum monthly income (custom)
      field: monthly_income
      operator: gte
      threshold: {income_threshold}
      severity: hard
      outcome: decline
---
tree:
  id: consumer
  version: 3
  default_strategy: legacy
  nodes:
    - key: customer
      is_root: true
      type: condition
      condition_type: binary
      attribute: is_existing_customer
      operator: eq
      branches:
        - label: Existing
          threshold: true
        - label: New
      null_branch: New
    - key: returning
      parent: customer
      branch: Existing
      type: strategy
      strategy_id: returning_dual
      params:
        limit_multiplier: 1.5
    - key: score_split
      parent: customer
      branch: New
      type: condition
      condition_type: numeric_range
      attribute: application_score
      branches:
        - label: High
          min: 650
        - label: Low
          max: 650
    - key: new_high
      parent: score_split
      branch: High
      type: strategy
      strategy_id: legacy
    - key: new_low
      parent: score_split
      branch: Low
      type: assessment
      assessment_id: manual_checks
---
strategy:
  id: returning_dual
  version: 2
  evaluation_mode: dual_path
  knock_out_rules:
    - id: ko_bankruptcy
      field: bankruptcies
      operator: eq
      threshold: 0
  overlay_rules:
    - id: ov_inquiries
      field: bureau_inquiries_6m
      operator: lte
      threshold: 4
      severity: refer
  score_cutoffs:
    - band: A
      min_score: {band_a_min}
      outcome: approve
    - band: B
      min_score: 600
      outcome: refer
  reason_code_map:
    ko_bankruptcy: R01
    ov_inquiries: R14
---
strategy:
  id: legacy
  evaluation_mode: sequential
---
assessment:
  id: manual_checks
  rules:
    - id: min_income_review
      field: monthly_income
      operator: gte
      threshold: 1000
      severity: refer
"#
    )
}

/// The configuration applications were originally decided with
pub fn baseline_bundle() -> String {
    bundle(500.0, 700.0)
}

pub fn config(yaml: &str) -> DecisionConfig {
    DecisionConfig::from_yaml(yaml).expect("fixture bundle should load")
}

pub fn baseline_config() -> DecisionConfig {
    config(&baseline_bundle())
}

/// Returning customer with a clean file
pub fn returning(id: &str, score: f64) -> ApplicationSnapshot {
    let input = RuleInput {
        application_score: Some(score),
        bankruptcies: Some(0),
        bureau_inquiries_6m: Some(1),
        monthly_income: Some(4200.0),
        ..Default::default()
    };
    let context = RoutingContext {
        is_existing_customer: Some(true),
        application_score: Some(score),
        ..Default::default()
    };
    ApplicationSnapshot::new(id, input, context)
}

/// New customer
pub fn new_customer(id: &str, score: f64, monthly_income: f64) -> ApplicationSnapshot {
    let input = RuleInput {
        application_score: Some(score),
        monthly_income: Some(monthly_income),
        ..Default::default()
    };
    let context = RoutingContext {
        is_existing_customer: Some(false),
        application_score: Some(score),
        monthly_income: Some(monthly_income),
        ..Default::default()
    };
    ApplicationSnapshot::new(id, input, context)
}

/// A spread of applications touching every terminal of the bundle
pub fn applications() -> Vec<ApplicationSnapshot> {
    let mut bankrupt = returning("ret-bankrupt", 780.0);
    bankrupt.input.bankruptcies = Some(1);

    let mut inquisitive = returning("ret-inquiries", 780.0);
    inquisitive.input.bureau_inquiries_6m = Some(7);

    let mut unknown_customer = new_customer("new-unknown", 610.0, 800.0);
    unknown_customer.context.is_existing_customer = None;

    vec![
        returning("ret-prime", 760.0),
        returning("ret-mid", 720.0),
        returning("ret-near", 640.0),
        returning("ret-low", 540.0),
        bankrupt,
        inquisitive,
        new_customer("new-low-income", 700.0, 400.0),
        new_customer("new-high-income", 700.0, 15000.0),
        new_customer("new-thin", 600.0, 800.0),
        unknown_customer,
    ]
}

/// Stamp each application with the outcome a live decision gives it
pub fn decided_with(config: &DecisionConfig, snapshots: Vec<ApplicationSnapshot>) -> Vec<ApplicationSnapshot> {
    let engine = DecisionEngine::new(config.clone());
    snapshots
        .into_iter()
        .map(|snapshot| {
            let record = engine
                .decide(&snapshot.input, &snapshot.context)
                .expect("fixture application should decide");
            snapshot.with_original_outcome(record.outcome)
        })
        .collect()
}
