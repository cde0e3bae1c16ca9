//! Rule evaluation results

use serde::{Deserialize, Serialize};
use std::fmt;
use underwrite_core::{ComparisonOperator, Decision, Severity, Threshold, Value};

/// Aggregate outcome of a rule catalog evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateOutcome {
    AutoApprove,
    ManualReview,
    AutoDecline,
}

impl AggregateOutcome {
    pub fn decision(self) -> Decision {
        match self {
            AggregateOutcome::AutoApprove => Decision::Approve,
            AggregateOutcome::ManualReview => Decision::Refer,
            AggregateOutcome::AutoDecline => Decision::Decline,
        }
    }
}

impl fmt::Display for AggregateOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AggregateOutcome::AutoApprove => "auto_approve",
            AggregateOutcome::ManualReview => "manual_review",
            AggregateOutcome::AutoDecline => "auto_decline",
        };
        f.write_str(name)
    }
}

/// Why a rule was not evaluated. Skipped rules count as passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    FieldNotAvailable,
    RuleDisabled,
    MalformedThreshold,
}

/// Result of one rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleResult {
    pub rule_id: String,
    pub rule_name: String,

    /// Attribute(s) read by the rule, comma separated for compound rules
    pub field: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator: Option<ComparisonOperator>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<Threshold>,

    /// Observed value (boolean result for compound rules)
    pub actual: Value,

    pub severity: Severity,
    pub passed: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<SkipReason>,

    pub is_custom: bool,
    pub message: String,
}

impl RuleResult {
    /// True when the rule ran and its condition did not hold
    pub fn failed(&self) -> bool {
        !self.passed && self.skipped.is_none()
    }

    pub fn is_skipped(&self) -> bool {
        self.skipped.is_some()
    }
}

/// How far an observed value sits from a numeric threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Benchmark {
    pub rule_id: String,
    pub field: String,
    pub actual: f64,
    pub threshold: f64,
    /// `actual - threshold`
    pub margin: f64,
}

/// Output of `RuleEvaluator::evaluate`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleEvaluation {
    pub outcome: AggregateOutcome,

    /// One entry per catalog rule, in catalog order
    pub rule_results: Vec<RuleResult>,

    /// Failing hard rule ids sorted, then failing refer rule ids sorted
    pub reasons: Vec<String>,

    pub benchmarks: Vec<Benchmark>,
}

impl RuleEvaluation {
    pub fn decision(&self) -> Decision {
        self.outcome.decision()
    }

    /// Failing rules of the given severity, sorted by rule id
    pub fn failures(&self, severity: Severity) -> Vec<&RuleResult> {
        let mut failed: Vec<&RuleResult> = self
            .rule_results
            .iter()
            .filter(|r| r.failed() && r.severity == severity)
            .collect();
        failed.sort_by(|a, b| a.rule_id.cmp(&b.rule_id));
        failed
    }

    pub fn result_for(&self, rule_id: &str) -> Option<&RuleResult> {
        self.rule_results.iter().find(|r| r.rule_id == rule_id)
    }

    pub fn skipped(&self) -> impl Iterator<Item = &RuleResult> {
        self.rule_results.iter().filter(|r| r.is_skipped())
    }
}
