//! Routing and strategy traces
//!
//! These are the raw material of the audit record: the ordered routing path
//! and the numbered evaluation steps of the strategy that decided.

use crate::rules::RuleResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use underwrite_core::{ConditionType, Decision, EvaluationMode, Value};

/// How a branch was chosen at a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BranchSelection {
    /// The observed value matched a declared branch
    Matched,
    /// Value missing, declared `null_branch` taken
    NullBranch,
    /// Value missing, no `null_branch`; "Other" or the first branch taken
    NullFallback,
    /// No declared branch matched; catch-all branch taken
    CatchAll,
    /// No declared branch matched and no catch-all; literal "Other"
    Other,
}

/// One routing decision at a branching node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathStep {
    pub node_key: String,
    pub condition_type: ConditionType,

    /// Attribute(s) read, comma separated for compound nodes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,

    /// Observed value (boolean result for compound nodes)
    pub actual_value: Value,

    pub branch_taken: String,
    pub selection: BranchSelection,
}

/// What routing handed off to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ExecutionTarget {
    Strategy(String),
    Assessment(String),
}

impl ExecutionTarget {
    pub fn id(&self) -> &str {
        match self {
            ExecutionTarget::Strategy(id) | ExecutionTarget::Assessment(id) => id,
        }
    }
}

impl fmt::Display for ExecutionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionTarget::Strategy(id) => write!(f, "strategy '{}'", id),
            ExecutionTarget::Assessment(id) => write!(f, "assessment '{}'", id),
        }
    }
}

/// Output of tree routing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub assessment_id: Option<String>,

    #[serde(default)]
    pub strategy_params: BTreeMap<String, Value>,

    /// Key of the terminal node reached (absent when the default strategy
    /// was used)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terminal_node: Option<String>,

    /// True when a branch had no child and the tree default was used
    pub used_default_strategy: bool,

    /// Branching decisions in traversal order
    pub path: Vec<PathStep>,
}

impl RoutingResult {
    pub fn target(&self) -> Option<ExecutionTarget> {
        if let Some(id) = &self.strategy_id {
            return Some(ExecutionTarget::Strategy(id.clone()));
        }
        self.assessment_id
            .as_ref()
            .map(|id| ExecutionTarget::Assessment(id.clone()))
    }

    /// Node keys visited, in order
    pub fn node_keys(&self) -> Vec<&str> {
        self.path.iter().map(|step| step.node_key.as_str()).collect()
    }
}

/// Outcome recorded on an evaluation step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepOutcome {
    Pass,
    Fail,
    Skipped,
    /// Informational step (routing params, score capture)
    Recorded,
    Approve,
    Decline,
    Refer,
}

impl From<Decision> for StepOutcome {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Approve => StepOutcome::Approve,
            Decision::Decline => StepOutcome::Decline,
            Decision::Refer => StepOutcome::Refer,
        }
    }
}

/// One numbered step of a strategy evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationStep {
    /// 1-based step number
    pub step: u32,
    pub name: String,
    pub outcome: StepOutcome,
    pub detail: String,
}

/// Output of a strategy or assessment execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyResult {
    pub target: ExecutionTarget,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluation_mode: Option<EvaluationMode>,

    pub outcome: Decision,

    /// Reason codes, most severe first
    pub reasons: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub band: Option<String>,

    pub evaluation_steps: Vec<EvaluationStep>,

    /// Per-rule detail for every rule evaluated
    pub rule_results: Vec<RuleResult>,
}

/// Accumulates numbered steps
#[derive(Debug, Default)]
pub(crate) struct StepRecorder {
    steps: Vec<EvaluationStep>,
}

impl StepRecorder {
    pub(crate) fn record(
        &mut self,
        name: impl Into<String>,
        outcome: StepOutcome,
        detail: impl Into<String>,
    ) {
        let step = self.steps.len() as u32 + 1;
        self.steps.push(EvaluationStep {
            step,
            name: name.into(),
            outcome,
            detail: detail.into(),
        });
    }

    pub(crate) fn record_rule(&mut self, prefix: &str, result: &RuleResult) {
        let outcome = if result.is_skipped() {
            StepOutcome::Skipped
        } else if result.passed {
            StepOutcome::Pass
        } else {
            StepOutcome::Fail
        };
        self.record(
            format!("{}:{}", prefix, result.rule_id),
            outcome,
            result.message.clone(),
        );
    }

    pub(crate) fn into_steps(self) -> Vec<EvaluationStep> {
        self.steps
    }
}
