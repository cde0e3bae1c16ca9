//! Application snapshots and decision records

use crate::champion::Assignment;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use underwrite_core::{Decision, RoutingContext, RuleInput};
use underwrite_runtime::{RoutingResult, StrategyResult};

/// A stored application: both attribute records plus the decision it
/// originally received
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationSnapshot {
    pub application_id: String,

    #[serde(default)]
    pub input: RuleInput,

    #[serde(default)]
    pub context: RoutingContext,

    /// Decision recorded when the application was first evaluated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_outcome: Option<Decision>,

    /// Champion/challenger arm the original decision was made on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignment: Option<Assignment>,
}

impl ApplicationSnapshot {
    pub fn new(application_id: impl Into<String>, input: RuleInput, context: RoutingContext) -> Self {
        Self {
            application_id: application_id.into(),
            input,
            context,
            original_outcome: None,
            assignment: None,
        }
    }

    pub fn with_original_outcome(mut self, outcome: Decision) -> Self {
        self.original_outcome = Some(outcome);
        self
    }

    pub fn with_assignment(mut self, assignment: Assignment) -> Self {
        self.assignment = Some(assignment);
        self
    }

    /// Stamp the outcome and arm of a decision made for this application
    pub fn with_decision(mut self, record: &DecisionRecord) -> Self {
        self.original_outcome = Some(record.outcome);
        self.assignment = record.assignment;
        self
    }
}

/// Audit record of one decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    /// Unique id, `dec_<YYYYMMDDHHmmss>_<hex>`
    pub decision_id: String,

    pub decided_at: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_id: Option<String>,

    pub outcome: Decision,

    /// Champion/challenger arm, when a split applied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignment: Option<Assignment>,

    pub routing: RoutingResult,
    pub result: StrategyResult,
}
