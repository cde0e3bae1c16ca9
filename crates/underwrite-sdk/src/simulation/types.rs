//! Simulation reports

use crate::champion::Assignment;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use underwrite_core::{Decision, Value};
use underwrite_runtime::{RoutingResult, StrategyResult};

/// Full evaluation of one application, optionally under what-if overrides
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationTrace {
    pub application_id: String,

    /// Overrides merged into the application before evaluation
    #[serde(default)]
    pub applied_overrides: BTreeMap<String, Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_outcome: Option<Decision>,

    pub outcome: Decision,

    /// Champion/challenger arm, when a split applied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignment: Option<Assignment>,

    /// True when an original outcome exists and differs
    pub changed: bool,

    pub routing: RoutingResult,
    pub result: StrategyResult,
}

/// Application whose replayed outcome differs from the stored one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeChange {
    pub application_id: String,
    pub original: Decision,
    pub new: Decision,
}

/// Application that could not be evaluated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayFailure {
    pub application_id: String,
    pub error: String,
}

/// Outcome of re-evaluating a batch against one configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayReport {
    pub total: usize,

    /// Applications evaluated without error
    pub evaluated: usize,

    /// Stored outcomes of evaluated applications that carry one
    pub original_counts: BTreeMap<Decision, usize>,

    /// Replayed outcomes of every evaluated application
    pub new_counts: BTreeMap<Decision, usize>,

    /// In input order
    pub changed: Vec<OutcomeChange>,

    pub errors: Vec<ReplayFailure>,

    /// Share of comparable applications whose outcome did not change
    pub agreement_rate: f64,
}

impl ReplayReport {
    pub fn changed_count(&self) -> usize {
        self.changed.len()
    }
}

/// Classification of one application's old-vs-new outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    NewlyApproved,
    NewlyDeclined,
    NewlyReferred,
    Unchanged,
}

impl ChangeKind {
    pub fn classify(old: Decision, new: Decision) -> Self {
        if old == new {
            return ChangeKind::Unchanged;
        }
        match new {
            Decision::Approve => ChangeKind::NewlyApproved,
            Decision::Decline => ChangeKind::NewlyDeclined,
            Decision::Refer => ChangeKind::NewlyReferred,
        }
    }
}

/// Per-application difference between two configurations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactChange {
    pub application_id: String,
    pub old: Decision,
    pub new: Decision,
    pub kind: ChangeKind,

    /// Terminal the application reached under each configuration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_target: Option<String>,
}

/// Old vs new configuration over an identical application set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactReport {
    pub total: usize,

    /// Applications evaluated under both configurations
    pub evaluated: usize,

    pub newly_approved: usize,
    pub newly_declined: usize,
    pub newly_referred: usize,
    pub unchanged: usize,

    /// Changed applications only, in input order
    pub changes: Vec<ImpactChange>,

    pub errors: Vec<ReplayFailure>,
}

impl ImpactReport {
    pub fn changed_count(&self) -> usize {
        self.newly_approved + self.newly_declined + self.newly_referred
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(
            ChangeKind::classify(Decision::Decline, Decision::Approve),
            ChangeKind::NewlyApproved
        );
        assert_eq!(
            ChangeKind::classify(Decision::Refer, Decision::Decline),
            ChangeKind::NewlyDeclined
        );
        assert_eq!(
            ChangeKind::classify(Decision::Approve, Decision::Refer),
            ChangeKind::NewlyReferred
        );
        assert_eq!(
            ChangeKind::classify(Decision::Refer, Decision::Refer),
            ChangeKind::Unchanged
        );
    }

    #[test]
    fn test_change_kind_serialization() {
        let json = serde_json::to_string(&ChangeKind::NewlyApproved).unwrap();
        assert_eq!(json, "\"newly_approved\"");
    }
}
