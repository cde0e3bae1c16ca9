//! Rule definitions
//!
//! A rule states the condition an applicant must satisfy. A rule *passes*
//! when its condition holds; a failing rule contributes its severity to the
//! aggregate outcome.

use crate::input::ComputedField;
use crate::operator::{ComparisonOperator, CompoundLogic};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Rule definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDefinition {
    /// Unique rule ID
    pub id: String,

    /// Human-readable name
    pub name: String,

    /// Optional description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// What the rule checks
    pub kind: RuleKind,

    /// Outcome recorded when the rule fails (`disable` switches the rule off)
    pub outcome: RuleOutcome,

    /// Precedence class of a failure
    pub severity: Severity,

    /// True for rules added on top of the default registry
    #[serde(default)]
    pub is_custom: bool,

    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// Closed set of rule kinds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleKind {
    /// Single comparison against a stored attribute
    Threshold(RuleCondition),

    /// Single comparison against a derived attribute
    Computed {
        field: ComputedField,
        operator: ComparisonOperator,
        threshold: Threshold,
    },

    /// Several comparisons combined with AND/OR
    Compound {
        logic: CompoundLogic,
        conditions: Vec<RuleCondition>,
    },
}

/// `field operator threshold`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleCondition {
    pub field: String,
    pub operator: ComparisonOperator,
    pub threshold: Threshold,
}

/// Comparison target: a scalar, a list, or an inclusive range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Threshold {
    Range { min: f64, max: f64 },
    List(Vec<Value>),
    Scalar(Value),
}

/// Outcome of a failing rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleOutcome {
    Decline,
    Refer,
    /// Rule is switched off
    Disable,
}

/// Severity of a failing rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Hard,
    Refer,
}

/// Per-rule-id override applied on top of a default rule
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<Threshold>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<RuleOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

impl RuleDefinition {
    /// Create a rule. The outcome follows the severity: hard rules decline,
    /// refer rules refer.
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: RuleKind, severity: Severity) -> Self {
        let outcome = match severity {
            Severity::Hard => RuleOutcome::Decline,
            Severity::Refer => RuleOutcome::Refer,
        };
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            kind,
            outcome,
            severity,
            is_custom: false,
            enabled: true,
        }
    }

    /// Create a single-comparison rule on a stored field
    pub fn threshold(
        id: impl Into<String>,
        name: impl Into<String>,
        field: impl Into<String>,
        operator: ComparisonOperator,
        threshold: Threshold,
        severity: Severity,
    ) -> Self {
        Self::new(
            id,
            name,
            RuleKind::Threshold(RuleCondition {
                field: field.into(),
                operator,
                threshold,
            }),
            severity,
        )
    }

    /// Create a single-comparison rule on a computed field
    pub fn computed(
        id: impl Into<String>,
        name: impl Into<String>,
        field: ComputedField,
        operator: ComparisonOperator,
        threshold: Threshold,
        severity: Severity,
    ) -> Self {
        Self::new(
            id,
            name,
            RuleKind::Computed {
                field,
                operator,
                threshold,
            },
            severity,
        )
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_outcome(mut self, outcome: RuleOutcome) -> Self {
        self.outcome = outcome;
        self
    }

    pub fn custom(mut self) -> Self {
        self.is_custom = true;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// A rule is active unless switched off by `enabled` or a `disable` outcome
    pub fn is_active(&self) -> bool {
        self.enabled && self.outcome != RuleOutcome::Disable
    }

    /// Names of every attribute the rule reads
    pub fn fields(&self) -> Vec<&str> {
        match &self.kind {
            RuleKind::Threshold(condition) => vec![condition.field.as_str()],
            RuleKind::Computed { field, .. } => vec![field.name()],
            RuleKind::Compound { conditions, .. } => {
                conditions.iter().map(|c| c.field.as_str()).collect()
            }
        }
    }

    /// Build the replacement entry for this rule with an override applied.
    ///
    /// The flag is false when the override carries a threshold the rule
    /// cannot take (compound rules); the caller decides how to report it.
    pub fn with_override(&self, ovr: &RuleOverride) -> (Self, bool) {
        let mut rule = self.clone();
        let mut threshold_applied = true;

        if let Some(threshold) = &ovr.threshold {
            match &mut rule.kind {
                RuleKind::Threshold(condition) => condition.threshold = threshold.clone(),
                RuleKind::Computed { threshold: t, .. } => *t = threshold.clone(),
                RuleKind::Compound { .. } => threshold_applied = false,
            }
        }
        if let Some(outcome) = ovr.outcome {
            rule.outcome = outcome;
        }
        if let Some(severity) = ovr.severity {
            rule.severity = severity;
        }
        if let Some(enabled) = ovr.enabled {
            rule.enabled = enabled;
        }

        (rule, threshold_applied)
    }
}

impl Threshold {
    pub fn scalar(value: impl Into<Value>) -> Self {
        Threshold::Scalar(value.into())
    }

    pub fn list<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Threshold::List(values.into_iter().map(Into::into).collect())
    }

    pub fn range(min: f64, max: f64) -> Self {
        Threshold::Range { min, max }
    }

    /// Numeric scalar threshold
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Threshold::Scalar(value) => value.as_f64(),
            _ => None,
        }
    }

    /// Inclusive bounds, from a range or a two-element numeric list
    pub fn bounds(&self) -> Option<(f64, f64)> {
        match self {
            Threshold::Range { min, max } => Some((*min, *max)),
            Threshold::List(items) if items.len() == 2 => {
                Some((items[0].as_f64()?, items[1].as_f64()?))
            }
            _ => None,
        }
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Threshold::Range { min, max } => {
                write!(f, "[{}, {}]", Value::Number(*min), Value::Number(*max))
            }
            Threshold::List(items) => write!(f, "{}", Value::Array(items.clone())),
            Threshold::Scalar(value) => write!(f, "{}", value),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Hard => f.write_str("hard"),
            Severity::Refer => f.write_str("refer"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn min_income() -> RuleDefinition {
        RuleDefinition::threshold(
            "min_monthly_income",
            "Minimum monthly income",
            "monthly_income",
            ComparisonOperator::Gte,
            Threshold::scalar(500.0),
            Severity::Hard,
        )
    }

    #[test]
    fn test_rule_creation() {
        let rule = min_income();
        assert_eq!(rule.id, "min_monthly_income");
        assert_eq!(rule.outcome, RuleOutcome::Decline);
        assert!(rule.is_active());
        assert!(!rule.is_custom);
        assert_eq!(rule.fields(), vec!["monthly_income"]);
    }

    #[test]
    fn test_rule_disable_outcome() {
        let rule = min_income().with_outcome(RuleOutcome::Disable);
        assert!(!rule.is_active());
        assert!(!min_income().disabled().is_active());
    }

    #[test]
    fn test_rule_override_replaces_entry() {
        let rule = min_income();
        let ovr = RuleOverride {
            threshold: Some(Threshold::scalar(800.0)),
            severity: Some(Severity::Refer),
            ..Default::default()
        };

        let (replaced, applied) = rule.with_override(&ovr);
        assert!(applied);
        assert_eq!(replaced.severity, Severity::Refer);
        match &replaced.kind {
            RuleKind::Threshold(condition) => {
                assert_eq!(condition.threshold, Threshold::scalar(800.0))
            }
            other => panic!("Expected threshold rule, got {:?}", other),
        }
        // original untouched
        assert_eq!(rule.severity, Severity::Hard);
    }

    #[test]
    fn test_threshold_bounds() {
        assert_eq!(Threshold::range(6.0, 60.0).bounds(), Some((6.0, 60.0)));
        assert_eq!(Threshold::list([6.0, 60.0]).bounds(), Some((6.0, 60.0)));
        assert_eq!(Threshold::list([6.0]).bounds(), None);
        assert_eq!(Threshold::list(["a", "b"]).bounds(), None);
        assert_eq!(Threshold::scalar("abc").as_f64(), None);
    }

    #[test]
    fn test_threshold_untagged_serde() {
        let range: Threshold = serde_json::from_str(r#"{"min": 3, "max": 60}"#).unwrap();
        assert_eq!(range, Threshold::range(3.0, 60.0));

        let list: Threshold = serde_json::from_str(r#"["unemployed", "student"]"#).unwrap();
        assert_eq!(list, Threshold::list(["unemployed", "student"]));

        let scalar: Threshold = serde_json::from_str("0.45").unwrap();
        assert_eq!(scalar, Threshold::scalar(0.45));
    }

    #[test]
    fn test_rule_kind_serde_tag() {
        let rule = min_income();
        let json = serde_json::to_value(&rule).unwrap();
        assert_eq!(json["kind"]["kind"], "threshold");
        assert_eq!(json["kind"]["field"], "monthly_income");

        let parsed: RuleDefinition = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, rule);
    }
}
