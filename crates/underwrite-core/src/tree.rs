//! Decision tree node definitions
//!
//! Nodes are stored flat and linked by `parent_node_id` + `branch_label`.
//! The runtime turns a node list into an indexed arena before routing.

use crate::operator::{ComparisonOperator, CompoundLogic};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Branch labels that absorb any value not matched by another branch
pub const CATCH_ALL_LABELS: [&str; 3] = ["other", "all_others", "catch_all"];

/// Label used when no branch matches and no catch-all is declared
pub const OTHER_LABEL: &str = "Other";

/// A decision tree node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTreeNode {
    /// Unique key of this node within the tree
    pub node_key: String,

    /// Optional display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Key of the parent node (absent for the root)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_node_id: Option<String>,

    /// Parent branch label that leads to this node
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_label: Option<String>,

    #[serde(default)]
    pub is_root: bool,

    #[serde(flatten)]
    pub kind: NodeKind,
}

/// Node variants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeKind {
    /// Branches on one attribute (or a compound of several)
    Condition(ConditionSpec),

    /// Numeric bands over a scorecard output
    ScorecardGate {
        attribute: String,
        branches: Vec<Branch>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        null_branch: Option<String>,
    },

    /// Terminal: hand off to a strategy
    Strategy {
        strategy_id: String,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        params: BTreeMap<String, Value>,
    },

    /// Terminal: hand off to an assessment
    Assessment { assessment_id: String },

    /// Transparent pass-through to a single child
    Annotation {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        note: Option<String>,
    },
}

/// Condition node configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionSpec {
    pub condition_type: ConditionType,

    /// Attribute read by the node (unused by compound nodes)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,

    /// Operator for binary nodes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<ComparisonOperator>,

    #[serde(default)]
    pub branches: Vec<Branch>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub compound_conditions: Vec<CompoundCondition>,

    #[serde(default)]
    pub compound_logic: CompoundLogic,

    /// Branch taken when the attribute is missing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub null_branch: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionType {
    Binary,
    Categorical,
    NumericRange,
    Compound,
    ScorecardGate,
}

impl fmt::Display for ConditionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConditionType::Binary => "binary",
            ConditionType::Categorical => "categorical",
            ConditionType::NumericRange => "numeric_range",
            ConditionType::Compound => "compound",
            ConditionType::ScorecardGate => "scorecard_gate",
        };
        f.write_str(name)
    }
}

/// A declared branch of a condition or gate node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    pub label: String,

    /// Categorical values routed to this branch
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<Value>,

    /// Inclusive lower bound of a numeric band
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    /// Exclusive upper bound of a numeric band
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,

    /// Comparison target of a binary node (read from the first branch)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<Value>,
}

/// One `{attribute, operator, value}` clause of a compound node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompoundCondition {
    pub attribute: String,
    pub operator: ComparisonOperator,
    pub value: Value,
}

impl DecisionTreeNode {
    pub fn new(node_key: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            node_key: node_key.into(),
            name: None,
            parent_node_id: None,
            branch_label: None,
            is_root: false,
            kind,
        }
    }

    pub fn condition(node_key: impl Into<String>, spec: ConditionSpec) -> Self {
        Self::new(node_key, NodeKind::Condition(spec))
    }

    pub fn scorecard_gate(
        node_key: impl Into<String>,
        attribute: impl Into<String>,
        branches: Vec<Branch>,
    ) -> Self {
        Self::new(
            node_key,
            NodeKind::ScorecardGate {
                attribute: attribute.into(),
                branches,
                null_branch: None,
            },
        )
    }

    pub fn strategy(node_key: impl Into<String>, strategy_id: impl Into<String>) -> Self {
        Self::new(
            node_key,
            NodeKind::Strategy {
                strategy_id: strategy_id.into(),
                params: BTreeMap::new(),
            },
        )
    }

    pub fn assessment(node_key: impl Into<String>, assessment_id: impl Into<String>) -> Self {
        Self::new(
            node_key,
            NodeKind::Assessment {
                assessment_id: assessment_id.into(),
            },
        )
    }

    pub fn annotation(node_key: impl Into<String>, note: impl Into<String>) -> Self {
        Self::new(
            node_key,
            NodeKind::Annotation {
                note: Some(note.into()),
            },
        )
    }

    /// Flag this node as the tree root
    pub fn root(mut self) -> Self {
        self.is_root = true;
        self
    }

    /// Attach this node under `parent` on branch `label`
    pub fn child_of(mut self, parent: impl Into<String>, label: impl Into<String>) -> Self {
        self.parent_node_id = Some(parent.into());
        self.branch_label = Some(label.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Add a routing parameter to a strategy terminal
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        if let NodeKind::Strategy { params, .. } = &mut self.kind {
            params.insert(key.into(), value.into());
        }
        self
    }

    /// Set the null branch of a condition or gate node
    pub fn with_null_branch(mut self, label: impl Into<String>) -> Self {
        match &mut self.kind {
            NodeKind::Condition(spec) => spec.null_branch = Some(label.into()),
            NodeKind::ScorecardGate { null_branch, .. } => *null_branch = Some(label.into()),
            _ => {}
        }
        self
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, NodeKind::Strategy { .. } | NodeKind::Assessment { .. })
    }

    /// Declared branches of a branching node
    pub fn branches(&self) -> &[Branch] {
        match &self.kind {
            NodeKind::Condition(spec) => &spec.branches,
            NodeKind::ScorecardGate { branches, .. } => branches,
            _ => &[],
        }
    }
}

impl ConditionSpec {
    fn base(condition_type: ConditionType, attribute: Option<String>, branches: Vec<Branch>) -> Self {
        Self {
            condition_type,
            attribute,
            operator: None,
            branches,
            compound_conditions: Vec::new(),
            compound_logic: CompoundLogic::And,
            null_branch: None,
        }
    }

    /// Two-way split on `attribute operator threshold`
    pub fn binary(
        attribute: impl Into<String>,
        operator: ComparisonOperator,
        threshold: impl Into<Value>,
        true_label: impl Into<String>,
        false_label: impl Into<String>,
    ) -> Self {
        let mut spec = Self::base(
            ConditionType::Binary,
            Some(attribute.into()),
            vec![
                Branch::new(true_label).with_threshold(threshold),
                Branch::new(false_label),
            ],
        );
        spec.operator = Some(operator);
        spec
    }

    pub fn categorical(attribute: impl Into<String>, branches: Vec<Branch>) -> Self {
        Self::base(ConditionType::Categorical, Some(attribute.into()), branches)
    }

    pub fn numeric_range(attribute: impl Into<String>, branches: Vec<Branch>) -> Self {
        Self::base(ConditionType::NumericRange, Some(attribute.into()), branches)
    }

    pub fn compound(
        logic: CompoundLogic,
        conditions: Vec<CompoundCondition>,
        true_label: impl Into<String>,
        false_label: impl Into<String>,
    ) -> Self {
        let mut spec = Self::base(
            ConditionType::Compound,
            None,
            vec![Branch::new(true_label), Branch::new(false_label)],
        );
        spec.compound_logic = logic;
        spec.compound_conditions = conditions;
        spec
    }

    pub fn with_null_branch(mut self, label: impl Into<String>) -> Self {
        self.null_branch = Some(label.into());
        self
    }
}

impl Branch {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            values: Vec::new(),
            min: None,
            max: None,
            threshold: None,
        }
    }

    pub fn with_values<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.values = values.into_iter().map(Into::into).collect();
        self
    }

    /// Half-open band `[min, max)`; `None` leaves that side unbounded
    pub fn with_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    pub fn with_threshold(mut self, threshold: impl Into<Value>) -> Self {
        self.threshold = Some(threshold.into());
        self
    }

    /// True for labels that absorb unmatched values
    pub fn is_catch_all(&self) -> bool {
        is_catch_all_label(&self.label)
    }

    /// Whether a number falls inside this branch's `[min, max)` band.
    /// A branch without bounds is not a band.
    pub fn contains(&self, value: f64) -> bool {
        if self.min.is_none() && self.max.is_none() {
            return false;
        }
        let above_min = self.min.map_or(true, |min| value >= min);
        let below_max = self.max.map_or(true, |max| value < max);
        above_min && below_max
    }
}

pub fn is_catch_all_label(label: &str) -> bool {
    let label = label.trim();
    CATCH_ALL_LABELS
        .iter()
        .any(|candidate| label.eq_ignore_ascii_case(candidate))
}

impl CompoundCondition {
    pub fn new(attribute: impl Into<String>, operator: ComparisonOperator, value: impl Into<Value>) -> Self {
        Self {
            attribute: attribute.into(),
            operator,
            value: value.into(),
        }
    }
}
