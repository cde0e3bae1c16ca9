//! Underwrite Core - Core types and definitions for the underwriting decision engine
//!
//! This crate provides the fundamental types shared by every layer:
//! - Value types for attribute data
//! - Attribute records (`RuleInput`, `RoutingContext`) with closed attribute registries
//! - Rule, decision tree, strategy and assessment definitions
//! - Error types

#[macro_use]
mod attributes;

pub mod context;
pub mod error;
pub mod input;
pub mod operator;
pub mod rule;
pub mod strategy;
pub mod tree;
pub mod value;

// Re-export commonly used types
pub use attributes::{AttributeRecord, FromValue};
pub use context::{RoutingAttribute, RoutingContext};
pub use error::CoreError;
pub use input::{ComputedField, RuleField, RuleInput};
pub use operator::{CompoundLogic, ComparisonOperator};
pub use rule::{
    RuleCondition, RuleDefinition, RuleKind, RuleOutcome, RuleOverride, Severity, Threshold,
};
pub use strategy::{Assessment, Decision, EvaluationMode, ScoreCutoff, ScoreGate, Strategy};
pub use tree::{Branch, CompoundCondition, ConditionSpec, ConditionType, DecisionTreeNode, NodeKind};
pub use value::Value;
