//! Underwrite Runtime - Evaluation engine for underwriting decisions
//!
//! This crate evaluates applicants against rule catalogs, routes them
//! through decision trees and executes the strategy or assessment a tree
//! hands off to. Every operation is synchronous and free of I/O.

pub mod engine;
pub mod error;
pub mod result;
pub mod router;
pub mod rules;
pub mod strategy;

// Re-export main types
pub use engine::{compare, compare_values, values_match};
pub use error::{ConfigurationError, MalformedThreshold, Result};
pub use result::{
    BranchSelection, EvaluationStep, ExecutionTarget, PathStep, RoutingResult, StepOutcome,
    StrategyResult,
};
pub use router::{DecisionTree, NodeId, TreeRouter};
pub use rules::{
    default_rules, AggregateOutcome, Benchmark, RuleCatalog, RuleEvaluation, RuleEvaluator,
    RuleResult, SkipReason,
};
pub use strategy::{FixedScore, InputScore, Scorecard, StrategyExecutor};
