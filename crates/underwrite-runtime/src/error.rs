//! Runtime error types

use thiserror::Error;
use underwrite_core::ComparisonOperator;

/// Structural defect in a tree, catalog or strategy.
///
/// These are raised before any decision is reached; a decision is never
/// produced from a configuration that fails here.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    /// Tree has no nodes
    #[error("Decision tree has no nodes")]
    EmptyTree,

    /// No node flagged as root and no unique parentless node
    #[error("Decision tree has no root node")]
    NoRoot,

    /// More than one root candidate
    #[error("Decision tree has more than one root: {}", .0.join(", "))]
    MultipleRoots(Vec<String>),

    /// Two nodes share a key
    #[error("Duplicate node key: {0}")]
    DuplicateNode(String),

    /// Node names a parent that does not exist
    #[error("Node '{node}' references unknown parent '{parent}'")]
    UnknownParent { node: String, parent: String },

    /// Parent links or traversal revisit a node
    #[error("Cycle detected at node '{0}'")]
    Cycle(String),

    /// Branch resolved with no child and no default strategy
    #[error("Node '{node}' has no child for branch '{branch}' and the tree has no default strategy")]
    DanglingBranch { node: String, branch: String },

    /// Terminal node without a usable strategy/assessment reference
    #[error("Terminal node '{node}' is invalid: {message}")]
    InvalidTerminal { node: String, message: String },

    /// Node reads an attribute the routing context cannot supply
    #[error("Node '{node}' references unknown routing attribute '{attribute}'")]
    UnknownAttribute { node: String, attribute: String },

    /// Node shape is wrong for its type
    #[error("Node '{node}' is invalid: {message}")]
    InvalidNode { node: String, message: String },

    /// Strategy id not present in the configuration
    #[error("Unknown strategy: {0}")]
    UnknownStrategy(String),

    /// Assessment id not present in the configuration
    #[error("Unknown assessment: {0}")]
    UnknownAssessment(String),

    /// Strategy definition cannot be executed
    #[error("Strategy '{strategy}' is invalid: {message}")]
    InvalidStrategy { strategy: String, message: String },

    /// Two rules share an id where ids must be unique
    #[error("Duplicate rule id: {0}")]
    DuplicateRule(String),
}

/// A threshold whose shape does not suit its operator.
///
/// Not fatal: the rule is recorded as skipped.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Malformed threshold for '{operator}': {message}")]
pub struct MalformedThreshold {
    pub operator: ComparisonOperator,
    pub message: String,
}

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, ConfigurationError>;
