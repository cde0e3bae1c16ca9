//! DecisionEngine - Main API for underwriting decisions
//!
//! The module is organized into:
//! - `decision_config`: the validated configuration snapshot
//! - `types`: application snapshots and decision records
//! - `engine`: routing + execution
//! - `loader`: bundle loading from files and inline contents
//! - `tests`: Unit tests (test-only)

mod decision_config;
mod engine;
pub(crate) mod loader;
mod types;

pub use decision_config::DecisionConfig;
pub use engine::DecisionEngine;
pub use types::{ApplicationSnapshot, DecisionRecord};

pub(crate) use engine::{evaluate, Evaluation, SplitFor};

#[cfg(test)]
mod tests;
