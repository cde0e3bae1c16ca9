//! Underwrite Decision Engine SDK
//!
//! High-level API for making underwriting decisions and simulating
//! configuration changes against stored applications.

pub mod builder;
pub mod champion;
pub mod config;
pub mod decision_engine;
pub mod error;
pub mod explanation;
pub mod simulation;

// Re-export main types
pub use builder::DecisionEngineBuilder;
pub use champion::{Assignment, ChampionChallenger};
pub use config::{EngineConfig, ReplayOptions};
pub use decision_engine::{ApplicationSnapshot, DecisionConfig, DecisionEngine, DecisionRecord};
pub use error::{Result, SdkError};
pub use explanation::{Audience, Explanation};
pub use simulation::{
    ChangeKind, ImpactChange, ImpactReport, OutcomeChange, ReplayFailure, ReplayReport,
    SimulationEngine, SimulationTrace,
};

// Re-export commonly used types from dependencies
pub use underwrite_core::{Decision, RoutingContext, RuleInput, Value};
pub use underwrite_runtime::{
    FixedScore, InputScore, RoutingResult, Scorecard, StrategyResult,
};
