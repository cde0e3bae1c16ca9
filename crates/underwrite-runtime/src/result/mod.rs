//! Routing and execution result types

mod trace;

pub use trace::{
    BranchSelection, EvaluationStep, ExecutionTarget, PathStep, RoutingResult, StepOutcome,
    StrategyResult,
};

pub(crate) use trace::StepRecorder;
